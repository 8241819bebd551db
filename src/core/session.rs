//! ObserverSession: one attached client's view of the authority
//!
//! Owns the role, the configured address, the last rendered snapshot, the
//! failure streak and the cooldown guard. SyncLoop events are folded in with
//! `apply`; local operator actions go through `invoke`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::{
    normalize_address, AuthorityClient, ConnectionStatus, ControlState, DebounceGuard,
    IndicatorView, RoleRenderer, SyncEvent,
};
use crate::types::{Action, CommandError, ConfigError, Role, RoleError, Snapshot};

/// Observer session state
#[derive(Debug)]
pub struct ObserverSession {
    renderer: RoleRenderer,
    address: Option<String>,
    /// None until the first successful poll
    last_snapshot: Option<Snapshot>,
    failures: u32,
    local_update_pending: bool,
    last_success_at: Option<DateTime<Utc>>,
    polls_ok: u64,
    guard: DebounceGuard,
}

/// Inspection-only copy of the session state
#[derive(Debug, Clone, Serialize)]
pub struct SessionDiagnostics {
    pub role: Role,
    pub address: Option<String>,
    pub connection: ConnectionStatus,
    pub last_snapshot: Option<Snapshot>,
    pub failures: u32,
    pub polls_ok: u64,
    pub local_update_pending: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    pub controls: Vec<(Action, ControlState)>,
}

impl ObserverSession {
    /// Create a session for a role
    pub fn new(role: Role, address: Option<String>, cooldown: Duration) -> Self {
        Self {
            renderer: RoleRenderer::new(role),
            address: address.and_then(|a| normalize_address(&a).ok()),
            last_snapshot: None,
            failures: 0,
            local_update_pending: false,
            last_success_at: None,
            polls_ok: 0,
            guard: DebounceGuard::new(cooldown),
        }
    }

    /// Create a session from a role code; unknown roles refuse to load
    pub fn from_role_code(code: &str, address: Option<String>, cooldown: Duration) -> Result<Self, RoleError> {
        let role = code.parse::<Role>()?;
        Ok(Self::new(role, address, cooldown))
    }

    pub fn role(&self) -> Role {
        self.renderer.role()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Point the session at a new authority; connection state starts over
    pub fn set_address(&mut self, address: &str) -> Result<&str, ConfigError> {
        let address = normalize_address(address).map_err(|_| ConfigError::EmptyAddress)?;
        self.address = Some(address);
        self.failures = 0;
        self.polls_ok = 0;
        Ok(self.address.as_deref().unwrap_or_default())
    }

    /// Forget the authority
    pub fn clear_address(&mut self) {
        self.address = None;
        self.failures = 0;
        self.polls_ok = 0;
        self.last_snapshot = None;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn local_update_pending(&self) -> bool {
        self.local_update_pending
    }

    /// Last known snapshot, cleared if nothing was fetched yet
    pub fn snapshot(&self) -> Snapshot {
        self.last_snapshot.unwrap_or_default()
    }

    pub fn connection(&self) -> ConnectionStatus {
        if self.address.is_none() {
            ConnectionStatus::NotConfigured
        } else if self.failures > 0 {
            ConnectionStatus::Disconnected {
                failures: self.failures,
            }
        } else if self.polls_ok == 0 {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Connected
        }
    }

    /// Fold one SyncLoop event into the session
    pub fn apply(&mut self, event: SyncEvent, now: Instant) {
        match event {
            SyncEvent::Connected => {
                self.failures = 0;
                self.polls_ok += 1;
                self.last_success_at = Some(Utc::now());
                self.local_update_pending = false;
            }
            SyncEvent::ShowLightChanged(light) => {
                let known = self.last_snapshot.get_or_insert_with(Snapshot::default);
                let previous = std::mem::replace(&mut known.show_light_state, light);
                self.renderer.on_show_light(&mut self.guard, previous, light, now);
            }
            SyncEvent::SkLightChanged(light) => {
                let known = self.last_snapshot.get_or_insert_with(Snapshot::default);
                let previous = std::mem::replace(&mut known.sk_light_state, light);
                self.renderer.on_sk_light(&mut self.guard, previous, light, now);
            }
            SyncEvent::ConnectivityLost { failures, .. } => {
                self.failures = failures;
            }
        }
    }

    /// Validate a local action and start its cooldown
    ///
    /// The control is disabled before the command is sent; the cooldown
    /// runs regardless of whether the authority confirms.
    pub fn invoke(&mut self, action: Action, now: Instant) -> Result<(), CommandError> {
        let role = self.role();
        if !role.can_issue_commands() {
            return Err(CommandError::NotPermitted(role));
        }
        if self.address.is_none() {
            return Err(CommandError::NotConfigured);
        }
        if !self.guard.is_enabled(action) {
            return Err(CommandError::Debounced(action));
        }
        if action.is_guarded() {
            self.guard.disable(action);
            self.guard.arm(action, now);
            self.local_update_pending = true;
        }
        Ok(())
    }

    /// Invoke an action and deliver it to the authority
    pub async fn issue<C: AuthorityClient + ?Sized>(
        &mut self,
        client: &C,
        action: Action,
        now: Instant,
    ) -> Result<(), CommandError> {
        self.invoke(action, now)?;
        let address = self.address.clone().ok_or(CommandError::NotConfigured)?;
        client.send_command(&address, action).await?;
        tracing::info!(%action, role = %self.role(), "command sent");
        Ok(())
    }

    /// Re-enable controls whose cooldown has run out
    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        self.guard.expire(now)
    }

    /// Earliest cooldown deadline, for scheduling the next `tick`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.guard.next_deadline()
    }

    pub fn guard(&self) -> &DebounceGuard {
        &self.guard
    }

    /// Render the current state for this session's role
    pub fn view(&self, now: Instant) -> IndicatorView {
        self.renderer
            .render(self.connection(), &self.snapshot(), &self.guard, now)
    }

    pub fn diagnostics(&self, now: Instant) -> SessionDiagnostics {
        SessionDiagnostics {
            role: self.role(),
            address: self.address.clone(),
            connection: self.connection(),
            last_snapshot: self.last_snapshot,
            failures: self.failures,
            polls_ok: self.polls_ok,
            local_update_pending: self.local_update_pending,
            last_success_at: self.last_success_at,
            controls: Action::GUARDED
                .iter()
                .map(|a| (*a, self.guard.control_state(*a, now)))
                .collect(),
        }
    }
}
