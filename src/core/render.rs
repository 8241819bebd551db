//! RoleRenderer: role-dependent interpretation of a snapshot
//!
//! Selection rules:
//! - Scorekeeping channel → at most one of {potential card, scores ready}
//! - Show channel → at most one of {go, stretch, wind down, halt}
//! - Only Broadcast shows the indicator lights; every role shows connectivity
//! - Only Scorekeeper shows action controls

use colored::Colorize;
use serde::Serialize;
use tokio::time::Instant;

use crate::core::{ControlState, DebounceGuard};
use crate::types::{Action, Role, ScorekeepingLight, ShowLight, Snapshot};

/// Connectivity to the authority as the operator sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No authority address known
    NotConfigured,
    /// Address known, no successful poll yet
    Connecting,
    Connected,
    /// Failure streak is non-zero
    Disconnected { failures: u32 },
}

/// Everything visible on an observer's screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorView {
    pub role: Role,
    pub connection: ConnectionStatus,
    /// "Set an authority address" banner
    pub no_address: bool,
    /// "Connected, nothing lit" light (broadcast only)
    pub idle: bool,
    pub show: Option<ShowLight>,
    pub scorekeeping: Option<ScorekeepingLight>,
    pub controls: Vec<(Action, ControlState)>,
}

/// Renders snapshots for one fixed role
#[derive(Debug, Clone, Copy)]
pub struct RoleRenderer {
    role: Role,
}

impl RoleRenderer {
    pub fn new(role: Role) -> Self {
        Self { role }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Build the view for a snapshot
    pub fn render(
        &self,
        connection: ConnectionStatus,
        snapshot: &Snapshot,
        guard: &DebounceGuard,
        now: Instant,
    ) -> IndicatorView {
        let configured = connection != ConnectionStatus::NotConfigured;
        let lights = configured && self.role.renders_indicators();

        let controls = if self.role.can_issue_commands() {
            Action::GUARDED
                .iter()
                .chain(std::iter::once(&Action::Clear))
                .map(|a| {
                    let state = if configured {
                        guard.control_state(*a, now)
                    } else {
                        ControlState::Disabled
                    };
                    (*a, state)
                })
                .collect()
        } else {
            Vec::new()
        };

        IndicatorView {
            role: self.role,
            connection,
            no_address: !configured,
            idle: lights && connection == ConnectionStatus::Connected && snapshot.is_clear(),
            show: if lights { snapshot.show_light_state } else { None },
            scorekeeping: if lights { snapshot.sk_light_state } else { None },
            controls,
        }
    }

    /// Cooldown side effects of a Scorekeeping channel transition
    ///
    /// Only a change from `previous` touches the guard; the repeated
    /// identical values raised by every poll are ignored.
    pub fn on_sk_light(
        &self,
        guard: &mut DebounceGuard,
        previous: Option<ScorekeepingLight>,
        light: Option<ScorekeepingLight>,
        now: Instant,
    ) {
        if previous != light {
            guard.observe_scorekeeping(light, self.role.can_issue_commands(), now);
        }
    }

    /// Cooldown side effects of a Show channel transition
    pub fn on_show_light(
        &self,
        guard: &mut DebounceGuard,
        previous: Option<ShowLight>,
        light: Option<ShowLight>,
        now: Instant,
    ) {
        if previous != light {
            guard.observe_show(light, self.role.can_issue_commands(), now);
        }
    }
}

impl IndicatorView {
    /// Is the control for this action offered?
    pub fn control_enabled(&self, action: Action) -> bool {
        self.controls
            .iter()
            .any(|(a, state)| *a == action && state.is_enabled())
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let mut lines = vec![format!("[{}] {}", self.role, connection_colored(&self.connection))];

        if self.no_address {
            lines.push(format!("  {}", "No authority address set".yellow()));
        }
        if self.idle {
            lines.push(format!("  {}", "● CONNECTED".white()));
        }
        if let Some(show) = self.show {
            let text = format!("● {}", show);
            let lit = match show {
                ShowLight::ShowClear => text.green().bold(),
                ShowLight::StretchForTime => text.cyan().bold(),
                ShowLight::WindDown => text.yellow().bold(),
                ShowLight::Halt => text.red().bold(),
            };
            lines.push(format!("  SHOW  {}", lit));
        }
        if let Some(sk) = self.scorekeeping {
            let text = format!("● {}", sk);
            let lit = match sk {
                ScorekeepingLight::PotentialCard => text.yellow().bold(),
                ScorekeepingLight::ScoresReady => text.blue().bold(),
            };
            lines.push(format!("  SCORE {}", lit));
        }
        if !self.controls.is_empty() {
            let controls: Vec<String> = self
                .controls
                .iter()
                .map(|(a, state)| match state {
                    ControlState::Enabled => format!("[{}]", a).green().to_string(),
                    ControlState::Disabled => format!("[{}]", a).dimmed().to_string(),
                    ControlState::CoolingDown { remaining_ms } => {
                        format!("[{} {}s]", a, remaining_ms.div_ceil(1000)).dimmed().to_string()
                    }
                })
                .collect();
            lines.push(format!("  {}", controls.join(" ")));
        }
        lines.join("\n")
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let connection = match self.connection {
            ConnectionStatus::NotConfigured => "not_configured".to_string(),
            ConnectionStatus::Connecting => "connecting".to_string(),
            ConnectionStatus::Connected => "connected".to_string(),
            ConnectionStatus::Disconnected { failures } => format!("disconnected({})", failures),
        };
        let show = self.show.map(|l| l.kind().code()).unwrap_or("none");
        let sk = self.scorekeeping.map(|l| l.kind().code()).unwrap_or("none");
        let disabled: Vec<String> = self
            .controls
            .iter()
            .filter(|(_, state)| !state.is_enabled())
            .map(|(a, _)| a.to_string())
            .collect();
        format!(
            "role={} | connection={} | show={} | sk={} | disabled=[{}]",
            self.role,
            connection,
            show,
            sk,
            disabled.join(",")
        )
    }
}

fn connection_colored(connection: &ConnectionStatus) -> String {
    match connection {
        ConnectionStatus::NotConfigured => "NOT CONFIGURED".yellow().to_string(),
        ConnectionStatus::Connecting => "CONNECTING".dimmed().to_string(),
        ConnectionStatus::Connected => "CONNECTED".green().to_string(),
        ConnectionStatus::Disconnected { failures } => {
            format!("DISCONNECTED ({} failed polls)", failures).red().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn all_snapshots() -> Vec<Snapshot> {
        let mut out = Vec::new();
        let shows = std::iter::once(None).chain(ShowLight::ALL.iter().copied().map(Some));
        for show in shows {
            let sks = std::iter::once(None).chain(ScorekeepingLight::ALL.iter().copied().map(Some));
            for sk in sks {
                out.push(Snapshot::new(show, sk));
            }
        }
        out
    }

    #[test]
    fn test_broadcast_mirrors_both_channels() {
        let renderer = RoleRenderer::new(Role::Broadcast);
        let guard = DebounceGuard::default();
        let now = Instant::now();
        for snap in all_snapshots() {
            let view = renderer.render(ConnectionStatus::Connected, &snap, &guard, now);
            assert_eq!(view.show, snap.show_light_state);
            assert_eq!(view.scorekeeping, snap.sk_light_state);
            assert_eq!(view.idle, snap.is_clear());
            assert!(view.controls.is_empty());
        }
    }

    #[test]
    fn test_other_roles_suppress_indicators() {
        let guard = DebounceGuard::default();
        let now = Instant::now();
        let snap = Snapshot::new(Some(ShowLight::Halt), Some(ScorekeepingLight::ScoresReady));
        for role in [Role::Scorekeeper, Role::Director, Role::BackOfHouse] {
            let view = RoleRenderer::new(role).render(ConnectionStatus::Connected, &snap, &guard, now);
            assert_eq!(view.show, None);
            assert_eq!(view.scorekeeping, None);
            assert!(!view.idle);
            assert_eq!(view.connection, ConnectionStatus::Connected);
        }
    }

    #[test]
    fn test_channels_render_independently() {
        let renderer = RoleRenderer::new(Role::Broadcast);
        let guard = DebounceGuard::default();
        let now = Instant::now();
        let before = Snapshot::new(None, Some(ScorekeepingLight::PotentialCard));
        let after = Snapshot::new(Some(ShowLight::WindDown), Some(ScorekeepingLight::PotentialCard));

        let v1 = renderer.render(ConnectionStatus::Connected, &before, &guard, now);
        let v2 = renderer.render(ConnectionStatus::Connected, &after, &guard, now);
        assert_eq!(v1.scorekeeping, v2.scorekeeping);
        assert_ne!(v1.show, v2.show);
    }

    #[test]
    fn test_not_configured() {
        let renderer = RoleRenderer::new(Role::Scorekeeper);
        let guard = DebounceGuard::default();
        let view = renderer.render(ConnectionStatus::NotConfigured, &Snapshot::CLEAR, &guard, Instant::now());
        assert!(view.no_address);
        assert!(view.controls.iter().all(|(_, s)| !s.is_enabled()));
    }

    #[test]
    fn test_scorekeeper_controls_follow_guard() {
        let renderer = RoleRenderer::new(Role::Scorekeeper);
        let mut guard = DebounceGuard::new(Duration::from_secs(30));
        let now = Instant::now();
        renderer.on_sk_light(&mut guard, None, Some(ScorekeepingLight::ScoresReady), now);

        let view = renderer.render(ConnectionStatus::Connected, &Snapshot::CLEAR, &guard, now);
        assert!(!view.control_enabled(Action::ScoresReady));
        assert!(view.control_enabled(Action::PotentialCard));
        assert!(view.control_enabled(Action::Clear));

        renderer.on_sk_light(&mut guard, Some(ScorekeepingLight::ScoresReady), None, now);
        let view = renderer.render(ConnectionStatus::Connected, &Snapshot::CLEAR, &guard, now);
        assert!(view.control_enabled(Action::ScoresReady));
    }

    #[test]
    fn test_unchanged_channel_leaves_guard_alone() {
        let renderer = RoleRenderer::new(Role::Scorekeeper);
        let mut guard = DebounceGuard::new(Duration::from_secs(30));
        let now = Instant::now();
        guard.arm(Action::ScoresReady, now);
        guard.arm(Action::Halt, now);

        renderer.on_sk_light(&mut guard, None, None, now);
        renderer.on_sk_light(
            &mut guard,
            Some(ScorekeepingLight::PotentialCard),
            Some(ScorekeepingLight::PotentialCard),
            now,
        );
        renderer.on_show_light(&mut guard, Some(ShowLight::ShowClear), Some(ShowLight::ShowClear), now);
        assert!(guard.is_armed(Action::ScoresReady));
        assert!(guard.is_armed(Action::Halt));
    }

    #[test]
    fn test_broadcast_never_arms() {
        let renderer = RoleRenderer::new(Role::Broadcast);
        let mut guard = DebounceGuard::default();
        renderer.on_show_light(&mut guard, None, Some(ShowLight::Halt), Instant::now());
        assert_eq!(guard.next_deadline(), None);
    }

    #[test]
    fn test_parseable_string() {
        let renderer = RoleRenderer::new(Role::Broadcast);
        let guard = DebounceGuard::default();
        let snap = Snapshot::new(Some(ShowLight::Halt), None);
        let view = renderer.render(
            ConnectionStatus::Disconnected { failures: 2 },
            &snap,
            &guard,
            Instant::now(),
        );
        assert_eq!(
            view.to_parseable_string(),
            "role=BRD | connection=disconnected(2) | show=halt | sk=none | disabled=[]"
        );
    }
}
