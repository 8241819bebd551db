//! DebounceGuard: per-action cooldown for operator controls
//!
//! Slot transitions:
//! - Idle → Disabled: local click, before any timer is set
//! - Idle/Disabled → Armed: timer started (only when not already armed)
//! - Armed → Idle: deadline reached, or channel went from lit to clear
//! - Disabled → Idle: channel went from lit to clear
//!
//! The `observe_*` folds expect channel transitions, not every polled value.
//!
//! Time is passed in by the caller so the guard stays deterministic.

use std::time::Duration;
use tokio::time::Instant;

use crate::types::{Action, Channel, ScorekeepingLight, ShowLight};
use crate::DEBOUNCE_COOLDOWN_MS;

/// State of one guarded control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Idle,
    Disabled,
    Armed { deadline: Instant },
}

/// What an operator sees for a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ControlState {
    Enabled,
    Disabled,
    CoolingDown { remaining_ms: u64 },
}

impl ControlState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, ControlState::Enabled)
    }
}

/// Independent cooldown slots for potential-card, scores-ready, show-go and halt
#[derive(Debug, Clone)]
pub struct DebounceGuard {
    cooldown: Duration,
    slots: [Slot; 4],
}

impl Default for DebounceGuard {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_COOLDOWN_MS))
    }
}

fn slot_index(action: Action) -> Option<usize> {
    match action {
        Action::PotentialCard => Some(0),
        Action::ScoresReady => Some(1),
        Action::ShowGo => Some(2),
        Action::Halt => Some(3),
        Action::Clear => None,
    }
}

fn channel_actions(channel: Channel) -> [Action; 2] {
    match channel {
        Channel::Scorekeeping => [Action::PotentialCard, Action::ScoresReady],
        Channel::Show => [Action::ShowGo, Action::Halt],
    }
}

impl DebounceGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            slots: [Slot::Idle; 4],
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Is the control offered to the operator? Unguarded actions always are.
    pub fn is_enabled(&self, action: Action) -> bool {
        slot_index(action).map_or(true, |i| self.slots[i] == Slot::Idle)
    }

    /// Is a timer running for this action?
    pub fn is_armed(&self, action: Action) -> bool {
        slot_index(action).map_or(false, |i| matches!(self.slots[i], Slot::Armed { .. }))
    }

    pub fn control_state(&self, action: Action, now: Instant) -> ControlState {
        match slot_index(action).map(|i| self.slots[i]) {
            None | Some(Slot::Idle) => ControlState::Enabled,
            Some(Slot::Disabled) => ControlState::Disabled,
            Some(Slot::Armed { deadline }) => ControlState::CoolingDown {
                remaining_ms: deadline.saturating_duration_since(now).as_millis() as u64,
            },
        }
    }

    /// Disable a control without starting its timer
    pub fn disable(&mut self, action: Action) -> bool {
        let Some(i) = slot_index(action) else {
            return false;
        };
        if self.slots[i] == Slot::Idle {
            self.slots[i] = Slot::Disabled;
            return true;
        }
        false
    }

    /// Start the cooldown unless one is already running
    pub fn arm(&mut self, action: Action, now: Instant) -> bool {
        let Some(i) = slot_index(action) else {
            return false;
        };
        if matches!(self.slots[i], Slot::Armed { .. }) {
            return false;
        }
        self.slots[i] = Slot::Armed {
            deadline: now + self.cooldown,
        };
        tracing::debug!(%action, cooldown_ms = self.cooldown.as_millis() as u64, "control armed");
        true
    }

    /// Re-enable a control immediately
    pub fn cancel(&mut self, action: Action) -> bool {
        let Some(i) = slot_index(action) else {
            return false;
        };
        if self.slots[i] == Slot::Idle {
            return false;
        }
        self.slots[i] = Slot::Idle;
        tracing::debug!(%action, "control re-enabled early");
        true
    }

    /// Re-enable every control of a channel; returns the ones that changed
    pub fn cancel_channel(&mut self, channel: Channel) -> Vec<Action> {
        channel_actions(channel)
            .into_iter()
            .filter(|a| self.cancel(*a))
            .collect()
    }

    /// Re-enable every control whose deadline has passed
    pub fn expire(&mut self, now: Instant) -> Vec<Action> {
        let mut expired = Vec::new();
        for action in Action::GUARDED {
            if let Some(i) = slot_index(action) {
                if let Slot::Armed { deadline } = self.slots[i] {
                    if deadline <= now {
                        self.slots[i] = Slot::Idle;
                        expired.push(action);
                    }
                }
            }
        }
        if !expired.is_empty() {
            tracing::debug!(?expired, "cooldowns expired");
        }
        expired
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .filter_map(|s| match s {
                Slot::Armed { deadline } => Some(*deadline),
                _ => None,
            })
            .min()
    }

    /// Fold a Scorekeeping channel transition into the guard
    ///
    /// A lit channel cancels its sibling control and, when `arm` is set,
    /// starts the cooldown of the matching control. An empty channel
    /// re-enables both.
    pub fn observe_scorekeeping(&mut self, light: Option<ScorekeepingLight>, arm: bool, now: Instant) {
        match light {
            None => {
                self.cancel_channel(Channel::Scorekeeping);
            }
            Some(ScorekeepingLight::PotentialCard) => {
                self.cancel(Action::ScoresReady);
                if arm {
                    self.arm(Action::PotentialCard, now);
                }
            }
            Some(ScorekeepingLight::ScoresReady) => {
                self.cancel(Action::PotentialCard);
                if arm {
                    self.arm(Action::ScoresReady, now);
                }
            }
        }
    }

    /// Fold a Show channel transition into the guard
    pub fn observe_show(&mut self, light: Option<ShowLight>, arm: bool, now: Instant) {
        match light {
            None => {
                self.cancel_channel(Channel::Show);
            }
            Some(ShowLight::ShowClear) => {
                self.cancel(Action::Halt);
                if arm {
                    self.arm(Action::ShowGo, now);
                }
            }
            Some(ShowLight::Halt) => {
                self.cancel(Action::ShowGo);
                if arm {
                    self.arm(Action::Halt, now);
                }
            }
            Some(ShowLight::StretchForTime) | Some(ShowLight::WindDown) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(30);

    #[test]
    fn test_clear_is_never_guarded() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        assert!(!guard.arm(Action::Clear, Instant::now()));
        assert!(guard.is_enabled(Action::Clear));
    }

    #[test]
    fn test_expires_exactly_at_cooldown() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        assert!(guard.arm(Action::ScoresReady, start));
        assert!(!guard.is_enabled(Action::ScoresReady));

        let almost = start + COOLDOWN - Duration::from_millis(1);
        assert!(guard.expire(almost).is_empty());
        assert!(!guard.is_enabled(Action::ScoresReady));

        assert_eq!(guard.expire(start + COOLDOWN), vec![Action::ScoresReady]);
        assert!(guard.is_enabled(Action::ScoresReady));
    }

    #[test]
    fn test_arm_only_when_not_set() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        assert!(guard.arm(Action::Halt, start));
        assert!(!guard.arm(Action::Halt, start + Duration::from_secs(10)));
        assert_eq!(guard.next_deadline(), Some(start + COOLDOWN));
    }

    #[test]
    fn test_disabled_then_armed() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        assert!(guard.disable(Action::ShowGo));
        assert_eq!(guard.control_state(Action::ShowGo, start), ControlState::Disabled);
        assert_eq!(guard.next_deadline(), None);

        assert!(guard.arm(Action::ShowGo, start));
        assert_eq!(
            guard.control_state(Action::ShowGo, start + Duration::from_secs(10)),
            ControlState::CoolingDown { remaining_ms: 20_000 }
        );
    }

    #[test]
    fn test_slots_are_independent() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        guard.arm(Action::PotentialCard, start);
        guard.arm(Action::Halt, start + Duration::from_secs(5));

        assert_eq!(guard.expire(start + COOLDOWN), vec![Action::PotentialCard]);
        assert!(!guard.is_enabled(Action::Halt));
        assert!(guard.is_enabled(Action::ScoresReady));
    }

    #[test]
    fn test_clear_channel_wins_over_cooldown() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        guard.arm(Action::PotentialCard, start);
        guard.disable(Action::ScoresReady);
        guard.arm(Action::ShowGo, start);

        guard.observe_scorekeeping(None, true, start + Duration::from_secs(1));
        assert!(guard.is_enabled(Action::PotentialCard));
        assert!(guard.is_enabled(Action::ScoresReady));
        assert!(!guard.is_enabled(Action::ShowGo));
    }

    #[test]
    fn test_observed_light_arms_and_cancels_sibling() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        let start = Instant::now();
        guard.observe_scorekeeping(Some(ScorekeepingLight::PotentialCard), true, start);
        assert!(guard.is_armed(Action::PotentialCard));

        guard.observe_scorekeeping(Some(ScorekeepingLight::ScoresReady), true, start);
        assert!(guard.is_enabled(Action::PotentialCard));
        assert!(guard.is_armed(Action::ScoresReady));

        guard.observe_show(Some(ShowLight::Halt), true, start);
        guard.observe_show(Some(ShowLight::WindDown), true, start);
        assert!(guard.is_armed(Action::Halt));
        guard.observe_show(Some(ShowLight::ShowClear), true, start);
        assert!(guard.is_enabled(Action::Halt));
        assert!(guard.is_armed(Action::ShowGo));
    }

    #[test]
    fn test_observation_without_arming() {
        let mut guard = DebounceGuard::new(COOLDOWN);
        guard.observe_show(Some(ShowLight::Halt), false, Instant::now());
        assert!(guard.is_enabled(Action::Halt));
        assert_eq!(guard.next_deadline(), None);
    }
}
