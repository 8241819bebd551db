//! Snapshot of both channels

use serde::{Deserialize, Serialize};

use crate::types::{ScorekeepingLight, ShowLight};

/// One of the two independent signal slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Show,
    Scorekeeping,
}

/// Immutable read of both channels at one instant
///
/// Serializes to the `/api/broadcast` body:
/// `{ "show_light_state": null | Light, "sk_light_state": null | Light }`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    pub show_light_state: Option<ShowLight>,
    pub sk_light_state: Option<ScorekeepingLight>,
}

impl Snapshot {
    /// Both channels cleared
    pub const CLEAR: Snapshot = Snapshot {
        show_light_state: None,
        sk_light_state: None,
    };

    pub fn new(show: Option<ShowLight>, sk: Option<ScorekeepingLight>) -> Self {
        Self {
            show_light_state: show,
            sk_light_state: sk,
        }
    }

    /// No active light in either channel
    pub fn is_clear(&self) -> bool {
        self.show_light_state.is_none() && self.sk_light_state.is_none()
    }

    /// Is the given channel empty?
    pub fn channel_is_clear(&self, channel: Channel) -> bool {
        match channel {
            Channel::Show => self.show_light_state.is_none(),
            Channel::Scorekeeping => self.sk_light_state.is_none(),
        }
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = self
            .show_light_state
            .map(|l| l.kind().code())
            .unwrap_or("none");
        let sk = self
            .sk_light_state
            .map(|l| l.kind().code())
            .unwrap_or("none");
        write!(f, "show={} sk={}", show, sk)
    }
}
