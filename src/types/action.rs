//! Operator actions and the commands they map to

use serde::{Deserialize, Serialize};

use crate::types::{Channel, ScorekeepingLight, ShowLight};

/// Command an observer can issue against the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PotentialCard,
    ScoresReady,
    ShowGo,
    Halt,
    Clear,
}

/// What an action does to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Clear,
    Scorekeeping(ScorekeepingLight),
    Show(ShowLight),
}

impl Action {
    /// Actions protected by a cooldown
    pub const GUARDED: [Action; 4] = [
        Action::PotentialCard,
        Action::ScoresReady,
        Action::ShowGo,
        Action::Halt,
    ];

    /// Command endpoint on the authority
    pub fn path(&self) -> &'static str {
        match self {
            Action::PotentialCard => "/api/scorekeeper/potential_card",
            Action::ScoresReady => "/api/scorekeeper/scores_ready",
            Action::ShowGo => "/api/scorekeeper/show_go",
            Action::Halt => "/api/scorekeeper/show_halt",
            Action::Clear => "/api/scorekeeper/clear",
        }
    }

    /// Channel the action writes (Clear writes both)
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Action::PotentialCard | Action::ScoresReady => Some(Channel::Scorekeeping),
            Action::ShowGo | Action::Halt => Some(Channel::Show),
            Action::Clear => None,
        }
    }

    pub fn is_guarded(&self) -> bool {
        *self != Action::Clear
    }

    pub fn transition(&self) -> Transition {
        match self {
            Action::PotentialCard => Transition::Scorekeeping(ScorekeepingLight::PotentialCard),
            Action::ScoresReady => Transition::Scorekeeping(ScorekeepingLight::ScoresReady),
            Action::ShowGo => Transition::Show(ShowLight::ShowClear),
            Action::Halt => Transition::Show(ShowLight::Halt),
            Action::Clear => Transition::Clear,
        }
    }

    /// Parse an operator keyword typed at the observer prompt
    pub fn from_keyword(word: &str) -> Option<Action> {
        match word.trim().to_ascii_lowercase().as_str() {
            "card" | "potential_card" => Some(Action::PotentialCard),
            "scores" | "scores_ready" => Some(Action::ScoresReady),
            "go" | "show_go" => Some(Action::ShowGo),
            "halt" | "show_halt" => Some(Action::Halt),
            "clear" => Some(Action::Clear),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::PotentialCard => "potential card",
            Action::ScoresReady => "scores ready",
            Action::ShowGo => "show go",
            Action::Halt => "halt",
            Action::Clear => "clear",
        };
        write!(f, "{}", name)
    }
}
