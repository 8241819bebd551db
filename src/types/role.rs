//! Observer roles

use serde::{Deserialize, Serialize};

use crate::types::RoleError;

/// Role of an observer session, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "SK")]
    Scorekeeper,
    #[serde(rename = "BRD")]
    Broadcast,
    #[serde(rename = "DIR")]
    Director,
    #[serde(rename = "BOH")]
    BackOfHouse,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Scorekeeper,
        Role::Broadcast,
        Role::Director,
        Role::BackOfHouse,
    ];

    /// Short code shown in the title bar
    pub fn code(&self) -> &'static str {
        match self {
            Role::Scorekeeper => "SK",
            Role::Broadcast => "BRD",
            Role::Director => "DIR",
            Role::BackOfHouse => "BOH",
        }
    }

    /// Name of this role's API endpoint
    pub fn api_endpoint(&self) -> &'static str {
        match self {
            Role::Scorekeeper => "sk",
            Role::Broadcast => "broadcast",
            Role::Director => "dir",
            Role::BackOfHouse => "boh",
        }
    }

    /// Only the broadcast role renders the indicator lights themselves
    pub fn renders_indicators(&self) -> bool {
        *self == Role::Broadcast
    }

    /// Only the scorekeeper role has action controls
    pub fn can_issue_commands(&self) -> bool {
        *self == Role::Scorekeeper
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_uppercase().as_str() {
            "SK" | "SCOREKEEPER" => Ok(Role::Scorekeeper),
            "BRD" | "BROADCAST" => Ok(Role::Broadcast),
            "DIR" | "DIRECTOR" => Ok(Role::Director),
            "BOH" | "BACK_OF_HOUSE" | "BACK-OF-HOUSE" => Ok(Role::BackOfHouse),
            _ => Err(RoleError::Unknown(value.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
