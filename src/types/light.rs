//! Stack light signal values
//!
//! A light pairs an Origin with a Kind. Each channel gets its own sum type
//! so a Scorekeeper light can never carry a Show kind and vice versa; the
//! `{origin, kind}` pairing only exists on the wire.

use serde::{Deserialize, Serialize};

/// Which subsystem is entitled to produce a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Scorekeeper,
    Show,
}

/// Signal identity, partitioned by channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    // Scorekeeping channel
    PotentialCard,
    ScoresReady,
    // Show channel
    ShowClear,
    StretchForTime,
    WindDown,
    Halt,
}

impl Kind {
    /// Origin entitled to produce this kind
    pub fn origin(&self) -> Origin {
        match self {
            Kind::PotentialCard | Kind::ScoresReady => Origin::Scorekeeper,
            Kind::ShowClear | Kind::StretchForTime | Kind::WindDown | Kind::Halt => Origin::Show,
        }
    }

    /// Wire code
    pub fn code(&self) -> &'static str {
        match self {
            Kind::PotentialCard => "potential_card",
            Kind::ScoresReady => "scores_ready",
            Kind::ShowClear => "show_clear",
            Kind::StretchForTime => "stretch_for_time",
            Kind::WindDown => "wind_down",
            Kind::Halt => "halt",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// `{origin, kind}` as it appears in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLight {
    pub origin: Origin,
    pub kind: Kind,
}

/// Why a wire light was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightMismatch {
    pub expected: Origin,
    pub found: WireLight,
}

impl std::fmt::Display for LightMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "light {{origin: {:?}, kind: {}}} does not belong on the {:?} channel",
            self.found.origin, self.found.kind, self.expected
        )
    }
}

/// Light occupying the Scorekeeping channel (origin is always Scorekeeper)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireLight", into = "WireLight")]
pub enum ScorekeepingLight {
    PotentialCard,
    ScoresReady,
}

impl ScorekeepingLight {
    pub const ALL: [ScorekeepingLight; 2] = [Self::PotentialCard, Self::ScoresReady];

    pub fn origin(&self) -> Origin {
        Origin::Scorekeeper
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::PotentialCard => Kind::PotentialCard,
            Self::ScoresReady => Kind::ScoresReady,
        }
    }
}

impl From<ScorekeepingLight> for WireLight {
    fn from(light: ScorekeepingLight) -> Self {
        WireLight { origin: light.origin(), kind: light.kind() }
    }
}

impl TryFrom<WireLight> for ScorekeepingLight {
    type Error = LightMismatch;

    fn try_from(wire: WireLight) -> Result<Self, Self::Error> {
        let mismatch = LightMismatch { expected: Origin::Scorekeeper, found: wire };
        if wire.origin != Origin::Scorekeeper {
            return Err(mismatch);
        }
        match wire.kind {
            Kind::PotentialCard => Ok(Self::PotentialCard),
            Kind::ScoresReady => Ok(Self::ScoresReady),
            _ => Err(mismatch),
        }
    }
}

impl std::fmt::Display for ScorekeepingLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PotentialCard => "POTENTIAL CARD",
            Self::ScoresReady => "SCORES READY",
        };
        write!(f, "{}", name)
    }
}

/// Light occupying the Show channel (origin is always Show)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireLight", into = "WireLight")]
pub enum ShowLight {
    ShowClear,
    StretchForTime,
    WindDown,
    Halt,
}

impl ShowLight {
    pub const ALL: [ShowLight; 4] = [Self::ShowClear, Self::StretchForTime, Self::WindDown, Self::Halt];

    pub fn origin(&self) -> Origin {
        Origin::Show
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::ShowClear => Kind::ShowClear,
            Self::StretchForTime => Kind::StretchForTime,
            Self::WindDown => Kind::WindDown,
            Self::Halt => Kind::Halt,
        }
    }
}

impl From<ShowLight> for WireLight {
    fn from(light: ShowLight) -> Self {
        WireLight { origin: light.origin(), kind: light.kind() }
    }
}

impl TryFrom<WireLight> for ShowLight {
    type Error = LightMismatch;

    fn try_from(wire: WireLight) -> Result<Self, Self::Error> {
        let mismatch = LightMismatch { expected: Origin::Show, found: wire };
        if wire.origin != Origin::Show {
            return Err(mismatch);
        }
        match wire.kind {
            Kind::ShowClear => Ok(Self::ShowClear),
            Kind::StretchForTime => Ok(Self::StretchForTime),
            Kind::WindDown => Ok(Self::WindDown),
            Kind::Halt => Ok(Self::Halt),
            _ => Err(mismatch),
        }
    }
}

impl std::fmt::Display for ShowLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ShowClear => "GO",
            Self::StretchForTime => "STRETCH",
            Self::WindDown => "WIND DOWN",
            Self::Halt => "HALT",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_origin_partition() {
        for light in ScorekeepingLight::ALL {
            assert_eq!(light.kind().origin(), Origin::Scorekeeper);
        }
        for light in ShowLight::ALL {
            assert_eq!(light.kind().origin(), Origin::Show);
        }
    }

    #[test]
    fn test_wire_form() {
        let json = serde_json::to_string(&ScorekeepingLight::PotentialCard).unwrap();
        assert_eq!(json, r#"{"origin":"scorekeeper","kind":"potential_card"}"#);

        let json = serde_json::to_string(&ShowLight::StretchForTime).unwrap();
        assert_eq!(json, r#"{"origin":"show","kind":"stretch_for_time"}"#);
    }

    #[test]
    fn test_mismatched_origin_rejected() {
        let bad = r#"{"origin":"scorekeeper","kind":"halt"}"#;
        assert!(serde_json::from_str::<ScorekeepingLight>(bad).is_err());
        assert!(serde_json::from_str::<ShowLight>(bad).is_err());

        let bad = r#"{"origin":"show","kind":"scores_ready"}"#;
        assert!(serde_json::from_str::<ShowLight>(bad).is_err());
    }

    #[test]
    fn test_wrong_channel_rejected() {
        let sk = r#"{"origin":"scorekeeper","kind":"scores_ready"}"#;
        assert_eq!(
            serde_json::from_str::<ScorekeepingLight>(sk).unwrap(),
            ScorekeepingLight::ScoresReady
        );
        assert!(serde_json::from_str::<ShowLight>(sk).is_err());
    }
}
