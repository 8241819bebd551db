//! Core types for Stacklight

mod light;
mod snapshot;
mod role;
mod action;
mod error;

pub use light::{Origin, Kind, WireLight, LightMismatch, ScorekeepingLight, ShowLight};
pub use snapshot::{Snapshot, Channel};
pub use role::Role;
pub use action::{Action, Transition};
pub use error::{RoleError, SyncError, ConfigError, CommandError};
