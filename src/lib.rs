//! Stacklight: shared two-channel stack light for a live event
//!
//! One authority process holds the Show and Scorekeeping channels and
//! serves them over HTTP. Observers (scorekeeper, broadcast, director,
//! back-of-house) poll the authority, render role-specific indicators and
//! issue commands guarded by a local cooldown.

pub mod core;
pub mod types;

// =============================================================================
// TIMING
// =============================================================================

/// Cooldown before a guarded control re-enables on its own (milliseconds)
pub const DEBOUNCE_COOLDOWN_MS: u64 = 30_000;

/// Minimum delay between two successful polls (milliseconds)
pub const MIN_POLL_INTERVAL_MS: u64 = 250;

/// Delay before polling again after a failed fetch (milliseconds)
pub const FAILURE_RETRY_MS: u64 = 1_000;

/// Per-request timeout used by the HTTP authority client (milliseconds)
pub const REQUEST_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// AUTHORITY
// =============================================================================

/// Port the authority listens on when neither `--addr` nor `PORT` is given
pub const DEFAULT_PORT: u16 = 9000;

/// Snapshot read endpoint
pub const PATH_BROADCAST: &str = "/api/broadcast";

/// Liveness probe endpoint
pub const PATH_PING: &str = "/api/ping";

// =============================================================================
// OBSERVER
// =============================================================================

/// Default location of the persisted authority address
pub const DEFAULT_CONFIG_PATH: &str = "./stacklight_observer.json";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
