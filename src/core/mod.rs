//! Core modules for Stacklight

pub mod store;
pub mod api;
pub mod client;
pub mod sync;
pub mod debounce;
pub mod render;
pub mod session;
pub mod config;

pub use store::SignalStore;
pub use api::{create_router, create_router_with_store, run_server, Ack};
pub use client::{AuthorityClient, HttpAuthority, MemoryAuthority, normalize_address};
pub use sync::{SyncLoop, SyncHandle, SyncEvent, Pacing};
pub use debounce::{DebounceGuard, ControlState};
pub use render::{RoleRenderer, IndicatorView, ConnectionStatus};
pub use session::{ObserverSession, SessionDiagnostics};
pub use config::AddressStore;
