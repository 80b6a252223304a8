//! Account state and its background synchronization.

pub mod scheduler;
pub mod state;

pub use scheduler::{RefreshTrigger, SyncScheduler, DEFAULT_SYNC_INTERVAL};
pub use state::{AccountSnapshot, AccountState};
