//! Genesis - session and data-sync client for the Genesis wallet dashboard
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod app;
pub mod auth;
pub mod cli;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notifications;
pub mod startup;
pub mod sync;
pub mod traits;
pub mod websocket;

pub use app::GenesisClient;
pub use error::{GenesisError, GenesisResult};
