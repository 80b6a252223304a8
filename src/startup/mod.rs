//! Client startup: configuration and session bootstrap.
//!
//! # Components
//!
//! - [`config`] - Client configuration and environment overrides
//! - [`bootstrap`] - Session restore, login and logout
//!
//! # Usage
//!
//! ```ignore
//! use genesis::startup::ClientConfig;
//! use genesis::app::GenesisClient;
//!
//! let client = GenesisClient::from_config(ClientConfig::from_env())?;
//! let state = client.start().await;
//! ```

pub mod bootstrap;
pub mod config;

pub use bootstrap::SessionBootstrapper;
pub use config::{derive_ws_url, ClientConfig, ConfigError, DEFAULT_API_URL};
