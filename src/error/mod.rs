//! Unified error handling for the Genesis client.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Network, Auth, Api and System errors
//! - **Unified Error Type**: `GenesisError` consolidates all error types
//! - **Result Type Alias**: `GenesisResult<T>` for consistent return types
//!
//! # Error Categories
//!
//! | Category | Description | Handling |
//! |----------|-------------|----------|
//! | Network | Connection, DNS, timeout | Logged; next attempt proceeds |
//! | Auth | Credential missing or rejected | Session cleared |
//! | Server | Backend errors (5xx) | Logged; next attempt proceeds |
//! | User | Business rejection, bad input | Shown as a notification |
//! | Protocol | Malformed payloads | Dropped with a debug log |
//! | System | Filesystem errors | Surfaced |
//! | Configuration | Bad environment settings | Surfaced at startup |

mod api;
mod auth;
mod category;
mod genesis_error;
mod network;
mod result;
mod system;

pub use api::{extract_detail, ApiError, DEFAULT_CONVERT_FAILURE, DEFAULT_TRANSFER_FAILURE};
pub use auth::AuthError;
pub use category::ErrorCategory;
pub use genesis_error::GenesisError;
pub use network::NetworkError;
pub use result::{GenesisResult, ResultExt};
pub use system::SystemError;
