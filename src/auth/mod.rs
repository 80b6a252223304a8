//! Authentication module for the Genesis client.
//!
//! - Credential persistence and the in-memory [`CredentialStore`]
//! - Session ownership and session-bound component teardown

pub mod credentials;
pub mod session;

pub use credentials::{Credential, CredentialStore};
pub use session::{end_session, AuthState, EndReason, Session, SessionBound, SessionRegistry};
