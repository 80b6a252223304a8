//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP request dispatch
//! - [`CredentialsProvider`] - Durable credential storage
//! - [`PushTransport`] - Realtime push connections

pub mod credentials;
pub mod http;
pub mod websocket;

pub use credentials::{CredentialsError, CredentialsProvider};
pub use http::{Headers, HttpClient, HttpError, Method, Request, Response};
pub use websocket::{FrameStream, PushTransport, WsError};
