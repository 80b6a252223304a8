//! Test doubles. Every double is `Clone` and clones share state, so a
//! test keeps one handle while the client owns another.

pub mod credentials;
pub mod http;
pub mod websocket;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use websocket::MockPushTransport;
