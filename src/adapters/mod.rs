//! Production and test implementations of the I/O seams in [`crate::traits`].
//!
//! [`GenesisClient::from_config`](crate::app::GenesisClient::from_config)
//! wires the reqwest, tungstenite and file-backed adapters together; tests
//! swap in the doubles from [`mock`].

pub mod file_credentials;
pub mod mock;
pub mod reqwest_http;
pub mod tungstenite_ws;

pub use file_credentials::{FileCredentialsProvider, TOKEN_KEY};
pub use mock::{InMemoryCredentials, MockHttpClient, MockPushTransport};
pub use reqwest_http::ReqwestHttpClient;
pub use tungstenite_ws::TungstenitePushTransport;
