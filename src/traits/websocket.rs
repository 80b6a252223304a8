//! Push transport trait abstraction.
//!
//! The push channel only ever reads from the server, so a connection is
//! modelled as a stream of text frames. Dropping the stream closes the
//! underlying socket.

use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;

/// Stream of inbound text frames. Ends when the server closes the connection.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, WsError>> + Send>>;

/// Push connection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsError {
    /// The handshake did not complete
    ConnectionFailed(String),
    /// The socket failed after it was open
    Transport(String),
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WsError::ConnectionFailed(msg) => write!(f, "push connect failed: {}", msg),
            WsError::Transport(msg) => write!(f, "push socket error: {}", msg),
        }
    }
}

impl std::error::Error for WsError {}

/// Opens push connections.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use genesis::traits::PushTransport;
///
/// async fn drain<T: PushTransport>(transport: &T) {
///     let mut frames = transport.connect("ws://localhost:8000/ws/u1?token=t").await?;
///     while let Some(Ok(text)) = frames.next().await {
///         println!("{}", text);
///     }
/// }
/// ```
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Open a connection to `url` and return its inbound frame stream.
    async fn connect(&self, url: &str) -> Result<FrameStream, WsError>;
}
