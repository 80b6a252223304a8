//! Tungstenite-based push transport adapter.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;

use crate::traits::{FrameStream, PushTransport, WsError};

/// Push transport using tokio-tungstenite.
///
/// Text frames are passed through; ping/pong and binary frames are skipped.
/// A close frame or the end of the socket ends the stream.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use genesis::adapters::TungstenitePushTransport;
/// use genesis::traits::PushTransport;
///
/// let transport = TungstenitePushTransport::new();
/// let mut frames = transport.connect("ws://localhost:8000/ws/u1?token=t").await?;
/// while let Some(frame) = frames.next().await {
///     println!("{:?}", frame);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TungstenitePushTransport;

impl TungstenitePushTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushTransport for TungstenitePushTransport {
    async fn connect(&self, url: &str) -> Result<FrameStream, WsError> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let frames = futures::stream::unfold(ws_stream, |mut ws| async move {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => return Some((Ok(text), ws)),
                    Some(Ok(Message::Close(frame))) => {
                        debug!("Push socket closed by server: {:?}", frame);
                        return None;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Some((Err(WsError::Transport(e.to_string())), ws)),
                    None => return None,
                }
            }
        });

        Ok(Box::pin(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_failure() {
        let transport = TungstenitePushTransport::new();
        let result = transport.connect("ws://127.0.0.1:59999/ws/u1?token=t").await;
        assert!(matches!(result, Err(WsError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let transport = TungstenitePushTransport::new();
        assert!(transport.connect("not a url").await.is_err());
    }
}
