//! Mock push transport for testing.
//!
//! Each `connect` opens a fresh in-memory connection. Tests push frames into
//! the latest connection and close it to simulate server disconnects.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::traits::{FrameStream, PushTransport, WsError};

type FrameSender = mpsc::UnboundedSender<Result<String, WsError>>;

/// Mock push transport for testing.
///
/// # Example
///
/// ```ignore
/// use genesis::adapters::mock::MockPushTransport;
///
/// let transport = MockPushTransport::new();
/// // ... start a PushChannel with it ...
/// transport.send_frame(r#"{"event":"transfer_received","amount":10,"currency":"USD"}"#);
/// transport.close();
/// assert_eq!(transport.connect_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPushTransport {
    /// URLs passed to `connect`, in order
    connects: Arc<Mutex<Vec<String>>>,
    /// Sender half of the latest connection
    current: Arc<Mutex<Option<FrameSender>>>,
    /// Whether connect should fail
    connect_should_fail: Arc<Mutex<bool>>,
}

impl MockPushTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connect_should_fail(&self, should_fail: bool) {
        *self.connect_should_fail.lock().unwrap() = should_fail;
    }

    /// Number of connect attempts, failed ones included.
    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }

    /// URLs passed to `connect`, in order.
    pub fn connected_urls(&self) -> Vec<String> {
        self.connects.lock().unwrap().clone()
    }

    /// Deliver a text frame on the latest connection.
    ///
    /// Returns false if there is no open connection.
    pub fn send_frame(&self, text: &str) -> bool {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.send(Ok(text.to_string())).is_ok(),
            None => false,
        }
    }

    /// Deliver a transport error on the latest connection.
    pub fn send_error(&self, err: WsError) -> bool {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.send(Err(err)).is_ok(),
            None => false,
        }
    }

    /// Close the latest connection from the server side.
    pub fn close(&self) {
        self.current.lock().unwrap().take();
    }

    /// True if the client side dropped the latest connection, or there is none.
    pub fn is_connection_closed(&self) -> bool {
        match self.current.lock().unwrap().as_ref() {
            Some(tx) => tx.is_closed(),
            None => true,
        }
    }
}

#[async_trait]
impl PushTransport for MockPushTransport {
    async fn connect(&self, url: &str) -> Result<FrameStream, WsError> {
        self.connects.lock().unwrap().push(url.to_string());
        if *self.connect_should_fail.lock().unwrap() {
            return Err(WsError::ConnectionFailed("Mock connect failure".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.current.lock().unwrap() = Some(tx);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}
