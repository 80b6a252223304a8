//! Push channel for server-initiated account events.
//!
//! The server pushes JSON events over a WebSocket bound to the signed-in
//! user. [`PushChannel`] keeps that connection alive for the lifetime of a
//! session and turns events into notifications and sync nudges.

pub mod channel;
pub mod messages;

pub use channel::{
    push_url, Backoff, PushChannel, PushState, ReconnectPolicy, DEFAULT_CONNECT_DELAY,
    DEFAULT_RECONNECT_DELAY,
};
pub use messages::{PushEvent, TransferReceived};
