//! Transient user-facing notifications.
//!
//! The bus holds at most one displayed [`NotificationEvent`]. Publishing
//! replaces whatever is shown and restarts the expiry timer; the event is
//! removed automatically once the display window passes.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Default time a notification stays on screen.
pub const DEFAULT_DISPLAY_WINDOW: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

/// Single-slot notification display with automatic expiry.
pub struct NotificationBus {
    slot: Arc<watch::Sender<Option<NotificationEvent>>>,
    expiry: Mutex<Option<JoinHandle<()>>>,
    window: Duration,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_DISPLAY_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            expiry: Mutex::new(None),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Show `event`, replacing the current one, and schedule its removal.
    ///
    /// Must be called from within a tokio runtime.
    pub fn publish(&self, event: NotificationEvent) {
        info!(severity = %event.severity, "{}", event.message);
        let id = event.id;
        let mut expiry = self
            .expiry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = expiry.take() {
            previous.abort();
        }
        self.slot.send_replace(Some(event));

        let slot = self.slot.clone();
        let window = self.window;
        *expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Only clear the event this timer was scheduled for.
            let cleared = slot.send_if_modified(|current| match current {
                Some(shown) if shown.id == id => {
                    *current = None;
                    true
                }
                _ => false,
            });
            if cleared {
                debug!(%id, "Notification expired");
            }
        }));
    }

    /// The notification currently on screen.
    pub fn current(&self) -> Option<NotificationEvent> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<NotificationEvent>> {
        self.slot.subscribe()
    }

    /// Remove the displayed notification now.
    pub fn dismiss(&self) {
        if let Some(handle) = self
            .expiry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
        self.slot.send_replace(None);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NotificationBus {
    fn drop(&mut self) {
        if let Ok(mut expiry) = self.expiry.lock() {
            if let Some(handle) = expiry.take() {
                handle.abort();
            }
        }
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationBus")
            .field("current", &self.current())
            .field("window", &self.window)
            .finish()
    }
}
