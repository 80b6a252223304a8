//! Session-scoped push connection with automatic reconnect.
//!
//! A single driver task owns the connection: it waits the initial connect
//! delay, connects, dispatches frames until the socket closes, then sleeps
//! the [`ReconnectPolicy`] delay and connects again. Because only the driver
//! ever schedules a retry, there is never more than one pending reconnect.

use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::messages::PushEvent;
use crate::auth::{Credential, SessionBound};
use crate::notifications::{NotificationBus, NotificationEvent};
use crate::sync::RefreshTrigger;
use crate::traits::PushTransport;

/// Default delay between a close and the next connect attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default delay before the first connect of a session.
pub const DEFAULT_CONNECT_DELAY: Duration = Duration::from_millis(500);

/// Connection state of a [`PushChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushState {
    Disconnected,
    Connecting { attempt: u32 },
    Open,
    /// Torn down; never reconnects.
    Closed,
}

/// How long to wait before reconnecting.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub backoff: Backoff,
    /// Consecutive failed connects before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * 2^failures`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl ReconnectPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            backoff: Backoff::Fixed(delay),
            max_attempts: None,
        }
    }

    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self {
            backoff: Backoff::Exponential { base, max },
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Delay after `failures` consecutive failed connects.
    pub fn delay(&self, failures: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, max } => {
                let factor = 1u32.checked_shl(failures.min(31)).unwrap_or(u32::MAX);
                base.checked_mul(factor).map_or(*max, |d| d.min(*max))
            }
        }
    }

    fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts.map_or(false, |max| failures >= max)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

/// Build the push URL for a user.
pub fn push_url(ws_base: &str, user_id: &str, credential: &Credential) -> String {
    format!(
        "{}/ws/{}?token={}",
        ws_base.trim_end_matches('/'),
        urlencoding::encode(user_id),
        urlencoding::encode(credential.as_str())
    )
}

struct Driver {
    transport: Arc<dyn PushTransport>,
    url: String,
    connect_delay: Duration,
    policy: ReconnectPolicy,
    notifications: Arc<NotificationBus>,
    refresh: Option<RefreshTrigger>,
    state: Arc<watch::Sender<PushState>>,
}

impl Driver {
    async fn run(self) {
        tokio::time::sleep(self.connect_delay).await;
        let mut failures: u32 = 0;
        loop {
            self.state.send_replace(PushState::Connecting {
                attempt: failures + 1,
            });
            match self.transport.connect(&self.url).await {
                Ok(mut frames) => {
                    info!("Push channel open");
                    failures = 0;
                    self.state.send_replace(PushState::Open);
                    while let Some(frame) = frames.next().await {
                        match frame {
                            Ok(text) => self.dispatch(&text),
                            Err(e) => {
                                warn!("Push channel error: {}", e);
                                break;
                            }
                        }
                    }
                    info!("Push channel closed");
                }
                Err(e) => {
                    failures += 1;
                    warn!(attempt = failures, "Push connect failed: {}", e);
                }
            }
            self.state.send_replace(PushState::Disconnected);

            if self.policy.exhausted(failures) {
                warn!(failures, "Giving up on push channel");
                break;
            }
            let delay = self.policy.delay(failures);
            debug!(delay_ms = delay.as_millis() as u64, "Scheduling push reconnect");
            tokio::time::sleep(delay).await;
        }
    }

    fn dispatch(&self, text: &str) {
        match PushEvent::parse(text) {
            Ok(PushEvent::TransferReceived(received)) => {
                self.notifications
                    .publish(NotificationEvent::success(received.notification_text()));
                if let Some(refresh) = &self.refresh {
                    refresh.fire();
                }
            }
            Ok(PushEvent::Unknown) => debug!("Ignoring unhandled push event"),
            Err(e) => debug!("Dropping undecodable push frame: {}", e),
        }
    }
}

/// The push connection of one session.
pub struct PushChannel {
    transport: Arc<dyn PushTransport>,
    url: String,
    connect_delay: Duration,
    policy: ReconnectPolicy,
    notifications: Arc<NotificationBus>,
    refresh: Option<RefreshTrigger>,
    state: Arc<watch::Sender<PushState>>,
    driver: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl PushChannel {
    pub fn new(
        transport: Arc<dyn PushTransport>,
        url: impl Into<String>,
        notifications: Arc<NotificationBus>,
    ) -> Self {
        let (state, _) = watch::channel(PushState::Disconnected);
        Self {
            transport,
            url: url.into(),
            connect_delay: DEFAULT_CONNECT_DELAY,
            policy: ReconnectPolicy::default(),
            notifications,
            refresh: None,
            state: Arc::new(state),
            driver: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Nudge `trigger` whenever an event changes account data.
    pub fn with_refresh(mut self, trigger: RefreshTrigger) -> Self {
        self.refresh = Some(trigger);
        self
    }

    pub fn state(&self) -> PushState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PushState> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.driver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Spawn the driver. Does nothing if it is already running or the
    /// channel was closed.
    pub fn start(&self) {
        if self.closed.load(Ordering::SeqCst) {
            debug!("Push channel closed, not starting");
            return;
        }
        let mut driver = self
            .driver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if driver.as_ref().map_or(false, |handle| !handle.is_finished()) {
            debug!("Push channel already running");
            return;
        }

        let task = Driver {
            transport: self.transport.clone(),
            url: self.url.clone(),
            connect_delay: self.connect_delay,
            policy: self.policy.clone(),
            notifications: self.notifications.clone(),
            refresh: self.refresh.clone(),
            state: self.state.clone(),
        };
        *driver = Some(tokio::spawn(task.run()));
    }

    /// Stop the driver, drop the socket and any pending retry.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Some(handle) = self
            .driver
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
            info!("Push channel torn down");
        }
        self.state.send_replace(PushState::Closed);
    }
}

impl SessionBound for PushChannel {
    fn teardown(&self) {
        self.close();
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Ok(mut driver) = self.driver.lock() {
            if let Some(handle) = driver.take() {
                handle.abort();
            }
        }
    }
}
