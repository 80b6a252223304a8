//! Request gateway.
//!
//! Every outbound API call goes through [`RequestGateway::send`], which is
//! the only place that decides what `Authorization` header goes out and the
//! only place that reacts to the server rejecting the session credential.

pub mod api;

pub use api::GenesisApi;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{Credential, CredentialStore, EndReason, SessionRegistry};
use crate::error::{AuthError, GenesisResult};
use crate::traits::{HttpClient, Request, Response};

const AUTHORIZATION: &str = "Authorization";

/// Wraps the HTTP client with credential injection and forced logout.
pub struct RequestGateway {
    client: Arc<dyn HttpClient>,
    base_url: String,
    credentials: Arc<CredentialStore>,
    sessions: Arc<SessionRegistry>,
}

impl RequestGateway {
    pub fn new(
        client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        credentials: Arc<CredentialStore>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            sessions,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a path against the API base URL. Absolute URLs pass through.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// Dispatch a request.
    ///
    /// The current credential is attached unless the caller already set an
    /// `Authorization` header. If the server answers 401 to a request that
    /// carried the attached credential, the session is ended and the
    /// credential cleared before this returns
    /// [`AuthError::CredentialRejected`]. Every other response, success or
    /// not, is returned as-is.
    pub async fn send(&self, request: Request) -> GenesisResult<Response> {
        self.dispatch(request, true).await
    }

    /// Dispatch a request without the session credential, for calls such
    /// as login that must not speak for the active session. A 401 here is
    /// returned like any other response.
    pub async fn send_anonymous(&self, request: Request) -> GenesisResult<Response> {
        self.dispatch(request, false).await
    }

    async fn dispatch(&self, mut request: Request, attach: bool) -> GenesisResult<Response> {
        request.url = self.resolve(&request.url);

        let epoch = self.sessions.active_epoch();
        let injected = if !attach || request.has_header(AUTHORIZATION) {
            None
        } else {
            self.credentials.current()
        };
        if let Some(credential) = &injected {
            request = request.with_header(AUTHORIZATION, credential.bearer());
        }

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            authenticated = request.has_header(AUTHORIZATION),
            "Dispatching request"
        );

        let response = self.client.send(&request).await?;

        if response.is_unauthorized() {
            if let Some(credential) = injected {
                warn!(url = %request.url, "Credential rejected, ending session");
                // Detached so it completes even when the logout tears down
                // the task that issued this request.
                let logout = tokio::spawn(force_logout(
                    self.sessions.clone(),
                    self.credentials.clone(),
                    epoch,
                    credential,
                ));
                if let Err(e) = logout.await {
                    warn!("Forced logout task failed: {}", e);
                }
                return Err(AuthError::CredentialRejected.into());
            }
            debug!(url = %request.url, "401 on a request without the session credential");
        }

        Ok(response)
    }
}

async fn force_logout(
    sessions: Arc<SessionRegistry>,
    credentials: Arc<CredentialStore>,
    epoch: Option<u64>,
    rejected: Credential,
) {
    let ended = match epoch {
        Some(epoch) => sessions.end_if_current(epoch, EndReason::CredentialRejected),
        None => false,
    };
    // Skip the clear if a newer login already replaced the credential.
    if ended || credentials.current().as_ref() == Some(&rejected) {
        if let Err(e) = credentials.clear().await {
            warn!("Failed to clear persisted credential: {}", e);
        }
    }
}
