//! Authenticated Session
//!
//! Logs in with the challenge/response scheme and attaches the session token
//! to every authenticated request.
//!
//! # Login
//!
//! ```text
//! GET  login/          -> {challenge}
//! POST login/session/  {app_id, password = hex(HMAC-SHA1(app_token, challenge))}
//!                      -> {session_token}
//! ```
//!
//! # Refresh and retry
//!
//! - A request failing with `auth_required` or `invalid_token` triggers a
//!   refresh and is retried once. A second auth failure is returned as
//!   [`ExporterError::SessionRejected`].
//! - Refreshes are serialized by an async mutex. A refresh requested less
//!   than 5 seconds after the previous one completed does nothing, so a burst
//!   of expired requests logs in only once.
//! - The current token is read through an atomic pointer. A request keeps the
//!   token snapshot it was sent with even if a refresh swaps it meanwhile.

use crate::error::{ExporterError, Result};
use crate::freebox::api::FreeboxApi;
use crate::freebox::transport::Transport;
use crate::freebox::types::{LoginChallenge, SessionOpened, SessionRequest};
use arc_swap::ArcSwapOption;
use ring::hmac;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Minimum delay between two effective logins
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Login password for `challenge`
pub fn password(app_token: &str, challenge: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, app_token.as_bytes());
    hex::encode(hmac::sign(&key, challenge.as_bytes()).as_ref())
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
}

pub struct Session {
    transport: Arc<dyn Transport>,
    api: FreeboxApi,
    app_id: String,
    app_token: SecretString,
    token: ArcSwapOption<String>,
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl Session {
    /// Create a session without logging in yet
    pub fn new(
        transport: Arc<dyn Transport>,
        api: FreeboxApi,
        app_id: impl Into<String>,
        app_token: SecretString,
    ) -> Self {
        Self {
            transport,
            api,
            app_id: app_id.into(),
            app_token,
            token: ArcSwapOption::empty(),
            last_refresh: Mutex::new(None),
            min_refresh_interval: MIN_REFRESH_INTERVAL,
        }
    }

    /// Create a session and log in immediately
    pub async fn open(
        transport: Arc<dyn Transport>,
        api: FreeboxApi,
        app_id: impl Into<String>,
        app_token: SecretString,
    ) -> Result<Self> {
        let session = Self::new(transport, api, app_id, app_token);
        session.refresh().await?;
        Ok(session)
    }

    pub fn api(&self) -> &FreeboxApi {
        &self.api
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.load().is_some()
    }

    /// Log in again unless the last login is under 5 seconds old
    pub async fn refresh(&self) -> Result<()> {
        let mut last_refresh = self.last_refresh.lock().await;
        if let Some(at) = *last_refresh {
            if at.elapsed() < self.min_refresh_interval {
                debug!("Session refreshed {:?} ago, skipping", at.elapsed());
                return Ok(());
            }
        }

        let token = self.login().await?;
        self.token.store(Some(Arc::new(token)));
        *last_refresh = Some(Instant::now());
        info!("Logged in to the Freebox API");
        Ok(())
    }

    async fn login(&self) -> Result<String> {
        let challenge: LoginChallenge = serde_json::from_value(
            self.transport.get(&self.api.url("login/"), None).await?,
        )?;

        let request = SessionRequest {
            app_id: self.app_id.clone(),
            password: password(self.app_token.expose_secret(), &challenge.challenge),
        };
        let body = serde_json::to_value(&request)?;
        let opened: SessionOpened = serde_json::from_value(
            self.transport
                .post(&self.api.url("login/session/"), Some(&body), None)
                .await?,
        )?;
        Ok(opened.session_token)
    }

    /// Authenticated GET of `path`, decoded into `T`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.call(Method::Get, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Authenticated POST of `body` to `path`
    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.call(Method::Post, path, body).await
    }

    /// End the session on the box
    ///
    /// Not retried: a session that is already gone needs no logout.
    pub async fn logout(&self) -> Result<()> {
        self.send(Method::Post, &self.api.url("login/logout/"), None)
            .await?;
        self.token.store(None);
        info!("Logged out from the Freebox API");
        Ok(())
    }

    async fn call(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.api.url(path);
        match self.send(method, &url, body).await {
            Err(e) if e.is_auth_error() => {
                debug!("{} on {}, refreshing session", e, url);
                self.refresh().await?;
                match self.send(method, &url, body).await {
                    Err(e) if e.is_auth_error() => {
                        Err(ExporterError::SessionRejected(format!("{url}: {e}")))
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.token.load_full().ok_or(ExporterError::AuthRequired)?;
        match method {
            Method::Get => self.transport.get(url, Some(token.as_str())).await,
            Method::Post => self.transport.post(url, body, Some(token.as_str())).await,
        }
    }
}
