//! HTTPS Transport
//!
//! Every Freebox OS API response is wrapped in the same envelope:
//!
//! ```json
//! {"success": true, "result": {...}}
//! {"success": false, "error_code": "auth_required", "msg": "..."}
//! ```
//!
//! This module unwraps it. `auth_required` and `invalid_token` become
//! [`ExporterError::AuthRequired`] and [`ExporterError::InvalidToken`] so the
//! session layer can refresh and retry; any other failure becomes
//! [`ExporterError::Api`] carrying method, URL, code and message.
//!
//! The [`Transport`] trait is the seam used by the session manager. The only
//! production implementation is [`HttpTransport`], backed by one shared
//! `reqwest::Client` (and therefore one connection pool).

use crate::error::{ExporterError, Result};
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::trace;

/// Header carrying the session token on authenticated calls
pub const AUTH_HEADER: &str = "X-Fbx-App-Auth";

/// Minimal HTTP capability needed by the session layer
///
/// Both methods return the decoded `result` of the envelope (`Value::Null`
/// when the box sent none).
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str, session_token: Option<&'a str>)
        -> BoxFuture<'a, Result<Value>>;

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Option<&'a Value>,
        session_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Value>>;
}

/// TLS verification mode for the Freebox API
///
/// The box presents a certificate signed by the Freebox private CA, so the
/// default is to skip verification unless that CA is supplied.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate.
    DangerAcceptInvalid,
}

/// Shared transport configuration for building the HTTP client
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn from_config(config: &crate::config::FreeboxConfig) -> Self {
        let tls = match (&config.ca_file, config.accept_invalid_certs) {
            (Some(path), _) => TlsMode::CustomCa(path.clone()),
            (None, true) => TlsMode::DangerAcceptInvalid,
            (None, false) => TlsMode::System,
        };
        Self {
            tls,
            timeout: Duration::from_secs(config.request_timeout_seconds),
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(600))
            .user_agent(concat!("freebox-exporter/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| {
                    ExporterError::Config(format!(
                        "failed to read CA cert {}: {e}",
                        path.display()
                    ))
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| ExporterError::Config(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true);
            }
        }

        builder
            .build()
            .map_err(|e| ExporterError::Config(format!("failed to build HTTP client: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

/// Unwrap a response envelope
pub fn decode_envelope(method: &str, url: &str, body: &str) -> Result<Value> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.success {
        return Ok(envelope.result.unwrap_or(Value::Null));
    }

    let code = envelope.error_code.unwrap_or_default();
    match code.as_str() {
        "auth_required" => Err(ExporterError::AuthRequired),
        "invalid_token" => Err(ExporterError::InvalidToken),
        _ => Err(ExporterError::Api {
            method: method.to_string(),
            url: url.to_string(),
            code,
            message: envelope.msg.unwrap_or_default(),
        }),
    }
}

/// [`Transport`] over HTTPS with `reqwest`
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&Value>,
        session_token: Option<&str>,
    ) -> Result<Value> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = session_token {
            request = request.header(AUTH_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!("{} {} -> {}: {}", method, url, status, text);

        decode_envelope(method.as_str(), url, &text)
    }
}

impl Transport for HttpTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        session_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Value>> {
        Box::pin(self.send(reqwest::Method::GET, url, None, session_token))
    }

    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Option<&'a Value>,
        session_token: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Value>> {
        Box::pin(self.send(reqwest::Method::POST, url, body, session_token))
    }
}
