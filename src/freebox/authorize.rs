//! Application Pairing
//!
//! On first start the exporter has no app token. It asks the box for one and
//! then polls the tracking resource until somebody presses the button on the
//! Freebox front panel.
//!
//! ```text
//! POST login/authorize/           -> {app_token, track_id}
//! GET  login/authorize/<track_id> -> {status: pending | granted | ...}
//! ```

use crate::error::{ExporterError, Result};
use crate::freebox::api::FreeboxApi;
use crate::freebox::transport::Transport;
use crate::freebox::types::{AuthorizeGrant, AuthorizeRequest, AuthorizeStatus};
use secrecy::SecretString;
use std::time::Duration;
use tracing::{debug, info};

pub const APP_ID: &str = "fr.freebox.exporter";
pub const APP_NAME: &str = "freebox-exporter";

/// How the exporter presents itself to the box
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
}

impl AppIdentity {
    pub fn current() -> Self {
        let device_name = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| APP_NAME.to_string());

        Self {
            app_id: APP_ID.to_string(),
            app_name: APP_NAME.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            device_name,
        }
    }

    fn request(&self) -> AuthorizeRequest {
        AuthorizeRequest {
            app_id: self.app_id.clone(),
            app_name: self.app_name.clone(),
            app_version: self.app_version.clone(),
            device_name: self.device_name.clone(),
        }
    }
}

/// Obtain a new app token, waiting for manual approval on the box
///
/// Polls every `poll_interval` while the status is `pending`. Any status
/// other than `pending` or `granted` is fatal.
pub async fn request_app_token(
    transport: &dyn Transport,
    api: &FreeboxApi,
    identity: &AppIdentity,
    poll_interval: Duration,
) -> Result<SecretString> {
    let body = serde_json::to_value(identity.request())?;
    let grant: AuthorizeGrant = serde_json::from_value(
        transport
            .post(&api.url("login/authorize/"), Some(&body), None)
            .await?,
    )?;

    info!(
        "Pairing requested: approve \"{}\" on the Freebox front panel",
        identity.app_name
    );

    let url = api.url(&format!("login/authorize/{}", grant.track_id));
    loop {
        let status: AuthorizeStatus =
            serde_json::from_value(transport.get(&url, None).await?)?;
        debug!("Pairing status: {}", status.status);

        match status.status.as_str() {
            "pending" => {
                info!("Waiting for approval on the Freebox...");
                tokio::time::sleep(poll_interval).await;
            }
            "granted" => {
                info!("Pairing granted");
                return Ok(SecretString::new(grant.app_token.into_boxed_str()));
            }
            other => return Err(ExporterError::AuthorizationDenied(other.to_string())),
        }
    }
}
