//! Freebox API Client
//!
//! Typed wrappers over the endpoints the exporter reads, plus the startup
//! sequence that produces a logged-in client.
//!
//! # Startup
//!
//! 1. Load the credentials file. If it is missing or unusable:
//!    discover the box, negotiate the API version, request pairing and
//!    persist the result (a failed write is fatal).
//! 2. Negotiate the query version from the stored description.
//! 3. Open a session.
//!
//! # Example
//!
//! ```no_run
//! use freebox_exporter::config::FreeboxConfig;
//! use freebox_exporter::freebox::FreeboxClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = FreeboxClient::connect(&FreeboxConfig::default()).await?;
//! let system = client.system().await?;
//! println!("firmware {}", system.firmware_version);
//! # Ok(())
//! # }
//! ```

use crate::config::{Credentials, FreeboxConfig};
use crate::error::Result;
use crate::freebox::api::FreeboxApi;
use crate::freebox::authorize::{request_app_token, AppIdentity};
use crate::freebox::discovery::discover;
use crate::freebox::session::Session;
use crate::freebox::transport::{HttpTransport, TransportConfig};
use crate::freebox::types::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Client for the Freebox OS API
///
/// `Send` and `Sync`: collectors share one instance behind an `Arc` and
/// issue requests concurrently.
pub struct FreeboxClient {
    session: Session,
}

impl FreeboxClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Discover, pair if needed, and log in
    pub async fn connect(config: &FreeboxConfig) -> Result<Self> {
        let http = TransportConfig::from_config(config).build_client()?;
        let transport = Arc::new(HttpTransport::new(http.clone()));
        let identity = AppIdentity::current();

        let credentials = match Credentials::load_or_discard(&config.token_file) {
            Some(credentials) => credentials,
            None => {
                let info = discover(
                    config.discovery,
                    &http,
                    Duration::from_secs(config.discovery_timeout_seconds),
                )
                .await?;
                let api = FreeboxApi::negotiate(info.clone(), config.api_version)?;
                let app_token = request_app_token(
                    transport.as_ref(),
                    &api,
                    &identity,
                    Duration::from_secs(config.pairing_poll_seconds),
                )
                .await?;

                let credentials = Credentials {
                    api: info,
                    app_token,
                };
                credentials.save(&config.token_file)?;
                credentials
            }
        };

        let api = FreeboxApi::negotiate(credentials.api, config.api_version)?;
        info!("Using Freebox API at {}", api.url(""));

        let session = Session::open(transport, api, identity.app_id, credentials.app_token).await?;
        Ok(Self::new(session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &FreeboxApi {
        self.session.api()
    }

    /// List endpoints send `null` instead of `[]` when empty
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        Ok(self
            .session
            .get::<Option<Vec<T>>>(path)
            .await?
            .unwrap_or_default())
    }

    pub async fn system(&self) -> Result<SystemInfo> {
        self.session.get("system/").await
    }

    pub async fn connection(&self) -> Result<ConnectionStatus> {
        self.session.get("connection/").await
    }

    pub async fn connection_xdsl(&self) -> Result<XdslInfo> {
        self.session.get("connection/xdsl/").await
    }

    pub async fn connection_ftth(&self) -> Result<FtthStatus> {
        self.session.get("connection/ftth/").await
    }

    pub async fn switch_status(&self) -> Result<Vec<SwitchPortStatus>> {
        self.list("switch/status/").await
    }

    pub async fn switch_port_stats(&self, port_id: i64) -> Result<SwitchPortStats> {
        self.session
            .get(&format!("switch/port/{}/stats/", port_id))
            .await
    }

    pub async fn wifi_bss(&self) -> Result<Vec<WifiBss>> {
        self.list("wifi/bss/").await
    }

    pub async fn wifi_aps(&self) -> Result<Vec<WifiAp>> {
        self.list("wifi/ap/").await
    }

    pub async fn wifi_stations(&self, ap_id: i64) -> Result<Vec<WifiStation>> {
        self.list(&format!("wifi/ap/{}/stations/", ap_id)).await
    }

    pub async fn lan_interfaces(&self) -> Result<Vec<LanInterface>> {
        self.list("lan/browser/interfaces/").await
    }

    pub async fn lan_hosts(&self, interface: &str) -> Result<Vec<LanHost>> {
        self.list(&format!("lan/browser/{}/", interface)).await
    }

    /// Best-effort logout, see [`Session::logout`]
    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }
}
