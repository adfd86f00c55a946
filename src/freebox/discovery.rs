//! Freebox Discovery
//!
//! Two strategies locate the box on the local network:
//!
//! - **HTTP**: `GET http://mafreebox.freebox.fr/api_version`, a plain JSON
//!   document (no envelope).
//! - **mDNS**: browse `_fbx-api._tcp.local.` and take the first resolved
//!   service whose TXT metadata forms a complete [`ApiVersion`].
//!
//! Both reject a box that does not offer HTTPS.

use crate::error::{ExporterError, Result};
use crate::freebox::types::ApiVersion;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Well-known discovery URL, answered by the box on the LAN
pub const DISCOVERY_URL: &str = "http://mafreebox.freebox.fr/api_version";

/// mDNS service type advertised by Freebox OS
pub const MDNS_SERVICE: &str = "_fbx-api._tcp.local.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    #[default]
    Http,
    Mdns,
}

impl std::fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Mdns => write!(f, "mdns"),
        }
    }
}

/// Locate the Freebox with the given strategy
pub async fn discover(
    mode: DiscoveryMode,
    client: &reqwest::Client,
    mdns_timeout: Duration,
) -> Result<ApiVersion> {
    info!("Discovering Freebox ({})", mode);
    let api = match mode {
        DiscoveryMode::Http => discover_http(client, DISCOVERY_URL).await?,
        DiscoveryMode::Mdns => discover_mdns(mdns_timeout).await?,
    };
    info!(
        "Found {} at {}:{} (API {})",
        api.device_name, api.api_domain, api.https_port, api.api_version
    );
    Ok(api)
}

/// Fetch and validate the `api_version` document at `url`
pub async fn discover_http(client: &reqwest::Client, url: &str) -> Result<ApiVersion> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ExporterError::Discovery(format!("{url}: {e}")))?;
    let body = response
        .text()
        .await
        .map_err(|e| ExporterError::Discovery(format!("{url}: {e}")))?;
    let api: ApiVersion = serde_json::from_str(&body)
        .map_err(|e| ExporterError::Discovery(format!("cannot decode {url}: {e}")))?;

    if !api.https_available {
        return Err(ExporterError::Discovery(
            "the Freebox does not offer HTTPS access".to_string(),
        ));
    }
    if !api.is_valid() {
        return Err(ExporterError::Discovery(format!(
            "incomplete api description from {url}"
        )));
    }
    Ok(api)
}

/// A resolved mDNS service: instance name plus TXT key/value pairs
#[derive(Debug, Clone, Default)]
pub struct ServiceRecord {
    pub fullname: String,
    pub properties: Vec<(String, String)>,
}

impl ServiceRecord {
    fn from_info(info: &mdns_sd::ServiceInfo) -> Self {
        Self {
            fullname: info.get_fullname().to_string(),
            properties: info
                .get_properties()
                .iter()
                .map(|p| (p.key().to_string(), p.val_str().to_string()))
                .collect(),
        }
    }

    /// Build an [`ApiVersion`] from the TXT metadata
    ///
    /// Unknown keys are ignored and so is a malformed `https_port`; the
    /// result is checked with [`ApiVersion::is_valid`] by the caller.
    pub fn to_api_version(&self) -> ApiVersion {
        let device_name = self
            .fullname
            .split('.')
            .next()
            .unwrap_or_default()
            .replace('\\', "");

        let mut api = ApiVersion {
            device_name,
            ..ApiVersion::default()
        };
        for (key, value) in &self.properties {
            match key.as_str() {
                "api_domain" => api.api_domain = value.clone(),
                "uid" => api.uid = value.clone(),
                "https_available" => api.https_available = value == "1",
                "https_port" => match value.parse() {
                    Ok(port) => api.https_port = port,
                    Err(_) => debug!("Ignoring https_port={:?} from {}", value, self.fullname),
                },
                "api_version" => api.api_version = value.clone(),
                "api_base_url" => api.api_base_url = value.clone(),
                "device_type" => api.device_type = value.clone(),
                _ => {}
            }
        }
        api
    }
}

/// First usable record in `records`
///
/// Fails with [`ExporterError::DiscoveryTimeout`] when the stream ends
/// without one.
pub async fn first_valid<S>(records: S) -> Result<ApiVersion>
where
    S: Stream<Item = ServiceRecord>,
{
    futures_util::pin_mut!(records);
    while let Some(record) = records.next().await {
        let api = record.to_api_version();
        if api.is_valid() {
            return Ok(api);
        }
        debug!("Skipping mDNS record {}: incomplete or no HTTPS", record.fullname);
    }
    Err(ExporterError::DiscoveryTimeout)
}

/// Browse mDNS for up to `timeout`
pub async fn discover_mdns(timeout: Duration) -> Result<ApiVersion> {
    let daemon = mdns_sd::ServiceDaemon::new().map_err(|e| ExporterError::Mdns(e.to_string()))?;
    let receiver = daemon
        .browse(MDNS_SERVICE)
        .map_err(|e| ExporterError::Mdns(e.to_string()))?;

    let records = receiver.into_stream().filter_map(|event| async move {
        match event {
            mdns_sd::ServiceEvent::ServiceResolved(info) => Some(ServiceRecord::from_info(&info)),
            _ => None,
        }
    });

    let result = match tokio::time::timeout(timeout, first_valid(records)).await {
        Ok(result) => result,
        Err(_) => Err(ExporterError::DiscoveryTimeout),
    };

    if let Err(e) = daemon.shutdown() {
        warn!("Failed to stop mDNS daemon: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, pairs: &[(&str, &str)]) -> ServiceRecord {
        ServiceRecord {
            fullname: name.to_string(),
            properties: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    const FULL: &[(&str, &str)] = &[
        ("api_domain", "abcd.fbxos.fr"),
        ("uid", "0123"),
        ("https_available", "1"),
        ("https_port", "4242"),
        ("api_version", "10.2"),
        ("api_base_url", "/api/"),
        ("device_type", "FreeboxServer7,1"),
    ];

    #[test]
    fn device_name_comes_from_instance() {
        let api = record("Freebox\\ Server._fbx-api._tcp.local.", FULL).to_api_version();
        assert_eq!(api.device_name, "Freebox Server");
        assert_eq!(api.https_port, 4242);
        assert!(api.https_available);
        assert!(api.is_valid());
    }

    #[test]
    fn bad_port_is_ignored() {
        let mut pairs = FULL.to_vec();
        pairs[3] = ("https_port", "not-a-port");
        let api = record("fbx._fbx-api._tcp.local.", &pairs).to_api_version();
        assert_eq!(api.https_port, 0);
        assert_eq!(api.api_domain, "abcd.fbxos.fr");
        assert!(!api.is_valid());
    }

    #[tokio::test]
    async fn first_valid_skips_invalid_records() {
        let mut no_https = FULL.to_vec();
        no_https[2] = ("https_available", "0");
        let records = futures_util::stream::iter(vec![
            record("first._fbx-api._tcp.local.", &no_https),
            record("second._fbx-api._tcp.local.", FULL),
        ]);
        let api = first_valid(records).await.unwrap();
        assert_eq!(api.device_name, "second");
    }

    #[tokio::test]
    async fn exhausted_stream_is_a_timeout() {
        let records = futures_util::stream::iter(vec![record("x", &[("uid", "1")])]);
        let err = first_valid(records).await.unwrap_err();
        assert!(matches!(err, ExporterError::DiscoveryTimeout));
    }
}
