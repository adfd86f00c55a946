//! Configuration Management
//!
//! Two independent files are involved:
//!
//! - **Exporter settings** ([`Config`]): optional TOML file layered with `.env`
//!   and `FREEBOX_EXPORTER__<SECTION>__<KEY>` environment variables.
//! - **Pairing credentials** ([`Credentials`]): JSON file written once after the
//!   Freebox owner approved the exporter, holding the discovered API description
//!   and the application token.

use crate::error::{ExporterError, Result};
use crate::freebox::discovery::DiscoveryMode;
use crate::freebox::types::ApiVersion;
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub freebox: FreeboxConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FreeboxConfig {
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default)]
    pub discovery: DiscoveryMode,
    /// Force a lower API version than the advertised one (0 = advertised)
    #[serde(default)]
    pub api_version: u32,
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub ca_file: Option<PathBuf>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_seconds: u64,
    #[serde(default = "default_pairing_poll")]
    pub pairing_poll_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default)]
    pub host_details: bool,
    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_seconds: u64,
}

fn default_token_file() -> PathBuf {
    PathBuf::from("freebox-exporter.json")
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9091
}

fn default_request_timeout() -> u64 {
    10
}

fn default_discovery_timeout() -> u64 {
    10
}

fn default_pairing_poll() -> u64 {
    10
}

fn default_scrape_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for FreeboxConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
            discovery: DiscoveryMode::default(),
            api_version: 0,
            accept_invalid_certs: true,
            ca_file: None,
            request_timeout_seconds: default_request_timeout(),
            discovery_timeout_seconds: default_discovery_timeout(),
            pairing_poll_seconds: default_pairing_poll(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            host_details: false,
            scrape_timeout_seconds: default_scrape_timeout(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("FREEBOX_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

/// Pairing state persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api: ApiVersion,
    #[serde(serialize_with = "expose_token")]
    pub app_token: SecretString,
}

fn expose_token<S: serde::Serializer>(
    token: &SecretString,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(token.expose_secret())
}

impl Credentials {
    /// Usable without another pairing round
    pub fn is_valid(&self) -> bool {
        self.api.is_valid() && !self.app_token.expose_secret().is_empty()
    }

    /// Read the credentials file
    ///
    /// Returns `Ok(None)` when the file does not exist, which means the
    /// exporter has never been paired.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let credentials: Credentials = serde_json::from_str(&raw)?;
        Ok(Some(credentials))
    }

    /// Read the credentials file, treating any problem as "not paired yet"
    pub fn load_or_discard(path: &Path) -> Option<Self> {
        match Self::load(path) {
            Ok(Some(credentials)) if credentials.is_valid() => {
                info!("Loaded Freebox credentials from {}", path.display());
                Some(credentials)
            }
            Ok(Some(_)) => {
                warn!(
                    "Credentials in {} are incomplete, pairing again",
                    path.display()
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(
                    "Cannot read credentials from {}: {}, pairing again",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            ExporterError::Config(format!(
                "cannot write credentials to {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Saved Freebox credentials to {}", path.display());
        Ok(())
    }
}
