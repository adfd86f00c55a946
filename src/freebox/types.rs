//! Freebox API Type Definitions
//!
//! Rust structs for the Freebox OS REST API payloads used by the exporter.
//! Only the `result` part of the response envelope is modelled here; the
//! envelope itself is handled by [`crate::freebox::transport`].
//!
//! # Design Notes
//!
//! - **Optional Fields**: every numeric or boolean field is an `Option`. The
//!   firmware omits fields depending on model and API version, and an absent
//!   value must never be reported as zero.
//! - **Serde Defaults**: string fields default to empty and lists to empty
//!   so that partially populated payloads still decode.
//!
//! # API Endpoints Covered
//!
//! - `GET /api_version` and mDNS TXT records → [`ApiVersion`]
//! - `login/authorize/` → [`AuthorizeGrant`], [`AuthorizeStatus`]
//! - `login/`, `login/session/` → [`LoginChallenge`], [`SessionOpened`]
//! - `system/` → [`SystemInfo`]
//! - `connection/`, `connection/xdsl/`, `connection/ftth/` → [`ConnectionStatus`],
//!   [`XdslInfo`], [`FtthStatus`]
//! - `switch/status/`, `switch/port/<id>/stats/` → [`SwitchPortStatus`], [`SwitchPortStats`]
//! - `wifi/bss/`, `wifi/ap/`, `wifi/ap/<id>/stations/` → [`WifiBss`], [`WifiAp`], [`WifiStation`]
//! - `lan/browser/interfaces/`, `lan/browser/<name>/` → [`LanInterface`], [`LanHost`]

use serde::{Deserialize, Serialize};

/// Description of a Freebox API endpoint, as advertised by the box
///
/// Persisted verbatim in the credentials file so that later runs can skip
/// discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiVersion {
    pub api_domain: String,
    pub uid: String,
    pub https_available: bool,
    pub https_port: u16,
    pub device_name: String,
    pub api_version: String,
    pub api_base_url: String,
    pub device_type: String,
}

impl ApiVersion {
    /// A record is usable only when every field needed to build URLs is set
    /// and the box accepts HTTPS.
    pub fn is_valid(&self) -> bool {
        !self.api_domain.is_empty()
            && !self.uid.is_empty()
            && self.https_available
            && self.https_port != 0
            && !self.device_name.is_empty()
            && !self.api_version.is_empty()
            && !self.api_base_url.is_empty()
            && !self.device_type.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Application identity sent when requesting pairing
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeRequest {
    pub app_id: String,
    pub app_name: String,
    pub app_version: String,
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeGrant {
    pub app_token: String,
    pub track_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeStatus {
    pub status: String,
    #[serde(default)]
    pub challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginChallenge {
    pub challenge: String,
    #[serde(default)]
    pub logged_in: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SessionRequest {
    pub app_id: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionOpened {
    pub session_token: String,
    #[serde(default)]
    pub challenge: Option<String>,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub firmware_version: String,
    pub mac: String,
    pub serial: String,
    pub uptime: String,
    pub uptime_val: Option<i64>,
    pub board_name: String,
    pub box_flavor: String,
    pub disk_status: String,
    pub box_authenticated: Option<bool>,
    /// Legacy temperature fields, only present on older firmware
    pub temp_cpum: Option<i64>,
    pub temp_cpub: Option<i64>,
    pub temp_sw: Option<i64>,
    pub fan_rpm: Option<i64>,
    pub sensors: Vec<SystemSensor>,
    pub fans: Vec<SystemSensor>,
}

/// Temperature sensor or fan reading (`{id, name, value}`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SystemSensor {
    pub id: String,
    pub name: String,
    pub value: Option<i64>,
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionStatus {
    pub state: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub media: String,
    pub ipv4: String,
    pub ipv6: String,
    pub rate_up: Option<i64>,
    pub rate_down: Option<i64>,
    /// Older firmware spells it `bandwith_*`
    #[serde(alias = "bandwith_up")]
    pub bandwidth_up: Option<i64>,
    #[serde(alias = "bandwith_down")]
    pub bandwidth_down: Option<i64>,
    pub bytes_up: Option<i64>,
    pub bytes_down: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XdslInfo {
    pub status: Option<XdslStatus>,
    pub down: Option<XdslStats>,
    pub up: Option<XdslStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XdslStatus {
    pub status: String,
    pub protocol: String,
    pub modulation: String,
    pub uptime: Option<i64>,
}

/// Per-direction line statistics. Rates are kbit/s, `*_10` values are deci-dB.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XdslStats {
    pub maxrate: Option<i64>,
    pub rate: Option<i64>,
    pub snr: Option<i64>,
    pub attn: Option<i64>,
    pub snr_10: Option<i64>,
    pub attn_10: Option<i64>,
    pub fec: Option<i64>,
    pub crc: Option<i64>,
    pub hec: Option<i64>,
    pub es: Option<i64>,
    pub ses: Option<i64>,
}

/// Optical module status. Power readings are in centi-dBm.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FtthStatus {
    pub sfp_present: Option<bool>,
    pub sfp_alim_ok: Option<bool>,
    pub sfp_has_power_report: Option<bool>,
    pub sfp_has_signal: Option<bool>,
    pub link: Option<bool>,
    pub sfp_serial: String,
    pub sfp_model: String,
    pub sfp_vendor: String,
    pub sfp_pwr_tx: Option<i64>,
    pub sfp_pwr_rx: Option<i64>,
}

// ---------------------------------------------------------------------------
// Switch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwitchPortStatus {
    pub id: i64,
    pub link: String,
    pub duplex: String,
    /// Link speed in Mbit/s, as a string (`"1000"`, `"10000"`, ...)
    pub speed: String,
    pub mode: String,
    pub mac_list: Vec<SwitchHost>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwitchHost {
    pub mac: String,
    pub hostname: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SwitchPortStats {
    pub rx_good_bytes: Option<i64>,
    pub rx_bad_bytes: Option<i64>,
    pub rx_good_packets: Option<i64>,
    pub rx_err_packets: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub tx_packets: Option<i64>,
    pub rx_bytes_rate: Option<i64>,
    pub tx_bytes_rate: Option<i64>,
}

// ---------------------------------------------------------------------------
// Wifi
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiBss {
    /// BSSID, the MAC address of the BSS
    pub id: String,
    pub phy_id: i64,
    pub status: WifiBssStatus,
    pub config: WifiBssConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiBssStatus {
    pub state: String,
    pub sta_count: Option<i64>,
    pub authorized_sta_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiBssConfig {
    pub enabled: Option<bool>,
    pub ssid: String,
    pub hide_ssid: Option<bool>,
    pub encryption: String,
    pub eapol_version: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiAp {
    pub id: i64,
    pub name: String,
    pub status: WifiApStatus,
    pub config: WifiApConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiApStatus {
    pub state: String,
    pub primary_channel: Option<i64>,
    pub secondary_channel: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiApConfig {
    pub band: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WifiStation {
    pub id: String,
    pub mac: String,
    pub bssid: String,
    pub hostname: String,
    pub rx_bytes: Option<i64>,
    pub tx_bytes: Option<i64>,
    pub signal: Option<i64>,
    pub host: Option<StationHost>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StationHost {
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// LAN browser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanInterface {
    pub name: String,
    pub host_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanHost {
    pub id: String,
    pub active: Option<bool>,
    pub primary_name: String,
    pub host_type: String,
    pub vendor_name: String,
    pub l2ident: L2Ident,
    pub l3connectivities: Vec<L3Connectivity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct L2Ident {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct L3Connectivity {
    pub addr: String,
    pub af: String,
    pub active: Option<bool>,
}
