//! Prometheus Metrics Definitions
//!
//! This module defines every metric exposed by the Freebox exporter and the
//! helpers that turn optional API fields into samples.
//!
//! # Metric Categories
//!
//! ## Exporter
//! - `freebox_exporter_info` - 1 when every category was collected on this scrape
//! - `freebox_info` - constant 1, box and connection identity in labels
//!
//! ## System
//! - Uptime, temperature sensors, fan speeds
//!
//! ## Connection
//! - WAN rates, bandwidth and byte counters
//! - xDSL line status, rates, SNR, attenuation and error counters
//! - FTTH optical module status and power
//!
//! ## Switch
//! - Port link, bandwidth, byte/packet counters and attached hosts
//!
//! ## Wifi
//! - BSS and access point status, channels, stations
//!
//! ## LAN
//! - Hosts per interface, L2/L3 host details
//!
//! # Samples, not live metrics
//!
//! Every scrape produces a fresh `Vec<Sample>`. A sample exists only when the
//! source field was present: an absent value yields no sample, never a zero.
//! [`render`] registers the samples in a new `prometheus::Registry` and
//! encodes them in the text exposition format.
//!
//! All metrics use the `freebox_` namespace prefix.

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const NAMESPACE: &str = "freebox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static description of a metric family
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    /// Name including the namespace prefix
    pub fn full_name(&self) -> String {
        format!("{}_{}", NAMESPACE, self.name)
    }
}

macro_rules! metric {
    ($ident:ident, $name:literal, $kind:ident, $help:literal, [$($label:literal),* $(,)?]) => {
        pub static $ident: MetricDesc = MetricDesc {
            name: $name,
            help: $help,
            kind: MetricKind::$kind,
            labels: &[$($label),*],
        };
    };
}

// Exporter
metric!(EXPORTER_INFO, "exporter_info", Gauge,
    "Exporter status (1=all categories collected, 0=partial)", ["url", "api_version"]);
metric!(INFO, "info", Gauge,
    "Constant metric with value=1. Various information about the Freebox",
    ["firmware", "mac", "serial", "boardname", "box_flavor", "connection_type",
     "connection_state", "connection_media", "ipv4", "ipv6"]);

// System
metric!(SYSTEM_UPTIME, "system_uptime", Counter, "Freebox uptime (in seconds)", []);
metric!(SYSTEM_TEMP, "system_temp_degrees", Gauge, "Temperature sensors reported by the Freebox (in °C)", ["id"]);
metric!(SYSTEM_FAN_RPM, "system_fan_rpm", Gauge, "Fan speed (in rpm)", ["id"]);

// Connection
metric!(CONNECTION_RATE, "connection_rate_bytes", Gauge,
    "Current upload/download rate (in bytes/s)", ["dir"]);
metric!(CONNECTION_BANDWIDTH, "connection_bandwidth_bytes", Gauge,
    "Available upload/download bandwidth (in bytes/s)", ["dir"]);
metric!(CONNECTION_BYTES, "connection_bytes", Counter,
    "Total uploaded/downloaded bytes since last connection", ["dir"]);
metric!(XDSL_INFO, "connection_xdsl_info", Gauge,
    "Constant metric with value=1. Various information about the xDSL line",
    ["status", "protocol", "modulation"]);
metric!(XDSL_UPTIME, "connection_xdsl_uptime", Counter, "Uptime of the xDSL line (in seconds)", []);
metric!(XDSL_MAXRATE, "connection_xdsl_maxrate_bytes", Gauge,
    "ATM max rate (in bytes/s)", ["dir"]);
metric!(XDSL_RATE, "connection_xdsl_rate_bytes", Gauge, "ATM rate (in bytes/s)", ["dir"]);
metric!(XDSL_SNR, "connection_xdsl_snr_db", Gauge, "Signal noise ratio (in dB)", ["dir"]);
metric!(XDSL_ATTN, "connection_xdsl_attn_db", Gauge, "Line attenuation (in dB)", ["dir"]);
metric!(XDSL_ERRORS, "connection_xdsl_errors", Counter,
    "xDSL line error counters (fec, crc, hec, es, ses)", ["dir", "kind"]);
metric!(FTTH_SFP_PRESENT, "connection_ftth_sfp_present", Gauge,
    "Is the SFP present (1=yes, 0=no)", ["sfp_serial", "sfp_model", "sfp_vendor"]);
metric!(FTTH_SFP_ALIM_OK, "connection_ftth_sfp_alim_ok", Gauge,
    "Is the SFP power supply ok (1=yes, 0=no)", ["sfp_serial", "sfp_model", "sfp_vendor"]);
metric!(FTTH_SFP_HAS_POWER_REPORT, "connection_ftth_sfp_has_power_report", Gauge,
    "Does the SFP report optical power (1=yes, 0=no)", ["sfp_serial", "sfp_model", "sfp_vendor"]);
metric!(FTTH_SFP_HAS_SIGNAL, "connection_ftth_sfp_has_signal", Gauge,
    "Does the SFP detect a signal (1=yes, 0=no)", ["sfp_serial", "sfp_model", "sfp_vendor"]);
metric!(FTTH_LINK, "connection_ftth_link", Gauge,
    "Is the optical link up (1=yes, 0=no)", ["sfp_serial", "sfp_model", "sfp_vendor"]);
metric!(FTTH_SFP_PWR, "connection_ftth_sfp_pwr_dbm", Gauge,
    "SFP optical power (in dBm)", ["sfp_serial", "sfp_model", "sfp_vendor", "dir"]);

// Switch
metric!(SWITCH_PORT_CONNECTED_TOTAL, "switch_port_connected_total", Gauge,
    "Number of switch ports with link up", []);
metric!(SWITCH_PORT_BANDWIDTH, "switch_port_bandwidth_bytes", Gauge,
    "Switch port negotiated bandwidth (in bytes/s)", ["id", "link", "duplex"]);
metric!(SWITCH_PORT_BYTES, "switch_port_bytes", Counter,
    "Switch port total bytes", ["id", "dir", "state"]);
metric!(SWITCH_PORT_PACKETS, "switch_port_packets", Counter,
    "Switch port total packets", ["id", "dir", "state"]);
metric!(SWITCH_HOST_TOTAL, "switch_host_total", Gauge,
    "Number of hosts seen on the switch port", ["id"]);
metric!(SWITCH_HOST, "switch_host", Gauge,
    "Constant metric with value=1. Host seen on the switch port", ["id", "mac", "hostname"]);

// Wifi
metric!(WIFI_BSS_INFO, "wifi_bss_info", Gauge,
    "Constant metric with value=1. Various information about the BSS",
    ["bssid", "ap_id", "state", "enabled", "ssid", "hide_ssid", "encryption", "eapol_version"]);
metric!(WIFI_BSS_STATION_TOTAL, "wifi_bss_station_total", Gauge,
    "Number of stations on the BSS", ["bssid", "ap_id"]);
metric!(WIFI_BSS_AUTHORIZED_STATION_TOTAL, "wifi_bss_authorized_station_total", Gauge,
    "Number of authorized stations on the BSS", ["bssid", "ap_id"]);
metric!(WIFI_AP_INFO, "wifi_ap_info", Gauge,
    "Constant metric with value=1. Various information about the access point",
    ["ap_id", "ap_band", "ap_name", "ap_state"]);
metric!(WIFI_CHANNEL, "wifi_channel", Gauge,
    "Wifi channel in use", ["ap_id", "ap_band", "ap_name", "channel_type"]);
metric!(WIFI_STATION_TOTAL, "wifi_station_total", Gauge,
    "Number of stations on the access point", ["ap_id", "ap_band", "ap_name"]);
metric!(WIFI_STATION_INFO, "wifi_station_info", Gauge,
    "Wifi station (1=active, 0=inactive)",
    ["ap_id", "ap_band", "ap_name", "id", "bssid", "ssid", "encryption", "hostname", "mac"]);
metric!(WIFI_STATION_BYTES, "wifi_station_bytes", Counter,
    "Total bytes exchanged with the station", ["id", "dir"]);
metric!(WIFI_STATION_SIGNAL, "wifi_station_signal_dbm", Gauge,
    "Station signal strength (in dBm)", ["id"]);

// LAN
metric!(LAN_HOST_TOTAL, "lan_host_total", Gauge,
    "Number of hosts seen on the interface", ["interface", "active"]);
metric!(LAN_HOST_ACTIVE_L2, "lan_host_active_l2", Gauge,
    "LAN host layer 2 identity (1=active, 0=inactive)",
    ["interface", "vendor_name", "primary_name", "host_type", "l2_type", "l2_id"]);
metric!(LAN_HOST_ACTIVE_L3, "lan_host_active_l3", Gauge,
    "LAN host layer 3 address (1=active, 0=inactive)",
    ["interface", "vendor_name", "primary_name", "host_type", "l2_type", "l2_id", "l3_type", "l3_address"]);

/// One observation: a metric, its label values and a value
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub desc: &'static MetricDesc,
    pub labels: Vec<String>,
    pub value: f64,
}

impl Sample {
    /// Value of `label`, if the metric has such a label
    pub fn label(&self, label: &str) -> Option<&str> {
        self.desc
            .labels
            .iter()
            .position(|l| *l == label)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}

/// Multiply a present value, keep absence
pub fn scale(value: Option<i64>, factor: f64) -> Option<f64> {
    value.map(|v| v as f64 * factor)
}

pub fn bool_value(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Samples gathered by one collector
#[derive(Debug, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always record `value`
    pub fn constant(&mut self, desc: &'static MetricDesc, value: f64, labels: &[&str]) {
        debug_assert_eq!(desc.labels.len(), labels.len(), "labels of {}", desc.name);
        self.samples.push(Sample {
            desc,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            value,
        });
    }

    /// Record `value` if present
    pub fn value(&mut self, desc: &'static MetricDesc, value: Option<i64>, labels: &[&str]) {
        self.scaled(desc, value, 1.0, labels);
    }

    /// Record `value * factor` if present
    pub fn scaled(
        &mut self,
        desc: &'static MetricDesc,
        value: Option<i64>,
        factor: f64,
        labels: &[&str],
    ) {
        if let Some(v) = scale(value, factor) {
            self.constant(desc, v, labels);
        }
    }

    /// Record 1/0 if present
    pub fn flag(&mut self, desc: &'static MetricDesc, value: Option<bool>, labels: &[&str]) {
        if let Some(v) = value {
            self.constant(desc, bool_value(v), labels);
        }
    }

    pub fn extend(&mut self, other: SampleSet) {
        self.samples.extend(other.samples);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Sort by metric name then label values
pub fn sort_samples(samples: &mut [Sample]) {
    samples.sort_by(|a, b| {
        a.desc
            .name
            .cmp(b.desc.name)
            .then_with(|| a.labels.cmp(&b.labels))
    });
}

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Encode samples in the Prometheus text format
///
/// A repeated name and label set keeps the first value; later ones are
/// dropped rather than summed.
pub fn render(samples: &[Sample]) -> anyhow::Result<String> {
    let registry = Registry::new();
    let mut families: HashMap<&'static str, Family> = HashMap::new();
    let mut seen: HashSet<(&'static str, &[String])> = HashSet::new();

    for sample in samples {
        if !seen.insert((sample.desc.name, sample.labels.as_slice())) {
            debug!(
                "Skipping duplicate sample {}{:?} = {}",
                sample.desc.name, sample.labels, sample.value
            );
            continue;
        }
        if !families.contains_key(sample.desc.name) {
            let opts = Opts::new(sample.desc.name, sample.desc.help).namespace(NAMESPACE);
            let family = match sample.desc.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(opts, sample.desc.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(opts, sample.desc.labels)?;
                    registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
            };
            families.insert(sample.desc.name, family);
        }
        let Some(family) = families.get(sample.desc.name) else {
            continue;
        };

        match family {
            Family::Gauge(vec) => vec
                .get_metric_with_label_values(&sample.labels)?
                .set(sample.value),
            Family::Counter(vec) => {
                if sample.value < 0.0 {
                    debug!(
                        "Skipping negative counter {} = {}",
                        sample.desc.name, sample.value
                    );
                    continue;
                }
                vec.get_metric_with_label_values(&sample.labels)?
                    .inc_by(sample.value);
            }
        }
    }

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
