//! Switch Metrics Collector
//!
//! Queries `switch/status/`, then `switch/port/<id>/stats/` for every port
//! concurrently. A port whose stats request fails keeps its status samples.
//!
//! # Metrics Produced
//! - `freebox_switch_port_connected_total` - Ports with link up
//! - `freebox_switch_port_bandwidth_bytes` - Negotiated speed (bytes/s)
//!   - Labels: id, link, duplex
//! - `freebox_switch_port_bytes` / `freebox_switch_port_packets` - Counters
//!   - Labels: id, dir, state
//! - `freebox_switch_host_total` - Hosts seen per port
//!   - Labels: id
//! - `freebox_switch_host` - One sample per host (host details only)
//!   - Labels: id, mac, hostname

use super::CollectionContext;
use crate::error::Result;
use crate::freebox::types::{SwitchPortStats, SwitchPortStatus};
use crate::metrics::*;
use futures_util::future::join_all;
use tracing::warn;

/// Mbit/s to bytes/s
const MBITS_TO_BYTES: f64 = 1_000_000.0 / 8.0;

/// A port and its stats, if they could be fetched
#[derive(Debug, Clone, Default)]
pub struct PortSnapshot {
    pub status: SwitchPortStatus,
    pub stats: Option<SwitchPortStats>,
}

pub async fn collect_switch_metrics(ctx: &CollectionContext) -> Result<SampleSet> {
    let ports = ctx.client.switch_status().await?;
    let stats = join_all(
        ports
            .iter()
            .map(|port| ctx.client.switch_port_stats(port.id)),
    )
    .await;

    let snapshots: Vec<PortSnapshot> = ports
        .into_iter()
        .zip(stats)
        .map(|(status, stats)| {
            let stats = match stats {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!("Failed to query stats of switch port {}: {}", status.id, e);
                    None
                }
            };
            PortSnapshot { status, stats }
        })
        .collect();

    Ok(switch_samples(&snapshots, ctx.config.host_details))
}

pub fn switch_samples(ports: &[PortSnapshot], host_details: bool) -> SampleSet {
    let mut samples = SampleSet::new();

    let connected = ports.iter().filter(|p| p.status.link == "up").count();
    samples.constant(&SWITCH_PORT_CONNECTED_TOTAL, connected as f64, &[]);

    for port in ports {
        let status = &port.status;
        let id = status.id.to_string();
        let id = id.as_str();

        // Ports without link report an empty speed
        let speed: f64 = status.speed.trim().parse().unwrap_or(0.0);
        samples.constant(
            &SWITCH_PORT_BANDWIDTH,
            speed * MBITS_TO_BYTES,
            &[id, status.link.as_str(), status.duplex.as_str()],
        );

        if let Some(stats) = &port.stats {
            samples.value(&SWITCH_PORT_BYTES, stats.rx_good_bytes, &[id, "rx", "good"]);
            samples.value(&SWITCH_PORT_BYTES, stats.rx_bad_bytes, &[id, "rx", "bad"]);
            samples.value(&SWITCH_PORT_BYTES, stats.tx_bytes, &[id, "tx", ""]);
            samples.value(&SWITCH_PORT_PACKETS, stats.rx_good_packets, &[id, "rx", "good"]);
            samples.value(&SWITCH_PORT_PACKETS, stats.rx_err_packets, &[id, "rx", "bad"]);
            samples.value(&SWITCH_PORT_PACKETS, stats.tx_packets, &[id, "tx", ""]);
        }

        samples.constant(&SWITCH_HOST_TOTAL, status.mac_list.len() as f64, &[id]);
        if host_details {
            for host in &status.mac_list {
                let mac = host.mac.to_lowercase();
                samples.constant(&SWITCH_HOST, 1.0, &[id, mac.as_str(), host.hostname.as_str()]);
            }
        }
    }

    samples
}
