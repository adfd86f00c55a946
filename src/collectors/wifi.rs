//! Wifi Metrics Collector
//!
//! Queries `wifi/bss/` and `wifi/ap/` concurrently, then
//! `wifi/ap/<id>/stations/` for every access point. Stations are joined to
//! their BSS by lower-cased BSSID; a station whose BSS is unknown keeps its
//! samples with empty `ssid` and `encryption` labels.
//!
//! # Metrics Produced
//! - `freebox_wifi_bss_info` - Constant 1 per BSS
//!   - Labels: bssid, ap_id, state, enabled, ssid, hide_ssid, encryption, eapol_version
//! - `freebox_wifi_bss_station_total` / `freebox_wifi_bss_authorized_station_total`
//!   - Labels: bssid, ap_id
//! - `freebox_wifi_ap_info` - Constant 1 per access point
//!   - Labels: ap_id, ap_band, ap_name, ap_state
//! - `freebox_wifi_channel` - Primary and secondary channel
//!   - Labels: ap_id, ap_band, ap_name, channel_type
//! - `freebox_wifi_station_total` - Stations per access point
//!   - Labels: ap_id, ap_band, ap_name
//! - `freebox_wifi_station_info`, `freebox_wifi_station_bytes`,
//!   `freebox_wifi_station_signal_dbm` - Per station (host details only)
//!
//! # Error Handling
//!
//! The category fails only when both list requests fail. Otherwise the
//! samples are returned together with a completeness flag, false when one of
//! the lists or any station request was lost.

use super::CollectionContext;
use crate::error::Result;
use crate::freebox::types::{WifiAp, WifiBss, WifiStation};
use crate::metrics::*;
use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::warn;

/// An access point and its stations, if they could be fetched
#[derive(Debug, Clone, Default)]
pub struct ApSnapshot {
    pub ap: WifiAp,
    pub stations: Option<Vec<WifiStation>>,
}

pub async fn collect_wifi_metrics(ctx: &CollectionContext) -> Result<(SampleSet, bool)> {
    let (bss, aps) = tokio::join!(ctx.client.wifi_bss(), ctx.client.wifi_aps());

    let mut complete = bss.is_ok() && aps.is_ok();
    let (bss, aps) = match (bss, aps) {
        (Err(e), Err(_)) => return Err(e),
        (bss, aps) => (
            bss.unwrap_or_else(|e| {
                warn!("Failed to query wifi BSS: {}", e);
                Vec::new()
            }),
            aps.unwrap_or_else(|e| {
                warn!("Failed to query wifi access points: {}", e);
                Vec::new()
            }),
        ),
    };

    let stations = join_all(aps.iter().map(|ap| ctx.client.wifi_stations(ap.id))).await;
    let snapshots: Vec<ApSnapshot> = aps
        .into_iter()
        .zip(stations)
        .map(|(ap, stations)| {
            let stations = match stations {
                Ok(stations) => Some(stations),
                Err(e) => {
                    warn!("Failed to query stations of access point {}: {}", ap.id, e);
                    complete = false;
                    None
                }
            };
            ApSnapshot { ap, stations }
        })
        .collect();

    Ok((wifi_samples(&bss, &snapshots, ctx.config.host_details), complete))
}

fn opt_label<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn wifi_samples(bss_list: &[WifiBss], aps: &[ApSnapshot], host_details: bool) -> SampleSet {
    let mut samples = SampleSet::new();

    let bss_by_id: HashMap<String, &WifiBss> = bss_list
        .iter()
        .map(|bss| (bss.id.to_lowercase(), bss))
        .collect();

    for bss in bss_list {
        let bssid = bss.id.to_lowercase();
        let ap_id = bss.phy_id.to_string();
        let enabled = opt_label(bss.config.enabled);
        let hide_ssid = opt_label(bss.config.hide_ssid);
        let eapol_version = opt_label(bss.config.eapol_version);

        samples.constant(
            &WIFI_BSS_INFO,
            1.0,
            &[
                bssid.as_str(),
                ap_id.as_str(),
                bss.status.state.as_str(),
                enabled.as_str(),
                bss.config.ssid.as_str(),
                hide_ssid.as_str(),
                bss.config.encryption.as_str(),
                eapol_version.as_str(),
            ],
        );
        samples.value(
            &WIFI_BSS_STATION_TOTAL,
            bss.status.sta_count,
            &[bssid.as_str(), ap_id.as_str()],
        );
        samples.value(
            &WIFI_BSS_AUTHORIZED_STATION_TOTAL,
            bss.status.authorized_sta_count,
            &[bssid.as_str(), ap_id.as_str()],
        );
    }

    for snapshot in aps {
        let ap = &snapshot.ap;
        let ap_id = ap.id.to_string();
        let ap_labels = [ap_id.as_str(), ap.config.band.as_str(), ap.name.as_str()];
        let [id, band, name] = ap_labels;

        samples.constant(&WIFI_AP_INFO, 1.0, &[id, band, name, ap.status.state.as_str()]);
        samples.value(&WIFI_CHANNEL, ap.status.primary_channel, &[id, band, name, "primary"]);
        samples.value(&WIFI_CHANNEL, ap.status.secondary_channel, &[id, band, name, "secondary"]);

        let Some(stations) = &snapshot.stations else {
            continue;
        };
        samples.constant(&WIFI_STATION_TOTAL, stations.len() as f64, &ap_labels);

        if !host_details {
            continue;
        }
        for station in stations {
            let station_id = station.id.to_lowercase();
            let bssid = station.bssid.to_lowercase();
            let mac = station.mac.to_lowercase();
            let (ssid, encryption) = match bss_by_id.get(&bssid) {
                Some(bss) => (bss.config.ssid.as_str(), bss.config.encryption.as_str()),
                None => ("", ""),
            };
            let active = station
                .host
                .as_ref()
                .and_then(|host| host.active)
                .unwrap_or(false);

            samples.constant(
                &WIFI_STATION_INFO,
                bool_value(active),
                &[
                    id,
                    band,
                    name,
                    station_id.as_str(),
                    bssid.as_str(),
                    ssid,
                    encryption,
                    station.hostname.as_str(),
                    mac.as_str(),
                ],
            );
            samples.value(&WIFI_STATION_BYTES, station.rx_bytes, &[station_id.as_str(), "rx"]);
            samples.value(&WIFI_STATION_BYTES, station.tx_bytes, &[station_id.as_str(), "tx"]);
            samples.value(&WIFI_STATION_SIGNAL, station.signal, &[station_id.as_str()]);
        }
    }

    samples
}
