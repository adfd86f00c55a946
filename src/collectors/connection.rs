//! Connection Metrics Collector
//!
//! Queries `connection/`, then the media specific endpoint: `connection/xdsl/`
//! for DSL lines, `connection/ftth/` for fiber. A failing media request only
//! drops the media samples.
//!
//! # Metrics Produced
//! - `freebox_connection_rate_bytes` - Current rate (bytes/s), labels: dir
//! - `freebox_connection_bandwidth_bytes` - Available bandwidth (bytes/s), labels: dir
//! - `freebox_connection_bytes` - Bytes since connection (counter), labels: dir
//! - `freebox_connection_xdsl_*` - Line status, rates, SNR, attenuation, errors
//! - `freebox_connection_ftth_*` - SFP status and optical power
//!
//! `dir` is `tx` for upload and `rx` for download, as on the switch and SFP.

use super::CollectionContext;
use crate::error::Result;
use crate::freebox::types::{ConnectionStatus, FtthStatus, XdslInfo, XdslStats};
use crate::metrics::*;
use tracing::warn;

/// bit/s to bytes/s
const BITS_TO_BYTES: f64 = 1.0 / 8.0;
/// kbit/s to bytes/s
const KBITS_TO_BYTES: f64 = 1000.0 / 8.0;
/// deci-dB to dB
const DECI: f64 = 0.1;
/// centi-dBm to dBm
const CENTI: f64 = 0.01;

/// Base connection status plus whichever media details could be fetched
#[derive(Debug, Clone, Default)]
pub struct ConnectionSnapshot {
    pub status: ConnectionStatus,
    pub xdsl: Option<XdslInfo>,
    pub ftth: Option<FtthStatus>,
}

/// Collects connection metrics; also returns the payload for `freebox_info`
pub async fn collect_connection_metrics(
    ctx: &CollectionContext,
) -> Result<(SampleSet, ConnectionStatus)> {
    let status = ctx.client.connection().await?;
    let mut snapshot = ConnectionSnapshot {
        status,
        ..Default::default()
    };

    match snapshot.status.media.as_str() {
        "xdsl" => match ctx.client.connection_xdsl().await {
            Ok(xdsl) => snapshot.xdsl = Some(xdsl),
            Err(e) => warn!("Failed to query xdsl status: {}", e),
        },
        "ftth" => match ctx.client.connection_ftth().await {
            Ok(ftth) => snapshot.ftth = Some(ftth),
            Err(e) => warn!("Failed to query ftth status: {}", e),
        },
        _ => {}
    }

    Ok((connection_samples(&snapshot), snapshot.status))
}

pub fn connection_samples(snapshot: &ConnectionSnapshot) -> SampleSet {
    let mut samples = SampleSet::new();
    let status = &snapshot.status;

    samples.value(&CONNECTION_RATE, status.rate_up, &["tx"]);
    samples.value(&CONNECTION_RATE, status.rate_down, &["rx"]);
    samples.scaled(&CONNECTION_BANDWIDTH, status.bandwidth_up, BITS_TO_BYTES, &["tx"]);
    samples.scaled(&CONNECTION_BANDWIDTH, status.bandwidth_down, BITS_TO_BYTES, &["rx"]);
    samples.value(&CONNECTION_BYTES, status.bytes_up, &["tx"]);
    samples.value(&CONNECTION_BYTES, status.bytes_down, &["rx"]);

    if let Some(xdsl) = &snapshot.xdsl {
        xdsl_samples(&mut samples, xdsl);
    }
    if let Some(ftth) = &snapshot.ftth {
        ftth_samples(&mut samples, ftth);
    }
    samples
}

fn xdsl_samples(samples: &mut SampleSet, xdsl: &XdslInfo) {
    if let Some(status) = &xdsl.status {
        samples.constant(
            &XDSL_INFO,
            1.0,
            &[
                status.status.as_str(),
                status.protocol.as_str(),
                status.modulation.as_str(),
            ],
        );
        samples.value(&XDSL_UPTIME, status.uptime, &[]);
    }
    if let Some(down) = &xdsl.down {
        xdsl_stats_samples(samples, down, "rx");
    }
    if let Some(up) = &xdsl.up {
        xdsl_stats_samples(samples, up, "tx");
    }
}

fn xdsl_stats_samples(samples: &mut SampleSet, stats: &XdslStats, dir: &str) {
    samples.scaled(&XDSL_MAXRATE, stats.maxrate, KBITS_TO_BYTES, &[dir]);
    samples.scaled(&XDSL_RATE, stats.rate, KBITS_TO_BYTES, &[dir]);

    // Precise deci-dB values take over the integer ones when available
    match stats.snr_10 {
        Some(_) => samples.scaled(&XDSL_SNR, stats.snr_10, DECI, &[dir]),
        None => samples.value(&XDSL_SNR, stats.snr, &[dir]),
    }
    match stats.attn_10 {
        Some(_) => samples.scaled(&XDSL_ATTN, stats.attn_10, DECI, &[dir]),
        None => samples.value(&XDSL_ATTN, stats.attn, &[dir]),
    }

    for (kind, value) in [
        ("fec", stats.fec),
        ("crc", stats.crc),
        ("hec", stats.hec),
        ("es", stats.es),
        ("ses", stats.ses),
    ] {
        samples.value(&XDSL_ERRORS, value, &[dir, kind]);
    }
}

fn ftth_samples(samples: &mut SampleSet, ftth: &FtthStatus) {
    let sfp = [
        ftth.sfp_serial.as_str(),
        ftth.sfp_model.as_str(),
        ftth.sfp_vendor.as_str(),
    ];
    samples.flag(&FTTH_SFP_PRESENT, ftth.sfp_present, &sfp);
    samples.flag(&FTTH_SFP_ALIM_OK, ftth.sfp_alim_ok, &sfp);
    samples.flag(&FTTH_SFP_HAS_POWER_REPORT, ftth.sfp_has_power_report, &sfp);
    samples.flag(&FTTH_SFP_HAS_SIGNAL, ftth.sfp_has_signal, &sfp);
    samples.flag(&FTTH_LINK, ftth.link, &sfp);

    let [serial, model, vendor] = sfp;
    samples.scaled(&FTTH_SFP_PWR, ftth.sfp_pwr_tx, CENTI, &[serial, model, vendor, "tx"]);
    samples.scaled(&FTTH_SFP_PWR, ftth.sfp_pwr_rx, CENTI, &[serial, model, vendor, "rx"]);
}
