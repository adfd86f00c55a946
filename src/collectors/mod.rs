//! Metrics Collectors
//!
//! This module contains one collector per category of Freebox metrics. Each
//! collector queries its endpoints and converts the payloads into samples.
//!
//! # Architecture
//!
//! Collectors follow a consistent pattern:
//! - Accept a `CollectionContext` containing the shared client and settings
//! - Query the Freebox API, fanning out per port / access point / interface
//! - Build a `SampleSet` with the pure `*_samples` functions
//! - Return `Result`, the orchestrator turns it into a `CollectionStatus`
//!
//! [`collect_all`] spawns the five categories concurrently, each bounded by
//! the scrape timeout, then appends `freebox_info` and `freebox_exporter_info`.
//!
//! # Error Handling
//!
//! Individual collector failures are non-fatal: they log a warning and the
//! category's samples are simply missing from this scrape. A failed leaf
//! request (one port, one access point, one interface) only removes the
//! samples that depend on it.

use crate::config::MetricsConfig;
use crate::freebox::types::{ConnectionStatus, SystemInfo};
use crate::freebox::FreeboxClient;
use crate::metrics::{self, Sample, SampleSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod connection;
pub mod lan;
pub mod switch;
pub mod system;
pub mod wifi;

pub use connection::collect_connection_metrics;
pub use lan::collect_lan_metrics;
pub use switch::collect_switch_metrics;
pub use system::collect_system_metrics;
pub use wifi::collect_wifi_metrics;

/// Shared context passed to all collectors
///
/// Cheap to clone; every spawned category task owns a copy.
#[derive(Clone)]
pub struct CollectionContext {
    /// Freebox API client for querying endpoints
    pub client: Arc<FreeboxClient>,
    /// Metrics configuration (host details, scrape timeout)
    pub config: Arc<MetricsConfig>,
}

/// Status of a metrics collection operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Metrics were successfully collected
    Success,
    /// Some of the category's requests failed, the rest was collected
    Degraded,
    /// Collection failed but is non-fatal (already logged as warning)
    Failed,
}

/// Handle the outcome of one category
///
/// - On success: processes data, returns `CollectionStatus::Success`
/// - On error: logs warning, returns `CollectionStatus::Failed` (non-fatal)
pub fn collect_with_handler<T, E, P>(
    name: &str,
    result: Result<T, E>,
    process: P,
) -> CollectionStatus
where
    E: std::fmt::Display,
    P: FnOnce(T),
{
    match result {
        Ok(data) => {
            process(data);
            debug!("Collected {} metrics", name);
            CollectionStatus::Success
        }
        Err(e) => {
            warn!("Failed to query {}: {}", name, e);
            CollectionStatus::Failed
        }
    }
}

/// Run a category on its own task, bounded by `timeout`
async fn run_category<T, F>(timeout: Duration, future: F) -> anyhow::Result<T>
where
    F: Future<Output = crate::error::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(tokio::time::timeout(timeout, future)).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(_)) => anyhow::bail!("timed out after {:?}", timeout),
        Err(e) => anyhow::bail!("collection task failed: {}", e),
    }
}

/// Labels of `freebox_info`, empty for categories that failed
#[derive(Debug, Clone, Default)]
struct InfoLabels {
    firmware: String,
    mac: String,
    serial: String,
    boardname: String,
    box_flavor: String,
    connection_type: String,
    connection_state: String,
    connection_media: String,
    ipv4: String,
    ipv6: String,
}

impl InfoLabels {
    fn with_system(&mut self, system: SystemInfo) {
        self.firmware = system.firmware_version;
        self.mac = system.mac.to_lowercase();
        self.serial = system.serial;
        self.boardname = system.board_name;
        self.box_flavor = system.box_flavor;
    }

    fn with_connection(&mut self, connection: ConnectionStatus) {
        self.connection_type = connection.kind;
        self.connection_state = connection.state;
        self.connection_media = connection.media;
        self.ipv4 = connection.ipv4;
        self.ipv6 = connection.ipv6;
    }

    fn push(&self, samples: &mut SampleSet) {
        samples.constant(
            &metrics::INFO,
            1.0,
            &[
                self.firmware.as_str(),
                self.mac.as_str(),
                self.serial.as_str(),
                self.boardname.as_str(),
                self.box_flavor.as_str(),
                self.connection_type.as_str(),
                self.connection_state.as_str(),
                self.connection_media.as_str(),
                self.ipv4.as_str(),
                self.ipv6.as_str(),
            ],
        );
    }
}

/// Result of one scrape
#[derive(Debug)]
pub struct Scrape {
    pub samples: Vec<Sample>,
    pub statuses: Vec<(&'static str, CollectionStatus)>,
}

impl Scrape {
    /// At least one category produced samples
    pub fn any_success(&self) -> bool {
        self.statuses
            .iter()
            .any(|(_, status)| *status != CollectionStatus::Failed)
    }

    pub fn all_success(&self) -> bool {
        self.statuses
            .iter()
            .all(|(_, status)| *status == CollectionStatus::Success)
    }

    pub fn status(&self, category: &str) -> Option<CollectionStatus> {
        self.statuses
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, status)| *status)
    }
}

/// Collect every category concurrently
pub async fn collect_all(ctx: &CollectionContext) -> Scrape {
    let timeout = Duration::from_secs(ctx.config.scrape_timeout_seconds);

    let (system, connection, switch, wifi, lan) = {
        let (c1, c2, c3, c4, c5) = (ctx.clone(), ctx.clone(), ctx.clone(), ctx.clone(), ctx.clone());
        tokio::join!(
            run_category(timeout, async move { collect_system_metrics(&c1).await }),
            run_category(timeout, async move { collect_connection_metrics(&c2).await }),
            run_category(timeout, async move { collect_switch_metrics(&c3).await }),
            run_category(timeout, async move { collect_wifi_metrics(&c4).await }),
            run_category(timeout, async move { collect_lan_metrics(&c5).await }),
        )
    };

    let mut samples = SampleSet::new();
    let mut info = InfoLabels::default();

    let mut wifi_complete = true;
    let mut wifi_status = collect_with_handler("wifi", wifi, |(set, complete)| {
        samples.extend(set);
        wifi_complete = complete;
    });
    if wifi_status == CollectionStatus::Success && !wifi_complete {
        warn!("Wifi metrics are incomplete");
        wifi_status = CollectionStatus::Degraded;
    }

    let statuses = vec![
        (
            "system",
            collect_with_handler("system", system, |(set, data)| {
                samples.extend(set);
                info.with_system(data);
            }),
        ),
        (
            "connection",
            collect_with_handler("connection", connection, |(set, data)| {
                samples.extend(set);
                info.with_connection(data);
            }),
        ),
        ("switch", collect_with_handler("switch", switch, |set| samples.extend(set))),
        ("wifi", wifi_status),
        ("lan", collect_with_handler("lan", lan, |set| samples.extend(set))),
    ];

    let all_success = statuses
        .iter()
        .all(|(_, status)| *status == CollectionStatus::Success);
    let api = ctx.client.api();
    samples.constant(
        &metrics::EXPORTER_INFO,
        metrics::bool_value(all_success),
        &[api.url("").as_str(), api.info.api_version.as_str()],
    );
    info.push(&mut samples);

    let mut samples = samples.into_samples();
    metrics::sort_samples(&mut samples);
    Scrape { samples, statuses }
}
