//! LAN Metrics Collector
//!
//! Queries `lan/browser/interfaces/`, then `lan/browser/<name>/` for every
//! interface concurrently. Interfaces whose host list cannot be fetched are
//! left out.
//!
//! # Metrics Produced
//! - `freebox_lan_host_total` - Hosts per interface
//!   - Labels: interface, active
//! - `freebox_lan_host_active_l2` - Per host, 1 when active (host details only)
//!   - Labels: interface, vendor_name, primary_name, host_type, l2_type, l2_id
//! - `freebox_lan_host_active_l3` - Per host address (host details only)
//!   - Labels: same as L2 plus l3_type, l3_address

use super::CollectionContext;
use crate::error::Result;
use crate::freebox::types::LanHost;
use crate::metrics::*;
use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::warn;

pub async fn collect_lan_metrics(ctx: &CollectionContext) -> Result<SampleSet> {
    let interfaces = ctx.client.lan_interfaces().await?;
    let hosts = join_all(
        interfaces
            .iter()
            .map(|interface| ctx.client.lan_hosts(&interface.name)),
    )
    .await;

    let mut by_interface: HashMap<String, Vec<LanHost>> = HashMap::new();
    for (interface, hosts) in interfaces.into_iter().zip(hosts) {
        match hosts {
            Ok(hosts) => {
                by_interface.insert(interface.name, hosts);
            }
            Err(e) => warn!("Failed to query hosts of interface {}: {}", interface.name, e),
        }
    }

    Ok(lan_samples(&by_interface, ctx.config.host_details))
}

pub fn lan_samples(by_interface: &HashMap<String, Vec<LanHost>>, host_details: bool) -> SampleSet {
    let mut samples = SampleSet::new();

    for (interface, hosts) in by_interface {
        let interface = interface.as_str();
        let active = hosts
            .iter()
            .filter(|host| host.active.unwrap_or(false))
            .count();
        let inactive = hosts.len() - active;

        samples.constant(&LAN_HOST_TOTAL, active as f64, &[interface, "true"]);
        samples.constant(&LAN_HOST_TOTAL, inactive as f64, &[interface, "false"]);

        if !host_details {
            continue;
        }
        for host in hosts {
            let l2_id = host.l2ident.id.to_lowercase();
            let l2 = [
                interface,
                host.vendor_name.as_str(),
                host.primary_name.as_str(),
                host.host_type.as_str(),
                host.l2ident.kind.as_str(),
                l2_id.as_str(),
            ];
            samples.constant(
                &LAN_HOST_ACTIVE_L2,
                bool_value(host.active.unwrap_or(false)),
                &l2,
            );

            for l3 in &host.l3connectivities {
                let [i, vendor, primary, kind, l2_type, l2_id] = l2;
                samples.constant(
                    &LAN_HOST_ACTIVE_L3,
                    bool_value(l3.active.unwrap_or(false)),
                    &[
                        i,
                        vendor,
                        primary,
                        kind,
                        l2_type,
                        l2_id,
                        l3.af.as_str(),
                        l3.addr.as_str(),
                    ],
                );
            }
        }
    }

    samples
}
