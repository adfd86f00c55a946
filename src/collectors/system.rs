//! System Metrics Collector
//!
//! # Metrics Produced
//! - `freebox_system_uptime` - Uptime in seconds (counter)
//! - `freebox_system_temp_degrees` - Temperature sensors
//!   - Labels: id
//! - `freebox_system_fan_rpm` - Fan speeds
//!   - Labels: id
//!
//! Recent firmware reports `sensors` and `fans` lists. Older firmware only has
//! the `temp_cpum`, `temp_cpub`, `temp_sw` and `fan_rpm` fields, which are
//! used when the lists are empty.

use super::CollectionContext;
use crate::error::Result;
use crate::freebox::types::SystemInfo;
use crate::metrics::{SampleSet, SYSTEM_FAN_RPM, SYSTEM_TEMP, SYSTEM_UPTIME};

/// Collects system metrics; also returns the payload for `freebox_info`
pub async fn collect_system_metrics(ctx: &CollectionContext) -> Result<(SampleSet, SystemInfo)> {
    let system = ctx.client.system().await?;
    Ok((system_samples(&system), system))
}

pub fn system_samples(system: &SystemInfo) -> SampleSet {
    let mut samples = SampleSet::new();
    samples.value(&SYSTEM_UPTIME, system.uptime_val, &[]);

    for sensor in &system.sensors {
        samples.value(&SYSTEM_TEMP, sensor.value, &[sensor.id.as_str()]);
    }
    if system.sensors.is_empty() {
        samples.value(&SYSTEM_TEMP, system.temp_cpum, &["temp_cpum"]);
        samples.value(&SYSTEM_TEMP, system.temp_cpub, &["temp_cpub"]);
        samples.value(&SYSTEM_TEMP, system.temp_sw, &["temp_sw"]);
    }

    for fan in &system.fans {
        samples.value(&SYSTEM_FAN_RPM, fan.value, &[fan.id.as_str()]);
    }
    if system.fans.is_empty() {
        samples.value(&SYSTEM_FAN_RPM, system.fan_rpm, &["fan"]);
    }

    samples
}
