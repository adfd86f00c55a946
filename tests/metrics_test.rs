use freebox_exporter::metrics::{self, MetricKind, SampleSet};

#[test]
fn test_render_uses_namespace_and_help() {
    // Given: One gauge and one counter sample
    let mut set = SampleSet::new();
    set.constant(&metrics::SYSTEM_TEMP, 57.0, &["temp_cpum"]);
    set.value(&metrics::SYSTEM_UPTIME, Some(3600), &[]);

    // When: Rendering
    let output = metrics::render(&set.into_samples()).expect("Failed to render metrics");

    // Then: Families carry the freebox_ prefix, their help and type
    assert!(output.contains("# HELP freebox_system_temp_degrees"));
    assert!(output.contains("# TYPE freebox_system_temp_degrees gauge"));
    assert!(output.contains("freebox_system_temp_degrees{id=\"temp_cpum\"} 57"));
    assert!(output.contains("# TYPE freebox_system_uptime counter"));
    assert!(output.contains("freebox_system_uptime 3600"));
    assert!(!output.contains("freebox_freebox_"), "double namespace prefix");
}

#[test]
fn test_render_empty_scrape() {
    let output = metrics::render(&[]).expect("Failed to render metrics");
    assert!(output.is_empty());
}

#[test]
fn test_negative_counter_is_skipped() {
    let mut set = SampleSet::new();
    set.constant(&metrics::WIFI_STATION_BYTES, -1.0, &["sta", "rx"]);
    set.constant(&metrics::WIFI_STATION_BYTES, 10.0, &["sta", "tx"]);

    let output = metrics::render(&set.into_samples()).expect("Failed to render metrics");

    assert!(output.contains("dir=\"tx\""));
    assert!(!output.contains("dir=\"rx\""));
}

#[test]
fn test_counter_descriptors_are_cumulative_values() {
    // Counters only for values that never decrease while the box is up
    for desc in [
        &metrics::SYSTEM_UPTIME,
        &metrics::CONNECTION_BYTES,
        &metrics::XDSL_ERRORS,
        &metrics::SWITCH_PORT_BYTES,
        &metrics::SWITCH_PORT_PACKETS,
        &metrics::WIFI_STATION_BYTES,
    ] {
        assert_eq!(desc.kind, MetricKind::Counter, "{}", desc.name);
    }
    assert_eq!(metrics::CONNECTION_RATE.kind, MetricKind::Gauge);
    assert_eq!(metrics::INFO.full_name(), "freebox_info");
}

#[test]
fn test_sorted_rendering_is_stable() {
    let build = |reverse: bool| {
        let mut ids = vec!["1", "2", "3"];
        if reverse {
            ids.reverse();
        }
        let mut set = SampleSet::new();
        for id in ids {
            set.constant(&metrics::SWITCH_HOST_TOTAL, 1.0, &[id]);
        }
        let mut samples = set.into_samples();
        metrics::sort_samples(&mut samples);
        samples
    };

    assert_eq!(build(false), build(true));
    assert_eq!(
        metrics::render(&build(false)).expect("render"),
        metrics::render(&build(true)).expect("render")
    );
}

#[test]
fn test_duplicate_gauge_keeps_first_value() {
    let mut set = SampleSet::new();
    set.constant(&metrics::WIFI_STATION_SIGNAL, -40.0, &["aa"]);
    set.constant(&metrics::WIFI_STATION_SIGNAL, -70.0, &["aa"]);

    let output = metrics::render(&set.into_samples()).expect("Failed to render metrics");

    assert!(output.contains("freebox_wifi_station_signal_dbm{id=\"aa\"} -40"));
    assert!(!output.contains("-70"));
}
