use freebox_exporter::config::Config;
use freebox_exporter::freebox::discovery::DiscoveryMode;

#[test]
fn test_environment_overrides_config_file() {
    // Given: Overrides for two sections (own test binary, so no other test sees them)
    std::env::set_var("FREEBOX_EXPORTER__SERVER__PORT", "9200");
    std::env::set_var("FREEBOX_EXPORTER__FREEBOX__DISCOVERY", "mdns");

    // When: Loading the shipped settings
    let config = Config::load("config/Default.toml").expect("Failed to load default config");

    // Then: Environment wins over the file, untouched keys keep the file value
    assert_eq!(config.server.port, 9200);
    assert_eq!(config.freebox.discovery, DiscoveryMode::Mdns);
    assert_eq!(config.server.addr, "0.0.0.0");
}
