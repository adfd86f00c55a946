use anyhow::Result;
use clap::Parser;
use freebox_exporter::{
    config::Config,
    freebox::{discovery::DiscoveryMode, FreeboxClient},
    server,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Exit code for configuration problems (settings file, bad flags)
const EXIT_CONFIG: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Credentials file written after pairing (overrides config)
    #[arg(long, env = "FREEBOX_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Export per-host metrics (switch hosts, wifi stations, LAN hosts)
    #[arg(long)]
    host_details: bool,

    /// How to find the Freebox on first run
    #[arg(long, value_enum)]
    discovery: Option<DiscoveryMode>,

    /// Force an API version lower than the advertised one
    #[arg(long)]
    api_version: Option<u32>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Freebox Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let mut config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Override with CLI arguments if provided
    if let Some(token_file) = args.token_file {
        config.freebox.token_file = token_file;
    }
    if let Some(discovery) = args.discovery {
        config.freebox.discovery = discovery;
    }
    if let Some(api_version) = args.api_version {
        config.freebox.api_version = api_version;
    }
    if args.host_details {
        config.metrics.host_details = true;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }

    info!("Configuration loaded successfully");
    info!("Credentials file: {}", config.freebox.token_file.display());

    let client = match FreeboxClient::connect(&config.freebox).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    // Start the metrics server
    if let Err(e) = server::start(config, client).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
