//! Freebox Prometheus Exporter
//!
//! A Prometheus metrics exporter for Freebox routers (Freebox OS API v4 and newer).
//!
//! # Overview
//!
//! The exporter finds the Freebox on the local network, pairs with it once
//! (the owner approves the app on the box's front panel), then logs in with
//! the challenge/response scheme and serves the box's counters and gauges in
//! the Prometheus text format. Every scrape queries the box afresh.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐       HTTPS          ┌──────────────┐
//! │   Freebox   │ ◄─────────────────►  │   Exporter   │
//! │     OS      │   REST + envelope    │              │
//! └─────────────┘                      │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                      │  │Session │  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Collect.│  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`freebox`] - Discovery, version negotiation, pairing, session and API types
//! - [`collectors`] - Per-category metric collection
//! - [`metrics`] - Metric definitions, samples and text rendering
//! - [`server`] - HTTP server
//! - [`config`] - Settings and pairing credentials
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use freebox_exporter::{config::Config, freebox::FreeboxClient, server};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let client = Arc::new(FreeboxClient::connect(&config.freebox).await?);
//!     server::start(config, client).await?;
//!     Ok(())
//! }
//! ```

pub mod collectors;
pub mod config;
pub mod error;
pub mod freebox;
pub mod metrics;
pub mod server;
