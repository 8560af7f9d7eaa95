//! Bustrackd - GPS telemetry agent daemon
//!
//! Reads NMEA sentences from a GPS receiver, maintains the best-known
//! position, and periodically publishes telemetry frames to an MQTT broker.

use anyhow::Context;
use bustrack_core::{config, Agent, AgentConfig, GpsSettings, SerialConfig};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Bustrack telemetry agent
#[derive(Parser, Debug)]
#[command(
    name = "bustrackd",
    author = "Bustrack Team",
    version,
    about = "GPS telemetry agent for vehicle tracking nodes",
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the device identifier
    #[arg(long, env = "BUSTRACK_DEVICE_ID")]
    device_id: Option<String>,

    /// Override the MQTT broker host
    #[arg(long, env = "BUSTRACK_BROKER")]
    broker: Option<String>,

    /// Override the GPS serial port
    #[arg(long)]
    gps_port: Option<String>,

    /// Override the telemetry interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Print a status line every N seconds
    #[arg(long, value_name = "SECS")]
    status_interval: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    tracing::info!("Starting bustrackd v{}", env!("CARGO_PKG_VERSION"));

    if cli.init_config {
        config::init_directories()?;
        AgentConfig::default()
            .save()
            .context("failed to write default config")?;
        tracing::info!("default config written");
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => AgentConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AgentConfig::load().context("failed to load config")?,
    };

    if let Some(id) = cli.device_id {
        config.device.id = id;
    }
    if let Some(host) = cli.broker {
        config.mqtt.host = host;
    }
    if let Some(port) = cli.gps_port {
        match &mut config.gps {
            GpsSettings::Serial(serial) => serial.port = port,
            other => *other = GpsSettings::Serial(SerialConfig::new(&port, 9600)),
        }
    }
    if let Some(interval) = cli.interval_ms {
        config.telemetry.interval_ms = interval;
    }

    let agent = Agent::new(config);

    if let Some(secs) = cli.status_interval {
        let mut status_rx = agent.status();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
            loop {
                ticker.tick().await;
                let snapshot = *status_rx.borrow_and_update();
                println!("{snapshot}");
            }
        });
    }

    tokio::select! {
        result = agent.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
            Ok(())
        }
    }
}
