//! # Bustrack Core Library
//!
//! A telemetry agent for vehicle tracking nodes:
//! - Reads NMEA sentences from a GPS receiver (serial port or TCP feed)
//! - Maintains the best-known position/heading/speed state
//! - Periodically publishes a compact JSON frame to an MQTT broker
//!
//! The agent is built for unattended operation on an unreliable link: the
//! sentence parser is total over arbitrary byte input, and the MQTT link is
//! a polled state machine that retries forever without starving GPS
//! ingestion or the telemetry schedule.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bustrack_core::{Agent, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AgentConfig::load()?;
//!     let agent = Agent::new(config);
//!     agent.run().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::config::{
    AgentConfig, GpsSettings, MqttSettings, SerialConfig, TcpConfig, TelemetrySettings,
};
pub use crate::core::agent::Agent;
pub use crate::core::gps::GpsError;
pub use crate::core::nmea::{Coordinate, GgaData, NmeaSentence, RmcData};
pub use crate::core::reader::SentenceCodec;
pub use crate::core::state::{PositionFix, TrackerState};
pub use crate::core::status::StatusSnapshot;
pub use crate::core::telemetry::TelemetryFrame;
pub use crate::core::transport::{ConnectionState, LinkError, MqttLink};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
