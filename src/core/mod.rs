//! Core module containing the main functionality of the agent
//!
//! This module provides:
//! - Sentence framing for the GPS byte stream
//! - Tolerant NMEA sentence parsing
//! - Tracker state (position fix and satellite count)
//! - Telemetry frames and topic construction
//! - MQTT link state machine with non-blocking reconnect
//! - The cooperative control loop driving all node duties

pub mod agent;
pub mod gps;
pub mod nmea;
pub mod reader;
pub mod state;
pub mod status;
pub mod telemetry;
pub mod transport;
