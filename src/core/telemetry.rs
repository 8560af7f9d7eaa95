//! Telemetry frames and broker topic construction
//!
//! A frame is an immutable snapshot of tracker state taken at each scheduler
//! tick and serialized as a compact JSON object. The timestamp is device
//! uptime in milliseconds; the node has no calendar time source.

use crate::core::state::PositionFix;
use serde::Serialize;

/// One telemetry snapshot, produced per scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryFrame {
    /// Latitude in signed decimal degrees
    #[serde(rename = "latitude")]
    pub latitude_deg: f64,
    /// Longitude in signed decimal degrees
    #[serde(rename = "longitude")]
    pub longitude_deg: f64,
    /// Ground speed in km/h
    #[serde(rename = "speed")]
    pub speed_kmh: f64,
    /// Course over ground in degrees
    #[serde(rename = "heading")]
    pub heading_deg: f64,
    /// Device uptime in milliseconds
    #[serde(rename = "timestamp")]
    pub uptime_ms: f64,
}

impl TelemetryFrame {
    /// Build a frame from the current fix. Frames are produced regardless
    /// of fix validity; a stale position is still worth reporting.
    pub fn from_fix(fix: &PositionFix, uptime_ms: f64) -> Self {
        Self {
            latitude_deg: fix.latitude_deg,
            longitude_deg: fix.longitude_deg,
            speed_kmh: fix.speed_kmh,
            heading_deg: fix.heading_deg,
            uptime_ms,
        }
    }

    /// Serialize the frame to its JSON wire form
    pub fn to_payload(&self) -> Vec<u8> {
        // Serialization of a plain float struct cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Topic the agent publishes telemetry on
pub fn telemetry_topic(device_id: &str) -> String {
    format!("buses/{device_id}/telemetry")
}

/// Topic the agent listens on for inbound commands
pub fn command_topic(device_id: &str) -> String {
    format!("buses/{device_id}/cmd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names_match_consumer_contract() {
        let fix = PositionFix {
            latitude_deg: 48.1173,
            longitude_deg: 11.5167,
            speed_kmh: 18.52,
            heading_deg: 84.4,
            has_fix: true,
        };
        let frame = TelemetryFrame::from_fix(&fix, 12_000.0);
        let value: serde_json::Value =
            serde_json::from_slice(&frame.to_payload()).unwrap();

        assert!((value["latitude"].as_f64().unwrap() - 48.1173).abs() < 1e-9);
        assert!((value["longitude"].as_f64().unwrap() - 11.5167).abs() < 1e-9);
        assert!((value["speed"].as_f64().unwrap() - 18.52).abs() < 1e-9);
        assert!((value["heading"].as_f64().unwrap() - 84.4).abs() < 1e-9);
        assert!((value["timestamp"].as_f64().unwrap() - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn frames_are_produced_without_fix() {
        let fix = PositionFix {
            latitude_deg: 48.0,
            longitude_deg: 11.0,
            speed_kmh: 10.0,
            heading_deg: 90.0,
            has_fix: false,
        };
        let frame = TelemetryFrame::from_fix(&fix, 1.0);
        assert_eq!(frame.latitude_deg, 48.0);
        assert_eq!(frame.speed_kmh, 10.0);
    }

    #[test]
    fn topics_are_scoped_by_device() {
        assert_eq!(telemetry_topic("bus-042"), "buses/bus-042/telemetry");
        assert_eq!(command_topic("bus-042"), "buses/bus-042/cmd");
    }
}
