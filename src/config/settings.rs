//! Agent settings: device identity, GPS source, broker and schedule

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentConfig {
    /// Device identity
    pub device: DeviceSettings,
    /// GPS byte-stream source
    pub gps: GpsSettings,
    /// MQTT broker settings
    pub mqtt: MqttSettings,
    /// Telemetry schedule settings
    pub telemetry: TelemetrySettings,
}

impl AgentConfig {
    /// Load config from the platform config directory, falling back to
    /// defaults when no file exists yet
    pub fn load() -> anyhow::Result<Self> {
        let config_path = super::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?
            .join("config.toml");

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the platform config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = super::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(dir.join("config.toml"), content)?;
        Ok(())
    }
}

/// Device identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Device identifier used in topic names (e.g. a bus number)
    pub id: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            id: "bus-001".to_string(),
        }
    }
}

/// GPS byte-stream source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GpsSettings {
    /// Serial port receiver
    Serial(SerialConfig),
    /// TCP sentence feed (bench rigs, replay servers)
    Tcp(TcpConfig),
}

impl Default for GpsSettings {
    fn default() -> Self {
        Self::Serial(SerialConfig::default())
    }
}

/// Serial port configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl SerialConfig {
    /// Create a new serial configuration
    pub fn new(port: &str, baud_rate: u32) -> Self {
        Self {
            port: port.to_string(),
            baud_rate,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new("/dev/ttyUSB0", 9600)
    }
}

/// TCP sentence-feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Connection timeout in seconds
    pub timeout_secs: u64,
}

impl TcpConfig {
    /// Create a new TCP configuration
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            timeout_secs: 10,
        }
    }
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self::new("localhost", 7000)
    }
}

/// MQTT broker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    /// Broker host address
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier; defaults to the device id when empty
    pub client_id: Option<String>,
    /// Username for broker authentication
    pub username: Option<String>,
    /// Password for broker authentication
    pub password: Option<String>,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// Delay between reconnect attempts (seconds)
    pub retry_delay_secs: u64,
    /// Capacity of the pending-frame queue used while disconnected
    pub pending_frames: usize,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: None,
            username: None,
            password: None,
            keep_alive_secs: 30,
            retry_delay_secs: 2,
            pending_frames: 8,
        }
    }
}

/// Telemetry schedule settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Publish period in milliseconds
    pub interval_ms: u64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self { interval_ms: 5000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = AgentConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AgentConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.device.id, "bus-001");
        assert_eq!(parsed.mqtt.port, 1883);
        assert_eq!(parsed.mqtt.retry_delay_secs, 2);
        assert_eq!(parsed.telemetry.interval_ms, 5000);
        match parsed.gps {
            GpsSettings::Serial(serial) => {
                assert_eq!(serial.baud_rate, 9600);
            }
            GpsSettings::Tcp(_) => panic!("default source should be serial"),
        }
    }

    #[test]
    fn load_from_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [device]
            id = "bus-042"

            [gps]
            kind = "tcp"
            host = "10.0.0.5"
            port = 7700
            timeout_secs = 3

            [mqtt]
            host = "broker.example"
            port = 1884
            keep_alive_secs = 15
            retry_delay_secs = 4
            pending_frames = 16

            [telemetry]
            interval_ms = 1000
            "#,
        )
        .unwrap();

        let config = AgentConfig::load_from(&path).unwrap();
        assert_eq!(config.device.id, "bus-042");
        assert_eq!(config.mqtt.host, "broker.example");
        assert_eq!(config.telemetry.interval_ms, 1000);
        match config.gps {
            GpsSettings::Tcp(tcp) => assert_eq!(tcp.port, 7700),
            GpsSettings::Serial(_) => panic!("expected tcp source"),
        }
    }
}
