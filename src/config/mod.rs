//! Configuration module
//!
//! Handles agent settings: device identity, GPS source, MQTT broker and
//! telemetry schedule.

mod settings;

pub use settings::{
    AgentConfig, DeviceSettings, GpsSettings, MqttSettings, SerialConfig, TcpConfig,
    TelemetrySettings,
};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the agent configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "bustrack", "Bustrack").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the agent data directory
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "bustrack", "Bustrack").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Initialize agent directories
pub fn init_directories() -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
    }
    if let Some(dir) = data_dir() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}
