//! Operator-facing status formatting
//!
//! Pure presentation of tracker and link state; consumes state, produces no
//! state. The agent exports snapshots through a `watch` channel so a display
//! task always sees the latest value without touching the control loop.

use crate::core::state::PositionFix;
use crate::core::transport::ConnectionState;
use std::fmt;
use std::time::Duration;

/// One snapshot of everything the operator display needs
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSnapshot {
    /// Best-known position fix
    pub fix: PositionFix,
    /// Satellites used in the fix
    pub satellites: u8,
    /// Broker link state
    pub link: ConnectionState,
    /// Device uptime
    pub uptime: Duration,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.uptime.as_secs();
        write!(
            f,
            "up {:02}:{:02}:{:02} | ",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60
        )?;

        if self.fix.has_fix {
            write!(
                f,
                "fix {:.5},{:.5} {:.1} km/h hdg {:.0}",
                self.fix.latitude_deg,
                self.fix.longitude_deg,
                self.fix.speed_kmh,
                self.fix.heading_deg
            )?;
        } else {
            write!(f, "no fix")?;
        }

        write!(f, " | sats {} | link {}", self.satellites, self.link)
    }
}
