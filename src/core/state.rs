//! Tracker state: the best-known position fix and satellite count
//!
//! The state is an explicit value owned by the control loop; the parser
//! result is applied through [`TrackerState::apply`] and the scheduler reads
//! through [`TrackerState::fix`]/[`TrackerState::satellites`]. The loop is a
//! single task, so no locking is involved.

use crate::core::nmea::{NmeaSentence, KNOTS_TO_KMH};

/// Best-known position/velocity sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionFix {
    /// Latitude in signed decimal degrees
    pub latitude_deg: f64,
    /// Longitude in signed decimal degrees
    pub longitude_deg: f64,
    /// Ground speed in km/h
    pub speed_kmh: f64,
    /// Course over ground in degrees
    pub heading_deg: f64,
    /// Whether the receiver currently reports a valid fix
    pub has_fix: bool,
}

/// Mutable tracker state owned by the control loop
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerState {
    fix: PositionFix,
    satellites: u8,
}

impl TrackerState {
    /// Create zeroed state (process start)
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position fix
    pub fn fix(&self) -> PositionFix {
        self.fix
    }

    /// Current satellite count
    pub fn satellites(&self) -> u8 {
        self.satellites
    }

    /// Apply a parsed sentence.
    ///
    /// An invalid fix only clears `has_fix`: latitude, longitude, speed and
    /// heading keep their last valid values. The satellite count updates
    /// independently of fix validity.
    pub fn apply(&mut self, sentence: &NmeaSentence) {
        match sentence {
            NmeaSentence::Rmc(rmc) => {
                self.fix.has_fix = rmc.valid;
                if let Some(lat) = rmc.latitude {
                    self.fix.latitude_deg = lat.to_decimal();
                }
                if let Some(lon) = rmc.longitude {
                    self.fix.longitude_deg = lon.to_decimal();
                }
                if let Some(knots) = rmc.speed_knots {
                    self.fix.speed_kmh = knots * KNOTS_TO_KMH;
                }
                if let Some(course) = rmc.course {
                    self.fix.heading_deg = course;
                }
            }
            NmeaSentence::Gga(gga) => {
                self.satellites = gga.satellites_used;
            }
        }
    }

    /// Parse and apply one line from the receiver; malformed input is a
    /// silent no-op
    pub fn apply_line(&mut self, line: &str) -> bool {
        match crate::core::nmea::parse(line) {
            Some(sentence) => {
                self.apply(&sentence);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RMC_VALID: &str =
        "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    #[test]
    fn valid_fix_updates_all_fields() {
        let mut state = TrackerState::new();
        assert!(state.apply_line(RMC_VALID));

        let fix = state.fix();
        assert!(fix.has_fix);
        assert!((fix.latitude_deg - 48.1173).abs() < 1e-4);
        assert!((fix.longitude_deg - 11.5167).abs() < 1e-3);
        assert!((fix.speed_kmh - 22.4 * 1.852).abs() < 1e-9);
        assert!((fix.heading_deg - 84.4).abs() < 1e-9);
    }

    #[test]
    fn speed_conversion_ten_knots() {
        let mut state = TrackerState::new();
        state.apply_line("$GPRMC,0,A,0000.000,N,00000.000,E,10.0,0.0,230394,,");
        assert!((state.fix().speed_kmh - 18.52).abs() < 1e-9);
    }

    #[test]
    fn invalid_fix_retains_stale_values() {
        let mut state = TrackerState::new();
        state.apply_line(RMC_VALID);
        let before = state.fix();

        assert!(state
            .apply_line("$GPRMC,123520,V,9999.999,N,9999.999,E,99.9,11.1,230394,,"));

        let after = state.fix();
        assert!(!after.has_fix);
        assert_eq!(after.latitude_deg, before.latitude_deg);
        assert_eq!(after.longitude_deg, before.longitude_deg);
        assert_eq!(after.speed_kmh, before.speed_kmh);
        assert_eq!(after.heading_deg, before.heading_deg);
    }

    #[test]
    fn short_sentence_causes_zero_mutation() {
        let mut state = TrackerState::new();
        state.apply_line(RMC_VALID);
        let before = (state.fix(), state.satellites());

        assert!(!state.apply_line("$GPRMC,123519,A,4807.038,N"));
        assert!(!state.apply_line("$GPGGA,123519,4807.038"));
        assert!(!state.apply_line("\x00\x01\x02 binary garbage"));

        assert_eq!((state.fix(), state.satellites()), before);
    }

    #[test]
    fn satellite_count_is_independent_of_fix() {
        let mut state = TrackerState::new();
        state.apply_line("$GPGGA,123519,4807.038,N,01131.000,E,0,05,0.9,545.4,M,47.0,M,,");
        assert_eq!(state.satellites(), 5);
        assert!(!state.fix().has_fix);
    }
}
