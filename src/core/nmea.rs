//! NMEA 0183 sentence parsing
//!
//! The agent recognizes two sentence kinds by their 5-character prefix:
//!
//! - RMC (recommended minimum): position, validity flag, speed, course
//! - GGA (fix data): satellite count
//!
//! Everything else (unknown prefixes, truncated writes, binary garbage)
//! parses to `None`. The parser is total over arbitrary input and never
//! touches tracker state itself; [`crate::core::state::TrackerState`] applies
//! results.

/// Conversion factor from knots to km/h
pub const KNOTS_TO_KMH: f64 = 1.852;

/// Minimum field count for an RMC sentence (through the course field)
const MIN_RMC_FIELDS: usize = 9;

/// Minimum field count for a GGA sentence (through the satellite count)
const MIN_GGA_FIELDS: usize = 8;

/// Geographic coordinate in NMEA degrees-minutes form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Unsigned decimal degrees
    pub degrees: f64,
    /// Hemisphere letter (N/S for latitude, E/W for longitude); `None` when
    /// the receiver omitted it
    pub hemisphere: Option<char>,
}

impl Coordinate {
    /// Parse the NMEA `DDMM.MMMM` format plus hemisphere field
    pub fn parse(value: &str, hemisphere: &str) -> Option<Self> {
        let value: f64 = value.parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }

        let degrees = (value / 100.0).floor();
        let minutes = value - degrees * 100.0;

        Some(Self {
            degrees: degrees + minutes / 60.0,
            hemisphere: hemisphere.chars().next(),
        })
    }

    /// Signed decimal degrees; `S` and `W` negate, anything else (including
    /// a missing hemisphere) leaves the sign positive
    pub fn to_decimal(self) -> f64 {
        match self.hemisphere {
            Some('S') | Some('W') => -self.degrees,
            _ => self.degrees,
        }
    }
}

/// Parsed RMC sentence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmcData {
    /// Whether the receiver reported the fix as valid (`A` status)
    pub valid: bool,
    /// Latitude; populated only for valid fixes
    pub latitude: Option<Coordinate>,
    /// Longitude; populated only for valid fixes
    pub longitude: Option<Coordinate>,
    /// Speed over ground in knots; populated only for valid fixes
    pub speed_knots: Option<f64>,
    /// Course over ground in degrees; populated only for valid fixes
    pub course: Option<f64>,
}

/// Parsed GGA sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GgaData {
    /// Number of satellites used in the fix
    pub satellites_used: u8,
}

/// A recognized NMEA sentence
#[derive(Debug, Clone, PartialEq)]
pub enum NmeaSentence {
    /// Position/velocity fix
    Rmc(RmcData),
    /// Fix quality (satellite count)
    Gga(GgaData),
}

/// Calculate the NMEA checksum (XOR of all bytes between `$` and `*`)
pub fn calculate_checksum(data: &str) -> u8 {
    data.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Strip `$` and any `*HH` trailer, verifying the checksum when present.
///
/// Returns the payload between `$` and `*`, or `None` when the sentence is
/// not `$`-framed or carries a checksum that does not match.
fn checked_payload(sentence: &str) -> Option<&str> {
    let sentence = sentence.trim();
    let data = sentence.strip_prefix('$')?;

    match data.rsplit_once('*') {
        Some((payload, checksum)) => {
            let expected = u8::from_str_radix(checksum.trim(), 16).ok()?;
            (calculate_checksum(payload) == expected).then_some(payload)
        }
        None => Some(data),
    }
}

/// Parse a single line into a recognized sentence.
///
/// Returns `None` for unknown prefixes, short sentences, checksum
/// mismatches and anything else malformed; the caller treats `None` as
/// silent discard.
pub fn parse(line: &str) -> Option<NmeaSentence> {
    let payload = checked_payload(line)?;
    let fields: Vec<&str> = payload.split(',').collect();

    match fields[0] {
        "GPRMC" | "GNRMC" => parse_rmc(&fields),
        "GPGGA" | "GNGGA" => parse_gga(&fields),
        _ => None,
    }
}

fn parse_rmc(fields: &[&str]) -> Option<NmeaSentence> {
    if fields.len() < MIN_RMC_FIELDS {
        return None;
    }

    // Invalid fix: record the loss and stop. Numeric fields stay unparsed
    // so the tracker keeps its last good values.
    if fields[2] != "A" {
        return Some(NmeaSentence::Rmc(RmcData::default()));
    }

    Some(NmeaSentence::Rmc(RmcData {
        valid: true,
        latitude: Coordinate::parse(fields[3], fields[4]),
        longitude: Coordinate::parse(fields[5], fields[6]),
        speed_knots: fields[7].parse().ok().filter(|v: &f64| v.is_finite()),
        course: fields[8].parse().ok().filter(|v: &f64| v.is_finite()),
    }))
}

fn parse_gga(fields: &[&str]) -> Option<NmeaSentence> {
    if fields.len() < MIN_GGA_FIELDS {
        return None;
    }

    let satellites_used = fields[7].parse().ok()?;
    Some(NmeaSentence::Gga(GgaData { satellites_used }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RMC_VALID: &str =
        "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
    const GGA_VALID: &str =
        "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    #[test]
    fn coordinate_degrees_minutes_conversion() {
        let coord = Coordinate::parse("4807.038", "N").unwrap();
        assert!((coord.to_decimal() - 48.1173).abs() < 1e-4);
    }

    #[test]
    fn southern_hemisphere_negates() {
        let coord = Coordinate::parse("4807.038", "S").unwrap();
        assert!((coord.to_decimal() + 48.1173).abs() < 1e-4);

        let coord = Coordinate::parse("01131.000", "W").unwrap();
        assert!(coord.to_decimal() < 0.0);
    }

    #[test]
    fn missing_hemisphere_stays_positive() {
        let coord = Coordinate::parse("4807.038", "").unwrap();
        assert!(coord.to_decimal() > 0.0);
    }

    #[test]
    fn rmc_valid_fix() {
        let Some(NmeaSentence::Rmc(rmc)) = parse(RMC_VALID) else {
            panic!("expected RMC");
        };
        assert!(rmc.valid);
        assert!((rmc.latitude.unwrap().to_decimal() - 48.1173).abs() < 1e-4);
        assert!((rmc.longitude.unwrap().to_decimal() - 11.5167).abs() < 1e-3);
        assert!((rmc.speed_knots.unwrap() - 22.4).abs() < 1e-9);
        assert!((rmc.course.unwrap() - 84.4).abs() < 1e-9);
    }

    #[test]
    fn rmc_invalid_fix_parses_no_numeric_fields() {
        let Some(NmeaSentence::Rmc(rmc)) =
            parse("$GPRMC,123519,V,4807.038,N,01131.000,E,022.4,084.4,230394,,")
        else {
            panic!("expected RMC");
        };
        assert!(!rmc.valid);
        assert!(rmc.latitude.is_none());
        assert!(rmc.longitude.is_none());
        assert!(rmc.speed_knots.is_none());
        assert!(rmc.course.is_none());
    }

    #[test]
    fn short_rmc_is_rejected() {
        assert_eq!(parse("$GPRMC,123519,A,4807.038,N"), None);
    }

    #[test]
    fn gga_satellite_count() {
        let Some(NmeaSentence::Gga(gga)) = parse(GGA_VALID) else {
            panic!("expected GGA");
        };
        assert_eq!(gga.satellites_used, 8);
    }

    #[test]
    fn gga_missing_trailing_fields_is_ignored() {
        assert_eq!(parse("$GPGGA,123519,4807.038,N,01131.000,E,1"), None);
    }

    #[test]
    fn unknown_prefix_is_ignored() {
        assert_eq!(parse("$GPVTG,084.4,T,,M,022.4,N,041.5,K*43"), None);
    }

    #[test]
    fn garbage_never_panics() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("no dollar sign"), None);
        assert_eq!(parse("$"), None);
        assert_eq!(parse("$GPRMC"), None);
        assert_eq!(parse("\u{fffd}\u{fffd}\u{fffd}"), None);
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let tampered =
            "$GPRMC,123519,A,4807.038,N,01131.000,E,099.9,084.4,230394,003.1,W*6A";
        assert_eq!(parse(tampered), None);
    }

    #[test]
    fn checksum_calculation_matches_reference() {
        let payload = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert_eq!(calculate_checksum(payload), 0x47);
    }
}
