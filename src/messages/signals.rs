//! Per constellation signal tables and SSR enum tables.

use gnss_rs::prelude::Constellation;

use crate::{
    constants::{
        BDS_B1_2_FREQUENCY_HZ, GAL_E1_FREQUENCY_HZ, GLO_G1_CHANNEL_SPACING_HZ,
        GLO_G1_FREQUENCY_HZ, GPS_L1_FREQUENCY_HZ,
    },
    errors::DecodingError,
};

/// SSR update interval table (seconds), indexed by the 4 bit
/// update interval field.
pub const UPDATE_INTERVALS_S: [u16; 16] = [
    1, 2, 5, 10, 15, 30, 60, 120, 240, 300, 600, 900, 1800, 3600, 7200, 10800,
];

/// Resolves the 4 bit update interval index to seconds.
pub fn update_interval_s(index: u8) -> u16 {
    UPDATE_INTERVALS_S[(index & 0x0F) as usize]
}

/// GPS signal & tracking mode identifiers. Indices 3-4 and 13-14
/// are not assigned.
const GPS_SIGNALS: [Option<&str>; 21] = [
    Some("1C"),
    Some("1P"),
    Some("1W"),
    None,
    None,
    Some("2C"),
    Some("2D"),
    Some("2S"),
    Some("2L"),
    Some("2X"),
    Some("2P"),
    Some("2W"),
    Some("2Y"),
    None,
    None,
    Some("5I"),
    Some("5Q"),
    Some("5X"),
    Some("1S"),
    Some("1L"),
    Some("1X"),
];

/// Glonass signal & tracking mode identifiers (FDMA signals only).
const GLO_SIGNALS: [Option<&str>; 4] = [Some("1C"), Some("1P"), Some("2C"), Some("2P")];

/// Galileo signal & tracking mode identifiers.
const GAL_SIGNALS: [Option<&str>; 19] = [
    Some("1A"),
    Some("1B"),
    Some("1C"),
    Some("1X"),
    Some("1Z"),
    Some("5I"),
    Some("5Q"),
    Some("5X"),
    Some("7I"),
    Some("7Q"),
    Some("7X"),
    Some("8I"),
    Some("8Q"),
    Some("8X"),
    Some("6A"),
    Some("6B"),
    Some("6C"),
    Some("6X"),
    Some("6Z"),
];

/// BeiDou signal & tracking mode identifiers.
const BDS_SIGNALS: [Option<&str>; 9] = [
    Some("2I"),
    Some("2Q"),
    Some("2X"),
    Some("6I"),
    Some("6Q"),
    Some("6X"),
    Some("7I"),
    Some("7Q"),
    Some("7X"),
];

/// QZSS signal & tracking mode identifiers.
const QZS_SIGNALS: [Option<&str>; 12] = [
    Some("1C"),
    Some("1S"),
    Some("1L"),
    Some("2S"),
    Some("2L"),
    Some("2X"),
    Some("5I"),
    Some("5Q"),
    Some("5X"),
    Some("6S"),
    Some("6L"),
    Some("6X"),
];

/// Resolves a tracking mode index to a two character signal name.
/// Unassigned and out of range indices resolve to None and the
/// related signal entry must be skipped.
pub fn signal_name(constellation: Constellation, index: u8) -> Option<&'static str> {
    let table: &[Option<&str>] = match constellation {
        Constellation::GPS => &GPS_SIGNALS,
        Constellation::Glonass => &GLO_SIGNALS,
        Constellation::Galileo => &GAL_SIGNALS,
        Constellation::BeiDou => &BDS_SIGNALS,
        Constellation::QZSS => &QZS_SIGNALS,
        _ => return None,
    };

    *table.get(index as usize)?
}

/// Resolves a tracking mode index, failing with
/// [DecodingError::UnresolvedTrackingMode] on unassigned and
/// out of range indices.
pub fn resolve_tracking_mode(
    constellation: Constellation,
    index: u8,
) -> Result<&'static str, DecodingError> {
    signal_name(constellation, index)
        .ok_or(DecodingError::UnresolvedTrackingMode(constellation, index))
}

/// Tracking mode the OSR translation defaults to,
/// per constellation.
pub fn default_tracking_mode(constellation: Constellation) -> &'static str {
    match constellation {
        Constellation::Galileo => "1X",
        Constellation::BeiDou => "2I",
        _ => "1C",
    }
}

/// Carrier frequency the OSR translation defaults to: L1 for GPS and
/// QZSS, G1 with the FDMA channel offset for Glonass, E1 for Galileo,
/// B1-2 for BeiDou.
pub fn default_frequency_hz(constellation: Constellation, glonass_channel: i8) -> f64 {
    match constellation {
        Constellation::Glonass => {
            GLO_G1_FREQUENCY_HZ + glonass_channel as f64 * GLO_G1_CHANNEL_SPACING_HZ
        }
        Constellation::Galileo => GAL_E1_FREQUENCY_HZ,
        Constellation::BeiDou => BDS_B1_2_FREQUENCY_HZ,
        _ => GPS_L1_FREQUENCY_HZ,
    }
}
