/// Speed of light (m.s⁻¹)
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Earth rotation rate (rad.s⁻¹)
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 7.292_115_146_70E-5;

/// Mean Earth radius used by the ionosphere shell model (m)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_370_000.0;

/// WGS-84 ellipsoid semi major axis (m)
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS-84 ellipsoid flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Earth gravitational constant (m³.s⁻²), from GPS ICD.
/// Also applies to QZSS.
pub const GPS_GRAVITATION_MU_M3_S2: f64 = 3.986_005E14;

/// Earth gravitational constant (m³.s⁻²), from Galileo and BDS ICDs.
pub const GAL_BDS_GRAVITATION_MU_M3_S2: f64 = 3.986_004_418E14;

/// Earth gravitational constant (km³.s⁻²), from Glonass ICD.
pub const GLO_GRAVITATION_MU_KM3_S2: f64 = 398_600.44;

/// Glonass second zonal harmonic factor -3/2 J₂ μ aₑ² (km⁵.s⁻²)
pub const GLO_J2_FACTOR_KM5_S2: f64 = -26_332_671_177.69;

/// Squared Earth rotation rate used by the Glonass equations of motion (rad².s⁻²)
pub const GLO_OMEGA_SQUARED_RAD2_S2: f64 = 5.317_494E-9;

/// PZ-90 to WGS-84 small rotation angle (rad)
pub const PZ90_WGS84_ROTATION_RAD: f64 = 1.662_91E-6;

/// Relativistic clock constant -2√μ/c² (s.m⁻¹ᐟ²), from GPS ICD.
pub const GPS_RELATIVISTIC_F: f64 = -0.000_000_000_444_280_763_339_306;

/// Relativistic clock constant -2√μ/c² (s.m⁻¹ᐟ²), from Galileo and BDS ICDs.
pub const GAL_BDS_RELATIVISTIC_F: f64 = -0.000_000_000_444_280_730_904_397_75;

/// BDT is a constant 14 seconds behind GPS time.
pub const BDT_GPS_OFFSET_S: f64 = 14.0;

pub const SECONDS_PER_WEEK: u32 = 604_800;
pub const SECONDS_PER_DAY: u32 = 86_400;

/// GPS L1 carrier frequency (Hz). Also QZSS L1.
pub const GPS_L1_FREQUENCY_HZ: f64 = 154.0 * 10.23E6;

/// Galileo E1 carrier frequency (Hz)
pub const GAL_E1_FREQUENCY_HZ: f64 = 2.0 * 77.0 * 10.23E6;

/// BeiDou B1-2 carrier frequency (Hz)
pub const BDS_B1_2_FREQUENCY_HZ: f64 = 1_561.098E6;

/// Glonass G1 FDMA base frequency (Hz)
pub const GLO_G1_FREQUENCY_HZ: f64 = 1_602.0E6;

/// Glonass G1 FDMA channel spacing 9/16 MHz (Hz)
pub const GLO_G1_CHANNEL_SPACING_HZ: f64 = 562_500.0;

/// First order ionosphere range mapping 40.3 10¹⁶ (m.Hz².TECU⁻¹)
pub const IONO_RANGE_FACTOR: f64 = 40.3E16;
