//! Broadcast ephemeris messages: 1019 (GPS), 1020 (Glonass),
//! 1042 (BDS), 1044 (QZSS), 1045/1046 (Galileo F/NAV, I/NAV).

use std::fmt;

use gnss_rs::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bits::BitReader,
    errors::DecodingError,
    messages::two_pow,
    time::{resolve_gps_week, TimeContext, BDT_GPS_WEEK_ORIGIN, GST_GPS_WEEK_ORIGIN},
    Vector3D,
};

/// QZSS PRN numbers start at 193; the wire field carries an index.
pub const QZSS_PRN_OFFSET: u8 = 192;

/// Keplerian broadcast ephemeris, common to GPS, Galileo,
/// BDS and QZSS radio messages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerEphemeris {
    /// Satellite identity
    pub sv: SV,

    /// Week counter, rebased to the continuous GPS week numbering
    /// (GST and BDT origins are accounted for at decoding time).
    pub week: u32,

    /// Issue of data (IODE for GPS/QZSS, IODnav for Galileo,
    /// AODE for BDS). The matching SSR orbit correction carries
    /// the same value.
    pub iode: u16,

    /// Issue of data, clock (GPS and QZSS only)
    pub iodc: Option<u16>,

    /// Time of ephemeris, seconds of week in the constellation time frame.
    pub toe_s: u32,

    /// Time of clock, seconds of week in the constellation time frame.
    pub toc_s: u32,

    /// Square root of the semi major axis (m¹ᐟ²)
    pub sqrt_a: f64,

    /// Orbital eccentricity
    pub ecc: f64,

    /// Mean anomaly at reference time (rad)
    pub m0_rad: f64,

    /// Mean motion difference (rad.s⁻¹)
    pub dn_rad_s: f64,

    /// Inclination at reference time (rad)
    pub i0_rad: f64,

    /// Inclination rate of change (rad.s⁻¹)
    pub idot_rad_s: f64,

    /// Longitude of ascending node at reference time (rad)
    pub omega0_rad: f64,

    /// Right ascension rate of change (rad.s⁻¹)
    pub omega_dot_rad_s: f64,

    /// Argument of perigee (rad)
    pub omega_rad: f64,

    /// Sine harmonic correction of the orbit radius (m)
    pub crs_m: f64,

    /// Cosine harmonic correction of the orbit radius (m)
    pub crc_m: f64,

    /// Sine harmonic correction of the argument of latitude (rad)
    pub cus_rad: f64,

    /// Cosine harmonic correction of the argument of latitude (rad)
    pub cuc_rad: f64,

    /// Sine harmonic correction of the inclination (rad)
    pub cis_rad: f64,

    /// Cosine harmonic correction of the inclination (rad)
    pub cic_rad: f64,

    /// Clock bias (s)
    pub af0_s: f64,

    /// Clock drift (s.s⁻¹)
    pub af1_s_s: f64,

    /// Clock drift rate (s.s⁻²)
    pub af2_s_s2: f64,

    /// Group delay (s): TGD for GPS/QZSS, BGD E5a/E1 for Galileo,
    /// TGD1 for BDS.
    pub tgd_s: f64,

    /// Second group delay (s): BGD E5b/E1 (Galileo I/NAV),
    /// TGD2 (BDS).
    pub tgd2_s: Option<f64>,

    /// URA (GPS/QZSS/BDS) or SISA (Galileo) index, as broadcast.
    pub ura_index: u8,

    /// Health bits, as broadcast (constellation dependent).
    pub health: u8,

    /// GPS/QZSS codes on L2 indicator
    pub code_on_l2: Option<u8>,

    /// GPS L2P data flag
    pub l2p_data: Option<bool>,

    /// GPS/QZSS fit interval flag
    pub fit_interval: Option<bool>,
}

impl KeplerEphemeris {
    /// Semi major axis (m)
    pub fn semi_major_axis_m(&self) -> f64 {
        self.sqrt_a * self.sqrt_a
    }

    /// Message 1019: GPS ephemeris.
    pub(crate) fn decode_gps(
        reader: &mut BitReader,
        context: &TimeContext,
    ) -> Result<Self, DecodingError> {
        let prn = reader.unsigned(6)? as u8;
        let week = resolve_gps_week(reader.unsigned(10)? as u32, context.reference_week);
        let ura_index = reader.unsigned(4)? as u8;
        let code_on_l2 = reader.unsigned(2)? as u8;
        let idot_rad_s = reader.signed(14)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let iode = reader.unsigned(8)? as u16;
        let toc_s = reader.unsigned(16)? as u32 * 16;
        let af2_s_s2 = reader.signed(8)? as f64 * two_pow(-55);
        let af1_s_s = reader.signed(16)? as f64 * two_pow(-43);
        let af0_s = reader.signed(22)? as f64 * two_pow(-31);
        let iodc = reader.unsigned(10)? as u16;
        let crs_m = reader.signed(16)? as f64 * two_pow(-5);
        let dn_rad_s = reader.signed(16)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let m0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cuc_rad = reader.signed(16)? as f64 * two_pow(-29);
        let ecc = reader.unsigned(32)? as f64 * two_pow(-33);
        let cus_rad = reader.signed(16)? as f64 * two_pow(-29);
        let sqrt_a = reader.unsigned(32)? as f64 * two_pow(-19);
        let toe_s = reader.unsigned(16)? as u32 * 16;
        let cic_rad = reader.signed(16)? as f64 * two_pow(-29);
        let omega0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cis_rad = reader.signed(16)? as f64 * two_pow(-29);
        let i0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let crc_m = reader.signed(16)? as f64 * two_pow(-5);
        let omega_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let omega_dot_rad_s = reader.signed(24)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let tgd_s = reader.signed(8)? as f64 * two_pow(-31);
        let health = reader.unsigned(6)? as u8;
        let l2p_data = reader.flag()?;
        let fit_interval = reader.flag()?;

        Ok(Self {
            sv: SV::new(Constellation::GPS, prn),
            week,
            iode,
            iodc: Some(iodc),
            toe_s,
            toc_s,
            sqrt_a,
            ecc,
            m0_rad,
            dn_rad_s,
            i0_rad,
            idot_rad_s,
            omega0_rad,
            omega_dot_rad_s,
            omega_rad,
            crs_m,
            crc_m,
            cus_rad,
            cuc_rad,
            cis_rad,
            cic_rad,
            af0_s,
            af1_s_s,
            af2_s_s2,
            tgd_s,
            tgd2_s: None,
            ura_index,
            health,
            code_on_l2: Some(code_on_l2),
            l2p_data: Some(l2p_data),
            fit_interval: Some(fit_interval),
        })
    }

    /// Message 1044: QZSS ephemeris. Satellite indices are offset
    /// by 192 into the QZSS PRN range.
    pub(crate) fn decode_qzss(
        reader: &mut BitReader,
        context: &TimeContext,
    ) -> Result<Self, DecodingError> {
        let prn = reader.unsigned(4)? as u8 + QZSS_PRN_OFFSET;
        let toc_s = reader.unsigned(16)? as u32 * 16;
        let af2_s_s2 = reader.signed(8)? as f64 * two_pow(-55);
        let af1_s_s = reader.signed(16)? as f64 * two_pow(-43);
        let af0_s = reader.signed(22)? as f64 * two_pow(-31);
        let iode = reader.unsigned(8)? as u16;
        let crs_m = reader.signed(16)? as f64 * two_pow(-5);
        let dn_rad_s = reader.signed(16)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let m0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cuc_rad = reader.signed(16)? as f64 * two_pow(-29);
        let ecc = reader.unsigned(32)? as f64 * two_pow(-33);
        let cus_rad = reader.signed(16)? as f64 * two_pow(-29);
        let sqrt_a = reader.unsigned(32)? as f64 * two_pow(-19);
        let toe_s = reader.unsigned(16)? as u32 * 16;
        let cic_rad = reader.signed(16)? as f64 * two_pow(-29);
        let omega0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cis_rad = reader.signed(16)? as f64 * two_pow(-29);
        let i0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let crc_m = reader.signed(16)? as f64 * two_pow(-5);
        let omega_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let omega_dot_rad_s = reader.signed(24)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let idot_rad_s = reader.signed(14)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let code_on_l2 = reader.unsigned(2)? as u8;
        let week = resolve_gps_week(reader.unsigned(10)? as u32, context.reference_week);
        let ura_index = reader.unsigned(4)? as u8;
        let health = reader.unsigned(6)? as u8;
        let tgd_s = reader.signed(8)? as f64 * two_pow(-31);
        let iodc = reader.unsigned(10)? as u16;
        let fit_interval = reader.flag()?;

        Ok(Self {
            sv: SV::new(Constellation::QZSS, prn),
            week,
            iode,
            iodc: Some(iodc),
            toe_s,
            toc_s,
            sqrt_a,
            ecc,
            m0_rad,
            dn_rad_s,
            i0_rad,
            idot_rad_s,
            omega0_rad,
            omega_dot_rad_s,
            omega_rad,
            crs_m,
            crc_m,
            cus_rad,
            cuc_rad,
            cis_rad,
            cic_rad,
            af0_s,
            af1_s_s,
            af2_s_s2,
            tgd_s,
            tgd2_s: None,
            ura_index,
            health,
            code_on_l2: Some(code_on_l2),
            l2p_data: None,
            fit_interval: Some(fit_interval),
        })
    }

    /// Message 1042: BDS ephemeris. Weeks count in BDT and are
    /// rebased at the BDT origin.
    pub(crate) fn decode_bds(reader: &mut BitReader) -> Result<Self, DecodingError> {
        let prn = reader.unsigned(6)? as u8;
        let week = reader.unsigned(13)? as u32 + BDT_GPS_WEEK_ORIGIN;
        let ura_index = reader.unsigned(4)? as u8;
        let idot_rad_s = reader.signed(14)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let iode = reader.unsigned(5)? as u16; // AODE
        let toc_s = reader.unsigned(17)? as u32 * 8;
        let af2_s_s2 = reader.signed(11)? as f64 * two_pow(-66);
        let af1_s_s = reader.signed(22)? as f64 * two_pow(-50);
        let af0_s = reader.signed(24)? as f64 * two_pow(-33);
        let aodc = reader.unsigned(5)? as u16;
        let crs_m = reader.signed(18)? as f64 * two_pow(-6);
        let dn_rad_s = reader.signed(16)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let m0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cuc_rad = reader.signed(18)? as f64 * two_pow(-31);
        let ecc = reader.unsigned(32)? as f64 * two_pow(-33);
        let cus_rad = reader.signed(18)? as f64 * two_pow(-31);
        let sqrt_a = reader.unsigned(32)? as f64 * two_pow(-19);
        let toe_s = reader.unsigned(17)? as u32 * 8;
        let cic_rad = reader.signed(18)? as f64 * two_pow(-31);
        let omega0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cis_rad = reader.signed(18)? as f64 * two_pow(-31);
        let i0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let crc_m = reader.signed(18)? as f64 * two_pow(-6);
        let omega_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let omega_dot_rad_s = reader.signed(24)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let tgd_s = reader.signed(10)? as f64 * 1.0E-10;
        let tgd2_s = reader.signed(10)? as f64 * 1.0E-10;
        let health = reader.unsigned(1)? as u8;

        Ok(Self {
            sv: SV::new(Constellation::BeiDou, prn),
            week,
            iode,
            iodc: Some(aodc),
            toe_s,
            toc_s,
            sqrt_a,
            ecc,
            m0_rad,
            dn_rad_s,
            i0_rad,
            idot_rad_s,
            omega0_rad,
            omega_dot_rad_s,
            omega_rad,
            crs_m,
            crc_m,
            cus_rad,
            cuc_rad,
            cis_rad,
            cic_rad,
            af0_s,
            af1_s_s,
            af2_s_s2,
            tgd_s,
            tgd2_s: Some(tgd2_s),
            ura_index,
            health,
            code_on_l2: None,
            l2p_data: None,
            fit_interval: None,
        })
    }

    /// Messages 1045 (F/NAV) and 1046 (I/NAV): Galileo ephemeris.
    /// Weeks count in GST and are rebased at the GST origin.
    /// I/NAV frames carry both broadcast group delays.
    pub(crate) fn decode_galileo(
        reader: &mut BitReader,
        inav: bool,
    ) -> Result<Self, DecodingError> {
        let prn = reader.unsigned(6)? as u8;
        let week = reader.unsigned(12)? as u32 + GST_GPS_WEEK_ORIGIN;
        let iode = reader.unsigned(10)? as u16; // IODnav
        let ura_index = reader.unsigned(8)? as u8; // SISA
        let idot_rad_s = reader.signed(14)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let toc_s = reader.unsigned(14)? as u32 * 60;
        let af2_s_s2 = reader.signed(6)? as f64 * two_pow(-59);
        let af1_s_s = reader.signed(21)? as f64 * two_pow(-46);
        let af0_s = reader.signed(31)? as f64 * two_pow(-34);
        let crs_m = reader.signed(16)? as f64 * two_pow(-5);
        let dn_rad_s = reader.signed(16)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let m0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cuc_rad = reader.signed(16)? as f64 * two_pow(-29);
        let ecc = reader.unsigned(32)? as f64 * two_pow(-33);
        let cus_rad = reader.signed(16)? as f64 * two_pow(-29);
        let sqrt_a = reader.unsigned(32)? as f64 * two_pow(-19);
        let toe_s = reader.unsigned(14)? as u32 * 60;
        let cic_rad = reader.signed(16)? as f64 * two_pow(-29);
        let omega0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let cis_rad = reader.signed(16)? as f64 * two_pow(-29);
        let i0_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let crc_m = reader.signed(16)? as f64 * two_pow(-5);
        let omega_rad = reader.signed(32)? as f64 * two_pow(-31) * std::f64::consts::PI;
        let omega_dot_rad_s = reader.signed(24)? as f64 * two_pow(-43) * std::f64::consts::PI;
        let tgd_s = reader.signed(10)? as f64 * two_pow(-32); // BGD E5a/E1

        let (tgd2_s, health) = if inav {
            let bgd_e5b = reader.signed(10)? as f64 * two_pow(-32);
            let e5b_health = reader.unsigned(2)? as u8;
            let e5b_validity = reader.unsigned(1)? as u8;
            let e1b_health = reader.unsigned(2)? as u8;
            let e1b_validity = reader.unsigned(1)? as u8;
            reader.unsigned(2)?; // reserved

            (
                Some(bgd_e5b),
                e5b_health << 4 | e5b_validity << 3 | e1b_health << 1 | e1b_validity,
            )
        } else {
            let e5a_health = reader.unsigned(2)? as u8;
            let e5a_validity = reader.unsigned(1)? as u8;
            reader.unsigned(7)?; // reserved

            (None, e5a_health << 1 | e5a_validity)
        };

        Ok(Self {
            sv: SV::new(Constellation::Galileo, prn),
            week,
            iode,
            iodc: None,
            toe_s,
            toc_s,
            sqrt_a,
            ecc,
            m0_rad,
            dn_rad_s,
            i0_rad,
            idot_rad_s,
            omega0_rad,
            omega_dot_rad_s,
            omega_rad,
            crs_m,
            crc_m,
            cus_rad,
            cuc_rad,
            cis_rad,
            cic_rad,
            af0_s,
            af1_s_s,
            af2_s_s2,
            tgd_s,
            tgd2_s,
            ura_index,
            health,
            code_on_l2: None,
            l2p_data: None,
            fit_interval: None,
        })
    }
}

impl fmt::Display for KeplerEphemeris {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "satellite      : {}", self.sv)?;
        writeln!(f, "week           : {}", self.week)?;
        writeln!(f, "IOD            : {}", self.iode)?;
        writeln!(f, "toe            : {} [s]", self.toe_s)?;
        writeln!(f, "toc            : {} [s]", self.toc_s)?;
        writeln!(f, "sqrt(A)        : {:.9} [m^1/2]", self.sqrt_a)?;
        writeln!(f, "e              : {:.12}", self.ecc)?;
        writeln!(f, "M0             : {:.12} [rad]", self.m0_rad)?;
        writeln!(f, "delta n        : {:.12e} [rad/s]", self.dn_rad_s)?;
        writeln!(f, "i0             : {:.12} [rad]", self.i0_rad)?;
        writeln!(f, "idot           : {:.12e} [rad/s]", self.idot_rad_s)?;
        writeln!(f, "omega0         : {:.12} [rad]", self.omega0_rad)?;
        writeln!(f, "omega dot      : {:.12e} [rad/s]", self.omega_dot_rad_s)?;
        writeln!(f, "omega          : {:.12} [rad]", self.omega_rad)?;
        writeln!(f, "Crs, Crc       : {:.4}, {:.4} [m]", self.crs_m, self.crc_m)?;
        writeln!(
            f,
            "Cus, Cuc       : {:.12e}, {:.12e} [rad]",
            self.cus_rad, self.cuc_rad
        )?;
        writeln!(
            f,
            "Cis, Cic       : {:.12e}, {:.12e} [rad]",
            self.cis_rad, self.cic_rad
        )?;
        writeln!(
            f,
            "af0, af1, af2  : {:.12e} [s], {:.12e} [s/s], {:.12e} [s/s^2]",
            self.af0_s, self.af1_s_s, self.af2_s_s2
        )?;

        match (self.sv.constellation, self.tgd2_s) {
            (Constellation::Galileo, Some(bgd)) => {
                writeln!(f, "BGD E5a/E1     : {:.12e} [s]", self.tgd_s)?;
                writeln!(f, "BGD E5b/E1     : {:.12e} [s]", bgd)?;
            }
            (Constellation::Galileo, None) => {
                writeln!(f, "BGD E5a/E1     : {:.12e} [s]", self.tgd_s)?;
            }
            (Constellation::BeiDou, Some(tgd2)) => {
                writeln!(f, "TGD1, TGD2     : {:.12e}, {:.12e} [s]", self.tgd_s, tgd2)?;
            }
            _ => {
                writeln!(f, "TGD            : {:.12e} [s]", self.tgd_s)?;
            }
        }

        writeln!(f, "URA/SISA index : {}", self.ura_index)?;
        write!(f, "health         : {:#04x}", self.health)
    }
}

/// Glonass broadcast ephemeris (message 1020): PZ-90 state vector,
/// accelerations and clock model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlonassEphemeris {
    /// Satellite identity
    pub sv: SV,

    /// FDMA frequency channel, -7..+13
    pub channel: i8,

    /// Almanac health flag (Cn)
    pub almanac_health: bool,

    /// True when the almanac health flag is provided
    pub almanac_health_available: bool,

    /// P1 update period indicator
    pub p1: u8,

    /// Frame time tk, seconds into the current Moscow day
    pub tk_s: u32,

    /// Bn health flag (MSB), true when unhealthy
    pub bn_unhealthy: bool,

    /// P2 flag
    pub p2: bool,

    /// Reference time tb, seconds into the current Moscow day
    /// (15 minute grid)
    pub tb_s: u32,

    /// PZ-90 position (km)
    pub position_km: Vector3D,

    /// PZ-90 velocity (km.s⁻¹)
    pub velocity_km_s: Vector3D,

    /// PZ-90 luni-solar acceleration (km.s⁻²)
    pub acceleration_km_s2: Vector3D,

    /// P3 flag
    pub p3: bool,

    /// Relative frequency deviation γ
    pub gamma: f64,

    /// P flag
    pub p: u8,

    /// ln health flag (third string)
    pub ln3: bool,

    /// Clock bias τ (s)
    pub tau_s: f64,

    /// Time difference between L1 and L2 transmission paths (s)
    pub delta_tau_s: f64,

    /// Age of operational information (days)
    pub en_days: u8,

    /// P4 flag
    pub p4: bool,

    /// Ft URA index
    pub ft: u8,

    /// Day number within the four year interval
    pub nt: u16,

    /// Satellite type M
    pub m: u8,

    /// True when the additional data fields (NA, τc, N4, τGPS)
    /// are provided
    pub additional_data: bool,

    /// Almanac day number
    pub na: Option<u16>,

    /// Glonass system time to UTC(SU) offset τc (s)
    pub tau_c_s: Option<f64>,

    /// Four year interval number
    pub n4: Option<u8>,

    /// Glonass to GPS system time offset (s)
    pub tau_gps_s: Option<f64>,

    /// ln health flag (fifth string)
    pub ln5: Option<bool>,
}

impl GlonassEphemeris {
    /// Message 1020: Glonass ephemeris. State vector components use
    /// an explicit sign bit followed by the magnitude.
    pub(crate) fn decode(reader: &mut BitReader) -> Result<Self, DecodingError> {
        let prn = reader.unsigned(6)? as u8;
        let channel = reader.unsigned(5)? as i8 - 7;
        let almanac_health = reader.flag()?;
        let almanac_health_available = reader.flag()?;
        let p1 = reader.unsigned(2)? as u8;

        let tk_h = reader.unsigned(5)? as u32;
        let tk_m = reader.unsigned(6)? as u32;
        let tk_30 = reader.unsigned(1)? as u32;
        let tk_s = tk_h * 3600 + tk_m * 60 + tk_30 * 30;

        let bn_unhealthy = reader.flag()?;
        let p2 = reader.flag()?;
        let tb_s = reader.unsigned(7)? as u32 * 900;

        let mut velocity_km_s = (0.0, 0.0, 0.0);
        let mut position_km = (0.0, 0.0, 0.0);
        let mut acceleration_km_s2 = (0.0, 0.0, 0.0);

        for axis in 0..3 {
            let velocity = reader.sign_magnitude(24)? as f64 * two_pow(-20);
            let position = reader.sign_magnitude(27)? as f64 * two_pow(-11);
            let acceleration = reader.sign_magnitude(5)? as f64 * two_pow(-30);

            match axis {
                0 => {
                    velocity_km_s.0 = velocity;
                    position_km.0 = position;
                    acceleration_km_s2.0 = acceleration;
                }
                1 => {
                    velocity_km_s.1 = velocity;
                    position_km.1 = position;
                    acceleration_km_s2.1 = acceleration;
                }
                _ => {
                    velocity_km_s.2 = velocity;
                    position_km.2 = position;
                    acceleration_km_s2.2 = acceleration;
                }
            }
        }

        let p3 = reader.flag()?;
        let gamma = reader.sign_magnitude(11)? as f64 * two_pow(-40);
        let p = reader.unsigned(2)? as u8;
        let ln3 = reader.flag()?;
        let tau_s = reader.sign_magnitude(22)? as f64 * two_pow(-30);
        let delta_tau_s = reader.sign_magnitude(5)? as f64 * two_pow(-30);
        let en_days = reader.unsigned(5)? as u8;
        let p4 = reader.flag()?;
        let ft = reader.unsigned(4)? as u8;
        let nt = reader.unsigned(11)? as u16;
        let m = reader.unsigned(2)? as u8;

        let additional_data = reader.flag()?;
        let na = reader.unsigned(11)? as u16;
        let tau_c_s = reader.sign_magnitude(32)? as f64 * two_pow(-31);
        let n4 = reader.unsigned(5)? as u8;
        let tau_gps_s = reader.sign_magnitude(22)? as f64 * two_pow(-30);
        let ln5 = reader.flag()?;
        reader.unsigned(7)?; // reserved

        Ok(Self {
            sv: SV::new(Constellation::Glonass, prn),
            channel,
            almanac_health,
            almanac_health_available,
            p1,
            tk_s,
            bn_unhealthy,
            p2,
            tb_s,
            position_km,
            velocity_km_s,
            acceleration_km_s2,
            p3,
            gamma,
            p,
            ln3,
            tau_s,
            delta_tau_s,
            en_days,
            p4,
            ft,
            nt,
            m,
            additional_data,
            na: additional_data.then_some(na),
            tau_c_s: additional_data.then_some(tau_c_s),
            n4: additional_data.then_some(n4),
            tau_gps_s: additional_data.then_some(tau_gps_s),
            ln5: additional_data.then_some(ln5),
        })
    }
}

impl fmt::Display for GlonassEphemeris {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "satellite      : {}", self.sv)?;
        writeln!(f, "channel        : {}", self.channel)?;
        writeln!(f, "tk             : {} [s]", self.tk_s)?;
        writeln!(f, "tb             : {} [s]", self.tb_s)?;
        writeln!(f, "nt             : {} [days]", self.nt)?;

        let (x, y, z) = self.position_km;
        writeln!(f, "position       : {:.6}, {:.6}, {:.6} [km]", x, y, z)?;

        let (x, y, z) = self.velocity_km_s;
        writeln!(f, "velocity       : {:.9}, {:.9}, {:.9} [km/s]", x, y, z)?;

        let (x, y, z) = self.acceleration_km_s2;
        writeln!(
            f,
            "acceleration   : {:.12e}, {:.12e}, {:.12e} [km/s^2]",
            x, y, z
        )?;

        writeln!(f, "tau            : {:.12e} [s]", self.tau_s)?;
        writeln!(f, "gamma          : {:.12e}", self.gamma)?;
        writeln!(f, "delta tau      : {:.12e} [s]", self.delta_tau_s)?;

        if let Some(n4) = self.n4 {
            writeln!(f, "N4             : {}", n4)?;
        }
        if let Some(tau_c) = self.tau_c_s {
            writeln!(f, "tau c          : {:.12e} [s]", tau_c)?;
        }

        write!(
            f,
            "health (Bn)    : {}",
            if self.bn_unhealthy {
                "unhealthy"
            } else {
                "healthy"
            }
        )
    }
}
