//! SSR orbit, clock, combined, URA and high-rate clock messages.

use std::fmt;

use gnss_rs::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bits::BitReader,
    errors::DecodingError,
    messages::{ephemeris::QZSS_PRN_OFFSET, signals::update_interval_s},
};

/// Width of the SSR epoch field: Glonass streams seconds of day,
/// all others seconds of week.
fn epoch_bits(constellation: Constellation) -> usize {
    if constellation == Constellation::Glonass {
        17
    } else {
        20
    }
}

/// Width of the per satellite id field.
fn satellite_bits(constellation: Constellation) -> usize {
    match constellation {
        Constellation::Glonass => 5,
        Constellation::QZSS => 4,
        _ => 6,
    }
}

/// Width of the issue of data field bound to orbit corrections.
fn iod_bits(constellation: Constellation) -> usize {
    match constellation {
        Constellation::Galileo | Constellation::BeiDou => 10,
        _ => 8,
    }
}

/// Reads the per satellite id field, offsetting QZSS indices
/// into the PRN range.
pub(crate) fn satellite_id(
    reader: &mut BitReader,
    constellation: Constellation,
) -> Result<SV, DecodingError> {
    let mut prn = reader.unsigned(satellite_bits(constellation))? as u8;

    if constellation == Constellation::QZSS {
        prn += QZSS_PRN_OFFSET;
    }

    Ok(SV::new(constellation, prn))
}

/// Common SSR message header.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SsrHeader {
    /// Epoch: seconds of week, or seconds of day for Glonass streams.
    pub epoch_s: u32,

    /// SSR update interval (s)
    pub update_interval_s: u16,

    /// Multiple message indicator
    pub multiple_message: bool,

    /// Satellite reference datum flag, orbit bearing messages only
    pub satellite_datum: Option<bool>,

    /// IOD SSR
    pub iod_ssr: u8,

    /// SSR provider ID
    pub provider_id: u16,

    /// SSR solution ID
    pub solution_id: u8,

    /// Number of satellites
    pub satellites: u8,
}

impl SsrHeader {
    pub(crate) fn decode(
        reader: &mut BitReader,
        constellation: Constellation,
        with_datum: bool,
    ) -> Result<Self, DecodingError> {
        let epoch_s = reader.unsigned(epoch_bits(constellation))? as u32;
        let update_interval_s = update_interval_s(reader.unsigned(4)? as u8);
        let multiple_message = reader.flag()?;

        let satellite_datum = if with_datum {
            Some(reader.flag()?)
        } else {
            None
        };

        let iod_ssr = reader.unsigned(4)? as u8;
        let provider_id = reader.unsigned(16)? as u16;
        let solution_id = reader.unsigned(4)? as u8;
        let satellites = reader.unsigned(6)? as u8;

        Ok(Self {
            epoch_s,
            update_interval_s,
            multiple_message,
            satellite_datum,
            iod_ssr,
            provider_id,
            solution_id,
            satellites,
        })
    }
}

impl fmt::Display for SsrHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "epoch          : {} [s]", self.epoch_s)?;
        writeln!(f, "update interval: {} [s]", self.update_interval_s)?;
        writeln!(f, "multiple msg   : {}", self.multiple_message as u8)?;
        writeln!(f, "IOD SSR        : {}", self.iod_ssr)?;
        writeln!(f, "provider ID    : {}", self.provider_id)?;
        writeln!(f, "solution ID    : {}", self.solution_id)?;
        write!(f, "satellites     : {}", self.satellites)
    }
}

/// Radial / along track / cross track orbit correction of one
/// satellite, in meters, with first order rates. Only applicable
/// to the broadcast ephemeris carrying the same issue of data.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitCorrection {
    /// Satellite identity
    pub sv: SV,

    /// Issue of data of the reference broadcast ephemeris
    pub iode: u16,

    /// Radial offset (m)
    pub radial_m: f64,

    /// Along track offset (m)
    pub along_m: f64,

    /// Cross track offset (m)
    pub cross_m: f64,

    /// Radial velocity (m.s⁻¹)
    pub radial_rate_m_s: f64,

    /// Along track velocity (m.s⁻¹)
    pub along_rate_m_s: f64,

    /// Cross track velocity (m.s⁻¹)
    pub cross_rate_m_s: f64,
}

impl OrbitCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let iode = reader.unsigned(iod_bits(constellation))? as u16;

        // radial at 0.1 mm, along/cross at 0.4 mm,
        // rates at 0.001 mm/s and 0.004 mm/s
        let radial_m = reader.signed(22)? as f64 * 1.0E-4;
        let along_m = reader.signed(20)? as f64 * 4.0E-4;
        let cross_m = reader.signed(20)? as f64 * 4.0E-4;
        let radial_rate_m_s = reader.signed(21)? as f64 * 1.0E-6;
        let along_rate_m_s = reader.signed(19)? as f64 * 4.0E-6;
        let cross_rate_m_s = reader.signed(19)? as f64 * 4.0E-6;

        Ok(Self {
            sv,
            iode,
            radial_m,
            along_m,
            cross_m,
            radial_rate_m_s,
            along_rate_m_s,
            cross_rate_m_s,
        })
    }
}

impl fmt::Display for OrbitCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} IOD={:<4} dr={:8.4} da={:8.4} dc={:8.4} [m] ddr={:9.6} dda={:9.6} ddc={:9.6} [m/s]",
            self.sv,
            self.iode,
            self.radial_m,
            self.along_m,
            self.cross_m,
            self.radial_rate_m_s,
            self.along_rate_m_s,
            self.cross_rate_m_s,
        )
    }
}

/// Clock correction polynomial of one satellite,
/// in SI units (m, m.s⁻¹, m.s⁻²).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockCorrection {
    /// Satellite identity
    pub sv: SV,

    /// Polynomial constant (m)
    pub c0_m: f64,

    /// Polynomial drift (m.s⁻¹)
    pub c1_m_s: f64,

    /// Polynomial drift rate (m.s⁻²)
    pub c2_m_s2: f64,
}

impl ClockCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let (c0_m, c1_m_s, c2_m_s2) = Self::decode_polynomial(reader)?;

        Ok(Self {
            sv,
            c0_m,
            c1_m_s,
            c2_m_s2,
        })
    }

    // C0 at 0.1 mm, C1 at 0.001 mm/s, C2 at 0.00002 mm/s²
    fn decode_polynomial(reader: &mut BitReader) -> Result<(f64, f64, f64), DecodingError> {
        let c0_m = reader.signed(22)? as f64 * 1.0E-4;
        let c1_m_s = reader.signed(21)? as f64 * 1.0E-6;
        let c2_m_s2 = reader.signed(27)? as f64 * 2.0E-8;
        Ok((c0_m, c1_m_s, c2_m_s2))
    }

    /// Evaluates the polynomial `dt` seconds past the message epoch.
    pub fn correction_m(&self, dt: f64) -> f64 {
        self.c0_m + self.c1_m_s * dt + self.c2_m_s2 * dt * dt
    }
}

impl fmt::Display for ClockCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} C0={:8.4} [m] C1={:9.6} [m/s] C2={:11.8} [m/s^2]",
            self.sv, self.c0_m, self.c1_m_s, self.c2_m_s2,
        )
    }
}

/// Combined orbit and clock correction of one satellite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitClockCorrection {
    /// Orbit components
    pub orbit: OrbitCorrection,

    /// Clock components
    pub clock: ClockCorrection,
}

impl OrbitClockCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let orbit = OrbitCorrection::decode(reader, constellation)?;
        let (c0_m, c1_m_s, c2_m_s2) = ClockCorrection::decode_polynomial(reader)?;

        Ok(Self {
            clock: ClockCorrection {
                sv: orbit.sv,
                c0_m,
                c1_m_s,
                c2_m_s2,
            },
            orbit,
        })
    }
}

/// User range accuracy of one satellite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UraCorrection {
    /// Satellite identity
    pub sv: SV,

    /// URA class (3 bits)
    pub class: u8,

    /// URA value (3 bits)
    pub value: u8,
}

impl UraCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let class = reader.unsigned(3)? as u8;
        let value = reader.unsigned(3)? as u8;
        Ok(Self { sv, class, value })
    }

    /// Scalar URA (m): (3ᶜˡᵃˢˢ (1 + value/4) - 1) / 1000.
    pub fn ura_m(&self) -> f64 {
        (3.0_f64.powi(self.class as i32) * (1.0 + self.value as f64 / 4.0) - 1.0) / 1000.0
    }
}

impl fmt::Display for UraCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} class={} value={} ura={:.6} [m]",
            self.sv,
            self.class,
            self.value,
            self.ura_m(),
        )
    }
}

/// High rate clock correction of one satellite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HighRateClockCorrection {
    /// Satellite identity
    pub sv: SV,

    /// High rate clock offset (m)
    pub offset_m: f64,
}

impl HighRateClockCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let offset_m = reader.signed(22)? as f64 * 1.0E-4;
        Ok(Self { sv, offset_m })
    }
}

impl fmt::Display for HighRateClockCorrection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} high rate clock={:8.4} [m]", self.sv, self.offset_m)
    }
}

macro_rules! ssr_message {
    ($(#[$doc: meta])* $name: ident, $correction: ty, $with_datum: expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name {
            /// Constellation this message applies to
            pub constellation: Constellation,

            /// SSR [SsrHeader]
            pub header: SsrHeader,

            /// Per satellite corrections
            pub corrections: Vec<$correction>,
        }

        impl $name {
            pub(crate) fn decode(
                reader: &mut BitReader,
                constellation: Constellation,
            ) -> Result<Self, DecodingError> {
                let header = SsrHeader::decode(reader, constellation, $with_datum)?;

                let mut corrections = Vec::with_capacity(header.satellites as usize);
                for _ in 0..header.satellites {
                    corrections.push(<$correction>::decode(reader, constellation)?);
                }

                Ok(Self {
                    constellation,
                    header,
                    corrections,
                })
            }

            /// Returns the correction that applies to requested satellite.
            pub fn correction(&self, sv: SV) -> Option<&$correction> {
                self.corrections.iter().find(|corr| corr.sv() == sv)
            }
        }
    };
}

ssr_message!(
    /// SSR orbit corrections (messages 1057, 1063, 1240, 1246, 1258).
    OrbitCorrections,
    OrbitCorrection,
    true
);

ssr_message!(
    /// SSR clock corrections (messages 1058, 1064, 1241, 1247, 1259).
    ClockCorrections,
    ClockCorrection,
    false
);

ssr_message!(
    /// SSR combined orbit and clock corrections
    /// (messages 1060, 1066, 1243, 1249, 1261).
    OrbitClockCorrections,
    OrbitClockCorrection,
    true
);

ssr_message!(
    /// SSR user range accuracy (messages 1061, 1067, 1244, 1250, 1262).
    UraCorrections,
    UraCorrection,
    false
);

ssr_message!(
    /// SSR high rate clock corrections (messages 1245, 1251, 1263).
    HighRateClockCorrections,
    HighRateClockCorrection,
    false
);

pub(crate) trait PerSatellite {
    fn sv(&self) -> SV;
}

impl PerSatellite for OrbitCorrection {
    fn sv(&self) -> SV {
        self.sv
    }
}

impl PerSatellite for ClockCorrection {
    fn sv(&self) -> SV {
        self.sv
    }
}

impl PerSatellite for OrbitClockCorrection {
    fn sv(&self) -> SV {
        self.orbit.sv
    }
}

impl PerSatellite for UraCorrection {
    fn sv(&self) -> SV {
        self.sv
    }
}

impl PerSatellite for HighRateClockCorrection {
    fn sv(&self) -> SV {
        self.sv
    }
}

impl fmt::Display for OrbitCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for correction in self.corrections.iter() {
            writeln!(f, "{}", correction)?;
        }
        Ok(())
    }
}

impl fmt::Display for ClockCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for correction in self.corrections.iter() {
            writeln!(f, "{}", correction)?;
        }
        Ok(())
    }
}

impl fmt::Display for OrbitClockCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for correction in self.corrections.iter() {
            writeln!(f, "{}", correction.orbit)?;
            writeln!(f, "{}", correction.clock)?;
        }
        Ok(())
    }
}

impl fmt::Display for UraCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for correction in self.corrections.iter() {
            writeln!(f, "{}", correction)?;
        }
        Ok(())
    }
}

impl fmt::Display for HighRateClockCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for correction in self.corrections.iter() {
            writeln!(f, "{}", correction)?;
        }
        Ok(())
    }
}
