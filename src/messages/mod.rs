//! RTCM-SSR message catalog: the single place that maps a message
//! number to a typed, decoded record.

pub mod bias;
pub mod corrections;
pub mod ephemeris;
pub mod signals;
pub mod vtec;

use std::fmt;

use gnss_rs::prelude::Constellation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{bits::BitReader, errors::DecodingError, time::TimeContext};

use bias::{CodeBiasCorrections, PhaseBiasCorrections};
use corrections::{
    ClockCorrections, HighRateClockCorrections, OrbitClockCorrections, OrbitCorrections,
    UraCorrections,
};
use ephemeris::{GlonassEphemeris, KeplerEphemeris};
use vtec::VtecMessage;

/// Power of two scale factor, as listed by the RTCM field tables.
pub(crate) fn two_pow(exponent: i32) -> f64 {
    2.0_f64.powi(exponent)
}

/// Every message of the RTCM-SSR subset, decoded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RtcmMessage {
    /// 1019: GPS ephemeris
    GpsEphemeris(KeplerEphemeris),

    /// 1020: Glonass ephemeris
    GlonassEphemeris(GlonassEphemeris),

    /// 1042: BDS ephemeris
    BdsEphemeris(KeplerEphemeris),

    /// 1044: QZSS ephemeris
    QzssEphemeris(KeplerEphemeris),

    /// 1045: Galileo F/NAV ephemeris
    GalileoFnavEphemeris(KeplerEphemeris),

    /// 1046: Galileo I/NAV ephemeris
    GalileoInavEphemeris(KeplerEphemeris),

    /// 1057, 1063, 1240, 1246, 1258: orbit corrections
    Orbit(OrbitCorrections),

    /// 1058, 1064, 1241, 1247, 1259: clock corrections
    Clock(ClockCorrections),

    /// 1060, 1066, 1243, 1249, 1261: combined orbit and clock
    OrbitClock(OrbitClockCorrections),

    /// 1059, 1065, 1242, 1248, 1260: code biases
    CodeBias(CodeBiasCorrections),

    /// 1265, 1266, 1267, 1268, 1270: phase biases
    PhaseBias(PhaseBiasCorrections),

    /// 1061, 1067, 1244, 1250, 1262: user range accuracy
    Ura(UraCorrections),

    /// 1245, 1251, 1263: high rate clock corrections
    HighRateClock(HighRateClockCorrections),

    /// 1264: VTEC spherical harmonics
    Vtec(VtecMessage),
}

impl RtcmMessage {
    /// Decodes one message payload. The first 12 bits select the
    /// bit schedule. Fails with a recoverable [DecodingError] when
    /// the message number is unknown, or when the schedule does not
    /// consume the payload exactly (byte alignment padding aside):
    /// the containing stream continues in both cases.
    pub fn decode(payload: &[u8], context: &TimeContext) -> Result<Self, DecodingError> {
        let mut reader = BitReader::new(payload);
        let number = reader.unsigned(12)? as u16;

        use Constellation::{BeiDou, Galileo, Glonass, QZSS, GPS};

        let message = match number {
            1019 => Self::GpsEphemeris(KeplerEphemeris::decode_gps(&mut reader, context)?),
            1020 => Self::GlonassEphemeris(GlonassEphemeris::decode(&mut reader)?),
            1042 => Self::BdsEphemeris(KeplerEphemeris::decode_bds(&mut reader)?),
            1044 => Self::QzssEphemeris(KeplerEphemeris::decode_qzss(&mut reader, context)?),
            1045 => Self::GalileoFnavEphemeris(KeplerEphemeris::decode_galileo(&mut reader, false)?),
            1046 => Self::GalileoInavEphemeris(KeplerEphemeris::decode_galileo(&mut reader, true)?),

            1057 => Self::Orbit(OrbitCorrections::decode(&mut reader, GPS)?),
            1063 => Self::Orbit(OrbitCorrections::decode(&mut reader, Glonass)?),
            1240 => Self::Orbit(OrbitCorrections::decode(&mut reader, Galileo)?),
            1246 => Self::Orbit(OrbitCorrections::decode(&mut reader, QZSS)?),
            1258 => Self::Orbit(OrbitCorrections::decode(&mut reader, BeiDou)?),

            1058 => Self::Clock(ClockCorrections::decode(&mut reader, GPS)?),
            1064 => Self::Clock(ClockCorrections::decode(&mut reader, Glonass)?),
            1241 => Self::Clock(ClockCorrections::decode(&mut reader, Galileo)?),
            1247 => Self::Clock(ClockCorrections::decode(&mut reader, QZSS)?),
            1259 => Self::Clock(ClockCorrections::decode(&mut reader, BeiDou)?),

            1060 => Self::OrbitClock(OrbitClockCorrections::decode(&mut reader, GPS)?),
            1066 => Self::OrbitClock(OrbitClockCorrections::decode(&mut reader, Glonass)?),
            1243 => Self::OrbitClock(OrbitClockCorrections::decode(&mut reader, Galileo)?),
            1249 => Self::OrbitClock(OrbitClockCorrections::decode(&mut reader, QZSS)?),
            1261 => Self::OrbitClock(OrbitClockCorrections::decode(&mut reader, BeiDou)?),

            1059 => Self::CodeBias(CodeBiasCorrections::decode(&mut reader, GPS)?),
            1065 => Self::CodeBias(CodeBiasCorrections::decode(&mut reader, Glonass)?),
            1242 => Self::CodeBias(CodeBiasCorrections::decode(&mut reader, Galileo)?),
            1248 => Self::CodeBias(CodeBiasCorrections::decode(&mut reader, QZSS)?),
            1260 => Self::CodeBias(CodeBiasCorrections::decode(&mut reader, BeiDou)?),

            1265 => Self::PhaseBias(PhaseBiasCorrections::decode(&mut reader, GPS)?),
            1266 => Self::PhaseBias(PhaseBiasCorrections::decode(&mut reader, Glonass)?),
            1267 => Self::PhaseBias(PhaseBiasCorrections::decode(&mut reader, Galileo)?),
            1268 => Self::PhaseBias(PhaseBiasCorrections::decode(&mut reader, QZSS)?),
            1270 => Self::PhaseBias(PhaseBiasCorrections::decode(&mut reader, BeiDou)?),

            1061 => Self::Ura(UraCorrections::decode(&mut reader, GPS)?),
            1067 => Self::Ura(UraCorrections::decode(&mut reader, Glonass)?),
            1244 => Self::Ura(UraCorrections::decode(&mut reader, Galileo)?),
            1250 => Self::Ura(UraCorrections::decode(&mut reader, QZSS)?),
            1262 => Self::Ura(UraCorrections::decode(&mut reader, BeiDou)?),

            1245 => Self::HighRateClock(HighRateClockCorrections::decode(&mut reader, Galileo)?),
            1251 => Self::HighRateClock(HighRateClockCorrections::decode(&mut reader, QZSS)?),
            1263 => Self::HighRateClock(HighRateClockCorrections::decode(&mut reader, BeiDou)?),

            1264 => Self::Vtec(VtecMessage::decode(&mut reader)?),

            number => {
                return Err(DecodingError::UnknownMessageNumber(number));
            }
        };

        // the schedule must consume the payload exactly,
        // byte alignment padding aside
        if reader.remaining() >= 8 {
            return Err(DecodingError::PayloadUnderrun(number));
        }

        Ok(message)
    }

    /// Returns the RTCM message number.
    pub fn number(&self) -> u16 {
        use Constellation::{BeiDou, Galileo, Glonass, QZSS};

        match self {
            Self::GpsEphemeris(_) => 1019,
            Self::GlonassEphemeris(_) => 1020,
            Self::BdsEphemeris(_) => 1042,
            Self::QzssEphemeris(_) => 1044,
            Self::GalileoFnavEphemeris(_) => 1045,
            Self::GalileoInavEphemeris(_) => 1046,
            Self::Orbit(msg) => match msg.constellation {
                Glonass => 1063,
                Galileo => 1240,
                QZSS => 1246,
                BeiDou => 1258,
                _ => 1057,
            },
            Self::Clock(msg) => match msg.constellation {
                Glonass => 1064,
                Galileo => 1241,
                QZSS => 1247,
                BeiDou => 1259,
                _ => 1058,
            },
            Self::OrbitClock(msg) => match msg.constellation {
                Glonass => 1066,
                Galileo => 1243,
                QZSS => 1249,
                BeiDou => 1261,
                _ => 1060,
            },
            Self::CodeBias(msg) => match msg.constellation {
                Glonass => 1065,
                Galileo => 1242,
                QZSS => 1248,
                BeiDou => 1260,
                _ => 1059,
            },
            Self::PhaseBias(msg) => match msg.constellation {
                Glonass => 1266,
                Galileo => 1267,
                QZSS => 1268,
                BeiDou => 1270,
                _ => 1265,
            },
            Self::Ura(msg) => match msg.constellation {
                Glonass => 1067,
                Galileo => 1244,
                QZSS => 1250,
                BeiDou => 1262,
                _ => 1061,
            },
            Self::HighRateClock(msg) => match msg.constellation {
                QZSS => 1251,
                BeiDou => 1263,
                _ => 1245,
            },
            Self::Vtec(_) => 1264,
        }
    }

    /// Returns the constellation this message applies to.
    /// VTEC messages are global and return None.
    pub fn constellation(&self) -> Option<Constellation> {
        match self {
            Self::GpsEphemeris(msg) => Some(msg.sv.constellation),
            Self::GlonassEphemeris(msg) => Some(msg.sv.constellation),
            Self::BdsEphemeris(msg) => Some(msg.sv.constellation),
            Self::QzssEphemeris(msg) => Some(msg.sv.constellation),
            Self::GalileoFnavEphemeris(msg) => Some(msg.sv.constellation),
            Self::GalileoInavEphemeris(msg) => Some(msg.sv.constellation),
            Self::Orbit(msg) => Some(msg.constellation),
            Self::Clock(msg) => Some(msg.constellation),
            Self::OrbitClock(msg) => Some(msg.constellation),
            Self::CodeBias(msg) => Some(msg.constellation),
            Self::PhaseBias(msg) => Some(msg.constellation),
            Self::Ura(msg) => Some(msg.constellation),
            Self::HighRateClock(msg) => Some(msg.constellation),
            Self::Vtec(_) => None,
        }
    }

    /// Number of signal entries this message carries whose tracking
    /// mode does not resolve through the signal tables. Those entries
    /// are skipped, the rest of the message is retained.
    pub fn unresolved_tracking_modes(&self) -> usize {
        match self {
            Self::CodeBias(msg) => msg.unresolved_tracking_modes(),
            Self::PhaseBias(msg) => msg.unresolved_tracking_modes(),
            _ => 0,
        }
    }

    /// True for broadcast ephemeris messages.
    pub fn is_ephemeris(&self) -> bool {
        matches!(
            self,
            Self::GpsEphemeris(_)
                | Self::GlonassEphemeris(_)
                | Self::BdsEphemeris(_)
                | Self::QzssEphemeris(_)
                | Self::GalileoFnavEphemeris(_)
                | Self::GalileoInavEphemeris(_)
        )
    }

    fn title(&self) -> &'static str {
        match self {
            Self::GpsEphemeris(_) => "GPS ephemeris",
            Self::GlonassEphemeris(_) => "Glonass ephemeris",
            Self::BdsEphemeris(_) => "BDS ephemeris",
            Self::QzssEphemeris(_) => "QZSS ephemeris",
            Self::GalileoFnavEphemeris(_) => "Galileo F/NAV ephemeris",
            Self::GalileoInavEphemeris(_) => "Galileo I/NAV ephemeris",
            Self::Orbit(_) => "SSR orbit corrections",
            Self::Clock(_) => "SSR clock corrections",
            Self::OrbitClock(_) => "SSR orbit & clock corrections",
            Self::CodeBias(_) => "SSR code biases",
            Self::PhaseBias(_) => "SSR phase biases",
            Self::Ura(_) => "SSR user range accuracy",
            Self::HighRateClock(_) => "SSR high rate clock corrections",
            Self::Vtec(_) => "SSR VTEC ionosphere",
        }
    }
}

impl fmt::Display for RtcmMessage {
    /// Human readable dump of this message, with labelled fields
    /// and units.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "#*** RTCM 3 message {} ({}) ***", self.number(), self.title())?;

        match self {
            Self::GpsEphemeris(msg) => write!(f, "{}", msg),
            Self::GlonassEphemeris(msg) => write!(f, "{}", msg),
            Self::BdsEphemeris(msg) => write!(f, "{}", msg),
            Self::QzssEphemeris(msg) => write!(f, "{}", msg),
            Self::GalileoFnavEphemeris(msg) => write!(f, "{}", msg),
            Self::GalileoInavEphemeris(msg) => write!(f, "{}", msg),
            Self::Orbit(msg) => write!(f, "{}", msg),
            Self::Clock(msg) => write!(f, "{}", msg),
            Self::OrbitClock(msg) => write!(f, "{}", msg),
            Self::CodeBias(msg) => write!(f, "{}", msg),
            Self::PhaseBias(msg) => write!(f, "{}", msg),
            Self::Ura(msg) => write!(f, "{}", msg),
            Self::HighRateClock(msg) => write!(f, "{}", msg),
            Self::Vtec(msg) => write!(f, "{}", msg),
        }
    }
}
