//! SSR code bias and phase bias messages.

use std::fmt;

use gnss_rs::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bits::BitReader,
    errors::DecodingError,
    messages::{
        corrections::{satellite_id, SsrHeader},
        signals::resolve_tracking_mode,
        two_pow,
    },
};

/// Code bias of a single signal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodeBias {
    /// Signal & tracking mode index, resolved through the
    /// per constellation signal table.
    pub signal_index: u8,

    /// Code bias (m)
    pub bias_m: f64,
}

/// Per satellite list of signal code biases.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodeBiasCorrection {
    /// Satellite identity
    pub sv: SV,

    /// Signal biases
    pub biases: Vec<CodeBias>,
}

impl CodeBiasCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let count = reader.unsigned(5)? as usize;

        let mut biases = Vec::with_capacity(count);
        for _ in 0..count {
            let signal_index = reader.unsigned(5)? as u8;
            let bias_m = reader.signed(14)? as f64 * 0.01;
            biases.push(CodeBias {
                signal_index,
                bias_m,
            });
        }

        Ok(Self { sv, biases })
    }
}

/// SSR code biases (messages 1059, 1065, 1242, 1248, 1260).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CodeBiasCorrections {
    /// Constellation this message applies to
    pub constellation: Constellation,

    /// SSR [SsrHeader]
    pub header: SsrHeader,

    /// Per satellite signal biases
    pub corrections: Vec<CodeBiasCorrection>,
}

impl CodeBiasCorrections {
    pub(crate) fn decode(
        reader: &mut BitReader,
        constellation: Constellation,
    ) -> Result<Self, DecodingError> {
        let header = SsrHeader::decode(reader, constellation, false)?;

        let mut corrections = Vec::with_capacity(header.satellites as usize);
        for _ in 0..header.satellites {
            corrections.push(CodeBiasCorrection::decode(reader, constellation)?);
        }

        Ok(Self {
            constellation,
            header,
            corrections,
        })
    }

    /// Returns the code bias (m) of requested satellite and signal name.
    /// Unresolved tracking modes never match.
    pub fn bias_m(&self, sv: SV, signal: &str) -> Option<f64> {
        let correction = self.corrections.iter().find(|corr| corr.sv == sv)?;

        correction
            .biases
            .iter()
            .find(|bias| resolve_tracking_mode(self.constellation, bias.signal_index) == Ok(signal))
            .map(|bias| bias.bias_m)
    }

    /// Number of signal entries whose tracking mode does not resolve
    /// through the signal table. Those entries are skipped by the
    /// bias lookups, the rest of the message is retained.
    pub fn unresolved_tracking_modes(&self) -> usize {
        self.corrections
            .iter()
            .flat_map(|correction| correction.biases.iter())
            .filter(|bias| resolve_tracking_mode(self.constellation, bias.signal_index).is_err())
            .count()
    }
}

impl fmt::Display for CodeBiasCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        for correction in self.corrections.iter() {
            write!(f, "{}", correction.sv)?;
            for bias in correction.biases.iter() {
                match resolve_tracking_mode(self.constellation, bias.signal_index) {
                    Ok(name) => write!(f, "  {}={:8.4} [m]", name, bias.bias_m)?,
                    Err(error) => write!(f, "  [{}]", error)?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Phase bias of a single signal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseBias {
    /// Signal & tracking mode index, resolved through the
    /// per constellation signal table.
    pub signal_index: u8,

    /// Signal integer indicator
    pub integer: bool,

    /// Wide lane integer indicator
    pub wide_lane_integer: u8,

    /// Discontinuity counter
    pub discontinuity: u8,

    /// Phase bias (m)
    pub bias_m: f64,
}

/// Per satellite yaw attitude and signal phase biases.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseBiasCorrection {
    /// Satellite identity
    pub sv: SV,

    /// Yaw angle (degrees)
    pub yaw_deg: f64,

    /// Yaw rate (degrees.s⁻¹)
    pub yaw_rate_deg_s: f64,

    /// Signal biases
    pub biases: Vec<PhaseBias>,
}

impl PhaseBiasCorrection {
    fn decode(reader: &mut BitReader, constellation: Constellation) -> Result<Self, DecodingError> {
        let sv = satellite_id(reader, constellation)?;
        let count = reader.unsigned(5)? as usize;

        // 1/256 semicircles and 1/8192 semicircles per second
        let yaw_deg = reader.unsigned(9)? as f64 * two_pow(-8) * 180.0;
        let yaw_rate_deg_s = reader.signed(8)? as f64 * two_pow(-13) * 180.0;

        let mut biases = Vec::with_capacity(count);
        for _ in 0..count {
            let signal_index = reader.unsigned(5)? as u8;
            let integer = reader.flag()?;
            let wide_lane_integer = reader.unsigned(2)? as u8;
            let discontinuity = reader.unsigned(4)? as u8;
            let bias_m = reader.signed(20)? as f64 * 1.0E-4;

            biases.push(PhaseBias {
                signal_index,
                integer,
                wide_lane_integer,
                discontinuity,
                bias_m,
            });
        }

        Ok(Self {
            sv,
            yaw_deg,
            yaw_rate_deg_s,
            biases,
        })
    }
}

/// SSR phase biases (messages 1265, 1266, 1267, 1268, 1270).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseBiasCorrections {
    /// Constellation this message applies to
    pub constellation: Constellation,

    /// SSR [SsrHeader]
    pub header: SsrHeader,

    /// Dispersive bias consistency indicator
    pub dispersive_bias_consistency: bool,

    /// Melbourne-Wübbena consistency indicator
    pub mw_consistency: bool,

    /// Per satellite attitude and signal biases
    pub corrections: Vec<PhaseBiasCorrection>,
}

impl PhaseBiasCorrections {
    pub(crate) fn decode(
        reader: &mut BitReader,
        constellation: Constellation,
    ) -> Result<Self, DecodingError> {
        // the two consistency bits land between the solution id
        // and the satellite count
        let epoch_s = if constellation == Constellation::Glonass {
            reader.unsigned(17)? as u32
        } else {
            reader.unsigned(20)? as u32
        };

        let update_interval_s =
            crate::messages::signals::update_interval_s(reader.unsigned(4)? as u8);
        let multiple_message = reader.flag()?;
        let iod_ssr = reader.unsigned(4)? as u8;
        let provider_id = reader.unsigned(16)? as u16;
        let solution_id = reader.unsigned(4)? as u8;
        let dispersive_bias_consistency = reader.flag()?;
        let mw_consistency = reader.flag()?;
        let satellites = reader.unsigned(6)? as u8;

        let header = SsrHeader {
            epoch_s,
            update_interval_s,
            multiple_message,
            satellite_datum: None,
            iod_ssr,
            provider_id,
            solution_id,
            satellites,
        };

        let mut corrections = Vec::with_capacity(header.satellites as usize);
        for _ in 0..header.satellites {
            corrections.push(PhaseBiasCorrection::decode(reader, constellation)?);
        }

        Ok(Self {
            constellation,
            header,
            dispersive_bias_consistency,
            mw_consistency,
            corrections,
        })
    }

    /// Returns the attitude and phase bias record of requested satellite.
    pub fn correction(&self, sv: SV) -> Option<&PhaseBiasCorrection> {
        self.corrections.iter().find(|corr| corr.sv == sv)
    }

    /// Returns the phase bias (m) of requested satellite and signal name.
    /// Unresolved tracking modes never match.
    pub fn bias_m(&self, sv: SV, signal: &str) -> Option<f64> {
        let correction = self.correction(sv)?;

        correction
            .biases
            .iter()
            .find(|bias| resolve_tracking_mode(self.constellation, bias.signal_index) == Ok(signal))
            .map(|bias| bias.bias_m)
    }

    /// Number of signal entries whose tracking mode does not resolve
    /// through the signal table. Those entries are skipped by the
    /// bias lookups, the rest of the message is retained.
    pub fn unresolved_tracking_modes(&self) -> usize {
        self.corrections
            .iter()
            .flat_map(|correction| correction.biases.iter())
            .filter(|bias| resolve_tracking_mode(self.constellation, bias.signal_index).is_err())
            .count()
    }
}

impl fmt::Display for PhaseBiasCorrections {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        for correction in self.corrections.iter() {
            write!(
                f,
                "{} yaw={:8.4} [deg] yaw rate={:9.6} [deg/s]",
                correction.sv, correction.yaw_deg, correction.yaw_rate_deg_s,
            )?;

            for bias in correction.biases.iter() {
                match resolve_tracking_mode(self.constellation, bias.signal_index) {
                    Ok(name) => write!(
                        f,
                        "  {}={:8.4} [m] (int={} wl={} disc={})",
                        name,
                        bias.bias_m,
                        bias.integer as u8,
                        bias.wide_lane_integer,
                        bias.discontinuity,
                    )?,
                    Err(error) => write!(f, "  [{}]", error)?,
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
