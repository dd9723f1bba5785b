//! SSR VTEC spherical harmonics message (1264).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    bits::BitReader,
    errors::DecodingError,
    messages::signals::update_interval_s,
};

/// Coefficients quantizing to the extreme wire values (±163.835,
/// and -163.84 for the two's complement minimum) signal an out of
/// range value. They are preserved as received.
pub const VTEC_OUT_OF_RANGE_TECU: f64 = 163.835;

/// True when a decoded coefficient carries the out of range sentinel.
pub fn coefficient_out_of_range(value_tecu: f64) -> bool {
    (value_tecu / 0.005).round().abs() >= (VTEC_OUT_OF_RANGE_TECU / 0.005).round()
}

/// One ionospheric thin shell layer, described by normalized
/// spherical harmonics coefficients.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VtecLayer {
    /// Layer height (km)
    pub height_km: f64,

    /// Spherical harmonics degree
    pub degree: usize,

    /// Spherical harmonics order
    pub order: usize,

    /// Cosine coefficients (TECU), triangular storage:
    /// `cosine_tecu[n][m]` for n in 0..=degree, m in 0..=min(n, order).
    pub cosine_tecu: Vec<Vec<f64>>,

    /// Sine coefficients (TECU), same storage, m starts at 1.
    pub sine_tecu: Vec<Vec<f64>>,
}

impl VtecLayer {
    fn decode(reader: &mut BitReader) -> Result<Self, DecodingError> {
        let height_km = reader.unsigned(8)? as f64 * 10.0;
        let degree = reader.unsigned(4)? as usize + 1;
        let order = reader.unsigned(4)? as usize + 1;

        let mut cosine_tecu = vec![vec![0.0; order + 1]; degree + 1];
        let mut sine_tecu = vec![vec![0.0; order + 1]; degree + 1];

        // cosine coefficients: (D+1)(D+2)/2 - (D-O)(D-O+1)/2 values
        for m in 0..=order {
            for n in m..=degree {
                cosine_tecu[n][m] = reader.signed(16)? as f64 * 0.005;
            }
        }

        // sine coefficients: (D+1) fewer values (no m=0 terms)
        for m in 1..=order {
            for n in m..=degree {
                sine_tecu[n][m] = reader.signed(16)? as f64 * 0.005;
            }
        }

        Ok(Self {
            height_km,
            degree,
            order,
            cosine_tecu,
            sine_tecu,
        })
    }

    /// True when any broadcast coefficient of this layer carries
    /// the out of range sentinel.
    pub fn has_out_of_range_coefficients(&self) -> bool {
        self.cosine_tecu
            .iter()
            .chain(self.sine_tecu.iter())
            .flatten()
            .any(|value| coefficient_out_of_range(*value))
    }
}

/// SSR VTEC ionosphere message (1264): one or more thin shell
/// layers of normalized spherical harmonics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VtecMessage {
    /// Epoch, seconds of (GPS) week
    pub epoch_s: u32,

    /// SSR update interval (s)
    pub update_interval_s: u16,

    /// Multiple message indicator
    pub multiple_message: bool,

    /// IOD SSR
    pub iod_ssr: u8,

    /// SSR provider ID
    pub provider_id: u16,

    /// SSR solution ID
    pub solution_id: u8,

    /// VTEC quality indicator, as broadcast
    pub quality: u16,

    /// Ionospheric layers
    pub layers: Vec<VtecLayer>,
}

impl VtecMessage {
    pub(crate) fn decode(reader: &mut BitReader) -> Result<Self, DecodingError> {
        let epoch_s = reader.unsigned(20)? as u32;
        let update_interval_s = update_interval_s(reader.unsigned(4)? as u8);
        let multiple_message = reader.flag()?;
        let iod_ssr = reader.unsigned(4)? as u8;
        let provider_id = reader.unsigned(16)? as u16;
        let solution_id = reader.unsigned(4)? as u8;
        let quality = reader.unsigned(9)? as u16;
        let layer_count = reader.unsigned(2)? as usize + 1;

        let mut layers = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            layers.push(VtecLayer::decode(reader)?);
        }

        Ok(Self {
            epoch_s,
            update_interval_s,
            multiple_message,
            iod_ssr,
            provider_id,
            solution_id,
            quality,
            layers,
        })
    }
}

impl fmt::Display for VtecMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "epoch          : {} [s]", self.epoch_s)?;
        writeln!(f, "update interval: {} [s]", self.update_interval_s)?;
        writeln!(f, "IOD SSR        : {}", self.iod_ssr)?;
        writeln!(f, "provider ID    : {}", self.provider_id)?;
        writeln!(f, "solution ID    : {}", self.solution_id)?;
        writeln!(f, "quality        : {}", self.quality)?;
        writeln!(f, "layers         : {}", self.layers.len())?;

        for (index, layer) in self.layers.iter().enumerate() {
            writeln!(
                f,
                "layer {}: height={} [km] degree={} order={}",
                index, layer.height_km, layer.degree, layer.order,
            )?;

            for m in 0..=layer.order {
                for n in m..=layer.degree {
                    let value = layer.cosine_tecu[n][m];
                    let flag = if coefficient_out_of_range(value) {
                        " (out of range)"
                    } else {
                        ""
                    };
                    writeln!(f, "C({},{})        : {:.3} [TECU]{}", n, m, value, flag)?;
                }
            }
            for m in 1..=layer.order {
                for n in m..=layer.degree {
                    let value = layer.sine_tecu[n][m];
                    let flag = if coefficient_out_of_range(value) {
                        " (out of range)"
                    } else {
                        ""
                    };
                    writeln!(f, "S({},{})        : {:.3} [TECU]{}", n, m, value, flag)?;
                }
            }
        }

        Ok(())
    }
}
