//! Satellite orbit propagation to the signal transmission time.

mod glonass;
mod kepler;

use nalgebra::Vector3;

use crate::{ephemeris::EphemerisFrame, time::TimeContext};

/// Whether the propagation accounts for the satellite clock offset
/// when evaluating the transmission time. The corrected state serves
/// the geometry (elevation, ionosphere, wind-up); the uncorrected
/// state serves the projection of the orbit corrections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SatelliteClock {
    Corrected,
    Uncorrected,
}

/// Satellite state at transmission time, in WGS-84 ECEF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteState {
    /// ECEF position (m)
    pub position_m: Vector3<f64>,

    /// ECEF velocity (m.s⁻¹)
    pub velocity_m_s: Vector3<f64>,

    /// Satellite clock offset at transmission time (s)
    pub clock_s: f64,
}

/// Propagates a broadcast ephemeris to the transmission time of a
/// signal received at `tow_s` by a receiver at `receiver_m`:
/// Kepler elements for GPS, Galileo, BDS and QZSS, numerical
/// integration of the PZ-90 state vector for Glonass.
///
/// The signal travel time and the satellite clock offset are
/// refined together by a fixed point iteration, starting from a
/// 20 000 km range estimate.
pub fn propagate(
    frame: &EphemerisFrame,
    tow_s: f64,
    receiver_m: &Vector3<f64>,
    context: &TimeContext,
    clock: SatelliteClock,
) -> Option<SatelliteState> {
    match frame {
        EphemerisFrame::Kepler(eph) => kepler::propagate(eph, tow_s, receiver_m, clock),
        EphemerisFrame::Glonass(eph) => glonass::propagate(eph, tow_s, receiver_m, context, clock),
    }
}

/// Initial range estimate of the travel time iteration (m).
pub(crate) const INITIAL_RANGE_M: f64 = 20.0E6;

/// Convergence threshold on the range estimate (0.1 mm).
pub(crate) const RANGE_TOLERANCE_M: f64 = 1.0E-4;

/// Convergence threshold on the satellite clock estimate (s).
pub(crate) const CLOCK_TOLERANCE_S: f64 = 1.0E-8;

/// Maximum number of travel time refinements.
pub(crate) const MAX_ITERATIONS: usize = 20;

/// Maps a time difference across the week boundary.
pub(crate) fn normalize_week_dt(dt: f64) -> f64 {
    if dt > 302_400.0 {
        dt - 604_800.0
    } else if dt < -302_400.0 {
        dt + 604_800.0
    } else {
        dt
    }
}
