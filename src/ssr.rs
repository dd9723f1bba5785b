//! SSR correction accumulation: epoch indexed, per constellation
//! buckets, separate ionosphere epoch index.

use std::collections::HashMap;

use gnss_rs::prelude::{Constellation, SV};
use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::messages::{
    bias::{CodeBiasCorrections, PhaseBiasCorrections},
    corrections::{
        ClockCorrection, ClockCorrections, HighRateClockCorrections, OrbitClockCorrections,
        OrbitCorrection, OrbitCorrections, UraCorrections,
    },
    vtec::VtecMessage,
};

/// All corrections received for one (epoch, constellation) pair.
/// A later message of the same kind supersedes the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectionSet {
    /// Latest orbit corrections
    pub orbit: Option<OrbitCorrections>,

    /// Latest clock corrections
    pub clock: Option<ClockCorrections>,

    /// Latest combined orbit & clock corrections
    pub orbit_clock: Option<OrbitClockCorrections>,

    /// Latest code biases
    pub code_bias: Option<CodeBiasCorrections>,

    /// Latest phase biases
    pub phase_bias: Option<PhaseBiasCorrections>,

    /// Latest user range accuracy
    pub ura: Option<UraCorrections>,

    /// Latest high rate clock corrections
    pub high_rate_clock: Option<HighRateClockCorrections>,
}

impl CorrectionSet {
    /// True when nothing was received for this (epoch, constellation).
    pub fn is_empty(&self) -> bool {
        self.orbit.is_none()
            && self.clock.is_none()
            && self.orbit_clock.is_none()
            && self.code_bias.is_none()
            && self.phase_bias.is_none()
            && self.ura.is_none()
            && self.high_rate_clock.is_none()
    }

    /// All satellites any correction of this set applies to, sorted.
    pub fn satellites(&self) -> Vec<SV> {
        let mut satellites = Vec::<SV>::new();

        if let Some(msg) = &self.orbit {
            satellites.extend(msg.corrections.iter().map(|c| c.sv));
        }
        if let Some(msg) = &self.orbit_clock {
            satellites.extend(msg.corrections.iter().map(|c| c.orbit.sv));
        }
        if let Some(msg) = &self.clock {
            satellites.extend(msg.corrections.iter().map(|c| c.sv));
        }
        if let Some(msg) = &self.code_bias {
            satellites.extend(msg.corrections.iter().map(|c| c.sv));
        }
        if let Some(msg) = &self.phase_bias {
            satellites.extend(msg.corrections.iter().map(|c| c.sv));
        }

        satellites.into_iter().unique().sorted().collect()
    }

    /// Orbit correction applying to requested satellite: from the
    /// orbit message when present, the combined message otherwise.
    pub fn orbit_correction(&self, sv: SV) -> Option<&OrbitCorrection> {
        if let Some(msg) = &self.orbit {
            if let Some(correction) = msg.correction(sv) {
                return Some(correction);
            }
        }

        self.orbit_clock
            .as_ref()?
            .correction(sv)
            .map(|combined| &combined.orbit)
    }

    /// Clock correction applying to requested satellite: from the
    /// clock message when present, the combined message otherwise.
    pub fn clock_correction(&self, sv: SV) -> Option<&ClockCorrection> {
        if let Some(msg) = &self.clock {
            if let Some(correction) = msg.correction(sv) {
                return Some(correction);
            }
        }

        self.orbit_clock
            .as_ref()?
            .correction(sv)
            .map(|combined| &combined.clock)
    }

    /// Code bias (m) of requested satellite on requested signal.
    pub fn code_bias_m(&self, sv: SV, signal: &str) -> Option<f64> {
        self.code_bias.as_ref()?.bias_m(sv, signal)
    }

    /// Phase bias (m) of requested satellite on requested signal.
    pub fn phase_bias_m(&self, sv: SV, signal: &str) -> Option<f64> {
        self.phase_bias.as_ref()?.bias_m(sv, signal)
    }

    /// Yaw attitude (angle, rate) in degrees of requested satellite.
    pub fn yaw_deg(&self, sv: SV) -> Option<(f64, f64)> {
        let correction = self.phase_bias.as_ref()?.correction(sv)?;
        Some((correction.yaw_deg, correction.yaw_rate_deg_s))
    }
}

/// [SsrStore] accumulates SSR corrections per epoch and
/// constellation, in order of arrival. The ionosphere messages
/// maintain their own epoch sequence, because they arrive at a
/// different cadence than the orbit and clock streams.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SsrStore {
    /// Correction epochs, in order of arrival.
    epochs: Vec<u32>,

    /// Ionosphere epochs, in order of arrival.
    iono_epochs: Vec<u32>,

    /// Correction buckets.
    sets: HashMap<(u32, Constellation), CorrectionSet>,

    /// Latest VTEC message per epoch.
    iono: HashMap<u32, VtecMessage>,
}

impl SsrStore {
    fn bucket(&mut self, epoch_s: u32, constellation: Constellation) -> &mut CorrectionSet {
        if !self.epochs.contains(&epoch_s) {
            self.epochs.push(epoch_s);
        }

        self.sets.entry((epoch_s, constellation)).or_default()
    }

    pub(crate) fn insert_orbit(&mut self, epoch_s: u32, msg: OrbitCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).orbit = Some(msg);
    }

    pub(crate) fn insert_clock(&mut self, epoch_s: u32, msg: ClockCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).clock = Some(msg);
    }

    pub(crate) fn insert_orbit_clock(&mut self, epoch_s: u32, msg: OrbitClockCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).orbit_clock = Some(msg);
    }

    pub(crate) fn insert_code_bias(&mut self, epoch_s: u32, msg: CodeBiasCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).code_bias = Some(msg);
    }

    pub(crate) fn insert_phase_bias(&mut self, epoch_s: u32, msg: PhaseBiasCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).phase_bias = Some(msg);
    }

    pub(crate) fn insert_ura(&mut self, epoch_s: u32, msg: UraCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).ura = Some(msg);
    }

    pub(crate) fn insert_high_rate_clock(&mut self, epoch_s: u32, msg: HighRateClockCorrections) {
        let constellation = msg.constellation;
        self.bucket(epoch_s, constellation).high_rate_clock = Some(msg);
    }

    pub(crate) fn insert_iono(&mut self, epoch_s: u32, msg: VtecMessage) {
        if !self.epochs.contains(&epoch_s) {
            self.epochs.push(epoch_s);
        }
        if !self.iono_epochs.contains(&epoch_s) {
            self.iono_epochs.push(epoch_s);
        }

        self.iono.insert(epoch_s, msg);
    }

    /// True when no correction was accumulated at all.
    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Iterates correction epochs, in order of arrival.
    pub fn epochs_iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.epochs.iter().copied()
    }

    /// Iterates ionosphere epochs, in order of arrival.
    pub fn iono_epochs_iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.iono_epochs.iter().copied()
    }

    /// Returns the [CorrectionSet] of one (epoch, constellation).
    pub fn set(&self, epoch_s: u32, constellation: Constellation) -> Option<&CorrectionSet> {
        self.sets.get(&(epoch_s, constellation))
    }

    /// Iterates the constellations for which this epoch holds any
    /// correction, sorted.
    pub fn constellations_at(&self, epoch_s: u32) -> impl Iterator<Item = Constellation> + '_ {
        self.sets
            .iter()
            .filter(move |(key, set)| key.0 == epoch_s && !set.is_empty())
            .map(|(key, _)| key.1)
            .sorted()
    }

    /// Returns the VTEC message whose epoch is nearest to requested
    /// epoch, searching the ionosphere epoch sequence only.
    pub fn nearest_iono(&self, epoch_s: u32) -> Option<&VtecMessage> {
        let nearest = self
            .iono_epochs
            .iter()
            .min_by_key(|iono| (**iono as i64 - epoch_s as i64).abs())?;

        self.iono.get(nearest)
    }
}
