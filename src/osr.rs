//! SSR to OSR translation: evaluates the per satellite line of
//! sight corrections at the receiver location, for every epoch of
//! the SSR store.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use hifitime::{Epoch, TimeScale};
use nalgebra::Vector3;

use gnss_rs::prelude::{Constellation, SV};

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    coords::{azimuth_elevation_rad, east_north_units, Receiver},
    ephemeris::EphemerisFrame,
    errors::{FormattingError, OsrError},
    iono::{self, IonoEvaluation},
    messages::{
        corrections::OrbitCorrection,
        signals::{default_frequency_hz, default_tracking_mode},
    },
    orbit::{propagate, SatelliteClock, SatelliteState},
    ssr::CorrectionSet,
    time::{glonass_to_gps_time, TimeContext},
    RtcmSsr,
};

use crate::constants::{
    GAL_BDS_GRAVITATION_MU_M3_S2, GLO_GRAVITATION_MU_KM3_S2, GPS_GRAVITATION_MU_M3_S2,
};

/// One line of sight correction row of the OSR output.
#[derive(Debug, Clone, PartialEq)]
pub struct OsrRow {
    /// GPS week of the satellite time frame
    pub week: u32,

    /// Epoch, seconds of week
    pub tow_s: u32,

    /// Satellite identity
    pub sv: SV,

    /// Elevation (degrees), never negative
    pub elevation_deg: f64,

    /// Clock correction (m)
    pub clock_m: Option<f64>,

    /// Orbit correction projected on the line of sight (m)
    pub orbit_m: Option<f64>,

    /// Slant ionosphere influence at the default carrier (m)
    pub iono_m: Option<f64>,

    /// Shapiro path delay (m)
    pub shapiro_m: Option<f64>,

    /// Phase wind-up (m)
    pub windup_m: Option<f64>,

    /// Phase bias on the default tracking mode (m)
    pub phase_bias_m: Option<f64>,

    /// Code bias on the default tracking mode (m)
    pub code_bias_m: Option<f64>,
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:8.4}", value),
        None => format!("{:>8}", "n/a"),
    }
}

impl fmt::Display for OsrRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "   {:8}   {:9.1}    {}    {:7.3}  {}  {}   {}   {}   {}   {}   {}",
            self.week,
            self.tow_s as f64,
            self.sv,
            self.elevation_deg,
            cell(self.clock_m),
            cell(self.orbit_m),
            cell(self.iono_m),
            cell(self.shapiro_m),
            cell(self.windup_m),
            cell(self.phase_bias_m),
            cell(self.code_bias_m),
        )
    }
}

/// All rows and diagnostics produced at one SSR epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct OsrEpoch {
    /// Epoch, seconds of week
    pub tow_s: u32,

    /// One row per visible satellite
    pub rows: Vec<OsrRow>,

    /// Ionosphere diagnostics of this epoch
    pub iono: Vec<IonoEvaluation>,

    /// Satellites skipped at this epoch
    pub skipped: Vec<(SV, OsrError)>,
}

/// [Ssr2Osr] translates the accumulated SSR state into observation
/// space corrections for one receiver location.
pub struct Ssr2Osr<'a> {
    dataset: &'a RtcmSsr,
    receiver: &'a Receiver,
    context: &'a TimeContext,
}

impl<'a> Ssr2Osr<'a> {
    /// Builds the translator for provided dataset, receiver location
    /// and session [TimeContext].
    pub fn new(dataset: &'a RtcmSsr, receiver: &'a Receiver, context: &'a TimeContext) -> Self {
        Self {
            dataset,
            receiver,
            context,
        }
    }

    /// Walks the SSR epochs and evaluates every visible satellite of
    /// every constellation holding corrections.
    pub fn compute(&self) -> Vec<OsrEpoch> {
        let mut epochs = Vec::new();

        for tow_s in self.dataset.corrections.epochs_iter() {
            let mut rows = Vec::new();
            let mut iono = Vec::new();
            let mut skipped = Vec::new();

            let constellations: Vec<Constellation> = self
                .dataset
                .corrections
                .constellations_at(tow_s)
                .collect();

            for constellation in constellations {
                let set = match self.dataset.corrections.set(tow_s, constellation) {
                    Some(set) => set,
                    None => continue,
                };

                for sv in set.satellites() {
                    match self.evaluate_satellite(tow_s, sv, set) {
                        Ok((row, evaluation)) => {
                            rows.push(row);
                            if let Some(evaluation) = evaluation {
                                iono.push(evaluation);
                            }
                        }
                        Err(error) => {
                            debug!("({}) skipped at {}: {}", sv, tow_s, error);
                            skipped.push((sv, error));
                        }
                    }
                }
            }

            epochs.push(OsrEpoch {
                tow_s,
                rows,
                iono,
                skipped,
            });
        }

        epochs
    }

    fn evaluate_satellite(
        &self,
        tow_s: u32,
        sv: SV,
        set: &CorrectionSet,
    ) -> Result<(OsrRow, Option<IonoEvaluation>), OsrError> {
        let record = self
            .dataset
            .ephemeris
            .nearest(sv, tow_s)
            .ok_or(OsrError::MissingEphemeris(sv))?;

        let (week, glonass_channel) = match &record.frame {
            EphemerisFrame::Kepler(eph) => (eph.week, 0),
            EphemerisFrame::Glonass(eph) => {
                let n4 = eph.n4.unwrap_or(self.context.n4);
                let (week, _) =
                    glonass_to_gps_time(eph.nt, 0.0, n4, self.context.leap_seconds);
                (week, eph.channel)
            }
        };

        // geometry state (satellite clock corrected), and the
        // uncorrected state the orbit corrections project onto
        let corrected = propagate(
            &record.frame,
            tow_s as f64,
            &self.receiver.ecef_m,
            self.context,
            SatelliteClock::Corrected,
        )
        .ok_or(OsrError::Diverged(sv))?;

        let uncorrected = propagate(
            &record.frame,
            tow_s as f64,
            &self.receiver.ecef_m,
            self.context,
            SatelliteClock::Uncorrected,
        )
        .ok_or(OsrError::Diverged(sv))?;

        let (_, elevation) = azimuth_elevation_rad(
            &corrected.position_m,
            &self.receiver.ecef_m,
            self.receiver.latitude_deg.to_radians(),
            self.receiver.longitude_deg.to_radians(),
        );

        if elevation < 0.0 {
            return Err(OsrError::BelowHorizon(sv));
        }

        let tracking_mode = default_tracking_mode(sv.constellation);
        let frequency_hz = default_frequency_hz(sv.constellation, glonass_channel);

        // the corrections are evaluated as received: dt = 0
        let dt = 0.0;

        let orbit_m = set
            .orbit_correction(sv)
            .map(|correction| self.orbit_correction_m(correction, &record.frame, &uncorrected, dt));

        let clock_m = set
            .clock_correction(sv)
            .map(|correction| correction.correction_m(dt));

        let code_bias_m = set.code_bias_m(sv, tracking_mode);
        let phase_bias_m = set.phase_bias_m(sv, tracking_mode);

        let shapiro_m = Some(self.shapiro_m(sv.constellation, &uncorrected.position_m));

        let evaluation = self.dataset.corrections.nearest_iono(tow_s).map(|vtec| {
            iono::evaluate(vtec, tow_s, sv, &corrected, self.receiver, frequency_hz)
        });

        let iono_m = evaluation.as_ref().map(|evaluation| evaluation.delay_m);

        let windup_m = set
            .yaw_deg(sv)
            .map(|(yaw, yaw_rate)| self.windup_m(&corrected, yaw, yaw_rate, dt, frequency_hz));

        Ok((
            OsrRow {
                week,
                tow_s,
                sv,
                elevation_deg: elevation.to_degrees(),
                clock_m,
                orbit_m,
                iono_m,
                shapiro_m,
                windup_m,
                phase_bias_m,
                code_bias_m,
            },
            evaluation,
        ))
    }

    /// Projects the radial/along/cross orbit correction onto the
    /// line of sight, through the orbital local frame of the
    /// uncorrected satellite state.
    fn orbit_correction_m(
        &self,
        correction: &OrbitCorrection,
        frame: &EphemerisFrame,
        state: &SatelliteState,
        dt: f64,
    ) -> f64 {
        // lenient IOD handling: the correction is still applied, the
        // mismatch is surfaced as a warning
        if let Some(iode) = frame.iode() {
            if iode != correction.iode {
                warn!(
                    "({}) SSR orbit IOD {} does not match ephemeris IOD {}",
                    correction.sv, correction.iode, iode,
                );
            }
        }

        let e_along = state.velocity_m_s.normalize();
        let e_cross = state.position_m.cross(&state.velocity_m_s).normalize();
        let e_radial = e_along.cross(&e_cross);

        let delta = (correction.radial_m + correction.radial_rate_m_s * dt) * e_radial
            + (correction.along_m + correction.along_rate_m_s * dt) * e_along
            + (correction.cross_m + correction.cross_rate_m_s * dt) * e_cross;

        let los = (state.position_m - self.receiver.ecef_m).normalize();

        delta.dot(&los)
    }

    /// Shapiro gravitational path delay (m).
    fn shapiro_m(&self, constellation: Constellation, sat_position_m: &Vector3<f64>) -> f64 {
        let mu = match constellation {
            Constellation::Galileo | Constellation::BeiDou => GAL_BDS_GRAVITATION_MU_M3_S2,
            Constellation::Glonass => GLO_GRAVITATION_MU_KM3_S2 * 1.0E9,
            _ => GPS_GRAVITATION_MU_M3_S2,
        };

        let r_sat = sat_position_m.norm();
        let r_rec = self.receiver.ecef_m.norm();
        let range = (sat_position_m - self.receiver.ecef_m).norm();

        let c2 = SPEED_OF_LIGHT_M_S * SPEED_OF_LIGHT_M_S;

        2.0 * mu / c2 * ((r_sat + r_rec + range) / (r_sat + r_rec - range)).ln()
    }

    /// Phase wind-up (m) through the effective dipole geometry.
    fn windup_m(
        &self,
        state: &SatelliteState,
        yaw_deg: f64,
        yaw_rate_deg_s: f64,
        dt: f64,
        frequency_hz: f64,
    ) -> f64 {
        let k = (state.position_m - self.receiver.ecef_m).normalize();

        let (e_east, e_north) = east_north_units(
            self.receiver.latitude_deg.to_radians(),
            self.receiver.longitude_deg.to_radians(),
        );

        // satellite body frame, with the velocity expressed
        // in the inertial frame
        let omega_earth = Vector3::new(0.0, 0.0, crate::constants::EARTH_ROTATION_RATE_RAD_S);
        let v_inertial = state.velocity_m_s + omega_earth.cross(&state.position_m);

        let e_z = -state.position_m.normalize();
        let e_y = -state.position_m.cross(&v_inertial).normalize();
        let e_x = e_y.cross(&e_z);

        // z axis yaw rotation
        let (sin_yaw, cos_yaw) = (yaw_deg + yaw_rate_deg_s * dt).to_radians().sin_cos();
        let e_x_yawed = cos_yaw * e_x + sin_yaw * e_y;
        let e_y_yawed = -sin_yaw * e_x + cos_yaw * e_y;

        // effective dipoles
        let d_sat = e_x_yawed - k * k.dot(&e_x_yawed) + k.cross(&e_y_yawed);
        let d_rec = e_east - k * k.dot(&e_east) + k.cross(&e_north);

        let cos_angle = (d_sat.dot(&d_rec) / (d_sat.norm() * d_rec.norm())).clamp(-1.0, 1.0);
        let angle = cos_angle.acos() * k.dot(&d_sat.cross(&d_rec)).signum();

        let wavelength_m = SPEED_OF_LIGHT_M_S / frequency_hz;

        -angle / (2.0 * std::f64::consts::PI) * wavelength_m
    }

    /// Formats the OSR rows and the ionosphere diagnostics into
    /// their respective sinks.
    pub fn format<W1: Write, W2: Write>(
        &self,
        osr: &mut W1,
        ion: &mut W2,
    ) -> Result<Vec<OsrEpoch>, FormattingError> {
        let epochs = self.compute();

        for epoch in epochs.iter() {
            let datetime = Epoch::from_time_of_week(
                self.context.reference_week,
                epoch.tow_s as u64 * 1_000_000_000,
                TimeScale::GPST,
            );

            writeln!(osr, "#*** Epoch {} ({}) ***", epoch.tow_s, datetime)?;
            writeln!(
                osr,
                "#  week          tow     sv     elev[deg]  clck[m]  orbt[m]    iono[m]   shpr[m]    wup[m]     pbias[m]  cbias[m]"
            )?;

            for (sv, error) in epoch.skipped.iter() {
                writeln!(osr, "# note: {}: {}", sv, error)?;
            }

            for row in epoch.rows.iter() {
                writeln!(osr, "{}", row)?;
            }

            for evaluation in epoch.iono.iter() {
                write!(ion, "{}", evaluation)?;
            }
        }

        Ok(epochs)
    }

    /// Formats into local files (the `.osr` and `.ion` sinks).
    pub fn to_files(
        &self,
        osr_path: impl AsRef<Path>,
        ion_path: impl AsRef<Path>,
    ) -> Result<Vec<OsrEpoch>, FormattingError> {
        let mut osr = BufWriter::new(File::create(osr_path)?);
        let mut ion = BufWriter::new(File::create(ion_path)?);
        self.format(&mut osr, &mut ion)
    }
}
