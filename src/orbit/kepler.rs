//! Analytic Kepler element propagation (GPS, Galileo, BDS, QZSS).

use log::error;

use nalgebra::{SMatrix, Vector3, Vector4};

use gnss_rs::prelude::Constellation;

use crate::{
    constants::{
        BDT_GPS_OFFSET_S, EARTH_ROTATION_RATE_RAD_S, GAL_BDS_GRAVITATION_MU_M3_S2,
        GAL_BDS_RELATIVISTIC_F, GPS_GRAVITATION_MU_M3_S2, GPS_RELATIVISTIC_F, SPEED_OF_LIGHT_M_S,
    },
    messages::ephemeris::KeplerEphemeris,
    orbit::{
        normalize_week_dt, SatelliteClock, SatelliteState, CLOCK_TOLERANCE_S, INITIAL_RANGE_M,
        MAX_ITERATIONS, RANGE_TOLERANCE_M,
    },
};

/// Eccentric anomaly fixed point tolerance.
const KEPLER_TOLERANCE: f64 = 5.0E-12;

/// Maximum eccentric anomaly refinements.
const KEPLER_MAX_ITERATIONS: usize = 10;

fn gravitation_mu_m3_s2(constellation: Constellation) -> f64 {
    match constellation {
        Constellation::Galileo | Constellation::BeiDou => GAL_BDS_GRAVITATION_MU_M3_S2,
        _ => GPS_GRAVITATION_MU_M3_S2, // from GPS ICD, QZSS alike
    }
}

fn relativistic_f(constellation: Constellation) -> f64 {
    match constellation {
        // BDS ICD expresses the correction as -2√μ/c² explicitly
        Constellation::Galileo | Constellation::BeiDou => GAL_BDS_RELATIVISTIC_F,
        _ => GPS_RELATIVISTIC_F,
    }
}

/// Constant offset between the constellation time frame and GPS time.
fn system_time_offset_s(constellation: Constellation) -> f64 {
    match constellation {
        Constellation::BeiDou => BDT_GPS_OFFSET_S,
        _ => 0.0,
    }
}

/// Propagates Kepler elements to the transmission time of a signal
/// received at GPS time of week `tow_s`.
pub(crate) fn propagate(
    eph: &KeplerEphemeris,
    tow_s: f64,
    receiver_m: &Vector3<f64>,
    clock: SatelliteClock,
) -> Option<SatelliteState> {
    let reception_s = tow_s - system_time_offset_s(eph.sv.constellation);

    let mut range_m = INITIAL_RANGE_M;
    let mut clock_s = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let mut transmission_s = reception_s - range_m / SPEED_OF_LIGHT_M_S;

        if clock == SatelliteClock::Corrected {
            transmission_s -= clock_s;
        }

        let state = evaluate(eph, transmission_s)?;
        let new_range_m = (state.position_m - receiver_m).norm();

        let converged = (new_range_m - range_m).abs() < RANGE_TOLERANCE_M
            && (state.clock_s - clock_s).abs() < CLOCK_TOLERANCE_S;

        range_m = new_range_m;
        clock_s = state.clock_s;

        if converged {
            return Some(state);
        }
    }

    error!("({}) kepler solver did not converge", eph.sv);
    None
}

/// Evaluates the standard Keplerian equations at time of week `t_s`
/// (constellation time frame), with first temporal derivatives.
fn evaluate(eph: &KeplerEphemeris, t_s: f64) -> Option<SatelliteState> {
    let mu = gravitation_mu_m3_s2(eph.sv.constellation);
    let omega_e = EARTH_ROTATION_RATE_RAD_S;

    let sma_m = eph.semi_major_axis_m();
    let sqrt_sma = eph.sqrt_a;

    let dt = normalize_week_dt(t_s - eph.toe_s as f64);

    let n0 = (mu / sma_m.powi(3)).sqrt();
    let n = n0 + eph.dn_rad_s;
    let m_k = eph.m0_rad + n * dt;

    // eccentric anomaly fixed point
    let mut e_k = m_k;

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let refined = m_k + eph.ecc * e_k.sin();

        if (refined - e_k).abs() < KEPLER_TOLERANCE {
            e_k = refined;
            break;
        }

        e_k = refined;
    }

    let (sin_e_k, cos_e_k) = e_k.sin_cos();

    // true anomaly and latitude argument
    let v_k = ((1.0 - eph.ecc.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - eph.ecc);
    let phi_k = v_k + eph.omega_rad;
    let (x2_sin_phi_k, x2_cos_phi_k) = (2.0 * phi_k).sin_cos();

    // harmonic corrections
    let du_k = eph.cus_rad * x2_sin_phi_k + eph.cuc_rad * x2_cos_phi_k;
    let u_k = phi_k + du_k;

    let dr_k = eph.crs_m * x2_sin_phi_k + eph.crc_m * x2_cos_phi_k;
    let r_k = sma_m * (1.0 - eph.ecc * cos_e_k) + dr_k;

    let di_k = eph.cis_rad * x2_sin_phi_k + eph.cic_rad * x2_cos_phi_k;
    let i_k = eph.i0_rad + di_k + eph.idot_rad_s * dt;

    // ascending node, corrected for Greenwich advance
    let omega_k = eph.omega0_rad + (eph.omega_dot_rad_s - omega_e) * dt - omega_e * eph.toe_s as f64;

    // first derivatives
    let fd_omega_k = eph.omega_dot_rad_s - omega_e;
    let fd_e_k = n / (1.0 - eph.ecc * cos_e_k);
    let fd_phi_k = ((1.0 + eph.ecc) / (1.0 - eph.ecc)).sqrt()
        * ((v_k / 2.0).cos() / (e_k / 2.0).cos()).powi(2)
        * fd_e_k;

    let fd_u_k =
        (eph.cus_rad * x2_cos_phi_k - eph.cuc_rad * x2_sin_phi_k) * fd_phi_k * 2.0 + fd_phi_k;

    let fd_r_k = sma_m * eph.ecc * sin_e_k * fd_e_k
        + 2.0 * (eph.crs_m * x2_cos_phi_k - eph.crc_m * x2_sin_phi_k) * fd_phi_k;

    let fd_i_k =
        eph.idot_rad_s + 2.0 * (eph.cis_rad * x2_cos_phi_k - eph.cic_rad * x2_sin_phi_k) * fd_phi_k;

    // position in orbital plane and its derivative
    let (sin_u_k, cos_u_k) = u_k.sin_cos();
    let (x, y) = (r_k * cos_u_k, r_k * sin_u_k);
    let fd_x = fd_r_k * cos_u_k - r_k * fd_u_k * sin_u_k;
    let fd_y = fd_r_k * sin_u_k + r_k * fd_u_k * cos_u_k;

    let (sin_omega_k, cos_omega_k) = omega_k.sin_cos();
    let (sin_i_k, cos_i_k) = i_k.sin_cos();

    let position_m = Vector3::new(
        x * cos_omega_k - y * cos_i_k * sin_omega_k,
        x * sin_omega_k + y * cos_i_k * cos_omega_k,
        y * sin_i_k,
    );

    // first derivative of the orbital plane rotation
    let mut fd_r = SMatrix::<f64, 3, 4>::zeros();
    fd_r[(0, 0)] = cos_omega_k;
    fd_r[(0, 1)] = -sin_omega_k * cos_i_k;
    fd_r[(0, 2)] = -(x * sin_omega_k + y * cos_omega_k * cos_i_k);
    fd_r[(0, 3)] = y * sin_omega_k * sin_i_k;
    fd_r[(1, 0)] = sin_omega_k;
    fd_r[(1, 1)] = cos_omega_k * cos_i_k;
    fd_r[(1, 2)] = x * cos_omega_k - y * sin_omega_k * cos_i_k;
    fd_r[(1, 3)] = y * cos_omega_k * sin_i_k;
    fd_r[(2, 1)] = sin_i_k;
    fd_r[(2, 3)] = y * cos_i_k;

    let velocity_m_s = fd_r * Vector4::new(fd_x, fd_y, fd_omega_k, fd_i_k);

    // satellite clock, with the relativistic correction F e √a sin(E)
    let dtr = relativistic_f(eph.sv.constellation) * eph.ecc * sqrt_sma * sin_e_k;
    let tk = normalize_week_dt(t_s - eph.toc_s as f64);
    let clock_s = eph.af0_s + eph.af1_s_s * tk + eph.af2_s_s2 * tk * tk + dtr;

    Some(SatelliteState {
        position_m,
        velocity_m_s,
        clock_s,
    })
}

#[cfg(test)]
mod test {
    use super::evaluate;
    use crate::messages::ephemeris::KeplerEphemeris;
    use crate::constants::{EARTH_ROTATION_RATE_RAD_S, GPS_GRAVITATION_MU_M3_S2};
    use gnss_rs::prelude::{Constellation, SV};

    fn circular_ephemeris(toe_s: u32) -> KeplerEphemeris {
        KeplerEphemeris {
            sv: SV::new(Constellation::GPS, 1),
            week: 2088,
            iode: 1,
            iodc: None,
            toe_s,
            toc_s: toe_s,
            sqrt_a: 5153.6,
            ecc: 0.0,
            m0_rad: 0.0,
            dn_rad_s: 0.0,
            i0_rad: 0.0,
            idot_rad_s: 0.0,
            omega0_rad: 0.0,
            omega_dot_rad_s: 0.0,
            omega_rad: 0.0,
            crs_m: 0.0,
            crc_m: 0.0,
            cus_rad: 0.0,
            cuc_rad: 0.0,
            cis_rad: 0.0,
            cic_rad: 0.0,
            af0_s: 0.0,
            af1_s_s: 0.0,
            af2_s_s2: 0.0,
            tgd_s: 0.0,
            tgd2_s: None,
            ura_index: 0,
            health: 0,
            code_on_l2: None,
            l2p_data: None,
            fit_interval: None,
        }
    }

    #[test]
    fn equatorial_circular_orbit() {
        // null eccentricity, null inclination: the analytic orbit is an
        // equatorial circle of radius a, rotated by the Greenwich advance
        let eph = circular_ephemeris(0);
        let a = eph.semi_major_axis_m();

        let state = evaluate(&eph, 0.0).unwrap();
        assert!((state.position_m.norm() - a).abs() < 0.1);
        assert!((state.position_m[0] - a).abs() < 0.1);
        assert!(state.position_m[2].abs() < 0.1);

        let n = (GPS_GRAVITATION_MU_M3_S2 / a.powi(3)).sqrt();

        for dt in [60.0, 600.0, 3_600.0] {
            let state = evaluate(&eph, dt).unwrap();

            // angular position advances by (n - ωe) dt in the rotating frame
            let angle = (n - EARTH_ROTATION_RATE_RAD_S) * dt;
            let expected_x = a * angle.cos();
            let expected_y = a * angle.sin();

            assert!((state.position_m[0] - expected_x).abs() < 0.1);
            assert!((state.position_m[1] - expected_y).abs() < 0.1);
            assert!(state.position_m[2].abs() < 0.1);

            // velocity is tangential at a (n - ωe) in the rotating frame
            let speed = state.velocity_m_s.norm();
            assert!((speed - a * (n - EARTH_ROTATION_RATE_RAD_S)).abs() < 1.0E-4);
        }
    }

    #[test]
    fn clock_polynomial() {
        let mut eph = circular_ephemeris(0);
        eph.af0_s = 1.0E-4;

        let state = evaluate(&eph, 600.0).unwrap();
        assert!((state.clock_s - 1.0E-4).abs() < 1.0E-15);
    }
}
