//! Glonass state vector propagation: numerical integration of the
//! perturbed two body equations in the rotating PZ-90 frame.

use log::error;

use nalgebra::{Matrix3, Vector3};

use crate::{
    constants::{
        GLO_GRAVITATION_MU_KM3_S2, GLO_J2_FACTOR_KM5_S2, GLO_OMEGA_SQUARED_RAD2_S2,
        PZ90_WGS84_ROTATION_RAD, SPEED_OF_LIGHT_M_S,
    },
    messages::ephemeris::GlonassEphemeris,
    orbit::{
        normalize_week_dt, SatelliteClock, SatelliteState, CLOCK_TOLERANCE_S, INITIAL_RANGE_M,
        MAX_ITERATIONS, RANGE_TOLERANCE_M,
    },
    time::{glonass_to_gps_time, TimeContext},
};

/// Integration macro step (s).
const INTEGRATION_STEP_S: f64 = 60.0;

// Fehlberg 7(8) Runge-Kutta coefficients (NASA TR R-287).
// The order 8 solution weights are used, making the fixed step
// integration an order 8 method as the propagation requires.
const C: [f64; 13] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

const A: [[f64; 12]; 13] = [
    [0.0; 12],
    [
        2.0 / 27.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        1.0 / 36.0,
        1.0 / 12.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        1.0 / 24.0,
        0.0,
        1.0 / 8.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        5.0 / 12.0,
        0.0,
        -25.0 / 16.0,
        25.0 / 16.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        1.0 / 20.0,
        0.0,
        0.0,
        1.0 / 4.0,
        1.0 / 5.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        -25.0 / 108.0,
        0.0,
        0.0,
        125.0 / 108.0,
        -65.0 / 27.0,
        125.0 / 54.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        31.0 / 300.0,
        0.0,
        0.0,
        0.0,
        61.0 / 225.0,
        -2.0 / 9.0,
        13.0 / 900.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2.0,
        0.0,
        0.0,
        -53.0 / 6.0,
        704.0 / 45.0,
        -107.0 / 9.0,
        67.0 / 90.0,
        3.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        -91.0 / 108.0,
        0.0,
        0.0,
        23.0 / 108.0,
        -976.0 / 135.0,
        311.0 / 54.0,
        -19.0 / 60.0,
        17.0 / 6.0,
        -1.0 / 12.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2383.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -301.0 / 82.0,
        2133.0 / 4100.0,
        45.0 / 82.0,
        45.0 / 164.0,
        18.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        3.0 / 205.0,
        0.0,
        0.0,
        0.0,
        0.0,
        -6.0 / 41.0,
        -3.0 / 205.0,
        -3.0 / 41.0,
        3.0 / 41.0,
        6.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        -1777.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -289.0 / 82.0,
        2193.0 / 4100.0,
        51.0 / 82.0,
        33.0 / 164.0,
        12.0 / 41.0,
        0.0,
        1.0,
    ],
];

const B8: [f64; 13] = [
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    34.0 / 105.0,
    9.0 / 35.0,
    9.0 / 35.0,
    9.0 / 280.0,
    9.0 / 280.0,
    0.0,
    41.0 / 840.0,
    41.0 / 840.0,
];

/// One Fehlberg 7(8) step of width `h` on an autonomous system.
fn rkf78_step<F: Fn(&[f64; 6]) -> [f64; 6]>(f: &F, y: &[f64; 6], h: f64) -> [f64; 6] {
    let mut k = [[0.0_f64; 6]; 13];

    for stage in 0..13 {
        let mut y_stage = *y;

        for prior in 0..stage {
            let a = A[stage][prior];
            if a != 0.0 {
                for dim in 0..6 {
                    y_stage[dim] += h * a * k[prior][dim];
                }
            }
        }

        k[stage] = f(&y_stage);
    }

    let mut next = *y;
    for stage in 0..13 {
        let b = B8[stage];
        if b != 0.0 {
            for dim in 0..6 {
                next[dim] += h * b * k[stage][dim];
            }
        }
    }

    next
}

/// Integrates an autonomous system over `span_s` seconds with fixed
/// `step_s` macro steps (plus a shorter final step to land exactly).
/// Negative spans integrate backwards.
pub(crate) fn integrate_rkf78<F: Fn(&[f64; 6]) -> [f64; 6]>(
    f: &F,
    mut y: [f64; 6],
    span_s: f64,
    step_s: f64,
) -> [f64; 6] {
    let mut elapsed = 0.0_f64;
    let step = step_s.abs().copysign(span_s);

    while (span_s - elapsed).abs() > 1.0E-9 {
        let remaining = span_s - elapsed;

        let h = if remaining.abs() < step.abs() {
            remaining
        } else {
            step
        };

        y = rkf78_step(f, &y, h);
        elapsed += h;
    }

    y
}

/// Equations of motion in the rotating PZ-90 frame: central
/// attraction, second zonal harmonic, Coriolis and centrifugal
/// terms, plus the broadcast luni-solar acceleration held constant
/// over the integration span. All in km.
fn equations_of_motion(y: &[f64; 6], acceleration_km_s2: &(f64, f64, f64)) -> [f64; 6] {
    let (x, yy, z, vx, vy, vz) = (y[0], y[1], y[2], y[3], y[4], y[5]);

    let mu = GLO_GRAVITATION_MU_KM3_S2;
    let omega2 = GLO_OMEGA_SQUARED_RAD2_S2;
    let omega = omega2.sqrt();

    let r2 = x * x + yy * yy + z * z;
    let r = r2.sqrt();
    let r3 = r2 * r;
    let r5 = r2 * r3;

    let z_ratio2 = 5.0 * z * z / r2;

    let common = -mu / r3 + GLO_J2_FACTOR_KM5_S2 * (1.0 - z_ratio2) / r5 + omega2;

    [
        vx,
        vy,
        vz,
        common * x + 2.0 * omega * vy + acceleration_km_s2.0,
        common * yy - 2.0 * omega * vx + acceleration_km_s2.1,
        (-mu / r3 + GLO_J2_FACTOR_KM5_S2 * (3.0 - z_ratio2) / r5) * z + acceleration_km_s2.2,
    ]
}

/// PZ-90 to WGS-84 small rotation.
fn pz90_to_wgs84() -> Matrix3<f64> {
    let angle = PZ90_WGS84_ROTATION_RAD;

    Matrix3::new(
        1.0, -angle, 0.0, //
        angle, 1.0, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Propagates a Glonass ephemeris to the transmission time of a
/// signal received at GPS time of week `tow_s`, by integrating the
/// broadcast state vector from its reference time tb.
pub(crate) fn propagate(
    eph: &GlonassEphemeris,
    tow_s: f64,
    receiver_m: &Vector3<f64>,
    context: &TimeContext,
    clock: SatelliteClock,
) -> Option<SatelliteState> {
    let n4 = eph.n4.unwrap_or(context.n4);

    // tb is on the Moscow day grid: re-stamp into GPS time of week
    let (_, tb_tow) = glonass_to_gps_time(eph.nt, eph.tb_s as f64, n4, context.leap_seconds);

    let initial = [
        eph.position_km.0,
        eph.position_km.1,
        eph.position_km.2,
        eph.velocity_km_s.0,
        eph.velocity_km_s.1,
        eph.velocity_km_s.2,
    ];

    let motion = |y: &[f64; 6]| equations_of_motion(y, &eph.acceleration_km_s2);
    let rotation = pz90_to_wgs84();

    let mut range_m = INITIAL_RANGE_M;
    let mut clock_s = 0.0;

    for _ in 0..MAX_ITERATIONS {
        let mut transmission_s = tow_s - range_m / SPEED_OF_LIGHT_M_S;

        if clock == SatelliteClock::Corrected {
            transmission_s -= clock_s;
        }

        let span_s = normalize_week_dt(transmission_s - tb_tow);
        let integrated = integrate_rkf78(&motion, initial, span_s, INTEGRATION_STEP_S);

        let position_m =
            rotation * Vector3::new(integrated[0], integrated[1], integrated[2]) * 1.0E3;
        let velocity_m_s =
            rotation * Vector3::new(integrated[3], integrated[4], integrated[5]) * 1.0E3;

        let new_clock_s = -eph.tau_s + eph.gamma * span_s;
        let new_range_m = (position_m - receiver_m).norm();

        let converged = (new_range_m - range_m).abs() < RANGE_TOLERANCE_M
            && (new_clock_s - clock_s).abs() < CLOCK_TOLERANCE_S;

        range_m = new_range_m;
        clock_s = new_clock_s;

        if converged {
            return Some(SatelliteState {
                position_m,
                velocity_m_s,
                clock_s,
            });
        }
    }

    error!("({}) state vector integration did not converge", eph.sv);
    None
}

#[cfg(test)]
mod test {
    use super::{equations_of_motion, integrate_rkf78};

    #[test]
    fn exponential_decay() {
        // y' = -y on every component, over one unit
        let f = |y: &[f64; 6]| {
            let mut dy = [0.0; 6];
            for dim in 0..6 {
                dy[dim] = -y[dim];
            }
            dy
        };

        let y = integrate_rkf78(&f, [1.0; 6], 1.0, 0.1);
        assert!((y[0] - (-1.0_f64).exp()).abs() < 1.0E-12);
    }

    #[test]
    fn circular_two_body_orbit() {
        // pure central attraction: the integrated circular orbit
        // must match the analytic solution to well below a meter
        let mu = 398_600.44_f64; // km3/s2
        let radius = 25_500.0_f64; // km
        let speed = (mu / radius).sqrt();
        let n = speed / radius;

        let f = |y: &[f64; 6]| {
            let r2 = y[0] * y[0] + y[1] * y[1] + y[2] * y[2];
            let r3 = r2 * r2.sqrt();
            [
                y[3],
                y[4],
                y[5],
                -mu * y[0] / r3,
                -mu * y[1] / r3,
                -mu * y[2] / r3,
            ]
        };

        let initial = [radius, 0.0, 0.0, 0.0, speed, 0.0];

        for span in [900.0_f64, -900.0] {
            let y = integrate_rkf78(&f, initial, span, 60.0);

            let angle = n * span;
            let expected = [radius * angle.cos(), radius * angle.sin()];

            assert!((y[0] - expected[0]).abs() < 1.0E-4, "x after {} s", span);
            assert!((y[1] - expected[1]).abs() < 1.0E-4, "y after {} s", span);
            assert!(y[2].abs() < 1.0E-9);
        }
    }

    #[test]
    fn null_span() {
        let accel = (0.0, 0.0, 0.0);
        let f = |y: &[f64; 6]| equations_of_motion(y, &accel);

        let initial = [10_000.0, 18_000.0, 12_000.0, -1.5, 2.0, 0.5];
        let y = integrate_rkf78(&f, initial, 0.0, 60.0);

        assert_eq!(y, initial);
    }
}
