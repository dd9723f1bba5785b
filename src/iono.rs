//! Global ionosphere evaluation: pierce point geometry, normalized
//! Legendre recursion, VTEC to slant range influence.

use std::fmt;

use nalgebra::Vector3;

use gnss_rs::prelude::SV;

use crate::{
    constants::{EARTH_MEAN_RADIUS_M, EARTH_ROTATION_RATE_RAD_S, IONO_RANGE_FACTOR,
        SPEED_OF_LIGHT_M_S},
    coords::{azimuth_elevation_rad, ecef_to_spherical, Receiver},
    messages::vtec::VtecMessage,
    orbit::SatelliteState,
};

use std::f64::consts::{FRAC_PI_2, PI};

/// Associated Legendre polynomials P(n, m) by the triangular
/// recursion, up to provided degree. The returned matrix is zero
/// above the diagonal.
pub(crate) fn legendre(degree: usize, x: f64) -> Vec<Vec<f64>> {
    let nmax = degree + 1;

    let mut p = vec![vec![0.0_f64; nmax]; nmax];
    p[0][0] = 1.0;

    for m in 1..nmax {
        p[m][m] = (2 * m - 1) as f64 * (1.0 - x * x).sqrt() * p[m - 1][m - 1];
    }

    for m in 0..nmax {
        for n in (m + 1)..nmax {
            let previous = if n >= 2 {
                (n + m - 1) as f64 * p[n - 2][m]
            } else {
                0.0
            };

            p[n][m] = ((2 * n - 1) as f64 * x * p[n - 1][m] - previous) / (n - m) as f64;
        }
    }

    p
}

/// Normalization factor √((2n+1)(n-m)!/(n+m)!), with the
/// additional √2 for non zonal terms.
pub(crate) fn legendre_normalization(n: usize, m: usize) -> f64 {
    // (n+m)!/(n-m)! without factorial overflow
    let mut ratio = 1.0_f64;
    for k in (n - m + 1)..=(n + m) {
        ratio *= k as f64;
    }

    let s2 = (2 * n + 1) as f64 / ratio;

    if m == 0 {
        s2.sqrt()
    } else {
        (2.0 * s2).sqrt()
    }
}

/// One evaluated Legendre term of the VTEC expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendreTerm {
    /// Degree
    pub n: usize,

    /// Order
    pub m: usize,

    /// Normalized polynomial value
    pub p_nm: f64,

    /// P(n,m) cos(m λs)
    pub p_cos: f64,

    /// P(n,m) sin(m λs)
    pub p_sin: f64,
}

/// Evaluation of one ionospheric layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEvaluation {
    /// Layer height (m)
    pub height_m: f64,

    /// Pierce point central angle (rad)
    pub psi_pp_rad: f64,

    /// Pierce point latitude (rad)
    pub phi_pp_rad: f64,

    /// Pierce point longitude (rad)
    pub lambda_pp_rad: f64,

    /// Sun shift angle at this epoch (rad)
    pub sun_shift_rad: f64,

    /// Sun fixed pierce point longitude (rad)
    pub sun_fixed_lon_rad: f64,

    /// Evaluated Legendre terms
    pub legendre: Vec<LegendreTerm>,

    /// Vertical TEC (TECU)
    pub vtec_tecu: f64,

    /// Slant factor
    pub slant_factor: f64,

    /// Slant TEC (TECU)
    pub stec_tecu: f64,
}

/// Complete ionosphere evaluation for one satellite at one epoch.
/// The range influence sums all layer contributions at the selected
/// carrier frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct IonoEvaluation {
    /// Satellite identity
    pub sv: SV,

    /// Epoch, seconds of week
    pub epoch_s: u32,

    /// Satellite state used by the evaluation
    pub sat_position_m: Vector3<f64>,

    /// Satellite velocity (m.s⁻¹)
    pub sat_velocity_m_s: Vector3<f64>,

    /// Receiver spherical coordinates (lat rad, lon rad, radius m)
    pub receiver_spherical: (f64, f64, f64),

    /// Relative azimuth in the local spherical frame (rad)
    pub azimuth_rad: f64,

    /// Relative elevation in the local spherical frame (rad)
    pub elevation_rad: f64,

    /// Carrier frequency the influence maps to (Hz)
    pub frequency_hz: f64,

    /// Per layer evaluations
    pub layers: Vec<LayerEvaluation>,

    /// Total slant range influence (m) at the carrier
    pub delay_m: f64,
}

/// Evaluates the VTEC spherical harmonics message for one satellite:
/// pierce point geometry, sun fixed longitude, normalized Legendre
/// expansion, then the slant range influence at the selected carrier.
pub fn evaluate(
    vtec: &VtecMessage,
    epoch_s: u32,
    sv: SV,
    state: &SatelliteState,
    receiver: &Receiver,
    frequency_hz: f64,
) -> IonoEvaluation {
    // satellite spin correction: rotate by ωe ρ/c
    let range_m = (state.position_m - receiver.ecef_m).norm();
    let alpha = EARTH_ROTATION_RATE_RAD_S * range_m / SPEED_OF_LIGHT_M_S;
    let (sin_alpha, cos_alpha) = alpha.sin_cos();

    let sat_m = Vector3::new(
        cos_alpha * state.position_m[0] + sin_alpha * state.position_m[1],
        -sin_alpha * state.position_m[0] + cos_alpha * state.position_m[1],
        state.position_m[2],
    );

    let (lat_r, lon_r, radius_r) = ecef_to_spherical(&receiver.ecef_m);
    let (azimuth, elevation) = azimuth_elevation_rad(&sat_m, &receiver.ecef_m, lat_r, lon_r);

    let mut layers = Vec::with_capacity(vtec.layers.len());
    let mut delay_m = 0.0;

    for layer in vtec.layers.iter() {
        let height_m = layer.height_km * 1.0E3;

        // pierce point central angle
        let ratio = radius_r / (EARTH_MEAN_RADIUS_M + height_m);
        let psi_pp = FRAC_PI_2 - elevation - (ratio * elevation.cos()).asin();

        // pierce point latitude
        let (sin_psi, cos_psi) = psi_pp.sin_cos();
        let (sin_lat, cos_lat) = lat_r.sin_cos();

        let phi_pp = (sin_lat * cos_psi + cos_lat * sin_psi * azimuth.cos()).asin();

        // pierce point longitude, quadrant sensitive
        let arg = (sin_psi * azimuth.sin() / phi_pp.cos()).asin();

        let lambda_pp = if lat_r >= 0.0
            && psi_pp.tan() * azimuth.cos() > (FRAC_PI_2 - lat_r).tan()
        {
            lon_r + PI - arg
        } else if lat_r < 0.0 && -psi_pp.tan() * azimuth.cos() > (FRAC_PI_2 + lat_r).tan() {
            lon_r + PI - arg
        } else {
            lon_r + arg
        };

        // sun fixed longitude
        let sun_shift = (epoch_s as f64 - 50_400.0) * PI / 43_200.0;
        let sun_fixed_lon = (lambda_pp + sun_shift).rem_euclid(2.0 * PI);

        // normalized Legendre expansion at sin(φpp)
        let p = legendre(layer.degree, phi_pp.sin());

        let mut terms = Vec::new();
        let mut vtec_tecu = 0.0;

        for n in 0..=layer.degree {
            for m in 0..=n {
                let p_nm = legendre_normalization(n, m) * p[n][m];
                let p_cos = p_nm * (m as f64 * sun_fixed_lon).cos();
                let p_sin = p_nm * (m as f64 * sun_fixed_lon).sin();

                if m <= layer.order {
                    vtec_tecu += layer.cosine_tecu[n][m] * p_cos;
                    vtec_tecu += layer.sine_tecu[n][m] * p_sin;
                }

                terms.push(LegendreTerm {
                    n,
                    m,
                    p_nm,
                    p_cos,
                    p_sin,
                });
            }
        }

        let slant_factor = 1.0 / (elevation + psi_pp).sin();
        let stec_tecu = vtec_tecu * slant_factor;

        delay_m += IONO_RANGE_FACTOR / (frequency_hz * frequency_hz) * stec_tecu;

        layers.push(LayerEvaluation {
            height_m,
            psi_pp_rad: psi_pp,
            phi_pp_rad: phi_pp,
            lambda_pp_rad: lambda_pp,
            sun_shift_rad: sun_shift,
            sun_fixed_lon_rad: sun_fixed_lon,
            legendre: terms,
            vtec_tecu,
            slant_factor,
            stec_tecu,
        });
    }

    IonoEvaluation {
        sv,
        epoch_s,
        sat_position_m: state.position_m,
        sat_velocity_m_s: state.velocity_m_s,
        receiver_spherical: (lat_r, lon_r, radius_r),
        azimuth_rad: azimuth,
        elevation_rad: elevation,
        frequency_hz,
        layers,
        delay_m,
    }
}

impl fmt::Display for IonoEvaluation {
    /// Pierce point diagnostics, one block per layer.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (lat_r, lon_r, radius_r) = self.receiver_spherical;

        for layer in self.layers.iter() {
            writeln!(
                f,
                "### SV pos/vel for SV {} at {}: {:16.4} {:16.4} {:16.4} [m] {:9.4} {:9.4} {:9.4} [m/s]",
                self.sv,
                self.epoch_s,
                self.sat_position_m[0],
                self.sat_position_m[1],
                self.sat_position_m[2],
                self.sat_velocity_m_s[0],
                self.sat_velocity_m_s[1],
                self.sat_velocity_m_s[2],
            )?;

            writeln!(
                f,
                "PPt at t={} (sun shift={:11.8} deg)",
                self.epoch_s,
                layer.sun_shift_rad.to_degrees(),
            )?;

            writeln!(
                f,
                "PPt from Ref phi_R={:11.8} lam_R={:11.8} rE+hR={:10.3} (spherical!)",
                lat_r.to_degrees(),
                lon_r.to_degrees(),
                radius_r,
            )?;

            writeln!(
                f,
                "PPt from Ref to SV at elev={:11.8} azim={:11.8} (spherical!)",
                self.elevation_rad.to_degrees(),
                self.azimuth_rad.to_degrees(),
            )?;

            writeln!(
                f,
                "PPt psi_pp={:11.8} phi_pp={:11.8} lam_pp={:11.8} lon_S={:11.8} rE+hI={:10.3}",
                layer.psi_pp_rad.to_degrees(),
                layer.phi_pp_rad.to_degrees(),
                layer.lambda_pp_rad.to_degrees(),
                layer.sun_fixed_lon_rad.to_degrees(),
                layer.height_m + 6_370_000.0,
            )?;

            write!(f, "Pnm : ")?;
            for term in layer.legendre.iter() {
                write!(f, "P({},{})={:7.4}; ", term.n, term.m, term.p_nm)?;
            }
            writeln!(f)?;

            write!(f, "Pcos: ")?;
            for term in layer.legendre.iter() {
                write!(f, "P({},{})={:7.4}; ", term.n, term.m, term.p_cos)?;
            }
            writeln!(f)?;

            write!(f, "Psin: ")?;
            for term in layer.legendre.iter() {
                write!(f, "P({},{})={:7.4}; ", term.n, term.m, term.p_sin)?;
            }
            writeln!(f)?;

            writeln!(
                f,
                "Sum VTEC={:6.3} [TECU], sf={:6.3}, STEC={:6.3} [TECU]",
                layer.vtec_tecu, layer.slant_factor, layer.stec_tecu,
            )?;
        }

        writeln!(
            f,
            "SSR_VTEC: SV {} Have SSR VTEC Iono slant influence: {:6.3} [m]",
            self.sv, self.delay_m,
        )
    }
}

#[cfg(test)]
mod test {
    use super::{legendre, legendre_normalization};

    #[test]
    fn normalized_legendre_at_zero() {
        let p = legendre(3, 0.0);

        // reference values of the normalized polynomials at x = 0
        let expected = [
            (0, 0, 1.0_f64),
            (1, 0, 0.0),
            (1, 1, 3.0_f64.sqrt()),
            (2, 0, -0.5 * 5.0_f64.sqrt()),
            (2, 1, 0.0),
            (2, 2, 3.0 * (5.0_f64 / 12.0).sqrt()),
            (3, 0, 0.0),
            (3, 2, 0.0),
        ];

        for (n, m, value) in expected {
            let normalized = legendre_normalization(n, m) * p[n][m];
            assert!(
                (normalized - value).abs() < 1.0E-12,
                "P({},{})(0) = {}, expecting {}",
                n,
                m,
                normalized,
                value
            );
        }
    }

    #[test]
    fn legendre_recursion() {
        // P(2,0)(x) = (3x² - 1)/2 and P(3,0)(x) = (5x³ - 3x)/2
        for x in [-0.8, -0.3, 0.1, 0.5, 0.9] {
            let p = legendre(3, x);

            assert!((p[1][0] - x).abs() < 1.0E-14);
            assert!((p[2][0] - (3.0 * x * x - 1.0) / 2.0).abs() < 1.0E-14);
            assert!((p[3][0] - (5.0 * x * x * x - 3.0 * x) / 2.0).abs() < 1.0E-13);

            // sectoral terms
            let s = (1.0 - x * x).sqrt();
            assert!((p[1][1] - s).abs() < 1.0E-14);
            assert!((p[2][2] - 3.0 * s * s).abs() < 1.0E-13);
        }
    }
}
