//! Receiver coordinates and local frame geometry.

use nalgebra::Vector3;

use crate::constants::{WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M};

/// WGS-84 ellipsoidal to geocentric cartesian coordinates,
/// as per "Satellite Geodesy" (Seeber).
pub fn ellipsoidal_to_ecef_m(lat_deg: f64, lon_deg: f64, height_m: f64) -> Vector3<f64> {
    let (a, f) = (WGS84_SEMI_MAJOR_AXIS_M, WGS84_FLATTENING);

    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();

    let n_bar = a / (1.0 - f * (2.0 - f) * lat.sin().powi(2)).sqrt();

    Vector3::new(
        (n_bar + height_m) * lat.cos() * lon.cos(),
        (n_bar + height_m) * lat.cos() * lon.sin(),
        ((1.0 - f).powi(2) * n_bar + height_m) * lat.sin(),
    )
}

/// Geocentric cartesian to spherical coordinates:
/// (latitude rad, longitude rad, radius m).
pub fn ecef_to_spherical(position_m: &Vector3<f64>) -> (f64, f64, f64) {
    let radius = position_m.norm();
    let lat = (position_m[2] / radius).asin();
    let lon = position_m[1].atan2(position_m[0]);
    (lat, lon, radius)
}

/// Relative (azimuth, elevation) in radians of a target seen from an
/// observer, in the local frame defined by provided latitude and
/// longitude.
pub fn azimuth_elevation_rad(
    target_m: &Vector3<f64>,
    observer_m: &Vector3<f64>,
    lat_rad: f64,
    lon_rad: f64,
) -> (f64, f64) {
    let los = target_m - observer_m;

    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * los[0] + cos_lon * los[1];
    let north = -sin_lat * cos_lon * los[0] - sin_lat * sin_lon * los[1] + cos_lat * los[2];
    let up = cos_lat * cos_lon * los[0] + cos_lat * sin_lon * los[1] + sin_lat * los[2];

    let azimuth = east.atan2(north);
    let elevation = (up / los.norm()).asin();

    (azimuth, elevation)
}

/// Local east and north unit vectors at provided longitude and latitude.
pub fn east_north_units(lat_rad: f64, lon_rad: f64) -> (Vector3<f64>, Vector3<f64>) {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = Vector3::new(-sin_lon, cos_lon, 0.0);
    let north = Vector3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat);

    (east, north)
}

/// [Receiver] describes the user location, both in WGS-84 ellipsoidal
/// coordinates (as configured) and geocentric cartesian coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Receiver {
    /// Ellipsoidal latitude (decimal degrees)
    pub latitude_deg: f64,

    /// Ellipsoidal longitude (decimal degrees)
    pub longitude_deg: f64,

    /// Height above the ellipsoid (m)
    pub height_m: f64,

    /// Geocentric cartesian coordinates (m)
    pub ecef_m: Vector3<f64>,
}

impl Receiver {
    /// Builds a [Receiver] from WGS-84 ellipsoidal coordinates.
    pub fn from_ellipsoidal_deg_m(lat_deg: f64, lon_deg: f64, height_m: f64) -> Self {
        Self {
            latitude_deg: lat_deg,
            longitude_deg: lon_deg,
            height_m,
            ecef_m: ellipsoidal_to_ecef_m(lat_deg, lon_deg, height_m),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ellipsoid_transformation() {
        // equator, greenwich meridian
        let p = ellipsoidal_to_ecef_m(0.0, 0.0, 0.0);
        assert!((p[0] - WGS84_SEMI_MAJOR_AXIS_M).abs() < 1E-6);
        assert!(p[1].abs() < 1E-6);
        assert!(p[2].abs() < 1E-6);

        // north pole: semi minor axis
        let p = ellipsoidal_to_ecef_m(90.0, 0.0, 0.0);
        let b = WGS84_SEMI_MAJOR_AXIS_M * (1.0 - WGS84_FLATTENING);
        assert!(p[0].abs() < 1E-6);
        assert!((p[2] - b).abs() < 1E-6);
    }

    #[test]
    fn zenith_elevation() {
        let observer = ellipsoidal_to_ecef_m(45.0, 10.0, 0.0);
        let (lat, lon, radius) = ecef_to_spherical(&observer);

        // target straight up in the spherical frame
        let target = observer * ((radius + 20.0E6) / radius);

        let (_, el) = azimuth_elevation_rad(&target, &observer, lat, lon);
        assert!((el - std::f64::consts::FRAC_PI_2).abs() < 1E-9);
    }

    #[test]
    fn northern_target() {
        let observer = ellipsoidal_to_ecef_m(0.0, 0.0, 0.0);
        let (lat, lon, _) = ecef_to_spherical(&observer);

        let target = Vector3::new(observer[0], 0.0, 1_000_000.0);
        let (az, el) = azimuth_elevation_rad(&target, &observer, lat, lon);

        assert!(az.abs() < 1E-9);
        assert!(el.abs() < 1E-2);
    }
}
