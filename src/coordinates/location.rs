//! # Observer location on the Earth
//!
//! [`GeographicLocation`] is an immutable geodetic position (latitude, east-positive longitude,
//! optional elevation above the WGS84 ellipsoid). It feeds the horizontal frame, the
//! topocentric origin and the event solver.
//!
//! The geocentric position of the site follows the classical parallax constants
//! `ρ·cosφ′` and `ρ·sinφ′` (see [`lat_alt_to_parallax`]), rotated by the local mean sidereal time.

use nalgebra::Vector3;

use crate::almagest_errors::AlmagestError;
use crate::constants::{Degree, Radian, EARTH_MAJOR_AXIS, EARTH_MINOR_AXIS, ERAU};
use crate::time::Instant;

/// Geodetic position of an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicLocation {
    latitude: Radian,
    longitude: Radian,
    elevation: Option<f64>,
}

impl GeographicLocation {
    /// Build a location from degrees.
    ///
    /// Arguments
    /// ---------
    /// * `latitude`: geodetic latitude in degrees, within `[-90, 90]`.
    /// * `longitude`: longitude in degrees, **east positive**, within `[-180, 360]`; stored
    ///   wrapped into `(-180, 180]`.
    /// * `elevation`: height above the ellipsoid in meters, if known.
    ///
    /// Return
    /// ------
    /// * the location or [`AlmagestError::InvalidLocation`].
    pub fn new(
        latitude: Degree,
        longitude: Degree,
        elevation: Option<f64>,
    ) -> Result<Self, AlmagestError> {
        Self::from_radians(latitude.to_radians(), longitude.to_radians(), elevation)
    }

    pub fn from_radians(
        latitude: Radian,
        longitude: Radian,
        elevation: Option<f64>,
    ) -> Result<Self, AlmagestError> {
        use std::f64::consts::{FRAC_PI_2, PI, TAU};

        // degree conversion may overshoot the poles by one ulp
        if !(latitude.abs() <= FRAC_PI_2 + 1e-12) {
            return Err(AlmagestError::InvalidLocation(format!(
                "latitude {latitude} rad is outside [-π/2, π/2]"
            )));
        }
        let latitude = latitude.clamp(-FRAC_PI_2, FRAC_PI_2);
        if !(-PI..=TAU).contains(&longitude) {
            return Err(AlmagestError::InvalidLocation(format!(
                "longitude {longitude} rad is outside [-π, 2π]"
            )));
        }
        if let Some(h) = elevation {
            if !h.is_finite() {
                return Err(AlmagestError::InvalidLocation(
                    "elevation must be finite".into(),
                ));
            }
        }

        let longitude = if longitude > PI {
            longitude - TAU
        } else {
            longitude
        };

        Ok(GeographicLocation {
            latitude,
            longitude,
            elevation,
        })
    }

    /// Geodetic latitude in radians.
    pub fn latitude(&self) -> Radian {
        self.latitude
    }

    /// East-positive longitude in radians, in `(-π, π]`.
    pub fn longitude(&self) -> Radian {
        self.longitude
    }

    /// Height above the ellipsoid in meters.
    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    /// `(ρ·cosφ′, ρ·sinφ′)` in Earth equatorial radii. Unknown elevation counts as sea level.
    pub fn parallax_constants(&self) -> (f64, f64) {
        lat_alt_to_parallax(self.latitude, self.elevation.unwrap_or(0.0))
    }

    /// Geocentric position of the site in AU, in the mean equatorial frame of `instant`
    /// (FK5 equinox of date).
    pub fn geocentric_position(&self, instant: Instant) -> Vector3<f64> {
        let (rho_cos_phi, rho_sin_phi) = self.parallax_constants();
        let lmst = instant.local_mean_sidereal_time(self.longitude);

        Vector3::new(
            ERAU * rho_cos_phi * lmst.cos(),
            ERAU * rho_cos_phi * lmst.sin(),
            ERAU * rho_sin_phi,
        )
    }
}

/// Convert geodetic latitude and height to the normalized parallax coordinates
/// `(ρ·cosφ′, ρ·sinφ′)`.
///
/// Arguments
/// ---------
/// * `lat`: geodetic latitude in radians.
/// * `height`: height above the ellipsoid in meters.
///
/// Return
/// ------
/// * `(rho_cos_phi, rho_sin_phi)` in units of the Earth equatorial radius.
///
/// Details
/// -------
/// ```text
/// u = atan( (sin φ * (b/a)) / cos φ )
/// ρ_sinφ = (b/a) * sin u + (h/a) * sin φ
/// ρ_cosφ = cos u + (h/a) * cos φ
/// ```
pub fn lat_alt_to_parallax(lat: Radian, height: f64) -> (f64, f64) {
    let axis_ratio = EARTH_MINOR_AXIS / EARTH_MAJOR_AXIS;

    // parametric latitude
    let u = (lat.sin() * axis_ratio).atan2(lat.cos());

    let rho_sin_phi = axis_ratio * u.sin() + (height / EARTH_MAJOR_AXIS) * lat.sin();
    let rho_cos_phi = u.cos() + (height / EARTH_MAJOR_AXIS) * lat.cos();

    (rho_cos_phi, rho_sin_phi)
}
