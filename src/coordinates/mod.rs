//! # Coordinates and reference frames
//!
//! Value types describing *where* something is and *in which frame*:
//!
//! * [`CoordinateFrameType`] – the supported frame families (ICRF, FK4, FK5, mean/true ecliptic,
//!   galactic, horizontal),
//! * [`CoordinateFrameOrigin`] – geocentric, heliocentric or topocentric,
//! * [`CoordinateFrame`] – type + equinox + origin, validated on construction,
//! * [`SphericalCoordinates`] / [`RectangularCoordinates`] – the two representations of a
//!   position, convertible into one another.
//!
//! ## Conventions
//!
//! * Angles are radians; longitudes are normalized to `[0, 2π)`, latitudes lie in `[-π/2, π/2]`.
//! * Distances are AU. A missing distance means a **direction only**: conversion to
//!   rectangular form then yields a unit vector.
//! * A rectangular position closer to its origin than 1.1 m has no usable distance
//!   ([`RectangularCoordinates::distance`] returns `None`).
//! * In the horizontal frame the longitude is the azimuth, counted from north through east,
//!   and the latitude is the altitude.
//!
//! Equinox rules: the equinox is **required** for FK4, FK5, the ecliptic frames and the
//! horizontal frame (for which it is the instant of observation), and **absent** for ICRF and
//! galactic. The horizontal frame is always topocentric.
pub mod location;

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::Vector3;

pub use location::GeographicLocation;

use crate::{
    almagest_errors::AlmagestError,
    constants::{AstronomicalUnit, Degree, Radian, ORIGIN_GUARD_DISTANCE},
    time::Instant,
};

/// Family of a reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateFrameType {
    EquatorialIcrf,
    EquatorialFk4,
    EquatorialFk5,
    MeanEcliptic,
    TrueEcliptic,
    Galactic,
    Horizontal,
}

impl CoordinateFrameType {
    pub fn requires_equinox(&self) -> bool {
        !matches!(
            self,
            CoordinateFrameType::EquatorialIcrf | CoordinateFrameType::Galactic
        )
    }

    /// Frames whose orientation is read from a rotation-angle table.
    pub fn is_tabulated(&self) -> bool {
        matches!(
            self,
            CoordinateFrameType::EquatorialFk4
                | CoordinateFrameType::EquatorialFk5
                | CoordinateFrameType::MeanEcliptic
                | CoordinateFrameType::TrueEcliptic
        )
    }
}

/// Where the frame is centered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateFrameOrigin {
    Geocentric,
    Heliocentric,
    Topocentric(GeographicLocation),
}

/// A reference frame: family, equinox (when the family has one) and origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    kind: CoordinateFrameType,
    equinox: Option<Instant>,
    origin: CoordinateFrameOrigin,
}

impl CoordinateFrame {
    /// Validating constructor.
    ///
    /// Arguments
    /// ---------
    /// * `kind`: frame family.
    /// * `equinox`: required exactly when [`CoordinateFrameType::requires_equinox`] holds.
    /// * `origin`: must be topocentric for the horizontal family.
    ///
    /// Return
    /// ------
    /// * the frame, or [`AlmagestError::InvalidFrame`].
    pub fn new(
        kind: CoordinateFrameType,
        equinox: Option<Instant>,
        origin: CoordinateFrameOrigin,
    ) -> Result<Self, AlmagestError> {
        match (kind.requires_equinox(), equinox) {
            (true, None) => {
                return Err(AlmagestError::InvalidFrame(format!(
                    "{kind:?} requires an equinox"
                )))
            }
            (false, Some(_)) => {
                return Err(AlmagestError::InvalidFrame(format!(
                    "{kind:?} does not take an equinox"
                )))
            }
            _ => {}
        }
        if let Some(e) = equinox {
            if !e.julian_day().is_finite() {
                return Err(AlmagestError::InvalidFrame("equinox must be finite".into()));
            }
        }
        let topocentric = matches!(origin, CoordinateFrameOrigin::Topocentric(_));
        if kind == CoordinateFrameType::Horizontal && !topocentric {
            return Err(AlmagestError::InvalidFrame(
                "horizontal frames are topocentric".into(),
            ));
        }
        Ok(CoordinateFrame {
            kind,
            equinox,
            origin,
        })
    }

    pub fn icrf(origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::EquatorialIcrf,
            equinox: None,
            origin,
        }
    }

    pub fn galactic(origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::Galactic,
            equinox: None,
            origin,
        }
    }

    pub fn fk4(equinox: Instant, origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::EquatorialFk4,
            equinox: Some(equinox),
            origin,
        }
    }

    pub fn fk5(equinox: Instant, origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::EquatorialFk5,
            equinox: Some(equinox),
            origin,
        }
    }

    pub fn mean_ecliptic(equinox: Instant, origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::MeanEcliptic,
            equinox: Some(equinox),
            origin,
        }
    }

    pub fn true_ecliptic(equinox: Instant, origin: CoordinateFrameOrigin) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::TrueEcliptic,
            equinox: Some(equinox),
            origin,
        }
    }

    /// Horizontal frame of an observer at a given instant.
    pub fn horizontal(instant: Instant, location: GeographicLocation) -> Self {
        CoordinateFrame {
            kind: CoordinateFrameType::Horizontal,
            equinox: Some(instant),
            origin: CoordinateFrameOrigin::Topocentric(location),
        }
    }

    pub fn kind(&self) -> CoordinateFrameType {
        self.kind
    }

    pub fn equinox(&self) -> Option<Instant> {
        self.equinox
    }

    pub fn origin(&self) -> CoordinateFrameOrigin {
        self.origin
    }

    /// Same orientation, other origin.
    pub fn with_origin(&self, origin: CoordinateFrameOrigin) -> Result<Self, AlmagestError> {
        Self::new(self.kind, self.equinox, origin)
    }
}

/// Longitude/latitude/distance in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoordinates {
    longitude: Radian,
    latitude: Radian,
    distance: Option<AstronomicalUnit>,
    frame: CoordinateFrame,
}

impl SphericalCoordinates {
    /// Longitude is wrapped into `[0, 2π)` and latitude clamped to `[-π/2, π/2]`.
    /// A non-positive or non-finite distance is treated as unknown.
    pub fn new(
        longitude: Radian,
        latitude: Radian,
        distance: Option<AstronomicalUnit>,
        frame: CoordinateFrame,
    ) -> Self {
        let longitude = longitude.rem_euclid(TAU);
        // rem_euclid may round up to exactly 2π for tiny negative inputs
        let longitude = if longitude >= TAU { 0.0 } else { longitude };
        SphericalCoordinates {
            longitude,
            latitude: latitude.clamp(-FRAC_PI_2, FRAC_PI_2),
            distance: distance.filter(|d| d.is_finite() && *d > 0.0),
            frame,
        }
    }

    pub fn from_degrees(
        longitude: Degree,
        latitude: Degree,
        distance: Option<AstronomicalUnit>,
        frame: CoordinateFrame,
    ) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), distance, frame)
    }

    pub fn longitude(&self) -> Radian {
        self.longitude
    }

    pub fn latitude(&self) -> Radian {
        self.latitude
    }

    pub fn distance(&self) -> Option<AstronomicalUnit> {
        self.distance
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    /// Unit vector pointing at the coordinates.
    pub fn direction(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_lon, cos_lon) = self.longitude.sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// `x = cosβ·cosλ·d, y = cosβ·sinλ·d, z = sinβ·d`, with `d = 1` when the distance is unknown.
    pub fn to_rectangular(&self) -> RectangularCoordinates {
        let v = self.direction() * self.distance.unwrap_or(1.0);
        RectangularCoordinates::from_vector(v, self.frame)
    }

    /// Great-circle distance to `other`, both read as directions in the same frame.
    pub fn angular_separation(&self, other: &SphericalCoordinates) -> Radian {
        let a = self.direction();
        let b = other.direction();
        a.cross(&b).norm().atan2(a.dot(&b))
    }

    /// Position angle of `other` seen from `self`, in `[0, 2π)`, counted from north through
    /// east.
    ///
    /// The angle is the bearing of the great-circle arc joining both points, measured at the
    /// midpoint of the arc. Swapping the two points therefore changes the result by exactly π.
    /// Undefined (returns 0) for identical points.
    pub fn position_angle(&self, other: &SphericalCoordinates) -> Radian {
        let a = self.direction();
        let b = other.direction();

        let sum = a + b;
        let mid = if sum.norm() > 1e-12 { sum.normalize() } else { a };
        let (sin_dec, cos_dec) = mid.z.clamp(-1.0, 1.0).asin().sin_cos();
        let (sin_ra, cos_ra) = mid.y.atan2(mid.x).sin_cos();

        let north = Vector3::new(-sin_dec * cos_ra, -sin_dec * sin_ra, cos_dec);
        let east = Vector3::new(-sin_ra, cos_ra, 0.0);

        let chord = b - a;
        chord.dot(&east).atan2(chord.dot(&north)).rem_euclid(TAU)
    }
}

/// Cartesian position in a frame, in AU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangularCoordinates {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    frame: CoordinateFrame,
}

impl RectangularCoordinates {
    pub fn new(x: f64, y: f64, z: f64, frame: CoordinateFrame) -> Self {
        RectangularCoordinates { x, y, z, frame }
    }

    pub fn from_vector(v: Vector3<f64>, frame: CoordinateFrame) -> Self {
        Self::new(v.x, v.y, v.z, frame)
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    /// Norm of the vector, or `None` below the 1.1 m origin guard.
    pub fn distance(&self) -> Option<AstronomicalUnit> {
        let d = self.vector().norm();
        (d >= ORIGIN_GUARD_DISTANCE).then_some(d)
    }

    pub fn to_spherical(&self) -> SphericalCoordinates {
        let longitude = self.y.atan2(self.x);
        let latitude = self.z.atan2(self.x.hypot(self.y));
        SphericalCoordinates::new(longitude, latitude, self.distance(), self.frame)
    }

    /// Add `offset` (AU, same orientation) and relabel the origin.
    ///
    /// `offset` is the position of the old origin as seen from the new one.
    pub fn translated(
        &self,
        offset: &Vector3<f64>,
        origin: CoordinateFrameOrigin,
    ) -> Result<Self, AlmagestError> {
        Ok(Self::from_vector(
            self.vector() + offset,
            self.frame.with_origin(origin)?,
        ))
    }
}

impl From<SphericalCoordinates> for RectangularCoordinates {
    fn from(value: SphericalCoordinates) -> Self {
        value.to_rectangular()
    }
}

impl From<RectangularCoordinates> for SphericalCoordinates {
    fn from(value: RectangularCoordinates) -> Self {
        value.to_spherical()
    }
}
