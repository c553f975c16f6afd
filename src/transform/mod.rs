//! # Frame transformation engine
//!
//! Converts coordinates between any two [`CoordinateFrame`]s.
//!
//! ## Galactic hub
//!
//! Every frame `F` knows a single rotation to the galactic frame, `v_gal = R_F · v_F`, stored as
//! three Z·Y·Z angles ([`RotationAngles`]). A transformation `A → B` is always the composition
//!
//! ```text
//! v_B = R_Bᵀ · R_A · v_A      (rotate to galactic, then rotate from galactic)
//! ```
//!
//! so each frame needs one rotation path instead of one per pair of frames. Legs touching the
//! galactic frame itself are skipped and equal frames are returned untouched.
//!
//! Where the angles come from:
//!
//! | frame            | source                                                        |
//! |------------------|---------------------------------------------------------------|
//! | ICRF             | constant Hipparcos matrix                                     |
//! | FK4, FK5, ecliptics | [`RotationTables`], interpolated at the frame equinox      |
//! | horizontal       | FK5 table at the observation instant + local sidereal rotation |
//! | galactic         | identity                                                      |
//!
//! A table lookup outside its time span fails with
//! [`AlmagestError::OutOfRange`](crate::almagest_errors::AlmagestError::OutOfRange).
//!
//! ## Origins
//!
//! Rotations do not move the origin. Direction-only coordinates (no distance) may be relabeled to
//! a frame of another origin; positional coordinates must first be translated
//! ([`RectangularCoordinates::translated`], [`FrameTransformer::to_topocentric`]), otherwise the
//! transformation fails with [`AlmagestError::OriginMismatch`].
pub mod table_builder;

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use nalgebra::{Matrix3, Vector3};

use crate::almagest_errors::AlmagestError;
use crate::constants::icrs_to_galactic;
use crate::coordinates::{
    CoordinateFrame, CoordinateFrameOrigin, CoordinateFrameType, GeographicLocation,
    RectangularCoordinates, SphericalCoordinates,
};
use crate::interpolation::EphemerisSeries;
use crate::ref_system::{rotmt, zyz_compose, zyz_decompose, Axis};
use crate::time::Instant;

/// Z·Y·Z rotation angles of a frame → galactic rotation, kept as (cos, sin) pairs.
///
/// `R = R_z(γ) · R_y(β) · R_z(α)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAngles {
    alpha: (f64, f64),
    beta: (f64, f64),
    gamma: (f64, f64),
}

impl RotationAngles {
    /// Number of table columns: cos α, sin α, cos β, sin β, cos γ, sin γ.
    pub const COLUMNS: usize = 6;

    pub fn from_matrix(m: &Matrix3<f64>) -> Self {
        let (a, b, g) = zyz_decompose(m);
        RotationAngles {
            alpha: (a.cos(), a.sin()),
            beta: (b.cos(), b.sin()),
            gamma: (g.cos(), g.sin()),
        }
    }

    /// Read one table row. Each (cos, sin) pair is renormalized, since interpolated pairs drift
    /// slightly off the unit circle.
    pub fn from_values(values: &[f64]) -> Result<Self, AlmagestError> {
        if values.len() != Self::COLUMNS {
            return Err(AlmagestError::InvalidSeries(format!(
                "rotation angles need {} values, got {}",
                Self::COLUMNS,
                values.len()
            )));
        }
        let pair = |c: f64, s: f64| -> Result<(f64, f64), AlmagestError> {
            let norm = c.hypot(s);
            if !(norm > 0.0 && norm.is_finite()) {
                return Err(AlmagestError::InvalidSeries(
                    "degenerate (cos, sin) pair in rotation table".into(),
                ));
            }
            Ok((c / norm, s / norm))
        };
        Ok(RotationAngles {
            alpha: pair(values[0], values[1])?,
            beta: pair(values[2], values[3])?,
            gamma: pair(values[4], values[5])?,
        })
    }

    pub fn to_values(&self) -> [f64; 6] {
        [
            self.alpha.0,
            self.alpha.1,
            self.beta.0,
            self.beta.1,
            self.gamma.0,
            self.gamma.1,
        ]
    }

    /// `R_z(γ) · R_y(β) · R_z(α)`
    pub fn to_galactic(&self) -> Matrix3<f64> {
        zyz_compose(self.alpha, self.beta, self.gamma)
    }

    /// `R_z(−α) · R_y(−β) · R_z(−γ)`
    pub fn from_galactic(&self) -> Matrix3<f64> {
        let neg = |(c, s): (f64, f64)| (c, -s);
        let rz = |(c, s): (f64, f64)| Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0);
        let ry = |(c, s): (f64, f64)| Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c);
        rz(neg(self.alpha)) * ry(neg(self.beta)) * rz(neg(self.gamma))
    }
}

/// Rotation-angle series keyed by frame type, built once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RotationTables {
    tables: HashMap<CoordinateFrameType, EphemerisSeries>,
}

impl RotationTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table of an equinox-dependent frame.
    ///
    /// Arguments
    /// ---------
    /// * `kind`: FK4, FK5, mean ecliptic or true ecliptic.
    /// * `series`: six columns, see [`RotationAngles::COLUMNS`].
    pub fn insert(
        &mut self,
        kind: CoordinateFrameType,
        series: EphemerisSeries,
    ) -> Result<(), AlmagestError> {
        if !kind.is_tabulated() {
            return Err(AlmagestError::InvalidFrame(format!(
                "{kind:?} has no rotation table"
            )));
        }
        if series.width() != RotationAngles::COLUMNS {
            return Err(AlmagestError::InvalidSeries(format!(
                "rotation table for {kind:?} has {} columns, expected {}",
                series.width(),
                RotationAngles::COLUMNS
            )));
        }
        self.tables.insert(kind, series);
        Ok(())
    }

    /// Build from externally loaded series.
    pub fn from_series<I>(series: I) -> Result<Self, AlmagestError>
    where
        I: IntoIterator<Item = (CoordinateFrameType, EphemerisSeries)>,
    {
        let mut tables = Self::new();
        for (kind, s) in series {
            tables.insert(kind, s)?;
        }
        Ok(tables)
    }

    pub fn get(&self, kind: CoordinateFrameType) -> Option<&EphemerisSeries> {
        self.tables.get(&kind)
    }

    /// Interpolated angles of `kind` at `equinox`.
    pub fn angles(
        &self,
        kind: CoordinateFrameType,
        equinox: Instant,
    ) -> Result<RotationAngles, AlmagestError> {
        let series = self
            .tables
            .get(&kind)
            .ok_or(AlmagestError::MissingRotationTable(kind))?;
        RotationAngles::from_values(&series.interpolate(equinox)?)
    }
}

/// Coordinates that can be rotated between frames.
pub trait Transformable: Sized + Clone {
    fn frame(&self) -> &CoordinateFrame;

    /// True when only the direction is known.
    fn is_direction_only(&self) -> bool;

    fn to_vector(&self) -> Vector3<f64>;

    /// Rebuild the same kind of coordinates from a rotated vector.
    fn with_vector(&self, v: Vector3<f64>, frame: CoordinateFrame) -> Self;
}

impl Transformable for SphericalCoordinates {
    fn frame(&self) -> &CoordinateFrame {
        SphericalCoordinates::frame(self)
    }

    fn is_direction_only(&self) -> bool {
        self.distance().is_none()
    }

    fn to_vector(&self) -> Vector3<f64> {
        self.to_rectangular().vector()
    }

    fn with_vector(&self, v: Vector3<f64>, frame: CoordinateFrame) -> Self {
        let rotated = RectangularCoordinates::from_vector(v, frame).to_spherical();
        // a rotation keeps the norm, reuse the exact input distance
        SphericalCoordinates::new(
            rotated.longitude(),
            rotated.latitude(),
            self.distance(),
            frame,
        )
    }
}

impl Transformable for RectangularCoordinates {
    fn frame(&self) -> &CoordinateFrame {
        RectangularCoordinates::frame(self)
    }

    fn is_direction_only(&self) -> bool {
        self.distance().is_none()
    }

    fn to_vector(&self) -> Vector3<f64> {
        self.vector()
    }

    fn with_vector(&self, v: Vector3<f64>, frame: CoordinateFrame) -> Self {
        RectangularCoordinates::from_vector(v, frame)
    }
}

/// Local rotation FK5 of date → horizontal `(north, east, up)`.
///
/// `diag(−1, 1, 1) · R_y(π/2 − φ) · R_z(LMST)` (frame rotations). The reflection turns the
/// south-based axis into a north-based one, so that azimuth runs from north through east.
pub fn horizontal_rotation(instant: Instant, location: &GeographicLocation) -> Matrix3<f64> {
    let lmst = instant.local_mean_sidereal_time(location.longitude());
    let flip = Matrix3::from_diagonal(&Vector3::new(-1.0, 1.0, 1.0));
    flip * rotmt(location.latitude() - FRAC_PI_2, Axis::Y) * rotmt(-lmst, Axis::Z)
}

/// Frame-to-frame transformations backed by a set of [`RotationTables`].
#[derive(Debug, Clone)]
pub struct FrameTransformer {
    tables: RotationTables,
}

impl FrameTransformer {
    pub fn new(tables: RotationTables) -> Self {
        FrameTransformer { tables }
    }

    pub fn tables(&self) -> &RotationTables {
        &self.tables
    }

    fn equinox_of(frame: &CoordinateFrame) -> Result<Instant, AlmagestError> {
        frame.equinox().ok_or_else(|| {
            AlmagestError::InvalidFrame(format!("{:?} frame without equinox", frame.kind()))
        })
    }

    fn topocentric_location(frame: &CoordinateFrame) -> Result<GeographicLocation, AlmagestError> {
        match frame.origin() {
            CoordinateFrameOrigin::Topocentric(location) => Ok(location),
            other => Err(AlmagestError::InvalidFrame(format!(
                "horizontal frame with {other:?} origin"
            ))),
        }
    }

    /// `R_F` with `v_gal = R_F · v_F`. `None` stands for the identity (galactic frame).
    fn to_galactic_matrix(
        &self,
        frame: &CoordinateFrame,
    ) -> Result<Option<Matrix3<f64>>, AlmagestError> {
        let m = match frame.kind() {
            CoordinateFrameType::Galactic => return Ok(None),
            CoordinateFrameType::EquatorialIcrf => icrs_to_galactic(),
            CoordinateFrameType::Horizontal => {
                let instant = Self::equinox_of(frame)?;
                let location = Self::topocentric_location(frame)?;
                let fk5 = self
                    .tables
                    .angles(CoordinateFrameType::EquatorialFk5, instant)?
                    .to_galactic();
                fk5 * horizontal_rotation(instant, &location).transpose()
            }
            kind => self
                .tables
                .angles(kind, Self::equinox_of(frame)?)?
                .to_galactic(),
        };
        Ok(Some(m))
    }

    /// `R_Fᵀ` with `v_F = R_Fᵀ · v_gal`. `None` stands for the identity (galactic frame).
    fn from_galactic_matrix(
        &self,
        frame: &CoordinateFrame,
    ) -> Result<Option<Matrix3<f64>>, AlmagestError> {
        let m = match frame.kind() {
            CoordinateFrameType::Galactic => return Ok(None),
            CoordinateFrameType::EquatorialIcrf => icrs_to_galactic().transpose(),
            CoordinateFrameType::Horizontal => {
                let instant = Self::equinox_of(frame)?;
                let location = Self::topocentric_location(frame)?;
                let fk5 = self
                    .tables
                    .angles(CoordinateFrameType::EquatorialFk5, instant)?
                    .from_galactic();
                horizontal_rotation(instant, &location) * fk5
            }
            kind => self
                .tables
                .angles(kind, Self::equinox_of(frame)?)?
                .from_galactic(),
        };
        Ok(Some(m))
    }

    /// Rotation matrix from `from` to `to`, `v_to = M · v_from`. Origins are ignored.
    pub fn rotation(
        &self,
        from: &CoordinateFrame,
        to: &CoordinateFrame,
    ) -> Result<Matrix3<f64>, AlmagestError> {
        let same_orientation = from.kind() == to.kind()
            && from.equinox() == to.equinox()
            && (from.kind() != CoordinateFrameType::Horizontal || from.origin() == to.origin());
        if same_orientation {
            return Ok(Matrix3::identity());
        }
        let to_hub = self.to_galactic_matrix(from)?;
        let from_hub = self.from_galactic_matrix(to)?;
        Ok(match (to_hub, from_hub) {
            (Some(a), Some(b)) => b * a,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => Matrix3::identity(),
        })
    }

    /// Express `coords` in frame `to`.
    ///
    /// Arguments
    /// ---------
    /// * `coords`: spherical or rectangular coordinates.
    /// * `to`: destination frame.
    ///
    /// Return
    /// ------
    /// * the rotated coordinates, or
    ///   * [`AlmagestError::OriginMismatch`] for positional coordinates whose origin differs
    ///     from the destination origin,
    ///   * [`AlmagestError::OutOfRange`] when an equinox lies outside the rotation tables,
    ///   * [`AlmagestError::MissingRotationTable`] for an unregistered frame type.
    pub fn transform<C: Transformable>(
        &self,
        coords: &C,
        to: &CoordinateFrame,
    ) -> Result<C, AlmagestError> {
        let from = coords.frame();
        if from == to {
            return Ok(coords.clone());
        }
        if from.origin() != to.origin() && !coords.is_direction_only() {
            return Err(AlmagestError::OriginMismatch {
                from: from.origin(),
                to: to.origin(),
            });
        }
        let m = self.rotation(from, to)?;
        Ok(coords.with_vector(m * coords.to_vector(), *to))
    }

    /// Move geocentric coordinates to the observer at `location`, at `instant`.
    ///
    /// The site's geocentric position is computed in the FK5 frame of `instant`, rotated into
    /// the frame of `coords` and subtracted. Direction-only coordinates are only relabeled.
    pub fn to_topocentric(
        &self,
        coords: &RectangularCoordinates,
        location: GeographicLocation,
        instant: Instant,
    ) -> Result<RectangularCoordinates, AlmagestError> {
        let topocentric = CoordinateFrameOrigin::Topocentric(location);
        let frame = coords.frame();
        if frame.origin() != CoordinateFrameOrigin::Geocentric {
            return Err(AlmagestError::OriginMismatch {
                from: frame.origin(),
                to: topocentric,
            });
        }
        if coords.distance().is_none() {
            return coords.translated(&Vector3::zeros(), topocentric);
        }

        let fk5_of_date = CoordinateFrame::fk5(instant, CoordinateFrameOrigin::Geocentric);
        let site = self.rotation(&fk5_of_date, frame)? * location.geocentric_position(instant);
        coords.translated(&-site, topocentric)
    }
}
