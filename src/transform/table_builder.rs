//! # Rotation-table generation
//!
//! Samples the analytic frame model of [`crate::ref_system`] into the six-column
//! rotation-angle series consumed by [`RotationTables`].
//!
//! Two extra samples are added on each side of `[start, end]` so that the whole requested span
//! is inside the 5-point interpolation window.
//!
//! ```rust,no_run
//! use almagest::time::Instant;
//! use almagest::transform::table_builder::RotationTableBuilder;
//!
//! let tables = RotationTableBuilder::default()
//!     .start(Instant::from_gregorian_utc(1990, 1, 1, 0, 0, 0))
//!     .end(Instant::from_gregorian_utc(2030, 1, 1, 0, 0, 0))
//!     .step_days(5.0)
//!     .build()?;
//! # Ok::<(), almagest::almagest_errors::AlmagestError>(())
//! ```

use tracing::debug;

use super::{RotationAngles, RotationTables};
use crate::almagest_errors::AlmagestError;
use crate::coordinates::CoordinateFrameType;
use crate::interpolation::{EphemerisSample, EphemerisSeries};
use crate::ref_system::frame_to_galactic;
use crate::time::Instant;

/// Number of padding samples on each side of the requested span.
const PADDING: usize = 2;

/// Builder of model-generated [`RotationTables`].
#[derive(Debug, Clone)]
pub struct RotationTableBuilder {
    start: Instant,
    end: Instant,
    step_days: f64,
    frames: Vec<CoordinateFrameType>,
}

impl Default for RotationTableBuilder {
    /// 1949-12-31 (just before B1950.0) to 2050-01-01, every 2 days, for FK4, FK5 and both
    /// ecliptics.
    fn default() -> Self {
        RotationTableBuilder {
            start: Instant::from_julian_day(2_433_281.5),
            end: Instant::from_julian_day(2_469_807.5),
            step_days: 2.0,
            frames: vec![
                CoordinateFrameType::EquatorialFk4,
                CoordinateFrameType::EquatorialFk5,
                CoordinateFrameType::MeanEcliptic,
                CoordinateFrameType::TrueEcliptic,
            ],
        }
    }
}

impl RotationTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self, start: Instant) -> Self {
        self.start = start;
        self
    }

    pub fn end(mut self, end: Instant) -> Self {
        self.end = end;
        self
    }

    pub fn step_days(mut self, step_days: f64) -> Self {
        self.step_days = step_days;
        self
    }

    /// Restrict the generated tables to `frames`.
    pub fn frames(mut self, frames: &[CoordinateFrameType]) -> Self {
        self.frames = frames.to_vec();
        self
    }

    /// Sample the model of one frame type.
    ///
    /// Return
    /// ------
    /// * a six-column series covering `[start, end]` plus the padding samples.
    pub fn build_series(
        &self,
        kind: CoordinateFrameType,
    ) -> Result<EphemerisSeries, AlmagestError> {
        self.validate()?;
        let span = self.end.days_since(&self.start);
        let steps = (span / self.step_days).ceil() as usize;
        let first = self.start.add_days(-(PADDING as f64) * self.step_days);

        let samples = (0..=steps + 2 * PADDING)
            .map(|i| {
                let at = first.add_days(i as f64 * self.step_days);
                let m = frame_to_galactic(kind, at).ok_or_else(|| {
                    AlmagestError::InvalidFrame(format!("{kind:?} has no rotation model"))
                })?;
                Ok(EphemerisSample::new(
                    at,
                    &RotationAngles::from_matrix(&m).to_values(),
                ))
            })
            .collect::<Result<Vec<_>, AlmagestError>>()?;

        EphemerisSeries::new(samples)
    }

    /// Generate the tables of every configured frame type.
    pub fn build(&self) -> Result<RotationTables, AlmagestError> {
        let mut tables = RotationTables::new();
        for &kind in &self.frames {
            let series = self.build_series(kind)?;
            debug!(
                frame = ?kind,
                samples = series.len(),
                step_days = self.step_days,
                "generated rotation table"
            );
            tables.insert(kind, series)?;
        }
        Ok(tables)
    }

    fn validate(&self) -> Result<(), AlmagestError> {
        if !(self.step_days > 0.0 && self.step_days.is_finite()) {
            return Err(AlmagestError::InvalidSeries(
                "rotation table step must be a positive number of days".into(),
            ));
        }
        if !(self.end.julian_day() > self.start.julian_day()) {
            return Err(AlmagestError::InvalidSeries(
                "rotation table end must be after its start".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod table_builder_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_span_is_interpolable() {
        let start = Instant::from_julian_day(2_451_000.5);
        let end = Instant::from_julian_day(2_451_100.5);
        let series = RotationTableBuilder::new()
            .start(start)
            .end(end)
            .step_days(7.0)
            .build_series(CoordinateFrameType::EquatorialFk5)
            .unwrap();

        let (first, last) = series.valid_range().unwrap();
        assert!(first <= start);
        assert!(last >= end);
        assert_eq!(series.width(), RotationAngles::COLUMNS);
    }

    #[test]
    fn test_interpolated_angles_match_model() {
        let tables = RotationTableBuilder::new()
            .start(Instant::from_julian_day(2_451_000.5))
            .end(Instant::from_julian_day(2_452_000.5))
            .build()
            .unwrap();

        let at = Instant::from_julian_day(2_451_234.567);
        for kind in [
            CoordinateFrameType::EquatorialFk4,
            CoordinateFrameType::EquatorialFk5,
            CoordinateFrameType::MeanEcliptic,
            CoordinateFrameType::TrueEcliptic,
        ] {
            let model = frame_to_galactic(kind, at).unwrap();
            let table = tables.angles(kind, at).unwrap().to_galactic();
            // the fortnightly nutation term is sampled at only ~7 points per period
            let epsilon = if kind == CoordinateFrameType::TrueEcliptic {
                1e-7
            } else {
                1e-12
            };
            assert_abs_diff_eq!(table, model, epsilon = epsilon);
        }
    }

    #[test]
    fn test_default_span_covers_b1950() {
        let builder = RotationTableBuilder::default();
        assert!(builder.start <= Instant::B1950);
        assert!(builder.end.julian_day() >= 2_469_807.5);
    }

    #[test]
    fn test_builder_validation() {
        assert!(RotationTableBuilder::new().step_days(0.0).build().is_err());
        assert!(RotationTableBuilder::new()
            .start(Instant::J2000)
            .end(Instant::B1950)
            .build()
            .is_err());
        assert!(RotationTableBuilder::new()
            .frames(&[CoordinateFrameType::Galactic])
            .start(Instant::J2000)
            .end(Instant::J2000.add_days(30.0))
            .build()
            .is_err());
    }
}
