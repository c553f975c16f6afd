//! # Ephemeris context
//!
//! [`EphemerisContext`] is the single, explicitly constructed entry point tying together the
//! rotation tables, the solver parameters and the tabulated body ephemerides. It is filled once
//! at startup through [`EphemerisContext::register_body`] and read-only afterwards: every query
//! takes `&self`, so one context can be shared between threads behind an `Arc`.
//!
//! ```rust,no_run
//! use almagest::context::{BodyEphemeris, EphemerisContext};
//! use almagest::coordinates::{CoordinateFrame, CoordinateFrameOrigin, GeographicLocation};
//! use almagest::events::body::BodyKind;
//! use almagest::events::params::EventSolverParams;
//! use almagest::interpolation::table_reader::from_file;
//! use almagest::time::Instant;
//! use almagest::transform::{table_builder::RotationTableBuilder, FrameTransformer};
//! use camino::Utf8Path;
//!
//! let transformer = FrameTransformer::new(RotationTableBuilder::default().build()?);
//! let mut ctx = EphemerisContext::new(transformer, EventSolverParams::default());
//!
//! let sun = from_file(Utf8Path::new("data/sun.tab"))?;
//! let frame = CoordinateFrame::fk5(Instant::J2000, CoordinateFrameOrigin::Geocentric);
//! ctx.register_body(BodyKind::Sun, BodyEphemeris::new(sun, frame)?);
//!
//! let greenwich = GeographicLocation::new(51.4779, 0.0, Some(46.0))?;
//! let solstice = Instant::from_gregorian_utc(2024, 6, 21, 0, 0, 0);
//! let events = ctx.events(BodyKind::Sun, solstice, greenwich)?;
//! for event in &events {
//!     println!("{:?} at {}", event.kind, event.instant);
//! }
//! # Ok::<(), almagest::almagest_errors::AlmagestError>(())
//! ```
//!
//! ## Origins
//!
//! A body ephemeris is either geocentric or heliocentric. Heliocentric bodies are brought to the
//! geocenter with the heliocentric ephemeris of [`Planet::Earth`]; when the Sun itself has no
//! ephemeris, its geocentric position is the opposite of the Earth's heliocentric one. No
//! light-time correction is applied.

use std::collections::HashMap;

use tracing::debug;

use crate::almagest_errors::AlmagestError;
use crate::constants::RADEG;
use crate::coordinates::{
    CoordinateFrame, CoordinateFrameOrigin, CoordinateFrameType, GeographicLocation,
    RectangularCoordinates, SphericalCoordinates,
};
use crate::events::body::{BodyKind, Planet};
use crate::events::params::EventSolverParams;
use crate::events::solver::solve_rise_transit_set;
use crate::events::{EventKind, EventSet};
use crate::interpolation::EphemerisSeries;
use crate::time::Instant;
use crate::transform::FrameTransformer;

const EARTH: BodyKind = BodyKind::Planet(Planet::Earth);

/// Tabulated rectangular position of one body.
#[derive(Debug, Clone)]
pub struct BodyEphemeris {
    series: EphemerisSeries,
    frame: CoordinateFrame,
}

impl BodyEphemeris {
    /// Arguments
    /// ---------
    /// * `series`: three columns `x, y, z` in AU.
    /// * `frame`: frame of the tabulated vectors, geocentric or heliocentric.
    pub fn new(series: EphemerisSeries, frame: CoordinateFrame) -> Result<Self, AlmagestError> {
        if series.width() != 3 {
            return Err(AlmagestError::InvalidSeries(format!(
                "body ephemeris needs 3 columns (x, y, z), got {}",
                series.width()
            )));
        }
        if matches!(frame.origin(), CoordinateFrameOrigin::Topocentric(_))
            || frame.kind() == CoordinateFrameType::Horizontal
        {
            return Err(AlmagestError::InvalidFrame(
                "body ephemerides are geocentric or heliocentric".into(),
            ));
        }
        Ok(BodyEphemeris { series, frame })
    }

    pub fn series(&self) -> &EphemerisSeries {
        &self.series
    }

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn position(&self, at: Instant) -> Result<RectangularCoordinates, AlmagestError> {
        let v = self.series.interpolate(at)?;
        Ok(RectangularCoordinates::new(v[0], v[1], v[2], self.frame))
    }
}

/// Rotation tables, solver parameters and body ephemerides, read-only once set up.
#[derive(Debug, Clone)]
pub struct EphemerisContext {
    transformer: FrameTransformer,
    params: EventSolverParams,
    bodies: HashMap<BodyKind, BodyEphemeris>,
}

impl EphemerisContext {
    pub fn new(transformer: FrameTransformer, params: EventSolverParams) -> Self {
        EphemerisContext {
            transformer,
            params,
            bodies: HashMap::new(),
        }
    }

    pub fn transformer(&self) -> &FrameTransformer {
        &self.transformer
    }

    pub fn params(&self) -> &EventSolverParams {
        &self.params
    }

    /// Register (or replace) the ephemeris of `body`. Returns the replaced ephemeris, if any.
    pub fn register_body(
        &mut self,
        body: BodyKind,
        ephemeris: BodyEphemeris,
    ) -> Option<BodyEphemeris> {
        debug!(
            %body,
            samples = ephemeris.series.len(),
            frame = ?ephemeris.frame.kind(),
            origin = ?ephemeris.frame.origin(),
            "registered body ephemeris"
        );
        self.bodies.insert(body, ephemeris)
    }

    pub fn ephemeris(&self, body: BodyKind) -> Result<&BodyEphemeris, AlmagestError> {
        self.bodies
            .get(&body)
            .ok_or_else(|| AlmagestError::UnknownBody(body.name().into()))
    }

    /// Interpolated position of `body` in its own ephemeris frame.
    pub fn position(
        &self,
        body: BodyKind,
        at: Instant,
    ) -> Result<RectangularCoordinates, AlmagestError> {
        self.ephemeris(body)?.position(at)
    }

    fn earth_heliocentric(&self, at: Instant) -> Result<RectangularCoordinates, AlmagestError> {
        let earth = self.position(EARTH, at)?;
        if earth.frame().origin() != CoordinateFrameOrigin::Heliocentric {
            return Err(AlmagestError::InvalidFrame(
                "the Earth ephemeris must be heliocentric".into(),
            ));
        }
        Ok(earth)
    }

    /// Geocentric position of `body`, in the orientation of its ephemeris frame (of the Earth
    /// ephemeris frame for an untabulated Sun).
    pub fn geocentric_position(
        &self,
        body: BodyKind,
        at: Instant,
    ) -> Result<RectangularCoordinates, AlmagestError> {
        if body == EARTH {
            return Err(AlmagestError::InvalidFrame(
                "the Earth has no geocentric position".into(),
            ));
        }

        match self.bodies.get(&body) {
            Some(ephemeris) => {
                let position = ephemeris.position(at)?;
                match position.frame().origin() {
                    CoordinateFrameOrigin::Geocentric => Ok(position),
                    CoordinateFrameOrigin::Heliocentric => {
                        let earth = self
                            .transformer
                            .transform(&self.earth_heliocentric(at)?, position.frame())?;
                        position.translated(&-earth.vector(), CoordinateFrameOrigin::Geocentric)
                    }
                    origin => Err(AlmagestError::OriginMismatch {
                        from: origin,
                        to: CoordinateFrameOrigin::Geocentric,
                    }),
                }
            }
            None if body == BodyKind::Sun => {
                let earth = self.earth_heliocentric(at)?;
                Ok(RectangularCoordinates::from_vector(
                    -earth.vector(),
                    earth.frame().with_origin(CoordinateFrameOrigin::Geocentric)?,
                ))
            }
            None => Err(AlmagestError::UnknownBody(body.name().into())),
        }
    }

    /// Position of `body` at `at`, expressed in `frame`.
    ///
    /// Geocentric and topocentric destinations go through [`Self::geocentric_position`]; a
    /// topocentric one additionally removes the observer's geocentric position. Any other
    /// destination origin must match the origin of the body ephemeris.
    ///
    /// Return
    /// ------
    /// * the rotated coordinates, or
    ///   * [`AlmagestError::UnknownBody`] when the body (or the Earth, when needed) has no
    ///     ephemeris,
    ///   * [`AlmagestError::OriginMismatch`] for an unreachable destination origin,
    ///   * [`AlmagestError::OutOfRange`] from the ephemeris or rotation tables.
    pub fn position_in(
        &self,
        body: BodyKind,
        at: Instant,
        frame: &CoordinateFrame,
    ) -> Result<RectangularCoordinates, AlmagestError> {
        let source = match frame.origin() {
            CoordinateFrameOrigin::Geocentric => self.geocentric_position(body, at)?,
            CoordinateFrameOrigin::Topocentric(location) => {
                let geocentric = self.geocentric_position(body, at)?;
                self.transformer.to_topocentric(&geocentric, location, at)?
            }
            origin => {
                let position = self.position(body, at)?;
                if position.frame().origin() != origin {
                    return Err(AlmagestError::OriginMismatch {
                        from: position.frame().origin(),
                        to: origin,
                    });
                }
                position
            }
        };
        self.transformer.transform(&source, frame)
    }

    /// Rise, culminations, set and (for the Sun) twilight of `body` on the UT day of `date`.
    ///
    /// The standard altitude comes from the body policy, evaluated at 0h UT; the policy then
    /// filters the solved events. Twilight boundaries are solved at the civil, nautical and
    /// astronomical depressions of [`EventSolverParams`], with rising relabeled as dawn and
    /// setting as dusk.
    ///
    /// Return
    /// ------
    /// * the events of the day, sorted, deduplicated and tagged with `body`.
    ///
    /// See also
    /// --------
    /// * [`solve_rise_transit_set`] – the per-threshold solver.
    pub fn events(
        &self,
        body: BodyKind,
        date: Instant,
        location: GeographicLocation,
    ) -> Result<EventSet, AlmagestError> {
        let date = date.start_of_day();
        let policy = body.policy();
        let position = |at: Instant| -> Result<SphericalCoordinates, AlmagestError> {
            Ok(self.geocentric_position(body, at)?.to_spherical())
        };

        let h0 = (policy.standard_altitude)(&position(date)?, &self.params);
        let mut events = solve_rise_transit_set(
            &self.transformer,
            &position,
            date,
            location,
            -h0,
            &self.params,
        )?;

        if policy.twilight {
            let thresholds = [
                (
                    self.params.civil_depression_deg,
                    EventKind::CivilDawn,
                    EventKind::CivilDusk,
                ),
                (
                    self.params.nautical_depression_deg,
                    EventKind::NauticalDawn,
                    EventKind::NauticalDusk,
                ),
                (
                    self.params.astronomical_depression_deg,
                    EventKind::AstronomicalDawn,
                    EventKind::AstronomicalDusk,
                ),
            ];
            for (depression, dawn, dusk) in thresholds {
                let mut twilight = solve_rise_transit_set(
                    &self.transformer,
                    &position,
                    date,
                    location,
                    depression * RADEG,
                    &self.params,
                )?;
                twilight.remove_kind(EventKind::UpperCulmination);
                twilight.remove_kind(EventKind::LowerCulmination);
                twilight.relabel(EventKind::Rising, dawn);
                twilight.relabel(EventKind::Setting, dusk);
                events.extend(twilight);
            }
        }

        (policy.post_process)(&mut events);
        events.set_bodies(&[body]);
        events.dedup_near();
        events.sort_by_instant();

        debug!(%body, date = %date, events = events.len(), "computed body events");
        Ok(events)
    }
}

#[cfg(test)]
mod context_test {
    use super::*;
    use crate::constants::DPI;
    use crate::transform::table_builder::RotationTableBuilder;
    use approx::assert_abs_diff_eq;

    const JD0: f64 = 2_451_544.5;

    fn transformer() -> FrameTransformer {
        FrameTransformer::new(
            RotationTableBuilder::new()
                .start(Instant::from_julian_day(JD0 - 60.0))
                .end(Instant::from_julian_day(JD0 + 60.0))
                .step_days(5.0)
                .build()
                .unwrap(),
        )
    }

    /// Circular orbit in the equatorial plane, one column per coordinate.
    fn circular(radius: f64, period: f64, phase: f64) -> EphemerisSeries {
        EphemerisSeries::from_rows((-30..=30).map(|d| {
            let jd = JD0 + d as f64;
            let theta = phase + DPI * (jd - JD0) / period;
            (jd, [radius * theta.cos(), radius * theta.sin(), 0.0])
        }))
        .unwrap()
    }

    fn context() -> EphemerisContext {
        let helio = CoordinateFrame::icrf(CoordinateFrameOrigin::Heliocentric);
        let mut ctx = EphemerisContext::new(transformer(), EventSolverParams::default());
        ctx.register_body(
            EARTH,
            BodyEphemeris::new(circular(1.0, 365.25, 1.76), helio).unwrap(),
        );
        ctx.register_body(
            BodyKind::Planet(Planet::Mars),
            BodyEphemeris::new(circular(1.52, 687.0, 0.3), helio).unwrap(),
        );
        ctx
    }

    #[test]
    fn test_ephemeris_validation() {
        let frame = CoordinateFrame::icrf(CoordinateFrameOrigin::Heliocentric);
        let two_columns = EphemerisSeries::from_rows([(JD0, [1.0, 2.0])]).unwrap();
        assert!(BodyEphemeris::new(two_columns, frame).is_err());

        let site = GeographicLocation::new(10.0, 10.0, None).unwrap();
        assert!(BodyEphemeris::new(
            circular(1.0, 365.25, 0.0),
            CoordinateFrame::horizontal(Instant::J2000, site)
        )
        .is_err());
    }

    #[test]
    fn test_unknown_body() {
        let ctx = context();
        assert_eq!(
            ctx.position(BodyKind::Moon, Instant::from_julian_day(JD0))
                .unwrap_err(),
            AlmagestError::UnknownBody("Moon".into())
        );
        assert!(ctx
            .geocentric_position(EARTH, Instant::from_julian_day(JD0))
            .is_err());
    }

    #[test]
    fn test_geocentric_translation() {
        let ctx = context();
        let at = Instant::from_julian_day(JD0 + 0.3);
        let mars = ctx.position(BodyKind::Planet(Planet::Mars), at).unwrap();
        let earth = ctx.position(EARTH, at).unwrap();
        let geo = ctx
            .geocentric_position(BodyKind::Planet(Planet::Mars), at)
            .unwrap();
        assert_abs_diff_eq!(geo.vector(), mars.vector() - earth.vector(), epsilon = 1e-15);
        assert_eq!(geo.frame().origin(), CoordinateFrameOrigin::Geocentric);

        // untabulated Sun: opposite of the Earth
        let sun = ctx.geocentric_position(BodyKind::Sun, at).unwrap();
        assert_abs_diff_eq!(sun.vector(), -earth.vector(), epsilon = 1e-15);
    }

    #[test]
    fn test_position_in_frames() {
        let ctx = context();
        let at = Instant::from_julian_day(JD0);
        let mars = BodyKind::Planet(Planet::Mars);

        let helio_fk5 = CoordinateFrame::fk5(at, CoordinateFrameOrigin::Heliocentric);
        let rotated = ctx.position_in(mars, at, &helio_fk5).unwrap();
        let native = ctx.position(mars, at).unwrap();
        assert_abs_diff_eq!(
            rotated.vector().norm(),
            native.vector().norm(),
            epsilon = 1e-12
        );

        let site = GeographicLocation::new(45.0, 5.0, Some(200.0)).unwrap();
        let horizontal = CoordinateFrame::horizontal(at, site);
        let local = ctx.position_in(mars, at, &horizontal).unwrap();
        assert_eq!(local.frame(), &horizontal);

        let geocentric = ctx
            .position_in(mars, at, &CoordinateFrame::fk5(at, CoordinateFrameOrigin::Geocentric))
            .unwrap();
        let parallax = local.vector().norm() - geocentric.vector().norm();
        assert!(parallax.abs() < 1e-4);
    }

    #[test]
    fn test_origin_mismatch() {
        let mut ctx = context();
        let geo_frame = CoordinateFrame::icrf(CoordinateFrameOrigin::Geocentric);
        ctx.register_body(
            BodyKind::Moon,
            BodyEphemeris::new(circular(0.00257, 27.3, 0.0), geo_frame).unwrap(),
        );
        let at = Instant::from_julian_day(JD0);
        assert_eq!(
            ctx.position_in(
                BodyKind::Moon,
                at,
                &CoordinateFrame::icrf(CoordinateFrameOrigin::Heliocentric)
            ),
            Err(AlmagestError::OriginMismatch {
                from: CoordinateFrameOrigin::Geocentric,
                to: CoordinateFrameOrigin::Heliocentric,
            })
        );
    }

    #[test]
    fn test_sun_events_have_twilight() {
        let ctx = context();
        let site = GeographicLocation::new(40.0, 0.0, None).unwrap();
        let events = ctx
            .events(BodyKind::Sun, Instant::from_julian_day(JD0 + 0.7), site)
            .unwrap();

        for kind in [
            EventKind::Rising,
            EventKind::UpperCulmination,
            EventKind::Setting,
            EventKind::CivilDawn,
            EventKind::NauticalDusk,
            EventKind::AstronomicalDawn,
        ] {
            assert!(events.first(kind).is_some(), "missing {kind:?}");
        }
        assert!(events.iter().all(|e| e.bodies.as_slice() == [BodyKind::Sun]));

        let sorted = events
            .iter()
            .zip(events.iter().skip(1))
            .all(|(a, b)| a.instant <= b.instant);
        assert!(sorted);

        let dawn = events.first(EventKind::CivilDawn).unwrap().instant;
        let rise = events.rising().unwrap();
        assert!(dawn < rise);
    }

    #[test]
    fn test_planet_events_drop_lower_culmination() {
        let ctx = context();
        let site = GeographicLocation::new(40.0, 0.0, None).unwrap();
        let events = ctx
            .events(
                BodyKind::Planet(Planet::Mars),
                Instant::from_julian_day(JD0),
                site,
            )
            .unwrap();
        assert!(events.transit().is_some());
        assert!(events.antitransit().is_none());
        assert_eq!(events.of_kind(EventKind::CivilDawn).count(), 0);
    }
}
