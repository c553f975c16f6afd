//! # Rise, transit and set solver
//!
//! ## Base pass
//!
//! For a civil day starting at 0h UT (`Θ₀` = Greenwich mean sidereal time at 0h UT), a body at
//! equatorial coordinates `(α, δ)` of date, an observer at latitude `φ` and east longitude
//! `λ`, and a signed standard altitude `h₀`:
//!
//! ```text
//! m₀    = ((α − λ − Θ₀) mod 2π) / (2π·s)            transit
//! cosH₀ = (sin h₀ − sin φ·sin δ) / (cos φ·cos δ)
//! m₁    = m₀ − H₀ / (2π·s)                            rising
//! m₂    = m₀ + H₀ / (2π·s)                            setting
//! m₃    = m₀ + 0.5 / s                                antitransit
//! ```
//!
//! with `s = 1.00273790935` the sidereal rate. Every fraction is wrapped into one sidereal day.
//! When `|cosH₀| > 1` the body never crosses `h₀` on that date: rising and setting are absent,
//! the culminations are still reported.
//!
//! ## Refinement
//!
//! The base pass uses the position of the body at a single instant. Each event is refined
//! independently: the body position is recomputed at the current candidate, the base pass is
//! rerun, and the branch of the same event kind nearest to the candidate becomes the next
//! candidate. Iteration stops when successive candidates agree within
//! [`EventSolverParams::convergence_seconds`], and fails with
//! [`AlmagestError::ConvergenceFailure`] after [`EventSolverParams::max_iterations`].
//!
//! A sidereal day is shorter than a civil day, so one event kind may occur twice in a civil
//! day, or be pushed just across midnight by the body's own motion. Each kind is therefore seeded
//! at its base fraction and at the fractions one sidereal day earlier and later when those lie
//! within [`EventSolverParams::day_margin`] of the day. Converged instants outside `[0h, 24h)`
//! are discarded and near-duplicates merged.

use std::f64::consts::PI;

use tracing::{debug, trace, warn};

use super::params::EventSolverParams;
use super::{AstronomicalEvent, EventKind, EventSet};
use crate::almagest_errors::AlmagestError;
use crate::constants::{Radian, DPI, SECONDS_PER_DAY, SIDEREAL_RATE};
use crate::coordinates::{CoordinateFrame, GeographicLocation, SphericalCoordinates};
use crate::time::Instant;
use crate::transform::FrameTransformer;

/// Length of a sidereal day in civil days.
const SIDEREAL_DAY: f64 = 1.0 / SIDEREAL_RATE;

/// The four event kinds produced by one solver run.
const SOLVED_KINDS: [EventKind; 4] = [
    EventKind::Rising,
    EventKind::UpperCulmination,
    EventKind::Setting,
    EventKind::LowerCulmination,
];

/// Day fractions of one base pass, relative to 0h UT of the solved date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayFractions {
    pub transit: f64,
    pub antitransit: f64,
    /// `None` when the body does not cross the altitude threshold.
    pub rising: Option<f64>,
    pub setting: Option<f64>,
}

impl DayFractions {
    pub fn get(&self, kind: EventKind) -> Option<f64> {
        match kind {
            EventKind::Rising => self.rising,
            EventKind::UpperCulmination => Some(self.transit),
            EventKind::Setting => self.setting,
            EventKind::LowerCulmination => Some(self.antitransit),
            _ => None,
        }
    }
}

/// Solver state for one body, one observer and one civil day.
pub struct MeridianSolver<'a, F>
where
    F: Fn(Instant) -> Result<SphericalCoordinates, AlmagestError>,
{
    transformer: &'a FrameTransformer,
    position: F,
    date: Instant,
    location: GeographicLocation,
    altitude: Radian,
    params: &'a EventSolverParams,
}

impl<'a, F> MeridianSolver<'a, F>
where
    F: Fn(Instant) -> Result<SphericalCoordinates, AlmagestError>,
{
    /// Arguments
    /// ---------
    /// * `transformer`: used to bring positions to the equatorial frame of date.
    /// * `position`: body position at an arbitrary instant, any frame.
    /// * `date`: any instant of the civil day to solve; 0h UT of that day is the anchor.
    /// * `location`: the observer.
    /// * `angle_below_horizon`: positive when the threshold is below the horizon.
    /// * `params`: iteration cap, convergence threshold and seed margin.
    pub fn new(
        transformer: &'a FrameTransformer,
        position: F,
        date: Instant,
        location: GeographicLocation,
        angle_below_horizon: Radian,
        params: &'a EventSolverParams,
    ) -> Self {
        MeridianSolver {
            transformer,
            position,
            date: date.start_of_day(),
            location,
            altitude: -angle_below_horizon,
            params,
        }
    }

    /// 0h UT of the solved day.
    pub fn date(&self) -> Instant {
        self.date
    }

    /// Body position in the mean equatorial frame of `at`, same origin as the source.
    pub fn equatorial_position(&self, at: Instant) -> Result<SphericalCoordinates, AlmagestError> {
        let coords = (self.position)(at)?;
        let frame = CoordinateFrame::fk5(at, coords.frame().origin());
        self.transformer.transform(&coords, &frame)
    }

    /// Single base pass with the body position taken at `at`.
    pub fn base(&self, at: Instant) -> Result<DayFractions, AlmagestError> {
        let equatorial = self.equatorial_position(at)?;
        let ra = equatorial.longitude();
        let dec = equatorial.latitude();

        let theta0 = self.date.greenwich_mean_sidereal_time();
        let lon = self.location.longitude();
        let lat = self.location.latitude();

        let transit = (ra - lon - theta0).rem_euclid(DPI) / (DPI * SIDEREAL_RATE);

        let mut antitransit = transit + 0.5 * SIDEREAL_DAY;
        if antitransit >= 1.0 {
            antitransit -= SIDEREAL_DAY;
        }

        let cos_h0 = (self.altitude.sin() - lat.sin() * dec.sin()) / (lat.cos() * dec.cos());
        let (rising, setting) = if cos_h0.abs() <= 1.0 {
            let h0 = cos_h0.acos() / (DPI * SIDEREAL_RATE);
            (
                Some((transit - h0).rem_euclid(SIDEREAL_DAY)),
                Some((transit + h0).rem_euclid(SIDEREAL_DAY)),
            )
        } else {
            (None, None)
        };

        Ok(DayFractions {
            transit,
            antitransit,
            rising,
            setting,
        })
    }

    /// Refine one event from a seed fraction of the day.
    ///
    /// Return
    /// ------
    /// * `Some(fraction)` of the converged event (may fall outside `[0, 1)`),
    /// * `None` when the event disappears during refinement (threshold no longer crossed),
    /// * [`AlmagestError::ConvergenceFailure`] past the iteration cap.
    pub fn refine(&self, kind: EventKind, seed: f64) -> Result<Option<f64>, AlmagestError> {
        let mut current = seed;
        for iteration in 1..=self.params.max_iterations {
            let fractions = self.base(self.date.add_days(current))?;
            let Some(r) = fractions.get(kind) else {
                trace!(?kind, iteration, "event vanished during refinement");
                return Ok(None);
            };

            let candidate = [r - SIDEREAL_DAY, r, r + SIDEREAL_DAY]
                .into_iter()
                .min_by(|a, b| (a - current).abs().total_cmp(&(b - current).abs()))
                .unwrap_or(r);
            let delta_seconds = (candidate - current).abs() * SECONDS_PER_DAY;
            current = candidate;

            trace!(?kind, iteration, fraction = current, delta_seconds, "refinement step");
            if delta_seconds <= self.params.convergence_seconds {
                return Ok(Some(current));
            }
        }

        warn!(
            ?kind,
            iterations = self.params.max_iterations,
            "event refinement did not converge"
        );
        Err(AlmagestError::ConvergenceFailure {
            event: kind,
            iterations: self.params.max_iterations,
        })
    }

    fn seeds(&self, base: f64) -> impl Iterator<Item = f64> + '_ {
        let margin = self.params.day_margin;
        [base - SIDEREAL_DAY, base, base + SIDEREAL_DAY]
            .into_iter()
            .filter(move |m| *m >= -margin && *m < 1.0 + margin)
    }

    /// Rising, culminations and setting within the civil day, sorted by instant.
    pub fn solve(&self) -> Result<EventSet, AlmagestError> {
        let base = self.base(self.date)?;
        let mut events = EventSet::new();

        for kind in SOLVED_KINDS {
            let Some(fraction) = base.get(kind) else {
                trace!(?kind, "threshold not crossed on this date");
                continue;
            };

            for seed in self.seeds(fraction) {
                let Some(converged) = self.refine(kind, seed)? else {
                    continue;
                };
                if !(0.0..1.0).contains(&converged) {
                    continue;
                }

                let instant = self.date.add_days(converged);
                let coordinates = self.equatorial_position(instant)?;
                events.push(
                    AstronomicalEvent::new(kind, instant, coordinates.frame().origin())
                        .with_coordinates(coordinates),
                );
            }
        }

        events.dedup_near();
        events.sort_by_instant();
        debug!(
            date = %self.date,
            altitude_deg = self.altitude * 180.0 / PI,
            events = events.len(),
            "solved rise/transit/set"
        );
        Ok(events)
    }
}

/// Rising, transit, setting and antitransit of a body on the civil day containing `date`.
///
/// Arguments
/// ---------
/// * `transformer`: frame engine used to reach the equatorial frame of date.
/// * `position`: body position as a function of time.
/// * `date`: any instant of the requested day (UT).
/// * `location`: the observer.
/// * `angle_below_horizon`: threshold, positive below the horizon (radians).
/// * `params`: solver configuration.
///
/// Return
/// ------
/// * the events found in `[0h, 24h)` UT, sorted by instant, without associated bodies.
///   Rising and setting are missing for circumpolar or never-visible bodies.
///
/// See also
/// --------
/// * [`MeridianSolver`] – the underlying base pass and refinement.
/// * [`crate::context::EphemerisContext::events`] – body-aware wrapper with twilight.
pub fn solve_rise_transit_set<F>(
    transformer: &FrameTransformer,
    position: F,
    date: Instant,
    location: GeographicLocation,
    angle_below_horizon: Radian,
    params: &EventSolverParams,
) -> Result<EventSet, AlmagestError>
where
    F: Fn(Instant) -> Result<SphericalCoordinates, AlmagestError>,
{
    MeridianSolver::new(
        transformer,
        position,
        date,
        location,
        angle_below_horizon,
        params,
    )
    .solve()
}

#[cfg(test)]
mod solver_test {
    use super::*;
    use crate::coordinates::CoordinateFrameOrigin;
    use crate::transform::table_builder::RotationTableBuilder;
    use crate::transform::RotationTables;

    fn fixed_star(
        ra_deg: f64,
        dec_deg: f64,
    ) -> impl Fn(Instant) -> Result<SphericalCoordinates, AlmagestError> {
        move |at: Instant| {
            Ok(SphericalCoordinates::from_degrees(
                ra_deg,
                dec_deg,
                None,
                CoordinateFrame::fk5(at, CoordinateFrameOrigin::Geocentric),
            ))
        }
    }

    // positions already in the frame of date: no table lookup needed
    fn bare_transformer() -> FrameTransformer {
        FrameTransformer::new(RotationTables::new())
    }

    #[test]
    fn test_circumpolar_star() {
        let transformer = bare_transformer();
        let params = EventSolverParams::default();
        let location = GeographicLocation::new(60.0, 10.0, None).unwrap();
        let events = solve_rise_transit_set(
            &transformer,
            fixed_star(120.0, 80.0),
            Instant::from_julian_day(2_451_545.0),
            location,
            0.5667_f64.to_radians(),
            &params,
        )
        .unwrap();

        assert!(events.rising().is_none());
        assert!(events.setting().is_none());
        assert!(events.transit().is_some());
        assert!(events.antitransit().is_some());
    }

    #[test]
    fn test_never_visible_star() {
        let transformer = bare_transformer();
        let params = EventSolverParams::default();
        let location = GeographicLocation::new(60.0, 10.0, None).unwrap();
        let events = solve_rise_transit_set(
            &transformer,
            fixed_star(120.0, -80.0),
            Instant::from_julian_day(2_451_545.0),
            location,
            0.5667_f64.to_radians(),
            &params,
        )
        .unwrap();
        assert!(events.rising().is_none());
        assert!(events.transit().is_some());
    }

    #[test]
    fn test_fixed_star_symmetry() {
        let transformer = bare_transformer();
        let params = EventSolverParams::default();
        let location = GeographicLocation::new(45.0, 0.0, None).unwrap();
        let date = Instant::from_julian_day(2_451_545.0);
        let events = solve_rise_transit_set(
            &transformer,
            fixed_star(200.0, 10.0),
            date,
            location,
            0.0,
            &params,
        )
        .unwrap();

        // rising and setting are symmetric around transit for a fixed direction
        let transit = events.transit().unwrap();
        for event in events.of_kind(EventKind::Rising) {
            let setting = events
                .of_kind(EventKind::Setting)
                .map(|s| s.instant.days_since(&transit))
                .find(|d| *d > 0.0);
            if let Some(after) = setting {
                let before = transit.days_since(&event.instant);
                if before > 0.0 {
                    assert!((after - before).abs() * SECONDS_PER_DAY < 2.0);
                }
            }
        }

        for event in &events {
            let fraction = event.instant.days_since(&date.start_of_day());
            assert!((0.0..1.0).contains(&fraction));
        }
    }

    #[test]
    fn test_refine_is_idempotent() {
        let transformer = bare_transformer();
        let params = EventSolverParams::default();
        let location = GeographicLocation::new(45.0, 0.0, None).unwrap();
        let solver = MeridianSolver::new(
            &transformer,
            fixed_star(200.0, 10.0),
            Instant::from_julian_day(2_451_545.0),
            location,
            0.0,
            &params,
        );
        let first = solver.refine(EventKind::Rising, 0.3).unwrap().unwrap();
        let again = solver.refine(EventKind::Rising, first).unwrap().unwrap();
        assert!((first - again).abs() * SECONDS_PER_DAY <= 1.0);
    }

    #[test]
    fn test_iteration_cap() {
        let transformer = bare_transformer();
        let params = EventSolverParams::builder()
            .max_iterations(1)
            .build()
            .unwrap();
        let location = GeographicLocation::new(45.0, 0.0, None).unwrap();
        // a body moving fast enough in α to never settle in one iteration
        let runaway = |at: Instant| {
            Ok(SphericalCoordinates::new(
                at.julian_day() * 3.0,
                0.1,
                None,
                CoordinateFrame::fk5(at, CoordinateFrameOrigin::Geocentric),
            ))
        };
        let solver = MeridianSolver::new(
            &transformer,
            runaway,
            Instant::from_julian_day(2_451_545.0),
            location,
            0.0,
            &params,
        );
        assert_eq!(
            solver.refine(EventKind::UpperCulmination, 0.2),
            Err(AlmagestError::ConvergenceFailure {
                event: EventKind::UpperCulmination,
                iterations: 1,
            })
        );
    }

    #[test]
    fn test_position_errors_propagate() {
        let transformer = FrameTransformer::new(
            RotationTableBuilder::new()
                .start(Instant::from_julian_day(2_451_000.5))
                .end(Instant::from_julian_day(2_451_100.5))
                .build()
                .unwrap(),
        );
        let params = EventSolverParams::default();
        let location = GeographicLocation::new(45.0, 0.0, None).unwrap();
        let icrf_star = |_: Instant| {
            Ok(SphericalCoordinates::from_degrees(
                10.0,
                10.0,
                None,
                CoordinateFrame::icrf(CoordinateFrameOrigin::Geocentric),
            ))
        };
        let result = solve_rise_transit_set(
            &transformer,
            icrf_star,
            Instant::from_julian_day(2_460_000.5),
            location,
            0.0,
            &params,
        );
        assert!(matches!(result, Err(AlmagestError::OutOfRange { .. })));
    }
}
