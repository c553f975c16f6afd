//! # Event solver parameters
//!
//! [`EventSolverParams`] gathers every tunable of the rise/transit/set solver: iteration cap,
//! convergence threshold, seed margin around the civil day, standard altitudes and twilight
//! depressions. Values are validated by [`EventSolverParamsBuilder::build`].
//!
//! The struct derives `serde` traits with `#[serde(default)]`, so a configuration file only
//! needs the fields it overrides.
//!
//! ```rust,no_run
//! use almagest::events::params::EventSolverParams;
//!
//! let params = EventSolverParams::builder()
//!     .max_iterations(30)
//!     .convergence_seconds(0.5)
//!     .build()?;
//! println!("{params:#}");
//! # Ok::<(), almagest::almagest_errors::AlmagestError>(())
//! ```

use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::almagest_errors::AlmagestError;
use crate::constants::Degree;

/// Tunables of the event solver.
///
/// Altitudes are signed degrees (negative below the horizon); twilight depressions are positive
/// degrees below the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSolverParams {
    /// Maximum refinement iterations per event before [`AlmagestError::ConvergenceFailure`].
    pub max_iterations: usize,
    /// Refinement stops when two successive candidates are this close (seconds).
    pub convergence_seconds: f64,
    /// How far outside the civil day (in days) an extra seed may start.
    pub day_margin: f64,

    /// Standard altitude of stars and planets: refraction only.
    pub default_standard_altitude_deg: Degree,
    /// Standard altitude of the Sun: refraction and semi-diameter.
    pub sun_standard_altitude_deg: Degree,

    pub civil_depression_deg: Degree,
    pub nautical_depression_deg: Degree,
    pub astronomical_depression_deg: Degree,
}

impl Default for EventSolverParams {
    fn default() -> Self {
        EventSolverParams {
            max_iterations: 20,
            convergence_seconds: 1.0,
            day_margin: 0.1,

            default_standard_altitude_deg: -0.5667,
            sun_standard_altitude_deg: -0.8333,

            civil_depression_deg: 6.0,
            nautical_depression_deg: 12.0,
            astronomical_depression_deg: 18.0,
        }
    }
}

impl EventSolverParams {
    /// Start a builder initialized with the defaults.
    ///
    /// See also
    /// --------
    /// * [`EventSolverParamsBuilder::build`] – validation rules.
    pub fn builder() -> EventSolverParamsBuilder {
        EventSolverParamsBuilder::new()
    }
}

/// Builder for [`EventSolverParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct EventSolverParamsBuilder {
    params: EventSolverParams,
}

impl EventSolverParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: EventSolverParams::default(),
        }
    }

    // --- Refinement ---
    pub fn max_iterations(mut self, v: usize) -> Self {
        self.params.max_iterations = v;
        self
    }
    pub fn convergence_seconds(mut self, v: f64) -> Self {
        self.params.convergence_seconds = v;
        self
    }
    pub fn day_margin(mut self, v: f64) -> Self {
        self.params.day_margin = v;
        self
    }

    // --- Standard altitudes ---
    pub fn default_standard_altitude_deg(mut self, v: Degree) -> Self {
        self.params.default_standard_altitude_deg = v;
        self
    }
    pub fn sun_standard_altitude_deg(mut self, v: Degree) -> Self {
        self.params.sun_standard_altitude_deg = v;
        self
    }

    // --- Twilight ---
    pub fn civil_depression_deg(mut self, v: Degree) -> Self {
        self.params.civil_depression_deg = v;
        self
    }
    pub fn nautical_depression_deg(mut self, v: Degree) -> Self {
        self.params.nautical_depression_deg = v;
        self
    }
    pub fn astronomical_depression_deg(mut self, v: Degree) -> Self {
        self.params.astronomical_depression_deg = v;
        self
    }

    // ---- Numeric helpers for PartialOrd (handle NaN as invalid) ----

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Return true iff a < b and comparable (i.e., not NaN).
    #[inline]
    fn lt(a: f64, b: f64) -> bool {
        a.partial_cmp(&b) == Some(Less)
    }

    /// Return true iff a <= b and comparable (i.e., not NaN).
    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Rules
    /// -----
    /// * `max_iterations >= 1`,
    /// * `convergence_seconds > 0`,
    /// * `0 <= day_margin < 0.5`,
    /// * standard altitudes in `(-90, 90)`,
    /// * `0 < civil <= nautical <= astronomical < 90`.
    ///
    /// Return
    /// ------
    /// * the parameters, or [`AlmagestError::InvalidSolverParameter`] naming the first broken rule.
    pub fn build(self) -> Result<EventSolverParams, AlmagestError> {
        let p = &self.params;

        if p.max_iterations == 0 {
            return Err(AlmagestError::InvalidSolverParameter(
                "max_iterations must be >= 1".into(),
            ));
        }
        if !Self::gt0(p.convergence_seconds) {
            return Err(AlmagestError::InvalidSolverParameter(
                "convergence_seconds must be > 0".into(),
            ));
        }
        if !(Self::ge0(p.day_margin) && Self::lt(p.day_margin, 0.5)) {
            return Err(AlmagestError::InvalidSolverParameter(
                "day_margin must lie in [0, 0.5)".into(),
            ));
        }

        for (name, h) in [
            ("default_standard_altitude_deg", p.default_standard_altitude_deg),
            ("sun_standard_altitude_deg", p.sun_standard_altitude_deg),
        ] {
            if !(Self::lt(-90.0, h) && Self::lt(h, 90.0)) {
                return Err(AlmagestError::InvalidSolverParameter(format!(
                    "{name} must lie in (-90, 90)"
                )));
            }
        }

        let ordered = Self::gt0(p.civil_depression_deg)
            && Self::le(p.civil_depression_deg, p.nautical_depression_deg)
            && Self::le(p.nautical_depression_deg, p.astronomical_depression_deg)
            && Self::lt(p.astronomical_depression_deg, 90.0);
        if !ordered {
            return Err(AlmagestError::InvalidSolverParameter(
                "require 0 < civil <= nautical <= astronomical < 90".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for EventSolverParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 46; // width reserved for "name = value"
            writeln!(f, "Event Solver Parameters")?;
            writeln!(f, "-----------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Refinement]")?;
            line!(
                "max_iterations                = {}",
                self.max_iterations,
                "Iteration cap per event"
            )?;
            line!(
                "convergence_seconds           = {:.3} s",
                self.convergence_seconds,
                "Stop when successive candidates agree"
            )?;
            line!(
                "day_margin                    = {:.3} d",
                self.day_margin,
                "Seed window around the civil day"
            )?;

            writeln!(f, "[Standard altitudes]")?;
            line!(
                "default_standard_altitude_deg = {:.4}°",
                self.default_standard_altitude_deg,
                "Stars and planets"
            )?;
            line!(
                "sun_standard_altitude_deg     = {:.4}°",
                self.sun_standard_altitude_deg,
                "Sun upper limb"
            )?;

            writeln!(f, "[Twilight depressions]")?;
            line!(
                "civil_depression_deg          = {:.1}°",
                self.civil_depression_deg,
                "Civil dawn/dusk"
            )?;
            line!(
                "nautical_depression_deg       = {:.1}°",
                self.nautical_depression_deg,
                "Nautical dawn/dusk"
            )?;
            line!(
                "astronomical_depression_deg   = {:.1}°",
                self.astronomical_depression_deg,
                "Astronomical dawn/dusk"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "EventSolverParams(max_iterations={}, convergence={:.2}s, day_margin={:.2}d, h0={:.4}°, h0_sun={:.4}°, twilight={:.0}/{:.0}/{:.0}°)",
                self.max_iterations,
                self.convergence_seconds,
                self.day_margin,
                self.default_standard_altitude_deg,
                self.sun_standard_altitude_deg,
                self.civil_depression_deg,
                self.nautical_depression_deg,
                self.astronomical_depression_deg,
            )
        }
    }
}
