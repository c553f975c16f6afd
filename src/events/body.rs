//! # Bodies and their event policies
//!
//! A solar-system body is a tagged value [`BodyKind`]. Everything the event solver needs to
//! know about a body lives in its [`BodyPolicy`], a small table of plain functions:
//!
//! * `standard_altitude` – the altitude at which the body rises or sets,
//! * `post_process` – which events are reported,
//! * `twilight` – whether civil/nautical/astronomical dawn and dusk are computed.
//!
//! Classification metadata that does not drive any computation is exposed as
//! [`BodyCapabilities`] flags.

use std::fmt;

use bitflags::bitflags;

use super::{EventKind, EventSet};
use crate::constants::{Radian, ERAU, RADEG};
use crate::coordinates::SphericalCoordinates;
use crate::events::params::EventSolverParams;

/// Mean equatorial horizontal parallax of the Moon, used when its distance is unknown.
const MOON_MEAN_PARALLAX_DEG: f64 = 0.9507;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Planet {
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyKind {
    Sun,
    Moon,
    Planet(Planet),
}

bitflags! {
    /// Descriptive traits of a body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyCapabilities: u8 {
        const SOLAR_SYSTEM = 1 << 0;
        const POINT_SOURCE = 1 << 1;
        const EXTENDED_DISK = 1 << 2;
        const HAS_PHASES = 1 << 3;
        const HAS_RINGS = 1 << 4;
        const SELF_LUMINOUS = 1 << 5;
    }
}

/// Strategy table driving the event solver for one body.
#[derive(Clone, Copy)]
pub struct BodyPolicy {
    /// Signed standard altitude (radians, negative below the horizon), from the geocentric
    /// equatorial position of the body at the start of the day.
    pub standard_altitude: fn(&SphericalCoordinates, &EventSolverParams) -> Radian,
    pub post_process: fn(&mut EventSet),
    pub twilight: bool,
}

impl fmt::Debug for BodyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyPolicy")
            .field("twilight", &self.twilight)
            .finish_non_exhaustive()
    }
}

fn refraction_altitude(_: &SphericalCoordinates, params: &EventSolverParams) -> Radian {
    params.default_standard_altitude_deg * RADEG
}

fn solar_altitude(_: &SphericalCoordinates, params: &EventSolverParams) -> Radian {
    params.sun_standard_altitude_deg * RADEG
}

/// `h0 = 0.7275·π − 0.5667°`, with `π = asin(R_earth / distance)` the horizontal parallax.
fn lunar_altitude(position: &SphericalCoordinates, params: &EventSolverParams) -> Radian {
    let parallax = match position.distance() {
        Some(d) if d > ERAU => (ERAU / d).asin(),
        _ => MOON_MEAN_PARALLAX_DEG * RADEG,
    };
    0.7275 * parallax + params.default_standard_altitude_deg * RADEG
}

fn keep_all(_: &mut EventSet) {}

fn drop_lower_culmination(events: &mut EventSet) {
    events.remove_kind(EventKind::LowerCulmination);
}

impl BodyKind {
    pub fn name(&self) -> &'static str {
        match self {
            BodyKind::Sun => "Sun",
            BodyKind::Moon => "Moon",
            BodyKind::Planet(p) => match p {
                Planet::Mercury => "Mercury",
                Planet::Venus => "Venus",
                Planet::Earth => "Earth",
                Planet::Mars => "Mars",
                Planet::Jupiter => "Jupiter",
                Planet::Saturn => "Saturn",
                Planet::Uranus => "Uranus",
                Planet::Neptune => "Neptune",
                Planet::Pluto => "Pluto",
            },
        }
    }

    pub fn capabilities(&self) -> BodyCapabilities {
        use BodyCapabilities as C;
        match self {
            BodyKind::Sun => C::SOLAR_SYSTEM | C::EXTENDED_DISK | C::SELF_LUMINOUS,
            BodyKind::Moon => C::SOLAR_SYSTEM | C::EXTENDED_DISK | C::HAS_PHASES,
            BodyKind::Planet(Planet::Mercury | Planet::Venus) => {
                C::SOLAR_SYSTEM | C::POINT_SOURCE | C::HAS_PHASES
            }
            BodyKind::Planet(Planet::Earth) => C::SOLAR_SYSTEM | C::EXTENDED_DISK,
            BodyKind::Planet(Planet::Saturn) => C::SOLAR_SYSTEM | C::POINT_SOURCE | C::HAS_RINGS,
            BodyKind::Planet(_) => C::SOLAR_SYSTEM | C::POINT_SOURCE,
        }
    }

    pub fn policy(&self) -> BodyPolicy {
        match self {
            BodyKind::Sun => BodyPolicy {
                standard_altitude: solar_altitude,
                post_process: keep_all,
                twilight: true,
            },
            BodyKind::Moon => BodyPolicy {
                standard_altitude: lunar_altitude,
                post_process: drop_lower_culmination,
                twilight: false,
            },
            BodyKind::Planet(_) => BodyPolicy {
                standard_altitude: refraction_altitude,
                post_process: drop_lower_culmination,
                twilight: false,
            },
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
