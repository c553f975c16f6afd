//! # Constants and type definitions for almagest
//!
//! This module centralizes the **physical constants**, **conversion factors**, the fixed
//! **reference-frame matrices** and the common **type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Angular and temporal unit conversions (degrees ↔ radians, days ↔ seconds)
//! - Reference epochs on the Julian Day axis (J2000.0, B1950.0)
//! - Earth figure and rotation constants used for sidereal time and parallax
//! - Constant rotations: ICRS → galactic, FK4 B1950 → FK5 J2000, ICRS ↔ FK5 frame bias
//!
//! Distances are expressed in **astronomical units** everywhere in the crate.

use nalgebra::Matrix3;

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Days in a Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;

/// Days in a Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Days in a Besselian (tropical) year
pub const DAYS_PER_BESSELIAN_YEAR: f64 = 365.242198781;

// -------------------------------------------------------------------------------------------------
// Reference epochs
// -------------------------------------------------------------------------------------------------

/// Julian Day of J2000.0 (2000-01-01 12:00:00)
pub const JD_J2000: f64 = 2_451_545.0;

/// Julian Day of B1950.0
pub const JD_B1950: f64 = 2_433_282.4235;

/// Julian Day of B1900.0, origin of the Besselian epoch scale
pub const JD_B1900: f64 = 2_415_020.31352;

/// Offset between Julian Day and Modified Julian Day
pub const JDTOMJD: f64 = 2_400_000.5;

// -------------------------------------------------------------------------------------------------
// Earth
// -------------------------------------------------------------------------------------------------

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Earth polar radius in meters (GRS1980/WGS84)
pub const EARTH_MINOR_AXIS: f64 = 6_356_752.3;

/// Earth equatorial radius expressed in astronomical units
pub const ERAU: f64 = (EARTH_MAJOR_AXIS / 1000.) / AU;

/// Ratio of the sidereal to the solar rotation rate of the Earth
pub const SIDEREAL_RATE: f64 = 1.002_737_909_35;

/// Below this distance (1.1 m, in AU) a rectangular position has no usable distance.
pub const ORIGIN_GUARD_DISTANCE: f64 = 1.1 / (AU * 1000.0);

/// Two events closer than this are the same event.
pub const EVENT_EQUALITY_SECONDS: f64 = 2.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Julian Day (days)
pub type JulianDay = f64;
/// Modified Julian Date (days)
pub type MJD = f64;

// -------------------------------------------------------------------------------------------------
// Constant frame rotations
// -------------------------------------------------------------------------------------------------

/// ICRS → galactic rotation (Hipparcos definition, ESA 1997 vol. 1 §1.5.3).
///
/// `v_gal = ICRS_TO_GALACTIC · v_icrs`
pub fn icrs_to_galactic() -> Matrix3<f64> {
    Matrix3::new(
        -0.054_875_560_416_215_4,
        -0.873_437_090_234_885_0,
        -0.483_835_015_548_713_2,
        0.494_109_427_875_583_7,
        -0.444_829_629_960_011_2,
        0.746_982_244_497_218_9,
        -0.867_666_149_019_004_7,
        -0.198_076_373_431_201_5,
        0.455_983_776_175_066_9,
    )
}

/// FK4 (equinox B1950) → FK5 (equinox J2000) rotation, E-terms and proper motions ignored.
///
/// `v_fk5_j2000 = FK4_TO_FK5 · v_fk4_b1950`
pub fn fk4_b1950_to_fk5_j2000() -> Matrix3<f64> {
    Matrix3::new(
        0.999_925_678_2,
        -0.011_182_061_1,
        -0.004_857_947_7,
        0.011_182_061_0,
        0.999_937_478_4,
        -0.000_027_176_5,
        0.004_857_947_9,
        -0.000_027_147_4,
        0.999_988_199_7,
    )
}

/// Frame bias offsets of FK5 J2000 with respect to ICRS (IERS Conventions 2003), in arcseconds:
/// `(dα₀, ξ₀, η₀)`.
pub const FRAME_BIAS_ARCSEC: (ArcSec, ArcSec, ArcSec) = (-0.014_60, -0.016_617, -0.006_819);
