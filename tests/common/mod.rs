#![allow(dead_code)]

use almagest::almagest_errors::AlmagestError;
use almagest::constants::{RADEG, SECONDS_PER_DAY};
use almagest::coordinates::{CoordinateFrame, CoordinateFrameOrigin, SphericalCoordinates};
use almagest::interpolation::EphemerisSeries;
use almagest::time::Instant;
use almagest::transform::{table_builder::RotationTableBuilder, FrameTransformer};

/// 1988-03-20 0h UT.
pub const VENUS_JD0: f64 = 2_447_240.5;

/// 2000-01-01 0h UT.
pub const SUN_JD0: f64 = 2_451_544.5;

/// Tables covering 1949 to 2010, every 5 days.
pub fn transformer() -> FrameTransformer {
    FrameTransformer::new(
        RotationTableBuilder::default()
            .start(Instant::from_julian_day(2_433_000.5))
            .end(Instant::from_julian_day(2_455_197.5))
            .step_days(5.0)
            .build()
            .unwrap(),
    )
}

/// Instant at `h:m:s` UT of the day starting at `jd0`.
pub fn at_time(jd0: f64, h: u32, m: u32, s: u32) -> Instant {
    let seconds = (h * 3600 + m * 60 + s) as f64;
    Instant::from_julian_day(jd0 + seconds / SECONDS_PER_DAY)
}

pub fn assert_within_seconds(actual: Instant, expected: Instant, seconds: f64) {
    let diff = actual.seconds_since(&expected);
    assert!(
        diff.abs() <= seconds,
        "{actual} differs from {expected} by {diff:.1} s"
    );
}

/// Three-point interpolation of tabulated values at days −1, 0, +1.
fn quadratic(y: [f64; 3], n: f64) -> f64 {
    let a = y[1] - y[0];
    let b = y[2] - y[1];
    y[1] + n / 2.0 * (a + b + n * (b - a))
}

/// Apparent place of Venus around 1988-03-20, equator and equinox of date.
///
/// α = 40.68021°, 41.73129°, 42.78204° and δ = 18.04761°, 18.44092°, 18.82742° on March 19,
/// 20 and 21 at 0h TD.
pub fn venus_1988(at: Instant) -> Result<SphericalCoordinates, AlmagestError> {
    let n = at.julian_day() - VENUS_JD0;
    Ok(SphericalCoordinates::from_degrees(
        quadratic([40.68021, 41.73129, 42.78204], n),
        quadratic([18.04761, 18.44092, 18.82742], n),
        None,
        CoordinateFrame::fk5(at, CoordinateFrameOrigin::Geocentric),
    ))
}

/// Low-precision apparent geocentric direction of the Sun, as a unit vector in the equatorial
/// frame of date.
pub fn sun_direction(jd: f64) -> [f64; 3] {
    let t = (jd - 2_451_545.0) / 36_525.0;
    let l0 = 280.46646 + 36_000.76983 * t + 0.000_303_2 * t * t;
    let m = (357.52911 + 35_999.05029 * t - 0.000_153_7 * t * t) * RADEG;
    let c = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin()
        + (0.019_993 - 0.000_101 * t) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();
    let omega = (125.04 - 1_934.136 * t) * RADEG;
    let lambda = (l0 + c - 0.005_69 - 0.004_78 * omega.sin()) * RADEG;

    let eps0 = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0
        - (46.8150 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) / 3600.0;
    let eps = (eps0 + 0.002_56 * omega.cos()) * RADEG;

    [
        lambda.cos(),
        lambda.sin() * eps.cos(),
        lambda.sin() * eps.sin(),
    ]
}

/// Daily Sun directions from `jd0 − 10` to `jd0 + 10`.
pub fn sun_series(jd0: f64) -> EphemerisSeries {
    EphemerisSeries::from_rows((-10..=10).map(|d| {
        let jd = jd0 + d as f64;
        (jd, sun_direction(jd))
    }))
    .unwrap()
}

/// Frame of [`sun_series`]: within a few days of 2000.0 the equinox of date is J2000.
pub fn sun_frame() -> CoordinateFrame {
    CoordinateFrame::fk5(Instant::J2000, CoordinateFrameOrigin::Geocentric)
}
