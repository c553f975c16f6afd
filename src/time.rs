//! # Time axis
//!
//! [`Instant`] is the single time value of the crate. It wraps a **Julian Day** (`f64`), which is
//! the axis every ephemeris table is indexed on, and offers lossless conversions to the other
//! usual time labels:
//!
//! - Modified Julian Date,
//! - Julian Century since J2000.0 (`T`, used by every precession/nutation polynomial),
//! - Julian and Besselian epochs (`J2000.0`, `B1950.0`, …),
//! - [`hifitime::Epoch`] for calendar construction and display.
//!
//! Sidereal time is computed from the same axis, interpreted as UT (ΔT is neglected).

use std::fmt;

use hifitime::{Epoch, TimeScale};

use crate::constants::{
    JulianDay, Radian, DAYS_PER_BESSELIAN_YEAR, DAYS_PER_JULIAN_CENTURY, DAYS_PER_JULIAN_YEAR, DPI,
    JDTOMJD, JD_B1900, JD_B1950, JD_J2000, MJD, SECONDS_PER_DAY,
};

/// A point on the continuous Julian Day axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Instant {
    jd: JulianDay,
}

impl Instant {
    /// J2000.0, 2000-01-01 12:00
    pub const J2000: Instant = Instant { jd: JD_J2000 };

    /// B1950.0
    pub const B1950: Instant = Instant { jd: JD_B1950 };

    pub fn from_julian_day(jd: JulianDay) -> Self {
        Instant { jd }
    }

    pub fn julian_day(&self) -> JulianDay {
        self.jd
    }

    pub fn from_mjd(mjd: MJD) -> Self {
        Instant { jd: mjd + JDTOMJD }
    }

    pub fn mjd(&self) -> MJD {
        self.jd - JDTOMJD
    }

    /// Build an instant from a [`hifitime::Epoch`], read on the UTC Julian Day scale.
    pub fn from_epoch(epoch: Epoch) -> Self {
        Instant {
            jd: epoch.to_jde_utc_days(),
        }
    }

    /// Convert to a [`hifitime::Epoch`] on the UTC scale.
    pub fn to_epoch(&self) -> Epoch {
        Epoch::from_jde_utc(self.jd)
    }

    /// Gregorian UTC calendar date and time.
    ///
    /// Arguments
    /// ---------
    /// * `year`, `month`, `day`, `hour`, `minute`, `second`: calendar fields, UTC.
    ///
    /// Return
    /// ------
    /// * the corresponding [`Instant`].
    pub fn from_gregorian_utc(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Self {
        Self::from_epoch(Epoch::from_gregorian(
            year,
            month,
            day,
            hour,
            minute,
            second,
            0,
            TimeScale::UTC,
        ))
    }

    /// Julian centuries elapsed since J2000.0.
    pub fn julian_century(&self) -> f64 {
        (self.jd - JD_J2000) / DAYS_PER_JULIAN_CENTURY
    }

    pub fn julian_epoch(&self) -> f64 {
        2000.0 + (self.jd - JD_J2000) / DAYS_PER_JULIAN_YEAR
    }

    pub fn from_julian_epoch(year: f64) -> Self {
        Instant {
            jd: JD_J2000 + (year - 2000.0) * DAYS_PER_JULIAN_YEAR,
        }
    }

    pub fn besselian_epoch(&self) -> f64 {
        1900.0 + (self.jd - JD_B1900) / DAYS_PER_BESSELIAN_YEAR
    }

    pub fn from_besselian_epoch(year: f64) -> Self {
        Instant {
            jd: JD_B1900 + (year - 1900.0) * DAYS_PER_BESSELIAN_YEAR,
        }
    }

    /// 0h UT of the civil day containing this instant.
    pub fn start_of_day(&self) -> Self {
        Instant {
            jd: (self.jd - 0.5).floor() + 0.5,
        }
    }

    pub fn add_days(&self, days: f64) -> Self {
        Instant { jd: self.jd + days }
    }

    pub fn add_seconds(&self, seconds: f64) -> Self {
        self.add_days(seconds / SECONDS_PER_DAY)
    }

    /// Signed number of days from `other` to `self`.
    pub fn days_since(&self, other: &Instant) -> f64 {
        self.jd - other.jd
    }

    pub fn seconds_since(&self, other: &Instant) -> f64 {
        self.days_since(other) * SECONDS_PER_DAY
    }

    /// Greenwich mean sidereal time, radians in `[0, 2π)`.
    ///
    /// See also
    /// --------
    /// * [`gmst`] – the underlying polynomial, on the MJD axis.
    pub fn greenwich_mean_sidereal_time(&self) -> Radian {
        gmst(self.mjd())
    }

    /// Local mean sidereal time for an east-positive longitude in radians, in `[0, 2π)`.
    pub fn local_mean_sidereal_time(&self, east_longitude: Radian) -> Radian {
        (self.greenwich_mean_sidereal_time() + east_longitude).rem_euclid(DPI)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{} (JD {:.6})", self.to_epoch(), self.jd)
        } else {
            write!(f, "{}", self.to_epoch())
        }
    }
}

/// Compute the Greenwich Mean Sidereal Time (GMST) in radians
/// for a given Modified Julian Date (UT time scale).
///
/// The IAU 1982 polynomial gives the mean sidereal time at 0h UT of the date;
/// the elapsed fraction of the day is then added at the sidereal rate.
///
/// Arguments
/// ---------
/// * `tjm`: Modified Julian Date, UT.
///
/// Return
/// ------
/// * GMST angle in radians, normalized to `[0, 2π)`.
///
/// References
/// ----------
/// * IAU 1982, Explanatory Supplement to the Astronomical Almanac (1992).
pub fn gmst(tjm: MJD) -> Radian {
    // Polynomial coefficients for GMST at 0h UT (in seconds)
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;

    // Ratio of sidereal day to solar day
    const RAP: f64 = 1.00273790934;

    // 0h UT of the date, in centuries since J2000.0
    let itjm = tjm.floor();
    let t = (itjm + JDTOMJD - JD_J2000) / DAYS_PER_JULIAN_CENTURY;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;

    let h = (tjm - itjm) * DPI;
    (gmst0 + h * RAP).rem_euclid(DPI)
}
