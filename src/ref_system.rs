//! # Analytic reference-frame model
//!
//! Closed-form orientation of the supported celestial frames with respect to the **galactic**
//! frame, which the transform engine uses as its hub. Each supported frame `F` gets a rotation
//! `R_F(equinox)` such that `v_galactic = R_F · v_F`.
//!
//! ## Ingredients
//!
//! * [`prec`] – IAU 1976 precession, J2000 mean equator → mean equator of date,
//! * [`obleq`] – IAU 1976 mean obliquity of the ecliptic,
//! * [`nutation`] / [`rnut`] – four-term nutation, sufficient for the true ecliptic at the
//!   arcsecond level,
//! * [`frame_bias`] – ICRS → FK5 J2000 offset (IERS Conventions 2003),
//! * [`fk4_b1950_to_fk5_j2000`] – FK4 → FK5, E-terms ignored,
//! * [`icrs_to_galactic`] – Hipparcos galactic definition.
//!
//! Matrices are built from elementary rotations with [`rotmt`]; every composed matrix maps
//! coordinates **from the frame on the right to the frame on the left**.
//!
//! The model is sampled by [`RotationTableBuilder`](crate::transform::table_builder::RotationTableBuilder)
//! into the angle tables read by the transform engine. [`zyz_decompose`] and [`zyz_compose`]
//! convert between a rotation matrix and the three Z·Y·Z angles stored in those tables.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{
    fk4_b1950_to_fk5_j2000, icrs_to_galactic, ArcSec, Radian, FRAME_BIAS_ARCSEC, RADEG, RADSEC,
};
use crate::coordinates::CoordinateFrameType;
use crate::time::Instant;

/// Principal axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct a right-handed 3×3 rotation matrix around one of the principal axes.
///
/// The matrix represents an **active rotation** of a vector by `alpha` in the direct
/// (counter-clockwise) sense. Rotating the *axes* of a frame by `alpha` is therefore
/// `rotmt(-alpha, axis)`, the form used by every frame change in this module.
///
/// Arguments
/// ---------
/// * `alpha`: rotation angle in radians.
/// * `axis`: rotation axis.
///
/// Return
/// ------
/// * the orthonormal matrix `R` with `x' = R · x`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Mean obliquity of the ecliptic at `instant` (IAU 1976), in radians.
///
/// ```text
/// ε = 84381.448″ − 46.8150″·T − 0.00059″·T² + 0.001813″·T³
/// ```
pub fn obleq(instant: Instant) -> Radian {
    // Obliquity coefficients
    let ob0 = ((23.0 * 3600.0 + 26.0 * 60.0) + 21.448) * RADSEC;
    let ob1 = -46.815 * RADSEC;
    let ob2 = -0.00059 * RADSEC;
    let ob3 = 0.001813 * RADSEC;

    let t = instant.julian_century();

    ((ob3 * t + ob2) * t + ob1) * t + ob0
}

/// Nutation in longitude and obliquity `(Δψ, Δε)` in arcseconds.
///
/// Only the four largest terms are kept (lunar node, twice the mean longitudes of the Sun and
/// the Moon, twice the node), which is accurate to about 0.5″ in Δψ and 0.1″ in Δε.
pub fn nutation(instant: Instant) -> (ArcSec, ArcSec) {
    let t = instant.julian_century();

    // Longitude of the ascending node of the Moon's mean orbit
    let omega = (125.04452 - 1934.136261 * t + 0.0020708 * t * t + t * t * t / 450000.0) * RADEG;
    // Mean longitudes of the Sun and the Moon
    let l_sun = (280.4665 + 36000.7698 * t) * RADEG;
    let l_moon = (218.3165 + 481267.8813 * t) * RADEG;

    let dpsi = -17.20 * omega.sin() - 1.32 * (2.0 * l_sun).sin() - 0.23 * (2.0 * l_moon).sin()
        + 0.21 * (2.0 * omega).sin();
    let deps = 9.20 * omega.cos() + 0.57 * (2.0 * l_sun).cos() + 0.10 * (2.0 * l_moon).cos()
        - 0.09 * (2.0 * omega).cos();

    (dpsi, deps)
}

/// True obliquity of the ecliptic, `ε + Δε`, in radians.
pub fn true_obliquity(instant: Instant) -> Radian {
    let (_, deps) = nutation(instant);
    obleq(instant) + deps * RADSEC
}

/// Nutation matrix: mean equator and equinox of date → true equator and equinox of date.
///
/// ```text
/// N = R_x(−ε−Δε) · R_z(−Δψ) · R_x(ε)      (frame rotations)
/// ```
pub fn rnut(instant: Instant) -> Matrix3<f64> {
    let epsm = obleq(instant);
    let (dpsi, deps) = nutation(instant);
    let epst = epsm + deps * RADSEC;

    rotmt(epst, Axis::X) * rotmt(dpsi * RADSEC, Axis::Z) * rotmt(-epsm, Axis::X)
}

/// Compute the precession matrix from J2000 to the mean equator and equinox of `instant`
/// (IAU 1976, Lieske 1977).
///
/// ```text
/// ζ = 2306.2181″·T + 0.30188″·T² + 0.017998″·T³
/// z = 2306.2181″·T + 1.09468″·T² + 0.018203″·T³
/// θ = 2004.3109″·T − 0.42665″·T² − 0.041833″·T³
/// P = R_z(−z) · R_y(θ) · R_z(−ζ)          (frame rotations)
/// ```
///
/// See also
/// --------
/// * [`rotmt`] – elementary rotations.
pub fn prec(instant: Instant) -> Matrix3<f64> {
    let t = instant.julian_century();

    let zeta = ((0.017998 * t + 0.30188) * t + 2306.2181) * t * RADSEC;
    let z = ((0.018203 * t + 1.09468) * t + 2306.2181) * t * RADSEC;
    let theta = ((-0.041833 * t - 0.42665) * t + 2004.3109) * t * RADSEC;

    rotmt(z, Axis::Z) * rotmt(-theta, Axis::Y) * rotmt(zeta, Axis::Z)
}

/// Frame bias: ICRS → FK5 mean equator and equinox J2000.
pub fn frame_bias() -> Matrix3<f64> {
    let (dalpha0, xi0, eta0) = FRAME_BIAS_ARCSEC;
    rotmt(eta0 * RADSEC, Axis::X)
        * rotmt(-xi0 * RADSEC, Axis::Y)
        * rotmt(-dalpha0 * RADSEC, Axis::Z)
}

/// Equatorial → ecliptic frame rotation for an obliquity `eps`.
pub fn equatorial_to_ecliptic(eps: Radian) -> Matrix3<f64> {
    rotmt(-eps, Axis::X)
}

/// Rotation from the given frame to ICRS, `v_icrs = M · v_frame`.
///
/// Returns `None` for the horizontal frame, whose orientation also depends on the observer and
/// is handled by the transform engine. ICRF and galactic frames ignore `equinox`.
pub fn frame_to_icrs(kind: CoordinateFrameType, equinox: Instant) -> Option<Matrix3<f64>> {
    let bias_t = frame_bias().transpose();
    let m = match kind {
        CoordinateFrameType::EquatorialIcrf => Matrix3::identity(),
        CoordinateFrameType::Galactic => icrs_to_galactic().transpose(),
        CoordinateFrameType::EquatorialFk5 => bias_t * prec(equinox).transpose(),
        CoordinateFrameType::EquatorialFk4 => {
            bias_t
                * fk4_b1950_to_fk5_j2000()
                * prec(Instant::B1950)
                * prec(equinox).transpose()
        }
        CoordinateFrameType::MeanEcliptic => {
            bias_t
                * prec(equinox).transpose()
                * equatorial_to_ecliptic(obleq(equinox)).transpose()
        }
        CoordinateFrameType::TrueEcliptic => {
            bias_t
                * prec(equinox).transpose()
                * rnut(equinox).transpose()
                * equatorial_to_ecliptic(true_obliquity(equinox)).transpose()
        }
        CoordinateFrameType::Horizontal => return None,
    };
    Some(m)
}

/// Rotation from the given frame to galactic, `v_gal = R · v_frame`.
pub fn frame_to_galactic(kind: CoordinateFrameType, equinox: Instant) -> Option<Matrix3<f64>> {
    match kind {
        CoordinateFrameType::Galactic => Some(Matrix3::identity()),
        _ => frame_to_icrs(kind, equinox).map(|m| icrs_to_galactic() * m),
    }
}

/// Decompose a rotation into Z·Y·Z frame-rotation angles `(α, β, γ)`:
///
/// ```text
/// M = R_z(γ) · R_y(β) · R_z(α)
/// ```
///
/// When `β` is 0 or π the split between `α` and `γ` is arbitrary and `γ = 0` is returned.
pub fn zyz_decompose(m: &Matrix3<f64>) -> (Radian, Radian, Radian) {
    let beta = m[(2, 2)].clamp(-1.0, 1.0).acos();
    if beta.sin() < 1e-12 {
        let alpha = if m[(2, 2)] > 0.0 {
            m[(0, 1)].atan2(m[(0, 0)])
        } else {
            (-m[(0, 1)]).atan2(-m[(0, 0)])
        };
        return (alpha, beta, 0.0);
    }
    let alpha = m[(2, 1)].atan2(m[(2, 0)]);
    let gamma = m[(1, 2)].atan2(-m[(0, 2)]);
    (alpha, beta, gamma)
}

/// Inverse of [`zyz_decompose`], from the cosine and sine of each angle.
pub fn zyz_compose(
    (cos_alpha, sin_alpha): (f64, f64),
    (cos_beta, sin_beta): (f64, f64),
    (cos_gamma, sin_gamma): (f64, f64),
) -> Matrix3<f64> {
    let rz = |c: f64, s: f64| Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0);
    let ry = |c: f64, s: f64| Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c);
    rz(cos_gamma, sin_gamma) * ry(cos_beta, sin_beta) * rz(cos_alpha, sin_alpha)
}
