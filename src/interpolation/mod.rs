//! # Ephemeris interpolation engine
//!
//! Tabulated ephemerides are stored as an [`EphemerisSeries`]: a time-ordered list of
//! [`EphemerisSample`] rows, each holding the same number of `f64` columns (position
//! components, rotation-angle cosines and sines, …).
//!
//! ## Interpolation
//!
//! [`interpolate`] evaluates every column at an arbitrary [`Instant`] with the classical
//! **5-point Bessel formula**. Given five consecutive rows centered on the tabulated row
//! closest to the query, with first differences `A..D`, second differences `E..G`, third
//! differences `H, J` and fourth difference `K`:
//!
//! ```text
//! y = y3 + n/2·(B+C) + n²/2·F + n(n²−1)/12·(H+J) + n²(n²−1)/24·K
//! n = (t − t_c) / (t_{c+1} − t_c)
//! ```
//!
//! The valid window is `[t₂, t_{n−3}]`: two rows must exist on each side of the central row.
//! Queries outside the window fail with [`AlmagestError::OutOfRange`]; nothing is extrapolated
//! or clamped. At a tabulated instant the tabulated row is returned unchanged.
//!
//! Series are built once and never mutated; they can be shared freely between threads.
//!
//! See also
//! --------
//! * [`table_reader`] – builds series from the pipe-delimited text format.
pub mod table_reader;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::{almagest_errors::AlmagestError, constants::JulianDay, time::Instant};

/// Column values of one tabulated row. Six inline slots cover both positions and rotation angles.
pub type SampleValues = SmallVec<[f64; 6]>;

/// One row of a tabulated series.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSample {
    pub instant: Instant,
    pub values: SampleValues,
}

impl EphemerisSample {
    pub fn new(instant: Instant, values: &[f64]) -> Self {
        EphemerisSample {
            instant,
            values: SmallVec::from_slice(values),
        }
    }
}

/// Time-ordered, read-only table of samples.
///
/// Invariants checked by [`EphemerisSeries::new`]:
/// * at least one sample and at least one column,
/// * every sample has the same number of columns,
/// * instants are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisSeries {
    samples: Vec<EphemerisSample>,
    width: usize,
}

impl EphemerisSeries {
    /// Validate and wrap a list of samples.
    ///
    /// Arguments
    /// ---------
    /// * `samples`: rows sorted by strictly increasing instant.
    ///
    /// Return
    /// ------
    /// * the series, or [`AlmagestError::InvalidSeries`] naming the first violated invariant.
    pub fn new(samples: Vec<EphemerisSample>) -> Result<Self, AlmagestError> {
        let width = match samples.first() {
            None => return Err(AlmagestError::InvalidSeries("series is empty".into())),
            Some(first) => first.values.len(),
        };
        if width == 0 {
            return Err(AlmagestError::InvalidSeries(
                "samples must carry at least one value".into(),
            ));
        }

        for (i, sample) in samples.iter().enumerate() {
            if sample.values.len() != width {
                return Err(AlmagestError::InvalidSeries(format!(
                    "sample {i} has {} values, expected {width}",
                    sample.values.len()
                )));
            }
            if !sample.instant.julian_day().is_finite() {
                return Err(AlmagestError::InvalidSeries(format!(
                    "sample {i} has a non-finite instant"
                )));
            }
        }

        if let Some(i) = samples
            .iter()
            .tuple_windows()
            .position(|(a, b)| b.instant.julian_day() <= a.instant.julian_day())
        {
            return Err(AlmagestError::InvalidSeries(format!(
                "instants are not strictly increasing at sample {}",
                i + 1
            )));
        }

        Ok(EphemerisSeries { samples, width })
    }

    /// Build a series from `(julian_day, values)` rows.
    pub fn from_rows<I, V>(rows: I) -> Result<Self, AlmagestError>
    where
        I: IntoIterator<Item = (JulianDay, V)>,
        V: IntoIterator<Item = f64>,
    {
        let samples = rows
            .into_iter()
            .map(|(jd, values)| EphemerisSample {
                instant: Instant::from_julian_day(jd),
                values: values.into_iter().collect(),
            })
            .collect();
        Self::new(samples)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of columns per sample.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn samples(&self) -> &[EphemerisSample] {
        &self.samples
    }

    /// Bounds of the 5-point interpolation window, `(t₂, t_{n−3})`.
    ///
    /// For series shorter than five samples the window is empty and `None` is returned.
    pub fn valid_range(&self) -> Option<(Instant, Instant)> {
        let n = self.samples.len();
        if n < 5 {
            return None;
        }
        Some((self.samples[2].instant, self.samples[n - 3].instant))
    }

    fn out_of_range(&self, at: Instant) -> AlmagestError {
        // an empty window is reported with reversed bounds
        let (first_valid, last_valid) = match self.valid_range() {
            Some((first, last)) => (first.julian_day(), last.julian_day()),
            None => (
                self.samples[self.samples.len() - 1].instant.julian_day(),
                self.samples[0].instant.julian_day(),
            ),
        };
        AlmagestError::OutOfRange {
            requested: at.julian_day(),
            first_valid,
            last_valid,
        }
    }

    /// Index of the tabulated row the 5-point window is centered on.
    fn center_index(&self, at: Instant) -> Result<usize, AlmagestError> {
        let (first, last) = self.valid_range().ok_or_else(|| self.out_of_range(at))?;
        let t = at.julian_day();
        // written so that NaN falls outside
        if !(t >= first.julian_day() && t <= last.julian_day()) {
            return Err(self.out_of_range(at));
        }

        // t >= t₂ guarantees at least three rows satisfy the predicate
        let lower = self.samples.partition_point(|s| s.instant.julian_day() <= t) - 1;
        let upper = lower + 1;

        let d_lower = t - self.samples[lower].instant.julian_day();
        let d_upper = self.samples[upper].instant.julian_day() - t;
        Ok(if d_upper < d_lower { upper } else { lower })
    }

    /// Interpolate every column at `at`.
    ///
    /// See also
    /// --------
    /// * [`interpolate`] – free-function form.
    pub fn interpolate(&self, at: Instant) -> Result<SampleValues, AlmagestError> {
        let c = self.center_index(at)?;
        let window = &self.samples[c - 2..=c + 2];

        let t_c = window[2].instant.julian_day();
        let t_next = window[3].instant.julian_day();
        let n = (at.julian_day() - t_c) / (t_next - t_c);

        Ok((0..self.width)
            .map(|col| {
                bessel5(
                    [
                        window[0].values[col],
                        window[1].values[col],
                        window[2].values[col],
                        window[3].values[col],
                        window[4].values[col],
                    ],
                    n,
                )
            })
            .collect())
    }
}

/// Interpolate all columns of `series` at `at`.
///
/// Arguments
/// ---------
/// * `series`: the tabulated series.
/// * `at`: the requested instant.
///
/// Return
/// ------
/// * One value per column, or [`AlmagestError::OutOfRange`] when `at` lies outside
///   `[t₂, t_{n−3}]`.
pub fn interpolate(series: &EphemerisSeries, at: Instant) -> Result<SampleValues, AlmagestError> {
    series.interpolate(at)
}

/// 5-point Bessel interpolation around `y[2]`, with `n` the fraction of the interval
/// `[t₂, t₃]` (negative values reach back toward `t₁`).
fn bessel5(y: [f64; 5], n: f64) -> f64 {
    let a = y[1] - y[0];
    let b = y[2] - y[1];
    let c = y[3] - y[2];
    let d = y[4] - y[3];

    let e = b - a;
    let f = c - b;
    let g = d - c;

    let h = f - e;
    let j = g - f;

    let k = j - h;

    let n2 = n * n;
    y[2] + n / 2.0 * (b + c) + n2 / 2.0 * f + n * (n2 - 1.0) / 12.0 * (h + j)
        + n2 * (n2 - 1.0) / 24.0 * k
}

#[cfg(test)]
mod interpolation_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cubic(t: f64) -> f64 {
        0.5 * t * t * t - 2.0 * t * t + 3.0 * t - 7.0
    }

    fn cubic_series() -> EphemerisSeries {
        EphemerisSeries::from_rows((0..10).map(|i| {
            let t = 2_451_545.0 + i as f64;
            (t, [cubic(i as f64), (0.2 * i as f64).sin()])
        }))
        .unwrap()
    }

    #[test]
    fn test_reproduces_table_rows() {
        let series = cubic_series();
        for sample in &series.samples()[2..=7] {
            let values = series.interpolate(sample.instant).unwrap();
            assert_eq!(values.as_slice(), sample.values.as_slice());
        }
    }

    #[test]
    fn test_cubic_is_exact() {
        let series = cubic_series();
        for x in [2.0, 2.25, 3.5, 4.49, 4.51, 6.999, 7.0] {
            let values = series.interpolate(Instant::from_julian_day(2_451_545.0 + x)).unwrap();
            assert_abs_diff_eq!(values[0], cubic(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sine_is_close() {
        let series = cubic_series();
        let values = series.interpolate(Instant::from_julian_day(2_451_549.3)).unwrap();
        assert_abs_diff_eq!(values[1], (0.2 * 4.3_f64).sin(), epsilon = 1e-5);
    }

    #[test]
    fn test_out_of_window() {
        let series = cubic_series();
        for x in [-1.0, 0.0, 1.0, 1.999, 7.001, 9.0, 12.0] {
            let at = Instant::from_julian_day(2_451_545.0 + x);
            assert_eq!(
                series.interpolate(at),
                Err(AlmagestError::OutOfRange {
                    requested: at.julian_day(),
                    first_valid: 2_451_547.0,
                    last_valid: 2_451_552.0,
                })
            );
        }
        assert!(series
            .interpolate(Instant::from_julian_day(f64::NAN))
            .is_err());
    }

    #[test]
    fn test_short_series_has_no_window() {
        let series =
            EphemerisSeries::from_rows((0..4).map(|i| (i as f64, [i as f64]))).unwrap();
        assert!(series.valid_range().is_none());
        assert!(matches!(
            series.interpolate(Instant::from_julian_day(1.5)),
            Err(AlmagestError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_series_validation() {
        assert_eq!(
            EphemerisSeries::new(vec![]),
            Err(AlmagestError::InvalidSeries("series is empty".into()))
        );
        let bad_order = EphemerisSeries::from_rows([(2.0, vec![1.0]), (1.0, vec![1.0])]);
        assert!(matches!(bad_order, Err(AlmagestError::InvalidSeries(_))));

        let ragged = EphemerisSeries::from_rows([(1.0, vec![1.0]), (2.0, vec![1.0, 2.0])]);
        assert_eq!(
            ragged,
            Err(AlmagestError::InvalidSeries(
                "sample 1 has 2 values, expected 1".into()
            ))
        );

        let duplicate = EphemerisSeries::from_rows([(1.0, vec![1.0]), (1.0, vec![1.0])]);
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_nearest_center_is_continuous() {
        // crossing the midpoint between two rows switches the central row
        let series = cubic_series();
        let before = series.interpolate(Instant::from_julian_day(2_451_549.5 - 1e-9)).unwrap();
        let after = series.interpolate(Instant::from_julian_day(2_451_549.5 + 1e-9)).unwrap();
        assert_abs_diff_eq!(before[0], after[0], epsilon = 1e-7);
        assert_abs_diff_eq!(before[1], after[1], epsilon = 1e-5);
    }
}
