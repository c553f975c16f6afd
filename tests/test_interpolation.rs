mod common;

use std::io::Write;

use almagest::almagest_errors::AlmagestError;
use almagest::interpolation::{interpolate, table_reader};
use almagest::time::Instant;
use approx::assert_abs_diff_eq;
use camino::Utf8Path;
use common::{sun_direction, sun_series, SUN_JD0};

fn sun_table_text() -> String {
    let mut text = String::from("# geocentric Sun, unit vectors\n\n");
    for d in -10..=10 {
        let jd = SUN_JD0 + d as f64;
        let [x, y, z] = sun_direction(jd);
        text.push_str(&format!("{jd:.1} | {x:.12} | {y:.12} | {z:.12} |\n"));
    }
    text
}

#[test]
fn test_sun_table_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sun_table_text().as_bytes()).unwrap();
    let path = Utf8Path::from_path(file.path()).unwrap();

    let series = table_reader::from_file(path).unwrap();
    assert_eq!(series.len(), 21);
    assert_eq!(series.width(), 3);

    let (first, last) = series.valid_range().unwrap();
    assert_eq!(first, Instant::from_julian_day(SUN_JD0 - 8.0));
    assert_eq!(last, Instant::from_julian_day(SUN_JD0 + 8.0));

    // a day-spaced table of the solar direction is good to better than 1e-9 between rows
    for hours in [0.0, 3.5, 12.0, 17.25, 23.9] {
        let jd = SUN_JD0 + hours / 24.0;
        let values = interpolate(&series, Instant::from_julian_day(jd)).unwrap();
        let expected = sun_direction(jd);
        for col in 0..3 {
            assert_abs_diff_eq!(values[col], expected[col], epsilon = 1e-9);
        }
    }
}

#[test]
fn test_tabulated_rows_are_exact() {
    let series = sun_series(SUN_JD0);
    for sample in &series.samples()[2..series.len() - 2] {
        let values = series.interpolate(sample.instant).unwrap();
        assert_eq!(values.as_slice(), sample.values.as_slice());
    }
}

#[test]
fn test_no_extrapolation() {
    let series = sun_series(SUN_JD0);
    for jd in [
        SUN_JD0 - 8.0 - 1e-6,
        SUN_JD0 + 8.0 + 1e-6,
        SUN_JD0 - 10.0,
        SUN_JD0 + 10.0,
        SUN_JD0 + 42.0,
    ] {
        assert_eq!(
            series.interpolate(Instant::from_julian_day(jd)),
            Err(AlmagestError::OutOfRange {
                requested: jd,
                first_valid: SUN_JD0 - 8.0,
                last_valid: SUN_JD0 + 8.0,
            })
        );
    }
}

#[test]
fn test_missing_file() {
    let result = table_reader::from_file(Utf8Path::new("does/not/exist.tab"));
    assert!(matches!(result, Err(AlmagestError::IoError(_))));
}
