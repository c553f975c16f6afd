//! # Pipe-delimited table reader
//!
//! Ephemeris and rotation-angle tables are distributed as plain text, one sample per line:
//!
//! ```text
//! 2451545.0|-0.1771354|0.8874063|0.3847268
//! 2451546.0|-0.1943437|0.8839271|0.3832186|
//! ```
//!
//! * the first field is a Julian Day, the others are the sample values,
//! * lines with fewer than two fields (blank lines, headers without `|`) are skipped,
//! * blanks around fields and one trailing `|` are accepted,
//! * any other malformed line is rejected with [`AlmagestError::TableParse`].

use camino::Utf8Path;
use nom::{
    character::complete::{char, space0},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, terminated},
    IResult, Parser,
};
use tracing::{debug, trace};

use super::{EphemerisSample, EphemerisSeries};
use crate::{almagest_errors::AlmagestError, time::Instant};

fn parse_field(input: &str) -> IResult<&str, f64> {
    delimited(space0, double, space0).parse(input)
}

fn parse_row(input: &str) -> IResult<&str, Vec<f64>> {
    all_consuming(terminated(
        separated_list1(char('|'), parse_field),
        opt(terminated(char('|'), space0)),
    ))
    .parse(input)
}

fn field_count(line: &str) -> usize {
    let line = line.trim_end();
    let line = line.strip_suffix('|').unwrap_or(line);
    if line.trim().is_empty() {
        0
    } else {
        line.split('|').count()
    }
}

/// Parse a whole table held in memory.
///
/// Arguments
/// ---------
/// * `content`: the table text.
///
/// Return
/// ------
/// * the validated [`EphemerisSeries`], a [`AlmagestError::TableParse`] with the 1-based
///   line number of the first malformed row, or [`AlmagestError::InvalidSeries`] if the rows
///   do not form a valid series.
pub fn from_table_str(content: &str) -> Result<EphemerisSeries, AlmagestError> {
    let mut samples = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if field_count(line) < 2 {
            trace!(line = index + 1, "skipping table line with fewer than two fields");
            continue;
        }

        let (_, fields) = parse_row(line).map_err(|e| AlmagestError::TableParse {
            line: index + 1,
            reason: e.to_string(),
        })?;

        samples.push(EphemerisSample::new(
            Instant::from_julian_day(fields[0]),
            &fields[1..],
        ));
    }

    let series = EphemerisSeries::new(samples)?;
    debug!(
        rows = series.len(),
        columns = series.width(),
        "parsed ephemeris table"
    );
    Ok(series)
}

/// Read and parse a table file.
///
/// See also
/// --------
/// * [`from_table_str`] – the parser applied to the file content.
pub fn from_file(path: &Utf8Path) -> Result<EphemerisSeries, AlmagestError> {
    let content = std::fs::read_to_string(path)?;
    debug!(%path, "reading ephemeris table");
    from_table_str(&content)
}

#[cfg(test)]
mod table_reader_test {
    use super::*;
    use camino::Utf8PathBuf;
    use std::io::Write;

    const TABLE: &str = "\
# Venus geocentric, AU
2447238.5|-0.5|0.25|0.1
2447239.5 | -0.4 | 0.26 | 0.11 |

2447240.5|-0.3|0.27|0.12
";

    #[test]
    fn test_parse_table() {
        let series = from_table_str(TABLE).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.width(), 3);
        assert_eq!(series.samples()[1].instant.julian_day(), 2447239.5);
        assert_eq!(series.samples()[1].values.as_slice(), &[-0.4, 0.26, 0.11]);
    }

    #[test]
    fn test_malformed_line() {
        let err = from_table_str("2447238.5|1.0\n2447239.5|abc\n").unwrap_err();
        assert!(matches!(err, AlmagestError::TableParse { line: 2, .. }));

        let err = from_table_str("2447238.5|1.0||2.0\n").unwrap_err();
        assert!(matches!(err, AlmagestError::TableParse { line: 1, .. }));
    }

    #[test]
    fn test_ragged_table_is_invalid() {
        let err = from_table_str("1.0|2.0\n2.0|3.0|4.0\n").unwrap_err();
        assert!(matches!(err, AlmagestError::InvalidSeries(_)));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert_eq!(
            from_table_str("JD\n\n").unwrap_err(),
            AlmagestError::InvalidSeries("series is empty".into())
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();

        let series = from_file(&path).unwrap();
        assert_eq!(series.len(), 3);

        let missing = Utf8PathBuf::from("/definitely/not/here.tbl");
        assert!(matches!(
            from_file(&missing),
            Err(AlmagestError::IoError(_))
        ));
    }
}
