use thiserror::Error;

use crate::constants::JulianDay;
use crate::coordinates::{CoordinateFrameOrigin, CoordinateFrameType};
use crate::events::EventKind;

#[derive(Error, Debug)]
pub enum AlmagestError {
    #[error(
        "Requested instant JD {requested} is outside the interpolation window [{first_valid}, {last_valid}]"
    )]
    OutOfRange {
        requested: JulianDay,
        first_valid: JulianDay,
        last_valid: JulianDay,
    },

    #[error("Invalid ephemeris series: {0}")]
    InvalidSeries(String),

    #[error("Unable to parse table line {line}: {reason}")]
    TableParse { line: usize, reason: String },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No rotation table registered for frame type {0:?}")]
    MissingRotationTable(CoordinateFrameType),

    #[error("Invalid coordinate frame: {0}")]
    InvalidFrame(String),

    #[error("Cannot rotate a positional coordinate from origin {from:?} to origin {to:?}")]
    OriginMismatch {
        from: CoordinateFrameOrigin,
        to: CoordinateFrameOrigin,
    },

    #[error("Invalid geographic location: {0}")]
    InvalidLocation(String),

    #[error("No ephemeris registered for body: {0}")]
    UnknownBody(String),

    #[error("Refinement of {event:?} did not converge after {iterations} iterations")]
    ConvergenceFailure { event: EventKind, iterations: usize },

    #[error("Invalid event solver parameter: {0}")]
    InvalidSolverParameter(String),
}

impl PartialEq for AlmagestError {
    fn eq(&self, other: &Self) -> bool {
        use AlmagestError::*;
        match (self, other) {
            (
                OutOfRange {
                    requested: a,
                    first_valid: b,
                    last_valid: c,
                },
                OutOfRange {
                    requested: x,
                    first_valid: y,
                    last_valid: z,
                },
            ) => a == x && b == y && c == z,
            (InvalidSeries(a), InvalidSeries(b)) => a == b,
            (TableParse { line: a, reason: b }, TableParse { line: x, reason: y }) => {
                a == x && b == y
            }

            // io::Error is not comparable: same variant is enough
            (IoError(_), IoError(_)) => true,

            (MissingRotationTable(a), MissingRotationTable(b)) => a == b,
            (InvalidFrame(a), InvalidFrame(b)) => a == b,
            (OriginMismatch { from: a, to: b }, OriginMismatch { from: x, to: y }) => {
                a == x && b == y
            }
            (InvalidLocation(a), InvalidLocation(b)) => a == b,
            (UnknownBody(a), UnknownBody(b)) => a == b,
            (
                ConvergenceFailure {
                    event: a,
                    iterations: b,
                },
                ConvergenceFailure {
                    event: x,
                    iterations: y,
                },
            ) => a == x && b == y,
            (InvalidSolverParameter(a), InvalidSolverParameter(b)) => a == b,

            _ => false,
        }
    }
}
