/*!
 * Error types for the subresync application.
 *
 * This module contains custom error types for the different stages of a
 * conversion, using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing subtitle text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: {reason}: {content:?}")]
pub struct FormatError {
    /// 1-based line number of the offending line
    pub line: usize,

    /// The offending line, as found in the input
    pub content: String,

    /// What was expected at that point
    pub reason: String,
}

impl FormatError {
    pub fn new(line: usize, content: &str, reason: impl Into<String>) -> Self {
        Self {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the timing transform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimingError {
    /// Scale factor that cannot be used as a divisor
    #[error("invalid scale factor {0}: must be a finite number greater than zero")]
    InvalidScaleFactor(f64),

    /// Transform produced a negative or non-finite timestamp
    #[error("cue {cue}: transform produced an invalid timestamp ({start}, {end})")]
    InvalidTimestamp { cue: usize, start: f64, end: f64 },

    /// Transform produced a cue ending before it starts
    #[error("cue {cue}: transform produced an inverted range {start_ms}ms > {end_ms}ms")]
    InvertedRange { cue: usize, start_ms: u64, end_ms: u64 },

    /// An offset moved a timestamp before the start of the track
    #[error("cue {cue}: offset {offset_ms}ms moves the cue before 0")]
    NegativeOffset { cue: usize, offset_ms: i64 },
}

/// Styling that the target format cannot represent.
///
/// Never aborts a conversion: the styling is dropped and this value is
/// collected as a warning alongside the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cue {cue}: {feature} is not supported by {target} and was dropped")]
pub struct UnsupportedFeatureError {
    /// 1-based cue number in the serialized output
    pub cue: usize,

    /// Human-readable description of the dropped feature
    pub feature: String,

    /// Name of the target format
    pub target: &'static str,
}

/// Errors from the in-memory conversion pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Error from the parser
    #[error("parse error: {0}")]
    Format(#[from] FormatError),

    /// Error from the timing transform
    #[error("timing error: {0}")]
    Timing(#[from] TimingError),
}

impl ConvertError {
    /// Name of the pipeline stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Format(_) => "parse",
            Self::Timing(_) => "timing",
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error reading the input or writing the output
    #[error("{stage} failed for {}: {source}", .path.display())]
    Io {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the conversion pipeline
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Warnings were produced and the caller asked for them to block writing
    #[error("{count} unsupported feature warning(s) in strict mode, output not written")]
    Warnings { count: usize },

    /// Output exists and overwriting was not requested
    #[error("output file already exists: {} (use -f to overwrite)", .0.display())]
    OutputExists(PathBuf),

    /// Two inputs of one batch map to the same output file
    #[error("{} would overwrite {}, already written from {} in this batch", .input.display(), .output.display(), .first.display())]
    OutputCollision { input: PathBuf, output: PathBuf, first: PathBuf },

    /// Some files of a batch failed
    #[error("{failed} of {total} file(s) failed to convert")]
    Batch { failed: usize, total: usize },
}

impl AppError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { stage: "read", path: path.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { stage: "write", path: path.into(), source }
    }

    /// Name of the stage that failed, for the error stream
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Io { stage, .. } => *stage,
            Self::Convert(e) => e.stage(),
            Self::Warnings { .. } => "serialize",
            Self::OutputExists(_) | Self::OutputCollision { .. } => "write",
            Self::Batch { .. } => "batch",
        }
    }
}
