use std::io;
use thiserror::Error;

/// Errors produced while decoding header bytes.
///
/// Every variant is terminal for the decode call that produced it; nothing
/// is repaired or skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Truncated input: expected {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    #[error("Malformed numeric field: {0}")]
    MalformedNumericField(&'static str),

    #[error("Header record size {declared} does not match {expected} computed from the signal count")]
    InconsistentHeaderSize { declared: usize, expected: usize },

    #[error("Invalid digital/physical scaling for signal {0}")]
    InvalidScaling(usize),

    #[error("Invalid number of samples per data record for signal {0}")]
    InvalidSampleCount(usize),

    #[error("Unsupported EDF version: {0:?}")]
    UnsupportedVersion(String),

    #[error("Malformed date/time field: {0}")]
    MalformedDateTime(&'static str),

    #[error("Field {0} contains characters outside printable ASCII")]
    NonAsciiField(&'static str),
}

/// Errors produced while building or encoding a header.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("Value does not fit in field {0}")]
    FieldTooLong(&'static str),

    #[error("Field {0} contains characters outside printable ASCII")]
    NonAsciiField(&'static str),

    #[error("Digital min must be below digital max and physical min must differ from physical max")]
    InvalidScaling,

    #[error("Invalid data record duration: {0}")]
    InvalidDuration(f64),

    #[error("Year {0} cannot be stored in a two-digit EDF date (1985..=2084)")]
    DateOutOfRange(i32),
}

/// Errors from operations that touch a byte source or sink.
#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

pub type Result<T> = std::result::Result<T, EdfError>;
