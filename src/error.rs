use std::io;
use thiserror::Error;

/// A single failed decode attempt: the encoding tried and why it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    /// Canonical name of the encoding that was tried.
    pub encoding: &'static str,
    /// Why the attempt failed (malformed bytes or a JSON syntax error).
    pub reason: String,
}

impl std::fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.encoding, self.reason)
    }
}

/// Error type for JSON inspection operations.
#[derive(Error, Debug)]
pub enum InspectError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Empty file or no data.
    #[error("Empty file or no data to analyze")]
    EmptyData,

    /// Input exceeded the configured size limit.
    #[error("Input is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: usize },

    /// Every candidate encoding failed to produce parseable JSON.
    #[error("Could not decode JSON with any candidate encoding ({})", join_attempts(.0))]
    Undecodable(Vec<DecodeAttempt>),

    /// Encoding label not recognised.
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

fn join_attempts(attempts: &[DecodeAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for inspection operations.
pub type Result<T> = std::result::Result<T, InspectError>;
