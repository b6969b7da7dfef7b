use thiserror::Error;

use crate::wire::ParseError;

/// Errors that propagate out of the reflector core.
///
/// Most per-packet failures (parse errors, capacity limits,
/// blocklist hits, send failures) are recovered inline and never reach this
/// type; it exists for startup/config/bind failures that must fail the
/// process, plus the handful of fallible library entry points (config
/// loading, bit-codec conversions) that callers may want typed access to.
#[derive(Error, Debug)]
pub enum ReflectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("wire codec error: {0}")]
    Parse(#[from] ParseError),

    #[error("registry at capacity")]
    Capacity,

    #[error("callsign is blocklisted: {0}")]
    Blocked(String),

    #[error("bit codec conversion error: {0}")]
    Conversion(String),

    #[error("DMR network error: {0}")]
    DmrNetwork(String),
}

pub type Result<T> = std::result::Result<T, ReflectorError>;
