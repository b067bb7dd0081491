//! Crate-wide error type.
//!
//! Mirrors the teacher crate's top-level `Error`: a plain enum with a
//! hand-written [`Display`] and [`std::error::Error`] impl rather than a
//! `thiserror` derive, since nothing in this crate's dependency stack pulls
//! `thiserror` in for any other reason.

use crate::rtp::RtpDecodeError;
use std::fmt;

/// Errors returned by the jitter buffer's public operations.
#[derive(Debug)]
pub enum Error {
    /// The packet's RTP header failed to parse; the packet was dropped.
    Decode(RtpDecodeError),
    /// No clock rate has been resolved for the stream yet.
    NotNegotiated,
    /// The element is mid-flush; the call performed no work.
    Flushing,
    /// End-of-stream has already been reached.
    Eos,
    /// The downstream consumer returned an error; it is stored as the
    /// element's `src_result` and all subsequent calls will see it until a
    /// flush-stop recovers the element.
    Downstream(String),
    /// A segment event was received with a time-format other than "time".
    InvalidSegment,
    /// A configuration value was out of range.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "RTP decode error: {e}"),
            Error::NotNegotiated => write!(f, "clock rate not negotiated"),
            Error::Flushing => write!(f, "jitter buffer is flushing"),
            Error::Eos => write!(f, "end of stream reached"),
            Error::Downstream(msg) => write!(f, "downstream push failed: {msg}"),
            Error::InvalidSegment => write!(f, "segment event rejected: time_format must be \"time\""),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RtpDecodeError> for Error {
    fn from(e: RtpDecodeError) -> Self {
        Error::Decode(e)
    }
}

/// Convenient alias for API results using the crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
