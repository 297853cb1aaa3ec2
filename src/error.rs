//! Error types for HEIC translation

use alloc::string::String;
use core::fmt;
use whereat::At;

/// Result type for translator operations, with error location tracking.
///
/// Errors carry a trace of where they were created and propagated,
/// accessible via [`At::full_trace()`] or [`At::last_error_trace()`].
pub type Result<T> = core::result::Result<T, At<TranslateError>>;

/// Coarse error classification reported to the host.
///
/// Every [`TranslateError`] collapses to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Stream prefix too short to classify
    InsufficientData,
    /// Source is not a recognized HEIC stream
    UnsupportedInput,
    /// Requested output type is not the generic bitmap type
    UnsupportedOutput,
    /// Short read or write on either stream
    IoError,
    /// The HEIF decoder rejected the content
    DecodeError,
}

/// Errors that can occur while identifying or translating a stream
#[derive(Debug)]
#[non_exhaustive]
pub enum TranslateError {
    /// Fewer bytes available than the sniffer needs
    InsufficientData {
        /// Bytes required
        needed: usize,
        /// Bytes actually available
        available: usize,
    },
    /// Source format tag or brand signature is not HEIC
    UnsupportedInput,
    /// Requested output type cannot be produced
    UnsupportedOutput,
    /// Underlying stream failure
    Io(std::io::Error),
    /// Fewer bytes moved than required
    ShortTransfer {
        /// What was being transferred
        what: &'static str,
        /// Bytes expected
        expected: u64,
        /// Bytes actually transferred
        actual: u64,
    },
    /// HEIF decoder failure
    Decode(DecodeError),
    /// Image geometry does not fit the bitmap header fields
    TooLarge(&'static str),
}

impl TranslateError {
    /// Host-facing classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::UnsupportedInput => ErrorKind::UnsupportedInput,
            Self::UnsupportedOutput => ErrorKind::UnsupportedOutput,
            Self::Io(_) | Self::ShortTransfer { .. } => ErrorKind::IoError,
            Self::Decode(_) | Self::TooLarge(_) => ErrorKind::DecodeError,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData { needed, available } => {
                write!(f, "insufficient data: need {needed} bytes, got {available}")
            }
            Self::UnsupportedInput => write!(f, "input is not a HEIC image"),
            Self::UnsupportedOutput => write!(f, "unsupported output type"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ShortTransfer {
                what,
                expected,
                actual,
            } => write!(f, "short {what}: expected {expected} bytes, got {actual}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::TooLarge(msg) => write!(f, "image too large: {msg}"),
        }
    }
}

impl core::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TranslateError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<DecodeError> for TranslateError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// Two-hop conversion for ? operator: DecodeError → At<TranslateError>
impl From<DecodeError> for At<TranslateError> {
    #[track_caller]
    fn from(e: DecodeError) -> Self {
        At::from(TranslateError::from(e))
    }
}

/// Wrap a stream error, recording the caller's location.
#[track_caller]
pub(crate) fn io_error(e: std::io::Error) -> At<TranslateError> {
    At::from(TranslateError::Io(e))
}

/// Errors reported by a HEIF decoder backend
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The container could not be parsed
    InvalidContainer(String),
    /// No primary image in the container
    NoPrimaryImage,
    /// The requested colorspace/chroma is not available
    UnsupportedChroma,
    /// The decoded image has no usable interleaved plane
    InvalidPlane(&'static str),
    /// Any other backend-specific failure
    Backend(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContainer(msg) => write!(f, "invalid HEIF container: {msg}"),
            Self::NoPrimaryImage => write!(f, "no primary image in container"),
            Self::UnsupportedChroma => write!(f, "unsupported colorspace or chroma"),
            Self::InvalidPlane(msg) => write!(f, "invalid decoded plane: {msg}"),
            Self::Backend(msg) => write!(f, "{msg}"),
        }
    }
}

impl core::error::Error for DecodeError {}
