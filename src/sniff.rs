//! HEIC format sniffing
//!
//! An HEIC file is an ISO-BMFF container: a 4-byte box size followed by the
//! `ftyp` box type and the major brand. Comparing the 8 bytes at offset 4
//! against `ftypheic` / `ftyphevc` is enough to classify the stream without
//! parsing any boxes.

use std::io::SeekFrom;

use crate::Source;
use crate::config::TranslatorConfig;
use crate::error::{Result, TranslateError, io_error};
use crate::format::{FormatDescriptor, TypeCode};

/// Bytes inspected at the start of the stream
pub const SNIFF_LEN: usize = 12;

/// Why a stream was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer than [`SNIFF_LEN`] bytes in the stream
    NeedMoreData {
        /// Bytes that were available
        available: usize,
    },
    /// Brand signature is not a recognized HEIC brand
    InvalidFormat,
    /// Caller asked for an output type this translator cannot write
    UnsupportedOutput,
}

impl From<Rejection> for TranslateError {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::NeedMoreData { available } => Self::InsufficientData {
                needed: SNIFF_LEN,
                available,
            },
            Rejection::InvalidFormat => Self::UnsupportedInput,
            Rejection::UnsupportedOutput => Self::UnsupportedOutput,
        }
    }
}

/// Outcome of [`identify`]
#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    /// Stream is HEIC
    Accepted(FormatDescriptor),
    /// Stream is not handled by this translator
    Rejected(Rejection),
}

impl Identification {
    /// Whether the stream was accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The reported format, if accepted
    #[must_use]
    pub fn accepted(&self) -> Option<&FormatDescriptor> {
        match self {
            Self::Accepted(format) => Some(format),
            Self::Rejected(_) => None,
        }
    }
}

/// Classify a byte prefix.
///
/// `prefix` is the start of the stream; anything beyond [`SNIFF_LEN`]
/// bytes is ignored.
#[must_use]
pub fn classify(config: &TranslatorConfig, prefix: &[u8]) -> Identification {
    if prefix.len() < SNIFF_LEN {
        return Identification::Rejected(Rejection::NeedMoreData {
            available: prefix.len(),
        });
    }
    let brand = &prefix[4..SNIFF_LEN];
    if config.brands.iter().any(|b| b.as_slice() == brand) {
        Identification::Accepted(FormatDescriptor::heic(
            config.identify_quality,
            config.identify_capability,
        ))
    } else {
        Identification::Rejected(Rejection::InvalidFormat)
    }
}

/// Decide whether `source` holds a HEIC image.
///
/// Reads at most [`SNIFF_LEN`] bytes from the start of the stream and
/// restores the original position before returning, whatever the outcome.
/// A requested output type other than one the translator writes is
/// rejected without touching the stream.
///
/// # Errors
///
/// Returns an error only if the stream itself fails (seek or read).
/// Unrecognized or short input is a [`Identification::Rejected`], not an
/// error.
pub fn identify(
    config: &TranslatorConfig,
    source: &mut dyn Source,
    requested: Option<TypeCode>,
) -> Result<Identification> {
    if let Some(out) = requested
        && !config.writes(out)
    {
        log::debug!("identify: output type {out} not supported");
        return Ok(Identification::Rejected(Rejection::UnsupportedOutput));
    }

    let origin = source.stream_position().map_err(io_error)?;
    let mut prefix = [0u8; SNIFF_LEN];
    let read = source
        .seek(SeekFrom::Start(0))
        .and_then(|_| read_up_to(source, &mut prefix));
    // Restore before looking at the read result so errors don't move the stream.
    source.seek(SeekFrom::Start(origin)).map_err(io_error)?;
    let filled = read.map_err(io_error)?;

    let outcome = classify(config, &prefix[..filled]);
    match &outcome {
        Identification::Accepted(format) => {
            log::debug!("identify: accepted as {} ({})", format.name, format.mime)
        }
        Identification::Rejected(reason) => {
            log::debug!("identify: rejected ({reason:?}, {filled} bytes inspected)")
        }
    }
    Ok(outcome)
}

/// Fill as much of `buf` as the stream allows, stopping at EOF.
pub(crate) fn read_up_to(reader: &mut dyn Source, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
