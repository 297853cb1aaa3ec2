//! HEIC to bitmap translator
//!
//! Recognizes HEIC streams from their `ftyp` brand, decodes the primary
//! image through an external HEIF decoder, and re-emits it as a generic
//! bitmap: a 32-byte big-endian header followed by row-major RGBA pixels.
//!
//! # Example
//!
//! ```ignore
//! use heic_translator::{HeicTranslator, Translator, TypeCode};
//! use heic_translator::decoder::LibHeifDecoder;
//!
//! let translator = HeicTranslator::new(LibHeifDecoder::new());
//! let mut input = std::fs::File::open("image.heic")?;
//! if translator.identify(&mut input, None)?.is_accepted() {
//!     let mut out = Vec::new();
//!     let header = translator.translate(&mut input, TypeCode::HEIC, None, &mut out)?;
//!     println!("{}x{}", header.bounds.width(), header.bounds.height());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod bitmap;
pub mod config;
pub mod decoder;
mod error;
pub mod format;
pub mod mime;
pub mod registry;
pub mod sniff;
pub mod swizzle;
pub mod translate;

pub use bitmap::{BitmapHeader, Bounds, OutputBitmap};
pub use config::{TranslatorConfig, TranslatorSettings};
pub use decoder::HeifDecoder;
pub use error::{DecodeError, ErrorKind, Result, TranslateError};
pub use format::{FormatDescriptor, TypeCode};
pub use sniff::{Identification, Rejection};

use std::io::{Read, Seek, Write};

/// A seekable input stream
pub trait Source: Read + Seek {}

impl<T: Read + Seek> Source for T {}

/// The two operations a host drives on a translator
pub trait Translator {
    /// Immutable configuration: name, formats, settings
    fn config(&self) -> &TranslatorConfig;

    /// Classify `source` without moving its read position.
    ///
    /// # Errors
    ///
    /// Only stream failures are errors; unrecognized input is
    /// [`Identification::Rejected`].
    fn identify(
        &self,
        source: &mut dyn Source,
        requested: Option<TypeCode>,
    ) -> Result<Identification>;

    /// Translate all of `source` into `out`, returning the header written.
    ///
    /// # Errors
    ///
    /// Any [`TranslateError`]; see [`TranslateError::kind`] for the host
    /// classification.
    fn translate(
        &self,
        source: &mut dyn Source,
        source_type: TypeCode,
        output_type: Option<TypeCode>,
        out: &mut dyn Write,
    ) -> Result<BitmapHeader>;
}

/// HEIC translator over a decoder backend
#[derive(Debug)]
pub struct HeicTranslator<D> {
    config: TranslatorConfig,
    decoder: D,
}

impl<D: HeifDecoder> HeicTranslator<D> {
    /// Translator with the default configuration
    #[must_use]
    pub fn new(decoder: D) -> Self {
        Self::with_config(TranslatorConfig::new(), decoder)
    }

    /// Translator with an explicit configuration
    #[must_use]
    pub fn with_config(config: TranslatorConfig, decoder: D) -> Self {
        Self { config, decoder }
    }

    /// Persisted settings. Carried for the host; translation ignores them.
    #[must_use]
    pub fn settings(&self) -> TranslatorSettings {
        self.config.settings()
    }

    /// The decoder backend
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decode an in-memory HEIC file to a bitmap without touching streams.
    ///
    /// # Errors
    ///
    /// Decode-class errors, see [`translate::transcode`].
    pub fn transcode(&self, data: &[u8]) -> Result<OutputBitmap> {
        translate::transcode(&self.config, &self.decoder, data)
    }
}

impl<D: HeifDecoder> Translator for HeicTranslator<D> {
    fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    fn identify(
        &self,
        source: &mut dyn Source,
        requested: Option<TypeCode>,
    ) -> Result<Identification> {
        sniff::identify(&self.config, source, requested)
    }

    fn translate(
        &self,
        source: &mut dyn Source,
        source_type: TypeCode,
        output_type: Option<TypeCode>,
        out: &mut dyn Write,
    ) -> Result<BitmapHeader> {
        translate::translate(
            &self.config,
            &self.decoder,
            source,
            source_type,
            output_type,
            out,
        )
    }
}
