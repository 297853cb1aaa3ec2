//! Translator configuration
//!
//! A [`TranslatorConfig`] is built once at startup and handed by reference
//! to the sniffer and the engine. There is no module-level mutable state.

use alloc::vec::Vec;

use crate::format::{FormatDescriptor, TypeCode};

/// Brand signatures accepted at byte offset 4 of the stream
pub const HEIC_BRANDS: [[u8; 8]; 2] = [*b"ftypheic", *b"ftyphevc"];

/// Translator version, packed the way the host expects
/// (`major << 8 | minor << 4 | revision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Major version
    pub major: u8,
    /// Minor version, 0..=15
    pub minor: u8,
    /// Revision, 0..=15
    pub revision: u8,
}

impl Version {
    /// Packed host representation
    #[must_use]
    pub const fn packed(self) -> u32 {
        ((self.major as u32) << 8)
            | (((self.minor & 0xF) as u32) << 4)
            | (self.revision & 0xF) as u32
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// User-facing settings the host can persist.
///
/// Both toggles are recognized and carried but are not consulted by
/// translation: every translate call emits header and data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatorSettings {
    /// Emit only the bitmap header
    pub header_only: bool,
    /// Emit only the pixel data
    pub data_only: bool,
}

/// Application signature the translator registers under
pub const TRANSLATOR_SIGNATURE: &str = "application/x-vnd.Haiku-HEICTranslator";

/// Immutable translator configuration
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Unique identifier, used as the registry key
    pub signature: &'static str,
    /// Short translator name
    pub name: &'static str,
    /// Longer description shown by the host
    pub info: &'static str,
    /// Translator version
    pub version: Version,
    /// Formats this translator reads
    pub input_formats: Vec<FormatDescriptor>,
    /// Formats this translator writes
    pub output_formats: Vec<FormatDescriptor>,
    /// Brand signatures compared against bytes 4..12 of the stream
    pub brands: Vec<[u8; 8]>,
    /// Quality reported for accepted streams
    pub identify_quality: f32,
    /// Capability reported for accepted streams
    pub identify_capability: f32,
    row_alignment: usize,
    settings: TranslatorSettings,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslatorConfig {
    /// Configuration for the HEIC translator
    #[must_use]
    pub fn new() -> Self {
        let identify_quality = 0.9;
        let identify_capability = 0.8;
        Self {
            signature: TRANSLATOR_SIGNATURE,
            name: "HEIC Images",
            info: "HEIC image translator",
            version: Version {
                major: 1,
                minor: 0,
                revision: 0,
            },
            input_formats: alloc::vec![FormatDescriptor::heic(
                identify_quality,
                identify_capability
            )],
            output_formats: alloc::vec![FormatDescriptor::bitmap()],
            brands: HEIC_BRANDS.to_vec(),
            identify_quality,
            identify_capability,
            row_alignment: 4,
            settings: TranslatorSettings::default(),
        }
    }

    /// Set the byte alignment of output rows. Must be a power of two.
    ///
    /// Returns `None` for zero or a non-power-of-two alignment.
    #[must_use]
    pub fn with_row_alignment(mut self, alignment: usize) -> Option<Self> {
        if !alignment.is_power_of_two() {
            return None;
        }
        self.row_alignment = alignment;
        Some(self)
    }

    /// Replace the persisted settings
    #[must_use]
    pub fn with_settings(mut self, settings: TranslatorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Output row alignment in bytes
    #[must_use]
    pub fn row_alignment(&self) -> usize {
        self.row_alignment
    }

    /// Persisted settings
    #[must_use]
    pub fn settings(&self) -> TranslatorSettings {
        self.settings
    }

    /// Output row length for an image of `width` pixels at 4 bytes each.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn row_bytes(&self, width: u32) -> Option<usize> {
        let min = (width as usize).checked_mul(4)?;
        let mask = self.row_alignment - 1;
        Some(min.checked_add(mask)? & !mask)
    }

    /// Whether `code` names an output type this translator writes
    #[must_use]
    pub fn writes(&self, code: TypeCode) -> bool {
        self.output_formats.iter().any(|f| f.type_code == code)
    }

    /// Whether `code` names an input type this translator reads
    #[must_use]
    pub fn reads(&self, code: TypeCode) -> bool {
        self.input_formats.iter().any(|f| f.type_code == code)
    }
}
