//! Type codes and format descriptors shared by the sniffer and the engine

/// Four-character code identifying a data type to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeCode(pub [u8; 4]);

impl TypeCode {
    /// Generic bitmap type; also the output magic
    pub const BITMAP: Self = Self(*b"bits");
    /// HEIC source type
    pub const HEIC: Self = Self(*b"HEIC");

    /// Create from the first four bytes of a slice
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let code: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
        Some(Self(code))
    }

    /// Numeric value as the host sees it (`'bits'` == 0x6269_7473)
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Inverse of [`as_u32`](Self::as_u32)
    #[must_use]
    pub const fn from_u32(v: u32) -> Self {
        Self(v.to_be_bytes())
    }

    /// Convert to string for debugging
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl core::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 32-bit RGBA color space tag written into the bitmap header
pub const COLOR_SPACE_RGBA32: u32 = 0x2028;

/// MIME type reported for accepted HEIC streams
pub const HEIC_MIME: &str = "image/heic";

/// MIME type of the generic bitmap output
pub const BITMAP_MIME: &str = "image/x-be-bitmap";

/// A format the translator reads or writes
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    /// Type code of the format
    pub type_code: TypeCode,
    /// Group the format belongs to (always the bitmap group here)
    pub group: TypeCode,
    /// How well this translator handles the format, 0.0..=1.0
    pub quality: f32,
    /// How much of the format this translator supports, 0.0..=1.0
    pub capability: f32,
    /// MIME type
    pub mime: &'static str,
    /// Display name
    pub name: &'static str,
}

impl FormatDescriptor {
    /// The HEIC input format
    #[must_use]
    pub fn heic(quality: f32, capability: f32) -> Self {
        Self {
            type_code: TypeCode::HEIC,
            group: TypeCode::BITMAP,
            quality,
            capability,
            mime: HEIC_MIME,
            name: "HEIC Image",
        }
    }

    /// The generic bitmap output format
    #[must_use]
    pub fn bitmap() -> Self {
        Self {
            type_code: TypeCode::BITMAP,
            group: TypeCode::BITMAP,
            quality: 0.4,
            capability: 0.4,
            mime: BITMAP_MIME,
            name: "Bitmap Image",
        }
    }
}
