//! Generic bitmap output format
//!
//! ```text
//! offset  size  field
//!      0     4  magic ('bits')
//!      4    16  bounds: left, top, right, bottom (i32 each)
//!     20     4  row_bytes (u32)
//!     24     4  color_space (u32)
//!     28     4  data_size (u32)
//!     32     -  pixel data, data_size bytes
//! ```
//!
//! Every multi-byte field is big-endian on the wire regardless of host.

use alloc::vec::Vec;
use std::io::{Read, Write};

use whereat::At;

use crate::error::{Result, TranslateError, io_error};
use crate::format::{COLOR_SPACE_RGBA32, TypeCode};

/// Serialized header length in bytes
pub const HEADER_LEN: usize = 32;

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (last column, inclusive)
    pub right: i32,
    /// Bottom edge (last row, inclusive)
    pub bottom: i32,
}

impl Bounds {
    /// Zero-based rectangle covering `width` x `height` pixels
    #[must_use]
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width - 1,
            bottom: height - 1,
        }
    }

    /// Width in pixels (`right - left + 1`)
    #[must_use]
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left) + 1
    }

    /// Height in pixels (`bottom - top + 1`)
    #[must_use]
    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top) + 1
    }
}

/// Self-describing header preceding the pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    /// Format tag, always [`TypeCode::BITMAP`] when produced here
    pub magic: TypeCode,
    /// Pixel rectangle
    pub bounds: Bounds,
    /// Bytes per row, at least `width * 4`
    pub row_bytes: u32,
    /// Color space tag
    pub color_space: u32,
    /// Pixel data length, `row_bytes * height`
    pub data_size: u32,
}

impl BitmapHeader {
    /// Header for a 32-bit RGBA image.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::TooLarge`] if any field overflows its
    /// 32-bit wire representation or `row_bytes` is shorter than
    /// `width * 4`.
    pub fn rgba32(width: u32, height: u32, row_bytes: usize) -> Result<Self> {
        let too_large = |msg| At::from(TranslateError::TooLarge(msg));
        let w = i32::try_from(width).map_err(|_| too_large("width exceeds i32"))?;
        let h = i32::try_from(height).map_err(|_| too_large("height exceeds i32"))?;
        if (row_bytes as u64) < u64::from(width) * 4 {
            return Err(too_large("row length shorter than width * 4"));
        }
        let row = u32::try_from(row_bytes).map_err(|_| too_large("row length exceeds u32"))?;
        let data_size = row
            .checked_mul(height)
            .ok_or_else(|| too_large("pixel data exceeds u32"))?;
        Ok(Self {
            magic: TypeCode::BITMAP,
            bounds: Bounds::with_size(w, h),
            row_bytes: row,
            color_space: COLOR_SPACE_RGBA32,
            data_size,
        })
    }

    /// Serialize to the big-endian wire layout
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let fields = [
            self.magic.as_u32(),
            self.bounds.left as u32,
            self.bounds.top as u32,
            self.bounds.right as u32,
            self.bounds.bottom as u32,
            self.row_bytes,
            self.color_space,
            self.data_size,
        ];
        for (chunk, field) in out.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_be_bytes());
        }
        out
    }

    /// Parse the big-endian wire layout. Returns `None` if `bytes` is
    /// shorter than [`HEADER_LEN`].
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..HEADER_LEN)?;
        let field = |i: usize| {
            u32::from_be_bytes([bytes[i * 4], bytes[i * 4 + 1], bytes[i * 4 + 2], bytes[i * 4 + 3]])
        };
        Some(Self {
            magic: TypeCode::from_u32(field(0)),
            bounds: Bounds {
                left: field(1) as i32,
                top: field(2) as i32,
                right: field(3) as i32,
                bottom: field(4) as i32,
            },
            row_bytes: field(5),
            color_space: field(6),
            data_size: field(7),
        })
    }

    /// Whether `data_size == row_bytes * height` and
    /// `row_bytes >= width * 4`
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let (w, h) = (self.bounds.width(), self.bounds.height());
        w >= 0
            && h >= 0
            && i64::from(self.row_bytes) >= w * 4
            && i64::from(self.row_bytes).checked_mul(h) == Some(i64::from(self.data_size))
    }
}

/// Header plus pixel data, assembled once and then only read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBitmap {
    header: BitmapHeader,
    pixels: Vec<u8>,
}

impl OutputBitmap {
    /// Pair a header with its pixel data.
    ///
    /// Returns `None` if the pixel buffer length is not `data_size`.
    #[must_use]
    pub fn new(header: BitmapHeader, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == header.data_size as usize).then_some(Self { header, pixels })
    }

    /// The header
    #[must_use]
    pub fn header(&self) -> &BitmapHeader {
        &self.header
    }

    /// Row-major pixel data, rows padded to `row_bytes`
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Unpadded bytes of row `y`
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        let row_bytes = self.header.row_bytes as usize;
        let width = usize::try_from(self.header.bounds.width()).ok()?;
        self.pixels.get(y.checked_mul(row_bytes)?..)?.get(..width * 4)
    }

    /// Write header then pixels.
    ///
    /// A failed header write returns before any pixel data is written.
    ///
    /// # Errors
    ///
    /// Returns an I/O-class error on a failed or short write.
    pub fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        out.write_all(&self.header.to_bytes()).map_err(io_error)?;
        out.write_all(&self.pixels).map_err(io_error)?;
        out.flush().map_err(io_error)?;
        Ok(())
    }

    /// Read a header and its pixel data back from a stream.
    ///
    /// # Errors
    ///
    /// Returns an I/O-class error if the stream ends early, and
    /// [`TranslateError::UnsupportedInput`] if the magic is not
    /// [`TypeCode::BITMAP`] or the header is inconsistent.
    pub fn read_from(input: &mut dyn Read) -> Result<Self> {
        let mut raw = [0u8; HEADER_LEN];
        input.read_exact(&mut raw).map_err(io_error)?;
        let header = BitmapHeader::from_bytes(&raw)
            .filter(|h| h.magic == TypeCode::BITMAP && h.is_consistent())
            .ok_or_else(|| At::from(TranslateError::UnsupportedInput))?;
        // Grow with the stream rather than trusting data_size up front.
        let expected = u64::from(header.data_size);
        let mut pixels = Vec::new();
        let got = input
            .take(expected)
            .read_to_end(&mut pixels)
            .map_err(io_error)?;
        if (got as u64) < expected {
            return Err(At::from(TranslateError::ShortTransfer {
                what: "pixel read",
                expected,
                actual: got as u64,
            }));
        }
        Ok(Self { header, pixels })
    }
}
