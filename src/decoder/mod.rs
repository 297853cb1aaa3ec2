//! HEIF decoder boundary
//!
//! The translator never decodes HEVC itself. It drives an external decoder
//! through [`HeifDecoder`], whose call contract mirrors a C-style library:
//! allocate a context, load the container into it, fetch the primary
//! image handle, decode to one interleaved plane, then release image,
//! handle and context. [`Acquired`] ties each release to scope exit so
//! every acquired object is released exactly once on every path.

#[cfg(feature = "libheif")]
mod libheif;

#[cfg(feature = "libheif")]
pub use libheif::LibHeifDecoder;

use alloc::string::String;

use crate::error::DecodeError;
use crate::swizzle::ChannelOrder;

/// Result type for decoder backends
pub type DecodeResult<T> = core::result::Result<T, DecodeError>;

/// Colorspace requested from the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Colorspace {
    /// RGB family
    Rgb,
}

/// Chroma layout requested from the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Chroma {
    /// One interleaved plane, 4 bytes per pixel with alpha
    InterleavedRgba,
}

/// Output layout asked of [`HeifDecoder::decode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeRequest {
    /// Colorspace
    pub colorspace: Colorspace,
    /// Chroma layout
    pub chroma: Chroma,
}

impl DecodeRequest {
    /// Interleaved 8-bit RGB with alpha, the only layout the engine asks for
    pub const RGBA_INTERLEAVED: Self = Self {
        colorspace: Colorspace::Rgb,
        chroma: Chroma::InterleavedRgba,
    };
}

/// Borrowed view of a decoded interleaved plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneRef<'a> {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes between row starts, at least `width * 4`
    pub stride: usize,
    /// Channel order of each 4-byte pixel
    pub order: ChannelOrder,
    /// Decoder-owned pixel bytes
    pub data: &'a [u8],
}

/// An external HEIF decoder library.
///
/// Every value returned by `alloc_context`, `primary_handle` and `decode`
/// must be handed back to the matching `release_*` exactly once.
pub trait HeifDecoder {
    /// Decode context; may borrow the input buffer (zero-copy ingestion)
    type Context<'buf>;
    /// Handle to an image inside a context
    type Handle;
    /// Decoded image owning one or more planes
    type Image;

    /// Allocate an empty decode context
    fn alloc_context<'buf>(&self) -> DecodeResult<Self::Context<'buf>>;

    /// Load a complete container from memory
    fn read_into_context<'buf>(
        &self,
        context: &mut Self::Context<'buf>,
        data: &'buf [u8],
    ) -> DecodeResult<()>;

    /// Handle of the container's primary image
    fn primary_handle(&self, context: &Self::Context<'_>) -> DecodeResult<Self::Handle>;

    /// Decode an image to the requested layout
    fn decode(&self, handle: &Self::Handle, request: DecodeRequest) -> DecodeResult<Self::Image>;

    /// The interleaved plane of a decoded image
    fn plane<'i>(&self, image: &'i Self::Image) -> DecodeResult<PlaneRef<'i>>;

    /// Release a decoded image
    fn release_image(&self, image: Self::Image);

    /// Release an image handle
    fn release_handle(&self, handle: Self::Handle);

    /// Release a decode context
    fn release_context(&self, context: Self::Context<'_>);

    /// Backend name and version, for diagnostics
    fn version(&self) -> String {
        String::from("unknown")
    }
}

/// A decoder object released back to its decoder when dropped
pub struct Acquired<'d, D, T> {
    decoder: &'d D,
    value: Option<T>,
    release: fn(&D, T),
}

impl<'d, D, T> Acquired<'d, D, T> {
    /// Take ownership of `value`, to be passed to `release` on drop
    pub fn new(decoder: &'d D, value: T, release: fn(&D, T)) -> Self {
        Self {
            decoder,
            value: Some(value),
            release,
        }
    }

    /// Shared access to the held value
    pub fn get(&self) -> &T {
        match &self.value {
            Some(v) => v,
            None => unreachable!("value is only taken on drop"),
        }
    }

    /// Exclusive access to the held value
    pub fn get_mut(&mut self) -> &mut T {
        match &mut self.value {
            Some(v) => v,
            None => unreachable!("value is only taken on drop"),
        }
    }
}

impl<D, T> Drop for Acquired<'_, D, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            (self.release)(self.decoder, value);
        }
    }
}

impl<D, T: core::fmt::Debug> core::fmt::Debug for Acquired<'_, D, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Acquired").field(&self.value).finish()
    }
}
