//! Decoder backend on top of the system libheif

use alloc::format;
use alloc::string::{String, ToString};

use libheif_rs::{ColorSpace, HeifContext, Image, ImageHandle, LibHeif, RgbChroma};

use super::{Chroma, Colorspace, DecodeRequest, DecodeResult, HeifDecoder, PlaneRef};
use crate::error::DecodeError;
use crate::swizzle::ChannelOrder;

/// [`HeifDecoder`] backed by libheif via `libheif-rs`.
///
/// Decodes to `RgbChroma::Rgba`, which libheif lays out as `[R, G, B, A]`.
pub struct LibHeifDecoder {
    lib: LibHeif,
}

impl LibHeifDecoder {
    /// Initialize libheif
    #[must_use]
    pub fn new() -> Self {
        Self { lib: LibHeif::new() }
    }
}

impl Default for LibHeifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for LibHeifDecoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LibHeifDecoder").finish_non_exhaustive()
    }
}

/// libheif allocates and loads in one call; the slot stays empty until
/// [`HeifDecoder::read_into_context`] fills it.
pub struct LibHeifContext<'buf>(Option<HeifContext<'buf>>);

impl HeifDecoder for LibHeifDecoder {
    type Context<'buf> = LibHeifContext<'buf>;
    type Handle = ImageHandle;
    type Image = Image;

    fn alloc_context<'buf>(&self) -> DecodeResult<LibHeifContext<'buf>> {
        Ok(LibHeifContext(None))
    }

    fn read_into_context<'buf>(
        &self,
        context: &mut LibHeifContext<'buf>,
        data: &'buf [u8],
    ) -> DecodeResult<()> {
        let ctx = HeifContext::read_from_bytes(data)
            .map_err(|e| DecodeError::InvalidContainer(e.to_string()))?;
        context.0 = Some(ctx);
        Ok(())
    }

    fn primary_handle(&self, context: &LibHeifContext<'_>) -> DecodeResult<ImageHandle> {
        let ctx = context
            .0
            .as_ref()
            .ok_or_else(|| DecodeError::InvalidContainer("context not loaded".into()))?;
        ctx.primary_image_handle()
            .map_err(|_| DecodeError::NoPrimaryImage)
    }

    fn decode(&self, handle: &ImageHandle, request: DecodeRequest) -> DecodeResult<Image> {
        let color_space = match (request.colorspace, request.chroma) {
            (Colorspace::Rgb, Chroma::InterleavedRgba) => ColorSpace::Rgb(RgbChroma::Rgba),
        };
        self.lib
            .decode(handle, color_space, None)
            .map_err(|e| DecodeError::Backend(e.to_string()))
    }

    fn plane<'i>(&self, image: &'i Image) -> DecodeResult<PlaneRef<'i>> {
        let plane = image
            .planes()
            .interleaved
            .ok_or(DecodeError::UnsupportedChroma)?;
        Ok(PlaneRef {
            width: plane.width,
            height: plane.height,
            stride: plane.stride,
            order: ChannelOrder::Rgba,
            data: plane.data,
        })
    }

    fn release_image(&self, image: Image) {
        drop(image);
    }

    fn release_handle(&self, handle: ImageHandle) {
        drop(handle);
    }

    fn release_context(&self, context: LibHeifContext<'_>) {
        drop(context);
    }

    fn version(&self) -> String {
        let [major, minor, patch] = self.lib.version();
        format!("libheif {major}.{minor}.{patch}")
    }
}
