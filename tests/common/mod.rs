//! Shared test decoder

#![allow(dead_code)]

use heic_translator::DecodeError;
use heic_translator::decoder::{DecodeRequest, DecodeResult, HeifDecoder, PlaneRef};
use heic_translator::swizzle::ChannelOrder;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Minimal stream that passes the brand check
pub const HEIC_STREAM: &[u8] = b"\0\0\0\x18ftypheic\0\0\0\0mif1heic";

/// Decode step at which [`Instrumented`] fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Alloc,
    Read,
    Handle,
    Decode,
    Plane,
}

/// Acquire/release tallies, shared with the decoder
#[derive(Debug, Default)]
pub struct Counters {
    pub contexts: AtomicUsize,
    pub contexts_released: AtomicUsize,
    pub handles: AtomicUsize,
    pub handles_released: AtomicUsize,
    pub images: AtomicUsize,
    pub images_released: AtomicUsize,
}

impl Counters {
    /// Every acquired object was released exactly once
    pub fn balanced(&self) -> bool {
        let load = |c: &AtomicUsize| c.load(Ordering::SeqCst);
        load(&self.contexts) == load(&self.contexts_released)
            && load(&self.handles) == load(&self.handles_released)
            && load(&self.images) == load(&self.images_released)
    }

    pub fn acquired(&self) -> (usize, usize, usize) {
        (
            self.contexts.load(Ordering::SeqCst),
            self.handles.load(Ordering::SeqCst),
            self.images.load(Ordering::SeqCst),
        )
    }
}

/// Stub decoder handing out a fixed plane, counting every acquisition and
/// release, optionally failing at one step
pub struct Instrumented {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub order: ChannelOrder,
    pub pixels: Vec<u8>,
    pub fail_at: Option<FailAt>,
    pub counters: Arc<Counters>,
}

impl Instrumented {
    /// Decoder producing `width` x `height` pixels in `order`, rows `stride`
    /// bytes apart, pixel `(x, y)` = `[x, y, x ^ y, 0xFF]` before any
    /// reordering and padding bytes set to `0xEE`
    pub fn new(width: u32, height: u32, stride: usize, order: ChannelOrder) -> Self {
        let mut pixels = vec![0xEE; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                let px = [x as u8, y as u8, (x ^ y) as u8, 0xFF];
                pixels[y * stride + x * 4..][..4].copy_from_slice(&px);
            }
        }
        Self {
            width,
            height,
            stride,
            order,
            pixels,
            fail_at: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Single pixel holding `px`
    pub fn single(px: [u8; 4], order: ChannelOrder) -> Self {
        let mut d = Self::new(1, 1, 4, order);
        d.pixels = px.to_vec();
        d
    }

    pub fn failing_at(mut self, step: FailAt) -> Self {
        self.fail_at = Some(step);
        self
    }

    fn check(&self, step: FailAt) -> DecodeResult<()> {
        if self.fail_at == Some(step) {
            Err(DecodeError::Backend(format!("injected failure at {step:?}")))
        } else {
            Ok(())
        }
    }
}

/// Context that records the loaded buffer
pub struct StubContext<'buf> {
    loaded: Option<&'buf [u8]>,
}

impl HeifDecoder for Instrumented {
    type Context<'buf> = StubContext<'buf>;
    type Handle = u32;
    type Image = Vec<u8>;

    fn alloc_context<'buf>(&self) -> DecodeResult<StubContext<'buf>> {
        self.check(FailAt::Alloc)?;
        self.counters.contexts.fetch_add(1, Ordering::SeqCst);
        Ok(StubContext { loaded: None })
    }

    fn read_into_context<'buf>(
        &self,
        context: &mut StubContext<'buf>,
        data: &'buf [u8],
    ) -> DecodeResult<()> {
        self.check(FailAt::Read)?;
        if data.get(4..8) != Some(b"ftyp".as_slice()) {
            return Err(DecodeError::InvalidContainer("missing ftyp".into()));
        }
        context.loaded = Some(data);
        Ok(())
    }

    fn primary_handle(&self, context: &StubContext<'_>) -> DecodeResult<u32> {
        self.check(FailAt::Handle)?;
        if context.loaded.is_none() {
            return Err(DecodeError::NoPrimaryImage);
        }
        self.counters.handles.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    fn decode(&self, _handle: &u32, request: DecodeRequest) -> DecodeResult<Vec<u8>> {
        assert_eq!(request, DecodeRequest::RGBA_INTERLEAVED);
        self.check(FailAt::Decode)?;
        self.counters.images.fetch_add(1, Ordering::SeqCst);
        Ok(self.pixels.clone())
    }

    fn plane<'i>(&self, image: &'i Vec<u8>) -> DecodeResult<PlaneRef<'i>> {
        self.check(FailAt::Plane)?;
        Ok(PlaneRef {
            width: self.width,
            height: self.height,
            stride: self.stride,
            order: self.order,
            data: image,
        })
    }

    fn release_image(&self, _image: Vec<u8>) {
        self.counters.images_released.fetch_add(1, Ordering::SeqCst);
    }

    fn release_handle(&self, _handle: u32) {
        self.counters.handles_released.fetch_add(1, Ordering::SeqCst);
    }

    fn release_context(&self, _context: StubContext<'_>) {
        self.counters
            .contexts_released
            .fetch_add(1, Ordering::SeqCst);
    }
}
