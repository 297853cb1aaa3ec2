//! Channel reordering between strided 4-byte-per-pixel buffers
//!
//! Source and destination strides are independent: each row reads
//! `width * 4` bytes at `y * src_stride` and writes them reordered at
//! `y * dst_stride`. Padding on either side is never touched.
//!
//! Uses archmage for safe runtime dispatch across x86 (AVX2) with
//! scalar fallback on other platforms.

use archmage::incant;
use archmage::prelude::*;

// Explicit imports for safe SIMD load/store (can't glob-import alongside core::arch)
#[cfg(target_arch = "x86_64")]
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

/// Byte order of the four channels of one interleaved pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// `[R, G, B, A]`
    Rgba,
    /// `[B, G, R, A]`
    Bgra,
}

/// Buffer too small for the requested geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutError;

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("buffer does not hold width x height pixels at the given stride")
    }
}

impl core::error::Error for LayoutError {}

/// Bytes a strided buffer must hold: every full row but the last, plus one
/// unpadded row.
fn required_len(stride: usize, width: usize, height: usize) -> Option<usize> {
    let row = width.checked_mul(4)?;
    if height == 0 {
        return Some(0);
    }
    if stride < row {
        return None;
    }
    (height - 1).checked_mul(stride)?.checked_add(row)
}

#[inline]
fn check_strided(len: usize, stride: usize, width: usize, height: usize) -> Result<(), LayoutError> {
    match required_len(stride, width, height) {
        Some(need) if need <= len => Ok(()),
        _ => Err(LayoutError),
    }
}

/// Copy `height` rows of `width` pixels from `src` (in `order`) into `dst`
/// as `[R, G, B, A]`.
///
/// # Errors
///
/// Returns [`LayoutError`] if either stride is shorter than `width * 4` or
/// either buffer is too short for `height` rows.
pub fn remap_to_rgba(
    src: &[u8],
    src_stride: usize,
    order: ChannelOrder,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
) -> Result<(), LayoutError> {
    check_strided(src.len(), src_stride, width, height)?;
    check_strided(dst.len(), dst_stride, width, height)?;
    if width == 0 || height == 0 {
        return Ok(());
    }
    match order {
        ChannelOrder::Rgba => {
            let row = width * 4;
            for y in 0..height {
                dst[y * dst_stride..][..row].copy_from_slice(&src[y * src_stride..][..row]);
            }
        }
        ChannelOrder::Bgra => swap_br_strided(src, src_stride, dst, dst_stride, width, height),
    }
    Ok(())
}

/// Copy rows swapping bytes 0 and 2 of every pixel.
///
/// Dispatches to AVX2 when available, scalar fallback otherwise.
fn swap_br_strided(src: &[u8], ss: usize, dst: &mut [u8], ds: usize, w: usize, h: usize) {
    incant!(swap_br_strided(src, ss, dst, ds, w, h), [v3])
}

#[inline(always)]
fn swap_br_row(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[0] = s[2];
        d[1] = s[1];
        d[2] = s[0];
        d[3] = s[3];
    }
}

/// Scalar B<->R swap (fallback for all platforms)
fn swap_br_strided_scalar(
    _token: ScalarToken,
    src: &[u8],
    ss: usize,
    dst: &mut [u8],
    ds: usize,
    w: usize,
    h: usize,
) {
    for y in 0..h {
        swap_br_row(&src[y * ss..][..w * 4], &mut dst[y * ds..][..w * 4]);
    }
}

/// AVX2 B<->R swap, 8 pixels per iteration
#[cfg(target_arch = "x86_64")]
#[arcane]
fn swap_br_strided_v3(
    _token: X64V3Token,
    src: &[u8],
    ss: usize,
    dst: &mut [u8],
    ds: usize,
    w: usize,
    h: usize,
) {
    let mask = _mm256_setr_epi8(
        2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8, 11, 14, 13, 12, 15, 2, 1, 0, 3, 6, 5, 4, 7, 10, 9, 8,
        11, 14, 13, 12, 15,
    );
    let row = w * 4;
    for y in 0..h {
        let s_row = &src[y * ss..][..row];
        let d_row = &mut dst[y * ds..][..row];
        let mut i = 0;
        while i + 32 <= row {
            let s: &[u8; 32] = s_row[i..i + 32].try_into().unwrap();
            let v = _mm256_loadu_si256(s);
            let d: &mut [u8; 32] = (&mut d_row[i..i + 32]).try_into().unwrap();
            _mm256_storeu_si256(d, _mm256_shuffle_epi8(v, mask));
            i += 32;
        }
        swap_br_row(&s_row[i..], &mut d_row[i..]);
    }
}
