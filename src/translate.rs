//! HEIC to bitmap transcode engine
//!
//! One call runs five phases in order, each with its own failure exit:
//! type negotiation, bulk read, decode, pixel remap, header assembly and
//! emit. Nothing is retried and no state survives between calls.

use alloc::vec;
use alloc::vec::Vec;
use std::io::{SeekFrom, Write};

use whereat::At;

use crate::Source;
use crate::bitmap::{BitmapHeader, OutputBitmap};
use crate::config::TranslatorConfig;
use crate::decoder::{Acquired, DecodeRequest, HeifDecoder};
use crate::error::{DecodeError, Result, TranslateError, io_error};
use crate::format::TypeCode;
use crate::sniff::read_up_to;
use crate::swizzle::remap_to_rgba;

/// Check the source tag and resolve the output type.
///
/// An unspecified output type defaults to the generic bitmap type.
///
/// # Errors
///
/// [`TranslateError::UnsupportedInput`] for a source tag the translator
/// does not read, [`TranslateError::UnsupportedOutput`] for an output type
/// it does not write.
pub fn negotiate(
    config: &TranslatorConfig,
    source_type: TypeCode,
    output_type: Option<TypeCode>,
) -> Result<TypeCode> {
    if !config.reads(source_type) {
        log::debug!("translate: source type {source_type} not handled");
        return Err(At::from(TranslateError::UnsupportedInput));
    }
    let output = output_type.unwrap_or(TypeCode::BITMAP);
    if !config.writes(output) {
        log::debug!("translate: output type {output} not supported");
        return Err(At::from(TranslateError::UnsupportedOutput));
    }
    Ok(output)
}

/// Read the whole stream into memory, starting from offset 0.
///
/// # Errors
///
/// I/O-class errors if the stream is empty, cannot seek, or yields fewer
/// bytes than its declared length.
pub fn read_all(source: &mut dyn Source) -> Result<Vec<u8>> {
    let declared = source.seek(SeekFrom::End(0)).map_err(io_error)?;
    source.seek(SeekFrom::Start(0)).map_err(io_error)?;
    log::debug!("translate: input stream is {declared} bytes");

    if declared == 0 {
        return Err(At::from(TranslateError::ShortTransfer {
            what: "read",
            expected: 0,
            actual: 0,
        }));
    }
    let len = usize::try_from(declared)
        .map_err(|_| At::from(TranslateError::TooLarge("input exceeds address space")))?;

    let mut data = vec![0u8; len];
    let got = read_up_to(source, &mut data).map_err(io_error)?;
    if got < len {
        log::warn!("translate: short read, {got} of {len} bytes");
        return Err(At::from(TranslateError::ShortTransfer {
            what: "read",
            expected: declared,
            actual: got as u64,
        }));
    }
    Ok(data)
}

/// Decode an in-memory HEIC file and assemble the output bitmap.
///
/// The decoder's context, handle and image are released before this
/// returns, on success and on every error path.
///
/// # Errors
///
/// Decode-class errors for anything the decoder rejects, a plane that does
/// not hold its declared geometry, or dimensions that overflow the header.
pub fn transcode<D: HeifDecoder>(
    config: &TranslatorConfig,
    decoder: &D,
    data: &[u8],
) -> Result<OutputBitmap> {
    let mut context = Acquired::new(
        decoder,
        decoder.alloc_context().inspect_err(log_decode)?,
        D::release_context,
    );
    decoder
        .read_into_context(context.get_mut(), data)
        .inspect_err(log_decode)?;
    let handle = Acquired::new(
        decoder,
        decoder.primary_handle(context.get()).inspect_err(log_decode)?,
        D::release_handle,
    );
    let image = Acquired::new(
        decoder,
        decoder
            .decode(handle.get(), DecodeRequest::RGBA_INTERLEAVED)
            .inspect_err(log_decode)?,
        D::release_image,
    );
    let plane = decoder.plane(image.get()).inspect_err(log_decode)?;
    log::debug!(
        "translate: decoded {}x{} plane, stride {}, {:?}",
        plane.width,
        plane.height,
        plane.stride,
        plane.order
    );

    if plane.width == 0 || plane.height == 0 {
        return Err(At::from(TranslateError::Decode(DecodeError::InvalidPlane(
            "zero-sized image",
        ))));
    }
    let row_bytes = config
        .row_bytes(plane.width)
        .ok_or_else(|| At::from(TranslateError::TooLarge("row length overflows")))?;
    let header = BitmapHeader::rgba32(plane.width, plane.height, row_bytes)?;

    let mut pixels = vec![0u8; header.data_size as usize];
    remap_to_rgba(
        plane.data,
        plane.stride,
        plane.order,
        &mut pixels,
        row_bytes,
        plane.width as usize,
        plane.height as usize,
    )
    .map_err(|_| {
        At::from(TranslateError::Decode(DecodeError::InvalidPlane(
            "plane smaller than stride x height",
        )))
    })?;

    OutputBitmap::new(header, pixels)
        .ok_or_else(|| At::from(TranslateError::TooLarge("pixel buffer length mismatch")))
}

/// Run the full pipeline from `source` to `out`.
///
/// Returns the header that was written.
///
/// # Errors
///
/// See [`negotiate`], [`read_all`] and [`transcode`]; a failed header write
/// aborts before any pixel data is written.
pub fn translate<D: HeifDecoder>(
    config: &TranslatorConfig,
    decoder: &D,
    source: &mut dyn Source,
    source_type: TypeCode,
    output_type: Option<TypeCode>,
    out: &mut dyn Write,
) -> Result<BitmapHeader> {
    negotiate(config, source_type, output_type)?;
    let bitmap = {
        let data = read_all(source)?;
        transcode(config, decoder, &data)?
    };
    let header = *bitmap.header();
    bitmap.write_to(out).inspect_err(|e| {
        log::warn!("translate: emit failed: {}", e.error());
    })?;
    log::debug!(
        "translate: wrote {}x{} bitmap, {} bytes/row, {} data bytes",
        header.bounds.width(),
        header.bounds.height(),
        header.row_bytes,
        header.data_size
    );
    Ok(header)
}

fn log_decode(e: &DecodeError) {
    log::warn!("translate: decoder failed: {e}");
}
