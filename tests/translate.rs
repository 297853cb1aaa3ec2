//! Integration tests for the transcode pipeline

mod common;

use common::{FailAt, HEIC_STREAM, Instrumented};
use heic_translator::bitmap::HEADER_LEN;
use heic_translator::swizzle::ChannelOrder;
use heic_translator::{
    BitmapHeader, ErrorKind, HeicTranslator, OutputBitmap, TranslateError, Translator,
    TranslatorConfig, TypeCode,
};
use std::io::{self, Cursor, Write};

fn run(
    translator: &dyn Translator,
    input: &[u8],
) -> (heic_translator::Result<BitmapHeader>, Vec<u8>) {
    let mut source = Cursor::new(input.to_vec());
    let mut out = Vec::new();
    let result = translator.translate(&mut source, TypeCode::HEIC, None, &mut out);
    (result, out)
}

/// Writer that accepts `limit` bytes and then fails
struct Limited {
    written: Vec<u8>,
    limit: usize,
}

impl Write for Limited {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.written.len();
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        }
        let n = room.min(buf.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn bgra_fixture_becomes_rgba() {
    let translator = HeicTranslator::new(Instrumented::single(
        [0x10, 0x20, 0x30, 0xFF],
        ChannelOrder::Bgra,
    ));
    let (result, out) = run(&translator, HEIC_STREAM);
    let header = result.unwrap();

    assert_eq!(out.len(), HEADER_LEN + 4);
    assert_eq!(&out[HEADER_LEN..], &[0x30, 0x20, 0x10, 0xFF]);
    assert_eq!((header.bounds.left, header.bounds.top), (0, 0));
    assert_eq!(header.bounds.right, 0);
    assert_eq!(header.bounds.bottom, 0);
    assert_eq!(header.row_bytes, 4);
    assert_eq!(header.data_size, 4);
}

#[test]
fn rgba_plane_passes_through() {
    let translator = HeicTranslator::new(Instrumented::single(
        [0x10, 0x20, 0x30, 0x40],
        ChannelOrder::Rgba,
    ));
    let (result, out) = run(&translator, HEIC_STREAM);
    result.unwrap();
    assert_eq!(&out[HEADER_LEN..], &[0x10, 0x20, 0x30, 0x40]);
}

#[test]
fn header_describes_payload() {
    let translator = HeicTranslator::new(Instrumented::new(7, 5, 28, ChannelOrder::Bgra));
    let (result, out) = run(&translator, HEIC_STREAM);
    let header = result.unwrap();

    assert!(header.is_consistent());
    assert_eq!(header.bounds.width(), 7);
    assert_eq!(header.bounds.height(), 5);
    assert_eq!(header.data_size, header.row_bytes * 5);
    assert_eq!(out.len(), HEADER_LEN + header.data_size as usize);
    assert_eq!(BitmapHeader::from_bytes(&out), Some(header));
    assert_eq!(&out[..4], b"bits");
    assert_eq!(&out[24..28], &[0x00, 0x00, 0x20, 0x28]);
}

#[test]
fn output_reads_back() {
    let translator = HeicTranslator::new(Instrumented::new(9, 4, 40, ChannelOrder::Bgra));
    let (result, out) = run(&translator, HEIC_STREAM);
    let header = result.unwrap();

    let bitmap = OutputBitmap::read_from(&mut out.as_slice()).unwrap();
    assert_eq!(*bitmap.header(), header);
    // pixel (x, y) was [x, y, x^y, 0xFF] in BGRA
    assert_eq!(bitmap.row(3).unwrap()[8 * 4..], [3 ^ 8, 3, 8, 0xFF]);
}

#[test]
fn source_and_output_strides_are_independent() {
    let (width, height) = (3u32, 4u32);
    let config = TranslatorConfig::new().with_row_alignment(64).unwrap();
    let decoder = Instrumented::new(width, height, width as usize * 4 + 12, ChannelOrder::Bgra);
    let translator = HeicTranslator::with_config(config, decoder);

    let (result, out) = run(&translator, HEIC_STREAM);
    let header = result.unwrap();
    assert_eq!(header.row_bytes, 64);
    assert_eq!(header.data_size, 64 * height);

    let pixels = &out[HEADER_LEN..];
    for y in 0..height as usize {
        let row = &pixels[y * 64..][..64];
        for x in 0..width as usize {
            assert_eq!(
                row[x * 4..][..4],
                [(x ^ y) as u8, y as u8, x as u8, 0xFF],
                "pixel ({x}, {y})"
            );
        }
        // Source padding (0xEE) never leaks into the output
        assert!(row[width as usize * 4..].iter().all(|&b| b == 0));
    }
}

#[test]
fn decoder_objects_released_on_success() {
    let decoder = Instrumented::new(2, 2, 8, ChannelOrder::Bgra);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);

    for _ in 0..3 {
        run(&translator, HEIC_STREAM).0.unwrap();
    }
    assert_eq!(counters.acquired(), (3, 3, 3));
    assert!(counters.balanced());
}

#[test]
fn decoder_objects_released_at_every_failure() {
    let cases = [
        (FailAt::Alloc, (0, 0, 0)),
        (FailAt::Read, (1, 0, 0)),
        (FailAt::Handle, (1, 0, 0)),
        (FailAt::Decode, (1, 1, 0)),
        (FailAt::Plane, (1, 1, 1)),
    ];
    for (step, acquired) in cases {
        let decoder = Instrumented::new(2, 2, 8, ChannelOrder::Bgra).failing_at(step);
        let counters = decoder.counters.clone();
        let translator = HeicTranslator::new(decoder);

        let (result, out) = run(&translator, HEIC_STREAM);
        let err = result.unwrap_err();
        assert_eq!(err.error().kind(), ErrorKind::DecodeError, "{step:?}");
        assert!(out.is_empty(), "{step:?} wrote output");
        assert_eq!(counters.acquired(), acquired, "{step:?}");
        assert!(counters.balanced(), "{step:?} leaked");
    }
}

#[test]
fn undersized_plane_is_decode_error_and_released() {
    let mut decoder = Instrumented::new(4, 4, 16, ChannelOrder::Bgra);
    decoder.pixels.truncate(16 * 3);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);

    let (result, out) = run(&translator, HEIC_STREAM);
    let err = result.unwrap_err();
    assert!(matches!(err.error(), TranslateError::Decode(_)));
    assert!(out.is_empty());
    assert_eq!(counters.acquired(), (1, 1, 1));
    assert!(counters.balanced());
}

#[test]
fn unparseable_container_is_decode_error() {
    let decoder = Instrumented::new(1, 1, 4, ChannelOrder::Bgra);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);

    let (result, _) = run(&translator, b"definitely not a container");
    assert_eq!(result.unwrap_err().error().kind(), ErrorKind::DecodeError);
    assert!(counters.balanced());
}

#[test]
fn empty_stream_is_io_error() {
    let decoder = Instrumented::new(1, 1, 4, ChannelOrder::Bgra);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);

    let (result, out) = run(&translator, &[]);
    assert_eq!(result.unwrap_err().error().kind(), ErrorKind::IoError);
    assert!(out.is_empty());
    assert_eq!(counters.acquired(), (0, 0, 0));
}

#[test]
fn foreign_types_rejected_before_reading() {
    let decoder = Instrumented::new(1, 1, 4, ChannelOrder::Bgra);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);
    let mut out = Vec::new();

    let mut source = Cursor::new(HEIC_STREAM.to_vec());
    source.set_position(5);
    let err = translator
        .translate(&mut source, TypeCode(*b"JPEG"), None, &mut out)
        .unwrap_err();
    assert_eq!(err.error().kind(), ErrorKind::UnsupportedInput);
    assert_eq!(source.position(), 5);

    let err = translator
        .translate(
            &mut source,
            TypeCode::HEIC,
            Some(TypeCode(*b"JPEG")),
            &mut out,
        )
        .unwrap_err();
    assert_eq!(err.error().kind(), ErrorKind::UnsupportedOutput);
    assert_eq!(source.position(), 5);

    assert!(out.is_empty());
    assert_eq!(counters.acquired(), (0, 0, 0));
}

#[test]
fn failed_header_write_writes_no_pixels() {
    let decoder = Instrumented::new(2, 2, 8, ChannelOrder::Bgra);
    let counters = decoder.counters.clone();
    let translator = HeicTranslator::new(decoder);
    let mut source = Cursor::new(HEIC_STREAM.to_vec());
    let mut out = Limited {
        written: Vec::new(),
        limit: 10,
    };

    let err = translator
        .translate(&mut source, TypeCode::HEIC, None, &mut out)
        .unwrap_err();
    assert_eq!(err.error().kind(), ErrorKind::IoError);
    assert!(out.written.len() < HEADER_LEN);
    assert!(counters.balanced());
}

#[test]
fn failed_pixel_write_is_io_error() {
    let translator = HeicTranslator::new(Instrumented::new(2, 2, 8, ChannelOrder::Bgra));
    let mut source = Cursor::new(HEIC_STREAM.to_vec());
    let mut out = Limited {
        written: Vec::new(),
        limit: HEADER_LEN + 5,
    };

    let err = translator
        .translate(&mut source, TypeCode::HEIC, None, &mut out)
        .unwrap_err();
    assert_eq!(err.error().kind(), ErrorKind::IoError);
    assert_eq!(&out.written[..4], b"bits");
}

#[test]
fn settings_do_not_change_output() {
    use heic_translator::TranslatorSettings;

    let plain = HeicTranslator::new(Instrumented::new(3, 3, 12, ChannelOrder::Bgra));
    let config = TranslatorConfig::new().with_settings(TranslatorSettings {
        header_only: true,
        data_only: false,
    });
    let header_only =
        HeicTranslator::with_config(config, Instrumented::new(3, 3, 12, ChannelOrder::Bgra));
    assert!(header_only.settings().header_only);

    let (a, out_a) = run(&plain, HEIC_STREAM);
    let (b, out_b) = run(&header_only, HEIC_STREAM);
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(out_a, out_b);
}

#[test]
fn in_memory_transcode_matches_stream_output() {
    let translator = HeicTranslator::new(Instrumented::new(5, 2, 24, ChannelOrder::Bgra));
    let bitmap = translator.transcode(HEIC_STREAM).unwrap();
    let (result, out) = run(&translator, HEIC_STREAM);
    assert_eq!(*bitmap.header(), result.unwrap());
    assert_eq!(bitmap.pixels(), &out[HEADER_LEN..]);
}
