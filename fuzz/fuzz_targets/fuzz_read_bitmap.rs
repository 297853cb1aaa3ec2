#![no_main]

use libfuzzer_sys::fuzz_target;
use heic_translator::OutputBitmap;

/// Bitmap reader fuzzer: arbitrary bytes must never panic, and anything
/// accepted must carry a consistent header.
fuzz_target!(|data: &[u8]| {
    let mut input = data;
    if let Ok(bitmap) = OutputBitmap::read_from(&mut input) {
        assert!(bitmap.header().is_consistent());
        assert_eq!(bitmap.pixels().len(), bitmap.header().data_size as usize);
    }
});
