#![no_main]

use libfuzzer_sys::fuzz_target;
use heic_translator::TranslatorConfig;
use heic_translator::sniff::identify;
use std::io::{Cursor, Seek, SeekFrom};

/// Identify fuzzer: identify must never panic and must leave the stream
/// where it found it. The first byte picks the starting offset.
fuzz_target!(|data: &[u8]| {
    let Some((&start, rest)) = data.split_first() else {
        return;
    };
    let config = TranslatorConfig::new();
    let start = u64::from(start) % (rest.len() as u64 + 1);
    let mut cur = Cursor::new(rest);
    cur.seek(SeekFrom::Start(start)).unwrap();
    let _ = identify(&config, &mut cur, None);
    assert_eq!(cur.position(), start);
});
