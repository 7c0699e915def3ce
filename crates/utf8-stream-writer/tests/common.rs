#![allow(missing_docs)]
#![allow(dead_code)]

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use utf8_stream_writer::{Utf8Writer, WriterOptions};

/// 2023-11-14T22:13:20Z plus the given nanoseconds.
pub fn sample_instant(nanos: u32) -> SystemTime {
    UNIX_EPOCH + Duration::new(1_700_000_000, nanos)
}

pub const SAMPLE_GUID: u128 = 0x6ba7_b810_9dad_11d1_80b4_00c0_4fd4_30c8;

/// Options with `\n` line endings regardless of platform.
pub fn options() -> WriterOptions {
    WriterOptions {
        newline: "\n".to_owned(),
        ..WriterOptions::default()
    }
}

/// Everything a writer over a `Vec` produced, as text.
pub fn collected(mut writer: Utf8Writer<Vec<u8>>) -> String {
    writer.flush().expect("flush");
    let bytes = writer.into_inner().expect("sink");
    String::from_utf8(bytes).expect("utf-8")
}

/// The same story written in pieces of every shape.
pub const STORY: [&str; 6] = [
    "Once upon a time, ",
    "a writer met a buffer",
    " that held 128 bytes. ",
    "Zürich → Kraków: 🚆 ",
    "took ",
    "a while.",
];
