use futures::executor::block_on;
use quickcheck::QuickCheck;

use super::{
    arbitrary::Op,
    utils::{RecordingSink, lf_options, quickcheck_tests},
};
use crate::{
    CancellationToken, Formats, Primitive, Utf8Writer, WriterOptions,
    chunk_utils::{produce_unit_chunks, split_at_offsets},
};

fn options_with_capacity(capacity: u16) -> WriterOptions {
    WriterOptions {
        buffer_size: Some(usize::from(capacity).max(1)),
        ..lf_options()
    }
}

/// Property: whatever the capacity and however the text is split across
/// calls, the sink receives exactly the UTF-8 of the text, and no single sink
/// write ends inside a multi-byte sequence.
#[test]
fn chunk_independence_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, capacity: u16, offsets: Vec<usize>, parts: u8) -> bool {
        let options = options_with_capacity(capacity);
        let units: Vec<u16> = text.encode_utf16().collect();
        let parts = usize::from(parts).max(1);

        let mut outputs = Vec::new();
        for form in 0..5 {
            let sink = RecordingSink::new();
            let mut writer = Utf8Writer::with_options(sink.clone(), options.clone()).unwrap();
            match form {
                0 => writer.write_str(&text).unwrap(),
                1 => {
                    for piece in split_at_offsets(&text, &offsets) {
                        writer.write_str(piece).unwrap();
                    }
                }
                2 => {
                    for c in text.chars() {
                        writer.write_char(c).unwrap();
                    }
                }
                3 => {
                    for chunk in produce_unit_chunks(&units, parts) {
                        writer.write_utf16(chunk).unwrap();
                    }
                }
                _ => {
                    for piece in split_at_offsets(&text, &offsets) {
                        writer.write_utf8(piece.as_bytes()).unwrap();
                    }
                }
            }
            writer.flush().unwrap();
            let state = sink.state();
            if state.writes.iter().any(|w| core::str::from_utf8(w).is_err()) {
                return false;
            }
            if state.writes.iter().any(|w| w.len() > writer.capacity()) {
                return false;
            }
            outputs.push(state.bytes.clone());
        }
        outputs.iter().all(|out| out == text.as_bytes())
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(String, u16, Vec<usize>, u8) -> bool);
}

/// Property: lossy byte input comes out exactly as `String::from_utf8_lossy`
/// renders it.
#[test]
fn lossy_utf8_matches_std_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, capacity: u16) -> bool {
        let sink = RecordingSink::new();
        let mut writer =
            Utf8Writer::with_options(sink.clone(), options_with_capacity(capacity)).unwrap();
        writer.write_utf8(&bytes).unwrap();
        writer.flush().unwrap();
        sink.bytes() == String::from_utf8_lossy(&bytes).as_bytes()
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<u8>, u16) -> bool);
}

/// Property: the same script of operations produces the same bytes through
/// the blocking and the async path, and both match the expected text.
#[test]
fn sync_async_parity_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(ops: Vec<Op>, capacity: u16, formats: Formats, preamble: bool) -> bool {
        let options = WriterOptions {
            preamble,
            formats,
            ..options_with_capacity(capacity)
        };

        let blocking = RecordingSink::new();
        let mut writer = Utf8Writer::with_options(blocking.clone(), options.clone()).unwrap();
        for op in &ops {
            op.apply(&mut writer).unwrap();
        }
        writer.dispose().unwrap();

        let suspending = RecordingSink::new();
        let token = CancellationToken::new();
        block_on(async {
            let mut writer = Utf8Writer::with_options(suspending.clone(), options.clone()).unwrap();
            for op in &ops {
                op.apply_async(&mut writer, &token).await.unwrap();
            }
            writer.dispose_async().await.unwrap();
        });

        let mut expected = String::new();
        for op in &ops {
            op.expected(&formats, "\n", &mut expected);
        }
        let expected = if preamble && !expected.is_empty() {
            [&b"\xEF\xBB\xBF"[..], expected.as_bytes()].concat()
        } else {
            expected.into_bytes()
        };

        let (left, right) = (blocking.state(), suspending.state());
        left.bytes == expected
            && right.bytes == expected
            && left.writes == right.writes
            && left.flushes == right.flushes
            && left.closes == 1
            && right.closes == 1
    }

    QuickCheck::new()
        .tests(quickcheck_tests() / 10)
        .quickcheck(prop as fn(Vec<Op>, u16, Formats, bool) -> bool);
}

/// Property: no primitive formatted under any format combination exceeds
/// `Formats::worst_case_len`, so the retry after a drain always succeeds.
#[test]
fn worst_case_bound_quickcheck() {
    fn prop(formats: Formats, value: Primitive) -> bool {
        let mut raw = vec![0u8; formats.worst_case_len()];
        formats.format_into(value, &mut raw).is_some()
    }

    QuickCheck::new()
        .tests(quickcheck_tests() * 10)
        .quickcheck(prop as fn(Formats, Primitive) -> bool);
}
