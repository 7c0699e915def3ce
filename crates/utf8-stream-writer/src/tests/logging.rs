use tracing_test::traced_test;

use super::utils::{RecordingSink, lf_options, recording_writer};
use crate::{Utf8Writer, WriterOptions};

#[traced_test]
#[test]
fn small_buffer_is_raised_with_a_debug_event() {
    let (writer, _) = recording_writer(WriterOptions {
        buffer_size: Some(16),
        ..lf_options()
    });
    assert_eq!(writer.capacity(), 128);
    assert!(logs_contain("raising buffer size to the minimum"));
}

#[traced_test]
#[test]
fn suppressed_preamble_is_logged() {
    let options = WriterOptions {
        preamble: true,
        ..lf_options()
    };
    let _writer = Utf8Writer::with_options(RecordingSink::seekable_at(3), options).unwrap();
    assert!(logs_contain("preamble suppressed"));
}

#[traced_test]
#[test]
fn disposal_is_logged_with_flush_failures() {
    let (mut writer, sink) = recording_writer(lf_options());
    writer.write_str("doomed").unwrap();
    sink.set(|s| s.fail_flushes = true);
    assert!(writer.dispose().is_err());
    assert!(logs_contain("disposing writer"));
    assert!(logs_contain("flush failed while disposing"));
}
