#![expect(missing_docs)]

use std::fs;

use utf8_stream_writer::{Utf8Writer, WriterError, WriterOptions};

mod common;

use crate::common::options;

fn with_preamble() -> WriterOptions {
    WriterOptions {
        preamble: true,
        ..options()
    }
}

#[test]
fn new_file_gets_a_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let mut writer = Utf8Writer::open_path(&path, false, with_preamble()).unwrap();
    writer.write_line_str("first").unwrap();
    writer.dispose().unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFfirst\n");
}

#[test]
fn appending_to_a_non_empty_file_skips_the_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    fs::write(&path, "existing\n").unwrap();

    let mut writer = Utf8Writer::open_path(&path, true, with_preamble()).unwrap();
    writer.write_line_str("appended").unwrap();
    writer.dispose().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "existing\nappended\n");
}

#[test]
fn appending_to_an_empty_file_keeps_the_preamble() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "").unwrap();

    let mut writer = Utf8Writer::open_path(&path, true, with_preamble()).unwrap();
    writer.write_str("x").unwrap();
    writer.dispose().unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"\xEF\xBB\xBFx");
}

#[test]
fn without_append_the_file_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overwrite.txt");
    fs::write(&path, "a much longer previous body").unwrap();

    let mut writer = Utf8Writer::open_path(&path, false, options()).unwrap();
    writer.write_str("short").unwrap();
    writer.dispose().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "short");
}

#[test]
fn file_writer_owns_the_file_even_with_leave_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("owned.txt");
    let options = WriterOptions {
        leave_open: true,
        ..options()
    };

    let mut writer = Utf8Writer::open_path(&path, false, options).unwrap();
    writer.write_str("done").unwrap();
    writer.dispose().unwrap();
    assert!(writer.into_inner().is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), "done");
}

#[test]
fn bad_arguments_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let empty = Utf8Writer::open_path("", false, options());
    assert!(matches!(
        empty,
        Err(WriterError::InvalidArgument { name: "path", .. })
    ));

    let zero = Utf8Writer::open_path(
        dir.path().join("never.txt"),
        false,
        WriterOptions {
            buffer_size: Some(0),
            ..options()
        },
    );
    assert!(matches!(zero, Err(WriterError::BufferSizeOutOfRange { requested: 0 })));
    assert!(!dir.path().join("never.txt").exists());

    let missing = Utf8Writer::open_path(dir.path().join("no/such/dir.txt"), false, options());
    assert!(matches!(missing, Err(WriterError::Io(_))));
}
