#![no_main]

use arbitrary::Arbitrary;
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;
use utf8_stream_writer::{
    CancellationToken, Utf8Writer, WriterError, WriterOptions, chunk_utils::produce_chunks,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Char(char),
    Str(String, u8),
    Utf16(Vec<u16>),
    Utf8(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Line,
    Flush,
}

#[derive(Debug, Arbitrary)]
struct Input {
    preamble: bool,
    buffer_size: u16,
    ops: Vec<Op>,
}

fn options(input: &Input, buffer_size: Option<usize>) -> WriterOptions {
    WriterOptions {
        preamble: input.preamble,
        buffer_size,
        newline: "\n".to_owned(),
        ..WriterOptions::default()
    }
}

fn run_blocking(input: &Input) -> Vec<u8> {
    let size = usize::from(input.buffer_size).max(1);
    let mut writer = Utf8Writer::with_options(Vec::new(), options(input, Some(size))).unwrap();
    for op in &input.ops {
        let result = match op {
            Op::Char(c) => writer.write_char(*c),
            Op::Str(s, parts) => produce_chunks(s, usize::from(*parts).max(1))
                .into_iter()
                .try_for_each(|chunk| writer.write_str(chunk)),
            Op::Utf16(units) => writer.write_utf16(units),
            Op::Utf8(bytes) => writer.write_utf8(bytes),
            Op::Int(v) => writer.write_value(*v),
            Op::Float(v) => writer.write_value(*v),
            Op::Bool(v) => writer.write_value(*v),
            Op::Line => writer.write_line(),
            Op::Flush => writer.flush(),
        };
        match result {
            Ok(()) | Err(WriterError::UnpairedSurrogate(_)) => {}
            Err(err) => panic!("blocking write failed: {err}"),
        }
    }
    writer.flush().unwrap();
    writer.into_inner().unwrap()
}

fn run_async(input: &Input) -> Vec<u8> {
    let token = CancellationToken::new();
    block_on(async {
        let sink = futures::io::Cursor::new(Vec::new());
        let mut writer = Utf8Writer::with_options(sink, options(input, None)).unwrap();
        for op in &input.ops {
            let result = match op {
                Op::Char(c) => writer.write_char_async(*c, &token).await,
                Op::Str(s, _) => writer.write_str_async(s, &token).await,
                Op::Utf16(units) => writer.write_utf16_async(units, &token).await,
                Op::Utf8(bytes) => writer.write_utf8_async(bytes, &token).await,
                Op::Int(v) => writer.write_value_async(*v, &token).await,
                Op::Float(v) => writer.write_value_async(*v, &token).await,
                Op::Bool(v) => writer.write_value_async(*v, &token).await,
                Op::Line => writer.write_line_async(&token).await,
                Op::Flush => writer.flush_async(&token).await,
            };
            match result {
                Ok(()) | Err(WriterError::UnpairedSurrogate(_)) => {}
                Err(err) => panic!("async write failed: {err}"),
            }
        }
        writer.flush_async(&token).await.unwrap();
        writer.into_inner().unwrap().into_inner()
    })
}

fuzz_target!(|input: Input| {
    let blocking = run_blocking(&input);
    let suspending = run_async(&input);
    assert!(core::str::from_utf8(&blocking).is_ok());
    assert_eq!(blocking, suspending);
});
