//! A buffered text writer that emits UTF-8.
//!
//! [`Utf8Writer`] stages characters, strings, UTF-16 code units and primitive
//! values in a fixed-capacity byte buffer and hands complete UTF-8 sequences
//! to a byte sink. Booleans, integers, floats, [`Decimal`]s, timestamps,
//! durations and [`Guid`]s are formatted straight into the buffer without an
//! intermediate `String`.
//!
//! Every operation has a blocking form over [`BlockingSink`] (`std::io::Write`)
//! and an async form over [`AsyncSink`] (`futures::io::AsyncWrite`). Both run
//! the same staging code, so they write the same bytes.
//!
//! ```rust
//! use utf8_stream_writer::{CancellationToken, Utf8Writer, WriterOptions};
//!
//! let options = WriterOptions {
//!     preamble: true,
//!     newline: "\n".into(),
//!     ..Default::default()
//! };
//! let mut writer = Utf8Writer::with_options(Vec::new(), options)?;
//! writer.write_str("π ≈ ")?;
//! writer.write_line_value(3.14159f64)?;
//! writer.flush()?;
//! assert_eq!(writer.get_ref().unwrap(), "\u{FEFF}π ≈ 3.14159\n".as_bytes());
//!
//! let token = CancellationToken::new();
//! let mut sink = futures::io::Cursor::new(Vec::new());
//! futures::executor::block_on(async {
//!     let mut writer = Utf8Writer::new(&mut sink)?;
//!     writer.write_str_async("async", &token).await?;
//!     writer.dispose_async().await
//! })?;
//! assert_eq!(sink.into_inner(), b"async");
//! # Ok::<(), utf8_stream_writer::WriterError>(())
//! ```

mod buffer;
mod cancel;
mod encoder;
mod error;
mod format;
mod options;
mod sink;
mod staging;
mod writer;

#[cfg(any(test, feature = "fuzzing"))]
pub mod chunk_utils;

#[cfg(test)]
mod tests;

pub use cancel::CancellationToken;
pub use error::WriterError;
pub use format::{
    BoolFormat, DateTimeFormat, DateTimeOffset, Decimal, DecimalFormat, FloatFormat, Formats, Guid,
    GuidFormat, IntegerFormat, Primitive, TimeSpanFormat, Value,
};
pub use options::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE, WriterOptions, default_newline};
pub use sink::{AsyncSink, BlockingSink, Sink};
pub use writer::{Lifecycle, Utf8Writer};
