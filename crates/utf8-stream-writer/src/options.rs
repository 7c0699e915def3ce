use crate::format::Formats;

/// Buffer capacity used when [`WriterOptions::buffer_size`] is `None`.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Smallest buffer capacity a writer will use. Smaller explicit sizes are
/// raised to this value.
pub const MIN_BUFFER_SIZE: usize = 128;

/// The host platform's line terminator.
#[must_use]
pub fn default_newline() -> &'static str {
    if cfg!(windows) { "\r\n" } else { "\n" }
}

/// Configuration options for [`Utf8Writer`](crate::Utf8Writer).
///
/// # Examples
///
/// ```rust
/// use utf8_stream_writer::{Utf8Writer, WriterOptions};
///
/// let options = WriterOptions {
///     preamble: true,
///     buffer_size: Some(4096),
///     ..Default::default()
/// };
/// let writer = Utf8Writer::with_options(Vec::new(), options).unwrap();
/// assert_eq!(writer.capacity(), 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct WriterOptions {
    /// Whether to emit the UTF-8 byte-order mark (`EF BB BF`) before the first
    /// byte that reaches the sink.
    ///
    /// The mark is never written when the sink is seekable and already
    /// positioned past its start at construction, so appending to an existing
    /// file does not put a mark in the middle of it.
    ///
    /// # Default
    ///
    /// `false`
    pub preamble: bool,

    /// Capacity of the staging buffer in bytes.
    ///
    /// `None` selects [`DEFAULT_BUFFER_SIZE`]. `Some(0)` is rejected with
    /// [`WriterError::BufferSizeOutOfRange`](crate::WriterError::BufferSizeOutOfRange).
    /// Other values below [`MIN_BUFFER_SIZE`], or below the longest text the
    /// configured [`formats`](Self::formats) can produce, are raised; a size is
    /// never lowered.
    ///
    /// # Default
    ///
    /// `None`
    pub buffer_size: Option<usize>,

    /// Whether disposing the writer leaves the sink open.
    ///
    /// When `false` the writer owns the sink: disposal closes and drops it.
    ///
    /// # Default
    ///
    /// `false`
    pub leave_open: bool,

    /// Initial auto-flush state. While enabled, every write ends by draining
    /// the buffer and flushing the sink.
    ///
    /// # Default
    ///
    /// `false`
    pub auto_flush: bool,

    /// Sequence appended by the `write_line*` operations.
    ///
    /// # Default
    ///
    /// `"\r\n"` on Windows, `"\n"` elsewhere.
    pub newline: String,

    /// Layout of primitive values.
    ///
    /// # Default
    ///
    /// [`Formats::default()`]
    pub formats: Formats,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            preamble: false,
            buffer_size: None,
            leave_open: false,
            auto_flush: false,
            newline: default_newline().to_owned(),
            formats: Formats::default(),
        }
    }
}
