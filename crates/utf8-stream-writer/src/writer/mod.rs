//! [`Utf8Writer`]: construction, accessors and lifecycle bookkeeping.
//!
//! The write operations live in [`blocking`] (`S: BlockingSink`) and
//! [`suspending`] (`S: AsyncSink`). Both feed the same
//! [`Staging`](crate::staging::Staging) state machine.

mod blocking;
mod suspending;

use core::fmt::{self, Write as _};
use std::{
    fs::{File, OpenOptions},
    io::{self, Seek, SeekFrom},
    path::Path,
    sync::LazyLock,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    CancellationToken, WriterError,
    format::Formats,
    options::{DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE, WriterOptions},
    sink::Sink,
    staging::Staging,
};

/// Where a writer is in its lifetime. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Accepting writes.
    Open,
    /// A dispose started but has not finished, e.g. because the
    /// `dispose_async` future was dropped. Writes are refused; disposing again
    /// completes the transition.
    Disposing,
    /// Terminal. Every operation except disposal fails with
    /// [`WriterError::Disposed`].
    Disposed,
}

/// A buffered text writer that encodes everything it is given as UTF-8.
///
/// Text, UTF-16 code units, lossy UTF-8 bytes and primitive values are staged
/// in a fixed-capacity buffer and handed to the sink `S` when the buffer fills
/// up, on [`flush`](Self::flush), and after every write while auto-flush is
/// on. Multi-byte sequences are never split across two sink writes.
///
/// Every operation comes in a blocking form (`write_str`, `flush`, …) for
/// [`BlockingSink`](crate::BlockingSink)s and an async form (`write_str_async`,
/// `flush_async`, …) for [`AsyncSink`](crate::AsyncSink)s. For the same input
/// both produce the same bytes.
///
/// A writer is not synchronized. It does not flush on drop; call
/// [`dispose`](Self::dispose) or [`dispose_async`](Self::dispose_async).
///
/// # Examples
///
/// ```rust
/// use utf8_stream_writer::{Utf8Writer, WriterOptions};
///
/// let mut out = Vec::new();
/// let options = WriterOptions {
///     leave_open: true,
///     newline: "\n".into(),
///     ..Default::default()
/// };
/// let mut writer = Utf8Writer::with_options(&mut out, options)?;
/// writer.write_str("answer: ")?;
/// writer.write_line_value(42)?;
/// writer.dispose()?;
/// assert_eq!(out, b"answer: 42\n");
/// # Ok::<(), utf8_stream_writer::WriterError>(())
/// ```
pub struct Utf8Writer<S> {
    staging: Staging,
    /// `None` once a closable sink was closed.
    sink: Option<S>,
    auto_flush: bool,
    closable: bool,
    /// The shared [`null`](Utf8Writer::null) writer: disposal only flushes.
    sentinel: bool,
    state: Lifecycle,
    /// Reused for values rendered through `Display`.
    scratch: String,
}

impl<S> fmt::Debug for Utf8Writer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utf8Writer")
            .field("capacity", &self.staging.capacity())
            .field("buffered", &self.staging.buffered())
            .field("auto_flush", &self.auto_flush)
            .field("closable", &self.closable)
            .field("sentinel", &self.sentinel)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Buffer capacity for the requested size and formats.
fn effective_capacity(requested: Option<usize>, formats: &Formats) -> Result<usize, WriterError> {
    let requested = match requested {
        None => DEFAULT_BUFFER_SIZE,
        Some(0) => return Err(WriterError::BufferSizeOutOfRange { requested: 0 }),
        Some(n) => n,
    };
    let floor = MIN_BUFFER_SIZE.max(formats.worst_case_len());
    if requested < floor {
        debug!(requested, capacity = floor, "raising buffer size to the minimum");
    }
    Ok(requested.max(floor))
}

impl<S: Sink> Utf8Writer<S> {
    /// Wrap `sink` with [`WriterOptions::default()`].
    ///
    /// # Errors
    ///
    /// See [`with_options`](Self::with_options).
    pub fn new(sink: S) -> Result<Self, WriterError> {
        Self::with_options(sink, WriterOptions::default())
    }

    /// Wrap `sink` with the given options.
    ///
    /// # Errors
    ///
    /// - [`WriterError::InvalidArgument`] if the sink reports that it cannot
    ///   be written to.
    /// - [`WriterError::BufferSizeOutOfRange`] for `buffer_size: Some(0)`.
    pub fn with_options(mut sink: S, options: WriterOptions) -> Result<Self, WriterError> {
        if !sink.can_write() {
            return Err(WriterError::InvalidArgument {
                name: "sink",
                reason: "the sink does not support writing",
            });
        }
        let capacity = effective_capacity(options.buffer_size, &options.formats)?;

        let mut preamble = options.preamble;
        if preamble {
            if let Some(position) = sink.seek_position().filter(|&p| p > 0) {
                debug!(position, "sink is past its start; preamble suppressed");
                preamble = false;
            }
        }

        Ok(Self::assemble(sink, capacity, preamble, options))
    }

    fn assemble(sink: S, capacity: usize, preamble: bool, options: WriterOptions) -> Self {
        Self {
            staging: Staging::new(capacity, options.newline, options.formats, preamble),
            sink: Some(sink),
            auto_flush: options.auto_flush,
            closable: !options.leave_open,
            sentinel: false,
            state: Lifecycle::Open,
            scratch: String::new(),
        }
    }
}

impl<S> Utf8Writer<S> {
    /// Whether every write ends with a drain and a sink flush.
    #[must_use]
    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Capacity of the staging buffer in bytes; zero once disposed.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.staging.capacity()
    }

    /// Bytes staged but not yet handed to the sink.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.staging.buffered()
    }

    /// Sequence appended by the `write_line*` operations.
    #[must_use]
    pub fn newline(&self) -> &str {
        self.staging.newline()
    }

    /// Replace the newline sequence for subsequent `write_line*` calls.
    pub fn set_newline(&mut self, newline: impl Into<String>) {
        self.staging.set_newline(newline.into());
    }

    /// Layout of primitive values.
    #[must_use]
    pub fn formats(&self) -> &Formats {
        self.staging.formats()
    }

    /// Whether disposal has completed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state == Lifecycle::Disposed
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// The sink, unless disposal closed and dropped it.
    #[must_use]
    pub fn get_ref(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Mutable access to the sink. Bytes written through it bypass whatever
    /// is still buffered.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Unwrap the sink. Staged bytes are discarded, so flush first.
    #[must_use]
    pub fn into_inner(self) -> Option<S> {
        self.sink
    }

    fn ensure_open(&self) -> Result<(), WriterError> {
        match self.state {
            Lifecycle::Open => Ok(()),
            Lifecycle::Disposing | Lifecycle::Disposed => Err(WriterError::Disposed),
        }
    }

    /// Entry check of every async operation: disposal first, then cancellation.
    fn ensure_ready(&self, cancel: &CancellationToken) -> Result<(), WriterError> {
        self.ensure_open()?;
        if cancel.is_cancelled() {
            return Err(WriterError::Canceled);
        }
        Ok(())
    }

    fn parts(&mut self) -> Result<(&mut Staging, &mut S), WriterError> {
        self.ensure_open()?;
        let sink = self.sink.as_mut().ok_or(WriterError::Disposed)?;
        Ok((&mut self.staging, sink))
    }

    /// Render `value` into the scratch string, which the caller must hand
    /// back through [`restore_scratch`](Self::restore_scratch).
    fn render(&mut self, value: fmt::Arguments<'_>) -> Result<String, WriterError> {
        let mut scratch = core::mem::take(&mut self.scratch);
        scratch.clear();
        match scratch.write_fmt(value) {
            Ok(()) => Ok(scratch),
            Err(err) => {
                self.scratch = scratch;
                Err(err.into())
            }
        }
    }

    fn restore_scratch(&mut self, scratch: String) {
        self.scratch = scratch;
    }

    /// First half of disposal. Returns `false` if already disposed.
    fn begin_dispose(&mut self) -> bool {
        if self.state == Lifecycle::Disposed {
            return false;
        }
        debug!(closable = self.closable, buffered = self.staging.buffered(), "disposing writer");
        self.state = Lifecycle::Disposing;
        true
    }

    fn finish_dispose(&mut self) {
        self.staging.release();
        self.scratch = String::new();
        self.state = Lifecycle::Disposed;
    }
}

impl Utf8Writer<io::Sink> {
    /// A process-wide writer that discards everything.
    ///
    /// It uses the minimum buffer, never writes a preamble and never closes
    /// its sink. Disposing it only flushes; it stays open for every other
    /// user.
    ///
    /// ```rust
    /// use utf8_stream_writer::Utf8Writer;
    ///
    /// Utf8Writer::null().lock().write_str("dropped")?;
    /// # Ok::<(), utf8_stream_writer::WriterError>(())
    /// ```
    pub fn null() -> &'static Mutex<Utf8Writer<io::Sink>> {
        static NULL: LazyLock<Mutex<Utf8Writer<io::Sink>>> = LazyLock::new(|| {
            let options = WriterOptions {
                leave_open: true,
                ..WriterOptions::default()
            };
            let mut writer = Utf8Writer::assemble(io::sink(), MIN_BUFFER_SIZE, false, options);
            writer.sentinel = true;
            Mutex::new(writer)
        });
        &NULL
    }
}

impl Utf8Writer<File> {
    /// Create or open the file at `path` and wrap it.
    ///
    /// With `append` the file is opened for appending and the writer starts
    /// at its end, so an existing non-empty file gets no second preamble.
    /// Otherwise the file is created or truncated. The writer always owns the
    /// file; `options.leave_open` is ignored.
    ///
    /// # Errors
    ///
    /// [`WriterError::InvalidArgument`] for an empty path,
    /// [`WriterError::BufferSizeOutOfRange`] for `buffer_size: Some(0)`, and
    /// [`WriterError::Io`] if the file cannot be opened.
    pub fn open_path(
        path: impl AsRef<Path>,
        append: bool,
        options: WriterOptions,
    ) -> Result<Self, WriterError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(WriterError::InvalidArgument {
                name: "path",
                reason: "the path is empty",
            });
        }
        if options.buffer_size == Some(0) {
            return Err(WriterError::BufferSizeOutOfRange { requested: 0 });
        }

        let mut open = OpenOptions::new();
        open.create(true);
        if append {
            open.append(true);
        } else {
            open.write(true).truncate(true);
        }
        let mut file = open.open(path)?;
        if append {
            file.seek(SeekFrom::End(0))?;
        }

        Self::with_options(
            file,
            WriterOptions {
                leave_open: false,
                ..options
            },
        )
    }
}
