use core::fmt;

use tracing::warn;

use super::Utf8Writer;
use crate::{
    WriterError,
    format::Value,
    sink::BlockingSink,
    staging::{Payload, Progress, Staging, WriteJob},
};

/// Execute one drain against a blocking sink.
fn drain<S: BlockingSink>(
    staging: &mut Staging,
    sink: &mut S,
    flush_sink: bool,
) -> Result<(), WriterError> {
    let Some(plan) = staging.drain_plan(flush_sink) else {
        return Ok(());
    };
    if let Some(preamble) = plan.preamble {
        sink.write_all(preamble)?;
    }
    if plan.staged {
        sink.write_all(staging.filled())?;
        staging.mark_drained();
    }
    if plan.flush_sink {
        sink.flush()?;
    }
    Ok(())
}

impl<S: BlockingSink> Utf8Writer<S> {
    fn run(&mut self, mut job: WriteJob<'_>) -> Result<(), WriterError> {
        let auto_flush = self.auto_flush;
        let (staging, sink) = self.parts()?;
        while staging.advance(&mut job)? == Progress::BufferFull {
            drain(staging, sink, false)?;
        }
        if auto_flush {
            drain(staging, sink, true)?;
        }
        Ok(())
    }

    fn run_rendered(&mut self, args: fmt::Arguments<'_>, line: bool) -> Result<(), WriterError> {
        self.ensure_open()?;
        let scratch = self.render(args)?;
        let result = self.run(WriteJob::new(Payload::Str(&scratch), line));
        self.restore_scratch(scratch);
        result
    }

    fn run_value(&mut self, value: Value<'_>, line: bool) -> Result<(), WriterError> {
        let payload = match value {
            Value::Primitive(p) => Payload::Primitive(p),
            Value::Char(c) => Payload::Char(c),
            Value::Str(s) => Payload::Str(s),
            Value::Display(d) => return self.run_rendered(format_args!("{d}"), line),
        };
        self.run(WriteJob::new(payload, line))
    }

    /// Write one character.
    ///
    /// # Errors
    ///
    /// [`WriterError::Disposed`] after disposal, [`WriterError::Io`] if the
    /// sink fails while the buffer is drained.
    pub fn write_char(&mut self, ch: char) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Char(ch), false))
    }

    /// Write one character followed by the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_line_char(&mut self, ch: char) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Char(ch), true))
    }

    /// Write a string.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_str(&mut self, s: &str) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Str(s), false))
    }

    /// Write a string followed by the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_line_str(&mut self, s: &str) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Str(s), true))
    }

    /// Write UTF-16 code units.
    ///
    /// Each call must hold complete surrogate pairs. A pair split across two
    /// calls is rejected: the first call fails on its trailing high surrogate
    /// and the second on its leading low surrogate.
    ///
    /// # Errors
    ///
    /// [`WriterError::UnpairedSurrogate`] for a lone surrogate, including a
    /// high surrogate at the very end of `units`; otherwise as for
    /// [`write_char`](Self::write_char).
    pub fn write_utf16(&mut self, units: &[u16]) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Utf16(units), false))
    }

    /// Write UTF-16 code units followed by the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_utf16`](Self::write_utf16).
    pub fn write_line_utf16(&mut self, units: &[u16]) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Utf16(units), true))
    }

    /// Write bytes that should be UTF-8. Invalid sequences are replaced with
    /// U+FFFD, the same way [`String::from_utf8_lossy`] does.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_utf8(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Utf8Lossy(bytes), false))
    }

    /// Lossy UTF-8 followed by the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_line_utf8(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Utf8Lossy(bytes), true))
    }

    /// Write just the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_char`](Self::write_char).
    pub fn write_line(&mut self) -> Result<(), WriterError> {
        self.run(WriteJob::new(Payload::Empty, true))
    }

    /// Write any [`Value`]: a primitive through its direct formatter, text
    /// through the character path, anything else through `Display`.
    ///
    /// ```rust
    /// use utf8_stream_writer::{Utf8Writer, Value};
    ///
    /// let mut writer = Utf8Writer::new(Vec::new())?;
    /// writer.write_value(true)?;
    /// writer.write_value(' ')?;
    /// writer.write_value(-1.5f64)?;
    /// writer.write_value(Value::display(&std::net::Ipv4Addr::LOCALHOST))?;
    /// writer.flush()?;
    /// assert_eq!(writer.get_ref().unwrap(), b"True -1.5127.0.0.1");
    /// # Ok::<(), utf8_stream_writer::WriterError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`WriterError::Fmt`] if a `Display` implementation fails; otherwise
    /// as for [`write_char`](Self::write_char).
    pub fn write_value<'a>(&mut self, value: impl Into<Value<'a>>) -> Result<(), WriterError> {
        self.run_value(value.into(), false)
    }

    /// Write any [`Value`] followed by the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_value`](Self::write_value).
    pub fn write_line_value<'a>(&mut self, value: impl Into<Value<'a>>) -> Result<(), WriterError> {
        self.run_value(value.into(), true)
    }

    /// Write `value` through its `Display` implementation.
    ///
    /// # Errors
    ///
    /// As for [`write_value`](Self::write_value).
    pub fn write_display<T: fmt::Display + ?Sized>(&mut self, value: &T) -> Result<(), WriterError> {
        self.run_rendered(format_args!("{value}"), false)
    }

    /// Write `value` through its `Display` implementation, then the newline.
    ///
    /// # Errors
    ///
    /// As for [`write_value`](Self::write_value).
    pub fn write_line_display<T: fmt::Display + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), WriterError> {
        self.run_rendered(format_args!("{value}"), true)
    }

    /// Write formatted arguments; this is what `write!` and `writeln!` call.
    ///
    /// ```rust
    /// use utf8_stream_writer::Utf8Writer;
    ///
    /// let mut writer = Utf8Writer::new(Vec::new())?;
    /// write!(writer, "{}-{:03}", "id", 7)?;
    /// writer.flush()?;
    /// assert_eq!(writer.get_ref().unwrap(), b"id-007");
    /// # Ok::<(), utf8_stream_writer::WriterError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// As for [`write_value`](Self::write_value).
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), WriterError> {
        self.run_rendered(args, false)
    }

    /// Hand every staged byte to the sink, then flush the sink.
    ///
    /// # Errors
    ///
    /// [`WriterError::Disposed`] after disposal, [`WriterError::Io`] if the
    /// sink fails.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        let (staging, sink) = self.parts()?;
        drain(staging, sink, true)
    }

    /// Turn auto-flush on or off. Turning it on flushes right away.
    ///
    /// # Errors
    ///
    /// As for [`flush`](Self::flush).
    pub fn set_auto_flush(&mut self, auto_flush: bool) -> Result<(), WriterError> {
        self.ensure_open()?;
        self.auto_flush = auto_flush;
        if auto_flush {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush, close the sink if the writer owns it, and release the buffer.
    ///
    /// The close runs even when the flush fails, and the writer ends up
    /// disposed either way. Calling this again, or after
    /// [`dispose_async`](Self::dispose_async), does nothing. On the shared
    /// [`null`](Self::null) writer this is just a flush.
    ///
    /// # Errors
    ///
    /// The close error if closing failed, otherwise the flush error.
    pub fn dispose(&mut self) -> Result<(), WriterError> {
        if self.sentinel {
            return self.flush();
        }
        if !self.begin_dispose() {
            return Ok(());
        }
        let flushed = match self.sink.as_mut() {
            Some(sink) => drain(&mut self.staging, sink, true),
            None => Ok(()),
        };
        if let Err(err) = &flushed {
            warn!(error = %err, "flush failed while disposing");
        }
        let owned = if self.closable { self.sink.take() } else { None };
        let closed = match owned {
            Some(mut sink) => sink.close().map_err(WriterError::from),
            None => Ok(()),
        };
        self.finish_dispose();
        closed.and(flushed)
    }
}
