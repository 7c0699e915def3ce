use core::fmt;

use futures::io::AsyncWriteExt;
use tracing::warn;

use super::Utf8Writer;
use crate::{
    CancellationToken, WriterError,
    format::Value,
    sink::AsyncSink,
    staging::{Payload, Progress, Staging, WriteJob},
};

/// Execute one drain against an async sink. Mirrors the blocking `drain`.
async fn drain<S: AsyncSink>(
    staging: &mut Staging,
    sink: &mut S,
    flush_sink: bool,
) -> Result<(), WriterError> {
    let Some(plan) = staging.drain_plan(flush_sink) else {
        return Ok(());
    };
    if let Some(preamble) = plan.preamble {
        sink.write_all(preamble).await?;
    }
    if plan.staged {
        sink.write_all(staging.filled()).await?;
        staging.mark_drained();
    }
    if plan.flush_sink {
        sink.flush().await?;
    }
    Ok(())
}

/// Async operations. Each one checks for disposal and then for cancellation
/// before touching the buffer; once past that check it runs to completion.
impl<S: AsyncSink> Utf8Writer<S> {
    async fn run_async(
        &mut self,
        mut job: WriteJob<'_>,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.ensure_ready(cancel)?;
        let auto_flush = self.auto_flush;
        let (staging, sink) = self.parts()?;
        while staging.advance(&mut job)? == Progress::BufferFull {
            drain(staging, sink, false).await?;
        }
        if auto_flush {
            drain(staging, sink, true).await?;
        }
        Ok(())
    }

    async fn run_rendered_async(
        &mut self,
        args: fmt::Arguments<'_>,
        line: bool,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.ensure_ready(cancel)?;
        let scratch = self.render(args)?;
        let result = self
            .run_async(WriteJob::new(Payload::Str(&scratch), line), cancel)
            .await;
        self.restore_scratch(scratch);
        result
    }

    async fn run_value_async(
        &mut self,
        value: Value<'_>,
        line: bool,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        let payload = match value {
            Value::Primitive(p) => Payload::Primitive(p),
            Value::Char(c) => Payload::Char(c),
            Value::Str(s) => Payload::Str(s),
            Value::Display(d) => {
                self.ensure_ready(cancel)?;
                let scratch = self.render(format_args!("{d}"))?;
                let result = self
                    .run_async(WriteJob::new(Payload::Str(&scratch), line), cancel)
                    .await;
                self.restore_scratch(scratch);
                return result;
            }
        };
        self.run_async(WriteJob::new(payload, line), cancel).await
    }

    /// Async [`write_char`](Self::write_char).
    ///
    /// # Errors
    ///
    /// [`WriterError::Canceled`] if `cancel` was already cancelled, otherwise
    /// as for the blocking form.
    pub async fn write_char_async(
        &mut self,
        ch: char,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Char(ch), false), cancel).await
    }

    /// Async [`write_line_char`](Self::write_line_char).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_line_char_async(
        &mut self,
        ch: char,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Char(ch), true), cancel).await
    }

    /// Async [`write_str`](Self::write_str).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_str_async(
        &mut self,
        s: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Str(s), false), cancel).await
    }

    /// Async [`write_line_str`](Self::write_line_str).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_line_str_async(
        &mut self,
        s: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Str(s), true), cancel).await
    }

    /// Async [`write_utf16`](Self::write_utf16).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async), plus
    /// [`WriterError::UnpairedSurrogate`].
    pub async fn write_utf16_async(
        &mut self,
        units: &[u16],
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Utf16(units), false), cancel).await
    }

    /// Async [`write_line_utf16`](Self::write_line_utf16).
    ///
    /// # Errors
    ///
    /// As for [`write_utf16_async`](Self::write_utf16_async).
    pub async fn write_line_utf16_async(
        &mut self,
        units: &[u16],
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Utf16(units), true), cancel).await
    }

    /// Async [`write_utf8`](Self::write_utf8).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_utf8_async(
        &mut self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Utf8Lossy(bytes), false), cancel)
            .await
    }

    /// Async [`write_line_utf8`](Self::write_line_utf8).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_line_utf8_async(
        &mut self,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Utf8Lossy(bytes), true), cancel)
            .await
    }

    /// Async [`write_line`](Self::write_line).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async).
    pub async fn write_line_async(&mut self, cancel: &CancellationToken) -> Result<(), WriterError> {
        self.run_async(WriteJob::new(Payload::Empty, true), cancel).await
    }

    /// Async [`write_value`](Self::write_value).
    ///
    /// # Errors
    ///
    /// As for [`write_char_async`](Self::write_char_async), plus
    /// [`WriterError::Fmt`].
    pub async fn write_value_async<'a>(
        &mut self,
        value: impl Into<Value<'a>>,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_value_async(value.into(), false, cancel).await
    }

    /// Async [`write_line_value`](Self::write_line_value).
    ///
    /// # Errors
    ///
    /// As for [`write_value_async`](Self::write_value_async).
    pub async fn write_line_value_async<'a>(
        &mut self,
        value: impl Into<Value<'a>>,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_value_async(value.into(), true, cancel).await
    }

    /// Async [`write_display`](Self::write_display).
    ///
    /// # Errors
    ///
    /// As for [`write_value_async`](Self::write_value_async).
    pub async fn write_display_async<T: fmt::Display + ?Sized>(
        &mut self,
        value: &T,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_rendered_async(format_args!("{value}"), false, cancel)
            .await
    }

    /// Async [`write_line_display`](Self::write_line_display).
    ///
    /// # Errors
    ///
    /// As for [`write_value_async`](Self::write_value_async).
    pub async fn write_line_display_async<T: fmt::Display + ?Sized>(
        &mut self,
        value: &T,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_rendered_async(format_args!("{value}"), true, cancel)
            .await
    }

    /// Async [`write_fmt`](Self::write_fmt), usually called as
    /// `writer.write_fmt_async(format_args!(…), &token)`.
    ///
    /// # Errors
    ///
    /// As for [`write_value_async`](Self::write_value_async).
    pub async fn write_fmt_async(
        &mut self,
        args: fmt::Arguments<'_>,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.run_rendered_async(args, false, cancel).await
    }

    /// Async [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// [`WriterError::Disposed`], [`WriterError::Canceled`] or
    /// [`WriterError::Io`].
    pub async fn flush_async(&mut self, cancel: &CancellationToken) -> Result<(), WriterError> {
        self.ensure_ready(cancel)?;
        let (staging, sink) = self.parts()?;
        drain(staging, sink, true).await
    }

    /// Async [`set_auto_flush`](Self::set_auto_flush).
    ///
    /// # Errors
    ///
    /// As for [`flush_async`](Self::flush_async).
    pub async fn set_auto_flush_async(
        &mut self,
        auto_flush: bool,
        cancel: &CancellationToken,
    ) -> Result<(), WriterError> {
        self.ensure_ready(cancel)?;
        self.auto_flush = auto_flush;
        if auto_flush {
            self.flush_async(cancel).await?;
        }
        Ok(())
    }

    /// Async [`dispose`](Self::dispose): flush, then close the sink if owned.
    ///
    /// Safe to call repeatedly and after a blocking `dispose`. If the future
    /// is dropped before it completes the writer stays
    /// [`Disposing`](crate::Lifecycle::Disposing) and a later dispose finishes
    /// the job.
    ///
    /// # Errors
    ///
    /// The close error if closing failed, otherwise the flush error.
    pub async fn dispose_async(&mut self) -> Result<(), WriterError> {
        if self.sentinel {
            let (staging, sink) = self.parts()?;
            return drain(staging, sink, true).await;
        }
        if !self.begin_dispose() {
            return Ok(());
        }
        let flushed = match self.sink.as_mut() {
            Some(sink) => drain(&mut self.staging, sink, true).await,
            None => Ok(()),
        };
        if let Err(err) = &flushed {
            warn!(error = %err, "flush failed while disposing");
        }
        let owned = if self.closable { self.sink.take() } else { None };
        let closed = match owned {
            Some(mut sink) => sink.close().await.map_err(WriterError::from),
            None => Ok(()),
        };
        self.finish_dispose();
        closed.and(flushed)
    }
}
