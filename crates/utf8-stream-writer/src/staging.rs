//! The sans-IO half of the writer.
//!
//! [`Staging::advance`] moves as much of a [`WriteJob`] into the buffer as fits
//! and says whether the job is done or the buffer must be drained first.
//! [`Staging::drain_plan`] decides what a drain hands to the sink. Neither does
//! any I/O, so the blocking and async drivers run the exact same byte logic
//! and differ only in how they call the sink.

use tracing::trace;

use crate::{
    WriterError,
    buffer::StagingBuffer,
    encoder::{UTF8_PREAMBLE, Utf16Encoder, next_lossy, str_chunk_end, units_fitting},
    format::{Formats, Primitive},
};

/// Input of one logical write.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Payload<'a> {
    /// Nothing; used by `write_line` for a bare newline.
    Empty,
    Char(char),
    Str(&'a str),
    Utf16(&'a [u16]),
    /// Bytes expected to be UTF-8; invalid sequences become U+FFFD.
    Utf8Lossy(&'a [u8]),
    Primitive(Primitive),
}

/// Progress through one logical write, optionally followed by a newline.
#[derive(Debug)]
pub(crate) struct WriteJob<'a> {
    payload: Payload<'a>,
    /// Bytes or code units of the payload already staged.
    offset: usize,
    payload_done: bool,
    /// Bytes of the newline already staged, if a newline is owed.
    newline: Option<usize>,
    /// A primitive already failed to fit once.
    retried: bool,
}

impl<'a> WriteJob<'a> {
    pub(crate) fn new(payload: Payload<'a>, line: bool) -> Self {
        Self {
            payload,
            offset: 0,
            payload_done: false,
            newline: line.then_some(0),
            retried: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Complete,
    /// Drain the buffer, then call `advance` again with the same job.
    BufferFull,
}

/// What a drain must do, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DrainPlan {
    /// Written before the staged bytes, once per writer.
    pub(crate) preamble: Option<&'static [u8]>,
    /// Whether the buffer holds bytes to write.
    pub(crate) staged: bool,
    /// Whether to flush the sink afterwards.
    pub(crate) flush_sink: bool,
}

#[derive(Debug)]
pub(crate) struct Staging {
    buffer: StagingBuffer,
    encoder: Utf16Encoder,
    newline: String,
    formats: Formats,
    preamble_pending: bool,
}

impl Staging {
    pub(crate) fn new(capacity: usize, newline: String, formats: Formats, preamble: bool) -> Self {
        Self {
            buffer: StagingBuffer::with_capacity(capacity),
            encoder: Utf16Encoder::new(),
            newline,
            formats,
            preamble_pending: preamble,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub(crate) fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn filled(&self) -> &[u8] {
        self.buffer.filled()
    }

    pub(crate) fn newline(&self) -> &str {
        &self.newline
    }

    pub(crate) fn set_newline(&mut self, newline: String) {
        self.newline = newline;
    }

    pub(crate) fn formats(&self) -> &Formats {
        &self.formats
    }

    /// Stage as much of `job` as fits.
    ///
    /// Never returns `BufferFull` while the buffer is empty, so a driver that
    /// drains on `BufferFull` always makes progress.
    pub(crate) fn advance(&mut self, job: &mut WriteJob<'_>) -> Result<Progress, WriterError> {
        if !job.payload_done {
            match self.stage_payload(job) {
                Ok(Progress::Complete) => job.payload_done = true,
                Ok(Progress::BufferFull) => return Ok(Progress::BufferFull),
                Err(err) => {
                    self.encoder.reset();
                    return Err(err);
                }
            }
        }
        match job.newline.as_mut() {
            Some(offset) => Ok(stage_str(&mut self.buffer, &self.newline, offset)),
            None => Ok(Progress::Complete),
        }
    }

    fn stage_payload(&mut self, job: &mut WriteJob<'_>) -> Result<Progress, WriterError> {
        match job.payload {
            Payload::Empty => Ok(Progress::Complete),
            Payload::Char(ch) => Ok(self.stage_char(ch)),
            Payload::Str(s) => Ok(stage_str(&mut self.buffer, s, &mut job.offset)),
            Payload::Utf16(units) => {
                if job.offset == 0 {
                    self.encoder.reset();
                }
                while job.offset < units.len() {
                    let n = units_fitting(self.buffer.remaining()).min(units.len() - job.offset);
                    if n == 0 {
                        return Ok(Progress::BufferFull);
                    }
                    let chunk = &units[job.offset..job.offset + n];
                    let (written, result) = self.encoder.encode(chunk, self.buffer.spare_mut());
                    self.buffer.advance(written);
                    result?;
                    job.offset += n;
                }
                self.encoder.finish()?;
                Ok(Progress::Complete)
            }
            Payload::Utf8Lossy(bytes) => Ok(self.stage_lossy(bytes, &mut job.offset)),
            Payload::Primitive(value) => {
                if let Some(n) = self.formats.format_into(value, self.buffer.spare_mut()) {
                    self.buffer.advance(n);
                    return Ok(Progress::Complete);
                }
                if job.retried || self.buffer.is_empty() {
                    return Err(WriterError::FormatOverflow {
                        type_name: value.type_name(),
                        capacity: self.buffer.capacity(),
                    });
                }
                job.retried = true;
                Ok(Progress::BufferFull)
            }
        }
    }

    fn stage_char(&mut self, ch: char) -> Progress {
        match u8::try_from(ch) {
            Ok(byte) if byte.is_ascii() => {
                if self.buffer.is_full() {
                    return Progress::BufferFull;
                }
                self.buffer.push(byte);
                Progress::Complete
            }
            _ => {
                let mut utf8 = [0u8; 4];
                let encoded = ch.encode_utf8(&mut utf8).as_bytes();
                if encoded.len() > self.buffer.remaining() {
                    return Progress::BufferFull;
                }
                self.buffer.copy_from(encoded);
                Progress::Complete
            }
        }
    }

    fn stage_lossy(&mut self, bytes: &[u8], offset: &mut usize) -> Progress {
        while *offset < bytes.len() {
            let rest = &bytes[*offset..];
            let window = &rest[..rest.len().min(self.buffer.remaining())];
            let valid = match core::str::from_utf8(window) {
                Ok(s) => s.len(),
                Err(err) => err.valid_up_to(),
            };
            if valid > 0 {
                *offset += self.buffer.copy_from(&window[..valid]);
                continue;
            }
            let (consumed, emitted) = next_lossy(rest);
            if emitted.len() > self.buffer.remaining() {
                return Progress::BufferFull;
            }
            self.buffer.copy_from(emitted);
            *offset += consumed;
        }
        Progress::Complete
    }

    /// Decide what draining the buffer involves, or `None` when there is
    /// nothing to do.
    ///
    /// The preamble is claimed here, before the sink is touched, so it is
    /// never written twice even if the write that follows fails.
    pub(crate) fn drain_plan(&mut self, flush_sink: bool) -> Option<DrainPlan> {
        let staged = !self.buffer.is_empty();
        if !staged && !flush_sink {
            return None;
        }
        let preamble = (staged && core::mem::take(&mut self.preamble_pending)).then_some(UTF8_PREAMBLE);
        trace!(
            preamble = preamble.map_or(0, <[u8]>::len),
            staged = self.buffer.len(),
            flush_sink,
            "draining buffer"
        );
        Some(DrainPlan {
            preamble,
            staged,
            flush_sink,
        })
    }

    /// The staged bytes reached the sink.
    pub(crate) fn mark_drained(&mut self) {
        self.buffer.clear();
    }

    /// Drop the buffer and encoder state at disposal.
    pub(crate) fn release(&mut self) {
        self.buffer = StagingBuffer::with_capacity(0);
        self.encoder.reset();
    }

    #[cfg(test)]
    pub(crate) fn encoder_pending(&self) -> bool {
        self.encoder.is_pending()
    }
}

/// Copy `s[*offset..]` into `buffer`, splitting only at char boundaries.
fn stage_str(buffer: &mut StagingBuffer, s: &str, offset: &mut usize) -> Progress {
    while *offset < s.len() {
        let end = str_chunk_end(s, *offset, buffer.remaining());
        if end == *offset {
            return Progress::BufferFull;
        }
        buffer.copy_from(&s.as_bytes()[*offset..end]);
        *offset = end;
    }
    Progress::Complete
}
