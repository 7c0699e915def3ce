//! Byte destinations a [`Utf8Writer`](crate::Utf8Writer) can drain into.
//!
//! [`Sink`] carries the two questions the writer asks at construction: may it
//! write at all, and is the destination already positioned past its start.
//! [`BlockingSink`] and [`AsyncSink`] add the I/O itself.

use std::{
    fs::File,
    io::{self, Seek},
};

/// Capabilities shared by blocking and async sinks.
pub trait Sink {
    /// Whether the sink accepts writes. A writer refuses to wrap a sink that
    /// returns `false`.
    fn can_write(&self) -> bool {
        true
    }

    /// Current position if the sink is seekable, `None` otherwise.
    ///
    /// Consulted once at construction; a non-zero position suppresses the
    /// preamble.
    fn seek_position(&mut self) -> Option<u64> {
        None
    }
}

/// A sink driven by blocking I/O.
pub trait BlockingSink: Sink + io::Write {
    /// Release the sink. Called by `dispose` when the writer owns the sink.
    ///
    /// The default flushes; the sink itself is dropped afterwards.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// A sink driven by `futures` I/O. Closing uses
/// [`AsyncWriteExt::close`](futures::io::AsyncWriteExt::close).
pub trait AsyncSink: Sink + futures::io::AsyncWrite + Unpin {}

impl<T: Sink + futures::io::AsyncWrite + Unpin + ?Sized> AsyncSink for T {}

impl Sink for Vec<u8> {}

impl BlockingSink for Vec<u8> {}

impl<T> Sink for io::Cursor<T>
where
    T: AsRef<[u8]>,
{
    fn seek_position(&mut self) -> Option<u64> {
        Some(self.position())
    }
}

impl BlockingSink for io::Cursor<&mut Vec<u8>> {}
impl BlockingSink for io::Cursor<Vec<u8>> {}
impl BlockingSink for io::Cursor<&mut [u8]> {}
impl BlockingSink for io::Cursor<Box<[u8]>> {}

impl Sink for File {
    fn seek_position(&mut self) -> Option<u64> {
        self.stream_position().ok()
    }
}

impl BlockingSink for File {
    fn close(&mut self) -> io::Result<()> {
        io::Write::flush(self)?;
        self.sync_all()
    }
}

impl Sink for io::Sink {}
impl BlockingSink for io::Sink {}

impl Sink for io::Stdout {}
impl BlockingSink for io::Stdout {}

impl Sink for io::Stderr {}
impl BlockingSink for io::Stderr {}

impl<W: Sink + io::Write> Sink for io::BufWriter<W> {
    fn can_write(&self) -> bool {
        self.get_ref().can_write()
    }
}

impl<W: BlockingSink> BlockingSink for io::BufWriter<W> {
    fn close(&mut self) -> io::Result<()> {
        io::Write::flush(self)?;
        self.get_mut().close()
    }
}

impl<T> Sink for futures::io::Cursor<T>
where
    T: AsRef<[u8]> + Unpin,
{
    fn seek_position(&mut self) -> Option<u64> {
        Some(self.position())
    }
}

impl Sink for futures::io::Sink {}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn seek_position(&mut self) -> Option<u64> {
        (**self).seek_position()
    }
}

impl<S: BlockingSink + ?Sized> BlockingSink for &mut S {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn seek_position(&mut self) -> Option<u64> {
        (**self).seek_position()
    }
}

impl<S: BlockingSink + ?Sized> BlockingSink for Box<S> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
