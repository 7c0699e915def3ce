use std::{
    cell::{Ref, RefCell},
    io,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use futures::io::AsyncWrite;

use crate::{BlockingSink, Sink, Utf8Writer, WriterOptions};

/// Everything a [`RecordingSink`] saw, plus switches to make it fail.
#[derive(Debug, Default)]
pub(crate) struct Recorded {
    pub(crate) bytes: Vec<u8>,
    /// One entry per `write` call.
    pub(crate) writes: Vec<Vec<u8>>,
    pub(crate) flushes: usize,
    pub(crate) closes: usize,
    pub(crate) fail_writes: bool,
    pub(crate) fail_flushes: bool,
    pub(crate) fail_closes: bool,
}

/// A blocking and async sink whose state stays observable after the writer
/// took ownership of it.
#[derive(Debug, Clone)]
pub(crate) struct RecordingSink {
    state: Rc<RefCell<Recorded>>,
    position: Option<u64>,
    writable: bool,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::default(),
            position: None,
            writable: true,
        }
    }

    pub(crate) fn seekable_at(position: u64) -> Self {
        Self {
            position: Some(position),
            ..Self::new()
        }
    }

    pub(crate) fn read_only() -> Self {
        Self {
            writable: false,
            ..Self::new()
        }
    }

    pub(crate) fn state(&self) -> Ref<'_, Recorded> {
        self.state.borrow()
    }

    pub(crate) fn set(&self, f: impl FnOnce(&mut Recorded)) {
        f(&mut self.state.borrow_mut());
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.state().bytes.clone()
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8(self.bytes()).expect("sink received invalid UTF-8")
    }
}

impl io::Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(io::Error::other("write failed"));
        }
        state.bytes.extend_from_slice(buf);
        state.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_flushes {
            return Err(io::Error::other("flush failed"));
        }
        state.flushes += 1;
        Ok(())
    }
}

impl Sink for RecordingSink {
    fn can_write(&self) -> bool {
        self.writable
    }

    fn seek_position(&mut self) -> Option<u64> {
        self.position
    }
}

impl BlockingSink for RecordingSink {
    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        if state.fail_closes {
            return Err(io::Error::other("close failed"));
        }
        Ok(())
    }
}

impl AsyncWrite for RecordingSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(io::Write::write(self.get_mut(), buf))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(io::Write::flush(self.get_mut()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(BlockingSink::close(self.get_mut()))
    }
}

/// Options with a `\n` newline so expectations do not depend on the host.
pub(crate) fn lf_options() -> WriterOptions {
    WriterOptions {
        newline: "\n".into(),
        ..WriterOptions::default()
    }
}

pub(crate) fn recording_writer(
    options: WriterOptions,
) -> (Utf8Writer<RecordingSink>, RecordingSink) {
    let sink = RecordingSink::new();
    let writer = Utf8Writer::with_options(sink.clone(), options).unwrap();
    (writer, sink)
}

pub(crate) fn quickcheck_tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}
