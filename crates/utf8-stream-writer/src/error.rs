use core::fmt;
use std::io;

use thiserror::Error;

/// Errors produced by [`Utf8Writer`](crate::Utf8Writer).
///
/// Sink failures are carried unchanged in [`WriterError::Io`]; the writer never
/// retries them and never rolls back its buffer afterwards, so a writer that
/// returned `Io` should be treated as unusable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriterError {
    /// A construction argument was rejected.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// An explicit buffer size of zero was requested.
    #[error("buffer size {requested} is out of range; it must be positive")]
    BufferSizeOutOfRange {
        /// The rejected size.
        requested: usize,
    },

    /// The writer was used after `dispose` or `dispose_async`.
    #[error("the writer has already been disposed")]
    Disposed,

    /// An async operation observed a cancelled token before doing any work.
    #[error("the operation was canceled")]
    Canceled,

    /// A primitive did not fit into an empty buffer.
    ///
    /// Construction sizes the buffer for the worst case of every configured
    /// format, so this indicates a bug rather than a caller mistake.
    #[error("formatted {type_name} does not fit into a {capacity}-byte buffer")]
    FormatOverflow {
        /// The primitive being formatted.
        type_name: &'static str,
        /// Capacity of the writer's buffer.
        capacity: usize,
    },

    /// UTF-16 input contained a surrogate without its partner.
    #[error("unpaired UTF-16 surrogate 0x{0:04X}")]
    UnpairedSurrogate(u16),

    /// A `Display` implementation reported an error.
    #[error("formatting a value failed")]
    Fmt(#[from] fmt::Error),

    /// The sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WriterError {
    /// Whether the error came from the underlying sink.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
