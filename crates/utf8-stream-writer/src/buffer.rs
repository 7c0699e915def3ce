/// Fixed-capacity staging area for bytes that have not reached the sink yet.
///
/// Bytes `[0, pos)` are valid output; `pos` never exceeds the capacity.
#[derive(Debug)]
pub(crate) struct StagingBuffer {
    bytes: Box<[u8]>,
    pos: usize,
}

impl StagingBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            pos: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pos == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.pos == self.bytes.len()
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// The staged bytes.
    #[inline]
    pub(crate) fn filled(&self) -> &[u8] {
        &self.bytes[..self.pos]
    }

    /// Unused tail of the buffer. Pair with [`advance`](Self::advance).
    #[inline]
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[self.pos..]
    }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    /// Append one byte. The caller checks `is_full` first.
    #[inline]
    pub(crate) fn push(&mut self, byte: u8) {
        self.bytes[self.pos] = byte;
        self.pos += 1;
    }

    /// Copy as much of `src` as fits and return the number of bytes taken.
    pub(crate) fn copy_from(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.remaining());
        self.bytes[self.pos..self.pos + n].copy_from_slice(&src[..n]);
        self.pos += n;
        n
    }

    pub(crate) fn clear(&mut self) {
        self.pos = 0;
    }
}
