use core::fmt;

/// `fmt::Write` over a borrowed byte slice that fails instead of truncating.
///
/// Formatters write through this so that "does not fit" surfaces as
/// `fmt::Error` and the caller can flush and retry on an empty buffer.
pub(crate) struct SliceCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    #[inline]
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub(crate) fn written(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn put(&mut self, bytes: &[u8]) -> fmt::Result {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    #[inline]
    pub(crate) fn put_byte(&mut self, byte: u8) -> fmt::Result {
        self.put(&[byte])
    }

    /// Write `value` in decimal, left-padded with zeros to `width` digits.
    pub(crate) fn put_padded(&mut self, value: u64, width: usize) -> fmt::Result {
        let mut digits = [0u8; 20];
        let mut i = digits.len();
        let mut v = value;
        loop {
            i -= 1;
            digits[i] = b'0' + (v % 10) as u8;
            v /= 10;
            if v == 0 {
                break;
            }
        }
        for _ in (digits.len() - i)..width {
            self.put_byte(b'0')?;
        }
        self.put(&digits[i..])
    }
}

impl fmt::Write for SliceCursor<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put(s.as_bytes())
    }
}

/// Small owned buffer for intermediate renderings such as `{:e}` output.
pub(crate) struct StackText<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> StackText<N> {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<const N: usize> fmt::Write for StackText<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > N {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write;

    use super::*;

    #[test]
    fn overflow_is_an_error_not_a_truncation() {
        let mut raw = [0u8; 4];
        let mut cur = SliceCursor::new(&mut raw);
        assert!(cur.write_str("abc").is_ok());
        assert!(cur.write_str("de").is_err());
        assert_eq!(cur.written(), 3);
    }

    #[test]
    fn padded_digits() {
        let mut raw = [0u8; 32];
        let mut cur = SliceCursor::new(&mut raw);
        cur.put_padded(42, 5).unwrap();
        cur.put_byte(b'|').unwrap();
        cur.put_padded(123_456, 2).unwrap();
        let n = cur.written();
        assert_eq!(&raw[..n], b"00042|123456");
    }
}
