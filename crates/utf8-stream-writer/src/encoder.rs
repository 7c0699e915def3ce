//! Incremental transcoding into UTF-8.
//!
//! [`Utf16Encoder`] converts UTF-16 code units and may hold a high surrogate
//! between calls, so a surrogate pair split across two chunks of the same
//! logical write still comes out as one 4-byte sequence. Every call emits only
//! complete UTF-8 sequences; the pending surrogate lives in the encoder, never
//! in the output.

use crate::WriterError;

/// UTF-8 byte-order mark.
pub(crate) const UTF8_PREAMBLE: &[u8] = b"\xEF\xBB\xBF";

/// Largest UTF-8 expansion of a single UTF-16 code unit.
const MAX_BYTES_PER_UNIT: usize = 3;

const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();

/// Worst-case UTF-8 length of `units` code units fed to an encoder that may
/// already hold a pending high surrogate.
#[inline]
pub(crate) const fn max_byte_count(units: usize) -> usize {
    (units + 1) * MAX_BYTES_PER_UNIT
}

/// How many code units can be offered so that [`max_byte_count`] fits `space`.
#[inline]
pub(crate) const fn units_fitting(space: usize) -> usize {
    (space / MAX_BYTES_PER_UNIT).saturating_sub(1)
}

/// Stateful UTF-16 to UTF-8 transcoder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Utf16Encoder {
    pending_high: Option<u16>,
}

impl Utf16Encoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Encode `src` into `dst`, stopping at the first unpaired surrogate.
    ///
    /// Returns the number of bytes written, which on error covers everything
    /// before the offending unit. `dst` must hold at least
    /// `max_byte_count(src.len())` bytes.
    pub(crate) fn encode(&mut self, src: &[u16], dst: &mut [u8]) -> (usize, Result<(), WriterError>) {
        debug_assert!(dst.len() >= max_byte_count(src.len()));
        let mut written = 0;
        for &unit in src {
            let scalar = match (self.pending_high.take(), unit) {
                (Some(high), 0xDC00..=0xDFFF) => {
                    0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00)
                }
                (Some(high), _) => return (written, Err(WriterError::UnpairedSurrogate(high))),
                (None, 0xD800..=0xDBFF) => {
                    self.pending_high = Some(unit);
                    continue;
                }
                (None, 0xDC00..=0xDFFF) => {
                    return (written, Err(WriterError::UnpairedSurrogate(unit)));
                }
                (None, _) => u32::from(unit),
            };
            // Surrogates were handled above, so every scalar here is valid.
            let Some(ch) = char::from_u32(scalar) else {
                return (written, Err(WriterError::UnpairedSurrogate(unit)));
            };
            written += ch.encode_utf8(&mut dst[written..]).len();
        }
        (written, Ok(()))
    }

    /// End of a logical write: a surrogate still pending has no partner.
    pub(crate) fn finish(&mut self) -> Result<(), WriterError> {
        match self.pending_high.take() {
            Some(high) => Err(WriterError::UnpairedSurrogate(high)),
            None => Ok(()),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.pending_high = None;
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending_high.is_some()
    }
}

/// Longest prefix of `s[offset..]` that ends on a char boundary and is at most
/// `space` bytes long. Returns the end index.
#[inline]
pub(crate) fn str_chunk_end(s: &str, offset: usize, space: usize) -> usize {
    let mut end = s.len().min(offset + space);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Decode the next sequence of lossy UTF-8 input.
///
/// Returns the input length consumed and the bytes to emit for it: the
/// sequence itself when valid, U+FFFD otherwise.
#[inline]
pub(crate) fn next_lossy(src: &[u8]) -> (usize, &[u8]) {
    let (ch, len) = bstr::decode_utf8(src);
    match ch {
        Some(_) => (len, &src[..len]),
        None => (len.max(1), REPLACEMENT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(units: &[u16]) -> Result<Vec<u8>, WriterError> {
        let mut enc = Utf16Encoder::new();
        let mut out = vec![0; max_byte_count(units.len())];
        let (n, result) = enc.encode(units, &mut out);
        result?;
        enc.finish()?;
        out.truncate(n);
        Ok(out)
    }

    #[test]
    fn encodes_bmp_and_astral() {
        let text = "aé€😀";
        let units: Vec<u16> = text.encode_utf16().collect();
        assert_eq!(encode_all(&units).unwrap(), text.as_bytes());
    }

    #[test]
    fn pair_split_across_calls() {
        let units: Vec<u16> = "😀".encode_utf16().collect();
        let mut enc = Utf16Encoder::new();
        let mut out = [0u8; 16];
        assert_eq!(enc.encode(&units[..1], &mut out).0, 0);
        assert!(enc.is_pending());
        let (n, result) = enc.encode(&units[1..], &mut out);
        assert!(result.is_ok());
        assert_eq!(&out[..n], "😀".as_bytes());
        assert!(enc.finish().is_ok());
    }

    #[test]
    fn lone_surrogates_are_rejected() {
        assert!(matches!(
            encode_all(&[0xDC00]),
            Err(WriterError::UnpairedSurrogate(0xDC00))
        ));
        assert!(matches!(
            encode_all(&[0xD800, 0x0041]),
            Err(WriterError::UnpairedSurrogate(0xD800))
        ));
        assert!(matches!(
            encode_all(&[0x0041, 0xD83D]),
            Err(WriterError::UnpairedSurrogate(0xD83D))
        ));
    }

    #[test]
    fn error_reports_bytes_already_written() {
        let mut enc = Utf16Encoder::new();
        let mut out = [0u8; 16];
        let (n, result) = enc.encode(&[0x61, 0xE9, 0xDC00, 0x62], &mut out);
        assert_eq!(&out[..n], "aé".as_bytes());
        assert!(matches!(result, Err(WriterError::UnpairedSurrogate(0xDC00))));
    }

    #[test]
    fn chunk_end_respects_char_boundaries() {
        let s = "aé😀";
        assert_eq!(str_chunk_end(s, 0, 2), 1);
        assert_eq!(str_chunk_end(s, 1, 2), 3);
        assert_eq!(str_chunk_end(s, 3, 3), 3);
        assert_eq!(str_chunk_end(s, 3, 4), 7);
    }

    #[test]
    fn lossy_replaces_invalid_bytes() {
        assert_eq!(next_lossy(b"abc"), (1, &b"a"[..]));
        assert_eq!(next_lossy("é!".as_bytes()), (2, "é".as_bytes()));
        assert_eq!(next_lossy(b"\xFFa"), (1, REPLACEMENT));
    }

    #[test]
    fn unit_budget_never_overflows() {
        for space in 0..64 {
            assert!(units_fitting(space) == 0 || max_byte_count(units_fitting(space)) <= space);
        }
    }
}
