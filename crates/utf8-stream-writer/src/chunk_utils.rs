//! Helpers for splitting writer input into pieces, used by property tests and
//! the fuzz target.

/// Split `payload` into approximately equal-sized chunks without
/// breaking UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// Split UTF-16 code units into approximately equal-sized chunks without
/// separating a surrogate pair.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_unit_chunks(units: &[u16], parts: usize) -> Vec<&[u16]> {
    assert!(parts > 0);
    let len = units.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && (0xDC00..=0xDFFF).contains(&units[end]) {
            end += 1;
        }
        chunks.push(&units[start..end]);
        start = end;
    }
    chunks
}

/// Split `payload` at the given byte offsets, each moved forward to the next
/// char boundary. Offsets are taken modulo the payload length.
#[must_use]
pub fn split_at_offsets<'a>(payload: &'a str, offsets: &[usize]) -> Vec<&'a str> {
    if payload.is_empty() {
        return Vec::new();
    }
    let mut cuts: Vec<usize> = offsets
        .iter()
        .map(|&offset| {
            let mut cut = offset % payload.len();
            while !payload.is_char_boundary(cut) {
                cut += 1;
            }
            cut
        })
        .collect();
    cuts.push(0);
    cuts.push(payload.len());
    cuts.sort_unstable();
    cuts.dedup();
    cuts.windows(2).map(|w| &payload[w[0]..w[1]]).collect()
}
