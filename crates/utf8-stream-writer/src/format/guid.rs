use core::fmt;

use super::GuidFormat;

/// A 128-bit globally unique identifier.
///
/// Fields are rendered in big-endian order: `from_u128(0x0011…ff)` prints as
/// `00112233-4455-6677-8899-aabbccddeeff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Guid(u128);

impl Guid {
    /// The all-zero identifier.
    pub const NIL: Self = Self(0);

    /// Wrap a raw 128-bit value.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Build from 16 bytes in big-endian order.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    /// The raw 128-bit value.
    #[must_use]
    pub const fn as_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_guid(f, *self, GuidFormat::Hyphenated)
    }
}

pub(crate) fn write_guid<W: fmt::Write>(out: &mut W, guid: Guid, format: GuidFormat) -> fmt::Result {
    let v = guid.0;
    let (open, close) = match format {
        GuidFormat::Hyphenated | GuidFormat::Simple => ("", ""),
        GuidFormat::Braced => ("{", "}"),
        GuidFormat::Parenthesized => ("(", ")"),
    };
    if matches!(format, GuidFormat::Simple) {
        return write!(out, "{v:032x}");
    }
    write!(
        out,
        "{open}{:08x}-{:04x}-{:04x}-{:04x}-{:012x}{close}",
        v >> 96,
        (v >> 80) & 0xFFFF,
        (v >> 64) & 0xFFFF,
        (v >> 48) & 0xFFFF,
        v & 0xFFFF_FFFF_FFFF,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: Guid = Guid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);

    fn render(format: GuidFormat) -> String {
        let mut out = String::new();
        write_guid(&mut out, SAMPLE, format).unwrap();
        out
    }

    #[test]
    fn layouts() {
        assert_eq!(render(GuidFormat::Hyphenated), "00112233-4455-6677-8899-aabbccddeeff");
        assert_eq!(render(GuidFormat::Simple), "00112233445566778899aabbccddeeff");
        assert_eq!(render(GuidFormat::Braced), "{00112233-4455-6677-8899-aabbccddeeff}");
        assert_eq!(render(GuidFormat::Parenthesized), "(00112233-4455-6677-8899-aabbccddeeff)");
        assert_eq!(Guid::NIL.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn bytes_are_big_endian() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0xAB;
        assert!(Guid::from_bytes(bytes).to_string().starts_with("ab000000-"));
    }
}
