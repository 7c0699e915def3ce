//! Locale-invariant, allocation-free formatting of primitive values.
//!
//! Every formatter writes straight into a byte slice through a
//! [`SliceCursor`](cursor::SliceCursor) and reports "does not fit" instead of
//! truncating. [`Formats::worst_case_len`] bounds the output of every
//! formatter under a given configuration; the writer sizes its buffer from it.

mod cursor;
mod guid;
mod number;
mod temporal;

use core::fmt;
use std::time::{Duration, SystemTime};

use cursor::SliceCursor;
pub use guid::Guid;
pub use number::Decimal;
pub use temporal::DateTimeOffset;

/// Layout of `bool` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum BoolFormat {
    /// `True` / `False`.
    #[default]
    Capitalized,
    /// `true` / `false`.
    Lowercase,
}

/// Layout of integer values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum IntegerFormat {
    /// Plain decimal digits with a leading `-` for negatives.
    #[default]
    Decimal,
    /// Decimal, left-padded with zeros to at least this many digits.
    Padded(u8),
    /// Lowercase hexadecimal; negatives print their two's complement.
    LowerHex,
    /// Uppercase hexadecimal; negatives print their two's complement.
    UpperHex,
    /// Decimal with `,` between groups of three digits.
    Grouped,
}

/// Layout of `f32` and `f64` values.
///
/// Not-a-number and infinities always print as `NaN`, `Infinity` and
/// `-Infinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum FloatFormat {
    /// Shortest digits that round-trip. Scientific notation (`1.5E+20`) is
    /// used outside the fixed range of the type.
    #[default]
    General,
    /// This many digits after the decimal point.
    Fixed(u8),
    /// One digit, then this many after the point, then a three-digit exponent.
    Exponential(u8),
}

/// Layout of [`Decimal`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum DecimalFormat {
    /// All digits of the value's own scale.
    #[default]
    General,
    /// This many fractional digits, rounding half away from zero.
    Fixed(u8),
}

/// Layout of `SystemTime` and [`DateTimeOffset`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum DateTimeFormat {
    /// `MM/dd/yyyy HH:mm:ss`
    #[default]
    General,
    /// `yyyy-MM-ddTHH:mm:ss.fffffffZ`
    RoundTrip,
    /// `yyyy-MM-ddTHH:mm:ss`
    Sortable,
    /// `ddd, dd MMM yyyy HH:mm:ss GMT`
    Rfc1123,
}

/// Layout of `Duration` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum TimeSpanFormat {
    /// `[d.]hh:mm:ss[.fffffff]`
    #[default]
    Constant,
    /// `[d:]h:mm:ss[.FFFFFFF]`
    General,
}

/// Layout of [`Guid`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum GuidFormat {
    /// `00112233-4455-6677-8899-aabbccddeeff`
    #[default]
    Hyphenated,
    /// `00112233445566778899aabbccddeeff`
    Simple,
    /// `{00112233-4455-6677-8899-aabbccddeeff}`
    Braced,
    /// `(00112233-4455-6677-8899-aabbccddeeff)`
    Parenthesized,
}

/// Per-type formatting choices of a writer.
///
/// ```rust
/// use utf8_stream_writer::{FloatFormat, Formats, IntegerFormat};
///
/// let formats = Formats {
///     int32: IntegerFormat::Grouped,
///     double: FloatFormat::Fixed(2),
///     ..Formats::default()
/// };
/// assert!(formats.worst_case_len() >= 311);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct Formats {
    /// `bool`
    pub boolean: BoolFormat,
    /// `i32` and narrower signed integers.
    pub int32: IntegerFormat,
    /// `i64` and `isize`.
    pub int64: IntegerFormat,
    /// `u32` and narrower unsigned integers.
    pub uint32: IntegerFormat,
    /// `u64` and `usize`.
    pub uint64: IntegerFormat,
    /// `f32`
    pub single: FloatFormat,
    /// `f64`
    pub double: FloatFormat,
    /// [`Decimal`]
    pub decimal: DecimalFormat,
    /// `SystemTime`
    pub date_time: DateTimeFormat,
    /// [`DateTimeOffset`]
    pub date_time_offset: DateTimeFormat,
    /// `Duration`
    pub time_span: TimeSpanFormat,
    /// [`Guid`]
    pub guid: GuidFormat,
}

const fn max_len(a: usize, b: usize) -> usize {
    if a > b { a } else { b }
}

impl IntegerFormat {
    const fn worst_case_len(self) -> usize {
        match self {
            // "-9223372036854775808"
            Self::Decimal => 20,
            Self::Padded(width) => max_len(width as usize, 20) + 1,
            Self::LowerHex | Self::UpperHex => 16,
            // "-9,223,372,036,854,775,808"
            Self::Grouped => 26,
        }
    }
}

impl FloatFormat {
    /// `fixed_digits` is the number of integer digits of the type's largest
    /// finite value.
    const fn worst_case_len(self, fixed_digits: usize) -> usize {
        match self {
            Self::General => 32,
            // sign, digits, point
            Self::Fixed(precision) => fixed_digits + 2 + precision as usize,
            // sign, digit, point, "E+", three digits
            Self::Exponential(precision) => 8 + precision as usize,
        }
    }
}

impl Formats {
    /// Upper bound, in bytes, of any primitive formatted with these choices.
    #[must_use]
    pub const fn worst_case_len(&self) -> usize {
        let integers = max_len(
            max_len(self.int32.worst_case_len(), self.int64.worst_case_len()),
            max_len(self.uint32.worst_case_len(), self.uint64.worst_case_len()),
        );
        let floats = max_len(
            self.single.worst_case_len(39),
            self.double.worst_case_len(309),
        );
        let decimal = match self.decimal {
            DecimalFormat::General => 32,
            DecimalFormat::Fixed(precision) => 32 + precision as usize,
        };
        // Dates: 12-digit years, a sign, the widest layout and an offset.
        // Time spans: 15 day digits plus `.hh:mm:ss.fffffff`. Guids: 38.
        let fixed = max_len(max_len(56, 40), 38);
        max_len(max_len(integers, floats), max_len(decimal, fixed))
    }

    /// Format `value` into the start of `dst`; `None` if it does not fit.
    pub(crate) fn format_into(&self, value: Primitive, dst: &mut [u8]) -> Option<usize> {
        let mut cur = SliceCursor::new(dst);
        let result = match value {
            Primitive::Bool(v) => cur.put(match (self.boolean, v) {
                (BoolFormat::Capitalized, true) => &b"True"[..],
                (BoolFormat::Capitalized, false) => b"False",
                (BoolFormat::Lowercase, true) => b"true",
                (BoolFormat::Lowercase, false) => b"false",
            }),
            Primitive::I32(v) => number::write_integer(&mut cur, v, self.int32),
            Primitive::I64(v) => number::write_integer(&mut cur, v, self.int64),
            Primitive::U32(v) => number::write_integer(&mut cur, v, self.uint32),
            Primitive::U64(v) => number::write_integer(&mut cur, v, self.uint64),
            Primitive::F32(v) => number::write_float(&mut cur, v, self.single),
            Primitive::F64(v) => number::write_float(&mut cur, v, self.double),
            Primitive::Decimal(v) => number::write_decimal(&mut cur, v, self.decimal),
            Primitive::DateTime(v) => temporal::write_date_time(&mut cur, v, self.date_time),
            Primitive::DateTimeOffset(v) => {
                temporal::write_date_time_offset(&mut cur, v, self.date_time_offset)
            }
            Primitive::TimeSpan(v) => temporal::write_time_span(&mut cur, v, self.time_span),
            Primitive::Guid(v) => guid::write_guid(&mut cur, v, self.guid),
        };
        result.ok().map(|()| cur.written())
    }
}

/// A value with a direct, allocation-free formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// See [`Formats::boolean`].
    Bool(bool),
    /// See [`Formats::int32`].
    I32(i32),
    /// See [`Formats::int64`].
    I64(i64),
    /// See [`Formats::uint32`].
    U32(u32),
    /// See [`Formats::uint64`].
    U64(u64),
    /// See [`Formats::single`].
    F32(f32),
    /// See [`Formats::double`].
    F64(f64),
    /// See [`Formats::decimal`].
    Decimal(Decimal),
    /// A UTC instant; see [`Formats::date_time`].
    DateTime(SystemTime),
    /// See [`Formats::date_time_offset`].
    DateTimeOffset(DateTimeOffset),
    /// See [`Formats::time_span`].
    TimeSpan(Duration),
    /// See [`Formats::guid`].
    Guid(Guid),
}

impl Primitive {
    /// Short name of the carried type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "Decimal",
            Self::DateTime(_) => "SystemTime",
            Self::DateTimeOffset(_) => "DateTimeOffset",
            Self::TimeSpan(_) => "Duration",
            Self::Guid(_) => "Guid",
        }
    }
}

/// Anything `write_value` accepts.
///
/// Primitives take their direct formatter, characters and strings go to the
/// character path, and everything else is rendered through `Display`.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// A primitive with a direct formatter.
    Primitive(Primitive),
    /// A single character.
    Char(char),
    /// A string slice.
    Str(&'a str),
    /// Any other displayable value.
    Display(&'a dyn fmt::Display),
}

impl<'a> Value<'a> {
    /// Wrap a value that has no direct formatter.
    pub fn display<T: fmt::Display>(value: &'a T) -> Self {
        Self::Display(value)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            Self::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Display(d) => f.debug_tuple("Display").field(&format_args!("{d}")).finish(),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl From<char> for Value<'_> {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<Primitive> for Value<'_> {
    fn from(value: Primitive) -> Self {
        Self::Primitive(value)
    }
}

macro_rules! primitive_from {
    (@widen $value:ident) => { $value };
    (@widen $value:ident, $wide:ty) => { <$wide>::from($value) };
    ($($ty:ty => $variant:ident $(as $wide:ty)?),* $(,)?) => {
        $(
            impl From<$ty> for Primitive {
                fn from(value: $ty) -> Self {
                    Self::$variant(primitive_from!(@widen value $(, $wide)?))
                }
            }

            impl From<$ty> for Value<'_> {
                fn from(value: $ty) -> Self {
                    Self::Primitive(value.into())
                }
            }
        )*
    };
}

primitive_from! {
    bool => Bool,
    i8 => I32 as i32,
    i16 => I32 as i32,
    i32 => I32,
    i64 => I64,
    u8 => U32 as u32,
    u16 => U32 as u32,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    SystemTime => DateTime,
    DateTimeOffset => DateTimeOffset,
    Duration => TimeSpan,
    Guid => Guid,
}

// `isize`/`usize` are at most 64 bits on every supported target.
#[allow(clippy::cast_possible_truncation)]
impl From<isize> for Primitive {
    fn from(value: isize) -> Self {
        Self::I64(value as i64)
    }
}

#[allow(clippy::cast_possible_truncation)]
impl From<usize> for Primitive {
    fn from(value: usize) -> Self {
        Self::U64(value as u64)
    }
}

impl From<isize> for Value<'_> {
    fn from(value: isize) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<usize> for Value<'_> {
    fn from(value: usize) -> Self {
        Self::Primitive(value.into())
    }
}
