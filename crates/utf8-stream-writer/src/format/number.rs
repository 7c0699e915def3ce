use core::fmt::{self, Write};

use super::{
    DecimalFormat, FloatFormat, IntegerFormat,
    cursor::{SliceCursor, StackText},
};

pub(crate) fn write_integer<T>(
    cur: &mut SliceCursor<'_>,
    value: T,
    format: IntegerFormat,
) -> fmt::Result
where
    T: Copy + fmt::Display + fmt::LowerHex + fmt::UpperHex + Into<i128>,
{
    match format {
        IntegerFormat::Decimal => write!(cur, "{value}"),
        IntegerFormat::LowerHex => write!(cur, "{value:x}"),
        IntegerFormat::UpperHex => write!(cur, "{value:X}"),
        IntegerFormat::Padded(width) => {
            let (negative, magnitude) = split_sign(value.into());
            if negative {
                cur.put_byte(b'-')?;
            }
            cur.put_padded(magnitude, usize::from(width))
        }
        IntegerFormat::Grouped => {
            let (negative, magnitude) = split_sign(value.into());
            if negative {
                cur.put_byte(b'-')?;
            }
            write_grouped(cur, magnitude)
        }
    }
}

// Every supported integer fits in i128 and its magnitude in u64.
#[allow(clippy::cast_possible_truncation)]
fn split_sign(value: i128) -> (bool, u64) {
    (value < 0, value.unsigned_abs() as u64)
}

fn write_grouped(cur: &mut SliceCursor<'_>, magnitude: u64) -> fmt::Result {
    let mut digits = StackText::<20>::new();
    write!(digits, "{magnitude}")?;
    let digits = digits.as_bytes();
    let head = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    cur.put(&digits[..head])?;
    for group in digits[head..].chunks(3) {
        cur.put_byte(b',')?;
        cur.put(group)?;
    }
    Ok(())
}

/// Floating-point types with a fast-path formatter.
pub(crate) trait FloatText: Copy + fmt::Display + fmt::LowerExp {
    /// Decimal exponent from which `General` switches to scientific notation.
    const GENERAL_PRECISION: i32;

    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
    fn is_sign_negative(self) -> bool;
}

impl FloatText for f32 {
    const GENERAL_PRECISION: i32 = 7;

    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }

    fn is_sign_negative(self) -> bool {
        f32::is_sign_negative(self)
    }
}

impl FloatText for f64 {
    const GENERAL_PRECISION: i32 = 15;

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }

    fn is_sign_negative(self) -> bool {
        f64::is_sign_negative(self)
    }
}

pub(crate) fn write_float<F: FloatText>(
    cur: &mut SliceCursor<'_>,
    value: F,
    format: FloatFormat,
) -> fmt::Result {
    if value.is_nan() {
        return cur.put(b"NaN");
    }
    if value.is_infinite() {
        return cur.put(if value.is_sign_negative() {
            &b"-Infinity"[..]
        } else {
            b"Infinity"
        });
    }

    match format {
        FloatFormat::General => {
            let mut sci = StackText::<48>::new();
            write!(sci, "{value:e}")?;
            let (mantissa, exponent) = split_exponent(sci.as_bytes());
            if -5 < exponent && exponent < F::GENERAL_PRECISION {
                write!(cur, "{value}")
            } else {
                cur.put(mantissa)?;
                write_exponent(cur, exponent, 2)
            }
        }
        FloatFormat::Fixed(precision) => write!(cur, "{value:.*}", usize::from(precision)),
        FloatFormat::Exponential(precision) => {
            let mut sci = StackText::<320>::new();
            write!(sci, "{value:.*e}", usize::from(precision))?;
            let (mantissa, exponent) = split_exponent(sci.as_bytes());
            cur.put(mantissa)?;
            write_exponent(cur, exponent, 3)
        }
    }
}

/// Split Rust's `{:e}` rendering (`-1.25e-7`) into mantissa and exponent.
fn split_exponent(sci: &[u8]) -> (&[u8], i32) {
    let Some(at) = sci.iter().position(|&b| b == b'e') else {
        return (sci, 0);
    };
    let (negative, digits) = match &sci[at + 1..] {
        [b'-', rest @ ..] => (true, rest),
        rest => (false, rest),
    };
    let magnitude = digits
        .iter()
        .fold(0i32, |acc, d| acc * 10 + i32::from(d - b'0'));
    (&sci[..at], if negative { -magnitude } else { magnitude })
}

fn write_exponent(cur: &mut SliceCursor<'_>, exponent: i32, min_digits: usize) -> fmt::Result {
    cur.put_byte(b'E')?;
    cur.put_byte(if exponent < 0 { b'-' } else { b'+' })?;
    cur.put_padded(u64::from(exponent.unsigned_abs()), min_digits)
}

/// A base-10 fixed-point number: a 96-bit signed magnitude and a scale of
/// 0 to 28 fractional digits.
///
/// ```rust
/// use utf8_stream_writer::Decimal;
///
/// let price = Decimal::new(150, 2).unwrap();
/// assert_eq!(price.to_string(), "1.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

const MANTISSA_LIMIT: i128 = 1 << 96;

impl Decimal {
    /// Largest supported scale.
    pub const MAX_SCALE: u8 = 28;

    /// `79228162514264337593543950335`.
    pub const MAX: Self = Self {
        mantissa: MANTISSA_LIMIT - 1,
        scale: 0,
    };

    /// `-79228162514264337593543950335`.
    pub const MIN: Self = Self {
        mantissa: -(MANTISSA_LIMIT - 1),
        scale: 0,
    };

    /// `mantissa × 10^-scale`, or `None` if the mantissa needs more than 96
    /// bits or the scale exceeds [`MAX_SCALE`](Self::MAX_SCALE).
    #[must_use]
    pub const fn new(mantissa: i128, scale: u8) -> Option<Self> {
        if scale > Self::MAX_SCALE || mantissa <= -MANTISSA_LIMIT || mantissa >= MANTISSA_LIMIT {
            return None;
        }
        Some(Self { mantissa, scale })
    }

    /// The unscaled value.
    #[must_use]
    pub const fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of fractional digits.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self {
            mantissa: i128::from(value),
            scale: 0,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_decimal(f, *self, DecimalFormat::General)
    }
}

pub(crate) fn write_decimal<W: Write>(out: &mut W, value: Decimal, format: DecimalFormat) -> fmt::Result {
    let magnitude = value.mantissa.unsigned_abs();
    let (magnitude, scale, padding) = match format {
        DecimalFormat::General => (magnitude, value.scale, 0),
        DecimalFormat::Fixed(precision) if precision >= value.scale => {
            (magnitude, value.scale, precision - value.scale)
        }
        DecimalFormat::Fixed(precision) => {
            (round_digits(magnitude, value.scale - precision), precision, 0)
        }
    };
    let scale = usize::from(scale);

    if value.mantissa < 0 && magnitude != 0 {
        out.write_char('-')?;
    }

    let mut digits = StackText::<40>::new();
    write!(digits, "{magnitude}")?;
    // Digits are ASCII, so every slice below is valid UTF-8.
    let digits = core::str::from_utf8(digits.as_bytes()).map_err(|_| fmt::Error)?;

    if scale == 0 {
        out.write_str(digits)?;
        if padding > 0 {
            out.write_char('.')?;
        }
    } else if digits.len() <= scale {
        out.write_str("0.")?;
        for _ in digits.len()..scale {
            out.write_char('0')?;
        }
        out.write_str(digits)?;
    } else {
        let (int, frac) = digits.split_at(digits.len() - scale);
        out.write_str(int)?;
        out.write_char('.')?;
        out.write_str(frac)?;
    }
    for _ in 0..padding {
        out.write_char('0')?;
    }
    Ok(())
}

/// Drop `dropped` trailing digits of `magnitude`, rounding half away from zero.
fn round_digits(magnitude: u128, dropped: u8) -> u128 {
    let divisor = 10u128.pow(u32::from(dropped));
    let (quotient, remainder) = (magnitude / divisor, magnitude % divisor);
    if remainder * 2 >= divisor {
        quotient + 1
    } else {
        quotient
    }
}
