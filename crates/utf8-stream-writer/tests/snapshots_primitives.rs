#![expect(missing_docs)]

use std::time::Duration;

use insta::assert_snapshot;
use utf8_stream_writer::{
    BoolFormat, DateTimeFormat, DateTimeOffset, Decimal, DecimalFormat, FloatFormat, Formats,
    Guid, GuidFormat, IntegerFormat, TimeSpanFormat, Utf8Writer, Value, WriterOptions,
};

mod common;

use crate::common::{SAMPLE_GUID, collected, options, sample_instant};

fn render_lines<'a>(formats: Formats, values: impl IntoIterator<Item = Value<'a>>) -> String {
    let mut writer = Utf8Writer::with_options(
        Vec::new(),
        WriterOptions {
            formats,
            ..options()
        },
    )
    .unwrap();
    for value in values {
        writer.write_line_value(value).unwrap();
    }
    collected(writer).trim_end().to_owned()
}

#[test]
fn snapshot_default_formats() {
    let at = sample_instant(0);
    let values: Vec<Value<'_>> = vec![
        true.into(),
        false.into(),
        i32::MIN.into(),
        i32::MAX.into(),
        i64::MIN.into(),
        u64::MAX.into(),
        0.1f64.into(),
        f32::MIN_POSITIVE.into(),
        f64::MAX.into(),
        f64::EPSILON.into(),
        (-0.0f64).into(),
        1e-5f64.into(),
        12_345.678f32.into(),
        f64::NAN.into(),
        f64::INFINITY.into(),
        Decimal::MAX.into(),
        Decimal::new(-1, 28).unwrap().into(),
        at.into(),
        DateTimeOffset::new(at, 330).unwrap().into(),
        Duration::new(93_784, 5_000_000).into(),
        Duration::ZERO.into(),
        Guid::from_u128(SAMPLE_GUID).into(),
    ];

    assert_snapshot!(render_lines(Formats::default(), values), @r"
    True
    False
    -2147483648
    2147483647
    -9223372036854775808
    18446744073709551615
    0.1
    1.1754944E-38
    1.7976931348623157E+308
    2.220446049250313E-16
    -0
    1E-05
    12345.678
    NaN
    Infinity
    79228162514264337593543950335
    -0.0000000000000000000000000001
    11/14/2023 22:13:20
    11/15/2023 03:43:20 +05:30
    1.02:03:04.0050000
    00:00:00
    6ba7b810-9dad-11d1-80b4-00c04fd430c8
    ");
}

#[test]
fn snapshot_alternative_formats() {
    let formats = Formats {
        boolean: BoolFormat::Lowercase,
        int32: IntegerFormat::Padded(8),
        int64: IntegerFormat::Grouped,
        uint32: IntegerFormat::UpperHex,
        uint64: IntegerFormat::LowerHex,
        single: FloatFormat::Exponential(2),
        double: FloatFormat::Fixed(3),
        decimal: DecimalFormat::Fixed(2),
        date_time: DateTimeFormat::RoundTrip,
        date_time_offset: DateTimeFormat::Rfc1123,
        time_span: TimeSpanFormat::General,
        guid: GuidFormat::Braced,
    };
    let at = sample_instant(123_456_789);
    let values: Vec<Value<'_>> = vec![
        true.into(),
        (-42i32).into(),
        1_234_567_890_123i64.into(),
        0xDEAD_BEEFu32.into(),
        255u64.into(),
        1_234.5f32.into(),
        (2.0f64 / 3.0).into(),
        (-1e21f64).into(),
        Decimal::new(123_456, 4).unwrap().into(),
        Decimal::new(-1_234, 5).unwrap().into(),
        at.into(),
        DateTimeOffset::new(at, -300).unwrap().into(),
        Duration::new(93_784, 500_000_000).into(),
        Guid::from_u128(SAMPLE_GUID).into(),
    ];

    assert_snapshot!(render_lines(formats, values), @r"
    true
    -00000042
    1,234,567,890,123
    DEADBEEF
    ff
    1.23E+003
    0.667
    -1000000000000000000000.000
    12.35
    -0.01
    2023-11-14T22:13:20.1234567Z
    Tue, 14 Nov 2023 22:13:20 GMT
    1:2:03:04.5
    {6ba7b810-9dad-11d1-80b4-00c04fd430c8}
    ");
}

#[test]
fn snapshot_mixed_text() {
    let mut writer = Utf8Writer::with_options(
        Vec::new(),
        WriterOptions {
            preamble: true,
            buffer_size: Some(1),
            ..options()
        },
    )
    .unwrap();
    writer.write_str("total: ").unwrap();
    writer.write_value(3i32).unwrap();
    writer.write_char(' ').unwrap();
    writer.write_utf8(b"caf\xC3\xA9 \xFF ok").unwrap();
    writer.write_line().unwrap();
    let units: Vec<u16> = "Grüße 🌍".encode_utf16().collect();
    writer.write_line_utf16(&units).unwrap();
    writer.write_fmt(format_args!("{:<6}|{:>6}", "left", "right")).unwrap();

    let text = collected(writer);
    let body = text.strip_prefix('\u{FEFF}').expect("byte-order mark");
    assert_snapshot!(body, @r"
    total: 3 café � ok
    Grüße 🌍
    left  | right
    ");
}
