use core::fmt::{self, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{DateTimeFormat, TimeSpanFormat, cursor::SliceCursor};

const SECONDS_PER_DAY: i64 = 86_400;
const NANOS_PER_TICK: u32 = 100;

const WEEKDAYS: [&[u8; 3]; 7] = [b"Sun", b"Mon", b"Tue", b"Wed", b"Thu", b"Fri", b"Sat"];
const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov", b"Dec",
];

/// An instant paired with the UTC offset it should be displayed in.
///
/// The offset is limited to ±14 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeOffset {
    instant: SystemTime,
    offset_minutes: i16,
}

impl DateTimeOffset {
    /// Largest absolute offset, in minutes.
    pub const MAX_OFFSET_MINUTES: i16 = 14 * 60;

    /// `None` if `offset_minutes` is outside ±[`MAX_OFFSET_MINUTES`](Self::MAX_OFFSET_MINUTES).
    #[must_use]
    pub fn new(instant: SystemTime, offset_minutes: i16) -> Option<Self> {
        (offset_minutes.unsigned_abs() <= Self::MAX_OFFSET_MINUTES.unsigned_abs()).then_some(Self {
            instant,
            offset_minutes,
        })
    }

    /// The instant at offset zero.
    #[must_use]
    pub fn utc(instant: SystemTime) -> Self {
        Self {
            instant,
            offset_minutes: 0,
        }
    }

    /// The instant this value denotes.
    #[must_use]
    pub fn instant(&self) -> SystemTime {
        self.instant
    }

    /// Minutes east of UTC.
    #[must_use]
    pub fn offset_minutes(&self) -> i16 {
        self.offset_minutes
    }
}

/// Broken-down calendar time at 100 ns resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Civil {
    year: i64,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    ticks: u32,
    weekday: u8,
}

/// Seconds and nanoseconds relative to the Unix epoch, floored.
fn unix_parts(instant: SystemTime) -> (i64, u32) {
    match instant.duration_since(UNIX_EPOCH) {
        Ok(after) => (
            i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
            after.subsec_nanos(),
        ),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).unwrap_or(i64::MAX);
            match before.subsec_nanos() {
                0 => (-secs, 0),
                nanos => (-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}

// Values are range-checked by the calendar arithmetic itself.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil(secs: i64, nanos: u32) -> Civil {
    let days = secs.div_euclid(SECONDS_PER_DAY);
    let second_of_day = secs.rem_euclid(SECONDS_PER_DAY);

    // Days to proleptic Gregorian date, eras of 400 years starting 0000-03-01.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    Civil {
        year,
        month: month as u8,
        day: day as u8,
        hour: (second_of_day / 3_600) as u8,
        minute: (second_of_day / 60 % 60) as u8,
        second: (second_of_day % 60) as u8,
        ticks: nanos / NANOS_PER_TICK,
        // 1970-01-01 was a Thursday.
        weekday: (days + 4).rem_euclid(7) as u8,
    }
}

fn put_year(cur: &mut SliceCursor<'_>, year: i64) -> fmt::Result {
    if year < 0 {
        cur.put_byte(b'-')?;
    }
    cur.put_padded(year.unsigned_abs(), 4)
}

fn put_two(cur: &mut SliceCursor<'_>, value: u8) -> fmt::Result {
    cur.put_padded(u64::from(value), 2)
}

fn put_clock(cur: &mut SliceCursor<'_>, c: &Civil) -> fmt::Result {
    put_two(cur, c.hour)?;
    cur.put_byte(b':')?;
    put_two(cur, c.minute)?;
    cur.put_byte(b':')?;
    put_two(cur, c.second)
}

fn put_iso_date_time(cur: &mut SliceCursor<'_>, c: &Civil) -> fmt::Result {
    put_year(cur, c.year)?;
    cur.put_byte(b'-')?;
    put_two(cur, c.month)?;
    cur.put_byte(b'-')?;
    put_two(cur, c.day)?;
    cur.put_byte(b'T')?;
    put_clock(cur, c)
}

fn put_offset(cur: &mut SliceCursor<'_>, offset_minutes: i16) -> fmt::Result {
    cur.put_byte(if offset_minutes < 0 { b'-' } else { b'+' })?;
    let minutes = offset_minutes.unsigned_abs();
    cur.put_padded(u64::from(minutes / 60), 2)?;
    cur.put_byte(b':')?;
    cur.put_padded(u64::from(minutes % 60), 2)
}

/// Layout shared by `DateTime` and `DateTimeOffset`; `offset` is `None` for
/// plain UTC instants.
fn write_civil(
    cur: &mut SliceCursor<'_>,
    instant: SystemTime,
    offset: Option<i16>,
    format: DateTimeFormat,
) -> fmt::Result {
    let (secs, nanos) = unix_parts(instant);
    let shift = i64::from(offset.unwrap_or(0)) * 60;
    let local = civil(secs.saturating_add(shift), nanos);

    match format {
        DateTimeFormat::General => {
            put_two(cur, local.month)?;
            cur.put_byte(b'/')?;
            put_two(cur, local.day)?;
            cur.put_byte(b'/')?;
            put_year(cur, local.year)?;
            cur.put_byte(b' ')?;
            put_clock(cur, &local)?;
            match offset {
                Some(minutes) => {
                    cur.put_byte(b' ')?;
                    put_offset(cur, minutes)
                }
                None => Ok(()),
            }
        }
        DateTimeFormat::RoundTrip => {
            put_iso_date_time(cur, &local)?;
            cur.put_byte(b'.')?;
            cur.put_padded(u64::from(local.ticks), 7)?;
            match offset {
                Some(minutes) => put_offset(cur, minutes),
                None => cur.put_byte(b'Z'),
            }
        }
        DateTimeFormat::Sortable => put_iso_date_time(cur, &local),
        DateTimeFormat::Rfc1123 => {
            let utc = civil(secs, nanos);
            cur.put(WEEKDAYS[usize::from(utc.weekday)])?;
            cur.put(b", ")?;
            put_two(cur, utc.day)?;
            cur.put_byte(b' ')?;
            cur.put(MONTHS[usize::from(utc.month - 1)])?;
            cur.put_byte(b' ')?;
            put_year(cur, utc.year)?;
            cur.put_byte(b' ')?;
            put_clock(cur, &utc)?;
            cur.put(b" GMT")
        }
    }
}

pub(crate) fn write_date_time(
    cur: &mut SliceCursor<'_>,
    instant: SystemTime,
    format: DateTimeFormat,
) -> fmt::Result {
    write_civil(cur, instant, None, format)
}

pub(crate) fn write_date_time_offset(
    cur: &mut SliceCursor<'_>,
    value: DateTimeOffset,
    format: DateTimeFormat,
) -> fmt::Result {
    write_civil(cur, value.instant, Some(value.offset_minutes), format)
}

pub(crate) fn write_time_span(
    cur: &mut SliceCursor<'_>,
    span: Duration,
    format: TimeSpanFormat,
) -> fmt::Result {
    let secs = span.as_secs();
    let days = secs / 86_400;
    let hours = secs / 3_600 % 24;
    let minutes = secs / 60 % 60;
    let seconds = secs % 60;
    let ticks = span.subsec_nanos() / NANOS_PER_TICK;

    match format {
        TimeSpanFormat::Constant => {
            if days > 0 {
                write!(cur, "{days}.")?;
            }
            cur.put_padded(hours, 2)?;
        }
        TimeSpanFormat::General => {
            if days > 0 {
                write!(cur, "{days}:")?;
            }
            write!(cur, "{hours}")?;
        }
    }
    cur.put_byte(b':')?;
    cur.put_padded(minutes, 2)?;
    cur.put_byte(b':')?;
    cur.put_padded(seconds, 2)?;

    if ticks == 0 {
        return Ok(());
    }
    cur.put_byte(b'.')?;
    match format {
        TimeSpanFormat::Constant => cur.put_padded(u64::from(ticks), 7),
        TimeSpanFormat::General => {
            let mut digits = 7;
            let mut trimmed = ticks;
            while trimmed % 10 == 0 {
                trimmed /= 10;
                digits -= 1;
            }
            cur.put_padded(u64::from(trimmed), digits)
        }
    }
}
