//! xs:dateTime — a calendar date and time-of-day, with optional timezone.
//!
//! `24:00:00` canonicalizes to midnight and rolls the calendar day forward,
//! mirroring the XSD lexical mapping rule. Equality between two timezoned
//! values compares their UTC-normalized instants; equality between two
//! timezone-naive values compares fields directly. A timezoned value is
//! never equal to a naive one (spec does not define a coercion between
//! them).

use std::fmt;

use crate::calendar::{
    days_in_month, format_fractional_seconds, format_timezone, normalize_to_utc,
    parse_fractional_seconds, parse_timezone,
};
use crate::date::{expect_byte, parse_exact_two_digits, take_digits, Date};
use crate::error::Error;
use crate::time::Time;

#[derive(Copy, Clone, Debug)]
pub struct DateTime {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
    tz_offset_minutes: Option<i16>,
}

impl DateTime {
    pub fn parse(source: &str) -> Result<Self, Error> {
        if source.len() < 19 {
            return Err(Error::InvalidArgument("dateTime literal too short".into()));
        }
        let mut pos = 0usize;
        let bytes = source.as_bytes();
        let negative = bytes[0] == b'-';
        if negative {
            pos += 1;
        }
        let (year_digits, consumed) = take_digits(&source[pos..]);
        if consumed < 4 {
            return Err(Error::InvalidArgument("year requires at least 4 digits".into()));
        }
        let year: i32 = year_digits
            .parse()
            .map_err(|_| Error::InvalidArgument("invalid year".into()))?;
        let year = if negative { -year } else { year };
        pos += consumed;

        expect_byte(source, &mut pos, b'-')?;
        let month = parse_exact_two_digits(source, &mut pos, "month")?;
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument(format!("month out of range: {month}")));
        }
        expect_byte(source, &mut pos, b'-')?;
        let day = parse_exact_two_digits(source, &mut pos, "day")?;
        if day < 1 || day > days_in_month(year, month)? {
            return Err(Error::InvalidArgument(format!("day out of range: {day}")));
        }
        expect_byte(source, &mut pos, b'T')?;

        let mut hour = parse_exact_two_digits(source, &mut pos, "hour")?;
        expect_byte(source, &mut pos, b':')?;
        let minute = parse_exact_two_digits(source, &mut pos, "minute")?;
        expect_byte(source, &mut pos, b':')?;
        let second = parse_exact_two_digits(source, &mut pos, "second")?;

        let mut roll_day = false;
        if hour == 24 {
            if minute != 0 || second != 0 {
                return Err(Error::InvalidArgument("24:XX:XX requires 24:00:00".into()));
            }
            if source[pos..].starts_with('.') {
                return Err(Error::InvalidArgument(
                    "24:00:00 cannot carry fractional seconds".into(),
                ));
            }
            hour = 0;
            roll_day = true;
        } else if hour > 23 {
            return Err(Error::InvalidArgument("hour out of range".into()));
        }
        if minute > 59 {
            return Err(Error::InvalidArgument("minute out of range".into()));
        }
        if second > 59 {
            return Err(Error::InvalidArgument("second out of range".into()));
        }

        let (nanosecond, frac_len) = parse_fractional_seconds(&source[pos..]);
        pos += frac_len;
        let (tz, tz_len) = parse_timezone(&source[pos..])?;
        pos += tz_len;
        if pos != source.len() {
            return Err(Error::InvalidArgument(
                "trailing characters in dateTime literal".into(),
            ));
        }

        let (year, month, day) = if roll_day {
            let mut d = day as i32 + 1;
            let mut mo = month;
            let mut y = year;
            if d > days_in_month(y, mo)? as i32 {
                d = 1;
                mo += 1;
                if mo > 12 {
                    mo = 1;
                    y += 1;
                }
            }
            (y, mo, d as u8)
        } else {
            (year, month, day)
        };

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanosecond,
            tz_offset_minutes: tz,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn month(&self) -> u8 {
        self.month
    }
    pub fn day(&self) -> u8 {
        self.day
    }
    pub fn hour(&self) -> u8 {
        self.hour
    }
    pub fn minute(&self) -> u8 {
        self.minute
    }
    pub fn second(&self) -> u8 {
        self.second
    }
    pub fn nanosecond(&self) -> u32 {
        self.nanosecond
    }
    pub fn has_timezone(&self) -> bool {
        self.tz_offset_minutes.is_some()
    }
    pub fn tz_offset_minutes(&self) -> Option<i16> {
        self.tz_offset_minutes
    }

    pub fn date_part(&self) -> Date {
        Date::new(self.year, self.month, self.day, self.tz_offset_minutes)
            .expect("date components were validated during parsing")
    }

    pub fn time_part(&self) -> Time {
        Time::new(
            self.hour,
            self.minute,
            self.second,
            self.nanosecond,
            self.tz_offset_minutes,
        )
        .expect("time components were validated during parsing")
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        match (self.tz_offset_minutes, other.tz_offset_minutes) {
            (Some(a), Some(b)) => {
                let lhs = normalize_to_utc(
                    self.year,
                    self.month,
                    self.day,
                    self.hour,
                    self.minute,
                    self.second,
                    self.nanosecond,
                    a,
                );
                let rhs = normalize_to_utc(
                    other.year,
                    other.month,
                    other.day,
                    other.hour,
                    other.minute,
                    other.second,
                    other.nanosecond,
                    b,
                );
                lhs.ok() == rhs.ok()
            }
            (None, None) => {
                (self.year, self.month, self.day, self.hour, self.minute, self.second, self.nanosecond)
                    == (other.year, other.month, other.day, other.hour, other.minute, other.second, other.nanosecond)
            }
            _ => false,
        }
    }
}
impl Eq for DateTime {}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        let y = self.year.unsigned_abs();
        if self.year < 0 {
            out.push('-');
        }
        out.push_str(&format!(
            "{y:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.month, self.day, self.hour, self.minute, self.second
        ));
        format_fractional_seconds(&mut out, self.nanosecond);
        format_timezone(&mut out, self.tz_offset_minutes);
        write!(f, "{out}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let dt = DateTime::parse("2024-01-15T10:30:00.25Z").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15T10:30:00.25Z");
    }

    #[test]
    fn canonicalizes_24_00_00_and_rolls_day() {
        let dt = DateTime::parse("2024-01-15T24:00:00").unwrap();
        assert_eq!(dt.day(), 16);
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.to_string(), "2024-01-16T00:00:00");
    }

    #[test]
    fn rolls_across_month_and_year_boundary() {
        let dt = DateTime::parse("2024-12-31T24:00:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 1, 1));
    }

    #[test]
    fn timezone_crossing_equality() {
        let a = DateTime::parse("2024-01-15T10:00:00Z").unwrap();
        let b = DateTime::parse("2024-01-15T12:00:00+02:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn naive_and_timezoned_are_never_equal() {
        let a = DateTime::parse("2024-01-15T10:00:00").unwrap();
        let b = DateTime::parse("2024-01-15T10:00:00Z").unwrap();
        assert_ne!(a, b);
    }
}
