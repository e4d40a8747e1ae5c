//! xs:date — a Gregorian calendar date with an optional timezone.

use std::fmt;

use crate::calendar::{days_in_month, format_timezone, parse_timezone};
use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
    tz_offset_minutes: Option<i16>,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8, tz_offset_minutes: Option<i16>) -> Result<Self, Error> {
        if day < 1 || day > days_in_month(year, month)? {
            return Err(Error::InvalidArgument(format!("day out of range: {day}")));
        }
        Ok(Self {
            year,
            month,
            day,
            tz_offset_minutes,
        })
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        if source.is_empty() {
            return Err(Error::InvalidArgument("empty date literal".into()));
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
        let year: i32 = year_digits.parse().map_err(|_| Error::InvalidArgument("invalid year".into()))?;
        let year = if negative { -year } else { year };
        pos += consumed;

        expect_byte(source, &mut pos, b'-')?;
        let month = parse_exact_two_digits(source, &mut pos, "month")?;
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument(format!("month out of range: {month}")));
        }
        expect_byte(source, &mut pos, b'-')?;
        let day = parse_exact_two_digits(source, &mut pos, "day")?;

        let (tz, tz_len) = parse_timezone(&source[pos..])?;
        pos += tz_len;
        if pos != source.len() {
            return Err(Error::InvalidArgument("trailing characters in date literal".into()));
        }

        Date::new(year, month, day, tz)
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
    pub fn tz_offset_minutes(&self) -> Option<i16> {
        self.tz_offset_minutes
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        let y = self.year.unsigned_abs();
        if self.year < 0 {
            out.push('-');
        }
        out.push_str(&format!("{y:04}-{:02}-{:02}", self.month, self.day));
        format_timezone(&mut out, self.tz_offset_minutes);
        write!(f, "{out}")
    }
}

pub(crate) fn take_digits(s: &str) -> (&str, usize) {
    let count = s.bytes().take_while(u8::is_ascii_digit).count();
    (&s[..count], count)
}

pub(crate) fn expect_byte(s: &str, pos: &mut usize, expected: u8) -> Result<(), Error> {
    if s.as_bytes().get(*pos) != Some(&expected) {
        return Err(Error::InvalidArgument(format!(
            "expected {:?} at position {pos}",
            expected as char
        )));
    }
    *pos += 1;
    Ok(())
}

pub(crate) fn parse_exact_two_digits(s: &str, pos: &mut usize, what: &str) -> Result<u8, Error> {
    let slice = s
        .as_bytes()
        .get(*pos..*pos + 2)
        .ok_or_else(|| Error::InvalidArgument(format!("{what}: expected 2 digits")))?;
    if !slice.iter().all(u8::is_ascii_digit) {
        return Err(Error::InvalidArgument(format!("{what}: expected 2 digits")));
    }
    let value: u8 = std::str::from_utf8(slice).unwrap().parse().unwrap();
    *pos += 2;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let d = Date::parse("2024-02-29").unwrap();
        assert_eq!(d.to_string(), "2024-02-29");
    }

    #[test]
    fn rejects_invalid_leap_day() {
        assert!(Date::parse("2023-02-29").is_err());
    }

    #[test]
    fn parses_negative_year_and_timezone() {
        let d = Date::parse("-0044-03-15+05:30").unwrap();
        assert_eq!(d.year(), -44);
        assert_eq!(d.to_string(), "-0044-03-15+05:30");
    }

    #[test]
    fn parses_utc() {
        let d = Date::parse("2000-01-01Z").unwrap();
        assert_eq!(d.tz_offset_minutes(), Some(0));
    }
}
