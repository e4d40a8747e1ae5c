//! xs:time — a time-of-day with optional fractional seconds and timezone.
//!
//! `24:00:00` is accepted as a lexical alias for midnight and canonicalizes
//! to `00:00:00` on construction, matching the XSD lexical mapping rule.

use std::fmt;

use crate::calendar::{
    format_fractional_seconds, format_timezone, parse_fractional_seconds, parse_timezone,
};
use crate::date::{expect_byte, parse_exact_two_digits};
use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
    nanosecond: u32,
    tz_offset_minutes: Option<i16>,
}

impl Time {
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        nanosecond: u32,
        tz_offset_minutes: Option<i16>,
    ) -> Result<Self, Error> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(Error::InvalidArgument("time field out of range".into()));
        }
        Ok(Self {
            hour,
            minute,
            second,
            nanosecond,
            tz_offset_minutes,
        })
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        if source.len() < 8 {
            return Err(Error::InvalidArgument("time literal too short".into()));
        }
        let mut pos = 0usize;
        let mut hour = parse_exact_two_digits(source, &mut pos, "hour")?;
        expect_byte(source, &mut pos, b':')?;
        let minute = parse_exact_two_digits(source, &mut pos, "minute")?;
        expect_byte(source, &mut pos, b':')?;
        let second = parse_exact_two_digits(source, &mut pos, "second")?;

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
            return Err(Error::InvalidArgument("trailing characters in time literal".into()));
        }

        Ok(Self {
            hour,
            minute,
            second,
            nanosecond,
            tz_offset_minutes: tz,
        })
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
    pub fn tz_offset_minutes(&self) -> Option<i16> {
        self.tz_offset_minutes
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
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
        let t = Time::parse("13:20:00.5").unwrap();
        assert_eq!(t.to_string(), "13:20:00.5");
    }

    #[test]
    fn canonicalizes_midnight_24() {
        let t = Time::parse("24:00:00").unwrap();
        assert_eq!(t.hour(), 0);
        assert_eq!(t.to_string(), "00:00:00");
    }

    #[test]
    fn rejects_24_with_fraction() {
        assert!(Time::parse("24:00:00.1").is_err());
    }

    #[test]
    fn rejects_bad_24_minute() {
        assert!(Time::parse("24:01:00").is_err());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(Time::parse("23:60:00").is_err());
        assert!(Time::parse("23:00:60").is_err());
    }
}
