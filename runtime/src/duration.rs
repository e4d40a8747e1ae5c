//! xs:duration and its two restricted subtypes, xs:yearMonthDuration and
//! xs:dayTimeDuration.
//!
//! Each is stored as a sign plus unsigned magnitude components so that
//! `-0` normalizes away, mirroring the integer and decimal primitives.

use std::fmt;

use crate::error::Error;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86400;

fn parse_digits_u64(s: &str, pos: &mut usize) -> Result<u64, Error> {
    let start = *pos;
    let count = s.as_bytes()[*pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    if count == 0 {
        return Err(Error::InvalidArgument("expected digit in duration literal".into()));
    }
    *pos += count;
    s[start..*pos]
        .parse()
        .map_err(|_| Error::InvalidArgument("duration component overflowed u64".into()))
}

fn parse_fractional(s: &str, pos: &mut usize) -> u32 {
    if s.as_bytes().get(*pos) != Some(&b'.') {
        return 0;
    }
    *pos += 1;
    let start = *pos;
    let count = s.as_bytes()[*pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    *pos += count;
    let digits = &s[start..*pos];
    let used = &digits[..count.min(9)];
    let mut nanos: u32 = used.parse().unwrap_or(0);
    for _ in used.len()..9 {
        nanos *= 10;
    }
    nanos
}

fn format_fractional(out: &mut String, nanos: u32) {
    if nanos == 0 {
        return;
    }
    let mut frac = format!("{nanos:09}");
    while frac.ends_with('0') {
        frac.pop();
    }
    out.push('.');
    out.push_str(&frac);
}

/// xs:yearMonthDuration — months only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct YearMonthDuration {
    negative: bool,
    months: u64,
}

impl YearMonthDuration {
    pub fn from_months(months: i64) -> Self {
        Self {
            negative: months < 0,
            months: months.unsigned_abs(),
        }
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut pos = 0usize;
        let negative = source.as_bytes().first() == Some(&b'-');
        if negative {
            pos += 1;
        }
        if source.as_bytes().get(pos) != Some(&b'P') {
            return Err(Error::InvalidArgument("duration must start with 'P'".into()));
        }
        pos += 1;

        let mut years = 0u64;
        let mut months = 0u64;
        let mut found = false;

        if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
            let value = parse_digits_u64(source, &mut pos)?;
            match source.as_bytes().get(pos) {
                Some(b'Y') => {
                    years = value;
                    pos += 1;
                    found = true;
                    if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                        let m = parse_digits_u64(source, &mut pos)?;
                        if source.as_bytes().get(pos) != Some(&b'M') {
                            return Err(Error::InvalidArgument("expected 'M' after month count".into()));
                        }
                        pos += 1;
                        months = m;
                    }
                }
                Some(b'M') => {
                    months = value;
                    pos += 1;
                    found = true;
                }
                _ => return Err(Error::InvalidArgument("expected 'Y' or 'M'".into())),
            }
        }
        if !found {
            return Err(Error::InvalidArgument("year-month duration needs at least one component".into()));
        }
        if pos != source.len() {
            return Err(Error::InvalidArgument("trailing characters in duration literal".into()));
        }

        let total_months = years * 12 + months;
        let negative = negative && total_months != 0;
        Ok(Self {
            negative,
            months: total_months,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0
    }
    pub fn is_negative(&self) -> bool {
        self.negative
    }
    pub fn total_months(&self) -> i64 {
        if self.negative {
            -(self.months as i64)
        } else {
            self.months as i64
        }
    }
}

impl fmt::Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let years = self.months / 12;
        let months = self.months % 12;
        if years > 0 {
            write!(f, "{years}Y")?;
        }
        if months > 0 || years == 0 {
            write!(f, "{months}M")?;
        }
        Ok(())
    }
}

/// xs:dayTimeDuration — days, hours, minutes, seconds, nanoseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DayTimeDuration {
    negative: bool,
    total_seconds: u64,
    nanoseconds: u32,
}

impl DayTimeDuration {
    pub fn from_seconds(total_seconds: i64, nanoseconds: u32) -> Self {
        Self {
            negative: total_seconds < 0,
            total_seconds: total_seconds.unsigned_abs(),
            nanoseconds,
        }
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        if source.is_empty() {
            return Err(Error::InvalidArgument("empty duration literal".into()));
        }
        let mut pos = 0usize;
        let negative = source.as_bytes()[0] == b'-';
        if negative {
            pos += 1;
        }
        if source.as_bytes().get(pos) != Some(&b'P') {
            return Err(Error::InvalidArgument("duration must start with 'P'".into()));
        }
        pos += 1;
        if pos >= source.len() {
            return Err(Error::InvalidArgument("duration needs a component after 'P'".into()));
        }
        if source[pos..].contains('Y') {
            return Err(Error::InvalidArgument("day-time duration cannot contain 'Y'".into()));
        }
        let t_pos = source[pos..].find('T');
        let m_pos = source[pos..].find('M');
        if let Some(m) = m_pos {
            if t_pos.map_or(true, |t| m < t) {
                return Err(Error::InvalidArgument(
                    "day-time duration cannot contain a month component".into(),
                ));
            }
        }

        let mut total_seconds: u64 = 0;
        let mut nanoseconds = 0u32;
        let mut found_any = false;

        if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
            let days = parse_digits_u64(source, &mut pos)?;
            if source.as_bytes().get(pos) != Some(&b'D') {
                return Err(Error::InvalidArgument("expected 'D' after day count".into()));
            }
            pos += 1;
            total_seconds += days * SECONDS_PER_DAY as u64;
            found_any = true;
        }

        if source.as_bytes().get(pos) == Some(&b'T') {
            pos += 1;
            if pos >= source.len() {
                return Err(Error::InvalidArgument("duration needs a component after 'T'".into()));
            }
            let mut found_time = false;

            if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                let value = parse_digits_u64(source, &mut pos)?;
                match source.as_bytes().get(pos) {
                    Some(b'H') => {
                        pos += 1;
                        total_seconds += value * SECONDS_PER_HOUR as u64;
                        found_time = true;
                        if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                            let (secs, nanos, advanced) = parse_minutes_or_seconds(source, pos)?;
                            total_seconds += secs;
                            nanoseconds = nanos;
                            pos = advanced;
                        }
                    }
                    Some(b'M') => {
                        pos += 1;
                        total_seconds += value * SECONDS_PER_MINUTE as u64;
                        found_time = true;
                        if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                            let secs = parse_digits_u64(source, &mut pos)?;
                            nanoseconds = parse_fractional(source, &mut pos);
                            if source.as_bytes().get(pos) != Some(&b'S') {
                                return Err(Error::InvalidArgument("expected 'S' after seconds".into()));
                            }
                            pos += 1;
                            total_seconds += secs;
                        }
                    }
                    Some(b'S') | Some(b'.') => {
                        total_seconds += value;
                        nanoseconds = parse_fractional(source, &mut pos);
                        if source.as_bytes().get(pos) != Some(&b'S') {
                            return Err(Error::InvalidArgument("expected 'S' after seconds".into()));
                        }
                        pos += 1;
                        found_time = true;
                    }
                    _ => return Err(Error::InvalidArgument("unexpected character after number".into())),
                }
            }
            if !found_time {
                return Err(Error::InvalidArgument("no time components found after 'T'".into()));
            }
            found_any = true;
        }

        if !found_any {
            return Err(Error::InvalidArgument("duration needs at least one component".into()));
        }
        if pos != source.len() {
            return Err(Error::InvalidArgument("trailing characters in duration literal".into()));
        }

        let negative = negative && (total_seconds != 0 || nanoseconds != 0);
        Ok(Self {
            negative,
            total_seconds,
            nanoseconds,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds == 0 && self.nanoseconds == 0
    }
    pub fn is_negative(&self) -> bool {
        self.negative
    }
    pub fn total_seconds(&self) -> i64 {
        if self.negative {
            -(self.total_seconds as i64)
        } else {
            self.total_seconds as i64
        }
    }
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }
}

fn parse_minutes_or_seconds(source: &str, mut pos: usize) -> Result<(u64, u32, usize), Error> {
    let value = parse_digits_u64(source, &mut pos)?;
    match source.as_bytes().get(pos) {
        Some(b'M') => {
            pos += 1;
            let seconds = value * SECONDS_PER_MINUTE as u64;
            if source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                let secs = parse_digits_u64(source, &mut pos)?;
                let nanos = parse_fractional(source, &mut pos);
                if source.as_bytes().get(pos) != Some(&b'S') {
                    return Err(Error::InvalidArgument("expected 'S' after seconds".into()));
                }
                pos += 1;
                return Ok((seconds + secs, nanos, pos));
            }
            Ok((seconds, 0, pos))
        }
        Some(b'S') | Some(b'.') => {
            let nanos = parse_fractional(source, &mut pos);
            if source.as_bytes().get(pos) != Some(&b'S') {
                return Err(Error::InvalidArgument("expected 'S' after seconds".into()));
            }
            pos += 1;
            Ok((value, nanos, pos))
        }
        _ => Err(Error::InvalidArgument("unexpected character after number".into())),
    }
}

impl fmt::Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let mut remaining = self.total_seconds;
        let days = remaining / SECONDS_PER_DAY as u64;
        remaining %= SECONDS_PER_DAY as u64;
        let hours = remaining / SECONDS_PER_HOUR as u64;
        remaining %= SECONDS_PER_HOUR as u64;
        let minutes = remaining / SECONDS_PER_MINUTE as u64;
        let seconds = remaining % SECONDS_PER_MINUTE as u64;

        if days > 0 {
            write!(f, "{days}D")?;
        }
        let need_time = hours > 0 || minutes > 0 || seconds > 0 || self.nanoseconds > 0 || days == 0;
        if need_time {
            write!(f, "T")?;
            let mut wrote_any = false;
            if hours > 0 {
                write!(f, "{hours}H")?;
                wrote_any = true;
            }
            if minutes > 0 {
                write!(f, "{minutes}M")?;
                wrote_any = true;
            }
            if seconds > 0 || self.nanoseconds > 0 || !wrote_any {
                write!(f, "{seconds}")?;
                let mut frac = String::new();
                format_fractional(&mut frac, self.nanoseconds);
                write!(f, "{frac}S")?;
            }
        }
        Ok(())
    }
}

/// xs:duration — the general form, combining a year-month and a day-time
/// component under one shared sign.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Duration {
    negative: bool,
    months: u64,
    total_seconds: u64,
    nanoseconds: u32,
}

impl Duration {
    pub fn parse(source: &str) -> Result<Self, Error> {
        if source.is_empty() {
            return Err(Error::InvalidArgument("empty duration literal".into()));
        }
        let mut pos = 0usize;
        let negative = source.as_bytes()[0] == b'-';
        if negative {
            pos += 1;
        }
        if source.as_bytes().get(pos) != Some(&b'P') {
            return Err(Error::InvalidArgument("duration must start with 'P'".into()));
        }
        pos += 1;
        if pos >= source.len() {
            return Err(Error::InvalidArgument("duration needs a component after 'P'".into()));
        }

        let mut years = 0u64;
        let mut months = 0u64;
        let mut days = 0u64;
        let mut found_any = false;

        while source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
            let value = parse_digits_u64(source, &mut pos)?;
            match source.as_bytes().get(pos) {
                Some(b'Y') => {
                    years = value;
                    pos += 1;
                }
                Some(b'M') => {
                    months = value;
                    pos += 1;
                }
                Some(b'D') => {
                    days = value;
                    pos += 1;
                }
                _ => return Err(Error::InvalidArgument("expected 'Y', 'M', or 'D'".into())),
            }
            found_any = true;
        }

        let mut total_seconds = days * SECONDS_PER_DAY as u64;
        let mut nanoseconds = 0u32;

        if source.as_bytes().get(pos) == Some(&b'T') {
            pos += 1;
            if pos >= source.len() {
                return Err(Error::InvalidArgument("duration needs a component after 'T'".into()));
            }
            let mut found_time = false;
            while source.as_bytes().get(pos).is_some_and(u8::is_ascii_digit) {
                let value = parse_digits_u64(source, &mut pos)?;
                match source.as_bytes().get(pos) {
                    Some(b'H') => {
                        total_seconds += value * SECONDS_PER_HOUR as u64;
                        pos += 1;
                    }
                    Some(b'M') => {
                        total_seconds += value * SECONDS_PER_MINUTE as u64;
                        pos += 1;
                    }
                    Some(b'S') | Some(b'.') => {
                        total_seconds += value;
                        nanoseconds = parse_fractional(source, &mut pos);
                        if source.as_bytes().get(pos) != Some(&b'S') {
                            return Err(Error::InvalidArgument("expected 'S' after seconds".into()));
                        }
                        pos += 1;
                    }
                    _ => return Err(Error::InvalidArgument("expected 'H', 'M', or 'S'".into())),
                }
                found_time = true;
            }
            if !found_time {
                return Err(Error::InvalidArgument("no time components found after 'T'".into()));
            }
            found_any = true;
        }

        if !found_any {
            return Err(Error::InvalidArgument("duration needs at least one component".into()));
        }
        if pos != source.len() {
            return Err(Error::InvalidArgument("trailing characters in duration literal".into()));
        }

        let total_months = years * 12 + months;
        let negative = negative && (total_months != 0 || total_seconds != 0 || nanoseconds != 0);
        Ok(Self {
            negative,
            months: total_months,
            total_seconds,
            nanoseconds,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.total_seconds == 0 && self.nanoseconds == 0
    }
    pub fn is_negative(&self) -> bool {
        self.negative
    }
    pub fn year_month_part(&self) -> YearMonthDuration {
        YearMonthDuration {
            negative: self.negative && self.months != 0,
            months: self.months,
        }
    }
    pub fn day_time_part(&self) -> DayTimeDuration {
        DayTimeDuration {
            negative: self.negative && (self.total_seconds != 0 || self.nanoseconds != 0),
            total_seconds: self.total_seconds,
            nanoseconds: self.nanoseconds,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let years = self.months / 12;
        let months = self.months % 12;
        if years > 0 {
            write!(f, "{years}Y")?;
        }
        if months > 0 {
            write!(f, "{months}M")?;
        }

        let mut remaining = self.total_seconds;
        let days = remaining / SECONDS_PER_DAY as u64;
        remaining %= SECONDS_PER_DAY as u64;
        let hours = remaining / SECONDS_PER_HOUR as u64;
        remaining %= SECONDS_PER_HOUR as u64;
        let minutes = remaining / SECONDS_PER_MINUTE as u64;
        let seconds = remaining % SECONDS_PER_MINUTE as u64;
        if days > 0 {
            write!(f, "{days}D")?;
        }

        let has_time = hours > 0 || minutes > 0 || seconds > 0 || self.nanoseconds > 0;
        if has_time {
            write!(f, "T")?;
            if hours > 0 {
                write!(f, "{hours}H")?;
            }
            if minutes > 0 {
                write!(f, "{minutes}M")?;
            }
            if seconds > 0 || self.nanoseconds > 0 {
                write!(f, "{seconds}")?;
                let mut frac = String::new();
                format_fractional(&mut frac, self.nanoseconds);
                write!(f, "{frac}S")?;
            }
        }
        if years == 0 && months == 0 && days == 0 && !has_time {
            write!(f, "0D")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_roundtrip() {
        assert_eq!(YearMonthDuration::parse("P1Y2M").unwrap().to_string(), "P1Y2M");
        assert_eq!(YearMonthDuration::parse("P18M").unwrap().total_months(), 18);
        assert_eq!(YearMonthDuration::parse("-P2Y").unwrap().to_string(), "-P2Y0M");
    }

    #[test]
    fn day_time_roundtrip() {
        let d = DayTimeDuration::parse("P1DT2H3M4.5S").unwrap();
        assert_eq!(d.to_string(), "P1DT2H3M4.5S");
    }

    #[test]
    fn day_time_rejects_year_or_month() {
        assert!(DayTimeDuration::parse("P1Y").is_err());
        assert!(DayTimeDuration::parse("P1M").is_err());
        assert!(DayTimeDuration::parse("P1YT1M").is_err());
    }

    #[test]
    fn negative_zero_normalizes_to_positive() {
        let d = DayTimeDuration::parse("-PT0S").unwrap();
        assert!(!d.is_negative());
    }

    #[test]
    fn general_duration_roundtrip() {
        let d = Duration::parse("P1Y2M3DT4H5M6S").unwrap();
        assert_eq!(d.to_string(), "P1Y2M3DT4H5M6S");
        assert_eq!(d.year_month_part().total_months(), 14);
        assert_eq!(d.day_time_part().total_seconds(), 3 * 86400 + 4 * 3600 + 5 * 60 + 6);
    }

    #[test]
    fn zero_duration_formats_as_p0d() {
        assert_eq!(Duration::parse("P0D").unwrap().to_string(), "P0D");
    }
}
