//! Fixed-point decimal (xs:decimal and its restrictions).
//!
//! Represented as an arbitrary-precision coefficient plus a base-10 scale:
//! value = coefficient * 10^(-scale). Scale is always >= 0; trailing
//! fractional zeros are trimmed on construction but a bare integer keeps
//! scale 0, matching `xs:decimal`'s minimum-fraction-digits-of-zero rule.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Error;
use crate::integer::Integer;

#[derive(Clone, Debug, Eq)]
pub struct Decimal {
    coefficient: Integer,
    scale: u32,
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            coefficient: Integer::zero(),
            scale: 0,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        Self {
            coefficient: Integer::from_i64(value),
            scale: 0,
        }
    }

    /// Parses the XSD lexical form: optional sign, digits, optional `.digits`.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::InvalidArgument("empty decimal literal".into()));
        }
        let (sign, rest) = match source.as_bytes()[0] {
            b'+' => ("", &source[1..]),
            b'-' => ("-", &source[1..]),
            _ => ("", source),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "not a valid decimal literal: {source:?}"
            )));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidArgument(format!(
                "not a valid decimal literal: {source:?}"
            )));
        }
        let scale = frac_part.len() as u32;
        let digits = format!("{int_part}{frac_part}");
        let digits = if digits.is_empty() { "0" } else { &digits };
        let coefficient = Integer::parse(&format!("{sign}{digits}"))?;
        Ok(Self { coefficient, scale }.trimmed())
    }

    fn trimmed(self) -> Self {
        if self.scale == 0 || !self.coefficient.is_zero() {
            return self.trim_trailing_zeros();
        }
        Self {
            coefficient: Integer::zero(),
            scale: 0,
        }
    }

    fn trim_trailing_zeros(self) -> Self {
        if self.scale == 0 {
            return self;
        }
        let text = self.coefficient.to_string();
        let negative = text.starts_with('-');
        let digits = if negative { &text[1..] } else { &text[..] };
        let mut digits = digits.to_string();
        let mut scale = self.scale;
        while scale > 0 && digits.ends_with('0') {
            digits.pop();
            scale -= 1;
        }
        let coefficient = Integer::parse(&format!("{}{}", if negative { "-" } else { "" }, digits))
            .expect("trimmed digits remain a valid integer literal");
        Self { coefficient, scale }
    }

    fn rescale_pair(&self, other: &Self) -> (Integer, Integer, u32) {
        let scale = self.scale.max(other.scale);
        let lhs = scale_up(&self.coefficient, scale - self.scale);
        let rhs = scale_up(&other.coefficient, scale - other.scale);
        (lhs, rhs, scale)
    }

    pub fn add(&self, other: &Self) -> Self {
        let (lhs, rhs, scale) = self.rescale_pair(other);
        Self {
            coefficient: lhs.add(&rhs),
            scale,
        }
        .trimmed()
    }

    pub fn sub(&self, other: &Self) -> Self {
        let (lhs, rhs, scale) = self.rescale_pair(other);
        Self {
            coefficient: lhs.sub(&rhs),
            scale,
        }
        .trimmed()
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self {
            coefficient: self.coefficient.mul(&other.coefficient),
            scale: self.scale + other.scale,
        }
        .trimmed()
    }

    /// Divides to `scale` fractional digits, truncating toward zero.
    ///
    /// `self / other == (coeff_a * 10^scale_b) / (coeff_b * 10^scale_a)`;
    /// the numerator is scaled up further by `10^scale` so the quotient
    /// lands with exactly `scale` fractional digits.
    pub fn div(&self, other: &Self, scale: u32) -> Result<Self, Error> {
        if other.coefficient.is_zero() {
            return Err(Error::DivideByZero);
        }
        let numerator = scale_up(&scale_up(&self.coefficient, other.scale), scale);
        let denominator = scale_up(&other.coefficient, self.scale);
        let (quotient, _) = numerator.div_rem(&denominator)?;
        Ok(Self {
            coefficient: quotient,
            scale,
        }
        .trimmed())
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        let (lhs, rhs, _) = self.rescale_pair(other);
        lhs.cmp(&rhs)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub fn to_f64(&self) -> f64 {
        self.coefficient.to_f64() / 10f64.powi(self.scale as i32)
    }
}

fn scale_up(value: &Integer, by: u32) -> Integer {
    let mut result = value.clone();
    let ten = Integer::from_i64(10);
    for _ in 0..by {
        result = result.mul(&ten);
    }
    result
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        Decimal::cmp(self, other)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.coefficient);
        }
        let text = self.coefficient.to_string();
        let negative = text.starts_with('-');
        let digits = if negative { &text[1..] } else { &text[..] };
        let scale = self.scale as usize;
        if digits.len() <= scale {
            let padded = format!("{:0>width$}", digits, width = scale + 1);
            let (int_part, frac_part) = padded.split_at(padded.len() - scale);
            write!(
                f,
                "{}{}.{}",
                if negative { "-" } else { "" },
                int_part,
                frac_part
            )
        } else {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(
                f,
                "{}{}.{}",
                if negative { "-" } else { "" },
                int_part,
                frac_part
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        assert_eq!(Decimal::parse("3.140").unwrap().to_string(), "3.14");
        assert_eq!(Decimal::parse("-0.5").unwrap().to_string(), "-0.5");
        assert_eq!(Decimal::parse("5").unwrap().to_string(), "5");
        assert_eq!(Decimal::parse(".5").unwrap().to_string(), "0.5");
    }

    #[test]
    fn zero_variants_are_equal() {
        assert_eq!(Decimal::parse("0").unwrap(), Decimal::parse("-0.00").unwrap());
    }

    #[test]
    fn add_aligns_scale() {
        let a = Decimal::parse("1.5").unwrap();
        let b = Decimal::parse("2.25").unwrap();
        assert_eq!(a.add(&b).to_string(), "3.75");
    }

    #[test]
    fn division_truncates_to_requested_scale() {
        let a = Decimal::parse("10").unwrap();
        let b = Decimal::parse("3").unwrap();
        assert_eq!(a.div(&b, 4).unwrap().to_string(), "3.3333");
    }

    #[test]
    fn division_by_zero_fails() {
        let a = Decimal::parse("1").unwrap();
        assert_eq!(a.div(&Decimal::zero(), 2), Err(Error::DivideByZero));
    }

    #[test]
    fn parse_rejects_invalid() {
        assert!(Decimal::parse("").is_err());
        assert!(Decimal::parse("1.2.3").is_err());
        assert!(Decimal::parse("abc").is_err());
    }
}
