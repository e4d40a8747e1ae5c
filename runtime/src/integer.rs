//! Arbitrary-precision signed integer (xs:integer and its restrictions).
//!
//! Magnitude is stored least-significant-limb-first with no trailing zero
//! limbs; zero is the empty magnitude and is always `Sign::Positive`.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Sign {
    Positive,
    Negative,
}

#[derive(Clone, Debug, Eq)]
pub struct Integer {
    sign: Sign,
    magnitude: Vec<u32>,
}

impl Integer {
    pub fn zero() -> Self {
        Self {
            sign: Sign::Positive,
            magnitude: Vec::new(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.sign == Sign::Negative && !self.is_zero()
    }

    fn normalized(sign: Sign, mut magnitude: Vec<u32>) -> Self {
        while magnitude.last() == Some(&0) {
            magnitude.pop();
        }
        let sign = if magnitude.is_empty() {
            Sign::Positive
        } else {
            sign
        };
        Self { sign, magnitude }
    }

    pub fn from_i64(value: i64) -> Self {
        let sign = if value < 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        let mag = (value as i128).unsigned_abs() as u128;
        Self::normalized(sign, magnitude_from_u128(mag))
    }

    pub fn from_u64(value: u64) -> Self {
        Self::normalized(Sign::Positive, magnitude_from_u128(value as u128))
    }

    /// Parses the XSD lexical form: optional `+`/`-`, one or more digits.
    /// Leading zeros are accepted; `-0` normalizes to positive zero.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let source = source.trim();
        if source.is_empty() {
            return Err(Error::InvalidArgument("empty integer literal".into()));
        }
        let (sign, digits) = match source.as_bytes()[0] {
            b'+' => (Sign::Positive, &source[1..]),
            b'-' => (Sign::Negative, &source[1..]),
            _ => (Sign::Positive, source),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidArgument(format!(
                "not a valid integer literal: {source:?}"
            )));
        }
        let mut magnitude = Vec::new();
        for byte in digits.bytes() {
            magnitude_mul10_add(&mut magnitude, (byte - b'0') as u32);
        }
        Ok(Self::normalized(sign, magnitude))
    }

    pub fn neg(&self) -> Self {
        Self::normalized(flip(self.sign), self.magnitude.clone())
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.sign == other.sign {
            Self::normalized(self.sign, magnitude_add(&self.magnitude, &other.magnitude))
        } else {
            match magnitude_cmp(&self.magnitude, &other.magnitude) {
                Ordering::Equal => Self::zero(),
                Ordering::Greater => {
                    Self::normalized(self.sign, magnitude_sub(&self.magnitude, &other.magnitude))
                }
                Ordering::Less => {
                    Self::normalized(other.sign, magnitude_sub(&other.magnitude, &self.magnitude))
                }
            }
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let magnitude = magnitude_mul(&self.magnitude, &other.magnitude);
        let sign = if self.sign == other.sign {
            Sign::Positive
        } else {
            Sign::Negative
        };
        Self::normalized(sign, magnitude)
    }

    /// Truncating division; remainder carries the dividend's sign.
    pub fn div_rem(&self, other: &Self) -> Result<(Self, Self), Error> {
        if other.is_zero() {
            return Err(Error::DivideByZero);
        }
        let (q, r) = magnitude_divmod(&self.magnitude, &other.magnitude);
        let q_sign = if self.sign == other.sign {
            Sign::Positive
        } else {
            Sign::Negative
        };
        Ok((
            Self::normalized(q_sign, q),
            Self::normalized(self.sign, r),
        ))
    }

    pub fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => magnitude_cmp(&self.magnitude, &other.magnitude),
            (true, true) => magnitude_cmp(&other.magnitude, &self.magnitude),
        }
    }

    pub fn to_f64(&self) -> f64 {
        let mut value = 0.0f64;
        for &limb in self.magnitude.iter().rev() {
            value = value * 4294967296.0 + limb as f64;
        }
        if self.is_negative() {
            -value
        } else {
            value
        }
    }

    pub fn to_i64(&self) -> Result<i64, Error> {
        let magnitude = magnitude_to_u128(&self.magnitude).ok_or(Error::Overflow)?;
        if self.is_negative() {
            if magnitude > (i64::MAX as u128) + 1 {
                return Err(Error::Overflow);
            }
            if magnitude == (i64::MAX as u128) + 1 {
                return Ok(i64::MIN);
            }
            Ok(-(magnitude as i64))
        } else {
            i64::try_from(magnitude).map_err(|_| Error::Overflow)
        }
    }

    pub fn to_u64(&self) -> Result<u64, Error> {
        if self.is_negative() {
            return Err(Error::Overflow);
        }
        let magnitude = magnitude_to_u128(&self.magnitude).ok_or(Error::Overflow)?;
        u64::try_from(magnitude).map_err(|_| Error::Overflow)
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        Integer::cmp(self, other)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        if self.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{}", magnitude_to_decimal(&self.magnitude))
    }
}

fn flip(sign: Sign) -> Sign {
    match sign {
        Sign::Positive => Sign::Negative,
        Sign::Negative => Sign::Positive,
    }
}

fn magnitude_from_u128(mut value: u128) -> Vec<u32> {
    let mut out = Vec::new();
    while value != 0 {
        out.push((value & 0xFFFF_FFFF) as u32);
        value >>= 32;
    }
    out
}

fn magnitude_to_u128(magnitude: &[u32]) -> Option<u128> {
    if magnitude.len() > 4 {
        return None;
    }
    let mut value: u128 = 0;
    for (i, &limb) in magnitude.iter().enumerate() {
        value |= (limb as u128) << (32 * i);
    }
    Some(value)
}

fn magnitude_mul10_add(magnitude: &mut Vec<u32>, digit: u32) {
    let mut carry = digit as u64;
    for limb in magnitude.iter_mut() {
        let product = (*limb as u64) * 10 + carry;
        *limb = product as u32;
        carry = product >> 32;
    }
    if carry != 0 {
        magnitude.push(carry as u32);
    }
}

fn magnitude_add(a: &[u32], b: &[u32]) -> Vec<u32> {
    let len = a.len().max(b.len());
    let mut result = Vec::with_capacity(len + 1);
    let mut carry = 0u64;
    for i in 0..len {
        let mut sum = carry;
        if i < a.len() {
            sum += a[i] as u64;
        }
        if i < b.len() {
            sum += b[i] as u64;
        }
        result.push(sum as u32);
        carry = sum >> 32;
    }
    if carry != 0 {
        result.push(carry as u32);
    }
    result
}

fn magnitude_cmp(a: &[u32], b: &[u32]) -> Ordering {
    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for i in (0..a.len()).rev() {
        if a[i] != b[i] {
            return a[i].cmp(&b[i]);
        }
    }
    Ordering::Equal
}

/// Subtracts `b` from `a`. Caller must ensure `a >= b`.
fn magnitude_sub(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut result = Vec::with_capacity(a.len());
    let mut borrow = 0i64;
    for i in 0..a.len() {
        let ai = a[i] as i64;
        let bi = if i < b.len() { b[i] as i64 } else { 0 };
        let mut diff = ai - bi - borrow;
        if diff < 0 {
            diff += 1 << 32;
            borrow = 1;
        } else {
            borrow = 0;
        }
        result.push(diff as u32);
    }
    while result.last() == Some(&0) {
        result.pop();
    }
    result
}

fn magnitude_mul(a: &[u32], b: &[u32]) -> Vec<u32> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut result = vec![0u32; a.len() + b.len()];
    for (i, &ai) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &bj) in b.iter().enumerate() {
            let product = ai as u64 * bj as u64 + result[i + j] as u64 + carry;
            result[i + j] = product as u32;
            carry = product >> 32;
        }
        result[i + b.len()] = result[i + b.len()].wrapping_add(carry as u32);
    }
    while result.last() == Some(&0) {
        result.pop();
    }
    result
}

/// Shift-and-subtract binary long division. Returns `(quotient, remainder)`.
fn magnitude_divmod(a: &[u32], b: &[u32]) -> (Vec<u32>, Vec<u32>) {
    match magnitude_cmp(a, b) {
        Ordering::Less => return (Vec::new(), a.to_vec()),
        Ordering::Equal => return (vec![1], Vec::new()),
        Ordering::Greater => {}
    }

    let a_bits = bit_length(a);
    let mut quotient_bits = vec![false; a_bits];
    let mut remainder: Vec<u32> = Vec::new();

    for i in (0..a_bits).rev() {
        // remainder = remainder << 1 | bit(a, i)
        shift_left_one(&mut remainder);
        if bit_at(a, i) {
            set_bit0(&mut remainder);
        }
        if magnitude_cmp(&remainder, b) != Ordering::Less {
            remainder = magnitude_sub(&remainder, b);
            quotient_bits[i] = true;
        }
    }

    let mut quotient = vec![0u32; a_bits.div_ceil(32)];
    for (i, &bit) in quotient_bits.iter().enumerate() {
        if bit {
            quotient[i / 32] |= 1 << (i % 32);
        }
    }
    while quotient.last() == Some(&0) {
        quotient.pop();
    }

    (quotient, remainder)
}

fn bit_length(magnitude: &[u32]) -> usize {
    if magnitude.is_empty() {
        return 0;
    }
    let top = *magnitude.last().unwrap();
    (magnitude.len() - 1) * 32 + (32 - top.leading_zeros() as usize)
}

fn bit_at(magnitude: &[u32], index: usize) -> bool {
    let limb = index / 32;
    let bit = index % 32;
    limb < magnitude.len() && (magnitude[limb] >> bit) & 1 == 1
}

fn shift_left_one(magnitude: &mut Vec<u32>) {
    let mut carry = 0u32;
    for limb in magnitude.iter_mut() {
        let new_carry = *limb >> 31;
        *limb = (*limb << 1) | carry;
        carry = new_carry;
    }
    if carry != 0 {
        magnitude.push(carry);
    }
}

fn set_bit0(magnitude: &mut Vec<u32>) {
    if magnitude.is_empty() {
        magnitude.push(1);
    } else {
        magnitude[0] |= 1;
    }
}

fn magnitude_to_decimal(magnitude: &[u32]) -> String {
    let mut digits: Vec<u8> = Vec::new();
    let mut remaining = magnitude.to_vec();
    while !remaining.is_empty() {
        let mut carry = 0u64;
        for limb in remaining.iter_mut().rev() {
            let cur = carry << 32 | *limb as u64;
            *limb = (cur / 10) as u32;
            carry = cur % 10;
        }
        while remaining.last() == Some(&0) {
            remaining.pop();
        }
        digits.push(carry as u8);
    }
    if digits.is_empty() {
        return "0".to_string();
    }
    digits
        .iter()
        .rev()
        .map(|d| (b'0' + d) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_basic_values() {
        for s in ["0", "-0", "1", "-1", "9223372036854775807", "-9223372036854775808", "18446744073709551615"] {
            let i = Integer::parse(s).unwrap();
            let expected = if s == "-0" { "0" } else { s };
            assert_eq!(i.to_string(), expected);
        }
    }

    #[test]
    fn roundtrip_large_magnitude() {
        let digits = "1".repeat(200);
        let i = Integer::parse(&digits).unwrap();
        assert_eq!(i.to_string(), digits);
    }

    #[test]
    fn division_identity_mixed_signs() {
        let cases: [(i64, i64); 4] = [(7, 3), (-7, 3), (7, -3), (-7, -3)];
        for (a, b) in cases {
            let a_i = Integer::from_i64(a);
            let b_i = Integer::from_i64(b);
            let (q, r) = a_i.div_rem(&b_i).unwrap();
            let check = q.mul(&b_i).add(&r);
            assert_eq!(check, a_i, "{a} / {b}");
        }
    }

    #[test]
    fn division_by_zero_fails() {
        let a = Integer::from_i64(5);
        assert_eq!(a.div_rem(&Integer::zero()), Err(Error::DivideByZero));
    }

    #[test]
    fn parse_rejects_invalid() {
        assert!(Integer::parse("").is_err());
        assert!(Integer::parse("abc").is_err());
        assert!(Integer::parse("+").is_err());
    }

    #[test]
    fn checked_conversion_overflows() {
        let over = Integer::parse("99999999999999999999999999").unwrap();
        assert_eq!(over.to_i64(), Err(Error::Overflow));
        assert_eq!(Integer::from_i64(-1).to_u64(), Err(Error::Overflow));
    }

    #[test]
    fn ordering_is_total() {
        assert!(Integer::from_i64(-5) < Integer::from_i64(-1));
        assert!(Integer::from_i64(-1) < Integer::from_i64(0));
        assert!(Integer::from_i64(0) < Integer::from_i64(1));
    }
}
