//! Fixed-point decimal arithmetic
//!
//! Positions, speeds and timers are stored as integers scaled by 10^6, so
//! decimal constants such as the 0.01 s tick are exact and scrolling the
//! same distance forward and back always lands on the starting value.
//! Products and quotients round half to even.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Number of decimal fraction digits kept
pub const FRAC_DIGITS: u32 = 6;
/// Raw units per 1.0
pub const SCALE: i64 = 10_i64.pow(FRAC_DIGITS);

/// Signed fixed-point decimal with six fraction digits
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Fixed(i64);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(SCALE);

    /// Build from raw scaled units
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn from_int(value: i64) -> Self {
        Self(value * SCALE)
    }

    /// Exact value of `millis / 1000`
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * (SCALE / 1000))
    }

    /// `num / den`, rounded half to even
    pub fn from_ratio(num: i64, den: i64) -> Self {
        Self(div_round_half_even(num as i128 * SCALE as i128, den as i128) as i64)
    }

    /// Nearest representable value (ties to even)
    pub fn from_f64(value: f64) -> Self {
        Self((value * SCALE as f64).round_ties_even() as i64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Largest integer not greater than this value
    #[inline]
    pub fn floor(self) -> i64 {
        self.0.div_euclid(SCALE)
    }

    /// Integer part, rounding toward zero
    #[inline]
    pub fn trunc(self) -> i64 {
        self.0 / SCALE
    }

    /// Nearest integer, ties to even
    pub fn round_half_even(self) -> i64 {
        div_round_half_even(self.0 as i128, SCALE as i128) as i64
    }

    /// `floor(self / divisor)` for an integer divisor, e.g. a cell side length
    #[inline]
    pub fn div_floor(self, divisor: i64) -> i64 {
        self.0.div_euclid(divisor * SCALE)
    }

    /// Round to `digits` fraction digits (half to even)
    pub fn quantize(self, digits: u32) -> Self {
        if digits >= FRAC_DIGITS {
            return self;
        }
        let step = 10_i64.pow(FRAC_DIGITS - digits);
        Self(div_round_half_even(self.0 as i128, step as i128) as i64 * step)
    }
}

/// Integer division rounding half to even
fn div_round_half_even(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let quot = num.div_euclid(den);
    let twice_rem = 2 * num.rem_euclid(den);
    if twice_rem > den || (twice_rem == den && quot.rem_euclid(2) == 1) {
        quot + 1
    } else {
        quot
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 -= rhs.0;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(-self.0)
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(div_round_half_even(self.0 as i128 * rhs.0 as i128, SCALE as i128) as i64)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed(div_round_half_even(self.0 as i128 * SCALE as i128, rhs.0 as i128) as i64)
    }
}

impl Mul<i64> for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, rhs: i64) -> Fixed {
        Fixed(self.0 * rhs)
    }
}

impl Div<i64> for Fixed {
    type Output = Fixed;
    fn div(self, rhs: i64) -> Fixed {
        Fixed(div_round_half_even(self.0 as i128, rhs as i128) as i64)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let int_part = magnitude / SCALE as u64;
        let frac_part = magnitude % SCALE as u64;
        if frac_part == 0 {
            return write!(f, "{sign}{int_part}");
        }
        let digits = format!("{:0width$}", frac_part, width = FRAC_DIGITS as usize);
        write!(f, "{sign}{int_part}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid fixed-point literal {0:?}")]
pub struct ParseFixedError(String);

impl FromStr for Fixed {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseFixedError(s.to_string());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_str, frac_str) = body.split_once('.').unwrap_or((body, ""));
        if int_str.is_empty() && frac_str.is_empty() {
            return Err(invalid());
        }
        if frac_str.len() > FRAC_DIGITS as usize
            || !int_str.bytes().all(|b| b.is_ascii_digit())
            || !frac_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let int_part: i64 = if int_str.is_empty() {
            0
        } else {
            int_str.parse().map_err(|_| invalid())?
        };
        let mut frac_part: i64 = if frac_str.is_empty() {
            0
        } else {
            frac_str.parse().map_err(|_| invalid())?
        };
        frac_part *= 10_i64.pow(FRAC_DIGITS - frac_str.len() as u32);
        let raw = int_part
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_part))
            .ok_or_else(invalid)?;
        Ok(Fixed(if negative { -raw } else { raw }))
    }
}

impl Serialize for Fixed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fixed {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FixedVisitor;

        impl Visitor<'_> for FixedVisitor {
            type Value = Fixed;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Fixed, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fixed, E> {
                Ok(Fixed::from_int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fixed, E> {
                i64::try_from(v).map(Fixed::from_int).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(FixedVisitor)
    }
}

/// 2D vector of fixed-point components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedVec2 {
    pub const ZERO: FixedVec2 = FixedVec2 {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    pub const fn from_ints(x: i64, y: i64) -> Self {
        Self::new(Fixed::from_int(x), Fixed::from_int(y))
    }

    /// Linear interpolation, `t` in [0, 1]
    pub fn lerp(self, rhs: FixedVec2, t: Fixed) -> FixedVec2 {
        self + (rhs - self) * t
    }
}

impl Add for FixedVec2 {
    type Output = FixedVec2;
    fn add(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for FixedVec2 {
    type Output = FixedVec2;
    fn sub(self, rhs: FixedVec2) -> FixedVec2 {
        FixedVec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: FixedVec2) {
        *self = *self + rhs;
    }
}

impl Neg for FixedVec2 {
    type Output = FixedVec2;
    fn neg(self) -> FixedVec2 {
        FixedVec2::new(-self.x, -self.y)
    }
}

impl Mul<Fixed> for FixedVec2 {
    type Output = FixedVec2;
    fn mul(self, rhs: Fixed) -> FixedVec2 {
        FixedVec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<Fixed> for FixedVec2 {
    type Output = FixedVec2;
    fn div(self, rhs: Fixed) -> FixedVec2 {
        FixedVec2::new(self.x / rhs, self.y / rhs)
    }
}
