//! Numeric types for resource values.
//!
//! Provides the `Decimal` value type used everywhere a quantity, cost or
//! rate is stored. Arithmetic is backed by `f64`; saturation, infinity and
//! NaN behavior is inherited as-is from the backing type.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A numeric game value.
///
/// `Decimal` is `Copy` and cheap to pass around. All operations are pure;
/// no operation panics.
///
/// # Examples
///
/// ```rust
/// use zzidle::Decimal;
///
/// let logs = Decimal::from(35);
/// let cost = Decimal::from(10).times(Decimal::from(2).pow(1));
/// assert_eq!(logs - cost, Decimal::from(15));
/// ```
///
/// Finite values serialize as JSON numbers. Infinity and NaN have no JSON
/// number form and serialize as the strings `"Infinity"`, `"-Infinity"`
/// and `"NaN"`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Decimal(f64);

impl Decimal {
    /// Zero.
    pub const ZERO: Decimal = Decimal(0.0);

    /// One.
    pub const ONE: Decimal = Decimal(1.0);

    /// Positive infinity, used as the "no limit" marker for purchase limits.
    pub const INFINITY: Decimal = Decimal(f64::INFINITY);

    /// Create a new decimal from an `f64`.
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Convert to `f64`.
    pub fn to_f64(self) -> f64 {
        self.0
    }

    /// Convert to an integer, truncating toward zero and saturating at the bounds.
    pub fn to_u64(self) -> u64 {
        if self.0.is_nan() || self.0 <= 0.0 {
            0
        } else {
            self.0 as u64
        }
    }

    pub fn plus(self, other: impl Into<Decimal>) -> Self {
        self + other.into()
    }

    pub fn minus(self, other: impl Into<Decimal>) -> Self {
        self - other.into()
    }

    pub fn times(self, other: impl Into<Decimal>) -> Self {
        self * other.into()
    }

    pub fn div_by(self, other: impl Into<Decimal>) -> Self {
        self / other.into()
    }

    /// Raise to a power.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzidle::Decimal;
    ///
    /// assert_eq!(Decimal::from(2).pow(10), Decimal::from(1024));
    /// ```
    pub fn pow(self, exponent: impl Into<Decimal>) -> Self {
        Self(self.0.powf(exponent.into().0))
    }

    /// The `degree`-th root. Inverse of [`Decimal::pow`] for positive values.
    pub fn root(self, degree: impl Into<Decimal>) -> Self {
        Self(self.0.powf(1.0 / degree.into().0))
    }

    pub fn sqrt(self) -> Self {
        Self(self.0.sqrt())
    }

    pub fn log10(self) -> Self {
        Self(self.0.log10())
    }

    pub fn ln(self) -> Self {
        Self(self.0.ln())
    }

    /// Logarithm in an arbitrary base.
    pub fn log(self, base: impl Into<Decimal>) -> Self {
        let base = base.into().0;
        if base == 10.0 {
            Self(self.0.log10())
        } else if base == 2.0 {
            Self(self.0.log2())
        } else {
            Self(self.0.ln() / base.ln())
        }
    }

    pub fn floor(self) -> Self {
        Self(self.0.floor())
    }

    pub fn ceil(self) -> Self {
        Self(self.0.ceil())
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// The larger of two values. NaN loses against a number.
    pub fn max(self, other: impl Into<Decimal>) -> Self {
        Self(self.0.max(other.into().0))
    }

    /// The smaller of two values. NaN loses against a number.
    pub fn min(self, other: impl Into<Decimal>) -> Self {
        Self(self.0.min(other.into().0))
    }

    pub fn gt(self, other: impl Into<Decimal>) -> bool {
        self.0 > other.into().0
    }

    pub fn gte(self, other: impl Into<Decimal>) -> bool {
        self.0 >= other.into().0
    }

    pub fn lt(self, other: impl Into<Decimal>) -> bool {
        self.0 < other.into().0
    }

    pub fn lte(self, other: impl Into<Decimal>) -> bool {
        self.0 <= other.into().0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }
}

impl From<f64> for Decimal {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self(value as f64)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Self(value as f64)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self(value as f64)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self(value as f64)
    }
}

impl From<usize> for Decimal {
    fn from(value: usize) -> Self {
        Self(value as f64)
    }
}

impl From<Decimal> for f64 {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl Add for Decimal {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Decimal {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Mul for Decimal {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self(self.0 * other.0)
    }
}

impl Div for Decimal {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        Self(self.0 / other.0)
    }
}

impl Neg for Decimal {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::ZERO, |acc, v| acc + v)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(*self, 2))
    }
}

/// Format a value for display with `precision` decimal places.
///
/// Values at or above 1e9 switch to exponent notation.
///
/// # Examples
///
/// ```rust
/// use zzidle::numeric::{format, Decimal};
///
/// assert_eq!(format(Decimal::from(1.5), 2), "1.50");
/// assert_eq!(format(Decimal::from(2.5e10), 2), "2.50e10");
/// ```
pub fn format(value: Decimal, precision: usize) -> String {
    let v = value.0;
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v.abs() >= 1e9 {
        let exponent = v.abs().log10().floor() as i32;
        let mantissa = v / 10f64.powi(exponent);
        // Rounding can push the mantissa to 10.00
        let rounded = (mantissa * 10f64.powi(precision as i32)).round() / 10f64.powi(precision as i32);
        if rounded.abs() >= 10.0 {
            return format!("{:.*}e{}", precision, rounded / 10.0, exponent + 1);
        }
        return format!("{:.*}e{}", precision, rounded, exponent);
    }
    format!("{:.*}", precision, v)
}

/// Format a value as a whole number.
pub fn format_whole(value: Decimal) -> String {
    if value.0.abs() >= 1e9 {
        format(value, 2)
    } else {
        format(value.floor(), 0)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.serialize_str(&format(*self, 0))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match DecimalRepr::deserialize(deserializer)? {
            DecimalRepr::Number(v) => Ok(Decimal(v)),
            DecimalRepr::Text(text) => match text.as_str() {
                "Infinity" => Ok(Decimal(f64::INFINITY)),
                "-Infinity" => Ok(Decimal(f64::NEG_INFINITY)),
                "NaN" => Ok(Decimal(f64::NAN)),
                other => Err(de::Error::custom(format!("invalid decimal {other:?}"))),
            },
        }
    }
}
