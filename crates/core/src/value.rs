//! Value type definitions for Cinder.
//!
//! This module defines the `Value` enum which represents any attribute value
//! that can be indexed. There is no null variant: an absent value is
//! `Option<Value>::None`, and indexes store it as [`IndexKey::Null`].
//!
//! [`IndexKey::Null`]: crate::IndexKey::Null

use crate::types::DataType;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// An indexed attribute value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Boolean value
    Boolean(bool),
    /// Single character
    Char(char),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// Fixed-point decimal
    Decimal(Decimal),
    /// UTF-8 string
    String(String),
    /// DateTime stored as Unix timestamp in milliseconds
    DateTime(i64),
}

impl Value {
    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::Char(_) => DataType::Char,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::Decimal(_) => DataType::Decimal,
            Value::String(_) => DataType::String,
            Value::DateTime(_) => DataType::DateTime,
        }
    }

    /// Returns true for the integer, float and decimal variants.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.data_type().is_numeric()
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value of any integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the datetime timestamp if this is a DateTime, None otherwise.
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a numeric value into a decimal.
    ///
    /// Returns None for non-numeric values and for floats that have no
    /// decimal representation (NaN, infinities, out of range).
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int32(v) => Some(Decimal::from(*v)),
            Value::Int64(v) => Some(Decimal::from(*v)),
            Value::Float64(v) => Decimal::from_f64(*v),
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Decodes the value as an integer for bitwise tests.
    ///
    /// Integers decode as-is, booleans as 0/1, and floats or decimals only
    /// when they carry no fractional part.
    pub fn to_bits(&self) -> Option<i64> {
        match self {
            Value::Boolean(b) => Some(*b as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Float64(v) if v.fract() == 0.0 => v.to_i64(),
            Value::Decimal(v) if v.fract().is_zero() => v.to_i64(),
            _ => None,
        }
    }

    /// Returns the text a wildcard pattern is matched against.
    pub fn as_text(&self) -> Option<std::borrow::Cow<'_, str>> {
        match self {
            Value::String(s) => Some(std::borrow::Cow::Borrowed(s.as_str())),
            Value::Char(c) => Some(std::borrow::Cow::Owned(c.to_string())),
            _ => None,
        }
    }

    /// Returns a copy with textual content lower-cased.
    ///
    /// Entry metadata records values in this form so comparisons against
    /// it are case-insensitive.
    pub fn case_folded(&self) -> Value {
        match self {
            Value::String(s) => Value::String(s.to_lowercase()),
            Value::Char(c) => Value::Char(c.to_lowercase().next().unwrap_or(*c)),
            other => other.clone(),
        }
    }

    /// Returns a type ordering value for comparing different types.
    /// Numeric variants share one rank because they compare by magnitude.
    fn type_order(&self) -> u8 {
        match self {
            Value::Boolean(_) => 1,
            Value::Int32(_) | Value::Int64(_) | Value::Float64(_) | Value::Decimal(_) => 2,
            Value::Char(_) => 3,
            Value::String(_) => 4,
            Value::DateTime(_) => 5,
        }
    }
}

/// Compares two floats, treating NaN as greater than every other value.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// `2^127`: every float at or beyond it lies outside the range of any
/// integer or decimal variant.
const WIDE_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Splits a finite float magnitude into `(mantissa, k)` with `|f| = mantissa * 2^-k`.
fn f64_fraction_parts(f: f64) -> (u64, u32) {
    let raw = f.abs().to_bits();
    let exponent = ((raw >> 52) & 0x7FF) as u32;
    let fraction = raw & 0x000F_FFFF_FFFF_FFFF;
    if exponent == 0 {
        (fraction, 1074)
    } else {
        (fraction | (1 << 52), 1075 - exponent)
    }
}

fn signum_decimal(d: &Decimal) -> i8 {
    if d.is_zero() {
        0
    } else if d.is_sign_negative() {
        -1
    } else {
        1
    }
}

fn signum_f64(f: f64) -> i8 {
    if f == 0.0 {
        0
    } else if f < 0.0 {
        -1
    } else {
        1
    }
}

/// Exact comparison of two values in `(-1, 1)`.
fn cmp_fraction(d: &Decimal, f: f64) -> Ordering {
    let (sd, sf) = (signum_decimal(d), signum_f64(f));
    if sd != sf || sd == 0 {
        return sd.cmp(&sf);
    }
    // |d| = m / 10^s and |f| = a / 2^k with k > s, so compare
    // m * 2^(k - s) against a * 5^s.
    let m = d.mantissa().unsigned_abs();
    let s = d.scale();
    let (a, k) = f64_fraction_parts(f);
    let rhs = u128::from(a) * 5u128.pow(s);
    let shift = k - s;
    let magnitude = if shift > m.leading_zeros() {
        Ordering::Greater
    } else {
        (m << shift).cmp(&rhs)
    };
    if sd < 0 {
        magnitude.reverse()
    } else {
        magnitude
    }
}

/// Exact comparison of a decimal with a float.
fn cmp_decimal_f64(d: &Decimal, f: f64) -> Ordering {
    if f.is_nan() {
        return Ordering::Less;
    }
    let whole = f.trunc();
    if whole >= WIDE_BOUND {
        return Ordering::Less;
    }
    if whole <= -WIDE_BOUND {
        return Ordering::Greater;
    }
    match d.trunc().mantissa().cmp(&(whole as i128)) {
        Ordering::Equal => cmp_fraction(&d.fract(), f.fract()),
        unequal => unequal,
    }
}

/// Compares two numeric values by exact magnitude.
fn cmp_numeric(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Float64(x), Value::Float64(y)) => cmp_f64(*x, *y),
        (Value::Float64(x), other) => other
            .to_decimal()
            .map_or(Ordering::Equal, |y| cmp_decimal_f64(&y, *x).reverse()),
        (other, Value::Float64(y)) => other.to_decimal().map_or(Ordering::Equal, |x| cmp_decimal_f64(&x, *y)),
        _ => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => match (a.to_decimal(), b.to_decimal()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => Ordering::Equal,
            },
        },
    }
}

/// The hashed form of a numeric value. Numerics that compare equal map to
/// the same form.
#[derive(Hash)]
enum NumericHash {
    Integral(i128),
    Decimal(Decimal),
    Float(u64),
}

impl NumericHash {
    fn of(value: &Value) -> Self {
        match value {
            Value::Decimal(d) if d.fract().is_zero() => NumericHash::Integral(d.trunc().mantissa()),
            Value::Decimal(d) => NumericHash::Decimal(d.normalize()),
            Value::Float64(f) if f.is_nan() => NumericHash::Float(f64::NAN.to_bits()),
            Value::Float64(f) if f.fract() == 0.0 && f.abs() < WIDE_BOUND => NumericHash::Integral(*f as i128),
            Value::Float64(f) => match Decimal::from_f64_retain(*f) {
                Some(d) if cmp_decimal_f64(&d, *f) == Ordering::Equal => NumericHash::Decimal(d.normalize()),
                _ => NumericHash::Float(f.to_bits()),
            },
            other => NumericHash::Integral(other.as_i64().map_or(0, i128::from)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Char(a), Value::Char(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => cmp_numeric(a, b),
            // Different types: order by type rank
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_order().hash(state);
        match self {
            Value::Boolean(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) => s.hash(state),
            Value::DateTime(d) => d.hash(state),
            numeric => NumericHash::of(numeric).hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Char(v) => write!(f, "'{}'", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
            Value::DateTime(v) => write!(f, "@{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
