//! Attribute values carried by entities and criteria.
//!
//! Criteria compare values loosely: `=` and `!=` compare string
//! representations (so `5` equals `"5"`), numeric operators coerce both
//! sides to numbers, and anything that does not coerce becomes `NaN`,
//! which never compares true.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

/// The value side of a criterion: a scalar, or a list for `in` / `between`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    /// A list of values (`in` members, or `[min, max]` for `between`).
    List(Vec<Scalar>),
    /// A single value.
    Scalar(Scalar),
}

/// The value of an entity field as seen by the criteria evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The entity has no value for this field.
    Missing,
    /// Single-valued field.
    Scalar(Scalar),
    /// Multi-valued field (e.g. a location's group memberships).
    List(Vec<Scalar>),
}

impl Scalar {
    /// String form used by loose equality.
    pub fn loose_string(&self) -> String {
        match self {
            Scalar::Null => "null".to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => number_string(*n),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Numeric coercion. Non-numeric text yields `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Scalar::Null => 0.0,
            Scalar::Bool(true) => 1.0,
            Scalar::Bool(false) => 0.0,
            Scalar::Number(n) => *n,
            Scalar::Text(s) => parse_number(s),
        }
    }

    /// Type-strict equality used for set membership.
    pub fn same_value(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            // NaN is a member of a list containing NaN.
            (Scalar::Number(a), Scalar::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Whether the value counts as present for `exists`.
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Text(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loose_string())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(f64::from(n))
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// An absent attribute reads as [`FieldValue::Missing`].
impl<T: Into<Scalar>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Missing, |v| FieldValue::Scalar(v.into()))
    }
}

impl CriterionValue {
    /// Builds a list value.
    pub fn list<T: Into<Scalar>>(items: impl IntoIterator<Item = T>) -> Self {
        CriterionValue::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a `[min, max]` range for `between`.
    pub fn range(min: f64, max: f64) -> Self {
        CriterionValue::List(vec![Scalar::Number(min), Scalar::Number(max)])
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            CriterionValue::List(items) => Some(items),
            CriterionValue::Scalar(_) => None,
        }
    }

    /// String form used by loose equality. Lists join with commas.
    pub fn loose_string(&self) -> String {
        match self {
            CriterionValue::Scalar(s) => s.loose_string(),
            CriterionValue::List(items) => join_loose(items),
        }
    }

    /// Numeric coercion. Lists coerce only when they hold zero or one item.
    pub fn to_number(&self) -> f64 {
        match self {
            CriterionValue::Scalar(s) => s.to_number(),
            CriterionValue::List(items) => list_to_number(items),
        }
    }
}

impl Default for CriterionValue {
    fn default() -> Self {
        CriterionValue::Scalar(Scalar::Null)
    }
}

impl FieldValue {
    /// String form used by loose equality. A missing field is `"undefined"`.
    pub fn loose_string(&self) -> String {
        match self {
            FieldValue::Missing => "undefined".to_string(),
            FieldValue::Scalar(s) => s.loose_string(),
            FieldValue::List(items) => join_loose(items),
        }
    }

    /// Numeric coercion. A missing field is `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            FieldValue::Missing => f64::NAN,
            FieldValue::Scalar(s) => s.to_number(),
            FieldValue::List(items) => list_to_number(items),
        }
    }

    /// Whether the value counts as present for `exists`.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Missing => false,
            FieldValue::Scalar(s) => s.is_present(),
            FieldValue::List(_) => true,
        }
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for CriterionValue {
                fn from(value: $ty) -> Self {
                    CriterionValue::Scalar(value.into())
                }
            }

            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_conversions!(Scalar, &str, String, f64, i32, bool);

// Shortest round-trip digits, laid out the way JavaScript's `String(n)` does:
// plain notation for exponents in -7 < e < 21, scientific otherwise.
fn number_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }
    if n == 0.0 {
        // -0 prints as 0
        return "0".to_string();
    }

    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exp + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{first}e{sign}{}", exp.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exp.abs())
        }
    };

    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

// Numeric coercion of text, following JavaScript's `Number(text)`.
fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(n) = parse_radix_literal(t) {
        return n;
    }
    // Rust accepts "inf"/"nan" spellings; those are not numbers here.
    if !t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

// Unsigned `0x`, `0o` and `0b` literals. Returns `None` when there is no
// prefix, and `NaN` for a prefix with no valid digits.
fn parse_radix_literal(t: &str) -> Option<f64> {
    let bytes = t.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &t[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

fn list_to_number(items: &[Scalar]) -> f64 {
    match items {
        [] => 0.0,
        [only] => parse_number(&only.loose_string_in_list()),
        _ => f64::NAN,
    }
}

fn join_loose(items: &[Scalar]) -> String {
    items
        .iter()
        .map(Scalar::loose_string_in_list)
        .collect::<Vec<_>>()
        .join(",")
}

impl Scalar {
    // Nulls inside a list stringify as empty.
    fn loose_string_in_list(&self) -> String {
        match self {
            Scalar::Null => String::new(),
            other => other.loose_string(),
        }
    }
}
