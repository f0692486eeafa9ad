//! Single typed values with an explicit missing state

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ColumnType, dominant_type};

/// A present, native value of one of the four column types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Bool(_) => ColumnType::Bool,
            Value::String(_) => ColumnType::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// One cell of a column: a declared type plus an optional payload.
///
/// `None` is the missing marker. A float `NaN` is never stored as a present
/// value; constructors and casts turn it into a missing float.
///
/// The derived `PartialEq` is structural: two elements are equal when they
/// have the same declared type, the same missing state and (if present) the
/// same value. In particular two missing elements of one type are equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    String(Option<String>),
}

impl Element {
    /// A missing element of the given type
    pub fn missing(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Int => Element::Int(None),
            ColumnType::Float => Element::Float(None),
            ColumnType::Bool => Element::Bool(None),
            ColumnType::String => Element::String(None),
        }
    }

    /// A float element; `NaN` becomes missing
    pub fn float(v: f64) -> Self {
        Element::Float(non_nan(v))
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Element::Int(_) => ColumnType::Int,
            Element::Float(_) => ColumnType::Float,
            Element::Bool(_) => ColumnType::Bool,
            Element::String(_) => ColumnType::String,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Element::Int(v) => v.is_none(),
            Element::Float(v) => v.is_none(),
            Element::Bool(v) => v.is_none(),
            Element::String(v) => v.is_none(),
        }
    }

    /// The native value, or `None` when missing
    pub fn value(&self) -> Option<Value> {
        match self {
            Element::Int(v) => v.map(Value::Int),
            Element::Float(v) => v.map(Value::Float),
            Element::Bool(v) => v.map(Value::Bool),
            Element::String(v) => v.clone().map(Value::String),
        }
    }

    /// Parse a raw token as the given type. Unparseable tokens become missing.
    pub fn parse(token: &str, ty: ColumnType) -> Self {
        match ty {
            ColumnType::String => Element::String(Some(token.to_string())),
            ColumnType::Int => Element::Int(parse_int(token)),
            ColumnType::Float => Element::Float(token.trim().parse::<f64>().ok().and_then(non_nan)),
            ColumnType::Bool => Element::Bool(parse_bool(token)),
        }
    }

    /// Convert to another type. Conversions that have no exact result
    /// (an unparseable string, a fractional float to int, 2 to bool) yield
    /// a missing element of the target type.
    pub fn cast(&self, ty: ColumnType) -> Element {
        if self.column_type() == ty {
            return self.clone();
        }
        match (self, ty) {
            (Element::String(Some(s)), _) => Element::parse(s, ty),
            (Element::Int(Some(v)), ColumnType::Float) => Element::Float(Some(*v as f64)),
            (Element::Int(Some(v)), ColumnType::Bool) => Element::Bool(int_to_bool(*v)),
            (Element::Float(Some(v)), ColumnType::Int) => Element::Int(float_to_int(*v)),
            (Element::Float(Some(v)), ColumnType::Bool) => Element::Bool(if *v == 1.0 {
                Some(true)
            } else if *v == 0.0 {
                Some(false)
            } else {
                None
            }),
            (Element::Bool(Some(v)), ColumnType::Int) => Element::Int(Some(i64::from(*v))),
            (Element::Bool(Some(v)), ColumnType::Float) => {
                Element::Float(Some(if *v { 1.0 } else { 0.0 }))
            }
            (e, ColumnType::String) => Element::String(e.value().map(|v| v.to_string())),
            _ => Element::missing(ty),
        }
    }

    /// Numeric view used by statistics: booleans are 0/1, strings are
    /// parsed, missing is `NaN`.
    pub fn to_f64(&self) -> f64 {
        match self.cast(ColumnType::Float) {
            Element::Float(Some(v)) => v,
            _ => f64::NAN,
        }
    }

    /// Type two elements are compared in: the dominant of both types, so an
    /// int and a float compare as floats whichever side is which.
    fn common_type(&self, other: &Element) -> ColumnType {
        dominant_type([self.column_type(), other.column_type()]).unwrap_or(self.column_type())
    }

    /// Order two present elements in their common type.
    /// `None` if either side is (or converts to) missing.
    pub fn partial_order(&self, other: &Element) -> Option<Ordering> {
        let ty = self.common_type(other);
        match (self.cast(ty), other.cast(ty)) {
            (Element::Int(Some(a)), Element::Int(Some(b))) => Some(a.cmp(&b)),
            (Element::Float(Some(a)), Element::Float(Some(b))) => a.partial_cmp(&b),
            (Element::Bool(Some(a)), Element::Bool(Some(b))) => Some(a.cmp(&b)),
            (Element::String(Some(a)), Element::String(Some(b))) => Some(a.cmp(&b)),
            _ => None,
        }
    }

    /// Equality in the common type of both elements.
    /// Missing equals missing; missing never equals a present value.
    pub fn eq_value(&self, other: &Element) -> bool {
        let ty = self.common_type(other);
        self.cast(ty) == other.cast(ty)
    }

    pub fn less(&self, other: &Element) -> bool {
        self.partial_order(other) == Some(Ordering::Less)
    }

    pub fn less_eq(&self, other: &Element) -> bool {
        matches!(
            self.partial_order(other),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    pub fn greater(&self, other: &Element) -> bool {
        self.partial_order(other) == Some(Ordering::Greater)
    }

    pub fn greater_eq(&self, other: &Element) -> bool {
        matches!(
            self.partial_order(other),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("NaN"),
        }
    }
}

impl From<Value> for Element {
    fn from(v: Value) -> Self {
        match v {
            Value::Int(v) => Element::Int(Some(v)),
            Value::Float(v) => Element::float(v),
            Value::Bool(v) => Element::Bool(Some(v)),
            Value::String(v) => Element::String(Some(v)),
        }
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Element::Int(Some(v))
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Element::float(v)
    }
}

impl From<bool> for Element {
    fn from(v: bool) -> Self {
        Element::Bool(Some(v))
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Element::String(Some(v.to_string()))
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Element::String(Some(v))
    }
}

pub(crate) fn non_nan(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

fn parse_int(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}

// Only integral floats inside the i64 range convert
fn float_to_int(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

fn int_to_bool(v: i64) -> Option<bool> {
    match v {
        1 => Some(true),
        0 => Some(false),
        _ => None,
    }
}
