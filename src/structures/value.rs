// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of the `Value` enum representing a single value read from a LAMMPS file.

use std::cmp::Ordering;
use std::fmt::Display;

/// Single value parsed from a whitespace-separated token of a LAMMPS file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Parse a token as an integer. If this is not possible, parse it as a float.
    /// If even that fails, keep the token as a string.
    ///
    /// ## Example
    /// ```
    /// # use lammps_rs::prelude::*;
    /// #
    /// assert_eq!(Value::parse("12"), Value::Int(12));
    /// assert_eq!(Value::parse("1.5e2"), Value::Float(150.0));
    /// assert_eq!(Value::parse("C1"), Value::Str(String::from("C1")));
    /// ```
    pub fn parse(token: &str) -> Value {
        Value::parse_numeric(token).unwrap_or_else(|| Value::Str(token.to_owned()))
    }

    /// Parse a token as an integer or as a float.
    /// Returns `None` if the token is not a number.
    pub fn parse_numeric(token: &str) -> Option<Value> {
        if let Ok(x) = token.parse::<i64>() {
            return Some(Value::Int(x));
        }

        token.parse::<f64>().ok().map(Value::Float)
    }

    /// Get the value as a float. Integers are converted. Returns `None` for strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(x) => Some(*x as f64),
            Value::Float(x) => Some(*x),
            Value::Str(_) => None,
        }
    }

    /// Get the value as an integer. Returns `None` for floats and strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(x) => Some(*x),
            _ => None,
        }
    }

    /// Get the value as a string slice. Returns `None` for numbers.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(x) => Some(x),
            _ => None,
        }
    }

    /// Returns `true` if the value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Str(_))
    }

    /// Total ordering of values.
    /// Numbers are compared numerically and are always ordered before strings.
    /// Strings are compared lexicographically.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Str(_), _) => Ordering::Greater,
            (_, Value::Str(_)) => Ordering::Less,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Ordering::Equal,
            },
        }
    }
}

impl Display for Value {
    /// Floats are always written with a decimal point or an exponent
    /// so that they are parsed back as floats.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{}", x),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int() {
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("-7"), Value::Int(-7));
    }

    #[test]
    fn parse_float() {
        assert_eq!(Value::parse("4.2"), Value::Float(4.2));
        assert_eq!(Value::parse("-1e-3"), Value::Float(-0.001));
        assert_eq!(Value::parse("1.0"), Value::Float(1.0));
    }

    #[test]
    fn parse_string() {
        assert_eq!(Value::parse("harmonic"), Value::Str(String::from("harmonic")));
        assert_eq!(Value::parse_numeric("harmonic"), None);
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::from("x").as_f64(), None);
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::Float(3.0).as_i64(), None);
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::Float(1.0).is_numeric());
        assert!(!Value::from("x").is_numeric());
    }

    #[test]
    fn ordering() {
        assert_eq!(Value::Int(1).total_cmp(&Value::Int(2)), Ordering::Less);
        assert_eq!(Value::Float(2.5).total_cmp(&Value::Int(2)), Ordering::Greater);
        assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.0)), Ordering::Equal);
        assert_eq!(Value::Int(100).total_cmp(&Value::from("a")), Ordering::Less);
        assert_eq!(Value::from("b").total_cmp(&Value::from("a")), Ordering::Greater);
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::from("CT").to_string(), "CT");

        // floats are parsed back as floats
        assert_eq!(Value::parse(&Value::Float(5.0).to_string()), Value::Float(5.0));
    }
}
