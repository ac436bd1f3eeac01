//! Core value types for the typed store.

use crate::color::Color;
use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used by the textual form of array values.
pub const ARRAY_SEPARATOR: char = ';';

/// The five kinds of value a key can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Text,
    Color,
    IntegerArray,
    ColorArray,
}

impl ValueKind {
    pub const ALL: [ValueKind; 5] = [
        ValueKind::Integer,
        ValueKind::Text,
        ValueKind::Color,
        ValueKind::IntegerArray,
        ValueKind::ColorArray,
    ];

    /// Parse the textual exchange form of a value of this kind.
    ///
    /// Scalars fail outright on bad input. Array elements that fail to parse
    /// are skipped and handed back in [`Parsed::rejected`] so the caller can
    /// report them without losing the rest of the array.
    pub fn parse(self, text: &str) -> Result<Parsed> {
        let parsed = match self {
            ValueKind::Integer => Parsed::clean(Value::Integer(parse_integer(text)?)),
            ValueKind::Text => Parsed::clean(Value::Text(text.to_string())),
            ValueKind::Color => Parsed::clean(Value::Color(Color::parse(text)?)),
            ValueKind::IntegerArray => {
                let (values, rejected) = parse_elements(text, parse_integer);
                Parsed {
                    value: Value::IntegerArray(values),
                    rejected,
                }
            }
            ValueKind::ColorArray => {
                let (values, rejected) = parse_elements(text, Color::parse);
                Parsed {
                    value: Value::ColorArray(values),
                    rejected,
                }
            }
        };
        Ok(parsed)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "Integer",
            ValueKind::Text => "Text",
            ValueKind::Color => "Color",
            ValueKind::IntegerArray => "IntegerArray",
            ValueKind::ColorArray => "ColorArray",
        };
        f.write_str(name)
    }
}

fn parse_integer(text: &str) -> Result<i32> {
    text.parse()
        .map_err(|_| StoreError::InvalidInteger(text.to_string()))
}

fn parse_elements<T>(text: &str, parse: impl Fn(&str) -> Result<T>) -> (Vec<T>, Vec<String>) {
    let mut values = Vec::new();
    let mut rejected = Vec::new();
    if text.is_empty() {
        return (values, rejected);
    }
    for element in text.split(ARRAY_SEPARATOR) {
        match parse(element) {
            Ok(value) => values.push(value),
            Err(_) => rejected.push(element.to_string()),
        }
    }
    (values, rejected)
}

/// Result of parsing a textual value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parsed {
    pub value: Value,
    /// Array elements that could not be parsed, in input order.
    pub rejected: Vec<String>,
}

impl Parsed {
    fn clean(value: Value) -> Self {
        Self {
            value,
            rejected: Vec::new(),
        }
    }
}

/// A value held under a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i32),
    Text(String),
    Color(Color),
    IntegerArray(Vec<i32>),
    ColorArray(Vec<Color>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Text(_) => ValueKind::Text,
            Value::Color(_) => ValueKind::Color,
            Value::IntegerArray(_) => ValueKind::IntegerArray,
            Value::ColorArray(_) => ValueKind::ColorArray,
        }
    }

    /// Fail with `InvalidType` unless this value is of `expected` kind.
    pub fn expect_kind(&self, key: &str, expected: ValueKind) -> Result<&Self> {
        let found = self.kind();
        if found == expected {
            Ok(self)
        } else {
            Err(StoreError::InvalidType {
                key: key.to_string(),
                expected,
                found,
            })
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_integer_array(&self) -> Option<&[i32]> {
        match self {
            Value::IntegerArray(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_color_array(&self) -> Option<&[Color]> {
        match self {
            Value::ColorArray(values) => Some(values),
            _ => None,
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", ARRAY_SEPARATOR)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
            Value::Color(c) => write!(f, "{}", c),
            Value::IntegerArray(values) => write_joined(f, values),
            Value::ColorArray(values) => write_joined(f, values),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<Vec<i32>> for Value {
    fn from(values: Vec<i32>) -> Self {
        Value::IntegerArray(values)
    }
}

impl From<Vec<Color>> for Value {
    fn from(values: Vec<Color>) -> Self {
        Value::ColorArray(values)
    }
}
