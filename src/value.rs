//! Attribute values as they travel between the shell and the store.
//!
//! Items typed on the command line arrive as JSON objects. Only the shapes the
//! shell knows how to write are accepted: strings, numbers and arrays of one
//! or the other, which become sets.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// An item: attribute name to value, ordered by name for stable output.
pub type Item = BTreeMap<String, AttrValue>;

/// A primary key is an item holding only the key attributes.
pub type Key = Item;

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("item body must be a JSON object")]
    NotAnObject,
    #[error("attribute `{name}`: {reason}")]
    Unsupported { name: String, reason: &'static str },
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("binary key attributes cannot be typed on the command line")]
    BinaryKey,
    #[error("table `{0}` has a range key; pass both hash and range key")]
    MissingRangeKey(String),
    #[error("table `{0}` has no range key")]
    UnexpectedRangeKey(String),
}

/// Scalar type codes used in key schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarType {
    S,
    N,
    B,
}

impl ScalarType {
    /// Resolves a type token the way `create` reads it: case-insensitive,
    /// only the first letter counts.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.chars().next()?.to_ascii_uppercase() {
            'S' => Some(ScalarType::S),
            'N' => Some(ScalarType::N),
            'B' => Some(ScalarType::B),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ScalarType::S => "S",
            ScalarType::N => "N",
            ScalarType::B => "B",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    S(String),
    /// Numbers keep the decimal text the store uses on the wire.
    N(String),
    Ss(BTreeSet<String>),
    Ns(BTreeSet<String>),
    /// Anything else read back from the store, rendered for display only.
    Other(String),
}

impl AttrValue {
    pub fn from_json(name: &str, value: &Value) -> Result<Self, ValueError> {
        let unsupported = |reason| ValueError::Unsupported {
            name: name.to_string(),
            reason,
        };

        match value {
            Value::String(s) => Ok(AttrValue::S(s.clone())),
            Value::Number(n) => Ok(AttrValue::N(n.to_string())),
            Value::Array(elements) => {
                if elements.is_empty() {
                    return Err(unsupported("empty sets cannot be stored"));
                }
                if elements.iter().all(Value::is_string) {
                    let set = elements
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect();
                    Ok(AttrValue::Ss(set))
                } else if elements.iter().all(Value::is_number) {
                    let set = elements.iter().map(|e| e.to_string()).collect();
                    Ok(AttrValue::Ns(set))
                } else {
                    Err(unsupported("set elements must be all strings or all numbers"))
                }
            }
            Value::Bool(_) => Err(unsupported("booleans are not supported")),
            Value::Null => Err(unsupported("null is not supported")),
            Value::Object(_) => Err(unsupported("nested objects are not supported")),
        }
    }

    /// Builds a key value from a command-line token.
    pub fn from_key_arg(kind: ScalarType, raw: &str) -> Result<Self, ValueError> {
        match kind {
            ScalarType::S => Ok(AttrValue::S(raw.to_string())),
            ScalarType::N => {
                let trimmed = raw.trim();
                if trimmed.parse::<f64>().is_err() {
                    return Err(ValueError::NotANumber(raw.to_string()));
                }
                Ok(AttrValue::N(trimmed.to_string()))
            }
            ScalarType::B => Err(ValueError::BinaryKey),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AttrValue::S(s) | AttrValue::Other(s) => Value::String(s.clone()),
            AttrValue::N(n) => number_to_json(n),
            AttrValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
            AttrValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        }
    }
}

fn number_to_json(text: &str) -> Value {
    text.parse::<Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(text.to_string()))
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Parses an item body typed on the command line.
pub fn item_from_json(text: &str) -> Result<Item, ValueError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(map) => item_from_map(&map),
        _ => Err(ValueError::NotAnObject),
    }
}

pub fn item_from_map(map: &Map<String, Value>) -> Result<Item, ValueError> {
    map.iter()
        .map(|(name, value)| Ok((name.clone(), AttrValue::from_json(name, value)?)))
        .collect()
}

pub fn item_to_json(item: &Item) -> Value {
    Value::Object(
        item.iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}
