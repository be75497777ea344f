//! Array element identity.
//!
//! When two arrays are diffed, elements are paired by an identity derived
//! from the element itself rather than by position. The identity of an
//! object element is the first truthy field from an ordered list of
//! candidate fields; scalar elements are identified by their value; an
//! object with none of the candidate fields falls back to its index.
//!
//! Numbers are compared by value, so `1` and `1.0` give the same identity.

use std::fmt;

use meta_diff_json_equal::is_truthy;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::normalize::canonicalize;

/// Integers up to this magnitude are exact in f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Candidate identity fields used when nothing else is configured.
pub const DEFAULT_IDENTITY_FIELDS: [&str; 5] = ["name", "level", "type", "source", "value"];

/// Identity of one array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementIdentity {
    /// An object element identified by one of its fields.
    Field { field: String, value: String },
    /// A non-object element, identified by its canonical JSON text.
    Scalar(String),
    /// An object element without any identity field.
    Index(usize),
}

impl fmt::Display for ElementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementIdentity::Field { field, value } => write!(f, "{field}={value}"),
            ElementIdentity::Scalar(text) => f.write_str(text),
            ElementIdentity::Index(index) => write!(f, "$$index:{index}"),
        }
    }
}

impl Serialize for ElementIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ordered list of candidate identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPolicy {
    fields: Vec<String>,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTITY_FIELDS)
    }
}

impl IdentityPolicy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Derives the identity of `element`, found at `index` in its array.
    pub fn identify(&self, element: &Value, index: usize) -> ElementIdentity {
        let Value::Object(map) = element else {
            return ElementIdentity::Scalar(identity_text(element));
        };
        for field in &self.fields {
            match map.get(field) {
                Some(value) if is_truthy(value) => {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => identity_text(other),
                    };
                    return ElementIdentity::Field {
                        field: field.clone(),
                        value,
                    };
                }
                _ => {}
            }
        }
        ElementIdentity::Index(index)
    }
}

/// Canonical JSON text with integral floats written as integers.
fn identity_text(value: &Value) -> String {
    integral_numbers(canonicalize(value)).to_string()
}

fn integral_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(integral_number(&n).unwrap_or(n)),
        Value::Array(items) => Value::Array(items.into_iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, child)| (key, integral_numbers(child)))
                .collect(),
        ),
        other => other,
    }
}

fn integral_number(n: &Number) -> Option<Number> {
    let f = n.as_f64().filter(|_| n.is_f64())?;
    (f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER).then(|| Number::from(f as i64))
}
