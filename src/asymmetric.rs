//! Asymmetric (wildcard) matchers.
//!
//! An asymmetric matcher is a [`Value::Asymmetric`] node that can be placed
//! anywhere inside an expected template. When structural equality reaches
//! such a node it asks the node to test the received value instead of
//! recursing.
//!
//! ```
//! use layered_expect::{asymmetric::object_containing, equality::equals, Value};
//! use serde_json::json;
//!
//! let expected = Value::array(vec![
//!     Value::from(1),
//!     object_containing(json!({"b": 2})),
//! ]);
//! let received = Value::from(json!([1, {"b": 2, "c": 3}]));
//! assert!(equals(&received, &expected));
//! ```

use regex::Regex;

use crate::equality::equals;
use crate::value::Value;

/// A predicate node usable inside expected templates.
///
/// Implementations must be immutable once constructed.
pub trait AsymmetricMatcher {
    /// Test a received value against this node.
    fn asymmetric_match(&self, other: &Value) -> bool;

    /// Display name, e.g. `ObjectContaining` or `Any<Number>`.
    fn name(&self) -> String;

    /// Sample printed after the name, if any.
    fn sample(&self) -> Option<Value> {
        None
    }
}

/// Matches anything except `undefined` and `null`.
pub fn anything() -> Value {
    Value::asymmetric(Anything)
}

/// Matches values of the given runtime type or class name.
///
/// Recognised names: `Number`, `String`, `Boolean`, `BigInt`, `Function`,
/// `Array`, `Map`, `Set`, `Error`, `RegExp`, `Promise`, `Object`; any other
/// name is matched against record class names and error names.
pub fn any(type_name: impl Into<String>) -> Value {
    Value::asymmetric(Any {
        expected: type_name.into(),
    })
}

/// Matches records whose named keys deep-equal the sample's entries.
///
/// A non-record sample never matches.
pub fn object_containing(sample: impl Into<Value>) -> Value {
    Value::asymmetric(ObjectContaining {
        sample: sample.into(),
        inverse: false,
    })
}

/// Matches arrays that contain every sample item, each item consuming a
/// distinct element.
pub fn array_containing(sample: impl Into<Value>) -> Value {
    Value::asymmetric(ArrayContaining::new(sample.into(), false))
}

/// Matches strings containing `sample`.
pub fn string_containing(sample: impl Into<String>) -> Value {
    Value::asymmetric(StringContaining {
        sample: sample.into(),
        inverse: false,
    })
}

/// Matches strings against a pattern.
///
/// Accepts a `Value::Regex` or a pattern string; a string that does not
/// compile as a regex is matched literally.
pub fn string_matching(pattern: impl Into<Value>) -> Value {
    Value::asymmetric(StringMatching {
        regex: pattern_regex(&pattern.into()),
        inverse: false,
    })
}

/// Inverse asymmetric matchers (`expect.not.*`).
pub mod not {
    use super::*;

    pub fn object_containing(sample: impl Into<Value>) -> Value {
        Value::asymmetric(ObjectContaining {
            sample: sample.into(),
            inverse: true,
        })
    }

    pub fn array_containing(sample: impl Into<Value>) -> Value {
        Value::asymmetric(ArrayContaining::new(sample.into(), true))
    }

    pub fn string_containing(sample: impl Into<String>) -> Value {
        Value::asymmetric(StringContaining {
            sample: sample.into(),
            inverse: true,
        })
    }

    pub fn string_matching(pattern: impl Into<Value>) -> Value {
        Value::asymmetric(StringMatching {
            regex: pattern_regex(&pattern.into()),
            inverse: true,
        })
    }
}

/// `None` only when even the escaped pattern exceeds the regex size limit;
/// such a matcher never matches.
fn pattern_regex(pattern: &Value) -> Option<Regex> {
    match pattern {
        Value::Regex(re) => Some(re.as_ref().clone()),
        other => {
            let source = other.to_string();
            Regex::new(&source)
                .or_else(|_| Regex::new(&regex::escape(&source)))
                .ok()
        }
    }
}

struct Anything;

impl AsymmetricMatcher for Anything {
    fn asymmetric_match(&self, other: &Value) -> bool {
        !other.is_nullish()
    }

    fn name(&self) -> String {
        "Anything".to_string()
    }
}

struct Any {
    expected: String,
}

impl AsymmetricMatcher for Any {
    fn asymmetric_match(&self, other: &Value) -> bool {
        match self.expected.as_str() {
            "Number" => matches!(other, Value::Number(_)),
            "String" => matches!(other, Value::String(_)),
            "Boolean" => matches!(other, Value::Bool(_)),
            "BigInt" => matches!(other, Value::BigInt(_)),
            "Function" => matches!(other, Value::Function(_)),
            "Array" => matches!(other, Value::Array(_)),
            "Map" => matches!(other, Value::Map(_)),
            "Set" => matches!(other, Value::Set(_)),
            "Error" => matches!(other, Value::Error(_)),
            "RegExp" => matches!(other, Value::Regex(_)),
            "Promise" => matches!(other, Value::Promise(_)),
            "Object" => other.type_of() == "object" && !matches!(other, Value::Null),
            class => match other {
                Value::Object(record) => record.borrow().class.as_deref() == Some(class),
                Value::Error(error) => error.borrow().name == class,
                _ => false,
            },
        }
    }

    fn name(&self) -> String {
        format!("Any<{}>", self.expected)
    }
}

struct ObjectContaining {
    sample: Value,
    inverse: bool,
}

impl AsymmetricMatcher for ObjectContaining {
    fn asymmetric_match(&self, other: &Value) -> bool {
        let matched = match &self.sample {
            Value::Object(sample) => {
                other.type_of() == "object"
                    && !other.is_nullish()
                    && sample.borrow().fields.iter().all(|(key, expected)| {
                        other
                            .property(key)
                            .map_or(false, |actual| equals(&actual, expected))
                    })
            }
            _ => false,
        };
        matched != self.inverse
    }

    fn name(&self) -> String {
        if self.inverse {
            "ObjectNotContaining".to_string()
        } else {
            "ObjectContaining".to_string()
        }
    }

    fn sample(&self) -> Option<Value> {
        Some(self.sample.clone())
    }
}

struct ArrayContaining {
    sample: Value,
    items: Vec<Value>,
    inverse: bool,
}

impl ArrayContaining {
    fn new(sample: Value, inverse: bool) -> Self {
        let items = match &sample {
            Value::Array(items) => items.borrow().clone(),
            _ => Vec::new(),
        };
        Self {
            sample,
            items,
            inverse,
        }
    }
}

impl AsymmetricMatcher for ArrayContaining {
    fn asymmetric_match(&self, other: &Value) -> bool {
        let matched = matches!(self.sample, Value::Array(_))
            && match other {
                Value::Array(received) => contains_each(&received.borrow(), &self.items),
                _ => false,
            };
        matched != self.inverse
    }

    fn name(&self) -> String {
        if self.inverse {
            "ArrayNotContaining".to_string()
        } else {
            "ArrayContaining".to_string()
        }
    }

    fn sample(&self) -> Option<Value> {
        Some(self.sample.clone())
    }
}

/// Whether every expected item can be paired with a distinct, deep-equal
/// received element (bipartite matching by augmenting paths).
fn contains_each(received: &[Value], expected: &[Value]) -> bool {
    if expected.len() > received.len() {
        return false;
    }
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|item| {
            received
                .iter()
                .enumerate()
                .filter(|(_, actual)| equals(actual, item))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; received.len()];
    for item in 0..expected.len() {
        let mut visited = vec![false; received.len()];
        if !augment(item, &candidates, &mut owner, &mut visited) {
            return false;
        }
    }
    true
}

fn augment(
    item: usize,
    candidates: &[Vec<usize>],
    owner: &mut Vec<Option<usize>>,
    visited: &mut Vec<bool>,
) -> bool {
    for &slot in &candidates[item] {
        if visited[slot] {
            continue;
        }
        visited[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(other) => augment(other, candidates, owner, visited),
        };
        if free {
            owner[slot] = Some(item);
            return true;
        }
    }
    false
}

struct StringContaining {
    sample: String,
    inverse: bool,
}

impl AsymmetricMatcher for StringContaining {
    fn asymmetric_match(&self, other: &Value) -> bool {
        let matched = other.as_str().map_or(false, |s| s.contains(&self.sample));
        matched != self.inverse
    }

    fn name(&self) -> String {
        if self.inverse {
            "StringNotContaining".to_string()
        } else {
            "StringContaining".to_string()
        }
    }

    fn sample(&self) -> Option<Value> {
        Some(Value::String(self.sample.clone()))
    }
}

struct StringMatching {
    regex: Option<Regex>,
    inverse: bool,
}

impl AsymmetricMatcher for StringMatching {
    fn asymmetric_match(&self, other: &Value) -> bool {
        let matched = match (&self.regex, other.as_str()) {
            (Some(regex), Some(s)) => regex.is_match(s),
            _ => false,
        };
        matched != self.inverse
    }

    fn name(&self) -> String {
        if self.inverse {
            "StringNotMatching".to_string()
        } else {
            "StringMatching".to_string()
        }
    }

    fn sample(&self) -> Option<Value> {
        self.regex.clone().map(Value::from)
    }
}
