//! Structural equality.
//!
//! Three modes are exposed:
//!
//! - [`is_identical`]: `toBe`. Primitives by value, references by identity.
//! - [`equals`]: `toEqual`. Recursive, ignores keys holding `undefined` and
//!   record class names.
//! - [`strict_equals`]: `toStrictEqual`. Recursive, exact key sets and class
//!   names.
//!
//! All recursive modes substitute asymmetric matchers found on either side
//! and terminate on cyclic graphs: a pair of references already being
//! compared further up the walk is treated as equal.

use std::collections::{BTreeMap, HashSet};

use crate::value::{Record, Value};

/// `toEqual`.
pub fn equals(a: &Value, b: &Value) -> bool {
    Equality::new(false).eq(a, b)
}

/// `toStrictEqual`.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    Equality::new(true).eq(a, b)
}

/// `toBe`. NaN is identical to NaN and the two zeros are identical.
pub fn is_identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(*x, *y),
        (Value::BigInt(x), Value::BigInt(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        _ => a.same_ref(b),
    }
}

/// `toMatchObject`: every key of `subset` must be present in `object` with a
/// recursively matching value. Arrays must match element-wise.
pub fn subset_equals(object: &Value, subset: &Value) -> bool {
    Equality::new(false).subset(object, subset)
}

/// Whether any item deep-equals `needle`.
pub fn contains_equal(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| equals(item, needle))
}

/// Whether any item is identical to `needle`.
pub fn contains_identical(items: &[Value], needle: &Value) -> bool {
    items.iter().any(|item| is_identical(item, needle))
}

fn numbers_equal(x: f64, y: f64) -> bool {
    (x.is_nan() && y.is_nan()) || x == y
}

struct Equality {
    strict: bool,
    /// Reference pairs on the current descent path.
    active: HashSet<(usize, usize)>,
}

impl Equality {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            active: HashSet::new(),
        }
    }

    fn eq(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Asymmetric(_), Value::Asymmetric(_)) => return a.same_ref(b),
            (Value::Asymmetric(matcher), other) | (other, Value::Asymmetric(matcher)) => {
                return matcher.asymmetric_match(other)
            }
            _ => {}
        }

        if a.ref_addr().is_none() || b.ref_addr().is_none() {
            return is_identical(a, b);
        }
        if a.same_ref(b) {
            return true;
        }
        self.guarded(a, b, |this| this.eq_refs(a, b))
    }

    /// Run `compare` with the pair marked active; an already-active pair is
    /// a cycle and compares equal.
    fn guarded(&mut self, a: &Value, b: &Value, compare: impl FnOnce(&mut Self) -> bool) -> bool {
        let key = match (a.ref_addr(), b.ref_addr()) {
            (Some(x), Some(y)) => (x, y),
            _ => return compare(self),
        };
        if !self.active.insert(key) {
            return true;
        }
        let result = compare(self);
        self.active.remove(&key);
        result
    }

    fn eq_refs(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Array(x), Value::Array(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| self.eq(l, r))
            }
            (Value::Object(x), Value::Object(y)) => self.eq_records(&x.borrow(), &y.borrow()),
            (Value::Map(x), Value::Map(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len()
                    && x.iter().all(|(key, value)| {
                        y.iter().any(|(other_key, other_value)| {
                            self.eq(key, other_key) && self.eq(value, other_value)
                        })
                    })
            }
            (Value::Set(x), Value::Set(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().all(|item| y.iter().any(|other| self.eq(item, other)))
            }
            (Value::Error(x), Value::Error(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.message == y.message && (!self.strict || x.name == y.name)
            }
            (Value::Regex(x), Value::Regex(y)) => x.as_str() == y.as_str(),
            // Functions and promises only equal themselves.
            _ => false,
        }
    }

    fn eq_records(&mut self, x: &Record, y: &Record) -> bool {
        if self.strict {
            return x.class == y.class
                && x.fields.len() == y.fields.len()
                && x.fields.iter().all(|(key, value)| {
                    y.fields.get(key).map_or(false, |other| self.eq(value, other))
                });
        }
        let left = defined_fields(&x.fields);
        let right = defined_fields(&y.fields);
        left.len() == right.len()
            && left.iter().all(|(key, value)| {
                right
                    .iter()
                    .find(|(other_key, _)| other_key == key)
                    .map_or(false, |(_, other)| self.eq(value, other))
            })
    }

    fn subset(&mut self, object: &Value, subset: &Value) -> bool {
        match (object, subset) {
            (_, Value::Asymmetric(matcher)) => matcher.asymmetric_match(object),
            (Value::Object(_), Value::Object(expected)) | (Value::Error(_), Value::Object(expected)) => {
                if object.same_ref(subset) {
                    return true;
                }
                self.guarded(object, subset, |this| {
                    expected.borrow().fields.iter().all(|(key, value)| {
                        object
                            .property(key)
                            .map_or(false, |actual| this.subset(&actual, value))
                    })
                })
            }
            (Value::Array(actual), Value::Array(expected)) => {
                if object.same_ref(subset) {
                    return true;
                }
                self.guarded(object, subset, |this| {
                    let (actual, expected) = (actual.borrow(), expected.borrow());
                    actual.len() == expected.len()
                        && actual.iter().zip(expected.iter()).all(|(l, r)| this.subset(l, r))
                })
            }
            _ => self.eq(object, subset),
        }
    }
}

fn defined_fields(fields: &BTreeMap<String, Value>) -> Vec<(&String, &Value)> {
    fields.iter().filter(|(_, value)| !value.is_undefined()).collect()
}
