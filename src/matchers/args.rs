//! Typed access to matcher arguments.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::config::StringMatchMode;
use crate::errors::{ExpectError, ExpectResult};
use crate::format::{format_number, stringify};
use crate::registry::MatcherContext;
use crate::value::Value;

/// A number or bigint operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Float(f64),
    Big(i128),
}

impl Numeric {
    pub fn from_value(value: &Value) -> Option<Numeric> {
        match value {
            Value::Number(n) => Some(Numeric::Float(*n)),
            Value::BigInt(n) => Some(Numeric::Big(*n)),
            _ => None,
        }
    }

    /// `None` when either side is NaN.
    pub fn compare(self, other: Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Big(a), Numeric::Big(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Numeric::Float(n) => n,
            Numeric::Big(n) => n as f64,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Float(n) => f.write_str(&format_number(*n)),
            Numeric::Big(n) => write!(f, "{}n", n),
        }
    }
}

/// A string expectation: substring or regex.
#[derive(Debug, Clone)]
pub enum TextPattern {
    Substring(String),
    Regex(Regex),
}

impl TextPattern {
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TextPattern::Substring(needle) => text.contains(needle.as_str()),
            TextPattern::Regex(regex) => regex.is_match(text),
        }
    }

    /// `substring` or `pattern`, for message labels.
    pub fn kind(&self) -> &'static str {
        match self {
            TextPattern::Substring(_) => "substring",
            TextPattern::Regex(_) => "pattern",
        }
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPattern::Substring(needle) => write!(f, "\"{}\"", needle),
            TextPattern::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Matcher arguments with call-time validation.
pub struct Args<'a> {
    matcher: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(ctx: &'a MatcherContext, values: &'a [Value]) -> Self {
        Self {
            matcher: &ctx.name,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `index`, treating `undefined` as absent.
    pub fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_undefined())
    }

    /// The argument at `index`, `undefined` if missing.
    pub fn value(&self, index: usize) -> Value {
        self.values.get(index).cloned().unwrap_or(Value::Undefined)
    }

    /// Arguments from `index` on.
    pub fn rest(&self, index: usize) -> &'a [Value] {
        self.values.get(index..).unwrap_or(&[])
    }

    pub fn invalid(&self, message: impl Into<String>) -> ExpectError {
        ExpectError::invalid_argument(self.matcher, message)
    }

    pub fn numeric(&self, index: usize) -> ExpectResult<Numeric> {
        let value = self.value(index);
        Numeric::from_value(&value).ok_or_else(|| {
            self.invalid(format!(
                "expected value must be a number or bigint\n\nExpected: {}",
                stringify(&value)
            ))
        })
    }

    pub fn number(&self, index: usize) -> ExpectResult<f64> {
        match self.value(index) {
            Value::Number(n) => Ok(n),
            other => Err(self.invalid(format!(
                "expected value must be a number\n\nExpected: {}",
                stringify(&other)
            ))),
        }
    }

    /// A non-negative integer.
    pub fn count(&self, index: usize) -> ExpectResult<usize> {
        match self.value(index) {
            Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as usize),
            other => Err(self.invalid(format!(
                "expected value must be a non-negative integer\n\nExpected: {}",
                stringify(&other)
            ))),
        }
    }

    pub fn optional_count(&self, index: usize) -> ExpectResult<Option<usize>> {
        match self.get(index) {
            Some(_) => self.count(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn string(&self, index: usize) -> ExpectResult<&'a str> {
        match self.values.get(index) {
            Some(Value::String(s)) => Ok(s.as_str()),
            other => Err(self.invalid(format!(
                "expected value must be a string\n\nExpected: {}",
                stringify(other.unwrap_or(&Value::Undefined))
            ))),
        }
    }

    pub fn optional_string(&self, index: usize) -> ExpectResult<Option<&'a str>> {
        match self.get(index) {
            Some(_) => self.string(index).map(Some),
            None => Ok(None),
        }
    }

    /// A string or regex argument. Strings are substrings in literal mode
    /// and regexes in pattern mode.
    pub fn pattern(&self, index: usize, mode: StringMatchMode) -> ExpectResult<TextPattern> {
        match self.values.get(index) {
            Some(Value::Regex(regex)) => Ok(TextPattern::Regex(regex.as_ref().clone())),
            Some(Value::String(s)) => match mode {
                StringMatchMode::Literal => Ok(TextPattern::Substring(s.clone())),
                StringMatchMode::Pattern => Regex::new(s)
                    .map(TextPattern::Regex)
                    .map_err(|e| self.invalid(format!("invalid pattern {}: {}", s, e))),
            },
            other => Err(self.invalid(format!(
                "expected value must be a string or regular expression\n\nExpected: {}",
                stringify(other.unwrap_or(&Value::Undefined))
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::AsyncMode;
    use crate::state::MatcherState;
    use std::panic::Location;

    fn context() -> MatcherContext {
        MatcherContext {
            name: "checked".to_string(),
            is_not: false,
            promise: AsyncMode::None,
            state: MatcherState::default(),
            location: Location::caller(),
        }
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(Numeric::Big(2).compare(Numeric::Big(3)), Some(Ordering::Less));
        assert_eq!(Numeric::Float(2.5).compare(Numeric::Big(2)), Some(Ordering::Greater));
        assert_eq!(Numeric::Float(f64::NAN).compare(Numeric::Float(1.0)), None);
    }

    #[test]
    fn test_typed_accessors() {
        let ctx = context();
        let values = vec![Value::from(3), Value::from("x"), Value::Undefined];
        let args = Args::new(&ctx, &values);
        assert_eq!(args.count(0).unwrap(), 3);
        assert_eq!(args.string(1).unwrap(), "x");
        assert!(args.get(2).is_none());
        assert_eq!(args.optional_string(2).unwrap(), None);
        assert!(matches!(args.string(0), Err(ExpectError::InvalidArgument { .. })));
        assert_eq!(args.rest(1).len(), 2);
        assert!(args.rest(5).is_empty());
    }

    #[test]
    fn test_pattern_modes() {
        let ctx = context();
        let values = vec![Value::from("a.c")];
        let args = Args::new(&ctx, &values);
        let literal = args.pattern(0, StringMatchMode::Literal).unwrap();
        assert!(!literal.is_match("abc"));
        assert!(literal.is_match("xa.cx"));
        let pattern = args.pattern(0, StringMatchMode::Pattern).unwrap();
        assert!(pattern.is_match("abc"));
    }
}
