//! Equality-family matchers.

use crate::equality::{contains_equal, contains_identical, equals, is_identical, strict_equals, subset_equals};
use crate::errors::ExpectResult;
use crate::format::message::{diff_or_values, LabelPrinter};
use crate::format::stringify;
use crate::registry::{MatcherContext, MatcherResult};
use crate::value::Value;

use super::args::Args;

pub fn to_be(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).value(0);
    let pass = is_identical(received, &expected);
    let deep_equal = !pass && strict_equals(received, &expected);
    let is_not = ctx.is_not;
    let (shown_expected, shown_received) = (expected.clone(), received.clone());
    Ok(MatcherResult::new(pass, move || {
        let mut message = diff_or_values(&shown_expected, &shown_received, is_not);
        if deep_equal && !is_not {
            message.push_str("\n\nIf it should pass with deep equality, replace \"toBe\" with \"toStrictEqual\"");
        }
        message
    })
    .with_actual(received.clone())
    .with_expected(expected))
}

pub fn to_equal(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).value(0);
    let pass = equals(received, &expected);
    Ok(deep_result(ctx, pass, received, expected))
}

pub fn to_strict_equal(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).value(0);
    let pass = strict_equals(received, &expected);
    Ok(deep_result(ctx, pass, received, expected))
}

pub fn to_match_object(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let expected = args.value(0);
    if !is_object_like(received) {
        return Err(args.invalid(format!(
            "received value must be a non-null object\n\nReceived: {}",
            stringify(received)
        )));
    }
    if !is_object_like(&expected) {
        return Err(args.invalid(format!(
            "expected value must be a non-null object\n\nExpected: {}",
            stringify(&expected)
        )));
    }
    let pass = subset_equals(received, &expected);
    Ok(deep_result(ctx, pass, received, expected))
}

fn is_object_like(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Error(_))
}

fn deep_result(ctx: &MatcherContext, pass: bool, received: &Value, expected: Value) -> MatcherResult {
    let is_not = ctx.is_not;
    let (shown_expected, shown_received) = (expected.clone(), received.clone());
    MatcherResult::new(pass, move || diff_or_values(&shown_expected, &shown_received, is_not))
        .with_actual(received.clone())
        .with_expected(expected)
}

pub fn to_contain(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let item = args.value(0);
    let pass = match received {
        Value::String(haystack) => match &item {
            Value::String(needle) => haystack.contains(needle.as_str()),
            other => {
                return Err(args.invalid(format!(
                    "expected value must be a string if received value is a string\n\nExpected: {}",
                    stringify(other)
                )))
            }
        },
        Value::Array(items) | Value::Set(items) => contains_identical(&items.borrow(), &item),
        other => {
            return Err(args.invalid(format!(
                "received value must be a string or a collection\n\nReceived: {}",
                stringify(other)
            )))
        }
    };
    Ok(containment_result(ctx, pass, received, item))
}

pub fn to_contain_equal(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let item = args.value(0);
    let pass = match received {
        Value::Array(items) | Value::Set(items) => contains_equal(&items.borrow(), &item),
        other => {
            return Err(args.invalid(format!(
                "received value must be a collection\n\nReceived: {}",
                stringify(other)
            )))
        }
    };
    Ok(containment_result(ctx, pass, received, item))
}

fn containment_result(ctx: &MatcherContext, pass: bool, received: &Value, item: Value) -> MatcherResult {
    let not = if ctx.is_not { "not " } else { "" };
    let received_label = match received {
        Value::String(_) => "Received string",
        _ => "Received value",
    };
    let expected_line = format!("{}{}", not, stringify(&item));
    let received_line = stringify(received);
    MatcherResult::new(pass, move || {
        let labels = LabelPrinter::new(&["Expected value", received_label]);
        format!(
            "{}\n{}",
            labels.line("Expected value", &expected_line),
            labels.line(received_label, &received_line)
        )
    })
}

/// Split `a.b[0].c` into `["a", "b", "0", "c"]`.
pub fn parse_path(path: &str) -> Vec<String> {
    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn path_segments(args: &Args<'_>, path: &Value) -> ExpectResult<Vec<String>> {
    let segments = match path {
        Value::String(s) => parse_path(s),
        Value::Array(items) => items
            .borrow()
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(format!("{}", *n as usize)),
                other => Err(args.invalid(format!("path segments must be strings or indices, got {}", stringify(other)))),
            })
            .collect::<ExpectResult<Vec<_>>>()?,
        other => {
            return Err(args.invalid(format!(
                "expected path must be a string or array\n\nExpected path: {}",
                stringify(other)
            )))
        }
    };
    if segments.is_empty() {
        return Err(args.invalid("expected path must not be empty"));
    }
    Ok(segments)
}

/// Follow `segments` from `value`; `None` at the first missing key.
pub fn resolve_path(value: &Value, segments: &[String]) -> Option<Value> {
    let mut current = value.clone();
    for segment in segments {
        current = current.property(segment)?;
    }
    Some(current)
}

pub fn to_have_property(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let path = args.value(0);
    if received.is_nullish() {
        return Err(args.invalid(format!(
            "received value must not be null nor undefined\n\nReceived: {}",
            stringify(received)
        )));
    }
    let segments = path_segments(&args, &path)?;

    // A literal key containing dots wins over the dotted path.
    let resolved = match &path {
        Value::String(key) => received.property(key).or_else(|| resolve_path(received, &segments)),
        _ => resolve_path(received, &segments),
    };
    let has_value = args.len() > 1;
    let expected = args.value(1);
    let pass = match &resolved {
        Some(found) if has_value => equals(found, &expected),
        Some(_) => true,
        None => false,
    };

    let shown_path = stringify(&path);
    let is_not = ctx.is_not;
    let message = move || match (&resolved, has_value) {
        (None, _) => format!("Expected path: {}\nUnable to find property", shown_path),
        (Some(found), true) => format!(
            "Expected path: {}\n\n{}",
            shown_path,
            diff_or_values(&expected, found, is_not)
        ),
        (Some(found), false) => format!("Expected path: {}\nReceived value: {}", shown_path, stringify(found)),
    };
    Ok(MatcherResult::new(pass, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymmetric::{any, object_containing};
    use crate::{expect, ExpectError};
    use serde_json::json;

    #[test]
    fn test_to_be_and_to_equal() {
        let original = Value::from(json!({"a": [1, 2]}));
        let copy = original.deep_clone();
        expect(&original).to_equal(&copy).unwrap();
        expect(&original).to_be(&original).unwrap();
        expect(&original).not().to_be(&copy).unwrap();
        expect(f64::NAN).to_be(f64::NAN).unwrap();
    }

    #[test]
    fn test_to_be_suggests_deep_equality() {
        let error = expect(json!({"a": 1})).to_be(json!({"a": 1})).unwrap_err();
        assert!(error.to_string().contains("replace \"toBe\" with \"toStrictEqual\""));
    }

    #[test]
    fn test_to_equal_with_object_containing() {
        let template = Value::array(vec![Value::from(1), object_containing(json!({"b": 2}))]);
        expect(json!([1, {"b": 2}])).to_equal(template).unwrap();
    }

    #[test]
    fn test_to_strict_equal_checks_undefined_keys() {
        let received = Value::object(vec![("a", Value::from(1)), ("b", Value::Undefined)]);
        expect(&received).to_equal(json!({"a": 1})).unwrap();
        expect(&received).not().to_strict_equal(json!({"a": 1})).unwrap();
    }

    #[test]
    fn test_to_match_object() {
        let received = json!({"id": 3, "tags": ["x"], "meta": {"v": 1, "w": 2}});
        expect(received.clone())
            .to_match_object(Value::object(vec![("id", any("Number")), ("meta", Value::from(json!({"v": 1})))]))
            .unwrap();
        expect(received).not().to_match_object(json!({"tags": []})).unwrap();
        assert!(matches!(
            expect(1).to_match_object(json!({})),
            Err(ExpectError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_to_contain() {
        expect(json!([1, 2, 3])).to_contain(2).unwrap();
        expect("hello").to_contain("ell").unwrap();
        expect(json!([{"a": 1}])).not().to_contain(json!({"a": 1})).unwrap();
        expect(json!([{"a": 1}])).to_contain_equal(json!({"a": 1})).unwrap();
        expect(Value::set(vec![Value::from("x")])).to_contain("x").unwrap();
        assert!(matches!(expect(5).to_contain(5), Err(ExpectError::InvalidArgument { .. })));
    }

    #[test]
    fn test_parse_path() {
        assert_eq!(parse_path("a.b[0].c"), vec!["a", "b", "0", "c"]);
        assert_eq!(parse_path("[1]"), vec!["1"]);
    }

    #[test]
    fn test_to_have_property() {
        let received = json!({"a": {"b": [10, {"c": null}]}, "x.y": 1});
        expect(received.clone()).to_have_property("a.b[1].c").unwrap();
        expect(received.clone()).to_have_property_value("a.b[0]", 10).unwrap();
        expect(received.clone())
            .to_have_property_value(Value::array(vec!["a".into(), "b".into(), 0.into()]), 10)
            .unwrap();
        expect(received.clone()).to_have_property("x.y").unwrap();
        expect(received.clone()).not().to_have_property("a.z").unwrap();
        expect(received).not().to_have_property_value("a.b[0]", 11).unwrap();
    }

    #[test]
    fn test_to_have_property_undefined_value() {
        let received = Value::object(vec![("a", Value::Undefined)]);
        expect(&received).to_have_property("a").unwrap();
        expect(&received).to_have_property_value("a", Value::Undefined).unwrap();
        assert!(expect(json!({})).to_have_property("").is_err());
    }
}
