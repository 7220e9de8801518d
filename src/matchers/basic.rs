//! Type, truthiness, numeric and string matchers.

use std::cmp::Ordering;

use crate::errors::{ExpectError, ExpectResult};
use crate::format::message::LabelPrinter;
use crate::format::stringify;
use crate::registry::{MatcherContext, MatcherResult};
use crate::value::Value;

use super::args::{Args, Numeric};

fn received_only(pass: bool, received: &Value) -> MatcherResult {
    let shown = stringify(received);
    MatcherResult::new(pass, move || format!("Received: {}", shown))
}

pub fn to_be_truthy(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    Ok(received_only(received.is_truthy(), received))
}

pub fn to_be_falsy(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    Ok(received_only(!received.is_truthy(), received))
}

pub fn to_be_null(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    Ok(received_only(matches!(received, Value::Null), received))
}

pub fn to_be_undefined(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    Ok(received_only(received.is_undefined(), received))
}

pub fn to_be_defined(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    Ok(received_only(!received.is_undefined(), received))
}

pub fn to_be_nan(_ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    let pass = matches!(received, Value::Number(n) if n.is_nan());
    Ok(received_only(pass, received))
}

const TYPE_NAMES: [&str; 8] = ["bigint", "boolean", "function", "number", "object", "string", "symbol", "undefined"];

pub fn to_be_type_of(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let expected = args.string(0)?;
    if !TYPE_NAMES.contains(&expected) {
        return Err(args.invalid(format!(
            "expected value must be one of {}\n\nExpected: \"{}\"",
            TYPE_NAMES.join(", "),
            expected
        )));
    }
    let actual = received.type_of();
    let pass = actual == expected;
    let expected = expected.to_string();
    Ok(MatcherResult::new(pass, move || {
        format!("Expected type: \"{}\"\nReceived type: \"{}\"", expected, actual)
    }))
}

/// Whether `received` is an instance of the named class.
///
/// Primitives are never instances. `Object` matches every reference value
/// and `Error` matches every error.
fn instance_of(received: &Value, class: &str) -> bool {
    if received.ref_addr().is_none() {
        return false;
    }
    match class {
        "Object" => !matches!(received, Value::Asymmetric(_)),
        "Error" => matches!(received, Value::Error(_)),
        _ => received.type_name() == class,
    }
}

pub fn to_be_instance_of(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let class = match args.value(0) {
        Value::String(name) => name,
        Value::Function(f) => f.name().to_string(),
        other => {
            return Err(args.invalid(format!(
                "expected value must be a class name\n\nExpected: {}",
                stringify(&other)
            )))
        }
    };
    let pass = instance_of(received, &class);
    let received_class = received.type_name();
    Ok(MatcherResult::new(pass, move || {
        format!("Expected constructor: {}\nReceived constructor: {}", class, received_class)
    }))
}

fn compare(
    ctx: &MatcherContext,
    received: &Value,
    args: &[Value],
    operator: &'static str,
    accept: fn(Ordering) -> bool,
) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let actual = Numeric::from_value(received).ok_or_else(|| {
        args.invalid(format!(
            "received value must be a number or bigint\n\nReceived: {}",
            stringify(received)
        ))
    })?;
    let expected = args.numeric(0)?;
    let pass = actual.compare(expected).map_or(false, accept);
    let not = if ctx.is_not { "not " } else { "" };
    Ok(MatcherResult::new(pass, move || {
        let labels = LabelPrinter::new(&["Expected", "Received"]);
        format!(
            "{}\n{}",
            labels.line("Expected", &format!("{}{} {}", not, operator, expected)),
            labels.line("Received", &actual.to_string())
        )
    }))
}

pub fn to_be_greater_than(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    compare(ctx, received, args, ">", |o| o == Ordering::Greater)
}

pub fn to_be_greater_than_or_equal(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    compare(ctx, received, args, ">=", |o| o != Ordering::Less)
}

pub fn to_be_less_than(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    compare(ctx, received, args, "<", |o| o == Ordering::Less)
}

pub fn to_be_less_than_or_equal(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    compare(ctx, received, args, "<=", |o| o != Ordering::Greater)
}

pub fn to_be_close_to(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let actual = match received {
        Value::Number(n) => *n,
        other => {
            return Err(args.invalid(format!(
                "received value must be a number\n\nReceived: {}",
                stringify(other)
            )))
        }
    };
    let expected = args.number(0)?;
    let digits = match args.optional_count(1)? {
        Some(digits) => digits as i32,
        None => ctx.config().close_to_digits as i32,
    };

    let threshold = 10f64.powi(-digits) / 2.0;
    let (pass, difference) = if actual.is_infinite() && expected.is_infinite() {
        (actual == expected, 0.0)
    } else {
        let difference = (expected - actual).abs();
        (difference < threshold, difference)
    };
    Ok(MatcherResult::new(pass, move || {
        format!(
            "Expected precision: {}\nExpected difference: < {}\nReceived difference: {}",
            digits, threshold, difference
        )
    }))
}

pub fn to_have_length(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let expected = args.count(0)?;
    let actual = received.length().ok_or_else(|| {
        args.invalid(format!(
            "received value must have a length property whose value must be a number\n\nReceived: {}",
            stringify(received)
        ))
    })?;
    Ok(MatcherResult::new(actual == expected, move || {
        format!("Expected length: {}\nReceived length: {}", expected, actual)
    }))
}

pub fn to_match(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let text = received.as_str().ok_or_else(|| {
        args.invalid(format!(
            "received value must be a string\n\nReceived: {}",
            stringify(received)
        ))
    })?;
    let pattern = args.pattern(0, ctx.config().string_match)?;
    let pass = pattern.is_match(text);
    let shown = stringify(received);
    Ok(MatcherResult::new(pass, move || {
        let expected_label = format!("Expected {}", pattern.kind());
        let labels = LabelPrinter::new(&[&expected_label, "Received string"]);
        format!(
            "{}\n{}",
            labels.line(&expected_label, &pattern.to_string()),
            labels.line("Received string", &shown)
        )
    }))
}

pub fn to_satisfy(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let predicate = match args.value(0) {
        Value::Function(f) => f,
        other => {
            return Err(args.invalid(format!(
                "expected value must be a function\n\nExpected: {}",
                stringify(&other)
            )))
        }
    };
    let verdict = predicate.call(std::slice::from_ref(received)).map_err(|thrown| {
        ExpectError::invalid_argument(ctx.name.clone(), format!("predicate threw: {}", stringify(&thrown)))
    })?;
    let custom = args.optional_string(1)?.map(str::to_string);
    let shown = stringify(received);
    Ok(MatcherResult::new(verdict.is_truthy(), move || match &custom {
        Some(custom) => format!("{}\n\nReceived: {}", custom, shown),
        None => format!("Received: {}", shown),
    }))
}
