//! `toThrow` and `toThrowError`.

use crate::assertion::AsyncMode;
use crate::equality::equals;
use crate::errors::ExpectResult;
use crate::format::message::LabelPrinter;
use crate::format::stringify;
use crate::registry::{MatcherContext, MatcherResult};
use crate::value::Value;

use super::args::Args;

pub(crate) const DID_NOT_THROW: &str = "Received function did not throw";

/// The value thrown by `received`, or `None` when it returned normally.
///
/// Under `.rejects` and `.resolves` the received value already is the
/// settled outcome and is taken as thrown.
pub(crate) fn thrown_value(ctx: &MatcherContext, received: &Value) -> ExpectResult<Option<Value>> {
    if ctx.promise != AsyncMode::None {
        return Ok(Some(received.clone()));
    }
    match received {
        Value::Function(f) => Ok(f.call(&[]).err()),
        other => Err(crate::errors::ExpectError::invalid_argument(
            ctx.name.clone(),
            format!("received value must be a function\n\nReceived: {}", stringify(other)),
        )),
    }
}

/// The message of a thrown value: an error's message, a thrown string
/// as-is, anything else printed.
pub(crate) fn thrown_message(thrown: &Value) -> String {
    match thrown {
        Value::Error(error) => error.borrow().message.clone(),
        Value::String(s) => s.clone(),
        other => stringify(other),
    }
}

enum Expectation {
    Any,
    Message(super::args::TextPattern),
    ErrorMessage(String),
    Class(String),
    Asymmetric(Value),
}

fn expectation(ctx: &MatcherContext, args: &Args<'_>) -> ExpectResult<Expectation> {
    let expected = match args.get(0) {
        None => return Ok(Expectation::Any),
        Some(expected) => expected,
    };
    match expected {
        Value::String(_) | Value::Regex(_) => {
            Ok(Expectation::Message(args.pattern(0, ctx.config().string_match)?))
        }
        Value::Error(error) => Ok(Expectation::ErrorMessage(error.borrow().message.clone())),
        Value::Object(_) => match expected.property("message") {
            Some(Value::String(message)) => Ok(Expectation::ErrorMessage(message)),
            _ => Err(args.invalid(format!(
                "expected object must have a string message property\n\nExpected: {}",
                stringify(expected)
            ))),
        },
        Value::Function(class) => Ok(Expectation::Class(class.name().to_string())),
        Value::Asymmetric(_) => Ok(Expectation::Asymmetric(expected.clone())),
        other => Err(args.invalid(format!(
            "expected value must be a string, regular expression, error, error class or asymmetric matcher\n\nExpected: {}",
            stringify(other)
        ))),
    }
}

fn is_class(thrown: &Value, class: &str) -> bool {
    match thrown {
        Value::Error(error) => class == "Error" || error.borrow().name == class,
        _ => false,
    }
}

fn describe_thrown(thrown: &Option<Value>) -> String {
    match thrown {
        None => DID_NOT_THROW.to_string(),
        Some(Value::Error(error)) => {
            let error = error.borrow();
            let labels = LabelPrinter::new(&["Error name", "Error message"]);
            format!(
                "{}\n{}",
                labels.line("Error name", &format!("\"{}\"", error.name)),
                labels.line("Error message", &format!("\"{}\"", error.message))
            )
        }
        Some(other) => format!("Thrown value: {}", stringify(other)),
    }
}

pub fn to_throw(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let args = Args::new(ctx, args);
    let expectation = expectation(ctx, &args)?;
    let thrown = thrown_value(ctx, received)?;

    let (pass, expected_line) = match (&expectation, &thrown) {
        (Expectation::Any, thrown) => (thrown.is_some(), None),
        (Expectation::Message(pattern), thrown) => {
            let pass = thrown.as_ref().map_or(false, |t| pattern.is_match(&thrown_message(t)));
            let label = format!("Expected {}", pattern.kind());
            (pass, Some((label, pattern.to_string())))
        }
        (Expectation::ErrorMessage(message), thrown) => {
            let pass = thrown.as_ref().map_or(false, |t| thrown_message(t) == *message);
            (pass, Some(("Expected message".to_string(), format!("\"{}\"", message))))
        }
        (Expectation::Class(class), thrown) => {
            let pass = thrown.as_ref().map_or(false, |t| is_class(t, class));
            (pass, Some(("Expected constructor".to_string(), class.clone())))
        }
        (Expectation::Asymmetric(expected), thrown) => {
            let pass = thrown.as_ref().map_or(false, |t| equals(t, expected));
            (pass, Some(("Expected".to_string(), stringify(expected))))
        }
    };

    let not = if ctx.is_not { "not " } else { "" };
    let described = describe_thrown(&thrown);
    Ok(MatcherResult::new(pass, move || match &expected_line {
        None => described.clone(),
        Some((label, value)) => {
            let labels = LabelPrinter::new(&[label.as_str(), "Received"]);
            format!("{}\n\n{}", labels.line(label, &format!("{}{}", not, value)), described)
        }
    }))
}
