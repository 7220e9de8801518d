//! The assertion builder.

use std::panic::Location;

use tracing::trace;

use crate::errors::{AssertionFailure, ExpectError, ExpectResult, SnapshotMismatch};
use crate::format::diff::{diff_values, print_diff};
use crate::format::stringify;
use crate::promise::AsyncAssertion;
use crate::registry::{lookup, MatcherContext, MatcherResult};
use crate::state::{get_state, increment_assertion_calls};
use crate::value::Value;

/// Whether the received value is unwrapped from a promise first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsyncMode {
    #[default]
    None,
    Resolves,
    Rejects,
}

impl AsyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AsyncMode::None => "",
            AsyncMode::Resolves => "resolves",
            AsyncMode::Rejects => "rejects",
        }
    }
}

/// A value under assertion.
///
/// Matchers return `Ok(&self)` on success so that assertions chain:
///
/// ```
/// use layered_expect::expect;
///
/// expect(5).not().to_be_greater_than(10).unwrap();
/// expect("hello").to_contain("ell").unwrap().to_have_length(5).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Assertion {
    value: Value,
    is_not: bool,
    message: Option<String>,
    location: &'static Location<'static>,
}

/// Start an assertion over `value`.
#[track_caller]
pub fn expect(value: impl Into<Value>) -> Assertion {
    Assertion::new(value.into(), None, Location::caller())
}

/// Start an assertion whose failures are prefixed with `message`.
#[track_caller]
pub fn expect_with_message(value: impl Into<Value>, message: impl Into<String>) -> Assertion {
    Assertion::new(value.into(), Some(message.into()), Location::caller())
}

impl Assertion {
    fn new(value: Value, message: Option<String>, location: &'static Location<'static>) -> Self {
        Self {
            value,
            is_not: false,
            message,
            location,
        }
    }

    /// The same assertion with the negation flag flipped.
    pub fn not(&self) -> Assertion {
        Assertion {
            is_not: !self.is_not,
            ..self.clone()
        }
    }

    /// Await fulfillment before running matchers.
    pub fn resolves(&self) -> AsyncAssertion {
        AsyncAssertion::new(
            self.value.clone(),
            AsyncMode::Resolves,
            self.is_not,
            self.message.clone(),
            self.location,
        )
    }

    /// Await rejection before running matchers.
    pub fn rejects(&self) -> AsyncAssertion {
        AsyncAssertion::new(
            self.value.clone(),
            AsyncMode::Rejects,
            self.is_not,
            self.message.clone(),
            self.location,
        )
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_not(&self) -> bool {
        self.is_not
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Run the matcher registered as `name`.
    pub fn call(&self, name: &str, args: Vec<Value>) -> ExpectResult<&Self> {
        let invocation = Invocation {
            name,
            is_not: self.is_not,
            mode: AsyncMode::None,
            message: self.message.as_deref(),
            location: self.location,
        };
        dispatch(&invocation, &self.value, &args)?;
        Ok(self)
    }

    builtin_matchers!(sync_matcher_methods);

    /// `predicate(received)` must return true.
    pub fn to_satisfy(&self, predicate: impl Fn(&Value) -> bool + 'static) -> ExpectResult<&Self> {
        self.call("toSatisfy", vec![predicate_value(predicate)])
    }

    pub fn to_have_been_called_with(&self, args: Vec<Value>) -> ExpectResult<&Self> {
        self.call("toHaveBeenCalledWith", args)
    }

    pub fn to_have_been_last_called_with(&self, args: Vec<Value>) -> ExpectResult<&Self> {
        self.call("toHaveBeenLastCalledWith", args)
    }

    /// `n` counts from 1.
    pub fn to_have_been_nth_called_with(&self, n: usize, args: Vec<Value>) -> ExpectResult<&Self> {
        self.call("toHaveBeenNthCalledWith", nth_args(n, args))
    }
}

pub(crate) fn predicate_value(predicate: impl Fn(&Value) -> bool + 'static) -> Value {
    Value::function("predicate", move |args| {
        let undefined = Value::Undefined;
        Ok(Value::Bool(predicate(args.first().unwrap_or(&undefined))))
    })
}

pub(crate) fn nth_args(n: usize, args: Vec<Value>) -> Vec<Value> {
    let mut all = Vec::with_capacity(args.len() + 1);
    all.push(Value::from(n));
    all.extend(args);
    all
}

/// One matcher call as seen by [`dispatch`].
pub(crate) struct Invocation<'a> {
    pub name: &'a str,
    pub is_not: bool,
    pub mode: AsyncMode,
    pub message: Option<&'a str>,
    pub location: &'static Location<'static>,
}

/// Look up and run a matcher, then apply negation to its verdict.
pub(crate) fn dispatch(invocation: &Invocation<'_>, received: &Value, args: &[Value]) -> ExpectResult<()> {
    let matcher = lookup(invocation.name).ok_or_else(|| ExpectError::MatcherNotFound {
        name: invocation.name.to_string(),
    })?;
    increment_assertion_calls();

    let ctx = MatcherContext {
        name: invocation.name.to_string(),
        is_not: invocation.is_not,
        promise: invocation.mode,
        state: get_state(),
        location: invocation.location,
    };
    trace!(
        "Running {} (not: {}, promise: {:?})",
        invocation.name,
        invocation.is_not,
        invocation.mode
    );

    let result = matcher.check(&ctx, received, args)?;
    if result.pass != invocation.is_not {
        return Ok(());
    }
    Err(failure(&ctx, invocation.message, &result, args))
}

/// Placeholders follow the matcher's argument names.
fn hint(ctx: &MatcherContext, arg_count: usize) -> String {
    match (ctx.name.as_str(), arg_count) {
        (_, 0) => ctx.hint("received", ""),
        ("toBeCloseTo", n) if n > 1 => ctx.hint_with_second("received", "expected", "precision"),
        ("toHaveProperty", 1) => ctx.hint("received", "path"),
        ("toHaveProperty", _) => ctx.hint_with_second("received", "path", "value"),
        _ => ctx.hint("received", "expected"),
    }
}

fn failure(ctx: &MatcherContext, custom: Option<&str>, result: &MatcherResult, args: &[Value]) -> ExpectError {
    let mut message = String::new();
    if let Some(custom) = custom {
        message.push_str(custom);
        message.push_str(": ");
    }
    message.push_str(&hint(ctx, args.len()));
    message.push_str("\n\n");
    message.push_str(&result.message());

    let (actual, expected, diff) = match &result.snapshot {
        Some(snapshot) => (
            Some(snapshot.received.clone()),
            Some(snapshot.expected.clone()),
            Some(print_diff(&snapshot.expected, &snapshot.received)),
        ),
        None => {
            let diff = match (&result.expected, &result.actual) {
                (Some(expected), Some(actual)) if !ctx.is_not => diff_values(expected, actual),
                _ => None,
            };
            (
                result.actual.as_ref().map(stringify),
                result.expected.as_ref().map(stringify),
                diff,
            )
        }
    };

    let failure = AssertionFailure {
        matcher: ctx.name.clone(),
        is_not: ctx.is_not,
        promise: ctx.promise.as_str().to_string(),
        message,
        actual,
        expected,
        diff,
    };
    match &result.snapshot {
        Some(snapshot) => ExpectError::SnapshotMismatch(SnapshotMismatch {
            failure,
            key: snapshot.key.clone(),
            expected: snapshot.expected.clone(),
            received: snapshot.received.clone(),
        }),
        None => ExpectError::AssertionFailed(failure),
    }
}
