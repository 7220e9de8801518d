//! Matchers over the call log of a spied function.

use crate::equality::equals;
use crate::errors::{ExpectError, ExpectResult};
use crate::format::stringify;
use crate::registry::{MatcherContext, MatcherResult};
use crate::value::{CallLog, CallResult, Value};

use super::args::Args;

fn call_log(ctx: &MatcherContext, received: &Value) -> ExpectResult<(String, CallLog)> {
    match received {
        Value::Function(f) => match f.calls() {
            Some(calls) => Ok((f.name().to_string(), calls.borrow().clone())),
            None => Err(not_a_spy(ctx, received)),
        },
        _ => Err(not_a_spy(ctx, received)),
    }
}

fn not_a_spy(ctx: &MatcherContext, received: &Value) -> ExpectError {
    ExpectError::invalid_argument(
        ctx.name.clone(),
        format!("received value must be a spy\n\nReceived: {}", stringify(received)),
    )
}

fn print_args(args: &[Value]) -> String {
    args.iter().map(stringify).collect::<Vec<_>>().join(", ")
}

fn print_calls(calls: &[Vec<Value>]) -> String {
    if calls.is_empty() {
        return "Number of calls: 0".to_string();
    }
    let lines: Vec<String> = calls
        .iter()
        .enumerate()
        .map(|(i, call)| format!("  {}: {}", i + 1, print_args(call)))
        .collect();
    format!("Received calls:\n{}\n\nNumber of calls: {}", lines.join("\n"), calls.len())
}

fn returned_values(results: &[CallResult]) -> Vec<Option<&Value>> {
    results
        .iter()
        .map(|result| match result {
            CallResult::Return(value) => Some(value),
            _ => None,
        })
        .collect()
}

fn print_results(results: &[CallResult]) -> String {
    let lines: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, result)| match result {
            CallResult::Return(value) => format!("  {}: {}", i + 1, stringify(value)),
            CallResult::Throw(value) => format!("  {}: function call threw an error: {}", i + 1, stringify(value)),
            CallResult::Incomplete => format!("  {}: function call has not returned yet", i + 1),
        })
        .collect();
    let returned = returned_values(results).into_iter().flatten().count();
    format!(
        "Received results:\n{}\n\nNumber of returns: {}\nNumber of calls:   {}",
        lines.join("\n"),
        returned,
        results.len()
    )
}

fn count_result(name: String, expected: usize, actual: usize, what: &'static str) -> MatcherResult {
    MatcherResult::new(expected == actual, move || {
        format!(
            "Spy: {}\n\nExpected number of {}: {}\nReceived number of {}: {}",
            name, what, expected, what, actual
        )
    })
}

pub fn to_have_been_called(ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    let (name, log) = call_log(ctx, received)?;
    let pass = !log.calls.is_empty();
    Ok(MatcherResult::new(pass, move || {
        format!("Spy: {}\n\n{}", name, print_calls(&log.calls))
    }))
}

pub fn to_have_been_called_once(ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    let (name, log) = call_log(ctx, received)?;
    Ok(count_result(name, 1, log.calls.len(), "calls"))
}

pub fn to_have_been_called_times(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).count(0)?;
    let (name, log) = call_log(ctx, received)?;
    Ok(count_result(name, expected, log.calls.len(), "calls"))
}

fn call_matches(call: &[Value], expected: &[Value]) -> bool {
    equals(&Value::array(call.to_vec()), &Value::array(expected.to_vec()))
}

pub fn to_have_been_called_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let (name, log) = call_log(ctx, received)?;
    let pass = log.calls.iter().any(|call| call_matches(call, args));
    let expected = print_args(args);
    Ok(MatcherResult::new(pass, move || {
        format!("Spy: {}\n\nExpected: {}\n{}", name, expected, print_calls(&log.calls))
    }))
}

pub fn to_have_been_last_called_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let (name, log) = call_log(ctx, received)?;
    let pass = log.calls.last().map_or(false, |call| call_matches(call, args));
    let expected = print_args(args);
    Ok(MatcherResult::new(pass, move || {
        let last = log
            .calls
            .last()
            .map_or_else(|| "Number of calls: 0".to_string(), |call| format!("Received: {}", print_args(call)));
        format!("Spy: {}\n\nExpected: {}\n{}", name, expected, last)
    }))
}

fn nth(ctx: &MatcherContext, args: &Args<'_>) -> ExpectResult<usize> {
    match args.count(0)? {
        0 => Err(ExpectError::invalid_argument(
            ctx.name.clone(),
            "n must be a positive integer\n\nExpected: 0",
        )),
        n => Ok(n),
    }
}

pub fn to_have_been_nth_called_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let parsed = Args::new(ctx, args);
    let n = nth(ctx, &parsed)?;
    let expected_args = parsed.rest(1);
    let (name, log) = call_log(ctx, received)?;
    let pass = log.calls.get(n - 1).map_or(false, |call| call_matches(call, expected_args));
    let expected = print_args(expected_args);
    Ok(MatcherResult::new(pass, move || {
        let actual = log.calls.get(n - 1).map_or_else(
            || format!("Number of calls: {}", log.calls.len()),
            |call| format!("Received: {}", print_args(call)),
        );
        format!("Spy: {}\n\nn: {}\nExpected: {}\n{}", name, n, expected, actual)
    }))
}

pub fn to_have_returned(ctx: &MatcherContext, received: &Value, _args: &[Value]) -> ExpectResult<MatcherResult> {
    let (name, log) = call_log(ctx, received)?;
    let pass = log.results.iter().any(|result| matches!(result, CallResult::Return(_)));
    Ok(MatcherResult::new(pass, move || {
        format!("Spy: {}\n\n{}", name, print_results(&log.results))
    }))
}

pub fn to_have_returned_times(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).count(0)?;
    let (name, log) = call_log(ctx, received)?;
    let returned = returned_values(&log.results).into_iter().flatten().count();
    Ok(count_result(name, expected, returned, "returns"))
}

pub fn to_have_returned_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).value(0);
    let (name, log) = call_log(ctx, received)?;
    let pass = returned_values(&log.results)
        .into_iter()
        .flatten()
        .any(|value| equals(value, &expected));
    Ok(MatcherResult::new(pass, move || {
        format!("Spy: {}\n\nExpected: {}\n{}", name, stringify(&expected), print_results(&log.results))
    }))
}

pub fn to_have_last_returned_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let expected = Args::new(ctx, args).value(0);
    let (name, log) = call_log(ctx, received)?;
    let pass = match log.results.last() {
        Some(CallResult::Return(value)) => equals(value, &expected),
        _ => false,
    };
    Ok(MatcherResult::new(pass, move || {
        format!("Spy: {}\n\nExpected: {}\n{}", name, stringify(&expected), print_results(&log.results))
    }))
}

pub fn to_have_nth_returned_with(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let parsed = Args::new(ctx, args);
    let n = nth(ctx, &parsed)?;
    let expected = parsed.value(1);
    let (name, log) = call_log(ctx, received)?;
    let pass = match log.results.get(n - 1) {
        Some(CallResult::Return(value)) => equals(value, &expected),
        _ => false,
    };
    Ok(MatcherResult::new(pass, move || {
        format!(
            "Spy: {}\n\nn: {}\nExpected: {}\n{}",
            name,
            n,
            stringify(&expected),
            print_results(&log.results)
        )
    }))
}
