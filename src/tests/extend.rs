use crate::{expect, extend, registered_matchers, ExpectError, MatcherResult, Matchers, Promise, Value};

fn within(ctx: &crate::MatcherContext, received: &Value, args: &[Value]) -> crate::ExpectResult<MatcherResult> {
    let (floor, ceiling) = match (args.first().and_then(Value::as_f64), args.get(1).and_then(Value::as_f64)) {
        (Some(floor), Some(ceiling)) => (floor, ceiling),
        _ => return Err(ExpectError::invalid_argument(ctx.name.clone(), "bounds must be numbers")),
    };
    let pass = received.as_f64().map_or(false, |n| n >= floor && n <= ceiling);
    let shown = received.clone();
    Ok(MatcherResult::new(pass, move || {
        format!("expected {} to be within range {} - {}", shown, floor, ceiling)
    }))
}

#[test]
fn custom_matchers_are_callable_after_extend() {
    extend(Matchers::new().with("toBeWithinRange", within));
    assert!(registered_matchers().iter().any(|name| name == "toBeWithinRange"));

    expect(5).call("toBeWithinRange", vec![1.into(), 10.into()]).unwrap();
    expect(50).not().call("toBeWithinRange", vec![1.into(), 10.into()]).unwrap();

    let error = expect(50).call("toBeWithinRange", vec![1.into(), 10.into()]).unwrap_err();
    assert_eq!(
        error.to_string(),
        "expect(received).toBeWithinRange(expected)\n\nexpected 50 to be within range 1 - 10"
    );
    assert!(matches!(
        expect(5).call("toBeWithinRange", vec!["a".into()]),
        Err(ExpectError::InvalidArgument { .. })
    ));
}

#[test]
fn last_registration_wins() {
    extend(Matchers::new().with("toBeLayered", |_ctx, _received, _args| {
        Ok(MatcherResult::new(false, || "first".to_string()))
    }));
    extend(Matchers::new().with("toBeLayered", |_ctx, _received, _args| {
        Ok(MatcherResult::new(true, || "second".to_string()))
    }));
    expect(1).call("toBeLayered", vec![]).unwrap();
}

#[test]
fn custom_matchers_can_use_equality_helpers() {
    extend(Matchers::new().with("toEqualTwice", |ctx, received, args| {
        let expected = args.first().cloned().unwrap_or(Value::Undefined);
        let doubled = Value::array(vec![expected.clone(), expected]);
        let pass = ctx.equals(received, &doubled);
        let message = ctx.diff_or_values(&doubled, received);
        Ok(MatcherResult::new(pass, move || message.clone()))
    }));
    expect(serde_json::json!([3, 3])).call("toEqualTwice", vec![3.into()]).unwrap();
    assert!(expect(serde_json::json!([3, 4])).call("toEqualTwice", vec![3.into()]).is_err());
}

#[tokio::test]
async fn custom_matchers_work_through_the_async_wrapper() {
    extend(Matchers::new().with("toBeWithinRangeAsync", within));
    expect(Promise::resolve(7))
        .resolves()
        .call("toBeWithinRangeAsync", vec![0.into(), 9.into()])
        .await
        .unwrap();
    expect(Promise::reject(70))
        .rejects()
        .not()
        .call("toBeWithinRangeAsync", vec![0.into(), 9.into()])
        .await
        .unwrap();
}

#[test]
fn unknown_names_fail_fast() {
    assert!(matches!(
        expect(1).call("toBeMissingEverywhere", vec![]),
        Err(ExpectError::MatcherNotFound { .. })
    ));
}
