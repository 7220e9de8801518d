use serde_json::json;

use crate::asymmetric::{any, anything, array_containing, object_containing, string_matching};
use crate::{expect, ExpectError, Record, Shared, Value};

fn samples() -> Vec<Value> {
    vec![
        Value::from(json!({"a": 1, "b": [1, 2, {"c": null}]})),
        Value::from(json!([[], {}, "x"])),
        Value::map(vec![(Value::from("k"), Value::from(json!([1])))]),
        Value::set(vec![Value::from(1), Value::from(json!({"z": true}))]),
        Value::instance("Point", vec![("x", 1), ("y", 2)]),
        Value::error_named("RangeError", "too far"),
    ]
}

#[test]
fn deep_copies_are_equal_but_not_identical() {
    for value in samples() {
        let copy = value.deep_clone();
        expect(&value).to_equal(&copy).unwrap();
        expect(&value).to_strict_equal(&copy).unwrap();
        expect(&value).not().to_be(&copy).unwrap();
        expect(&value).to_be(&value).unwrap();
    }
}

#[test]
fn primitives_are_identical_to_their_copies() {
    for value in [Value::from(1), Value::from("s"), Value::Null, Value::Number(f64::NAN), Value::bigint(9)] {
        expect(&value).to_be(value.deep_clone()).unwrap();
    }
}

#[test]
fn negation_flips_every_verdict() {
    let checks: Vec<(Value, &str, Vec<Value>)> = vec![
        (Value::from(1), "toBe", vec![Value::from(1)]),
        (Value::from(1), "toBe", vec![Value::from(2)]),
        (Value::from(json!([1, 2])), "toContain", vec![Value::from(2)]),
        (Value::from("abc"), "toMatch", vec![Value::from("z")]),
        (Value::from(3), "toBeLessThan", vec![Value::from(2)]),
        (Value::Null, "toBeDefined", vec![]),
        (Value::from(json!({"a": {"b": 1}})), "toHaveProperty", vec![Value::from("a.b")]),
    ];
    for (received, name, args) in checks {
        let direct = expect(&received).call(name, args.clone()).is_ok();
        let negated = expect(&received).not().call(name, args).is_ok();
        assert_ne!(direct, negated, "{} on {:?}", name, received);
    }
}

#[test]
fn object_containing_matches_at_any_depth() {
    let received = Value::from(json!({
        "outer": [{"inner": {"a": 1, "noise": "x"}}],
        "top": {"a": 1, "b": 2},
    }));
    expect(&received)
        .to_equal(Value::object(vec![
            (
                "outer",
                Value::array(vec![Value::object(vec![("inner", object_containing(json!({"a": 1})))])]),
            ),
            ("top", object_containing(json!({"a": 1}))),
        ]))
        .unwrap();
    expect(&received)
        .not()
        .to_equal(Value::object(vec![
            ("outer", anything()),
            ("top", object_containing(json!({"a": 2}))),
        ]))
        .unwrap();
}

#[test]
fn asymmetric_nodes_in_call_arguments() {
    let log = Shared::new(crate::CallLog::new());
    let spy = Value::spy("send", log.clone(), |_| Ok(Value::Undefined));
    log.borrow_mut().record(
        vec![Value::from("user-17"), Value::from(json!({"tags": ["a", "b", "c"]}))],
        crate::CallResult::Return(Value::Undefined),
    );
    expect(&spy)
        .to_have_been_called_with(vec![
            string_matching(r"^user-\d+$"),
            object_containing(Value::object(vec![("tags", array_containing(json!(["c", "a"])))])),
        ])
        .unwrap();
    expect(&spy)
        .to_have_been_called_with(vec![any("String"), anything()])
        .unwrap();
}

#[test]
fn concrete_scenarios() {
    expect(json!([1, {"b": 2}]))
        .to_equal(vec![Value::from(1), object_containing(json!({"b": 2}))])
        .unwrap();
    expect(5).not().to_be_greater_than(10).unwrap();

    let boom = Value::function("boom", |_| Err(Value::error("boom")));
    expect(boom).to_throw_with("boom").unwrap();

    let quiet = Value::function("quiet", |_| Ok(Value::Undefined));
    let error = expect(quiet).to_throw().unwrap_err();
    let failure = error.failure().unwrap();
    assert_eq!(failure.matcher, "toThrow");
    assert!(failure.message.contains("did not throw"));
}

fn self_referential(label: &str) -> Value {
    let record = Shared::new(Record::new());
    let value = Value::Object(record.clone());
    record.borrow_mut().insert("label", label);
    record.borrow_mut().insert("me", value.clone());
    value
}

#[test]
fn cyclic_structures_compare_and_print() {
    let a = self_referential("node");
    let b = self_referential("node");
    expect(&a).to_equal(&b).unwrap();
    expect(&a).to_strict_equal(&b).unwrap();
    expect(&a).not().to_equal(self_referential("other")).unwrap();

    insta::assert_snapshot!(crate::format::stringify(&a), @r###"
    {
      "label": "node",
      "me": [Circular],
    }
    "###);
}

#[test]
fn failures_name_the_matcher_and_negation() {
    let error = expect(json!({"a": 1})).not().to_equal(json!({"a": 1})).unwrap_err();
    match error {
        ExpectError::AssertionFailed(failure) => {
            assert_eq!(failure.matcher, "toEqual");
            assert!(failure.is_not);
            assert!(failure.message.starts_with("expect(received).not.toEqual(expected)"));
            assert!(failure.diff.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
