//! End-to-end properties of parse, serialization, and simplification.

use jx_expression::{parse_json, partial_eval, DataType, Expr, ExprError, MemorySchema};
use serde_json::json;

fn pe(value: serde_json::Value) -> Expr {
    // RUST_LOG=jx_expression=trace shows the rewrite passes.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let expr = parse_json(&value, None).expect("parse");
    partial_eval(&expr).expect("partial_eval")
}

/// Parsing an expression's canonical JSON recovers the simplified tree.
#[test]
fn canonical_json_round_trips() {
    let cases = vec![
        json!({"eq": {"a": 1}}),
        json!({"and": [{"gt": {"a": 2}}, {"prefix": {"b": "x"}}]}),
        json!({"or": [{"missing": "a"}, {"eq": {"a": [1, 2]}}]}),
        json!({"when": {"exists": "a"}, "then": {"add": [{"var": "a"}, 1]}, "else": 0}),
        json!({"case": [
            {"when": {"eq": {"k": "x"}}, "then": 1},
            {"when": {"eq": {"k": "y"}}, "then": 2},
            3
        ]}),
        json!({"coalesce": [{"var": "a"}, {"var": "b"}, 0]}),
        json!({"between": {"ts": [10, 20]}}),
        json!({"concat": [{"var": "a"}, {"var": "b"}], "separator": "-"}),
        json!({"not": {"in": [{"var": "a"}, {"literal": [1, 2, 3]}]}}),
        json!({"floor": [{"var": "a"}, 10]}),
    ];
    for case in cases {
        let simplified = pe(case.clone());
        let round =
            parse_json(&serde_json::Value::from(simplified.to_json()), None).expect("reparse");
        let round = partial_eval(&round).expect("partial_eval");
        assert_eq!(round, simplified, "round trip diverged for {case}");
    }
}

/// Simplification is a fixed point: a second pass changes nothing.
#[test]
fn partial_eval_is_idempotent() {
    let cases = vec![
        json!({"not": {"and": [{"eq": {"a": 1}}, {"or": [{"var": "b"}, false]}]}}),
        json!({"add": [{"var": "a"}, {"mul": [2, 3]}]}),
        json!({"missing": {"add": [{"var": "a"}, {"var": "b"}]}}),
        json!({"case": [{"when": {"gt": {"a": 0}}, "then": {"var": "a"}}, 0]}),
    ];
    for case in cases {
        let once = pe(case.clone());
        let twice = partial_eval(&once).expect("partial_eval");
        assert_eq!(once, twice, "not idempotent for {case}");
    }
}

#[test]
fn de_morgan_normal_forms_agree() {
    let negated_conjunction = pe(json!({"not": {"and": [
        {"eq": {"a": 1}},
        {"gt": {"b": 2}}
    ]}}));
    let disjunction_of_negations = pe(json!({"or": [
        {"not": {"eq": {"a": 1}}},
        {"not": {"gt": {"b": 2}}}
    ]}));
    assert_eq!(negated_conjunction, disjunction_of_negations);
}

#[test]
fn boolean_scenario_folds_to_single_test() {
    // Duplicate tests and neutral terms all collapse.
    let expr = pe(json!({"and": [
        {"eq": {"a": 1}},
        true,
        {"and": [{"eq": {"a": 1}}, {"or": []}]},
    ]}));
    // `{"or": []}` is false, so the whole conjunction is.
    assert_eq!(expr, Expr::FALSE);

    let expr = pe(json!({"and": [
        {"eq": {"a": 1}},
        true,
        {"and": [{"eq": {"a": 1}}]},
    ]}));
    assert_eq!(expr, Expr::eq(Expr::var("a"), Expr::literal(1)));
}

#[test]
fn when_condition_decided_by_folding() {
    let expr = pe(json!({
        "when": {"gt": [{"add": [1, 1]}, 1]},
        "then": {"var": "a"},
        "else": {"var": "b"}
    }));
    assert_eq!(expr, Expr::var("a"));
}

#[test]
fn eq_and_in_normalize_to_one_form() {
    let via_eq = pe(json!({"eq": {"a": [1, 2]}}));
    let via_in = pe(json!({"in": [{"var": "a"}, {"literal": [1, 2]}]}));
    assert_eq!(via_eq, via_in);
}

#[test]
fn missing_computation_reaches_variables() {
    let expr = pe(json!({"missing": {"add": [{"var": "a"}, {"var": "b"}]}}));
    assert_eq!(
        expr,
        Expr::or(vec![
            Expr::Missing(Box::new(Expr::var("a"))),
            Expr::Missing(Box::new(Expr::var("b"))),
        ])
    );
}

#[test]
fn null_in_boolean_position_does_not_hold() {
    assert_eq!(pe(json!({"and": [null, {"eq": {"a": 1}}]})), Expr::FALSE);
    assert_eq!(
        pe(json!({"or": [null, {"eq": {"a": 1}}]})),
        Expr::eq(Expr::var("a"), Expr::literal(1))
    );
    assert_eq!(pe(json!({"not": null})), Expr::TRUE);
}

#[test]
fn non_boolean_literal_in_boolean_position_is_rejected() {
    let expr = parse_json(&json!({"and": [5, {"eq": {"a": 1}}]}), None).expect("parse");
    let err = partial_eval(&expr).expect_err("type error");
    assert!(matches!(err, ExprError::TypeMismatch { expected, .. } if expected == DataType::Boolean));
}

#[test]
fn schema_types_flow_into_the_tree() {
    let schema = MemorySchema::new()
        .with_column("status", "status.~s~", DataType::Text)
        .with_column("bytes", "bytes.~n~", DataType::Number);
    let expr = parse_json(
        &json!({"and": [{"eq": {"status": "ok"}}, {"gt": {"bytes": 100}}]}),
        Some(&schema),
    )
    .expect("parse");
    let vars = expr.vars();
    let status = vars.iter().find(|v| v.name() == "status").expect("status");
    assert_eq!(status.datatype(), DataType::Text);
    let bytes = vars.iter().find(|v| v.name() == "bytes").expect("bytes");
    assert_eq!(bytes.datatype(), DataType::Number);
}

#[test]
fn unknown_variable_comparisons_stay_symbolic() {
    // Without a schema nothing is known about `a`; the test survives.
    let expr = pe(json!({"gt": {"a": 2}}));
    assert!(matches!(expr, Expr::Cmp { .. }));
}
