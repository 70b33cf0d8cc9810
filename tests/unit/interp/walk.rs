use super::*;
use crate::foundation::core::Color;
use crate::interp::ops::Primitive;
use serde_json::json;

fn effects_with(
    doc: serde_json::Value,
    name: &str,
    config: &InterpreterConfig,
) -> GagResult<Vec<Effect>> {
    let table = CommandTable::load_with(&doc, config)?;
    let mut rng = Rng64::new(config.seed);
    let mut walker = Walker::new(&table, config, &mut rng);
    walker.run(name)?;
    assert!(walker.env.is_settled());
    Ok(walker.into_effects())
}

fn effects(doc: serde_json::Value, name: &str) -> Vec<Effect> {
    effects_with(doc, name, &InterpreterConfig::default()).unwrap()
}

fn names(effects: &[Effect]) -> Vec<&'static str> {
    effects.iter().map(|e| e.op.name()).collect()
}

fn kwarg_f64(effect: &Effect, key: &str) -> f64 {
    effect.kwargs[key].as_f64().unwrap()
}

/// Every undo must cancel the most recent unmatched transform with identical arguments.
fn assert_balanced(effects: &[Effect]) {
    let mut open: Vec<&Effect> = Vec::new();
    for e in effects {
        match e.op {
            Operation::Draw(_) => {}
            Operation::Apply(_) => open.push(e),
            Operation::Undo(_) => {
                let applied = open.pop().expect("undo without a matching transform");
                assert_eq!(applied.inverse().as_ref(), Some(e));
            }
        }
    }
    assert!(open.is_empty(), "transforms left open: {open:?}");
}

#[test]
fn square_emits_a_single_rect() {
    let out = effects(
        json!([{"square": [
            {"rect": {"args": [0, 0, 10, 10], "kwargs": {"fill_color": "c(1,0,0)"}}}
        ]}]),
        "square",
    );
    assert_eq!(out.len(), 1);
    let rect = &out[0];
    assert_eq!(rect.op, Operation::Draw(Primitive::Rect));
    assert_eq!(
        rect.args,
        vec![
            Value::Number(0.0),
            Value::Number(0.0),
            Value::Number(10.0),
            Value::Number(10.0)
        ]
    );
    assert_eq!(
        rect.kwargs["fill_color"],
        Value::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))
    );
}

#[test]
fn spiral_nests_four_levels_then_unwinds() {
    let out = effects(
        json!([{"spiral": [
            {"translate": {"args": [5, 0]}},
            {"scale": {"args": [0.9]}},
            {"spiral": {"kwargs": {"stop_recursion": {"max_depth": 5}}}},
            {"pixel": {"args": [0, 0]}}
        ]}]),
        "spiral",
    );

    let mut expected = Vec::new();
    for _ in 0..5 {
        expected.extend(["translate", "scale"]);
    }
    for _ in 0..5 {
        expected.extend(["draw_pixel", "reverse_scale", "reverse_translate"]);
    }
    assert_eq!(names(&out), expected);
    assert_balanced(&out);
    assert_eq!(out[1].args, vec![Value::Number(0.9)]);
    assert_eq!(out.last().unwrap().args, vec![Value::Number(5.0), Value::Number(0.0)]);
}

#[test]
fn max_depth_allows_one_fewer_nested_descent() {
    for k in [1_u32, 2, 3, 6] {
        let out = effects(
            json!([{"dot": [
                {"pixel": [0, 0]},
                {"dot": {"kwargs": {"stop_recursion": {"max_depth": k}}}}
            ]}]),
            "dot",
        );
        // one top-level walk plus K-1 nested descents
        assert_eq!(out.len(), k as usize, "max_depth = {k}");
    }
}

#[test]
fn vars_apply_to_the_branch_and_revert_after_it() {
    let out = effects(
        json!([{"grow": [
            {"pixel": {"kwargs": {"x": "step=1", "y": 0}}},
            {"grow": {"kwargs": {
                "stop_recursion": {"max_depth": 3},
                "vars": {"step": "*=2"}
            }}},
            {"pixel": {"kwargs": {"x": "step=1", "y": 1}}}
        ]}]),
        "grow",
    );
    let xs: Vec<f64> = out.iter().map(|e| kwarg_f64(e, "x")).collect();
    assert_eq!(xs, [1.0, 2.0, 4.0, 4.0, 2.0, 1.0]);
}

#[test]
fn vars_assignment_replaces_the_live_value() {
    let out = effects(
        json!([{"grow": [
            {"pixel": {"kwargs": {"x": "step=1", "y": 0}}},
            {"grow": {"kwargs": {
                "stop_recursion": {"max_depth": 2},
                "vars": {"step": 40}
            }}}
        ]}]),
        "grow",
    );
    let xs: Vec<f64> = out.iter().map(|e| kwarg_f64(e, "x")).collect();
    assert_eq!(xs, [1.0, 40.0]);
}

#[test]
fn keywords_named_after_variables_take_live_values_in_referenced_walks() {
    let doc = json!([
        {"outer": [{"inner": null}]},
        {"inner": [
            {"pixel": {"kwargs": {"x": 0, "y": 0}}},
            {"rect": {"args": ["x=7", 0, 1, 1]}}
        ]}
    ]);

    let referenced = effects(doc.clone(), "outer");
    assert_eq!(names(&referenced), ["draw_pixel", "draw_rect"]);
    assert_eq!(kwarg_f64(&referenced[0], "x"), 7.0);

    // a top-level walk was not entered through a reference
    let direct = effects(doc, "inner");
    assert_eq!(kwarg_f64(&direct[0], "x"), 0.0);
}

#[test]
fn transforms_take_overrides_of_their_own_command() {
    let out = effects(
        json!([{"t": [
            {"scale": {"kwargs": {"amount": 2}}},
            {"pixel": ["amount=3", 0]}
        ]}]),
        "t",
    );
    assert_eq!(names(&out), ["scale", "draw_pixel", "reverse_scale"]);
    assert_eq!(kwarg_f64(&out[0], "amount"), 3.0);
    assert_eq!(kwarg_f64(&out[2], "amount"), 3.0);
}

#[test]
fn reference_wraps_its_descent_in_a_transform() {
    let doc = json!([
        {"a": [
            {"b": {"kwargs": {"translate_x": 4, "scale": 0.5}}},
            {"b": null}
        ]},
        {"b": [{"pixel": [0, 0]}]}
    ]);
    let out = effects(doc, "a");
    assert_eq!(
        names(&out),
        ["transform", "draw_pixel", "reverse_transform", "draw_pixel"]
    );
    assert_eq!(kwarg_f64(&out[0], "translate_x"), 4.0);
    assert_eq!(kwarg_f64(&out[0], "scale"), 0.5);
    assert!(!out[0].kwargs.contains_key("translate_y"));
    assert_balanced(&out);
}

#[test]
fn random_arguments_resample_per_effect() {
    let out = effects(
        json!([{"dots": [
            {"pixel": ["rand(0,100)", 0]},
            {"pixel": ["rand(0,100)", 0]},
            {"pixel": ["rand(0,100)", 0]},
            {"pixel": ["rand(0,100)", 0]}
        ]}]),
        "dots",
    );
    let xs: Vec<f64> = out.iter().map(|e| e.args[0].as_f64().unwrap()).collect();
    for x in &xs {
        assert!((0.0..100.0).contains(x));
    }
    for (i, a) in xs.iter().enumerate() {
        for b in &xs[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn same_seed_reproduces_the_sequence() {
    let doc = json!([{"dots": [{"pixel": ["rand(0,1)", "rand(0,1)"]}]}]);
    assert_eq!(effects(doc.clone(), "dots"), effects(doc, "dots"));
}

#[test]
fn unknown_names_fail() {
    let doc = json!([{"a": [{"pixel": [0, 0]}, {"nope": []}]}]);
    let err = effects_with(doc.clone(), "missing", &InterpreterConfig::default()).unwrap_err();
    assert!(matches!(err, GagError::UnknownCommand { ref name } if name == "missing"));

    let err = effects_with(doc, "a", &InterpreterConfig::default()).unwrap_err();
    assert!(matches!(err, GagError::UnknownCommand { ref name } if name == "nope"));
}

#[test]
fn unbounded_recursion_hits_the_nesting_ceiling() {
    let config = InterpreterConfig {
        max_nesting: 8,
        ..InterpreterConfig::default()
    };
    let err = effects_with(
        json!([
            {"ping": [{"pixel": [0, 0]}, {"pong": null}]},
            {"pong": [{"ping": null}]}
        ]),
        "ping",
        &config,
    )
    .unwrap_err();
    match err {
        GagError::RecursionLimit { depth, .. } => assert_eq!(depth, 9),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn vars_on_another_command_are_ignored_unless_strict() {
    let doc = json!([
        {"a": [{"b": {"kwargs": {"vars": {"x": 5}}}}]},
        {"b": [{"pixel": ["x=1", 0]}]}
    ]);
    let out = effects(doc.clone(), "a");
    assert_eq!(out[0].args[0], Value::Number(1.0));

    let err = effects_with(doc, "a", &InterpreterConfig::strict()).unwrap_err();
    assert!(matches!(err, GagError::ArgumentGrammar(_)));
}

#[test]
fn unexpected_reference_keywords_fail_in_strict_mode() {
    let doc = json!([
        {"a": [{"b": {"kwargs": {"colour": 1}}}]},
        {"b": [{"pixel": [0, 0]}]}
    ]);
    assert_eq!(effects(doc.clone(), "a").len(), 1);
    let err = effects_with(doc, "a", &InterpreterConfig::strict()).unwrap_err();
    assert!(matches!(err, GagError::ArgumentGrammar(_)));
}

#[test]
fn malformed_stop_policy_is_an_evaluation_error() {
    let err = effects_with(
        json!([{"a": [{"a": {"kwargs": {"stop_recursion": 3}}}]}]),
        "a",
        &InterpreterConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GagError::Evaluation(_)));
}

#[test]
fn update_of_undeclared_variable_fails() {
    let err = effects_with(
        json!([{"a": [
            {"a": {"kwargs": {"stop_recursion": {"max_depth": 2}, "vars": {"ghost": "+=1"}}}}
        ]}]),
        "a",
        &InterpreterConfig::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}
