use super::*;
use crate::config::GrammarMode;
use crate::expression::ast::CompoundOp;
use crate::expression::parser::parse_str;
use crate::expression::value::EmptyScope;

fn eval(s: &str) -> GagResult<Value> {
    let mut rng = Rng64::new(1);
    parse_str(s, GrammarMode::Lenient)
        .unwrap()
        .evaluate(&EmptyScope, &mut rng)
}

#[test]
fn color_evaluates_components() {
    assert_eq!(
        eval("c(1,0,0)").unwrap(),
        Value::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))
    );
    assert_eq!(
        eval("c(0.1,0.2,0.3,0.4)").unwrap(),
        Value::Color(Color::rgba(0.1, 0.2, 0.3, 0.4))
    );
}

#[test]
fn random_resamples_on_every_evaluation() {
    let e = Expr::Random {
        low: 2.0,
        high: 3.0,
    };
    let mut rng = Rng64::new(5);
    let samples: Vec<f64> = (0..8)
        .map(|_| e.evaluate(&EmptyScope, &mut rng).unwrap().as_f64().unwrap())
        .collect();
    for v in &samples {
        assert!((2.0..3.0).contains(v));
    }
    for w in samples.windows(2) {
        assert_ne!(w[0], w[1]);
    }
}

#[test]
fn variables_resolve_through_scope() {
    let mut scope = BTreeMap::new();
    scope.insert("size".to_owned(), Value::Number(4.0));
    let mut rng = Rng64::default();
    assert_eq!(
        Expr::Var("size".to_owned())
            .evaluate(&scope, &mut rng)
            .unwrap(),
        Value::Number(4.0)
    );
    let err = Expr::Var("nope".to_owned())
        .evaluate(&scope, &mut rng)
        .unwrap_err();
    assert!(err.to_string().contains("unknown variable 'nope'"));
}

#[test]
fn compound_alone_is_an_evaluation_error() {
    let err = eval("*=2").unwrap_err();
    assert!(matches!(err, GagError::Evaluation(_)));
}

#[test]
fn update_applies_compound_to_current_value() {
    let mut rng = Rng64::default();
    let rule = Expr::Compound {
        op: CompoundOp::Mul,
        operand: Box::new(Expr::Number(0.5)),
    };
    let next = rule
        .update(&Value::Number(10.0), &EmptyScope, &mut rng)
        .unwrap();
    assert_eq!(next, Value::Number(5.0));

    let rule = Expr::Compound {
        op: CompoundOp::Sub,
        operand: Box::new(Expr::Number(1.0)),
    };
    assert_eq!(
        rule.update(&Value::Number(3.0), &EmptyScope, &mut rng)
            .unwrap(),
        Value::Number(2.0)
    );
}

#[test]
fn update_with_plain_value_replaces_current() {
    let mut rng = Rng64::default();
    let next = Expr::Number(7.0)
        .update(&Value::Number(10.0), &EmptyScope, &mut rng)
        .unwrap();
    assert_eq!(next, Value::Number(7.0));
}

#[test]
fn update_rejects_non_numeric_current() {
    let mut rng = Rng64::default();
    let rule = Expr::Compound {
        op: CompoundOp::Add,
        operand: Box::new(Expr::Number(1.0)),
    };
    let err = rule
        .update(&Value::Str("x".to_owned()), &EmptyScope, &mut rng)
        .unwrap_err();
    assert!(err.to_string().contains("needs a number"));
}

#[test]
fn strings_and_passthrough_survive_evaluation() {
    assert_eq!(eval("hello").unwrap(), Value::Str("hello".to_owned()));
    let mut rng = Rng64::default();
    assert_eq!(
        Expr::Passthrough(serde_json::Value::Null)
            .evaluate(&EmptyScope, &mut rng)
            .unwrap(),
        Value::Null
    );
}

#[test]
fn map_and_list_evaluate_recursively() {
    let raw = serde_json::json!({"max_depth": 5, "pts": [[0, 0], "rand(1)"]});
    let e = crate::expression::parser::parse_value(&raw, GrammarMode::Lenient).unwrap();
    let mut rng = Rng64::default();
    let v = e.evaluate(&EmptyScope, &mut rng).unwrap();
    let m = v.as_map().unwrap();
    assert_eq!(m["max_depth"], Value::Number(5.0));
    let pts = m["pts"].as_list().unwrap();
    assert_eq!(
        pts[0],
        Value::List(vec![Value::Number(0.0), Value::Number(0.0)])
    );
    assert!((0.0..1.0).contains(&pts[1].as_f64().unwrap()));
}
