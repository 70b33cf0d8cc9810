use super::*;
use serde_json::json;

fn load(doc: serde_json::Value) -> GagResult<CommandTable> {
    CommandTable::load(&doc)
}

#[test]
fn loads_positional_and_keyword_forms() {
    let table = load(json!([
        {"square": [
            {"rect": {"args": [0, 0, 10, 10], "kwargs": {"fill_color": "c(1,0,0)"}}},
            {"pixel": [1, 2]},
            {"dot": null}
        ]},
        {"dot": [{"pixel": [0, 0]}]}
    ]))
    .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.names(), ["dot", "square"]);

    let square = table.get("square").unwrap();
    assert_eq!(square.name(), "square");
    let body = square.body();
    assert_eq!(body.len(), 3);
    assert_eq!(body[0].name, "rect");
    assert_eq!(body[0].args.len(), 4);
    assert!(matches!(
        body[0].kwarg("fill_color"),
        Some(Expr::Color { .. })
    ));
    assert_eq!(
        body[1].args,
        vec![Expr::Number(1.0), Expr::Number(2.0)]
    );
    assert!(body[2].args.is_empty());
    assert!(body[2].kwargs.is_empty());
    table.validate().unwrap();
}

#[test]
fn definitions_are_hoisted_into_base_variables() {
    let table = load(json!([
        {"tree": [
            {"scale": {"kwargs": {"amount": "amount = 0.5"}}},
            {"rect": {"args": [0, 0, "size=10", "size"]}}
        ]}
    ]))
    .unwrap();

    let tree = table.get("tree").unwrap();
    assert_eq!(tree.base_variables().len(), 2);
    assert_eq!(tree.base_variables()["amount"], Value::Number(0.5));
    assert_eq!(tree.base_variables()["size"], Value::Number(10.0));
    assert_eq!(
        tree.body()[0].kwarg("amount"),
        Some(&Expr::Var("amount".to_owned()))
    );
    assert_eq!(tree.body()[1].args[2], Expr::Var("size".to_owned()));
    // a bare name is not a reference, only `name = value` is
    assert_eq!(tree.body()[1].args[3], Expr::Str("size".to_owned()));
}

#[test]
fn variables_belong_to_their_own_command() {
    let table = load(json!([
        {"a": [{"pixel": ["x=1", 0]}]},
        {"b": [{"pixel": [0, "y=2"]}]}
    ]))
    .unwrap();
    assert!(table.get("a").unwrap().base_variables().contains_key("x"));
    assert!(!table.get("a").unwrap().base_variables().contains_key("y"));
    assert!(table.get("b").unwrap().base_variables().contains_key("y"));
}

#[test]
fn random_default_is_sampled_once_at_load() {
    let table = load(json!([{"a": [{"pixel": ["x=rand(5,6)", 0]}]}])).unwrap();
    let x = table.get("a").unwrap().base_variables()["x"].as_f64().unwrap();
    assert!((5.0..6.0).contains(&x));
}

#[test]
fn later_definition_overwrites_earlier() {
    let table = load(json!([
        {"a": [{"pixel": [0, 0]}]},
        {"a": [{"pixel": [1, 1]}, {"pixel": [2, 2]}]}
    ]))
    .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("a").unwrap().body().len(), 2);
}

#[test]
fn root_must_be_a_sequence() {
    let err = load(json!({"a": []})).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));
    assert!(err.to_string().contains("root"));
}

#[test]
fn entries_must_have_exactly_one_key() {
    let err = load(json!([{"a": [], "b": []}])).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));

    let err = load(json!([{"a": [{"rect": [0, 0, 1, 1], "pixel": [0, 0]}]}])).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));

    let err = load(json!([{}])).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));

    let err = load(json!(["a"])).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));
}

#[test]
fn argument_shapes_are_checked() {
    let err = load(json!([{"a": [{"rect": {"args": 3}}]}])).unwrap_err();
    assert!(err.to_string().contains("args must be a sequence"));

    let err = load(json!([{"a": [{"rect": {"kwargs": [1]}}]}])).unwrap_err();
    assert!(err.to_string().contains("kwargs must be a mapping"));

    let err = load(json!([{"a": [{"rect": 5}]}])).unwrap_err();
    assert!(matches!(err, GagError::Structure(_)));

    let err = load(json!([{"a": {"rect": []}}])).unwrap_err();
    assert!(err.to_string().contains("must be a sequence"));
}

#[test]
fn unexpected_keys_are_ignored_unless_strict() {
    let doc = json!([{"a": [{"rect": {"args": [0, 0, 1, 1], "kwrags": {}}}]}]);
    CommandTable::load(&doc).unwrap();

    let err = CommandTable::load_with(&doc, &InterpreterConfig::strict()).unwrap_err();
    assert!(matches!(err, GagError::ArgumentGrammar(_)));
}

#[test]
fn strict_grammar_rejects_malformed_inline_syntax() {
    let doc = json!([{"a": [{"pixel": [0, 0, "c(1,0)"]}]}]);
    CommandTable::load(&doc).unwrap();
    let err = CommandTable::load_with(&doc, &InterpreterConfig::strict()).unwrap_err();
    assert!(matches!(err, GagError::ArgumentGrammar(_)));
}

#[test]
fn validate_reports_unknown_sub_invocations() {
    let table = load(json!([{"a": [{"pixel": [0, 0]}, {"b": []}]}])).unwrap();
    let err = table.validate().unwrap_err();
    match err {
        GagError::UnknownCommand { name } => assert_eq!(name, "b"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn from_json_str_reports_serde_errors() {
    let err = CommandTable::from_json_str("[{", &InterpreterConfig::default()).unwrap_err();
    assert!(matches!(err, GagError::Serde(_)));
}

#[test]
fn strict_grammar_confines_update_rules_to_vars() {
    let doc = json!([{"a": [{"pixel": {"args": ["*=2", 0]}}]}]);
    CommandTable::load(&doc).unwrap();
    let err = CommandTable::load_with(&doc, &InterpreterConfig::strict()).unwrap_err();
    assert!(matches!(err, GagError::ArgumentGrammar(_)));

    let ok = json!([{"a": [{"a": {"kwargs": {
        "vars": {"x": "*=2"},
        "stop_recursion": {"max_depth": 2}
    }}}]}]);
    CommandTable::load_with(&ok, &InterpreterConfig::strict()).unwrap();
}
