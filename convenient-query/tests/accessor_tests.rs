//! Attribute accessor behavior against an in-memory build graph
//!
//! Covers the observable contract query functions depend on:
//! 1. Dangling labels are reported once each and never lose valid results
//! 2. Undeclared attributes read as empty
//! 3. Legacy integer encodings for booleans and tristates
//! 4. Placeholder handling for unresolvable computed defaults

use convenient_query::{AccessError, CollectingErrorSink, TargetAccessor};
use convenient_target::{
    Attribute, AttributeMapperError, AttributeType, AttributeValue, InMemoryTargetStore,
    InputFile, Label, Rule, SelectBranch, Target, TargetStore, TriState,
};
use std::sync::Arc;

fn label(s: &str) -> Label {
    s.parse().unwrap()
}

fn label_list(items: &[&str]) -> AttributeValue {
    AttributeValue::LabelList(items.iter().map(|s| label(s)).collect())
}

/// `//foo:foo` with a typical mix of attribute kinds, plus `//foo:a`.
fn build_graph() -> InMemoryTargetStore {
    let foo = Rule::builder(label("//foo:foo"), "cc_library")
        .attribute(Attribute::new("deps", AttributeType::LabelList))
        .attribute(Attribute::new("srcs", AttributeType::LabelList))
        .attribute(Attribute::new("malloc", AttributeType::Label))
        .attribute(Attribute::new("testonly", AttributeType::Boolean))
        .attribute(Attribute::new("flaky", AttributeType::Tristate))
        .attribute(Attribute::new("copts", AttributeType::StringList).nonconfigurable())
        .attribute(Attribute::new("linkopts", AttributeType::StringList))
        .attribute(Attribute::new("licenses", AttributeType::String).nonconfigurable())
        .attribute(Attribute::new("shard_count", AttributeType::Integer))
        .value("deps", label_list(&["//foo:a", "//foo:bad"]))
        .value("testonly", AttributeValue::Boolean(true))
        .value("flaky", AttributeValue::Tristate(TriState::Auto))
        .value(
            "copts",
            AttributeValue::StringList(vec!["-Wall".to_string(), "-O2".to_string()]),
        )
        .value("licenses", AttributeValue::String("notice".to_string()))
        .select(
            "linkopts",
            vec![
                SelectBranch::new(
                    label("//conditions:default"),
                    AttributeValue::StringList(vec!["-lm".to_string()]),
                ),
                SelectBranch::new(
                    label("//config:mac"),
                    AttributeValue::StringList(Vec::new()),
                ),
            ],
        )
        .computed_default(
            "srcs",
            vec![None, Some(label_list(&["//foo:a"])), None],
        )
        .build()
        .unwrap();

    let a = Rule::builder(label("//foo:a"), "cc_library").build().unwrap();

    let mut store = InMemoryTargetStore::new();
    let _ = store.insert(foo);
    let _ = store.insert(a);
    store
}

fn foo(store: &InMemoryTargetStore) -> Arc<Target> {
    store.target(&label("//foo:foo")).unwrap()
}

#[test]
fn test_dangling_label_reported_once_and_valid_results_kept() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);

    let deps = accessor
        .label_list_attr(&"deps(//foo:foo)", &foo(&store), "deps", "in deps attribute: ")
        .unwrap();

    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].label(), &label("//foo:a"));

    let errors = sink.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].caller, "deps(//foo:foo)");
    assert!(errors[0].message.starts_with("in deps attribute: "));
    assert!(errors[0].message.contains("//foo:bad"));
}

#[test]
fn test_every_unresolvable_label_gets_its_own_report() {
    let rule = Rule::builder(label("//x:x"), "java_library")
        .attribute(Attribute::new("deps", AttributeType::LabelList))
        .attribute(Attribute::new("exports", AttributeType::LabelList))
        .value(
            "deps",
            label_list(&["//x:gone1", "//x:ok", "//x:gone2", "//x:ok", "//y:gone3"]),
        )
        .build()
        .unwrap();
    let mut store = InMemoryTargetStore::new();
    let _ = store.insert(rule);
    let _ = store.insert(InputFile { label: label("//x:ok") });

    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = store.target(&label("//x:x")).unwrap();

    let deps = accessor.label_list_attr(&"q", &target, "deps", "").unwrap();
    let names: Vec<String> = deps.iter().map(|t| t.label().to_string()).collect();
    assert_eq!(names, vec!["//x:ok", "//x:ok"]);

    let messages: Vec<String> = sink.take().into_iter().map(|e| e.message).collect();
    assert_eq!(messages.len(), 3);
    assert!(messages[0].contains("//x:gone1"));
    assert!(messages[1].contains("//x:gone2"));
    assert!(messages[2].contains("//y:gone3"));

    // Unset list attribute: nothing to resolve, nothing to report.
    assert!(accessor.label_list_attr(&"q", &target, "exports", "").unwrap().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn test_undeclared_attribute_is_empty() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = foo(&store);

    assert!(accessor.label_list_attr(&"q", &target, "no_such_attr", "").unwrap().is_empty());
    assert!(accessor.attr_as_strings(&target, "no_such_attr").unwrap().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn test_boolean_attribute_uses_legacy_encoding() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);

    assert_eq!(
        accessor.attr_as_strings(&foo(&store), "testonly").unwrap(),
        vec![Some("1".to_string())]
    );
}

#[test]
fn test_tristate_attribute_uses_legacy_encoding() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);

    assert_eq!(
        accessor.attr_as_strings(&foo(&store), "flaky").unwrap(),
        vec![Some("-1".to_string())]
    );
}

#[test]
fn test_unset_boolean_reads_as_zero() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let a = store.target(&label("//foo:a")).unwrap();

    // `//foo:a` declares nothing, so the attribute is undeclared on it.
    assert!(accessor.attr_as_strings(&a, "testonly").unwrap().is_empty());

    let rule = Rule::builder(label("//foo:b"), "cc_library")
        .attribute(Attribute::new("testonly", AttributeType::Boolean))
        .build()
        .unwrap();
    let b = Target::from(rule);
    assert_eq!(
        accessor.attr_as_strings(&b, "testonly").unwrap(),
        vec![Some("0".to_string())]
    );
}

#[test]
fn test_computed_default_placeholders_differ_by_path() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = foo(&store);

    // String projection keeps the placeholders.
    assert_eq!(
        accessor.attr_as_strings(&target, "srcs").unwrap(),
        vec![None, Some("[//foo:a]".to_string()), None]
    );

    // Label resolution drops them.
    let srcs = accessor.label_list_attr(&"q", &target, "srcs", "").unwrap();
    assert_eq!(srcs.len(), 1);
    assert!(sink.is_empty());

    // A label attribute with no value and no default is a single placeholder.
    assert_eq!(accessor.attr_as_strings(&target, "malloc").unwrap(), vec![None]);
    assert!(accessor.label_list_attr(&"q", &target, "malloc", "").unwrap().is_empty());
}

#[test]
fn test_select_visits_every_branch() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);

    assert_eq!(
        accessor.attr_as_strings(&foo(&store), "linkopts").unwrap(),
        vec![Some("[-lm]".to_string()), Some("[]".to_string())]
    );
    assert_eq!(
        accessor.attr_as_strings(&foo(&store), "shard_count").unwrap(),
        vec![Some("0".to_string())]
    );
}

#[test]
fn test_string_accessors() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = foo(&store);

    assert_eq!(accessor.string_attr(&target, "licenses").unwrap(), "notice");
    assert_eq!(
        accessor.string_list_attr(&target, "copts").unwrap(),
        vec!["-Wall", "-O2"]
    );
}

#[test]
fn test_string_accessor_constraint_violations() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = foo(&store);

    assert!(matches!(
        accessor.string_attr(&target, "copts"),
        Err(AccessError::Attribute(AttributeMapperError::TypeMismatch { .. }))
    ));
    assert!(matches!(
        accessor.string_list_attr(&target, "linkopts"),
        Err(AccessError::Attribute(AttributeMapperError::Configurable { .. }))
    ));
    assert!(matches!(
        accessor.string_attr(&target, "missing"),
        Err(AccessError::Attribute(AttributeMapperError::Undeclared { .. }))
    ));
    assert!(sink.is_empty());
}

#[test]
fn test_rule_classification() {
    let test_rule = Target::from(
        Rule::builder(label("//t:unit_test"), "py_test").build().unwrap(),
    );
    let suite = Target::from(Rule::builder(label("//t:all"), "test_suite").build().unwrap());
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);

    assert!(accessor.is_rule(&test_rule));
    assert!(accessor.is_test_rule(&test_rule));
    assert!(!accessor.is_test_suite(&test_rule));
    assert!(accessor.is_test_suite(&suite));
    assert!(!accessor.is_test_rule(&suite));
    assert!(!accessor.is_test_rule(&foo(&store)));

    assert_eq!(accessor.target_kind(&test_rule), "py_test rule");
    assert_eq!(accessor.label(&suite), "//t:all");
}

#[test]
fn test_repeated_calls_are_identical() {
    let store = build_graph();
    let sink = CollectingErrorSink::new();
    let accessor = TargetAccessor::new(&store, &sink);
    let target = foo(&store);

    let first = accessor.label_list_attr(&"q", &target, "deps", "p: ").unwrap();
    let second = accessor.label_list_attr(&"q", &target, "deps", "p: ").unwrap();
    assert_eq!(first, second);

    let errors = sink.take();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], errors[1]);

    for attr in ["testonly", "flaky", "srcs", "linkopts", "copts"] {
        assert_eq!(
            accessor.attr_as_strings(&target, attr).unwrap(),
            accessor.attr_as_strings(&target, attr).unwrap()
        );
    }
}
