//! Integration tests for the fingerprinting and clone-detection surface,
//! exercised through the public API only.

use polyscan_core::ast::{LiteralKind, MetaNode, Parameter, Pattern};
use polyscan_core::fingerprint::{self, CloneType, DetectionConfig};

fn accumulate_function(name: &str, acc: &str, item: &str) -> MetaNode {
    MetaNode::function(
        name,
        vec![Parameter::named("items")],
        MetaNode::block(vec![
            MetaNode::assign(
                MetaNode::variable(acc),
                MetaNode::literal(LiteralKind::Integer, "0"),
            ),
            MetaNode::Loop {
                kind: polyscan_core::ast::LoopKind::Iterator,
                binding: Some(Pattern::Binding(item.into())),
                subject: Box::new(MetaNode::variable("items")),
                body: Box::new(MetaNode::block(vec![MetaNode::CompoundAssignment {
                    op: "+=".into(),
                    target: Box::new(MetaNode::variable(acc)),
                    value: Box::new(MetaNode::variable(item)),
                }])),
            },
            MetaNode::ret(Some(MetaNode::variable(acc))),
        ]),
    )
}

#[test]
fn copy_pasted_function_is_a_type_one_clone() {
    let a = accumulate_function("sum", "total", "item");
    let b = accumulate_function("sum", "total", "item");

    let report = fingerprint::detect(&a, &b, &DetectionConfig::default());

    assert!(report.duplicate);
    assert_eq!(report.clone_type, Some(CloneType::TypeOne));
    assert_eq!(report.exact_digests.0, report.exact_digests.1);
}

#[test]
fn renamed_copy_is_a_type_two_clone() {
    let a = accumulate_function("sum", "total", "item");
    let b = accumulate_function("tally", "count", "entry");

    let report = fingerprint::detect(&a, &b, &DetectionConfig::default());

    assert_ne!(report.exact_digests.0, report.exact_digests.1);
    assert_eq!(report.clone_type, Some(CloneType::TypeTwo));
    assert_eq!(report.similarity, 1.0);
}

#[test]
fn changed_literals_are_still_type_two() {
    let with_zero = accumulate_function("sum", "total", "item");
    let mut with_ten = accumulate_function("sum", "total", "item");
    if let MetaNode::FunctionDef { body, .. } = &mut with_ten {
        if let MetaNode::Block { statements } = body.as_mut() {
            statements[0] = MetaNode::assign(
                MetaNode::variable("total"),
                MetaNode::literal(LiteralKind::Integer, "10"),
            );
        }
    }

    let report = fingerprint::detect(&with_zero, &with_ten, &DetectionConfig::default());
    assert_eq!(report.clone_type, Some(CloneType::TypeTwo));
}

#[test]
fn changed_literal_kind_is_structural() {
    let int = MetaNode::literal(LiteralKind::Integer, "1");
    let float = MetaNode::literal(LiteralKind::Float, "1");

    assert_ne!(fingerprint::normalized(&int), fingerprint::normalized(&float));
}

#[test]
fn an_extra_statement_downgrades_to_type_three() {
    let base = accumulate_function("sum", "total", "item");
    let mut extended = accumulate_function("sum", "total", "item");
    if let MetaNode::FunctionDef { body, .. } = &mut extended {
        if let MetaNode::Block { statements } = body.as_mut() {
            statements.insert(
                2,
                MetaNode::call(
                    MetaNode::variable("audit"),
                    vec![MetaNode::variable("total")],
                ),
            );
        }
    }

    let report = fingerprint::detect(&base, &extended, &DetectionConfig::default());

    assert_eq!(report.clone_type, Some(CloneType::TypeThree));
    assert!(report.similarity < 1.0);
    assert!(report.similarity >= 0.8);
}

#[test]
fn unrelated_functions_are_not_clones() {
    let a = accumulate_function("sum", "total", "item");
    let b = MetaNode::function(
        "greet",
        vec![Parameter::named("name")],
        MetaNode::block(vec![MetaNode::ret(Some(MetaNode::call(
            MetaNode::variable("format"),
            vec![
                MetaNode::literal(LiteralKind::String, "hello {}"),
                MetaNode::variable("name"),
            ],
        )))]),
    );

    let report = fingerprint::detect(&a, &b, &DetectionConfig::default());
    assert!(!report.duplicate);
    assert_eq!(report.clone_type, None);
}

#[test]
fn normalization_is_idempotent_over_a_deep_tree() {
    let tree = MetaNode::Container {
        kind: polyscan_core::ast::ContainerKind::Class,
        name: "Accumulator".into(),
        parent: Some("Base".into()),
        interfaces: vec!["Summable".into()],
        members: vec![
            accumulate_function("sum", "total", "item"),
            MetaNode::Property {
                name: "total".into(),
                getter: Some(Box::new(MetaNode::ret(Some(MetaNode::variable("total"))))),
                setter: None,
            },
        ],
    };

    let once = fingerprint::normalize(&tree);
    let twice = fingerprint::normalize(&once);
    assert_eq!(once, twice);
    assert_eq!(fingerprint::exact(&once), fingerprint::exact(&twice));
}

#[test]
fn foreign_payload_differences_vanish_under_normalization() {
    let a = MetaNode::Foreign {
        language: "c".into(),
        hint: "goto".into(),
        payload: serde_json::json!({"label": "retry"}),
    };
    let b = MetaNode::Foreign {
        language: "c".into(),
        hint: "goto".into(),
        payload: serde_json::json!({"label": "done", "line": 40}),
    };

    assert_ne!(fingerprint::exact(&a), fingerprint::exact(&b));
    assert_eq!(fingerprint::normalized(&a), fingerprint::normalized(&b));
}

#[test]
fn foreign_hint_differences_are_structural() {
    let a = MetaNode::Foreign {
        language: "c".into(),
        hint: "goto".into(),
        payload: serde_json::Value::Null,
    };
    let b = MetaNode::Foreign {
        language: "c".into(),
        hint: "label".into(),
        payload: serde_json::Value::Null,
    };

    assert_ne!(fingerprint::normalized(&a), fingerprint::normalized(&b));
}

#[test]
fn digests_survive_serde_round_trips_of_the_tree() {
    let tree = accumulate_function("sum", "total", "item");
    let json = serde_json::to_string(&tree).expect("serialize");
    let back: MetaNode = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(fingerprint::exact(&tree), fingerprint::exact(&back));
    assert_eq!(fingerprint::normalized(&tree), fingerprint::normalized(&back));
}

#[test]
fn token_sequences_ignore_names_but_keep_shape() {
    let a = fingerprint::tokens(&accumulate_function("sum", "total", "item"));
    let b = fingerprint::tokens(&accumulate_function("tally", "count", "entry"));

    assert_eq!(a, b);
    assert!(a.contains(&"loop:iterator".to_string()));
    assert!(a.contains(&"assign:+=".to_string()));
}
