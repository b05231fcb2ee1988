//! Keyword semantics, `$ref` handling and violation paths.

use std::sync::Arc;

use json_matchers::{
    Matcher, MatcherError, PathSegment, SchemaDocument, SchemaStore, Violation, ViolationKind,
};
use serde_json::{json, Value};

fn doc(schema: Value) -> SchemaDocument {
    SchemaDocument::from_value("test", schema).unwrap()
}

fn violations(schema: Value, body: Value) -> Vec<Violation> {
    let document = doc(schema);
    Matcher::new(&document)
        .evaluate_value(&body)
        .unwrap()
        .violations()
        .to_vec()
}

fn matches(schema: Value, body: Value) -> bool {
    violations(schema, body).is_empty()
}

fn paths(found: &[Violation]) -> Vec<String> {
    found.iter().map(|v| v.path.to_pointer()).collect()
}

// ---------------------------------------------------------------------------
// required / properties
// ---------------------------------------------------------------------------

#[test]
fn missing_required_property_is_reported_at_its_path() {
    let schema = json!({
        "type": "object",
        "required": ["name"],
        "properties": { "name": { "type": "string" } }
    });

    let found = violations(schema.clone(), json!({}));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ViolationKind::Required);
    assert_eq!(found[0].path.to_pointer(), "/name");
    assert_eq!(found[0].to_string(), "/name: missing required property");

    assert!(matches(schema, json!({ "name": "a" })));
}

#[test]
fn unknown_properties_are_allowed() {
    let schema = json!({
        "type": "object",
        "properties": { "id": { "type": "integer" } }
    });
    assert!(matches(schema, json!({ "id": 1, "extra": [1, 2, 3] })));
}

#[test]
fn nested_property_violations_carry_the_full_path() {
    let schema = json!({
        "type": "object",
        "properties": {
            "author": {
                "type": "object",
                "properties": { "email": { "type": "string" } }
            }
        }
    });

    let found = violations(schema, json!({ "author": { "email": 42 } }));
    assert_eq!(paths(&found), vec!["/author/email"]);
    assert_eq!(found[0].expected, "string");
    assert_eq!(found[0].actual, "integer");
    assert_eq!(
        found[0].path.segments(),
        &[
            PathSegment::Key("author".to_string()),
            PathSegment::Key("email".to_string())
        ]
    );
}

#[test]
fn path_segments_are_pointer_escaped() {
    let schema = json!({
        "type": "object",
        "properties": { "a/b": { "type": "string" }, "m~n": { "type": "string" } }
    });
    let found = violations(schema, json!({ "a/b": 1, "m~n": 2 }));
    assert_eq!(paths(&found), vec!["/a~1b", "/m~0n"]);
}

// ---------------------------------------------------------------------------
// type
// ---------------------------------------------------------------------------

#[test]
fn integer_is_a_refinement_of_number() {
    assert!(matches(json!({ "type": "integer" }), json!(3)));
    assert!(matches(json!({ "type": "integer" }), json!(3.0)));
    assert!(!matches(json!({ "type": "integer" }), json!(3.5)));
    assert!(matches(json!({ "type": "number" }), json!(3)));
    assert!(matches(json!({ "type": "number" }), json!(3.5)));
}

#[test]
fn type_lists_accept_any_listed_type() {
    let schema = json!({ "type": ["string", "null"] });
    assert!(matches(schema.clone(), json!(null)));
    assert!(matches(schema.clone(), json!("x")));

    let found = violations(schema, json!(true));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].to_string(), "(root): expected string or null, found boolean");
}

#[test]
fn every_type_name_is_checked() {
    let cases = [
        ("object", json!({})),
        ("array", json!([])),
        ("string", json!("")),
        ("number", json!(0.5)),
        ("integer", json!(7)),
        ("boolean", json!(false)),
        ("null", json!(null)),
    ];
    for (name, value) in &cases {
        for (other, _) in &cases {
            let expected = name == other
                || (*other == "number" && *name == "integer");
            assert_eq!(
                matches(json!({ "type": other }), value.clone()),
                expected,
                "type {other} against {value}"
            );
        }
    }
}

#[test]
fn structural_keywords_on_the_wrong_shape_give_one_type_violation() {
    let schema = json!({
        "required": ["id"],
        "properties": { "id": { "type": "integer" } }
    });
    let found = violations(schema, json!("not an object"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ViolationKind::Type);
    assert_eq!(found[0].expected, "object");
    assert_eq!(found[0].actual, "string");

    let found = violations(json!({ "items": { "type": "string" } }), json!({ "a": 1 }));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].expected, "array");
}

#[test]
fn declared_type_governs_structural_keywords() {
    let schema = json!({
        "type": ["object", "null"],
        "required": ["id"],
        "properties": { "id": { "type": "integer" } }
    });
    assert!(matches(schema.clone(), json!(null)));

    let found = violations(schema, json!(5));
    assert_eq!(found.len(), 1, "type mismatch must not be reported twice");
}

// ---------------------------------------------------------------------------
// enum
// ---------------------------------------------------------------------------

#[test]
fn enum_uses_structural_equality() {
    let schema = json!({ "enum": [{ "a": 1, "b": [1, 2] }, "draft", 1] });

    assert!(matches(schema.clone(), json!({ "b": [1, 2], "a": 1 })));
    assert!(matches(schema.clone(), json!("draft")));
    assert!(matches(schema.clone(), json!(1.0)));
    assert!(!matches(schema.clone(), json!({ "a": 1, "b": [2, 1] })));
    assert!(!matches(schema.clone(), json!({ "a": 1 })));

    let found = violations(schema, json!("published"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ViolationKind::Enum);
    assert_eq!(found[0].actual, "\"published\"");
    assert!(found[0].expected.starts_with("one of ["), "{}", found[0].expected);
}

#[test]
fn one_value_can_collect_several_violations() {
    let found = violations(json!({ "type": "string", "enum": ["a", "b"] }), json!(5));
    let kinds: Vec<ViolationKind> = found.iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![ViolationKind::Type, ViolationKind::Enum]);
    assert!(found.iter().all(|v| v.path.is_root()));
}

// ---------------------------------------------------------------------------
// items
// ---------------------------------------------------------------------------

#[test]
fn items_apply_to_every_element() {
    let schema = json!({
        "type": "object",
        "properties": {
            "tags": { "type": "array", "items": { "type": "string" } }
        }
    });
    let found = violations(schema, json!({ "tags": ["a", 2, "c", null] }));
    assert_eq!(paths(&found), vec!["/tags/1", "/tags/3"]);
}

#[test]
fn positional_items_check_by_index() {
    let schema = json!({
        "type": "array",
        "items": [{ "type": "string" }, { "type": "integer" }]
    });
    assert!(matches(schema.clone(), json!(["a", 1])));
    assert!(matches(schema.clone(), json!(["a", 1, { "anything": true }])));
    assert_eq!(paths(&violations(schema, json!([1, "a"]))), vec!["/0", "/1"]);
}

#[test]
fn false_schema_rejects_any_value() {
    let schema = json!({ "type": "object", "properties": { "legacy": false } });
    assert!(matches(schema.clone(), json!({})));

    let found = violations(schema, json!({ "legacy": 1 }));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, ViolationKind::Rejected);
    assert_eq!(found[0].path.to_pointer(), "/legacy");
}

// ---------------------------------------------------------------------------
// Root-level arrays
// ---------------------------------------------------------------------------

#[test]
fn root_array_is_checked_per_element_against_an_item_schema() {
    let schema = json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "integer" } }
    });
    assert!(matches(schema.clone(), json!([{ "id": 1 }, { "id": 2 }])));
    assert!(matches(schema.clone(), json!([])));

    let found = violations(schema, json!([{ "id": 1 }, { "id": "2" }, {}]));
    assert_eq!(paths(&found), vec!["/1/id", "/2/id"]);
}

#[test]
fn root_array_against_an_array_schema_is_checked_as_a_whole() {
    let schema = json!({
        "$ref": "#/definitions/list",
        "definitions": {
            "list": { "type": "array", "items": { "type": "integer" } }
        }
    });
    assert!(matches(schema.clone(), json!([1, 2])));
    assert_eq!(paths(&violations(schema, json!([1, "x"]))), vec!["/1"]);
}

// ---------------------------------------------------------------------------
// $ref
// ---------------------------------------------------------------------------

#[test]
fn references_are_transparent() {
    let inline = json!({
        "type": "object",
        "required": ["user"],
        "properties": {
            "user": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "role": { "enum": ["admin", "member"] }
                }
            }
        }
    });
    let referenced = json!({
        "type": "object",
        "required": ["user"],
        "properties": { "user": { "$ref": "#/definitions/user" } },
        "definitions": {
            "user": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "role": { "$ref": "#/definitions/role" }
                }
            },
            "role": { "enum": ["admin", "member"] }
        }
    });

    let bodies = [
        json!({}),
        json!({ "user": {} }),
        json!({ "user": { "name": "ada" } }),
        json!({ "user": { "name": 1, "role": "owner" } }),
        json!({ "user": { "name": "ada", "role": "admin" } }),
        json!({ "user": "ada" }),
    ];
    for body in bodies {
        assert_eq!(
            violations(inline.clone(), body.clone()),
            violations(referenced.clone(), body.clone()),
            "ref and inline schemas disagree on {body}"
        );
    }
}

#[test]
fn reference_nodes_ignore_sibling_keywords() {
    let schema = json!({
        "type": "object",
        "properties": {
            "id": { "$ref": "#/definitions/id", "type": "string" }
        },
        "definitions": { "id": { "type": "integer" } }
    });
    assert!(matches(schema, json!({ "id": 1 })));
}

#[test]
fn reference_chains_are_followed() {
    let schema = json!({
        "type": "object",
        "properties": { "id": { "$ref": "#/definitions/a" } },
        "definitions": {
            "a": { "$ref": "#/definitions/b" },
            "b": { "$ref": "#/definitions/c" },
            "c": { "type": "integer" }
        }
    });
    assert!(matches(schema.clone(), json!({ "id": 1 })));
    assert!(!matches(schema, json!({ "id": "1" })));
}

#[test]
fn self_referential_schemas_validate_nested_data() {
    let schema = json!({
        "$ref": "#/definitions/node",
        "definitions": {
            "node": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "children": { "type": "array", "items": { "$ref": "#/definitions/node" } }
                }
            }
        }
    });

    let valid = json!({
        "name": "root",
        "children": [{ "name": "a", "children": [{ "name": "b" }] }, { "name": "c" }]
    });
    assert!(matches(schema.clone(), valid));

    let invalid = json!({
        "name": "root",
        "children": [{ "name": "a", "children": [{ "name": 5 }] }]
    });
    assert_eq!(
        paths(&violations(schema, invalid)),
        vec!["/children/0/children/0/name"]
    );
}

#[test]
fn references_that_loop_without_consuming_input_are_cyclic() {
    let cases = [
        json!({ "$ref": "#" }),
        json!({
            "$ref": "#/definitions/a",
            "definitions": {
                "a": { "$ref": "#/definitions/b" },
                "b": { "$ref": "#/definitions/a" }
            }
        }),
        json!({
            "type": "object",
            "properties": { "x": { "$ref": "#/definitions/x" } },
            "definitions": { "x": { "$ref": "#/properties/x" } }
        }),
    ];
    for schema in cases {
        let document = doc(schema.clone());
        let err = Matcher::new(&document)
            .evaluate_value(&json!({ "x": 1 }))
            .unwrap_err();
        assert!(
            matches!(err, MatcherError::CyclicReference { .. }),
            "expected a cycle for {schema}, got {err}"
        );
    }
}

#[test]
fn cyclic_root_is_detected_for_array_bodies_too() {
    let document = doc(json!({ "$ref": "#" }));
    let err = Matcher::new(&document)
        .evaluate_value(&json!([1, 2]))
        .unwrap_err();
    assert!(matches!(err, MatcherError::CyclicReference { .. }), "got {err}");
}

#[test]
fn unresolved_references_fail_only_when_reached() {
    let document = doc(json!({
        "type": "object",
        "properties": { "a": { "$ref": "#/definitions/missing" } }
    }));
    let matcher = Matcher::new(&document);

    assert!(matcher.evaluate_value(&json!({})).unwrap().matches());

    let err = matcher.evaluate_value(&json!({ "a": 1 })).unwrap_err();
    match err {
        MatcherError::UnresolvedReference { reference, .. } => {
            assert_eq!(reference, "#/definitions/missing");
        }
        other => panic!("expected UnresolvedReference, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// Cross-document references
// ---------------------------------------------------------------------------

fn cross_document_store() -> SchemaStore {
    [
        SchemaDocument::from_value(
            "common/id",
            json!({ "definitions": { "id": { "type": "integer" } } }),
        )
        .unwrap(),
        SchemaDocument::from_value(
            "posts/post",
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "$ref": "../common/id.json#/definitions/id" },
                    "author": { "$ref": "https://example.com/schemas/author.json" }
                }
            }),
        )
        .unwrap(),
        SchemaDocument::from_value(
            "posts/index",
            json!({ "type": "array", "items": { "$ref": "post.json" } }),
        )
        .unwrap(),
        SchemaDocument::from_value(
            "author",
            json!({
                "$id": "https://example.com/schemas/author.json",
                "type": "object",
                "required": ["name"]
            }),
        )
        .unwrap(),
    ]
    .into_iter()
    .collect()
}

#[test]
fn references_to_other_documents_resolve_through_the_store() {
    let store = cross_document_store();
    let matcher = store.matcher("posts/index").unwrap();

    assert!(matcher
        .evaluate_value(&json!([{ "id": 1, "author": { "name": "ada" } }]))
        .unwrap()
        .matches());

    let result = matcher
        .evaluate_value(&json!([{ "id": "1", "author": {} }]))
        .unwrap();
    assert_eq!(paths(result.violations()), vec!["/0/id", "/0/author/name"]);
}

#[test]
fn references_to_unknown_documents_are_unresolved() {
    let store: SchemaStore = [SchemaDocument::from_value(
        "orphan",
        json!({ "type": "object", "properties": { "x": { "$ref": "nowhere.json" } } }),
    )
    .unwrap()]
    .into_iter()
    .collect();
    let err = store
        .matcher("orphan")
        .unwrap()
        .evaluate_value(&json!({ "x": 1 }))
        .unwrap_err();
    assert!(matches!(err, MatcherError::UnresolvedReference { .. }), "got {err}");
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[test]
fn one_store_serves_concurrent_validations() {
    let store = Arc::new(cross_document_store());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let body = if i % 2 == 0 {
                    json!([{ "id": i }])
                } else {
                    json!([{ "id": "x" }])
                };
                let matcher = store.matcher("posts/index").unwrap();
                (i, matcher.evaluate_value(&body).unwrap().matches())
            })
        })
        .collect();

    for handle in handles {
        let (i, matched) = handle.join().unwrap();
        assert_eq!(matched, i % 2 == 0, "thread {i}");
    }
}
