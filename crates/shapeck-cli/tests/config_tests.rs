use super::config::{
    Declaration, DeclarationFile, FileOptions, Query, TypeExpr, UnionKeys, load_declarations,
    parse_declarations, resolve_policy,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use shapeck_solver::UnionKeyPolicy;
use std::io::Write;

#[test]
fn parses_declarations_in_order() {
    let file = parse_declarations(
        r#"{
            "declarations": [
                { "interface": "Animal", "fields": { "name": "string", "age": "number" } },
                { "interface": "Dog", "extends": ["Animal"], "fields": { "breed": "string" } },
                { "type": "Point", "fields": { "x": "number" } }
            ]
        }"#,
    )
    .expect("parse");

    assert_eq!(file.declarations.len(), 3);
    let Declaration::Interface { interface, fields, .. } = &file.declarations[0] else {
        panic!("expected an interface");
    };
    assert_eq!(interface, "Animal");
    assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["name", "age"]);

    let Declaration::Interface { extends, .. } = &file.declarations[1] else {
        panic!("expected an interface");
    };
    assert_eq!(extends, &vec!["Animal".to_string()]);

    assert!(matches!(
        &file.declarations[2],
        Declaration::Alias { name, fields: Some(_), body: None } if name == "Point"
    ));
}

#[test]
fn parses_type_expressions() {
    let file = parse_declarations(
        r#"{
            "declarations": [
                { "type": "Status", "body": { "union": [ { "literal": "active" }, { "literal": 1 } ] } },
                { "type": "Both", "body": { "intersection": ["Named", "Aged"] } }
            ]
        }"#,
    )
    .expect("parse");

    assert_eq!(
        file.declarations[0],
        Declaration::Alias {
            name: "Status".to_string(),
            fields: None,
            body: Some(TypeExpr::Union {
                union: vec![
                    TypeExpr::Literal { literal: json!("active") },
                    TypeExpr::Literal { literal: json!(1) },
                ]
            }),
        }
    );
    assert_eq!(
        file.declarations[1],
        Declaration::Alias {
            name: "Both".to_string(),
            fields: None,
            body: Some(TypeExpr::Intersection {
                intersection: vec![
                    TypeExpr::Name("Named".to_string()),
                    TypeExpr::Name("Aged".to_string()),
                ]
            }),
        }
    );
}

#[test]
fn parses_queries() {
    let file = parse_declarations(
        r#"{
            "queries": [
                { "keysOf": "Dog" },
                { "validateKey": { "shape": "Person", "key": "address" } },
                { "accessValue": { "shape": "Person", "key": "name", "value": { "name": "Ada" } } },
                { "matches": { "shape": "Dog", "value": 3 } },
                { "isSubtype": { "source": "Dog", "target": "Animal" } }
            ]
        }"#,
    )
    .expect("parse");

    let labels: Vec<String> = file.queries.iter().map(Query::label).collect();
    assert_eq!(
        labels,
        vec![
            "keysOf(Dog)",
            "validateKey(Person, address)",
            "accessValue(Person, name)",
            "matches(Dog)",
            "isSubtype(Dog, Animal)",
        ]
    );
}

#[test]
fn empty_file_is_valid() {
    let file = parse_declarations("{}").expect("parse");
    assert!(file.declarations.is_empty());
    assert!(file.queries.is_empty());
    assert_eq!(file.options.union_keys, None);
}

#[test]
fn rejects_malformed_json() {
    let err = parse_declarations("{ \"declarations\": [ { \"interface\": 3 } ] }")
        .expect_err("invalid");
    assert!(err.to_string().contains("invalid declaration file"));
}

#[test]
fn cli_flag_overrides_file_option() {
    let file = FileOptions {
        union_keys: Some(UnionKeys::Any),
    };
    assert_eq!(resolve_policy(&file, None), UnionKeyPolicy::Any);
    assert_eq!(
        resolve_policy(&file, Some(UnionKeys::Common)),
        UnionKeyPolicy::Common
    );
    assert_eq!(
        resolve_policy(&FileOptions::default(), None),
        UnionKeyPolicy::Common
    );
}

#[test]
fn loads_from_disk() {
    let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        tmp,
        r#"{{ "options": {{ "unionKeys": "any" }}, "queries": [ {{ "keysOf": "A" }} ] }}"#
    )
    .expect("write");

    let file: DeclarationFile = load_declarations(tmp.path()).expect("load");
    assert_eq!(file.options.union_keys, Some(UnionKeys::Any));
    assert_eq!(file.queries, vec![Query::KeysOf("A".to_string())]);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nope.json");
    let err = load_declarations(&path).expect_err("missing");
    assert!(format!("{err:#}").contains("nope.json"));
}
