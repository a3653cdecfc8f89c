use super::*;
use crate::types::{FieldMap, FieldType, PrimitiveKind, UnionShape};
use shapeck_common::interner::ShardedInterner;
use std::sync::Arc;

fn object(interner: &ShardedInterner, keys: &[&str]) -> ResolvedShape {
    let fields: FieldMap = keys
        .iter()
        .map(|k| (interner.intern(k), FieldType::STRING))
        .collect();
    ResolvedShape::object(fields)
}

fn union(members: Vec<ResolvedShape>) -> ResolvedShape {
    ResolvedShape::Union(Arc::new(UnionShape {
        name: None,
        members,
    }))
}

fn names(interner: &ShardedInterner, keys: &[Atom]) -> Vec<String> {
    keys.iter().map(|k| interner.resolve(*k).to_string()).collect()
}

#[test]
fn test_object_keys_in_declaration_order() {
    let interner = ShardedInterner::new();
    let shape = object(&interner, &["name", "age", "breed"]);
    assert_eq!(names(&interner, &keys_of(&shape)), vec!["name", "age", "breed"]);
}

#[test]
fn test_empty_object_has_no_keys() {
    let interner = ShardedInterner::new();
    let shape = object(&interner, &[]);
    assert!(keys_of(&shape).is_empty());
}

#[test]
fn test_union_common_keys() {
    let interner = ShardedInterner::new();
    let cat = object(&interner, &["name", "whiskers"]);
    let dog = object(&interner, &["breed", "name"]);
    let shape = union(vec![cat, dog]);

    assert_eq!(names(&interner, &keys_of(&shape)), vec!["name"]);
    assert!(has_key(&shape, interner.intern("name"), UnionKeyPolicy::Common));
    assert!(!has_key(&shape, interner.intern("whiskers"), UnionKeyPolicy::Common));
}

#[test]
fn test_union_any_keys() {
    let interner = ShardedInterner::new();
    let cat = object(&interner, &["name", "whiskers"]);
    let dog = object(&interner, &["breed", "name"]);
    let shape = union(vec![cat, dog]);

    assert_eq!(
        names(&interner, &keys_of_with_policy(&shape, UnionKeyPolicy::Any)),
        vec!["name", "whiskers", "breed"]
    );
    assert!(has_key(&shape, interner.intern("whiskers"), UnionKeyPolicy::Any));
}

#[test]
fn test_union_with_primitive_member_has_no_common_keys() {
    let interner = ShardedInterner::new();
    let cat = object(&interner, &["name"]);
    let shape = union(vec![cat, ResolvedShape::Primitive(PrimitiveKind::String)]);

    assert!(keys_of(&shape).is_empty());
    assert_eq!(
        names(&interner, &keys_of_with_policy(&shape, UnionKeyPolicy::Any)),
        vec!["name"]
    );
}

#[test]
fn test_nested_union_keys() {
    let interner = ShardedInterner::new();
    let a = object(&interner, &["id", "a"]);
    let b = object(&interner, &["id", "b"]);
    let c = object(&interner, &["id", "c"]);
    let shape = union(vec![union(vec![a, b]), c]);

    assert_eq!(names(&interner, &keys_of(&shape)), vec!["id"]);
}

#[test]
fn test_primitive_has_no_keys() {
    let shape = ResolvedShape::Primitive(PrimitiveKind::Number);
    assert!(keys_of(&shape).is_empty());
    assert!(keys_of_with_policy(&shape, UnionKeyPolicy::Any).is_empty());
}
