use super::*;
use crate::types::{FieldMap, ObjectShape, PrimitiveKind, UnionShape};
use rustc_hash::FxBuildHasher;

fn dog(interner: &ShardedInterner) -> ResolvedShape {
    let mut fields = FieldMap::default();
    fields.insert(interner.intern("name"), FieldType::STRING);
    fields.insert(interner.intern("breed"), FieldType::STRING);
    ResolvedShape::Object(Arc::new(ObjectShape::named(interner.intern("Dog"), fields)))
}

fn cat(interner: &ShardedInterner) -> ResolvedShape {
    let mut fields = FieldMap::default();
    fields.insert(interner.intern("name"), FieldType::STRING);
    fields.insert(interner.intern("whiskers"), FieldType::NUMBER);
    ResolvedShape::Object(Arc::new(ObjectShape::named(interner.intern("Cat"), fields)))
}

fn pet(interner: &ShardedInterner) -> ResolvedShape {
    ResolvedShape::Union(Arc::new(UnionShape {
        name: Some(interner.intern("Pet")),
        members: vec![cat(interner), dog(interner)],
    }))
}

#[test]
fn test_validate_key_returns_field_type() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = dog(&interner);

    assert_eq!(
        validator.validate_key(&shape, interner.intern("breed")),
        Ok(FieldType::STRING)
    );
}

#[test]
fn test_validate_key_rejects_unknown_key() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = dog(&interner);

    assert_eq!(
        validator.validate_key(&shape, interner.intern("wings")),
        Err(ShapeError::InvalidKey {
            shape: Arc::from("Dog"),
            key: Arc::from("wings"),
        })
    );
}

#[test]
fn test_validate_key_on_union_common_policy() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = pet(&interner);

    assert_eq!(
        validator.validate_key(&shape, interner.intern("name")),
        Ok(FieldType::STRING)
    );
    assert_eq!(
        validator.validate_key(&shape, interner.intern("whiskers")),
        Err(ShapeError::InvalidKey {
            shape: Arc::from("Pet"),
            key: Arc::from("whiskers"),
        })
    );
}

#[test]
fn test_validate_key_on_union_any_policy() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner).with_policy(UnionKeyPolicy::Any);
    let shape = pet(&interner);

    assert_eq!(
        validator.validate_key(&shape, interner.intern("whiskers")),
        Ok(FieldType::NUMBER)
    );
}

#[test]
fn test_union_field_type_is_union_of_members() {
    let interner = ShardedInterner::new();
    let mut a = FieldMap::default();
    a.insert(interner.intern("id"), FieldType::STRING);
    let mut b = FieldMap::default();
    b.insert(interner.intern("id"), FieldType::NUMBER);
    let shape = ResolvedShape::Union(Arc::new(UnionShape {
        name: None,
        members: vec![ResolvedShape::object(a), ResolvedShape::object(b)],
    }));

    let ty = field_type_of(&shape, interner.intern("id"), UnionKeyPolicy::Common);
    assert_eq!(
        ty,
        Some(FieldType::Union(vec![FieldType::STRING, FieldType::NUMBER]))
    );
}

#[test]
fn test_validate_key_on_primitive_uses_keyword() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = ResolvedShape::Primitive(PrimitiveKind::Number);

    assert_eq!(
        validator.validate_key(&shape, interner.intern("length")),
        Err(ShapeError::InvalidKey {
            shape: Arc::from("number"),
            key: Arc::from("length"),
        })
    );
}

#[test]
fn test_access_value_reads_present_key() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = dog(&interner);

    let mut value: IndexMap<Atom, &str, FxBuildHasher> = IndexMap::default();
    value.insert(interner.intern("name"), "Rex");
    value.insert(interner.intern("breed"), "Lab");

    assert_eq!(
        validator.access_value(&value, &shape, interner.intern("breed")),
        Ok(&"Lab")
    );
}

#[test]
fn test_access_value_missing_value() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = dog(&interner);

    let mut value: HashMap<Atom, u32> = HashMap::new();
    value.insert(interner.intern("name"), 1);

    assert_eq!(
        validator.access_value(&value, &shape, interner.intern("breed")),
        Err(ShapeError::MissingValue {
            key: Arc::from("breed")
        })
    );
}

#[test]
fn test_access_value_invalid_key_wins_over_missing() {
    let interner = ShardedInterner::new();
    let validator = AccessValidator::new(&interner);
    let shape = dog(&interner);
    let value: HashMap<Atom, u32> = HashMap::new();

    let err = validator
        .access_value(&value, &shape, interner.intern("wings"))
        .expect_err("invalid key");
    assert_eq!(err.code(), "InvalidKey");
}
