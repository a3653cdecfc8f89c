use super::*;
use shapeck_common::interner::ShardedInterner;

fn fields(entries: &[(Atom, FieldType)]) -> FieldMap {
    entries.iter().cloned().collect()
}

#[test]
fn test_shape_id_validity() {
    assert!(!ShapeId::INVALID.is_valid());
    assert!(ShapeId(1).is_valid());
    assert!(ShapeId(42).is_valid());
}

#[test]
fn test_state_accepts_declarations() {
    assert!(ShapeState::Pending.accepts_declarations());
    assert!(ShapeState::Unresolved.accepts_declarations());
    assert!(!ShapeState::Resolving.accepts_declarations());
    assert!(!ShapeState::Resolved.accepts_declarations());
    assert!(!ShapeState::Frozen.accepts_declarations());
}

#[test]
fn test_primitive_keywords() {
    for kind in [
        PrimitiveKind::String,
        PrimitiveKind::Number,
        PrimitiveKind::Boolean,
        PrimitiveKind::Null,
        PrimitiveKind::Undefined,
        PrimitiveKind::Any,
        PrimitiveKind::Unknown,
        PrimitiveKind::Never,
    ] {
        assert_eq!(PrimitiveKind::from_keyword(kind.keyword()), Some(kind));
    }
    assert_eq!(PrimitiveKind::from_keyword("Dog"), None);
    assert!(PrimitiveKind::Any.is_top());
    assert!(PrimitiveKind::Unknown.is_top());
    assert!(!PrimitiveKind::Never.is_top());
}

#[test]
fn test_ordered_float_normalizes_zero_and_nan() {
    assert_eq!(OrderedFloat(0.0), OrderedFloat(-0.0));
    assert_eq!(OrderedFloat(f64::NAN), OrderedFloat(f64::NAN));
    assert_ne!(OrderedFloat(1.0), OrderedFloat(2.0));
}

#[test]
fn test_literal_primitive() {
    let interner = ShardedInterner::new();
    let active = interner.intern("active");
    assert_eq!(
        LiteralValue::String(active).primitive(),
        PrimitiveKind::String
    );
    assert_eq!(
        LiteralValue::Number(OrderedFloat(3.0)).primitive(),
        PrimitiveKind::Number
    );
    assert_eq!(LiteralValue::Boolean(true).primitive(), PrimitiveKind::Boolean);
}

#[test]
fn test_union_of_flattens_and_dedups() {
    let nested = FieldType::Union(vec![FieldType::NUMBER, FieldType::STRING]);
    let ty = FieldType::union_of([FieldType::STRING, nested, FieldType::NEVER]);
    assert_eq!(ty, FieldType::Union(vec![FieldType::STRING, FieldType::NUMBER]));
}

#[test]
fn test_union_of_single_and_empty() {
    assert_eq!(FieldType::union_of([FieldType::STRING]), FieldType::STRING);
    assert_eq!(FieldType::union_of([]), FieldType::NEVER);
    assert_eq!(
        FieldType::union_of([FieldType::NEVER, FieldType::NEVER]),
        FieldType::NEVER
    );
}

#[test]
fn test_is_identical_ignores_union_order() {
    let a = FieldType::Union(vec![FieldType::STRING, FieldType::NUMBER]);
    let b = FieldType::Union(vec![FieldType::NUMBER, FieldType::STRING]);
    assert!(a.is_identical(&b));
    assert_ne!(a, b);
    assert!(!a.is_identical(&FieldType::STRING));
}

#[test]
fn test_admits_undefined() {
    assert!(FieldType::UNDEFINED.admits_undefined());
    assert!(FieldType::ANY.admits_undefined());
    assert!(FieldType::Union(vec![FieldType::STRING, FieldType::UNDEFINED]).admits_undefined());
    assert!(!FieldType::STRING.admits_undefined());
    assert!(!FieldType::Reference(ShapeId(1)).admits_undefined());
}

#[test]
fn test_object_shape_equality_ignores_name_and_order() {
    let interner = ShardedInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let point = interner.intern("Point");

    let a = ObjectShape::named(point, fields(&[(x, FieldType::NUMBER), (y, FieldType::NUMBER)]));
    let b = ObjectShape::anonymous(fields(&[(y, FieldType::NUMBER), (x, FieldType::NUMBER)]));
    assert_eq!(a, b);

    let c = ObjectShape::anonymous(fields(&[(x, FieldType::NUMBER)]));
    assert_ne!(a, c);
}

#[test]
fn test_with_name_relabels_objects_only() {
    let interner = ShardedInterner::new();
    let name = interner.intern("Cat");
    let x = interner.intern("x");

    let object = ResolvedShape::object(fields(&[(x, FieldType::STRING)])).with_name(name);
    assert_eq!(object.name(), Some(name));

    let primitive = ResolvedShape::Primitive(PrimitiveKind::String).with_name(name);
    assert_eq!(primitive.name(), None);
}

#[test]
fn test_primitive_like_round_trip() {
    let shape = ResolvedShape::from_primitive_like(FieldType::boolean_literal(true));
    assert_eq!(
        shape,
        Some(ResolvedShape::Literal(LiteralValue::Boolean(true)))
    );
    assert_eq!(
        ResolvedShape::from_primitive_like(FieldType::Reference(ShapeId(3))),
        None
    );
}
