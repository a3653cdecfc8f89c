use super::config::{Declaration, FieldExprs, TypeExpr};
use super::lower::Lowering;
use serde_json::json;
use shapeck_solver::{DeclarationKind, FieldType, ShapeError, ShapeRegistry, ShapeState};

fn name(s: &str) -> TypeExpr {
    TypeExpr::Name(s.to_string())
}

#[test]
fn lowers_keywords_and_references() {
    let registry = ShapeRegistry::new();
    let lowering = Lowering::new(&registry);

    assert_eq!(lowering.lower_type(&name("string")).expect("lower"), FieldType::STRING);
    assert_eq!(lowering.lower_type(&name("never")).expect("lower"), FieldType::NEVER);

    let FieldType::Reference(id) = lowering.lower_type(&name("Owner")).expect("lower") else {
        panic!("expected a reference");
    };
    assert_eq!(registry.state_of(id), Some(ShapeState::Pending));
}

#[test]
fn lowers_literals() {
    let registry = ShapeRegistry::new();
    let lowering = Lowering::new(&registry);

    assert_eq!(
        lowering
            .lower_type(&TypeExpr::Literal { literal: json!("on") })
            .expect("lower"),
        FieldType::string_literal(registry.intern("on"))
    );
    assert_eq!(
        lowering
            .lower_type(&TypeExpr::Literal { literal: json!(2.5) })
            .expect("lower"),
        FieldType::number_literal(2.5)
    );
    assert_eq!(
        lowering
            .lower_type(&TypeExpr::Literal { literal: json!(true) })
            .expect("lower"),
        FieldType::boolean_literal(true)
    );
    assert!(
        lowering
            .lower_type(&TypeExpr::Literal { literal: json!(null) })
            .is_err()
    );
}

#[test]
fn lowers_nested_unions() {
    let registry = ShapeRegistry::new();
    let lowering = Lowering::new(&registry);
    let expr = TypeExpr::Union {
        union: vec![name("string"), name("null")],
    };

    assert_eq!(
        lowering.lower_type(&expr).expect("lower"),
        FieldType::Union(vec![FieldType::STRING, FieldType::NULL])
    );
}

#[test]
fn declares_interfaces_and_aliases() {
    let registry = ShapeRegistry::new();
    let lowering = Lowering::new(&registry);

    let mut fields = FieldExprs::new();
    fields.insert("name".to_string(), name("string"));
    let animal = lowering
        .declare(&Declaration::Interface {
            interface: "Animal".to_string(),
            extends: vec![],
            fields,
        })
        .expect("well formed")
        .expect("declared");
    assert_eq!(registry.kind_of(animal), Some(DeclarationKind::MergeableNamed));

    let status = lowering
        .declare(&Declaration::Alias {
            name: "Status".to_string(),
            fields: None,
            body: Some(TypeExpr::Literal { literal: json!("active") }),
        })
        .expect("well formed")
        .expect("declared");
    assert_eq!(registry.kind_of(status), Some(DeclarationKind::SingleAliased));

    let again = lowering
        .declare(&Declaration::Alias {
            name: "Status".to_string(),
            fields: None,
            body: Some(name("string")),
        })
        .expect("well formed");
    assert_eq!(
        again,
        Err(ShapeError::DuplicateAlias {
            name: "Status".into()
        })
    );
}

#[test]
fn alias_needs_exactly_one_of_fields_or_body() {
    let registry = ShapeRegistry::new();
    let lowering = Lowering::new(&registry);

    let neither = Declaration::Alias {
        name: "Empty".to_string(),
        fields: None,
        body: None,
    };
    assert!(lowering.declare(&neither).is_err());

    let both = Declaration::Alias {
        name: "Both".to_string(),
        fields: Some(FieldExprs::new()),
        body: Some(name("string")),
    };
    assert!(lowering.declare(&both).is_err());
}
