//! Concurrent declaration and resolution against one registry.

use crate::errors::ShapeError;
use crate::registry::ShapeRegistry;
use crate::types::{DeclarationKind, FieldType, ShapeState};
use rayon::prelude::*;
use std::collections::BTreeSet;

#[test]
fn test_parallel_disjoint_merges_of_one_name() {
    let registry = ShapeRegistry::new();
    let name = registry.intern("Config");

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|i| {
            let field = registry.intern(&format!("option_{i}"));
            registry.declare(name, DeclarationKind::MergeableNamed, [(field, FieldType::BOOLEAN)])
        })
        .collect();
    assert!(results.iter().all(Result::is_ok));

    let id = registry.lookup(name).expect("declared");
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.keys_of(id).expect("keys").len(), 64);
}

#[test]
fn test_parallel_unrelated_names() {
    let registry = ShapeRegistry::new();

    let ids: Vec<_> = (0..32)
        .into_par_iter()
        .map(|i| {
            let name = registry.intern(&format!("Shape{i}"));
            let field = registry.intern("value");
            registry
                .declare(name, DeclarationKind::MergeableNamed, [(field, FieldType::NUMBER)])
                .expect("declare")
        })
        .collect();

    let unique: BTreeSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 32);
    ids.par_iter().for_each(|id| {
        assert_eq!(registry.keys_of(*id).expect("keys").len(), 1);
    });
}

#[test]
fn test_declarations_racing_resolution_are_all_or_nothing() {
    let registry = ShapeRegistry::new();
    let name = registry.intern("Race");
    let seed = registry.intern("seed");
    let id = registry
        .declare(name, DeclarationKind::MergeableNamed, [(seed, FieldType::STRING)])
        .expect("declare");

    let (accepted, resolved) = rayon::join(
        || {
            (0..128)
                .into_par_iter()
                .filter_map(|i| {
                    let field = registry.intern(&format!("f{i}"));
                    match registry.declare(
                        name,
                        DeclarationKind::MergeableNamed,
                        [(field, FieldType::NUMBER)],
                    ) {
                        Ok(_) => Some(field),
                        Err(ShapeError::ShapeFrozen { .. }) => None,
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                })
                .collect::<BTreeSet<_>>()
        },
        || registry.resolve(id).expect("resolve"),
    );

    // Every accepted declaration is part of the resolved shape and nothing else is.
    let object = resolved.as_object().expect("object");
    let mut expected = accepted;
    expected.insert(seed);
    let actual: BTreeSet<_> = object.fields.keys().copied().collect();
    assert_eq!(actual, expected);
    assert_eq!(registry.state_of(id), Some(ShapeState::Resolved));
}

#[test]
fn test_parallel_resolves_agree() {
    let registry = ShapeRegistry::new();
    let name = registry.intern("Shared");
    let id = registry
        .declare(
            name,
            DeclarationKind::MergeableNamed,
            [(registry.intern("a"), FieldType::STRING)],
        )
        .expect("declare");

    let shapes: Vec<_> = (0..16)
        .into_par_iter()
        .map(|_| registry.resolve(id).expect("resolve"))
        .collect();
    assert!(shapes.windows(2).all(|w| w[0] == w[1]));
}
