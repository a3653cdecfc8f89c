//! Key derivation (`keyof`) over resolved shapes.
//!
//! - Object: every field name, in declaration order.
//! - Union: under `UnionKeyPolicy::Common`, the keys present in every
//!   member, in the first member's order; under `UnionKeyPolicy::Any`, the
//!   keys present in some member, in order of first appearance.
//! - Primitive and literal shapes have no keys.
//!
//! Intersections never reach this module as such: the algebra flattens them
//! into objects (or unions of objects), whose key set is the union of the
//! members' key sets.

use crate::types::{ResolvedShape, UnionKeyPolicy};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use shapeck_common::interner::Atom;

/// Keys of `shape` under the conservative union policy.
pub fn keys_of(shape: &ResolvedShape) -> Vec<Atom> {
    keys_of_with_policy(shape, UnionKeyPolicy::Common)
}

pub fn keys_of_with_policy(shape: &ResolvedShape, policy: UnionKeyPolicy) -> Vec<Atom> {
    match shape {
        ResolvedShape::Object(object) => object.fields.keys().copied().collect(),
        ResolvedShape::Union(union) => match policy {
            UnionKeyPolicy::Common => {
                let Some((first, rest)) = union.members.split_first() else {
                    return Vec::new();
                };
                keys_of_with_policy(first, policy)
                    .into_iter()
                    .filter(|key| rest.iter().all(|m| has_key(m, *key, policy)))
                    .collect()
            }
            UnionKeyPolicy::Any => {
                let mut keys: IndexSet<Atom, FxBuildHasher> = IndexSet::default();
                for member in &union.members {
                    keys.extend(keys_of_with_policy(member, policy));
                }
                keys.into_iter().collect()
            }
        },
        ResolvedShape::Primitive(_) | ResolvedShape::Literal(_) => Vec::new(),
    }
}

/// Membership test consistent with [`keys_of_with_policy`].
pub fn has_key(shape: &ResolvedShape, key: Atom, policy: UnionKeyPolicy) -> bool {
    match shape {
        ResolvedShape::Object(object) => object.fields.contains_key(&key),
        ResolvedShape::Union(union) => match policy {
            UnionKeyPolicy::Common => {
                !union.members.is_empty() && union.members.iter().all(|m| has_key(m, key, policy))
            }
            UnionKeyPolicy::Any => union.members.iter().any(|m| has_key(m, key, policy)),
        },
        ResolvedShape::Primitive(_) | ResolvedShape::Literal(_) => false,
    }
}

#[cfg(test)]
#[path = "../tests/keyof_tests.rs"]
mod tests;
