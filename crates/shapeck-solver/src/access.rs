//! Access validation.
//!
//! A key is a legal accessor for a shape exactly when it is part of the
//! shape's derived key set (see `keyof`), under the same union policy.

use crate::errors::{ShapeError, ShapeResult};
use crate::keyof::has_key;
use crate::types::{FieldType, ResolvedShape, UnionKeyPolicy};
use indexmap::IndexMap;
use shapeck_common::interner::{Atom, ShardedInterner};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

/// A concrete value viewed as a mapping from field name to field value.
pub trait FieldValues {
    type Value;

    fn field(&self, key: Atom) -> Option<&Self::Value>;
}

impl<V, S: BuildHasher> FieldValues for IndexMap<Atom, V, S> {
    type Value = V;

    fn field(&self, key: Atom) -> Option<&V> {
        self.get(&key)
    }
}

impl<V, S: BuildHasher> FieldValues for HashMap<Atom, V, S> {
    type Value = V;

    fn field(&self, key: Atom) -> Option<&V> {
        self.get(&key)
    }
}

pub struct AccessValidator<'a> {
    interner: &'a ShardedInterner,
    policy: UnionKeyPolicy,
}

impl<'a> AccessValidator<'a> {
    pub fn new(interner: &'a ShardedInterner) -> Self {
        Self {
            interner,
            policy: UnionKeyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnionKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check that `key` is a legal accessor and return the field's type.
    ///
    /// On a union the returned type is the union of the member field types.
    pub fn validate_key(&self, shape: &ResolvedShape, key: Atom) -> ShapeResult<FieldType> {
        field_type_of(shape, key, self.policy).ok_or_else(|| ShapeError::InvalidKey {
            shape: self.display_name(shape),
            key: self.interner.resolve(key),
        })
    }

    /// Validate `key`, then read it from a concrete value.
    ///
    /// A value narrower than its declared shape is reported as
    /// `MissingValue`, never defaulted.
    pub fn access_value<'v, M>(
        &self,
        value: &'v M,
        shape: &ResolvedShape,
        key: Atom,
    ) -> ShapeResult<&'v M::Value>
    where
        M: FieldValues + ?Sized,
    {
        self.validate_key(shape, key)?;
        value.field(key).ok_or_else(|| ShapeError::MissingValue {
            key: self.interner.resolve(key),
        })
    }

    fn display_name(&self, shape: &ResolvedShape) -> Arc<str> {
        match shape.name() {
            Some(name) => self.interner.resolve(name),
            None => match shape {
                ResolvedShape::Primitive(kind) => Arc::from(kind.keyword()),
                _ => Arc::from("<anonymous>"),
            },
        }
    }
}

/// Type of `key` on `shape`, or `None` if `key` is not an accessor.
pub fn field_type_of(shape: &ResolvedShape, key: Atom, policy: UnionKeyPolicy) -> Option<FieldType> {
    match shape {
        ResolvedShape::Object(object) => object.field(key).cloned(),
        ResolvedShape::Union(union) => {
            if !has_key(shape, key, policy) {
                return None;
            }
            let member_types = union
                .members
                .iter()
                .filter_map(|member| field_type_of(member, key, policy));
            Some(FieldType::union_of(member_types))
        }
        ResolvedShape::Primitive(_) | ResolvedShape::Literal(_) => None,
    }
}

#[cfg(test)]
#[path = "../tests/access_tests.rs"]
mod tests;
