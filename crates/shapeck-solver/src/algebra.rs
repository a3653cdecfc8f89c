//! Shape algebra: extension, union and intersection.
//!
//! Pure computations over resolved shapes. Nothing here touches the
//! registry; the interner is only needed to name the key in an
//! `IncompatibleIntersection` error.
//!
//! Rules:
//! - Extension: the child beats every parent, an earlier parent beats a
//!   later one. Parent fields come first in key order.
//! - Union: nested unions flatten, structurally equal members collapse.
//! - Intersection: objects merge key-wise, shared keys intersect their field
//!   types recursively, unions distribute over the other operand. A union
//!   member that cannot be intersected fails the whole intersection.

use crate::errors::{ShapeError, ShapeResult};
use crate::types::{
    FieldMap, FieldType, ObjectShape, PrimitiveKind, ResolvedShape, UnionShape,
};
use shapeck_common::interner::{Atom, ShardedInterner};
use std::sync::Arc;
use tracing::trace;

pub struct ShapeAlgebra<'a> {
    interner: &'a ShardedInterner,
}

impl<'a> ShapeAlgebra<'a> {
    pub fn new(interner: &'a ShardedInterner) -> Self {
        Self { interner }
    }

    /// Combine parent fields with a child's own fields.
    ///
    /// Parents are applied left to right; a parent field is only added when
    /// no earlier parent provided it. Own fields always win, keeping the
    /// position of the parent field they override.
    pub fn extend_fields(&self, parents: &[Arc<ObjectShape>], own: &FieldMap) -> FieldMap {
        let mut merged = FieldMap::default();
        for parent in parents {
            for (key, ty) in &parent.fields {
                if !merged.contains_key(key) {
                    merged.insert(*key, ty.clone());
                }
            }
        }
        for (key, ty) in own {
            merged.insert(*key, ty.clone());
        }
        merged
    }

    /// Union of resolved shapes.
    pub fn union(&self, members: Vec<ResolvedShape>) -> ShapeResult<ResolvedShape> {
        if members.is_empty() {
            return Err(ShapeError::EmptyAlgebra);
        }

        let mut flat: Vec<ResolvedShape> = Vec::with_capacity(members.len());
        for member in members {
            match member {
                ResolvedShape::Union(inner) => {
                    for nested in &inner.members {
                        if !flat.contains(nested) {
                            flat.push(nested.clone());
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }

        if flat.len() == 1 {
            if let Some(only) = flat.pop() {
                return Ok(only);
            }
        }
        trace!(members = flat.len(), "ShapeAlgebra::union");
        Ok(ResolvedShape::Union(Arc::new(UnionShape {
            name: None,
            members: flat,
        })))
    }

    /// Intersection of resolved shapes.
    pub fn intersection(&self, members: Vec<ResolvedShape>) -> ShapeResult<ResolvedShape> {
        let mut members = members.into_iter();
        let Some(mut acc) = members.next() else {
            return Err(ShapeError::EmptyAlgebra);
        };
        for member in members {
            acc = self.intersect_pair(acc, member)?;
        }
        Ok(acc)
    }

    fn intersect_pair(&self, left: ResolvedShape, right: ResolvedShape) -> ShapeResult<ResolvedShape> {
        match (left, right) {
            (ResolvedShape::Primitive(PrimitiveKind::Unknown), other)
            | (other, ResolvedShape::Primitive(PrimitiveKind::Unknown)) => Ok(other),
            (ResolvedShape::Union(union), other) | (other, ResolvedShape::Union(union)) => {
                // (A | B) & C = (A & C) | (B & C); every branch must intersect.
                let branches = union
                    .members
                    .iter()
                    .map(|member| self.intersect_pair(member.clone(), other.clone()))
                    .collect::<ShapeResult<Vec<_>>>()?;
                self.union(branches)
            }
            // `any` keeps an object's fields; `never` against an object falls
            // through to the incompatible case below.
            (ResolvedShape::Object(object), ResolvedShape::Primitive(PrimitiveKind::Any))
            | (ResolvedShape::Primitive(PrimitiveKind::Any), ResolvedShape::Object(object)) => {
                Ok(ResolvedShape::Object(object))
            }
            (ResolvedShape::Object(a), ResolvedShape::Object(b)) => self.merge_objects(&a, &b),
            (left, right) => {
                let (Some(a), Some(b)) = (left.as_primitive_like(), right.as_primitive_like())
                else {
                    return Err(ShapeError::IncompatibleIntersection { key: None });
                };
                let merged = self.intersect_field_types(&a, &b, None)?;
                ResolvedShape::from_primitive_like(merged)
                    .ok_or(ShapeError::IncompatibleIntersection { key: None })
            }
        }
    }

    fn merge_objects(&self, a: &ObjectShape, b: &ObjectShape) -> ShapeResult<ResolvedShape> {
        let mut fields = a.fields.clone();
        for (key, ty) in &b.fields {
            match fields.get_mut(key) {
                Some(existing) => {
                    let merged = self.intersect_field_types(existing, ty, Some(*key))?;
                    *existing = merged;
                }
                None => {
                    fields.insert(*key, ty.clone());
                }
            }
        }
        Ok(ResolvedShape::object(fields))
    }

    /// Intersect two field types.
    ///
    /// Conflicting primitives and literals fail with
    /// `IncompatibleIntersection`. References are not expanded; an
    /// intersection involving them stays deferred as `FieldType::Intersection`.
    pub fn intersect_field_types(
        &self,
        a: &FieldType,
        b: &FieldType,
        key: Option<Atom>,
    ) -> ShapeResult<FieldType> {
        if a.is_identical(b) {
            return Ok(a.clone());
        }

        match (a, b) {
            (FieldType::Primitive(PrimitiveKind::Unknown), other)
            | (other, FieldType::Primitive(PrimitiveKind::Unknown)) => Ok(other.clone()),
            (FieldType::Primitive(PrimitiveKind::Never), _)
            | (_, FieldType::Primitive(PrimitiveKind::Never)) => Ok(FieldType::NEVER),
            (FieldType::Primitive(PrimitiveKind::Any), _)
            | (_, FieldType::Primitive(PrimitiveKind::Any)) => Ok(FieldType::ANY),
            (FieldType::Union(members), other) | (other, FieldType::Union(members)) => {
                let mut branches = Vec::with_capacity(members.len());
                let mut first_error = None;
                for member in members {
                    match self.intersect_field_types(member, other, key) {
                        Ok(branch) => branches.push(branch),
                        Err(err) => {
                            first_error.get_or_insert(err);
                        }
                    }
                }
                if branches.is_empty() {
                    return Err(first_error.unwrap_or_else(|| self.incompatible(key)));
                }
                Ok(FieldType::union_of(branches))
            }
            (FieldType::Primitive(p), FieldType::Literal(lit))
            | (FieldType::Literal(lit), FieldType::Primitive(p)) => {
                if lit.primitive() == *p {
                    Ok(FieldType::Literal(lit.clone()))
                } else {
                    Err(self.incompatible(key))
                }
            }
            (FieldType::Primitive(_), FieldType::Primitive(_))
            | (FieldType::Literal(_), FieldType::Literal(_)) => Err(self.incompatible(key)),
            _ => self.normalize_intersection([a.clone(), b.clone()], key),
        }
    }

    /// Flatten a deferred intersection, folding its primitive-like members.
    fn normalize_intersection(
        &self,
        members: impl IntoIterator<Item = FieldType>,
        key: Option<Atom>,
    ) -> ShapeResult<FieldType> {
        let mut primitive: Option<FieldType> = None;
        let mut deferred: Vec<FieldType> = Vec::new();

        let mut pending: Vec<FieldType> = members.into_iter().collect();
        pending.reverse();
        while let Some(member) = pending.pop() {
            match member {
                FieldType::Intersection(inner) => pending.extend(inner.into_iter().rev()),
                ty if ty.is_primitive_like() => {
                    primitive = Some(match primitive {
                        Some(existing) => self.intersect_field_types(&existing, &ty, key)?,
                        None => ty,
                    });
                }
                ty => {
                    if !deferred.iter().any(|d| d.is_identical(&ty)) {
                        deferred.push(ty);
                    }
                }
            }
        }

        if let Some(primitive) = primitive {
            if deferred.is_empty() {
                return Ok(primitive);
            }
            deferred.push(primitive);
        }
        Ok(match deferred.len() {
            0 => FieldType::UNKNOWN,
            1 => deferred.pop().unwrap_or(FieldType::UNKNOWN),
            _ => FieldType::Intersection(deferred),
        })
    }

    fn incompatible(&self, key: Option<Atom>) -> ShapeError {
        ShapeError::IncompatibleIntersection {
            key: key.map(|k| self.interner.resolve(k)),
        }
    }
}

#[cfg(test)]
#[path = "../tests/algebra_tests.rs"]
mod tests;
