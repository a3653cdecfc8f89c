//! Structural subtyping between field types and resolved shapes.
//!
//! `S <: T` holds when every value of `S` is a value of `T`:
//! - `any` and `unknown` are top types, `never` (and `any`) are bottom types.
//! - A union source must have every member below the target; a union
//!   target needs one member above the source.
//! - An intersection target needs the source below every member.
//! - Objects use width subtyping: every target field must exist on the
//!   source with a subtype, unless the target field admits `undefined`.
//! - A literal is below its primitive.
//!
//! Named references are compared coinductively: re-entering a pair that is
//! already under comparison assumes it holds, which is what makes recursive
//! shapes like `interface List { next: List | null }` comparable.

use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::registry::ShapeRegistry;
use crate::types::{FieldType, PrimitiveKind, ResolvedShape, ShapeId};
use shapeck_common::limits::MAX_RELATION_DEPTH;
use tracing::trace;

pub struct SubtypeChecker<'a> {
    registry: &'a ShapeRegistry,
    guard: RecursionGuard<(ShapeId, ShapeId)>,
    expansion_depth: u32,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(registry: &'a ShapeRegistry) -> Self {
        Self {
            registry,
            guard: RecursionGuard::with_profile(RecursionProfile::Relation),
            expansion_depth: 0,
        }
    }

    /// Mutual subtyping.
    pub fn are_identical(&mut self, a: &FieldType, b: &FieldType) -> bool {
        self.is_subtype_of(a, b) && self.is_subtype_of(b, a)
    }

    pub fn is_subtype_of(&mut self, source: &FieldType, target: &FieldType) -> bool {
        if source.is_identical(target) {
            return true;
        }

        match (source, target) {
            (_, FieldType::Primitive(kind)) if kind.is_top() => true,
            (FieldType::Primitive(PrimitiveKind::Any | PrimitiveKind::Never), _) => true,
            (FieldType::Union(members), _) => members.iter().all(|m| self.is_subtype_of(m, target)),
            (_, FieldType::Intersection(members)) => {
                members.iter().all(|m| self.is_subtype_of(source, m))
            }
            (_, FieldType::Union(members)) => {
                members.iter().any(|m| self.is_subtype_of(source, m))
                    || self.compare_expanded(source, target)
            }
            (FieldType::Literal(lit), FieldType::Primitive(kind)) => lit.primitive() == *kind,
            (FieldType::Reference(a), FieldType::Reference(b)) => self.compare_references(*a, *b),
            (FieldType::Reference(_) | FieldType::Intersection(_), _)
            | (_, FieldType::Reference(_)) => self.compare_expanded(source, target),
            _ => false,
        }
    }

    pub fn is_shape_subtype(&mut self, source: &ResolvedShape, target: &ResolvedShape) -> bool {
        match (source, target) {
            (_, ResolvedShape::Primitive(kind)) if kind.is_top() => true,
            (ResolvedShape::Primitive(PrimitiveKind::Any | PrimitiveKind::Never), _) => true,
            (ResolvedShape::Union(union), _) => union
                .members
                .iter()
                .all(|m| self.is_shape_subtype(m, target)),
            (_, ResolvedShape::Union(union)) => union
                .members
                .iter()
                .any(|m| self.is_shape_subtype(source, m)),
            (ResolvedShape::Object(s), ResolvedShape::Object(t)) => {
                t.fields.iter().all(|(key, target_ty)| match s.fields.get(key) {
                    Some(source_ty) => self.is_subtype_of(source_ty, target_ty),
                    None => target_ty.admits_undefined(),
                })
            }
            (ResolvedShape::Literal(lit), ResolvedShape::Primitive(kind)) => {
                lit.primitive() == *kind
            }
            (ResolvedShape::Literal(a), ResolvedShape::Literal(b)) => a == b,
            (ResolvedShape::Primitive(a), ResolvedShape::Primitive(b)) => a == b,
            _ => false,
        }
    }

    fn compare_references(&mut self, source: ShapeId, target: ShapeId) -> bool {
        if source == target {
            return true;
        }
        let pair = (source, target);
        match self.guard.enter(pair) {
            RecursionResult::Entered => {
                let result = match (self.registry.resolve(source), self.registry.resolve(target)) {
                    (Ok(s), Ok(t)) => self.is_shape_subtype(&s, &t),
                    _ => false,
                };
                self.guard.leave(pair);
                result
            }
            RecursionResult::Cycle => {
                trace!(source = source.0, target = target.0, "assuming related on cycle");
                true
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => false,
        }
    }

    /// Resolve both sides through the registry and compare the shapes.
    fn compare_expanded(&mut self, source: &FieldType, target: &FieldType) -> bool {
        if self.expansion_depth >= MAX_RELATION_DEPTH {
            return false;
        }
        let (Ok(s), Ok(t)) = (
            self.registry.resolve_type(source),
            self.registry.resolve_type(target),
        ) else {
            return false;
        };
        self.expansion_depth += 1;
        let result = self.is_shape_subtype(&s, &t);
        self.expansion_depth -= 1;
        result
    }
}

/// Is the named shape `source` a structural subtype of `target`?
pub fn is_shape_subtype_of(registry: &ShapeRegistry, source: ShapeId, target: ShapeId) -> bool {
    SubtypeChecker::new(registry)
        .is_subtype_of(&FieldType::Reference(source), &FieldType::Reference(target))
}

#[cfg(test)]
#[path = "../tests/relation_tests.rs"]
mod tests;
