//! Runtime value compatibility.
//!
//! Decides whether a JSON value structurally matches a field type or a
//! resolved shape. Objects may carry extra properties; a missing property
//! only matches a field whose type admits `undefined`.

use crate::registry::ShapeRegistry;
use crate::types::{FieldType, LiteralValue, PrimitiveKind, ResolvedShape};
use serde_json::Value;
use shapeck_common::limits::MAX_VALUE_DEPTH;

pub struct ValueChecker<'a> {
    registry: &'a ShapeRegistry,
}

impl<'a> ValueChecker<'a> {
    pub fn new(registry: &'a ShapeRegistry) -> Self {
        Self { registry }
    }

    pub fn matches_type(&self, ty: &FieldType, value: &Value) -> bool {
        self.type_matches(ty, value, 0)
    }

    pub fn matches_shape(&self, shape: &ResolvedShape, value: &Value) -> bool {
        self.shape_matches(shape, value, 0)
    }

    fn type_matches(&self, ty: &FieldType, value: &Value, depth: u32) -> bool {
        if depth > MAX_VALUE_DEPTH {
            return false;
        }
        match ty {
            FieldType::Primitive(kind) => primitive_matches(*kind, value),
            FieldType::Literal(lit) => self.literal_matches(lit, value),
            FieldType::Reference(id) => match self.registry.resolve(*id) {
                Ok(shape) => self.shape_matches(&shape, value, depth + 1),
                Err(_) => false,
            },
            FieldType::Union(members) => members
                .iter()
                .any(|m| self.type_matches(m, value, depth + 1)),
            FieldType::Intersection(members) => members
                .iter()
                .all(|m| self.type_matches(m, value, depth + 1)),
        }
    }

    fn shape_matches(&self, shape: &ResolvedShape, value: &Value, depth: u32) -> bool {
        if depth > MAX_VALUE_DEPTH {
            return false;
        }
        match shape {
            ResolvedShape::Object(object) => {
                let Some(map) = value.as_object() else {
                    return false;
                };
                object.fields.iter().all(|(key, ty)| {
                    let key = self.registry.resolve_atom(*key);
                    match map.get(&*key) {
                        Some(field) => self.type_matches(ty, field, depth + 1),
                        None => ty.admits_undefined(),
                    }
                })
            }
            ResolvedShape::Union(union) => union
                .members
                .iter()
                .any(|m| self.shape_matches(m, value, depth + 1)),
            ResolvedShape::Primitive(kind) => primitive_matches(*kind, value),
            ResolvedShape::Literal(lit) => self.literal_matches(lit, value),
        }
    }

    fn literal_matches(&self, lit: &LiteralValue, value: &Value) -> bool {
        match lit {
            LiteralValue::String(atom) => {
                value.as_str() == Some(&*self.registry.resolve_atom(*atom))
            }
            LiteralValue::Number(n) => value.as_f64() == Some(n.0),
            LiteralValue::Boolean(b) => value.as_bool() == Some(*b),
        }
    }
}

fn primitive_matches(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Number => value.is_number(),
        PrimitiveKind::Boolean => value.is_boolean(),
        PrimitiveKind::Null => value.is_null(),
        // A present JSON value is never `undefined`.
        PrimitiveKind::Undefined | PrimitiveKind::Never => false,
        PrimitiveKind::Any | PrimitiveKind::Unknown => true,
    }
}

#[cfg(test)]
#[path = "../tests/value_compat_tests.rs"]
mod tests;
