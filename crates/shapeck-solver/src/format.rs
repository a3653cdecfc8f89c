//! Human-readable rendering of field types and resolved shapes.
//!
//! Output uses declaration syntax: `string | null`, `"active"`,
//! `Named & Aged`, `{ name: string; age: number }`. References print the
//! referenced shape's name and are never expanded.

use crate::registry::ShapeRegistry;
use crate::types::{FieldType, LiteralValue, ObjectShape, ResolvedShape};

pub struct TypeFormatter<'a> {
    registry: &'a ShapeRegistry,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(registry: &'a ShapeRegistry) -> Self {
        Self { registry }
    }

    pub fn format(&self, ty: &FieldType) -> String {
        match ty {
            FieldType::Primitive(kind) => kind.keyword().to_string(),
            FieldType::Literal(lit) => self.format_literal(lit),
            FieldType::Reference(id) => self.registry.display_name(*id).to_string(),
            FieldType::Union(members) => self.join(members, " | ", false),
            FieldType::Intersection(members) => self.join(members, " & ", true),
        }
    }

    /// Render a resolved shape. Named shapes print their name only.
    pub fn format_shape(&self, shape: &ResolvedShape) -> String {
        if let Some(name) = shape.name() {
            return self.registry.resolve_atom(name).to_string();
        }
        self.format_structure(shape)
    }

    /// Render a resolved shape's structure even when it carries a name.
    pub fn format_structure(&self, shape: &ResolvedShape) -> String {
        match shape {
            ResolvedShape::Object(object) => self.format_object(object),
            ResolvedShape::Union(union) => union
                .members
                .iter()
                .map(|m| self.format_shape(m))
                .collect::<Vec<_>>()
                .join(" | "),
            ResolvedShape::Primitive(kind) => kind.keyword().to_string(),
            ResolvedShape::Literal(lit) => self.format_literal(lit),
        }
    }

    fn format_object(&self, object: &ObjectShape) -> String {
        if object.is_empty() {
            return "{}".to_string();
        }
        let fields = object
            .fields
            .iter()
            .map(|(key, ty)| format!("{}: {}", self.registry.resolve_atom(*key), self.format(ty)))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{{ {fields} }}")
    }

    fn format_literal(&self, lit: &LiteralValue) -> String {
        match lit {
            LiteralValue::String(atom) => format!("{:?}", &*self.registry.resolve_atom(*atom)),
            LiteralValue::Number(n) => n.0.to_string(),
            LiteralValue::Boolean(b) => b.to_string(),
        }
    }

    fn join(&self, members: &[FieldType], separator: &str, parenthesize_unions: bool) -> String {
        if members.is_empty() {
            return "never".to_string();
        }
        members
            .iter()
            .map(|m| {
                let rendered = self.format(m);
                if parenthesize_unions && matches!(m, FieldType::Union(_)) {
                    format!("({rendered})")
                } else {
                    rendered
                }
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
