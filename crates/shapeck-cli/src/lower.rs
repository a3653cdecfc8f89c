//! Lowering from declaration-file syntax to registry calls.

use anyhow::{Result, bail};
use serde_json::Value;
use shapeck_solver::{
    Atom, DeclarationKind, FieldType, PrimitiveKind, ShapeId, ShapeRegistry, ShapeResult,
};

use crate::config::{Declaration, FieldExprs, TypeExpr};

pub struct Lowering<'a> {
    registry: &'a ShapeRegistry,
}

impl<'a> Lowering<'a> {
    pub fn new(registry: &'a ShapeRegistry) -> Self {
        Self { registry }
    }

    /// Lower a type expression.
    ///
    /// Names that are not primitive keywords become references; shapes that
    /// are declared later in the file get a forward-reference id.
    pub fn lower_type(&self, expr: &TypeExpr) -> Result<FieldType> {
        Ok(match expr {
            TypeExpr::Name(name) => match PrimitiveKind::from_keyword(name) {
                Some(kind) => FieldType::Primitive(kind),
                None => FieldType::Reference(self.registry.reference(self.registry.intern(name))),
            },
            TypeExpr::Literal { literal } => self.lower_literal(literal)?,
            TypeExpr::Union { union } => FieldType::Union(self.lower_all(union)?),
            TypeExpr::Intersection { intersection } => {
                FieldType::Intersection(self.lower_all(intersection)?)
            }
        })
    }

    fn lower_all(&self, exprs: &[TypeExpr]) -> Result<Vec<FieldType>> {
        exprs.iter().map(|e| self.lower_type(e)).collect()
    }

    fn lower_literal(&self, literal: &Value) -> Result<FieldType> {
        Ok(match literal {
            Value::String(s) => FieldType::string_literal(self.registry.intern(s)),
            Value::Bool(b) => FieldType::boolean_literal(*b),
            Value::Number(n) => match n.as_f64() {
                Some(n) => FieldType::number_literal(n),
                None => bail!("number literal {n} is out of range"),
            },
            other => bail!("unsupported literal: {other}"),
        })
    }

    pub fn lower_fields(&self, fields: &FieldExprs) -> Result<Vec<(Atom, FieldType)>> {
        fields
            .iter()
            .map(|(name, expr)| Ok((self.registry.intern(name), self.lower_type(expr)?)))
            .collect()
    }

    /// Apply one declaration to the registry.
    ///
    /// The outer `Result` is a malformed declaration; the inner one is the
    /// registry's verdict.
    pub fn declare(&self, declaration: &Declaration) -> Result<ShapeResult<ShapeId>> {
        let registry = self.registry;
        match declaration {
            Declaration::Interface {
                interface,
                extends,
                fields,
            } => {
                let name = registry.intern(interface);
                let fields = self.lower_fields(fields)?;
                if extends.is_empty() {
                    Ok(registry.declare(name, DeclarationKind::MergeableNamed, fields))
                } else {
                    let parents: Vec<Atom> = extends.iter().map(|p| registry.intern(p)).collect();
                    Ok(registry.extend(name, &parents, fields))
                }
            }
            Declaration::Alias { name, fields, body } => {
                let atom = registry.intern(name);
                match (fields, body) {
                    (Some(fields), None) => Ok(registry.declare(
                        atom,
                        DeclarationKind::SingleAliased,
                        self.lower_fields(fields)?,
                    )),
                    (None, Some(body)) => Ok(registry.declare_alias(atom, self.lower_type(body)?)),
                    (Some(_), Some(_)) => {
                        bail!("type `{name}` has both `fields` and `body`")
                    }
                    (None, None) => bail!("type `{name}` needs either `fields` or `body`"),
                }
            }
        }
    }
}
