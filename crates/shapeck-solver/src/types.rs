//! Shape data model.
//!
//! `FieldType` is the tagged representation of a field's type. Object shapes
//! map interned field names to field types in declaration order; resolved
//! shapes are what the registry hands out after merges and extension edges
//! have been flattened.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use shapeck_common::interner::Atom;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Ordered field table. Iteration order is declaration order.
pub type FieldMap = IndexMap<Atom, FieldType, FxBuildHasher>;

// =============================================================================
// ShapeId
// =============================================================================

/// Stable handle for a declared (named) shape.
///
/// Anonymous shapes produced by the algebra have no id and are compared by
/// content.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

impl ShapeId {
    /// Sentinel value for invalid `ShapeId`.
    pub const INVALID: Self = Self(0);

    /// First valid `ShapeId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `ShapeId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// How a name accepts further declarations.
///
/// | Kind | Redeclaration | Example |
/// |------|---------------|---------|
/// | MergeableNamed | merged field-by-field | `interface Point { x: number }` |
/// | SingleAliased | rejected | `type Status = "active" \| "inactive"` |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    MergeableNamed,
    SingleAliased,
}

/// Lifecycle of a named shape.
///
/// `Pending` ids are reserved by forward references and become `Unresolved`
/// on their first declaration. Only `Pending` and `Unresolved` shapes accept
/// merges; everything from `Resolving` on is immutable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeState {
    Pending,
    Unresolved,
    Resolving,
    Resolved,
    Frozen,
}

impl ShapeState {
    pub const fn accepts_declarations(self) -> bool {
        matches!(self, Self::Pending | Self::Unresolved)
    }
}

// =============================================================================
// Primitive and literal types
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
}

impl PrimitiveKind {
    /// Map a type keyword to its primitive kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "any" => Self::Any,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            _ => return None,
        })
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
        }
    }

    /// `any` and `unknown` accept every value.
    pub const fn is_top(self) -> bool {
        matches!(self, Self::Any | Self::Unknown)
    }
}

/// `f64` wrapper with bitwise equality so literals can be hashed.
///
/// `-0.0` is normalized to `0.0` and every NaN compares equal to every other.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0.0f64.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive a literal widens to.
    pub const fn primitive(&self) -> PrimitiveKind {
        match self {
            Self::String(_) => PrimitiveKind::String,
            Self::Number(_) => PrimitiveKind::Number,
            Self::Boolean(_) => PrimitiveKind::Boolean,
        }
    }
}

// =============================================================================
// FieldType
// =============================================================================

/// Type of a single field.
///
/// References point at named shapes through the registry arena, so recursive
/// shapes (`interface Node { next: Node }`) need no owning cycles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Reference(ShapeId),
    Union(Vec<FieldType>),
    Intersection(Vec<FieldType>),
    Literal(LiteralValue),
}

impl FieldType {
    pub const STRING: Self = Self::Primitive(PrimitiveKind::String);
    pub const NUMBER: Self = Self::Primitive(PrimitiveKind::Number);
    pub const BOOLEAN: Self = Self::Primitive(PrimitiveKind::Boolean);
    pub const NULL: Self = Self::Primitive(PrimitiveKind::Null);
    pub const UNDEFINED: Self = Self::Primitive(PrimitiveKind::Undefined);
    pub const ANY: Self = Self::Primitive(PrimitiveKind::Any);
    pub const UNKNOWN: Self = Self::Primitive(PrimitiveKind::Unknown);
    pub const NEVER: Self = Self::Primitive(PrimitiveKind::Never);

    pub const fn string_literal(value: Atom) -> Self {
        Self::Literal(LiteralValue::String(value))
    }

    pub const fn number_literal(value: f64) -> Self {
        Self::Literal(LiteralValue::Number(OrderedFloat(value)))
    }

    pub const fn boolean_literal(value: bool) -> Self {
        Self::Literal(LiteralValue::Boolean(value))
    }

    /// Build a normalized union: nested unions are flattened, identical
    /// members collapse, a single member stands for itself and an empty
    /// member list is `never`.
    pub fn union_of(members: impl IntoIterator<Item = FieldType>) -> FieldType {
        let mut flat: Vec<FieldType> = Vec::new();
        for member in members {
            match member {
                FieldType::Union(inner) => {
                    for nested in inner {
                        push_unique(&mut flat, nested);
                    }
                }
                FieldType::Primitive(PrimitiveKind::Never) => {}
                other => push_unique(&mut flat, other),
            }
        }
        match flat.len() {
            0 => FieldType::NEVER,
            1 => flat.pop().unwrap_or(FieldType::NEVER),
            _ => FieldType::Union(flat),
        }
    }

    /// Structural identity used by declaration merging.
    ///
    /// Union and intersection members are compared as sets, so
    /// `string | number` is identical to `number | string`.
    pub fn is_identical(&self, other: &FieldType) -> bool {
        match (self, other) {
            (Self::Union(a), Self::Union(b)) | (Self::Intersection(a), Self::Intersection(b)) => {
                same_member_set(a, b)
            }
            _ => self == other,
        }
    }

    /// Whether a missing field of this type is acceptable on a value.
    pub fn admits_undefined(&self) -> bool {
        match self {
            Self::Primitive(kind) => kind.is_top() || *kind == PrimitiveKind::Undefined,
            Self::Union(members) => members.iter().any(FieldType::admits_undefined),
            Self::Intersection(members) => members.iter().all(FieldType::admits_undefined),
            Self::Reference(_) | Self::Literal(_) => false,
        }
    }

    /// Primitive and literal types take part in primitive intersection rules.
    pub const fn is_primitive_like(&self) -> bool {
        matches!(self, Self::Primitive(_) | Self::Literal(_))
    }
}

fn push_unique(members: &mut Vec<FieldType>, candidate: FieldType) {
    if !members.iter().any(|m| m.is_identical(&candidate)) {
        members.push(candidate);
    }
}

fn same_member_set(a: &[FieldType], b: &[FieldType]) -> bool {
    a.iter().all(|x| b.iter().any(|y| x.is_identical(y)))
        && b.iter().all(|y| a.iter().any(|x| y.is_identical(x)))
}

// =============================================================================
// Resolved shapes
// =============================================================================

/// A flattened object shape.
///
/// The name is carried for diagnostics only; equality is structural and
/// ignores both the name and field order.
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    pub name: Option<Atom>,
    pub fields: FieldMap,
}

impl ObjectShape {
    pub fn anonymous(fields: FieldMap) -> Self {
        Self { name: None, fields }
    }

    pub fn named(name: Atom, fields: FieldMap) -> Self {
        Self {
            name: Some(name),
            fields,
        }
    }

    pub fn field(&self, key: Atom) -> Option<&FieldType> {
        self.fields.get(&key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PartialEq for ObjectShape {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(key, ty)| {
                other
                    .fields
                    .get(key)
                    .is_some_and(|other_ty| ty.is_identical(other_ty))
            })
    }
}

impl Eq for ObjectShape {}

/// Members of a union shape; a value matches if it matches any member.
#[derive(Clone, Debug, Default)]
pub struct UnionShape {
    pub name: Option<Atom>,
    pub members: Vec<ResolvedShape>,
}

impl PartialEq for UnionShape {
    fn eq(&self, other: &Self) -> bool {
        self.members.iter().all(|m| other.members.contains(m))
            && other.members.iter().all(|m| self.members.contains(m))
    }
}

impl Eq for UnionShape {}

/// Output of resolution and of the shape algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedShape {
    Object(Arc<ObjectShape>),
    Union(Arc<UnionShape>),
    Primitive(PrimitiveKind),
    Literal(LiteralValue),
}

impl ResolvedShape {
    pub fn object(fields: FieldMap) -> Self {
        Self::Object(Arc::new(ObjectShape::anonymous(fields)))
    }

    /// Name attached by the registry, if any.
    pub fn name(&self) -> Option<Atom> {
        match self {
            Self::Object(shape) => shape.name,
            Self::Union(shape) => shape.name,
            Self::Primitive(_) | Self::Literal(_) => None,
        }
    }

    /// Re-label an object or union with a declaration name.
    pub fn with_name(self, name: Atom) -> Self {
        match self {
            Self::Object(shape) => {
                let mut shape = Arc::unwrap_or_clone(shape);
                shape.name = Some(name);
                Self::Object(Arc::new(shape))
            }
            Self::Union(shape) => {
                let mut shape = Arc::unwrap_or_clone(shape);
                shape.name = Some(name);
                Self::Union(Arc::new(shape))
            }
            other => other,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectShape>> {
        match self {
            Self::Object(shape) => Some(shape),
            _ => None,
        }
    }

    /// Primitive and literal shapes as their field type.
    pub fn as_primitive_like(&self) -> Option<FieldType> {
        match self {
            Self::Primitive(kind) => Some(FieldType::Primitive(*kind)),
            Self::Literal(value) => Some(FieldType::Literal(value.clone())),
            _ => None,
        }
    }

    pub fn from_primitive_like(ty: FieldType) -> Option<Self> {
        match ty {
            FieldType::Primitive(kind) => Some(Self::Primitive(kind)),
            FieldType::Literal(value) => Some(Self::Literal(value)),
            _ => None,
        }
    }
}

/// Which keys of a union are considered accessible.
///
/// `Common` only admits keys present in every member and is the safe
/// default. `Any` admits keys present in at least one member.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnionKeyPolicy {
    #[default]
    Common,
    Any,
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
