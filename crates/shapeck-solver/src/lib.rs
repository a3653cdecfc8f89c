//! Structural Shape Solver
//!
//! Named object shapes are declared into a [`ShapeRegistry`], merged when a
//! name is declared more than once, and resolved into flattened
//! [`ResolvedShape`]s on demand. On top of resolved shapes:
//!
//! - **Algebra**: extension, union and intersection ([`ShapeAlgebra`])
//! - **Key derivation**: the accessor set of a shape ([`keys_of`])
//! - **Access validation**: checked key and value access ([`AccessValidator`])
//! - **Relation**: structural subtyping with coinductive cycles ([`SubtypeChecker`])
//! - **Value compatibility**: matching JSON values against shapes ([`ValueChecker`])
//!
//! Shapes refer to each other by [`ShapeId`], so recursive shapes are plain
//! graphs in the registry arena.
pub mod access;
pub mod algebra;
pub mod def;
pub mod errors;
pub mod format;
pub mod keyof;
pub mod recursion;
pub mod registry;
pub mod relation;
pub mod types;
pub mod value_compat;

pub use access::{AccessValidator, FieldValues, field_type_of};
pub use algebra::ShapeAlgebra;
pub use errors::{ShapeError, ShapeResult};
pub use format::TypeFormatter;
pub use keyof::{has_key, keys_of, keys_of_with_policy};
pub use registry::ShapeRegistry;
pub use relation::{SubtypeChecker, is_shape_subtype_of};
pub use shapeck_common::{Atom, ShardedInterner};
pub use types::{
    DeclarationKind, FieldMap, FieldType, LiteralValue, ObjectShape, PrimitiveKind, ResolvedShape,
    ShapeId, ShapeState, UnionKeyPolicy, UnionShape,
};
pub use value_compat::ValueChecker;

#[cfg(test)]
#[path = "../tests/property_tests.rs"]
mod property_tests;

#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
