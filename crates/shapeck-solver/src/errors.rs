//! Error taxonomy for shape declaration, resolution and access.
//!
//! Every error is recoverable. Names are carried as resolved strings so a
//! consumer can render a diagnostic without holding the interner.

use std::sync::Arc;

pub type ShapeResult<T> = Result<T, ShapeError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// Same field declared with incompatible types across merged declarations.
    #[error("subsequent declarations of `{name}` disagree on the type of field `{field}`")]
    ConflictingMerge { name: Arc<str>, field: Arc<str> },

    /// Second declaration of a type alias name.
    #[error("duplicate declaration of type alias `{name}`")]
    DuplicateAlias { name: Arc<str> },

    /// Extension references a parent that was never declared.
    #[error("cannot extend `{parent}`: no such shape is declared")]
    UnknownParent { parent: Arc<str> },

    /// Extension graph contains a cycle through `name`.
    #[error("`{name}` recursively extends itself")]
    CyclicExtension { name: Arc<str> },

    /// An alias body refers back to itself through references.
    #[error("type alias `{name}` circularly references itself")]
    CyclicReference { name: Arc<str> },

    /// Extension or alias chain of `name` nests deeper than the resolution
    /// budget without repeating a shape.
    #[error("resolving `{name}` exceeds the maximum nesting depth")]
    ResolutionDepthExceeded { name: Arc<str> },

    /// Merge attempted after the shape was resolved.
    #[error("`{name}` has already been resolved and cannot accept new declarations")]
    ShapeFrozen { name: Arc<str> },

    /// Union or intersection over zero members.
    #[error("union and intersection require at least one member")]
    EmptyAlgebra,

    /// Intersection of incompatible primitive field types.
    #[error(
        "intersection of incompatible types at `{}`",
        .key.as_deref().unwrap_or("<root>")
    )]
    IncompatibleIntersection { key: Option<Arc<str>> },

    /// Key is not part of the shape's derived key set.
    #[error("property `{key}` does not exist on `{shape}`")]
    InvalidKey { shape: Arc<str>, key: Arc<str> },

    /// Key is valid for the shape but absent from the concrete value.
    #[error("value is missing property `{key}`")]
    MissingValue { key: Arc<str> },

    /// A forward reference was never followed by a declaration.
    #[error("`{name}` is referenced but never declared")]
    UnknownShape { name: Arc<str> },

    /// Extension parent does not resolve to an object shape.
    #[error("`{name}` is not an object shape and cannot be extended")]
    NonObjectParent { name: Arc<str> },
}

impl ShapeError {
    /// Stable identifier of the error kind, for machine-readable output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ConflictingMerge { .. } => "ConflictingMerge",
            Self::DuplicateAlias { .. } => "DuplicateAlias",
            Self::UnknownParent { .. } => "UnknownParent",
            Self::CyclicExtension { .. } => "CyclicExtension",
            Self::CyclicReference { .. } => "CyclicReference",
            Self::ResolutionDepthExceeded { .. } => "ResolutionDepthExceeded",
            Self::ShapeFrozen { .. } => "ShapeFrozen",
            Self::EmptyAlgebra => "EmptyAlgebra",
            Self::IncompatibleIntersection { .. } => "IncompatibleIntersection",
            Self::InvalidKey { .. } => "InvalidKey",
            Self::MissingValue { .. } => "MissingValue",
            Self::UnknownShape { .. } => "UnknownShape",
            Self::NonObjectParent { .. } => "NonObjectParent",
        }
    }
}
