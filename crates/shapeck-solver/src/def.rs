//! Shape definitions and their arena.
//!
//! A `ShapeDef` is the accumulator for every declaration made under one
//! name. Definitions live in a `ShapeStore` addressed by `ShapeId`, so
//! extension edges and references are plain ids and cyclic graphs need no
//! owning pointers.

use crate::types::{DeclarationKind, FieldMap, FieldType, ResolvedShape, ShapeId, ShapeState};
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use shapeck_common::interner::Atom;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::trace;

/// Global counter for assigning unique instance IDs to `ShapeStore` instances.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Parent names of a shape; almost always zero to two entries.
pub type ParentList = SmallVec<[Atom; 2]>;

/// Accumulated declarations of one named shape.
#[derive(Clone, Debug)]
pub struct ShapeDef {
    pub name: Atom,

    /// `None` while the id is only reserved by a forward reference.
    pub kind: Option<DeclarationKind>,

    pub state: ShapeState,

    /// Own fields, in the order they were first introduced.
    pub fields: FieldMap,

    /// Extension parents, looked up by name at resolution time.
    pub parents: ParentList,

    /// Body of a type alias that is not an object literal.
    pub alias_body: Option<FieldType>,

    /// Flattened result, set once by resolution.
    pub resolved: Option<ResolvedShape>,

    /// Number of declarations merged into this definition.
    pub declarations: u32,
}

impl ShapeDef {
    /// Placeholder for a name that has been referenced but not declared.
    pub fn pending(name: Atom) -> Self {
        Self {
            name,
            kind: None,
            state: ShapeState::Pending,
            fields: FieldMap::default(),
            parents: ParentList::new(),
            alias_body: None,
            resolved: None,
            declarations: 0,
        }
    }

    /// First declaration of a name.
    pub fn declared(
        name: Atom,
        kind: DeclarationKind,
        fields: FieldMap,
        parents: ParentList,
        alias_body: Option<FieldType>,
    ) -> Self {
        Self {
            name,
            kind: Some(kind),
            state: ShapeState::Unresolved,
            fields,
            parents,
            alias_body,
            resolved: None,
            declarations: 1,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.kind.is_none()
    }
}

/// Thread-safe arena of shape definitions.
///
/// Uses `DashMap` so unrelated shapes can be declared and resolved from
/// multiple threads; a mutation holds the entry lock of its own id only.
pub struct ShapeStore {
    instance_id: u64,
    definitions: DashMap<ShapeId, ShapeDef, FxBuildHasher>,
    next_id: AtomicU32,
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeStore {
    pub fn new() -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "ShapeStore::new");
        Self {
            instance_id,
            definitions: DashMap::with_hasher(FxBuildHasher),
            next_id: AtomicU32::new(ShapeId::FIRST_VALID),
        }
    }

    fn allocate(&self) -> ShapeId {
        ShapeId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a new definition and return its id.
    pub fn register(&self, def: ShapeDef) -> ShapeId {
        let id = self.allocate();
        trace!(
            instance_id = self.instance_id,
            shape_id = id.0,
            kind = ?def.kind,
            "ShapeStore::register"
        );
        self.definitions.insert(id, def);
        id
    }

    /// Clone of the definition.
    pub fn get(&self, id: ShapeId) -> Option<ShapeDef> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    /// Run `f` with exclusive access to one definition.
    pub fn update<R>(&self, id: ShapeId, f: impl FnOnce(&mut ShapeDef) -> R) -> Option<R> {
        self.definitions.get_mut(&id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn kind(&self, id: ShapeId) -> Option<DeclarationKind> {
        self.definitions.get(&id).and_then(|r| r.kind)
    }

    pub fn state(&self, id: ShapeId) -> Option<ShapeState> {
        self.definitions.get(&id).map(|r| r.state)
    }

    pub fn name(&self, id: ShapeId) -> Option<Atom> {
        self.definitions.get(&id).map(|r| r.name)
    }

    /// Cached resolution result, if any.
    pub fn cached(&self, id: ShapeId) -> Option<ResolvedShape> {
        self.definitions.get(&id).and_then(|r| r.resolved.clone())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
