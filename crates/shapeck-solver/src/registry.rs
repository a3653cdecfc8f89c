//! Shape registry.
//!
//! Stores named shape declarations, merges repeated declarations of a
//! mergeable name, and resolves a name into a flattened `ResolvedShape`.
//!
//! Lifecycle of a name:
//!
//! ```text
//! Pending --declare--> Unresolved --resolve--> Resolving --> Resolved --freeze--> Frozen
//!                        ^     |                   |
//!                        +-----+ (merge)           +--(error)--> Unresolved
//! ```
//!
//! Only `Pending` and `Unresolved` names accept declarations. Resolution is
//! cached: once a name is resolved every later `resolve` returns the same
//! value without re-merging.
//!
//! ## Locking
//!
//! The name table and the definition arena are both `DashMap`s. A
//! declaration holds its name's entry lock for the whole merge, so merges of
//! one name are serialized while unrelated names proceed in parallel. The
//! lock order is always name table, then arena; resolution never holds an
//! arena lock while looking up a name.

use crate::access::{AccessValidator, FieldValues};
use crate::algebra::ShapeAlgebra;
use crate::def::{ParentList, ShapeDef, ShapeStore};
use crate::errors::{ShapeError, ShapeResult};
use crate::keyof::keys_of_with_policy;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{
    DeclarationKind, FieldMap, FieldType, ObjectShape, ResolvedShape, ShapeId, ShapeState,
    UnionKeyPolicy,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxBuildHasher;
use shapeck_common::interner::{Atom, ShardedInterner};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// How resolution reached a shape; decides which cycle error is reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Edge {
    Root,
    Extension,
    Reference,
}

/// Immutable copy of a definition taken when resolution starts.
struct Snapshot {
    name: Atom,
    kind: DeclarationKind,
    fields: FieldMap,
    parents: ParentList,
    alias_body: Option<FieldType>,
}

enum Begin {
    Cached(ResolvedShape),
    Compute(Snapshot),
}

/// One declaration as handed to the registry.
struct Fragment {
    kind: DeclarationKind,
    fields: FieldMap,
    /// First field repeated with a different type inside this declaration.
    conflict: Option<Atom>,
    parents: ParentList,
    alias_body: Option<FieldType>,
}

pub struct ShapeRegistry {
    interner: ShardedInterner,
    names: DashMap<Atom, ShapeId, FxBuildHasher>,
    store: ShapeStore,
    policy: UnionKeyPolicy,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeRegistry {
    pub fn new() -> Self {
        let interner = ShardedInterner::new();
        interner.intern_common();
        Self {
            interner,
            names: DashMap::with_hasher(FxBuildHasher),
            store: ShapeStore::new(),
            policy: UnionKeyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnionKeyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnionKeyPolicy {
        self.policy
    }

    pub fn interner(&self) -> &ShardedInterner {
        &self.interner
    }

    pub fn intern(&self, s: &str) -> Atom {
        self.interner.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.interner.resolve(atom)
    }

    pub fn algebra(&self) -> ShapeAlgebra<'_> {
        ShapeAlgebra::new(&self.interner)
    }

    pub fn validator(&self) -> AccessValidator<'_> {
        AccessValidator::new(&self.interner).with_policy(self.policy)
    }

    // -------------------------------------------------------------------------
    // Queries on ids
    // -------------------------------------------------------------------------

    /// Id of a declared or forward-referenced name.
    pub fn lookup(&self, name: Atom) -> Option<ShapeId> {
        self.names.get(&name).map(|r| *r)
    }

    pub fn name_of(&self, id: ShapeId) -> Option<Atom> {
        self.store.name(id)
    }

    /// `None` for unknown ids and for ids only reserved by a forward reference.
    pub fn kind_of(&self, id: ShapeId) -> Option<DeclarationKind> {
        self.store.kind(id)
    }

    pub fn state_of(&self, id: ShapeId) -> Option<ShapeState> {
        self.store.state(id)
    }

    /// Number of names known to the registry, pending ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    /// Id for `name`, reserving a pending id if it is not declared yet.
    ///
    /// Lets a `FieldType::Reference` point at a shape declared later.
    pub fn reference(&self, name: Atom) -> ShapeId {
        *self
            .names
            .entry(name)
            .or_insert_with(|| self.store.register(ShapeDef::pending(name)))
    }

    /// Declare `name` with `fields`.
    ///
    /// A new name is created with `kind`. A second declaration of a
    /// mergeable name merges its fields; a second declaration involving an
    /// alias is always rejected.
    pub fn declare(
        &self,
        name: Atom,
        kind: DeclarationKind,
        fields: impl IntoIterator<Item = (Atom, FieldType)>,
    ) -> ShapeResult<ShapeId> {
        let (fields, conflict) = collect_fields(fields);
        self.declare_fragment(
            name,
            Fragment {
                kind,
                fields,
                conflict,
                parents: ParentList::new(),
                alias_body: None,
            },
        )
    }

    /// Declare a type alias whose body is an arbitrary field type.
    pub fn declare_alias(&self, name: Atom, body: FieldType) -> ShapeResult<ShapeId> {
        self.declare_fragment(
            name,
            Fragment {
                kind: DeclarationKind::SingleAliased,
                fields: FieldMap::default(),
                conflict: None,
                parents: ParentList::new(),
                alias_body: Some(body),
            },
        )
    }

    /// Declare a mergeable shape that extends `parents`.
    ///
    /// Parents are looked up by name when the child is resolved, so they may
    /// be declared after the child.
    pub fn extend(
        &self,
        child: Atom,
        parents: &[Atom],
        fields: impl IntoIterator<Item = (Atom, FieldType)>,
    ) -> ShapeResult<ShapeId> {
        let (fields, conflict) = collect_fields(fields);
        let mut parent_list = ParentList::new();
        for parent in parents {
            if !parent_list.contains(parent) {
                parent_list.push(*parent);
            }
        }
        self.declare_fragment(
            child,
            Fragment {
                kind: DeclarationKind::MergeableNamed,
                fields,
                conflict,
                parents: parent_list,
                alias_body: None,
            },
        )
    }

    fn declare_fragment(&self, name: Atom, fragment: Fragment) -> ShapeResult<ShapeId> {
        match self.names.entry(name) {
            Entry::Vacant(slot) => {
                if let Some(field) = fragment.conflict {
                    return Err(self.conflicting_merge(name, field));
                }
                let id = self.store.register(ShapeDef::declared(
                    name,
                    fragment.kind,
                    fragment.fields,
                    fragment.parents,
                    fragment.alias_body,
                ));
                debug!(shape = %self.interner.resolve(name), id = id.0, kind = ?fragment.kind, "declared shape");
                slot.insert(id);
                Ok(id)
            }
            Entry::Occupied(slot) => {
                let id = *slot.get();
                let merged = self
                    .store
                    .update(id, |def| self.merge_into(def, fragment))
                    .unwrap_or_else(|| Err(self.unknown_shape(name)));
                // The name's entry lock is held until here.
                drop(slot);
                merged.map(|()| id)
            }
        }
    }

    /// Apply one declaration to an existing definition, all or nothing.
    fn merge_into(&self, def: &mut ShapeDef, fragment: Fragment) -> ShapeResult<()> {
        if def.is_pending() {
            if let Some(field) = fragment.conflict {
                return Err(self.conflicting_merge(def.name, field));
            }
            *def = ShapeDef::declared(
                def.name,
                fragment.kind,
                fragment.fields,
                fragment.parents,
                fragment.alias_body,
            );
            trace!(shape = %self.interner.resolve(def.name), "forward reference declared");
            return Ok(());
        }

        if def.kind == Some(DeclarationKind::SingleAliased)
            || fragment.kind == DeclarationKind::SingleAliased
        {
            return Err(ShapeError::DuplicateAlias {
                name: self.interner.resolve(def.name),
            });
        }

        if !def.state.accepts_declarations() {
            return Err(ShapeError::ShapeFrozen {
                name: self.interner.resolve(def.name),
            });
        }

        if let Some(field) = fragment.conflict {
            return Err(self.conflicting_merge(def.name, field));
        }
        for (field, ty) in &fragment.fields {
            if let Some(existing) = def.fields.get(field) {
                if !existing.is_identical(ty) {
                    return Err(self.conflicting_merge(def.name, *field));
                }
            }
        }

        for (field, ty) in fragment.fields {
            def.fields.entry(field).or_insert(ty);
        }
        for parent in fragment.parents {
            if !def.parents.contains(&parent) {
                def.parents.push(parent);
            }
        }
        def.declarations += 1;
        trace!(
            shape = %self.interner.resolve(def.name),
            declarations = def.declarations,
            fields = def.fields.len(),
            "merged declaration"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Flatten merges and extension edges of `id` into one shape.
    ///
    /// The result is cached; the shape no longer accepts declarations.
    pub fn resolve(&self, id: ShapeId) -> ShapeResult<ResolvedShape> {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ShapeResolution);
        self.resolve_guarded(id, &mut guard, Edge::Root)
            .map_err(|err| match err {
                ShapeError::ResolutionDepthExceeded { .. } => ShapeError::ResolutionDepthExceeded {
                    name: self.display_name(id),
                },
                other => other,
            })
    }

    /// Resolve an arbitrary field type through the registry.
    ///
    /// References are resolved to their named shapes and unions and
    /// intersections are combined with the algebra.
    pub fn resolve_type(&self, ty: &FieldType) -> ShapeResult<ResolvedShape> {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ShapeResolution);
        self.resolve_type_guarded(ty, &mut guard)
    }

    /// Move a shape from `Resolved` to the terminal `Frozen` state.
    pub fn freeze(&self, id: ShapeId) -> ShapeResult<ResolvedShape> {
        let resolved = self.resolve(id)?;
        self.store.update(id, |def| {
            if def.state != ShapeState::Frozen {
                trace!(shape = %self.interner.resolve(def.name), "froze shape");
                def.state = ShapeState::Frozen;
            }
        });
        Ok(resolved)
    }

    fn resolve_guarded(
        &self,
        id: ShapeId,
        guard: &mut RecursionGuard<ShapeId>,
        edge: Edge,
    ) -> ShapeResult<ResolvedShape> {
        if let Some(cached) = self.store.cached(id) {
            trace!(id = id.0, "resolve cache hit");
            return Ok(cached);
        }

        match guard.scope(id, |guard| self.resolve_entered(id, guard)) {
            Ok(result) => result,
            Err(denied) => Err(self.denied_error(id, edge, denied)),
        }
    }

    fn resolve_entered(
        &self,
        id: ShapeId,
        guard: &mut RecursionGuard<ShapeId>,
    ) -> ShapeResult<ResolvedShape> {
        let begin = self
            .store
            .update(id, |def| {
                if let Some(cached) = &def.resolved {
                    return Ok(Begin::Cached(cached.clone()));
                }
                let Some(kind) = def.kind else {
                    return Err(ShapeError::UnknownShape {
                        name: self.interner.resolve(def.name),
                    });
                };
                if def.state == ShapeState::Unresolved {
                    def.state = ShapeState::Resolving;
                }
                Ok(Begin::Compute(Snapshot {
                    name: def.name,
                    kind,
                    fields: def.fields.clone(),
                    parents: def.parents.clone(),
                    alias_body: def.alias_body.clone(),
                }))
            })
            .unwrap_or_else(|| {
                Err(ShapeError::UnknownShape {
                    name: Arc::from(format!("#{}", id.0)),
                })
            })?;

        let snapshot = match begin {
            Begin::Cached(cached) => return Ok(cached),
            Begin::Compute(snapshot) => snapshot,
        };

        debug!(shape = %self.interner.resolve(snapshot.name), id = id.0, "resolving shape");
        let computed = self.flatten(&snapshot, guard);

        self.store
            .update(id, |def| match computed {
                Ok(shape) => {
                    // First finished resolution wins so every caller
                    // observes the same value.
                    if let Some(existing) = &def.resolved {
                        return Ok(existing.clone());
                    }
                    def.resolved = Some(shape.clone());
                    if def.state != ShapeState::Frozen {
                        def.state = ShapeState::Resolved;
                    }
                    Ok(shape)
                }
                Err(err) => {
                    if def.resolved.is_none() && def.state == ShapeState::Resolving {
                        def.state = ShapeState::Unresolved;
                    }
                    Err(err)
                }
            })
            .unwrap_or_else(|| Err(self.unknown_shape(snapshot.name)))
    }

    fn flatten(
        &self,
        snapshot: &Snapshot,
        guard: &mut RecursionGuard<ShapeId>,
    ) -> ShapeResult<ResolvedShape> {
        match snapshot.kind {
            DeclarationKind::MergeableNamed => {
                let mut parents = Vec::with_capacity(snapshot.parents.len());
                for &parent in &snapshot.parents {
                    parents.push(self.resolve_parent(parent, guard)?);
                }
                let fields = self.algebra().extend_fields(&parents, &snapshot.fields);
                Ok(ResolvedShape::Object(Arc::new(ObjectShape::named(
                    snapshot.name,
                    fields,
                ))))
            }
            DeclarationKind::SingleAliased => match &snapshot.alias_body {
                Some(body) => Ok(self.resolve_type_guarded(body, guard)?.with_name(snapshot.name)),
                None => Ok(ResolvedShape::Object(Arc::new(ObjectShape::named(
                    snapshot.name,
                    snapshot.fields.clone(),
                )))),
            },
        }
    }

    fn resolve_parent(
        &self,
        parent: Atom,
        guard: &mut RecursionGuard<ShapeId>,
    ) -> ShapeResult<Arc<ObjectShape>> {
        let unknown = || ShapeError::UnknownParent {
            parent: self.interner.resolve(parent),
        };
        let id = self.lookup(parent).ok_or_else(unknown)?;
        if self.store.kind(id).is_none() {
            return Err(unknown());
        }
        match self.resolve_guarded(id, guard, Edge::Extension)? {
            ResolvedShape::Object(object) => Ok(object),
            _ => Err(ShapeError::NonObjectParent {
                name: self.interner.resolve(parent),
            }),
        }
    }

    fn resolve_type_guarded(
        &self,
        ty: &FieldType,
        guard: &mut RecursionGuard<ShapeId>,
    ) -> ShapeResult<ResolvedShape> {
        match ty {
            FieldType::Primitive(kind) => Ok(ResolvedShape::Primitive(*kind)),
            FieldType::Literal(value) => Ok(ResolvedShape::Literal(value.clone())),
            FieldType::Reference(id) => self.resolve_guarded(*id, guard, Edge::Reference),
            FieldType::Union(members) => {
                let resolved = members
                    .iter()
                    .map(|m| self.resolve_type_guarded(m, guard))
                    .collect::<ShapeResult<Vec<_>>>()?;
                self.algebra().union(resolved)
            }
            FieldType::Intersection(members) => {
                let resolved = members
                    .iter()
                    .map(|m| self.resolve_type_guarded(m, guard))
                    .collect::<ShapeResult<Vec<_>>>()?;
                self.algebra().intersection(resolved)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Key derivation and access through the registry
    // -------------------------------------------------------------------------

    /// Keys of a named shape; freezes the shape.
    pub fn keys_of(&self, id: ShapeId) -> ShapeResult<Vec<Atom>> {
        let shape = self.freeze(id)?;
        Ok(keys_of_with_policy(&shape, self.policy))
    }

    /// Validate `key` against a named shape; freezes the shape.
    pub fn validate_key(&self, id: ShapeId, key: Atom) -> ShapeResult<FieldType> {
        let shape = self.freeze(id)?;
        self.validator().validate_key(&shape, key)
    }

    /// Validate `key` against a named shape and read it from `value`.
    pub fn access_value<'v, M>(&self, id: ShapeId, value: &'v M, key: Atom) -> ShapeResult<&'v M::Value>
    where
        M: FieldValues + ?Sized,
    {
        let shape = self.freeze(id)?;
        self.validator().access_value(value, &shape, key)
    }

    // -------------------------------------------------------------------------
    // Errors
    // -------------------------------------------------------------------------

    /// Name of `id` for diagnostics.
    pub fn display_name(&self, id: ShapeId) -> Arc<str> {
        self.name_of(id)
            .map(|name| self.interner.resolve(name))
            .unwrap_or_else(|| Arc::from(format!("#{}", id.0)))
    }

    /// `id` was refused by the guard: re-entered (a cycle through `id`) or
    /// over budget. Budget errors are renamed to the root by `resolve`.
    fn denied_error(&self, id: ShapeId, edge: Edge, denied: RecursionResult) -> ShapeError {
        let name = self.display_name(id);
        match (denied, edge) {
            (RecursionResult::DepthExceeded | RecursionResult::IterationExceeded, _) => {
                warn!(shape = %name, "resolution budget exceeded");
                ShapeError::ResolutionDepthExceeded { name }
            }
            (_, Edge::Reference) => ShapeError::CyclicReference { name },
            (_, Edge::Root | Edge::Extension) => ShapeError::CyclicExtension { name },
        }
    }

    fn conflicting_merge(&self, name: Atom, field: Atom) -> ShapeError {
        ShapeError::ConflictingMerge {
            name: self.interner.resolve(name),
            field: self.interner.resolve(field),
        }
    }

    fn unknown_shape(&self, name: Atom) -> ShapeError {
        ShapeError::UnknownShape {
            name: self.interner.resolve(name),
        }
    }
}

/// Fields of one declaration, plus the first field repeated with a
/// different type.
fn collect_fields(fields: impl IntoIterator<Item = (Atom, FieldType)>) -> (FieldMap, Option<Atom>) {
    let mut map = FieldMap::default();
    let mut conflict = None;
    for (field, ty) in fields {
        match map.get(&field) {
            Some(existing) => {
                if conflict.is_none() && !existing.is_identical(&ty) {
                    conflict = Some(field);
                }
            }
            None => {
                map.insert(field, ty);
            }
        }
    }
    (map, conflict)
}

#[cfg(test)]
#[path = "../tests/registry_tests.rs"]
mod tests;
