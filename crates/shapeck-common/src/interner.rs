//! String interner for shape and field names.
//!
//! Every `FieldName` and shape name is interned once and passed around as a
//! `u32` handle (`Atom`). Field lookups inside a shape become integer
//! comparisons, and the registry can hand out names to concurrent callers
//! without cloning strings.

use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use [`ShardedInterner::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names pre-interned by [`ShardedInterner::intern_common`].
const COMMON_STRINGS: &[&str] = &[
    // Primitive keywords
    "string",
    "number",
    "boolean",
    "null",
    "undefined",
    "any",
    "unknown",
    "never",
    // Frequent field names
    "id",
    "name",
    "value",
    "type",
    "kind",
    "key",
    "length",
    "data",
];

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// Sharded string interner for concurrent use.
///
/// Strings hash to one of a fixed number of buckets, each behind its own
/// `RwLock`, so unrelated names can be interned in parallel. The shard index
/// lives in the low bits of the atom, which keeps resolution O(1).
pub struct ShardedInterner {
    shards: [RwLock<ShardState>; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new interner with the empty string pre-interned as [`Atom::NONE`].
    pub fn new() -> Self {
        let shards: [RwLock<ShardState>; SHARD_COUNT] =
            std::array::from_fn(|_| RwLock::new(ShardState::default()));

        if let Ok(mut state) = shards[0].write() {
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }

        ShardedInterner { shards }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);

        // Fast path: most names are already interned.
        if let Ok(state) = self.shards[shard_idx].read() {
            if let Some(&atom) = state.map.get(s) {
                return atom;
            }
        }

        let Ok(mut state) = self.shards[shard_idx].write() else {
            return Atom::NONE;
        };

        // Another writer may have interned it between the two locks.
        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Self::make_atom(local_index, shard_idx as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns the empty string if the atom is unknown.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Try to resolve an Atom, returning None if it was never interned here.
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let (shard_idx, local_index) = Self::split_atom(atom);
        let state = self.shards.get(shard_idx)?.read().ok()?;
        state.strings.get(local_index).cloned()
    }

    /// Look up an already-interned string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        if s.is_empty() {
            return Some(Atom::NONE);
        }
        let state = self.shards[Self::shard_for(s)].read().ok()?;
        state.map.get(s).copied()
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().map(|state| state.strings.len()).unwrap_or(0))
            .sum()
    }

    /// Check if the interner only holds the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern primitive keywords and frequent field names.
    pub fn intern_common(&self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }

    #[inline]
    fn make_atom(local_index: u32, shard_idx: u32) -> Atom {
        Atom((local_index << SHARD_BITS) | (shard_idx & SHARD_MASK))
    }

    #[inline]
    fn split_atom(atom: Atom) -> (usize, usize) {
        let raw = atom.0;
        ((raw & SHARD_MASK) as usize, (raw >> SHARD_BITS) as usize)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
