//! Recursion guard for cycle detection and depth limiting in shape walks.
//!
//! Extension chains, alias chains and structural comparisons all walk the
//! registry by id. `RecursionGuard` tracks the ids currently on the walk
//! path so a cycle is reported the moment an id is re-entered, and bounds
//! depth and total work so pathological inputs fail instead of overflowing.
//!
//! # Profiles
//!
//! [`RecursionProfile`] names the limit presets so call sites state intent
//! instead of magic numbers:
//!
//! ```ignore
//! let mut guard = RecursionGuard::with_profile(RecursionProfile::ShapeResolution);
//! ```

use rustc_hash::FxHashSet;
use shapeck_common::limits;
use std::hash::Hash;

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Flattening extension edges and alias bodies.
    ShapeResolution,

    /// Structural subtype comparison between shapes.
    ///
    /// Cycles are expected here (recursive shapes) and are treated
    /// coinductively by the caller.
    Relation,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ShapeResolution => limits::MAX_RESOLUTION_DEPTH,
            Self::Relation => limits::MAX_RELATION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::ShapeResolution => limits::MAX_RESOLUTION_ITERATIONS,
            Self::Relation => limits::MAX_RELATION_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already on the walk path.
    Cycle,
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

/// Tracks the keys on the current walk path.
///
/// Every successful [`enter`](Self::enter) must be paired with exactly one
/// [`leave`](Self::leave). In debug builds, dropping a guard with keys still
/// on the path panics.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            return RecursionResult::IterationExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave a computation previously entered with `key`.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not on the walk path"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` on the walk path.
    ///
    /// Returns `Err(reason)` without running `f` if entry was denied.
    pub fn scope<T>(&mut self, key: K, f: impl FnOnce(&mut Self) -> T) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f(self);
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} keys still on the walk path",
                self.visiting.len(),
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
