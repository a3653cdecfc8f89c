//! Centralized limits and thresholds for shape resolution.
//!
//! Declarations come from external collaborators and may describe extension
//! chains or alias chains of arbitrary length. These limits bound the
//! recursive walks in the solver so a pathological input is reported as an
//! error instead of overflowing the stack.
//!
//! Solver code does not use these constants directly; they feed the named
//! presets in `shapeck_solver::recursion::RecursionProfile`.

/// Maximum nesting depth while flattening extension edges and alias bodies.
///
/// A chain deeper than this fails with `ResolutionDepthExceeded`, naming the
/// shape whose resolution was requested.
pub const MAX_RESOLUTION_DEPTH: u32 = 256;

/// Maximum number of shapes visited in a single resolution pass.
pub const MAX_RESOLUTION_ITERATIONS: u32 = 100_000;

/// Maximum depth for structural subtype comparison.
///
/// Comparison of recursive shapes terminates through cycle detection; this
/// only bounds wide, non-repeating chains of distinct references.
pub const MAX_RELATION_DEPTH: u32 = 100;

/// Maximum iteration budget for structural subtype comparison.
pub const MAX_RELATION_ITERATIONS: u32 = 100_000;

/// Maximum nesting depth of a runtime value checked against a shape.
pub const MAX_VALUE_DEPTH: u32 = 128;
