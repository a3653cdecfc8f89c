//! Common types and utilities for the shapeck structural shape checker.
//!
//! This crate provides foundational types used across all shapeck crates:
//! - String interning (`Atom`, `ShardedInterner`) for shape and field names
//! - Resolution limits and thresholds

// String interning for field and shape names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Centralized limits and thresholds
pub mod limits;
