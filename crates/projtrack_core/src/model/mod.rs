//! Domain model for tracked projects.
//!
//! # Responsibility
//! - Define the canonical project record persisted by the store.
//! - Define the creation-form draft that carries input validation.
//!
//! # Invariants
//! - Every project is identified by a stable `ProjectId`.
//! - The record itself stays permissive: date order and budget sign are
//!   only checked at the draft boundary.

pub mod draft;
pub mod project;
