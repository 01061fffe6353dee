//! Domain model for the todo list.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one list-centric shape for pinned and non-pinned projections.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
pub mod list;
