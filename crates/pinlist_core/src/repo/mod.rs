//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the whole-list load/save contract.
//! - Isolate serialization details from service orchestration.
//!
//! # Invariants
//! - Repository reads repair id uniqueness before handing a list out.
//! - Repository APIs return semantic errors (`Decode`) in addition to storage
//!   transport errors.

pub mod list_repo;
