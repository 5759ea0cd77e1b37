//! Domain model for lists and their items.
//!
//! # Responsibility
//! - Define the record shapes persisted in registry and list files.
//! - Keep serialization field order stable so rewrites do not drift.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Deletion is represented by `ItemStatus::Archived`, never removal.

pub mod item;
pub mod list_entry;
