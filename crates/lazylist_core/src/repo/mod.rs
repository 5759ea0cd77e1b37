//! Persistence contracts for the registry and per-list item files.
//!
//! # Responsibility
//! - Map registry entries to files and move whole collections in and out.
//! - Keep JSONL layout details out of the service layer.
//!
//! # Invariants
//! - Repositories persist what they are given; callers validate first.
//! - Reads surface corruption instead of skipping bad lines.

pub mod item_repo;
pub mod registry_repo;
