//! In-memory view of the list registry.
//!
//! # Invariants
//! - Entries keep their on-disk order.
//! - A `Registry` is a snapshot loaded for one invocation; it is never
//!   cached across calls.

use crate::model::list_entry::ListEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: Vec<ListEntry>,
}

impl Registry {
    pub fn new(entries: Vec<ListEntry>) -> Self {
        Self { entries }
    }

    pub fn find(&self, slug: &str) -> Option<&ListEntry> {
        self.entries.iter().find(|entry| entry.slug == slug)
    }

    pub(crate) fn find_mut(&mut self, slug: &str) -> Option<&mut ListEntry> {
        self.entries.iter_mut().find(|entry| entry.slug == slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.find(slug).is_some()
    }

    pub fn list_all(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Slugs in registry order.
    pub fn slugs(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.slug.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }
}
