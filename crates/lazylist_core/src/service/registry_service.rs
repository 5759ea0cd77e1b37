//! Registry use cases: create and promote lists.
//!
//! # Invariants
//! - Slugs are unique and immutable once written.
//! - The registry is written before the new list file is created, so a crash
//!   leaves a registered list with a missing (empty) file, never an orphan.
//! - Promotion records its knowledge fact at most once.

use crate::config::ListsPaths;
use crate::error::{ListsError, ListsResult};
use crate::knowledge::{KnowledgeFact, KnowledgeStore};
use crate::model::list_entry::ListEntry;
use crate::registry::Registry;
use crate::repo::item_repo::ItemRepository;
use crate::repo::registry_repo::RegistryRepository;
use crate::service::WriteMode;
use crate::time;
use crate::validation::Validate;
use log::info;
use serde_json::Map;

/// Request for a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewList {
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoteOutcome {
    Promoted(ListEntry),
    AlreadyPromoted(ListEntry),
}

impl PromoteOutcome {
    pub fn entry(&self) -> &ListEntry {
        match self {
            Self::Promoted(entry) | Self::AlreadyPromoted(entry) => entry,
        }
    }
}

pub struct RegistryService<R: RegistryRepository, I: ItemRepository> {
    registry_repo: R,
    item_repo: I,
    knowledge: KnowledgeStore,
    paths: ListsPaths,
}

impl<R: RegistryRepository, I: ItemRepository> RegistryService<R, I> {
    pub fn new(registry_repo: R, item_repo: I, knowledge: KnowledgeStore, paths: ListsPaths) -> Self {
        Self {
            registry_repo,
            item_repo,
            knowledge,
            paths,
        }
    }

    /// Fresh registry snapshot from disk.
    pub fn load(&self) -> ListsResult<Registry> {
        Ok(self.registry_repo.load()?)
    }

    /// Registers a list and creates its empty item file.
    ///
    /// The slug is trimmed and lowercased before validation.
    ///
    /// # Errors
    /// - `Validation` for a malformed slug, empty title or empty tag.
    /// - `DuplicateSlug` when the slug is already registered.
    pub fn create(&self, request: &NewList, mode: WriteMode) -> ListsResult<ListEntry> {
        let slug = request.slug.trim().to_ascii_lowercase();
        let now = time::now_iso();
        let entry = ListEntry {
            path_jsonl: self.paths.relative_list_file(&slug, "jsonl"),
            path_md: self.paths.relative_list_file(&slug, "md"),
            slug,
            title: request.title.trim().to_string(),
            tags: request.tags.iter().map(|tag| tag.trim().to_string()).collect(),
            created_at: now.clone(),
            updated_at: now,
            promoted: false,
            promoted_at: None,
            extra: Map::new(),
        };
        entry.validate()?;

        let mut registry = self.registry_repo.load()?;
        if registry.contains(&entry.slug) {
            return Err(ListsError::DuplicateSlug(entry.slug));
        }
        registry.push(entry.clone());

        if mode.is_live() {
            self.registry_repo.save(&registry)?;
            let created_file = self.item_repo.ensure_list_file(&entry)?;
            info!(
                "event=list_create module=registry status=ok slug={} created_file={} list_count={}",
                entry.slug,
                created_file,
                registry.len()
            );
        } else {
            info!(
                "event=list_create module=registry status=skip mode={} slug={}",
                mode.as_str(),
                entry.slug
            );
        }
        Ok(entry)
    }

    /// Marks a list as promoted and records the promotion fact.
    ///
    /// Promoting an already promoted list changes nothing and returns
    /// `PromoteOutcome::AlreadyPromoted`.
    pub fn promote(&self, slug: &str, mode: WriteMode) -> ListsResult<PromoteOutcome> {
        let slug = slug.trim();
        let mut registry = self.registry_repo.load()?;
        let entry = registry
            .find_mut(slug)
            .ok_or_else(|| ListsError::ListNotFound(slug.to_string()))?;
        if entry.promoted {
            info!(
                "event=list_promote module=registry status=skip reason=already_promoted slug={slug}"
            );
            return Ok(PromoteOutcome::AlreadyPromoted(entry.clone()));
        }

        let now = time::advance_from(&entry.updated_at);
        entry.promoted = true;
        entry.promoted_at = Some(now.clone());
        entry.updated_at = now.clone();
        entry.validate()?;
        let promoted = entry.clone();

        // Both modes read the facts file, so a corrupt one fails a dry run too.
        let fact = KnowledgeFact::list_promoted(slug, &now);
        let fact_exists = self.knowledge.contains(&fact.id)?;
        if mode.is_live() {
            let fact_written = self.knowledge.record_once(&fact)?;
            self.registry_repo.save(&registry)?;
            info!(
                "event=list_promote module=registry status=ok slug={slug} fact_written={fact_written}"
            );
        } else {
            info!(
                "event=list_promote module=registry status=skip mode={} slug={slug} fact_exists={fact_exists}",
                mode.as_str()
            );
        }
        Ok(PromoteOutcome::Promoted(promoted))
    }
}
