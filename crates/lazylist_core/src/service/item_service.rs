//! Item use cases over one registry snapshot.
//!
//! # Responsibility
//! - Add, query, mutate and relocate items in registered lists.
//! - Route unlabelled input through the classifier.
//!
//! # Invariants
//! - New items go to the head of their list (newest first).
//! - An item keeps its `id` and `created_at` across moves.
//! - `updated_at` changes only when a field changes.
//! - A move writes the destination before the source.

use crate::classify::intake::{diagnostic_questions, split_intake};
use crate::classify::{classify, extract_tags, Classification, ClassificationRule};
use crate::error::{ListsError, ListsResult};
use crate::model::item::{Item, ItemId, ItemStatus, Priority};
use crate::model::list_entry::ListEntry;
use crate::registry::Registry;
use crate::repo::item_repo::ItemRepository;
use crate::service::WriteMode;
use crate::time;
use crate::validation::{validate_batch, Validate};
use log::info;
use std::collections::BTreeMap;

/// Input for a new item. Blank optional strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    /// Caller-provided identity, for imports. Must not already exist.
    pub id: Option<ItemId>,
    pub title: String,
    pub body: Option<String>,
    pub tags: Vec<String>,
    pub status: ItemStatus,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
}

impl NewItem {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Conjunctive item filter. An item lacking a filtered field never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub status: Option<ItemStatus>,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
    /// Every listed tag must be present on the item.
    pub tags: Vec<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if self.status.is_some_and(|status| item.status != status) {
            return false;
        }
        if let Some(priority) = self.priority {
            if item.priority != Some(priority) {
                return false;
            }
        }
        if let Some(project) = &self.project {
            if item.project.as_deref() != Some(project.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.title_contains {
            if !item.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        self.tags.iter().all(|tag| item.tags.contains(tag))
    }
}

/// Field replacements for `set`; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<ItemStatus>,
    pub priority: Option<Priority>,
    pub project: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
}

impl ItemUpdate {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the update, returning whether any field changed.
    fn apply(&self, item: &mut Item) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            changed |= replace(&mut item.title, title.trim().to_string());
        }
        if let Some(status) = self.status {
            changed |= replace(&mut item.status, status);
        }
        if let Some(tags) = &self.tags {
            changed |= replace(&mut item.tags, tags.clone());
        }
        for (slot, value) in [
            (&mut item.body, &self.body),
            (&mut item.project, &self.project),
            (&mut item.due, &self.due),
            (&mut item.notes, &self.notes),
        ] {
            if let Some(value) = value {
                changed |= replace(slot, Some(value.clone()));
            }
        }
        if let Some(priority) = self.priority {
            changed |= replace(&mut item.priority, Some(priority));
        }
        changed
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Where an added item landed and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedItem {
    pub slug: String,
    pub item: Item,
    pub classification: Classification,
    /// Clarifying questions when the classification is not confident.
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    pub item: Item,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedItem {
    pub item: Item,
    pub source: String,
    pub target: String,
    /// The destination already held a copy with this id; it was replaced.
    pub replaced_existing: bool,
}

pub struct ItemService<I: ItemRepository> {
    registry: Registry,
    items: I,
    max_tags: usize,
}

impl<I: ItemRepository> ItemService<I> {
    pub fn new(registry: Registry, items: I, max_tags: usize) -> Self {
        Self {
            registry,
            items,
            max_tags,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn entry(&self, slug: &str) -> ListsResult<&ListEntry> {
        self.registry
            .find(slug.trim())
            .ok_or_else(|| ListsError::ListNotFound(slug.trim().to_string()))
    }

    /// All items of a list in stored order.
    pub fn list_items(&self, slug: &str) -> ListsResult<Vec<Item>> {
        let entry = self.entry(slug)?;
        Ok(self.items.load_items(entry)?)
    }

    pub fn get(&self, slug: &str, id: ItemId) -> ListsResult<Item> {
        self.list_items(slug)?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| ListsError::ItemNotFound {
                slug: slug.trim().to_string(),
                id,
            })
    }

    /// Adds an item to `slug`, or to the classifier's pick when `slug` is
    /// `None`. Auto-placed items without tags get tags extracted from the
    /// title and body.
    ///
    /// # Errors
    /// - `EmptyTitle` for a blank title.
    /// - `ListNotFound` when the target is not registered.
    /// - `DuplicateItem` when an explicit id already exists in the target.
    pub fn add(
        &self,
        slug: Option<&str>,
        request: NewItem,
        mode: WriteMode,
    ) -> ListsResult<AddedItem> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ListsError::EmptyTitle);
        }

        let classification = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => Classification::explicit(explicit),
            None => classify(&title, &self.registry.slugs()),
        };
        let entry = self.entry(&classification.slug)?;

        let auto_placed = classification.rule != ClassificationRule::Explicit;
        let mut item = build_item(request, &title);
        if auto_placed && item.tags.is_empty() {
            let mut content = item.title.clone();
            if let Some(body) = &item.body {
                content.push(' ');
                content.push_str(body);
            }
            item.tags = extract_tags(&content, self.max_tags);
        }
        item.validate()?;

        let mut items = self.items.load_items(entry)?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(ListsError::DuplicateItem {
                slug: entry.slug.clone(),
                id: item.id,
            });
        }
        items.insert(0, item.clone());

        if mode.is_live() {
            self.items.save_items(entry, &items)?;
        }
        info!(
            "event=item_add module=items status={} slug={} item_id={} auto_placed={} list_size={}",
            status_for(mode),
            entry.slug,
            item.id,
            auto_placed,
            items.len()
        );

        let questions = if auto_placed && !classification.is_confident() {
            diagnostic_questions(&title, &self.registry.slugs())
        } else {
            Vec::new()
        };
        Ok(AddedItem {
            slug: entry.slug.clone(),
            item,
            classification,
            questions,
        })
    }

    /// Splits free text into drafts, classifies each one and adds them.
    ///
    /// Every draft is validated and every target resolved before the first
    /// write; each touched list is then written once.
    pub fn ingest(&self, text: &str, mode: WriteMode) -> ListsResult<Vec<AddedItem>> {
        let drafts = split_intake(text, self.max_tags);
        if drafts.is_empty() {
            return Err(ListsError::EmptyTitle);
        }
        let available = self.registry.slugs();

        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let classification = classify(&draft.title, &available);
            let entry = self.entry(&classification.slug)?;
            let mut item = Item::new(draft.title.clone());
            item.tags = draft.tags;
            let questions = if classification.is_confident() {
                Vec::new()
            } else {
                diagnostic_questions(&draft.title, &available)
            };
            added.push(AddedItem {
                slug: entry.slug.clone(),
                item,
                classification,
                questions,
            });
        }
        let drafted: Vec<Item> = added.iter().map(|a| a.item.clone()).collect();
        validate_batch("items", &drafted)?;

        let mut by_list: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
        for result in &added {
            by_list.entry(result.slug.as_str()).or_default().push(&result.item);
        }
        let mut pending = Vec::with_capacity(by_list.len());
        for (slug, new_items) in by_list {
            let entry = self.entry(slug)?;
            let mut items = self.items.load_items(entry)?;
            for item in new_items {
                items.insert(0, item.clone());
            }
            pending.push((entry, items));
        }
        if mode.is_live() {
            for (entry, items) in &pending {
                self.items.save_items(entry, items)?;
            }
        }
        info!(
            "event=items_ingest module=items status={} item_count={} list_count={}",
            status_for(mode),
            added.len(),
            pending.len()
        );
        Ok(added)
    }

    pub fn find(&self, slug: &str, filter: &ItemFilter) -> ListsResult<Vec<Item>> {
        let items = self.list_items(slug)?;
        Ok(items
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect())
    }

    /// Replaces fields of one item in place.
    ///
    /// An update that changes nothing leaves the file and `updated_at` as
    /// they were.
    pub fn set(
        &self,
        slug: &str,
        id: ItemId,
        update: &ItemUpdate,
        mode: WriteMode,
    ) -> ListsResult<SetOutcome> {
        let entry = self.entry(slug)?;
        let mut items = self.items.load_items(entry)?;
        let position = items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ListsError::ItemNotFound {
                slug: entry.slug.clone(),
                id,
            })?;

        let item = &mut items[position];
        let changed = update.apply(item);
        if changed {
            item.touch();
        }
        item.validate()?;
        let updated = item.clone();

        if changed && mode.is_live() {
            self.items.save_items(entry, &items)?;
        }
        info!(
            "event=item_set module=items status={} slug={} item_id={} changed={}",
            if changed { status_for(mode) } else { "skip" },
            entry.slug,
            id,
            changed
        );
        Ok(SetOutcome {
            item: updated,
            changed,
        })
    }

    pub fn pin(&self, slug: &str, id: ItemId, mode: WriteMode) -> ListsResult<SetOutcome> {
        self.set(slug, id, &ItemUpdate::status(ItemStatus::Pinned), mode)
    }

    pub fn unpin(&self, slug: &str, id: ItemId, mode: WriteMode) -> ListsResult<SetOutcome> {
        self.set(slug, id, &ItemUpdate::status(ItemStatus::Open), mode)
    }

    /// Moves one item from `source` to the end of `target`, appending a
    /// provenance sentence to its notes.
    ///
    /// # Errors
    /// - `ListNotFound` for an unregistered source or target.
    /// - `SameList` when both slugs are equal.
    /// - `ItemNotFound` when `id` is not in the source list.
    pub fn move_item(
        &self,
        source: &str,
        id: ItemId,
        target: &str,
        mode: WriteMode,
    ) -> ListsResult<MovedItem> {
        let source_entry = self.entry(source)?;
        let target_entry = self.entry(target)?;
        if source_entry.slug == target_entry.slug {
            return Err(ListsError::SameList(source_entry.slug.clone()));
        }

        let mut source_items = self.items.load_items(source_entry)?;
        let position = source_items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| ListsError::ItemNotFound {
                slug: source_entry.slug.clone(),
                id,
            })?;
        let mut item = source_items.remove(position);

        let moved_at = time::advance_from(&item.updated_at);
        item.updated_at = moved_at.clone();
        item.append_note(&format!(
            "Moved from {} to {} at {moved_at}.",
            source_entry.slug, target_entry.slug
        ));
        item.validate()?;

        let mut target_items = self.items.load_items(target_entry)?;
        let replaced_existing = match target_items.iter().position(|existing| existing.id == id) {
            Some(existing) => {
                target_items[existing] = item.clone();
                true
            }
            None => {
                target_items.push(item.clone());
                false
            }
        };

        if mode.is_live() {
            self.items.save_items(target_entry, &target_items)?;
            self.items.save_items(source_entry, &source_items)?;
        }
        info!(
            "event=item_move module=items status={} source={} target={} item_id={} replaced_existing={}",
            status_for(mode),
            source_entry.slug,
            target_entry.slug,
            id,
            replaced_existing
        );
        Ok(MovedItem {
            item,
            source: source_entry.slug.clone(),
            target: target_entry.slug.clone(),
            replaced_existing,
        })
    }
}

fn build_item(request: NewItem, title: &str) -> Item {
    let mut item = match request.id {
        Some(id) => Item::with_id(id, title, time::now_iso()),
        None => Item::new(title),
    };
    item.status = request.status;
    item.body = non_blank(request.body);
    item.tags = request.tags.into_iter().map(|tag| tag.trim().to_string()).collect();
    item.priority = request.priority;
    item.project = non_blank(request.project);
    item.due = non_blank(request.due);
    item.notes = non_blank(request.notes);
    item
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn status_for(mode: WriteMode) -> &'static str {
    if mode.is_live() {
        "ok"
    } else {
        "dry_run"
    }
}
