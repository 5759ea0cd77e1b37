//! Item repository: one JSONL file per registered list.

use crate::config::ListsPaths;
use crate::model::item::Item;
use crate::model::list_entry::ListEntry;
use crate::store::{self, StoreError, StoreResult};
use std::path::PathBuf;

pub trait ItemRepository {
    /// Items in stored order. A missing file is an empty list.
    fn load_items(&self, entry: &ListEntry) -> StoreResult<Vec<Item>>;
    /// Replaces the whole list file. Records that did not change keep their
    /// stored line.
    fn save_items(&self, entry: &ListEntry, items: &[Item]) -> StoreResult<()>;
    /// Creates an empty list file when none exists. Returns whether it did.
    fn ensure_list_file(&self, entry: &ListEntry) -> StoreResult<bool>;
    fn list_file(&self, entry: &ListEntry) -> PathBuf;
}

#[derive(Debug, Clone)]
pub struct JsonlItemRepository {
    paths: ListsPaths,
}

impl JsonlItemRepository {
    pub fn new(paths: ListsPaths) -> Self {
        Self { paths }
    }
}

impl ItemRepository for JsonlItemRepository {
    fn load_items(&self, entry: &ListEntry) -> StoreResult<Vec<Item>> {
        store::read_all(&self.list_file(entry))
    }

    fn save_items(&self, entry: &ListEntry, items: &[Item]) -> StoreResult<()> {
        store::write_all_preserving(&self.list_file(entry), items, |item| item.id)
    }

    fn ensure_list_file(&self, entry: &ListEntry) -> StoreResult<bool> {
        let path = self.list_file(entry);
        match path.try_exists() {
            Ok(true) => Ok(false),
            Ok(false) => {
                store::atomic_write(&path, b"")?;
                Ok(true)
            }
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }

    fn list_file(&self, entry: &ListEntry) -> PathBuf {
        self.paths.resolve(&entry.path_jsonl)
    }
}
