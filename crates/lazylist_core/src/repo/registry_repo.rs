//! Registry repository over `index.jsonl`.

use crate::model::list_entry::ListEntry;
use crate::registry::Registry;
use crate::store::{self, StoreResult};
use std::path::{Path, PathBuf};

pub trait RegistryRepository {
    fn load(&self) -> StoreResult<Registry>;
    fn save(&self, registry: &Registry) -> StoreResult<()>;
}

/// Registry stored as one `ListEntry` per line.
#[derive(Debug, Clone)]
pub struct JsonlRegistryRepository {
    path: PathBuf,
}

impl JsonlRegistryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryRepository for JsonlRegistryRepository {
    fn load(&self) -> StoreResult<Registry> {
        let entries: Vec<ListEntry> = store::read_all(&self.path)?;
        Ok(Registry::new(entries))
    }

    fn save(&self, registry: &Registry) -> StoreResult<()> {
        store::write_all_preserving(&self.path, registry.list_all(), |entry| entry.slug.clone())
    }
}
