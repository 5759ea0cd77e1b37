//! Workspace entry point binding configuration, paths and repositories.
//!
//! # Responsibility
//! - Resolve one workspace root into ready-to-use services.
//! - Hand out a fresh registry snapshot to every item operation.
//!
//! # Invariants
//! - Nothing is cached between calls; every operation re-reads the files it
//!   needs.

use crate::config::{ListsConfig, ListsPaths};
use crate::error::ListsResult;
use crate::health::{self, AlertOutcome, HealthReport};
use crate::knowledge::KnowledgeStore;
use crate::maintenance::consolidate::{self, ConsolidationReport};
use crate::maintenance::integrity::{self, IntegrityReport};
use crate::maintenance::reorder::{self, ReorderReport};
use crate::repo::item_repo::JsonlItemRepository;
use crate::repo::registry_repo::{JsonlRegistryRepository, RegistryRepository};
use crate::service::item_service::ItemService;
use crate::service::registry_service::RegistryService;
use crate::service::WriteMode;
use crate::similarity::{self, ScanReport};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

pub type JsonlRegistryService = RegistryService<JsonlRegistryRepository, JsonlItemRepository>;
pub type JsonlItemService = ItemService<JsonlItemRepository>;

#[derive(Debug, Clone)]
pub struct Workspace {
    config: ListsConfig,
    paths: ListsPaths,
}

impl Workspace {
    /// Opens `root`, loading `config_path` or `<root>/lazylist.toml`.
    pub fn open(root: impl Into<PathBuf>, config_path: Option<&Path>) -> ListsResult<Self> {
        let root = root.into();
        let config = ListsConfig::load(&root, config_path)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ListsConfig) -> Self {
        let root = root.into();
        let paths = config.resolve_paths(&root);
        Self { config, paths }
    }

    pub fn config(&self) -> &ListsConfig {
        &self.config
    }

    pub fn paths(&self) -> &ListsPaths {
        &self.paths
    }

    pub fn registry_repo(&self) -> JsonlRegistryRepository {
        JsonlRegistryRepository::new(self.paths.registry_file.clone())
    }

    pub fn item_repo(&self) -> JsonlItemRepository {
        JsonlItemRepository::new(self.paths.clone())
    }

    pub fn knowledge(&self) -> KnowledgeStore {
        KnowledgeStore::new(self.paths.knowledge_file.clone())
    }

    pub fn registry_service(&self) -> JsonlRegistryService {
        RegistryService::new(
            self.registry_repo(),
            self.item_repo(),
            self.knowledge(),
            self.paths.clone(),
        )
    }

    /// Item service over a registry snapshot taken now.
    pub fn item_service(&self) -> ListsResult<JsonlItemService> {
        let registry = self.registry_repo().load()?;
        Ok(ItemService::new(
            registry,
            self.item_repo(),
            self.config.classifier.max_tags,
        ))
    }

    /// Merge candidates at `threshold`, or the configured default.
    pub fn scan(&self, threshold: Option<f64>) -> ListsResult<ScanReport> {
        let registry = self.registry_repo().load()?;
        let threshold = threshold.unwrap_or(self.config.similarity.threshold);
        Ok(similarity::scan_registry(
            &registry,
            &self.item_repo(),
            threshold,
        ))
    }

    pub fn health(&self) -> ListsResult<HealthReport> {
        let thresholds = &self.config.health;
        let registry = self.registry_repo().load()?;
        let scan =
            similarity::scan_registry(&registry, &self.item_repo(), thresholds.similar_list_threshold);
        Ok(health::evaluate(registry.len(), &scan.candidates, thresholds))
    }

    pub fn record_health_alert(
        &self,
        report: &HealthReport,
        date: NaiveDate,
        mode: WriteMode,
    ) -> ListsResult<AlertOutcome> {
        health::record_alert(
            report,
            &self.registry_service(),
            self.item_repo(),
            &self.config.health.alert_list,
            date,
            mode,
        )
    }

    pub fn reorder(&self, mode: WriteMode) -> ListsResult<ReorderReport> {
        let registry = self.registry_repo().load()?;
        reorder::reorder_all(&registry, &self.paths, mode)
    }

    pub fn consolidate(&self, mode: WriteMode) -> ListsResult<ConsolidationReport> {
        let registry = self.registry_repo().load()?;
        consolidate::retire_mirrors(
            &registry,
            &self.paths,
            &self.config.consolidation.mirrored_lists,
            mode,
        )
    }

    pub fn check(&self) -> IntegrityReport {
        integrity::check(&self.registry_repo(), &self.paths)
    }
}
