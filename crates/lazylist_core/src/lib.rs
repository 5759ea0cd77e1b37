//! Core of the lazylist engine.
//! File-backed lists with a registry, per-list item files, a content
//! classifier and merge/health analysis. All invariants live here; the CLI
//! only parses arguments and prints results.

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod health;
pub mod knowledge;
pub mod logging;
pub mod maintenance;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod similarity;
pub mod store;
pub mod time;
pub mod validation;
pub mod workspace;

pub use classify::{classify, extract_tags, Classification, ClassificationRule};
pub use config::{ConfigError, ListsConfig, ListsPaths};
pub use error::{ErrorKind, ListsError, ListsResult};
pub use health::{AlertOutcome, HealthReport, HealthStatus};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Item, ItemId, ItemStatus, Priority};
pub use model::list_entry::ListEntry;
pub use registry::Registry;
pub use service::item_service::{ItemFilter, ItemService, ItemUpdate, NewItem};
pub use service::registry_service::{NewList, PromoteOutcome, RegistryService};
pub use service::WriteMode;
pub use store::{StoreError, StoreResult};
pub use validation::{Validate, ValidationError, Violation};
pub use workspace::Workspace;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
