//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Enforce domain rules (uniqueness, provenance, timestamps) before writes.
//! - Share one code path between live and dry-run execution.
//!
//! # Invariants
//! - Every mutated record is validated before any repository write.
//! - `WriteMode::DryRun` performs every check and skips only the writes.

pub mod item_service;
pub mod registry_service;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Live,
    DryRun,
}

impl WriteMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            Self::DryRun
        } else {
            Self::Live
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::DryRun => "dry_run",
        }
    }
}
