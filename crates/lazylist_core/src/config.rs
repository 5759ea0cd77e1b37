//! Engine configuration loaded from `lazylist.toml`.
//!
//! # Responsibility
//! - Provide defaults for every tunable so a bare workspace works.
//! - Resolve configured paths against the workspace root.
//!
//! # Invariants
//! - Similarity thresholds lie in `[0, 1]`.
//! - Health counts are ordered `warning <= critical <= urgent`.
//! - `max_tags` is positive.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up under the workspace root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "lazylist.toml";

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        message: String,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config `{}`: {message}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub lists_dir: PathBuf,
    pub registry_file: PathBuf,
    pub knowledge_file: PathBuf,
    pub backup_dir: PathBuf,
    pub lock_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lists_dir: PathBuf::from("lists"),
            registry_file: PathBuf::from("lists/index.jsonl"),
            knowledge_file: PathBuf::from("knowledge/facts.jsonl"),
            backup_dir: PathBuf::from("lists/backups"),
            lock_file: PathBuf::from("lists/index.lock"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityConfig {
    /// Minimum weighted score for a pair to be reported by `scan`.
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub list_count_warning: usize,
    pub list_count_critical: usize,
    pub list_count_urgent: usize,
    /// Pairs at or above this score count as merge opportunities.
    pub similar_list_threshold: f64,
    /// List that receives the consolidation alert item.
    pub alert_list: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            list_count_warning: 15,
            list_count_critical: 20,
            list_count_urgent: 30,
            similar_list_threshold: 0.6,
            alert_list: "system-upgrades".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    pub max_tags: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { max_tags: 3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsolidationConfig {
    /// Slugs whose markdown mirror is retired by `consolidate`.
    pub mirrored_lists: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListsConfig {
    pub paths: PathsConfig,
    pub similarity: SimilarityConfig,
    pub health: HealthConfig,
    pub classifier: ClassifierConfig,
    pub consolidation: ConsolidationConfig,
}

impl ListsConfig {
    /// Loads `explicit` when given, else `<root>/lazylist.toml` if present,
    /// else defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };
        let config = match candidate {
            Some(path) => {
                let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml_str(&raw).map_err(|err| match err {
                    ConfigError::Parse { message, .. } => ConfigError::Parse { path, message },
                    other => other,
                })?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE_NAME),
            message: err.message().to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("similarity.threshold", self.similarity.threshold),
            (
                "health.similar_list_threshold",
                self.health.similar_list_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        let health = &self.health;
        if health.list_count_warning > health.list_count_critical
            || health.list_count_critical > health.list_count_urgent
        {
            return Err(ConfigError::Invalid(format!(
                "health counts must satisfy warning <= critical <= urgent, got {}/{}/{}",
                health.list_count_warning, health.list_count_critical, health.list_count_urgent
            )));
        }
        if health.alert_list.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "health.alert_list must not be empty".to_string(),
            ));
        }
        if self.classifier.max_tags == 0 {
            return Err(ConfigError::Invalid(
                "classifier.max_tags must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_paths(&self, root: &Path) -> ListsPaths {
        let join = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            }
        };
        ListsPaths {
            root: root.to_path_buf(),
            lists_dir: join(&self.paths.lists_dir),
            registry_file: join(&self.paths.registry_file),
            knowledge_file: join(&self.paths.knowledge_file),
            backup_dir: join(&self.paths.backup_dir),
            lock_file: join(&self.paths.lock_file),
        }
    }
}

/// Absolute locations of engine files for one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListsPaths {
    pub root: PathBuf,
    pub lists_dir: PathBuf,
    pub registry_file: PathBuf,
    pub knowledge_file: PathBuf,
    pub backup_dir: PathBuf,
    pub lock_file: PathBuf,
}

impl ListsPaths {
    /// Resolves a path stored in a registry entry.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let path = Path::new(stored);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Root-relative path string recorded for a new list file.
    pub fn relative_list_file(&self, slug: &str, extension: &str) -> String {
        let dir = self
            .lists_dir
            .strip_prefix(&self.root)
            .unwrap_or(&self.lists_dir);
        dir.join(format!("{slug}.{extension}"))
            .to_string_lossy()
            .replace('\\', "/")
    }
}
