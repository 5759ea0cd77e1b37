//! Engine-level error type returned by registry and item operations.

use crate::config::ConfigError;
use crate::model::item::ItemId;
use crate::store::StoreError;
use crate::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ListsResult<T> = Result<T, ListsError>;

/// Coarse failure category for callers choosing how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Corruption,
    Io,
    Config,
}

#[derive(Debug)]
pub enum ListsError {
    Validation(ValidationError),
    /// Item title was empty after trimming.
    EmptyTitle,
    ListNotFound(String),
    ItemNotFound {
        slug: String,
        id: ItemId,
    },
    DuplicateSlug(String),
    DuplicateItem {
        slug: String,
        id: ItemId,
    },
    /// Move source and destination are the same list.
    SameList(String),
    Store(StoreError),
    Config(ConfigError),
}

impl ListsError {
    /// Stable identifier used in log lines and CLI diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::EmptyTitle => "empty_title",
            Self::ListNotFound(_) => "list_not_found",
            Self::ItemNotFound { .. } => "item_not_found",
            Self::DuplicateSlug(_) => "duplicate_slug",
            Self::DuplicateItem { .. } => "duplicate_item",
            Self::SameList(_) => "same_list",
            Self::Store(err) => err.code(),
            Self::Config(_) => "config_invalid",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::EmptyTitle => ErrorKind::Validation,
            Self::ListNotFound(_) | Self::ItemNotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateSlug(_) | Self::DuplicateItem { .. } | Self::SameList(_) => {
                ErrorKind::Conflict
            }
            Self::Store(StoreError::Corruption { .. }) => ErrorKind::Corruption,
            Self::Store(StoreError::Locked(_)) => ErrorKind::Conflict,
            Self::Store(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl Display for ListsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmptyTitle => write!(f, "item title must not be empty"),
            Self::ListNotFound(slug) => write!(f, "list not found: {slug}"),
            Self::ItemNotFound { slug, id } => write!(f, "item {id} not found in list {slug}"),
            Self::DuplicateSlug(slug) => write!(f, "list already exists: {slug}"),
            Self::DuplicateItem { slug, id } => {
                write!(f, "item {id} already exists in list {slug}")
            }
            Self::SameList(slug) => {
                write!(f, "source and destination are the same list: {slug}")
            }
            Self::Store(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ListsError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ListsError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ConfigError> for ListsError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
