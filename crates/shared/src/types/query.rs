//! Typed list queries.
//!
//! Each repository declares its own filter and sort-field types; `QuerySpec`
//! bundles them with search text, direction, and paging.

use serde::{Deserialize, Serialize};

use super::pagination::PageRequest;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortDirection {
    /// Applies the direction to an ascending comparison.
    #[must_use]
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// A list query over one entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec<F, S> {
    /// Equality filters.
    #[serde(default)]
    pub filter: F,
    /// Free-text search, matched case-insensitively.
    #[serde(default)]
    pub search: Option<String>,
    /// Field to sort on.
    #[serde(default)]
    pub sort: S,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
    /// Page to return.
    #[serde(default)]
    pub page: PageRequest,
}

impl<F: Default, S: Default> QuerySpec<F, S> {
    /// Creates a query with the given filter and defaults elsewhere.
    #[must_use]
    pub fn filtered(filter: F) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

impl<F, S> QuerySpec<F, S> {
    /// Returns the trimmed, lowercased search text, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Sets the page.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}
