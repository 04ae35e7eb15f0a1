//! Content query pipeline: filter, sort, paginate and assemble, fronted by a
//! per-pipeline TTL cache.

mod filter;
mod pipeline;
mod sort;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::repos::RepoError;
use crate::domain::types::SortDirection;

pub use filter::{filter_entities, intersects, matches_search, within_range};
pub use pipeline::{QueryPipeline, run_query};
pub use sort::sort_entities;

/// Which entities a listing may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    /// Published entities only.
    Public,
    /// Every entity regardless of status.
    Admin,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    Validation(String),
    #[error("failed to derive cache key: {0}")]
    Key(#[from] serde_json::Error),
    #[error(transparent)]
    Source(#[from] RepoError),
}

impl QueryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Typed predicate set plus ordering for one entity kind.
///
/// Implementors serialize canonically: the JSON form is the cache key, so
/// set-valued predicates must live in ordered collections.
pub trait Criteria<E>: Clone + Serialize + Send + Sync + 'static {
    /// All predicates ANDed; absent predicates pass everything.
    fn matches(&self, entity: &E) -> bool;

    /// Ascending order of the selected sort field, without the id tiebreak.
    fn compare(&self, a: &E, b: &E) -> Ordering;

    fn direction(&self) -> SortDirection;

    fn validate(&self) -> Result<(), QueryError>;
}
