//! Strongly typed filter criteria for post and category listings.
//!
//! Every predicate is optional. Set-valued predicates use ordered sets, and an
//! empty set means "no constraint". The serialized form of a filter value is
//! part of the query cache key.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::application::query::{Criteria, QueryError, intersects, matches_search, within_range};
use crate::domain::entities::{CategorySummary, PostRecord};
use crate::domain::slug::collate;
use crate::domain::types::{CategorySortField, ContentStatus, PostSortField, SortDirection};

const MAX_SEARCH_LEN: usize = 200;

/// Inclusive publish-date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateRange {
    #[serde(with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    fn to_utc(self) -> Self {
        Self {
            from: self.from.map(|at| at.to_offset(UtcOffset::UTC)),
            to: self.to.map(|at| at.to_offset(UtcOffset::UTC)),
        }
    }

    fn validate(&self) -> Result<(), QueryError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(QueryError::validation(
                "date range starts after it ends",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostFilters {
    pub search: Option<String>,
    pub categories: BTreeSet<Uuid>,
    pub tags: BTreeSet<String>,
    pub author: Option<Uuid>,
    pub status: Option<ContentStatus>,
    pub featured: Option<bool>,
    #[serde(alias = "dateRange")]
    pub date_range: DateRange,
    #[serde(alias = "sortBy")]
    pub sort_by: PostSortField,
    pub direction: SortDirection,
}

impl PostFilters {
    /// Parse loosely typed JSON (any key order); malformed shapes are rejected.
    pub fn from_json(value: serde_json::Value) -> Result<Self, QueryError> {
        serde_json::from_value(value)
            .map_err(|err| QueryError::validation(format!("malformed post filters: {err}")))
    }

    /// Canonical form: trimmed search (dropped when blank), trimmed non-empty
    /// tags, UTC date bounds.
    pub fn normalize(mut self) -> Self {
        self.search = normalize_search(self.search);
        self.tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        self.date_range = self.date_range.to_utc();
        self
    }

    pub fn has_predicates(&self) -> bool {
        self.search.is_some()
            || !self.categories.is_empty()
            || !self.tags.is_empty()
            || self.author.is_some()
            || self.status.is_some()
            || self.featured.is_some()
            || !self.date_range.is_open()
    }
}

impl Criteria<PostRecord> for PostFilters {
    fn matches(&self, post: &PostRecord) -> bool {
        matches_search(self.search.as_deref(), post)
            && intersects(&self.categories, &post.category_ids)
            && intersects(&self.tags, &post.tags)
            && self.author.is_none_or(|author| post.author.id == author)
            && self.status.is_none_or(|status| post.status == status)
            && self.featured.is_none_or(|featured| post.featured == featured)
            && within_range(&self.date_range, post.publish_date())
    }

    fn compare(&self, a: &PostRecord, b: &PostRecord) -> Ordering {
        match self.sort_by {
            PostSortField::PublishedAt => a.publish_date().cmp(&b.publish_date()),
            PostSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            PostSortField::Views => a.views.cmp(&b.views),
            PostSortField::Likes => a.likes.cmp(&b.likes),
            PostSortField::Title => collate(&a.title, &b.title),
        }
    }

    fn direction(&self) -> SortDirection {
        self.direction
    }

    fn validate(&self) -> Result<(), QueryError> {
        validate_search(self.search.as_deref())?;
        self.date_range.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryFilters {
    pub search: Option<String>,
    pub status: Option<ContentStatus>,
    #[serde(alias = "hasPosts")]
    pub has_posts: Option<bool>,
    #[serde(alias = "sortBy")]
    pub sort_by: CategorySortField,
    pub direction: SortDirection,
}

impl Default for CategoryFilters {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            has_posts: None,
            sort_by: CategorySortField::Name,
            direction: SortDirection::Asc,
        }
    }
}

impl CategoryFilters {
    pub fn from_json(value: serde_json::Value) -> Result<Self, QueryError> {
        serde_json::from_value(value)
            .map_err(|err| QueryError::validation(format!("malformed category filters: {err}")))
    }

    pub fn normalize(mut self) -> Self {
        self.search = normalize_search(self.search);
        self
    }
}

impl Criteria<CategorySummary> for CategoryFilters {
    fn matches(&self, summary: &CategorySummary) -> bool {
        matches_search(self.search.as_deref(), summary)
            && self
                .status
                .is_none_or(|status| summary.category.status == status)
            && self
                .has_posts
                .is_none_or(|has_posts| (summary.post_count > 0) == has_posts)
    }

    fn compare(&self, a: &CategorySummary, b: &CategorySummary) -> Ordering {
        match self.sort_by {
            CategorySortField::Name => collate(&a.category.name, &b.category.name),
            CategorySortField::PostCount => a.post_count.cmp(&b.post_count),
            CategorySortField::CreatedAt => a.category.created_at.cmp(&b.category.created_at),
        }
    }

    fn direction(&self) -> SortDirection {
        self.direction
    }

    fn validate(&self) -> Result<(), QueryError> {
        validate_search(self.search.as_deref())
    }
}

fn normalize_search(search: Option<String>) -> Option<String> {
    search.and_then(|term| {
        let trimmed = term.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn validate_search(search: Option<&str>) -> Result<(), QueryError> {
    match search {
        Some(term) if term.chars().count() > MAX_SEARCH_LEN => Err(QueryError::validation(
            format!("search term longer than {MAX_SEARCH_LEN} characters"),
        )),
        _ => Ok(()),
    }
}
