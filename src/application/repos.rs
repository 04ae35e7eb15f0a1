//! Repository traits describing entity store adapters.

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::entities::{CategoryRecord, NewPost, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::slug::SlugError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate {entity} {field} `{value}`")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{entity} `{key}` not found")]
    NotFound { entity: &'static str, key: String },
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RepoError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// Status transition requested for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTransition {
    Publish,
    Archive,
}

/// Counter bumped by reader interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Views,
    Likes,
}

pub trait PostsRepo: Send + Sync {
    fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError>;

    fn find_post_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError>;

    /// Insert a draft; the slug is derived from the title when not supplied.
    fn create_post(&self, post: NewPost, now: OffsetDateTime) -> Result<PostRecord, RepoError>;

    fn increment_counter(&self, id: Uuid, counter: PostCounter) -> Result<PostRecord, RepoError>;

    fn transition_post(
        &self,
        id: Uuid,
        transition: PostTransition,
        now: OffsetDateTime,
    ) -> Result<PostRecord, RepoError>;
}

pub trait CategoriesRepo: Send + Sync {
    fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    fn find_category_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    fn find_category_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError>;

    /// Insert a published category with a slug derived from its name.
    fn create_category(
        &self,
        name: &str,
        description: &str,
        now: OffsetDateTime,
    ) -> Result<CategoryRecord, RepoError>;
}
