//! Content entities held by the entity store.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{error::DomainError, types::ContentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    pub status: ContentStatus,
    pub author: PostAuthor,
    #[serde(default)]
    pub category_ids: BTreeSet<Uuid>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

impl PostRecord {
    /// Date used for ordering and date-range filtering.
    pub fn publish_date(&self) -> OffsetDateTime {
        self.published_at.unwrap_or(self.created_at)
    }

    /// Move a draft to `published`, stamping `published_at` the first time.
    pub fn publish(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        match self.status {
            ContentStatus::Published => Ok(()),
            ContentStatus::Archived => Err(DomainError::invariant(format!(
                "post `{}` is archived and cannot be republished",
                self.slug
            ))),
            ContentStatus::Draft => {
                self.status = ContentStatus::Published;
                self.published_at.get_or_insert(now);
                self.updated_at = now;
                Ok(())
            }
        }
    }

    pub fn archive(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        match self.status {
            ContentStatus::Archived => Ok(()),
            ContentStatus::Draft => Err(DomainError::invariant(format!(
                "post `{}` was never published and cannot be archived",
                self.slug
            ))),
            ContentStatus::Published => {
                self.status = ContentStatus::Archived;
                self.updated_at = now;
                Ok(())
            }
        }
    }

    pub fn is_public(&self) -> bool {
        self.status == ContentStatus::Published
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ContentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A category together with the number of published posts filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: CategoryRecord,
    pub post_count: usize,
}

/// Input for creating a post; the slug is derived from the title when absent.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub author: PostAuthor,
    pub category_ids: BTreeSet<Uuid>,
    pub tags: BTreeSet<String>,
    pub featured: bool,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn draft() -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            excerpt: String::new(),
            body: String::new(),
            status: ContentStatus::Draft,
            author: PostAuthor {
                id: Uuid::nil(),
                name: "Ana".to_string(),
            },
            category_ids: BTreeSet::new(),
            tags: BTreeSet::new(),
            featured: false,
            views: 0,
            likes: 0,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
            published_at: None,
        }
    }

    #[test]
    fn publishing_stamps_published_at_once() {
        let mut post = draft();
        assert_eq!(post.publish_date(), datetime!(2024-01-01 00:00 UTC));

        post.publish(datetime!(2024-02-01 00:00 UTC))
            .expect("draft publishes");
        assert_eq!(post.status, ContentStatus::Published);
        assert_eq!(post.published_at, Some(datetime!(2024-02-01 00:00 UTC)));

        post.publish(datetime!(2024-03-01 00:00 UTC))
            .expect("republish is a no-op");
        assert_eq!(post.published_at, Some(datetime!(2024-02-01 00:00 UTC)));
    }

    #[test]
    fn archived_posts_cannot_return_to_published() {
        let mut post = draft();
        assert!(post.archive(datetime!(2024-02-01 00:00 UTC)).is_err());

        post.publish(datetime!(2024-02-01 00:00 UTC))
            .expect("draft publishes");
        post.archive(datetime!(2024-03-01 00:00 UTC))
            .expect("published archives");
        assert!(matches!(
            post.publish(datetime!(2024-04-01 00:00 UTC)),
            Err(DomainError::Invariant { .. })
        ));
    }

    #[test]
    fn post_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "id": "7b0c1d9e-3f1a-4b8e-9a57-3d2f6c1e0a11",
            "slug": "intro",
            "title": "Intro",
            "excerpt": "First steps",
            "status": "published",
            "author": {"id": "00000000-0000-0000-0000-000000000001", "name": "Ana"},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "published_at": "2024-01-02T00:00:00Z"
        }"#;
        let post: PostRecord = serde_json::from_str(json).expect("valid post json");
        assert!(post.tags.is_empty());
        assert_eq!(post.views, 0);
        assert_eq!(post.published_at, Some(datetime!(2024-01-02 00:00 UTC)));
    }
}
