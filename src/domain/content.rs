//! Common view over the entities that flow through the query pipeline.

use uuid::Uuid;

use crate::domain::{
    entities::{CategoryRecord, CategorySummary, PostRecord},
    types::ContentStatus,
};

pub trait ContentEntity: Clone + Send + Sync + 'static {
    /// Entity kind used in logs, errors and metric labels.
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn slug(&self) -> &str;
    fn status(&self) -> ContentStatus;

    /// Lowercased text matched by free-text search.
    fn searchable_text(&self) -> String;

    fn is_published(&self) -> bool {
        self.status() == ContentStatus::Published
    }
}

impl ContentEntity for PostRecord {
    const KIND: &'static str = "post";

    fn id(&self) -> Uuid {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn status(&self) -> ContentStatus {
        self.status
    }

    fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.excerpt.len() + 32);
        text.push_str(&self.title);
        text.push('\n');
        text.push_str(&self.excerpt);
        for tag in &self.tags {
            text.push('\n');
            text.push_str(tag);
        }
        text.to_lowercase()
    }
}

impl ContentEntity for CategoryRecord {
    const KIND: &'static str = "category";

    fn id(&self) -> Uuid {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn status(&self) -> ContentStatus {
        self.status
    }

    fn searchable_text(&self) -> String {
        format!("{}\n{}", self.name, self.description).to_lowercase()
    }
}

impl ContentEntity for CategorySummary {
    const KIND: &'static str = "category";

    fn id(&self) -> Uuid {
        self.category.id
    }

    fn slug(&self) -> &str {
        &self.category.slug
    }

    fn status(&self) -> ContentStatus {
        self.category.status
    }

    fn searchable_text(&self) -> String {
        self.category.searchable_text()
    }
}
