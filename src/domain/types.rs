//! Shared domain enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Publication lifecycle shared by posts and categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

impl ContentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Draft => "draft",
            ContentStatus::Published => "published",
            ContentStatus::Archived => "archived",
        }
    }

    pub fn is_published(self) -> bool {
        self == ContentStatus::Published
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContentStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(ContentStatus::Draft),
            "published" => Ok(ContentStatus::Published),
            "archived" => Ok(ContentStatus::Archived),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl TryFrom<&str> for SortDirection {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

/// Sortable post fields.
///
/// Unknown names deserialize to [`PostSortField::PublishedAt`] instead of
/// failing, so stale links with retired sort keys still render a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum PostSortField {
    #[default]
    PublishedAt,
    UpdatedAt,
    Views,
    Likes,
    Title,
}

impl PostSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            PostSortField::PublishedAt => "published_at",
            PostSortField::UpdatedAt => "updated_at",
            PostSortField::Views => "views",
            PostSortField::Likes => "likes",
            PostSortField::Title => "title",
        }
    }

    /// Resolve a field name, falling back to the default for unknown names.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "published_at" | "publishedat" | "date" | "fecha" => PostSortField::PublishedAt,
            "updated_at" | "updatedat" => PostSortField::UpdatedAt,
            "views" | "vistas" => PostSortField::Views,
            "likes" => PostSortField::Likes,
            "title" | "titulo" => PostSortField::Title,
            other => {
                tracing::warn!(
                    sort_by = other,
                    fallback = PostSortField::default().as_str(),
                    "Unknown post sort field"
                );
                PostSortField::default()
            }
        }
    }
}

impl From<String> for PostSortField {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<PostSortField> for &'static str {
    fn from(value: PostSortField) -> Self {
        value.as_str()
    }
}

/// Sortable category fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum CategorySortField {
    #[default]
    Name,
    PostCount,
    CreatedAt,
}

impl CategorySortField {
    pub fn as_str(self) -> &'static str {
        match self {
            CategorySortField::Name => "name",
            CategorySortField::PostCount => "post_count",
            CategorySortField::CreatedAt => "created_at",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "name" | "nombre" => CategorySortField::Name,
            "post_count" | "postcount" | "posts" => CategorySortField::PostCount,
            "created_at" | "createdat" => CategorySortField::CreatedAt,
            other => {
                tracing::warn!(
                    sort_by = other,
                    fallback = CategorySortField::default().as_str(),
                    "Unknown category sort field"
                );
                CategorySortField::default()
            }
        }
    }
}

impl From<String> for CategorySortField {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<CategorySortField> for &'static str {
    fn from(value: CategorySortField) -> Self {
        value.as_str()
    }
}
