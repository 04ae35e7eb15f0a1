//! In-memory entity store.

use std::sync::RwLock;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::{
    CategoriesRepo, PostCounter, PostTransition, PostsRepo, RepoError,
};
use crate::cache::{rw_read, rw_write};
use crate::domain::content::ContentEntity;
use crate::domain::entities::{CategoryRecord, NewPost, PostRecord};
use crate::domain::error::DomainError;
use crate::domain::slug::{ensure_valid_slug, generate_unique_slug};
use crate::domain::types::ContentStatus;

use super::seed::ContentSeed;

const SOURCE: &str = "infra::memory";

/// Posts and categories kept in insertion order behind read/write locks.
///
/// Ids and slugs are unique per entity kind; every post must reference
/// known categories.
#[derive(Default)]
pub struct InMemoryContentStore {
    posts: RwLock<Vec<PostRecord>>,
    categories: RwLock<Vec<CategoryRecord>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data, categories first.
    pub fn from_seed(seed: ContentSeed) -> Result<Self, RepoError> {
        let store = Self::new();
        for category in seed.categories {
            store.insert_category(category)?;
        }
        for post in seed.posts {
            store.insert_post(post)?;
        }
        debug!(
            posts = rw_read(&store.posts, SOURCE, "from_seed.posts").len(),
            categories = rw_read(&store.categories, SOURCE, "from_seed.categories").len(),
            "Loaded content seed"
        );
        Ok(store)
    }

    pub fn insert_post(&self, post: PostRecord) -> Result<(), RepoError> {
        ensure_valid_slug(&post.slug)?;
        check_publication_stamp(&post)?;
        {
            let categories = rw_read(&self.categories, SOURCE, "insert_post.categories");
            if let Some(missing) = post
                .category_ids
                .iter()
                .find(|id| !categories.iter().any(|category| category.id == **id))
            {
                return Err(DomainError::invariant(format!(
                    "post `{}` references unknown category {missing}",
                    post.slug
                ))
                .into());
            }
        }

        let mut posts = rw_write(&self.posts, SOURCE, "insert_post");
        ensure_unique(&posts, &post)?;
        posts.push(post);
        Ok(())
    }

    pub fn insert_category(&self, category: CategoryRecord) -> Result<(), RepoError> {
        ensure_valid_slug(&category.slug)?;
        let mut categories = rw_write(&self.categories, SOURCE, "insert_category");
        ensure_unique(&categories, &category)?;
        categories.push(category);
        Ok(())
    }

    fn update_post<F>(&self, id: Uuid, op: &'static str, update: F) -> Result<PostRecord, RepoError>
    where
        F: FnOnce(&mut PostRecord) -> Result<(), DomainError>,
    {
        let mut posts = rw_write(&self.posts, SOURCE, op);
        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or_else(|| RepoError::not_found(PostRecord::KIND, id))?;
        update(post)?;
        Ok(post.clone())
    }
}

fn ensure_unique<E: ContentEntity>(existing: &[E], candidate: &E) -> Result<(), RepoError> {
    if existing.iter().any(|entity| entity.id() == candidate.id()) {
        return Err(RepoError::Duplicate {
            entity: E::KIND,
            field: "id",
            value: candidate.id().to_string(),
        });
    }
    if existing.iter().any(|entity| entity.slug() == candidate.slug()) {
        return Err(RepoError::Duplicate {
            entity: E::KIND,
            field: "slug",
            value: candidate.slug().to_string(),
        });
    }
    Ok(())
}

fn check_publication_stamp(post: &PostRecord) -> Result<(), DomainError> {
    match (post.status, post.published_at) {
        (ContentStatus::Draft, Some(_)) => Err(DomainError::invariant(format!(
            "draft post `{}` must not carry published_at",
            post.slug
        ))),
        (ContentStatus::Published | ContentStatus::Archived, None) => {
            Err(DomainError::invariant(format!(
                "post `{}` left draft without published_at",
                post.slug
            )))
        }
        _ => Ok(()),
    }
}

impl PostsRepo for InMemoryContentStore {
    fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(rw_read(&self.posts, SOURCE, "list_posts").clone())
    }

    fn find_post_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(rw_read(&self.posts, SOURCE, "find_post_by_id")
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        Ok(rw_read(&self.posts, SOURCE, "find_post_by_slug")
            .iter()
            .find(|post| post.slug == slug)
            .cloned())
    }

    fn create_post(&self, post: NewPost, now: OffsetDateTime) -> Result<PostRecord, RepoError> {
        let slug = {
            let posts = rw_read(&self.posts, SOURCE, "create_post.slug");
            let is_unique = |candidate: &str| posts.iter().all(|post| post.slug != candidate);
            match post.slug {
                Some(slug) => {
                    ensure_valid_slug(&slug)?;
                    if !is_unique(&slug) {
                        return Err(RepoError::Duplicate {
                            entity: PostRecord::KIND,
                            field: "slug",
                            value: slug,
                        });
                    }
                    slug
                }
                None => generate_unique_slug(&post.title, is_unique)?,
            }
        };

        let record = PostRecord {
            id: Uuid::new_v4(),
            slug,
            title: post.title,
            excerpt: post.excerpt,
            body: post.body,
            status: ContentStatus::Draft,
            author: post.author,
            category_ids: post.category_ids,
            tags: post.tags,
            featured: post.featured,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        self.insert_post(record.clone())?;
        Ok(record)
    }

    fn increment_counter(&self, id: Uuid, counter: PostCounter) -> Result<PostRecord, RepoError> {
        self.update_post(id, "increment_counter", |post| {
            match counter {
                PostCounter::Views => post.views = post.views.saturating_add(1),
                PostCounter::Likes => post.likes = post.likes.saturating_add(1),
            }
            Ok(())
        })
    }

    fn transition_post(
        &self,
        id: Uuid,
        transition: PostTransition,
        now: OffsetDateTime,
    ) -> Result<PostRecord, RepoError> {
        self.update_post(id, "transition_post", |post| match transition {
            PostTransition::Publish => post.publish(now),
            PostTransition::Archive => post.archive(now),
        })
    }
}

impl CategoriesRepo for InMemoryContentStore {
    fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.categories, SOURCE, "list_categories").clone())
    }

    fn find_category_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.categories, SOURCE, "find_category_by_id")
            .iter()
            .find(|category| category.id == id)
            .cloned())
    }

    fn find_category_by_slug(&self, slug: &str) -> Result<Option<CategoryRecord>, RepoError> {
        Ok(rw_read(&self.categories, SOURCE, "find_category_by_slug")
            .iter()
            .find(|category| category.slug == slug)
            .cloned())
    }

    fn create_category(
        &self,
        name: &str,
        description: &str,
        now: OffsetDateTime,
    ) -> Result<CategoryRecord, RepoError> {
        let slug = {
            let categories = rw_read(&self.categories, SOURCE, "create_category.slug");
            generate_unique_slug(name, |candidate| {
                categories.iter().all(|category| category.slug != candidate)
            })?
        };

        let record = CategoryRecord {
            id: Uuid::new_v4(),
            slug,
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            status: ContentStatus::Published,
            created_at: now,
            updated_at: now,
        };
        self.insert_category(record.clone())?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::macros::datetime;

    use crate::domain::entities::PostAuthor;

    use super::*;

    fn category(n: u128, slug: &str) -> CategoryRecord {
        CategoryRecord {
            id: Uuid::from_u128(n),
            slug: slug.to_string(),
            name: slug.to_string(),
            description: String::new(),
            status: ContentStatus::Published,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn post(n: u128, slug: &str, categories: &[u128]) -> PostRecord {
        PostRecord {
            id: Uuid::from_u128(n),
            slug: slug.to_string(),
            title: slug.to_string(),
            excerpt: String::new(),
            body: String::new(),
            status: ContentStatus::Published,
            author: PostAuthor {
                id: Uuid::nil(),
                name: "Ana".to_string(),
            },
            category_ids: categories.iter().copied().map(Uuid::from_u128).collect(),
            tags: BTreeSet::new(),
            featured: false,
            views: 0,
            likes: 0,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
            published_at: Some(datetime!(2024-01-01 00:00 UTC)),
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            slug: None,
            title: title.to_string(),
            excerpt: String::new(),
            body: String::new(),
            author: PostAuthor {
                id: Uuid::nil(),
                name: "Ana".to_string(),
            },
            category_ids: BTreeSet::new(),
            tags: BTreeSet::new(),
            featured: false,
        }
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let store = InMemoryContentStore::new();
        store.insert_post(post(1, "hello", &[])).expect("first insert");

        let err = store
            .insert_post(post(2, "hello", &[]))
            .expect_err("duplicate slug");
        assert!(matches!(err, RepoError::Duplicate { field: "slug", .. }));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let store = InMemoryContentStore::new();
        store
            .insert_category(category(1, "web"))
            .expect("first insert");

        let err = store
            .insert_category(category(1, "data"))
            .expect_err("duplicate id");
        assert!(matches!(err, RepoError::Duplicate { field: "id", .. }));
    }

    #[test]
    fn posts_must_reference_known_categories() {
        let store = InMemoryContentStore::new();
        let err = store
            .insert_post(post(1, "orphan", &[42]))
            .expect_err("unknown category");
        assert!(matches!(err, RepoError::Domain(DomainError::Invariant { .. })));
    }

    #[test]
    fn published_post_requires_publication_stamp() {
        let store = InMemoryContentStore::new();
        let mut unstamped = post(1, "unstamped", &[]);
        unstamped.published_at = None;

        assert!(store.insert_post(unstamped).is_err());
    }

    #[test]
    fn created_posts_get_unique_slugs_and_start_as_drafts() {
        let store = InMemoryContentStore::new();
        let now = datetime!(2024-05-01 12:00 UTC);

        let first = store
            .create_post(new_post("Señales en Angular"), now)
            .expect("created");
        let second = store
            .create_post(new_post("Señales en Angular"), now)
            .expect("created");

        assert_eq!(first.slug, "senales-en-angular");
        assert_eq!(second.slug, "senales-en-angular-2");
        assert_eq!(first.status, ContentStatus::Draft);
        assert_eq!(first.published_at, None);
    }

    #[test]
    fn counters_and_transitions_update_the_stored_post() {
        let store = InMemoryContentStore::new();
        let draft = store
            .create_post(new_post("Draft"), datetime!(2024-05-01 12:00 UTC))
            .expect("created");

        store
            .increment_counter(draft.id, PostCounter::Views)
            .expect("view");
        let liked = store
            .increment_counter(draft.id, PostCounter::Likes)
            .expect("like");
        assert_eq!((liked.views, liked.likes), (1, 1));

        let published = store
            .transition_post(
                draft.id,
                PostTransition::Publish,
                datetime!(2024-05-02 08:00 UTC),
            )
            .expect("published");
        assert_eq!(published.published_at, Some(datetime!(2024-05-02 08:00 UTC)));

        let missing = store.increment_counter(Uuid::from_u128(77), PostCounter::Views);
        assert!(matches!(missing, Err(RepoError::NotFound { .. })));
    }
}
