//! Post listing, lookup and reader interactions.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::caches::QueryCaches;
use crate::application::error::AppError;
use crate::application::filters::PostFilters;
use crate::application::pagination::{PageLimits, PaginatedResult};
use crate::application::query::{Criteria, ListScope, QueryError};
use crate::application::repos::{PostCounter, PostTransition, PostsRepo};
use crate::cache::{rw_read, rw_write};
use crate::domain::entities::{NewPost, PostRecord};
use crate::domain::types::{PostSortField, SortDirection};

const SOURCE: &str = "application::posts";

pub type PostPage = Arc<PaginatedResult<PostRecord, PostFilters>>;

pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    caches: Arc<QueryCaches>,
    limits: PageLimits,
    active_filters: RwLock<PostFilters>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostsRepo>, caches: Arc<QueryCaches>, limits: PageLimits) -> Self {
        Self {
            posts,
            caches,
            limits,
            active_filters: RwLock::new(PostFilters::default()),
        }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Published posts matching `filters`, one page at a time.
    pub fn query(
        &self,
        page: u32,
        page_size: Option<u32>,
        filters: &PostFilters,
    ) -> Result<PostPage, AppError> {
        self.run(ListScope::Public, page, page_size, filters)
    }

    /// Like [`PostService::query`] but including drafts and archived posts.
    pub fn query_admin(
        &self,
        page: u32,
        page_size: Option<u32>,
        filters: &PostFilters,
    ) -> Result<PostPage, AppError> {
        self.run(ListScope::Admin, page, page_size, filters)
    }

    #[instrument(level = "debug", skip(self, filters))]
    fn run(
        &self,
        scope: ListScope,
        page: u32,
        page_size: Option<u32>,
        filters: &PostFilters,
    ) -> Result<PostPage, AppError> {
        let request = self.limits.request(page, page_size)?;
        let filters = filters.clone().normalize();
        let posts = Arc::clone(&self.posts);
        let page = self.caches.posts().query(scope, request, &filters, move || {
            posts.list_posts().map_err(QueryError::from)
        })?;
        Ok(page)
    }

    /// Published post by slug; anything else reads as absent.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, AppError> {
        Ok(self
            .posts
            .find_post_by_slug(slug)?
            .filter(PostRecord::is_public))
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, AppError> {
        Ok(self.posts.find_post_by_id(id)?.filter(PostRecord::is_public))
    }

    /// Published posts sharing a category or tag with `slug`, most overlap
    /// first, then most recent. An unknown slug has no relations.
    pub fn related(&self, slug: &str, limit: usize) -> Result<Vec<PostRecord>, AppError> {
        let Some(anchor) = self.find_by_slug(slug)? else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(usize, PostRecord)> = self
            .posts
            .list_posts()?
            .into_iter()
            .filter(|post| post.is_public() && post.id != anchor.id)
            .filter_map(|post| {
                let shared = post.category_ids.intersection(&anchor.category_ids).count()
                    + post.tags.intersection(&anchor.tags).count();
                (shared > 0).then_some((shared, post))
            })
            .collect();

        scored.sort_by(|(shared_a, a), (shared_b, b)| {
            shared_b
                .cmp(shared_a)
                .then_with(|| b.publish_date().cmp(&a.publish_date()))
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, post)| post)
            .collect())
    }

    pub fn popular(&self, limit: u32) -> Result<Vec<PostRecord>, AppError> {
        self.top(limit, PostFilters {
            sort_by: PostSortField::Views,
            direction: SortDirection::Desc,
            ..Default::default()
        })
    }

    pub fn recent(&self, limit: u32) -> Result<Vec<PostRecord>, AppError> {
        self.top(limit, PostFilters::default())
    }

    pub fn featured(&self, limit: u32) -> Result<Vec<PostRecord>, AppError> {
        self.top(limit, PostFilters {
            featured: Some(true),
            ..Default::default()
        })
    }

    fn top(&self, limit: u32, filters: PostFilters) -> Result<Vec<PostRecord>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let size = limit.min(self.limits.max_page_size);
        Ok(self.query(1, Some(size), &filters)?.data.clone())
    }

    /// Published post count per tag.
    pub fn tag_counts(&self) -> Result<BTreeMap<String, usize>, AppError> {
        let mut counts = BTreeMap::new();
        for post in self.posts.list_posts()?.iter().filter(|post| post.is_public()) {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    pub fn record_view(&self, id: Uuid) -> Result<PostRecord, AppError> {
        let post = self.posts.increment_counter(id, PostCounter::Views)?;
        self.caches.after_write("post.view");
        Ok(post)
    }

    pub fn like(&self, id: Uuid) -> Result<PostRecord, AppError> {
        let post = self.posts.increment_counter(id, PostCounter::Likes)?;
        self.caches.after_write("post.like");
        Ok(post)
    }

    pub fn create(&self, post: NewPost) -> Result<PostRecord, AppError> {
        let created = self.posts.create_post(post, OffsetDateTime::now_utc())?;
        info!(post_id = %created.id, slug = %created.slug, "Created draft post");
        self.caches.after_write("post.create");
        Ok(created)
    }

    pub fn publish(&self, id: Uuid) -> Result<PostRecord, AppError> {
        self.transition(id, PostTransition::Publish, "post.publish")
    }

    pub fn archive(&self, id: Uuid) -> Result<PostRecord, AppError> {
        self.transition(id, PostTransition::Archive, "post.archive")
    }

    fn transition(
        &self,
        id: Uuid,
        transition: PostTransition,
        reason: &'static str,
    ) -> Result<PostRecord, AppError> {
        let post = self
            .posts
            .transition_post(id, transition, OffsetDateTime::now_utc())?;
        info!(post_id = %post.id, status = %post.status, "Post status changed");
        self.caches.after_write(reason);
        Ok(post)
    }

    pub fn active_filters(&self) -> PostFilters {
        rw_read(&self.active_filters, SOURCE, "active_filters").clone()
    }

    /// Replace the current listing filters after validating them.
    pub fn set_filters(&self, filters: PostFilters) -> Result<(), AppError> {
        let filters = filters.normalize();
        filters.validate()?;
        *rw_write(&self.active_filters, SOURCE, "set_filters") = filters;
        Ok(())
    }

    pub fn reset_filters(&self) {
        *rw_write(&self.active_filters, SOURCE, "reset_filters") = PostFilters::default();
    }

    pub fn query_active(&self, page: u32, page_size: Option<u32>) -> Result<PostPage, AppError> {
        let filters = self.active_filters();
        self.query(page, page_size, &filters)
    }

    pub fn clear_cache(&self) -> usize {
        self.caches.posts().clear_cache()
    }
}
