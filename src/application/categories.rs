//! Category listings with published post counts.

use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::caches::QueryCaches;
use crate::application::error::AppError;
use crate::application::filters::{CategoryFilters, PostFilters};
use crate::application::pagination::{PageLimits, PaginatedResult};
use crate::application::posts::{PostPage, PostService};
use crate::application::query::{ListScope, QueryError, sort_entities};
use crate::application::repos::{CategoriesRepo, PostsRepo, RepoError};
use crate::domain::entities::{CategoryRecord, CategorySummary, PostRecord};

pub type CategoryPage = Arc<PaginatedResult<CategorySummary, CategoryFilters>>;

pub struct CategoryService {
    categories: Arc<dyn CategoriesRepo>,
    posts: Arc<dyn PostsRepo>,
    post_service: Arc<PostService>,
    caches: Arc<QueryCaches>,
    limits: PageLimits,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn CategoriesRepo>,
        posts: Arc<dyn PostsRepo>,
        post_service: Arc<PostService>,
        caches: Arc<QueryCaches>,
        limits: PageLimits,
    ) -> Self {
        Self {
            categories,
            posts,
            post_service,
            caches,
            limits,
        }
    }

    pub fn query(
        &self,
        page: u32,
        page_size: Option<u32>,
        filters: &CategoryFilters,
    ) -> Result<CategoryPage, AppError> {
        let request = self.limits.request(page, page_size)?;
        let filters = filters.clone().normalize();
        let categories = Arc::clone(&self.categories);
        let posts = Arc::clone(&self.posts);
        let page = self
            .caches
            .categories()
            .query(ListScope::Public, request, &filters, move || {
                summarize(categories.as_ref(), posts.as_ref()).map_err(QueryError::from)
            })?;
        Ok(page)
    }

    /// Every published category with its post count, ordered by name.
    pub fn list_with_counts(&self) -> Result<Vec<CategorySummary>, AppError> {
        let published: Vec<_> = summarize(self.categories.as_ref(), self.posts.as_ref())?
            .into_iter()
            .filter(|summary| summary.category.status.is_published())
            .collect();
        Ok(sort_entities(published, &CategoryFilters::default()))
    }

    pub fn find_by_slug(&self, slug: &str) -> Result<Option<CategorySummary>, AppError> {
        let Some(category) = self
            .categories
            .find_category_by_slug(slug)?
            .filter(|category| category.status.is_published())
        else {
            return Ok(None);
        };
        let posts = self.posts.list_posts()?;
        Ok(Some(summary_for(category, &posts)))
    }

    /// Published posts filed under the category `slug`.
    pub fn posts_in_category(
        &self,
        slug: &str,
        page: u32,
        page_size: Option<u32>,
    ) -> Result<PostPage, AppError> {
        let category = self
            .find_by_slug(slug)?
            .ok_or_else(|| AppError::not_found("category", slug))?;
        let filters = PostFilters {
            categories: [category.category.id].into_iter().collect(),
            ..Default::default()
        };
        self.post_service.query(page, page_size, &filters)
    }

    pub fn create(&self, name: &str, description: &str) -> Result<CategoryRecord, AppError> {
        let category =
            self.categories
                .create_category(name, description, OffsetDateTime::now_utc())?;
        info!(category_id = %category.id, slug = %category.slug, "Created category");
        self.caches.after_write("category.create");
        Ok(category)
    }

    pub fn clear_cache(&self) -> usize {
        self.caches.categories().clear_cache()
    }
}

fn summarize(
    categories: &dyn CategoriesRepo,
    posts: &dyn PostsRepo,
) -> Result<Vec<CategorySummary>, RepoError> {
    let posts = posts.list_posts()?;
    let counts = published_counts(&posts);
    Ok(categories
        .list_categories()?
        .into_iter()
        .map(|category| {
            let post_count = counts.get(&category.id).copied().unwrap_or(0);
            CategorySummary {
                category,
                post_count,
            }
        })
        .collect())
}

fn summary_for(category: CategoryRecord, posts: &[PostRecord]) -> CategorySummary {
    let post_count = posts
        .iter()
        .filter(|post| post.is_public() && post.category_ids.contains(&category.id))
        .count();
    CategorySummary {
        category,
        post_count,
    }
}

fn published_counts(posts: &[PostRecord]) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();
    for post in posts.iter().filter(|post| post.is_public()) {
        for id in &post.category_ids {
            *counts.entry(*id).or_insert(0) += 1;
        }
    }
    counts
}
