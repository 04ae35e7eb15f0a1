//! Wiring of the application services over one entity store.

use std::sync::Arc;

use crate::application::caches::QueryCaches;
use crate::application::categories::CategoryService;
use crate::application::pagination::PageLimits;
use crate::application::posts::PostService;
use crate::application::repos::{CategoriesRepo, PostsRepo};
use crate::cache::{CacheConfig, Clock, SystemClock};

#[derive(Clone)]
pub struct ContentServices {
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub caches: Arc<QueryCaches>,
}

impl ContentServices {
    pub fn new<R>(store: Arc<R>, limits: PageLimits, cache: CacheConfig) -> Self
    where
        R: PostsRepo + CategoriesRepo + 'static,
    {
        Self::with_clock(store, limits, cache, Arc::new(SystemClock))
    }

    pub fn with_clock<R>(
        store: Arc<R>,
        limits: PageLimits,
        cache: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        R: PostsRepo + CategoriesRepo + 'static,
    {
        let caches = Arc::new(QueryCaches::with_clock(cache, clock));
        let posts_repo: Arc<dyn PostsRepo> = store.clone();
        let categories_repo: Arc<dyn CategoriesRepo> = store;

        let posts = Arc::new(PostService::new(
            Arc::clone(&posts_repo),
            Arc::clone(&caches),
            limits,
        ));
        let categories = Arc::new(CategoryService::new(
            categories_repo,
            posts_repo,
            Arc::clone(&posts),
            Arc::clone(&caches),
            limits,
        ));

        Self {
            posts,
            categories,
            caches,
        }
    }
}
