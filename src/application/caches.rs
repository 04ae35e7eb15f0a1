//! Query pipelines shared by the post and category services.

use std::sync::Arc;

use tracing::info;

use crate::application::filters::{CategoryFilters, PostFilters};
use crate::application::query::QueryPipeline;
use crate::cache::{CacheConfig, Clock, SystemClock};
use crate::domain::entities::{CategorySummary, PostRecord};

pub struct QueryCaches {
    posts: QueryPipeline<PostRecord, PostFilters>,
    categories: QueryPipeline<CategorySummary, CategoryFilters>,
    config: CacheConfig,
}

impl QueryCaches {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts: QueryPipeline::with_clock("posts", config.clone(), Arc::clone(&clock)),
            categories: QueryPipeline::with_clock("categories", config.clone(), clock),
            config,
        }
    }

    pub fn posts(&self) -> &QueryPipeline<PostRecord, PostFilters> {
        &self.posts
    }

    pub fn categories(&self) -> &QueryPipeline<CategorySummary, CategoryFilters> {
        &self.categories
    }

    /// Called after every store mutation. Post writes change category counts
    /// too, so both pipelines are cleared.
    pub fn after_write(&self, reason: &'static str) {
        if !self.config.invalidate_on_write {
            return;
        }
        let removed = self.clear_all();
        info!(reason, removed, "Invalidated query caches after write");
    }

    pub fn clear_all(&self) -> usize {
        self.posts.clear_cache() + self.categories.clear_cache()
    }
}
