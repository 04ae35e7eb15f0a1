//! Query orchestration.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::pagination::{PageRequest, PaginatedResult, PaginationInfo, paginate};
use crate::cache::{CacheConfig, CacheStats, Clock, QueryCache, QueryKey, SystemClock};
use crate::domain::content::ContentEntity;

use super::{Criteria, ListScope, QueryError, filter_entities, sort_entities};

/// Run filter → sort → paginate over `entities` and assemble the page.
pub fn run_query<E, C>(
    scope: ListScope,
    request: PageRequest,
    criteria: &C,
    entities: &[E],
) -> PaginatedResult<E, C>
where
    E: ContentEntity,
    C: Criteria<E>,
{
    let visible: Vec<E> = match scope {
        ListScope::Public => entities
            .iter()
            .filter(|entity| entity.is_published())
            .cloned()
            .collect(),
        ListScope::Admin => entities.to_vec(),
    };

    let filtered = filter_entities(&visible, criteria);
    let sorted = sort_entities(filtered, criteria);
    let (data, total_items) = paginate(&sorted, request);

    PaginatedResult {
        data,
        pagination: PaginationInfo::new(request, total_items),
        filters: criteria.clone(),
    }
}

/// Cached query pipeline for one entity kind.
pub struct QueryPipeline<E, C> {
    cache: QueryCache<PaginatedResult<E, C>>,
    config: CacheConfig,
    _criteria: PhantomData<fn() -> C>,
}

impl<E, C> QueryPipeline<E, C>
where
    E: ContentEntity,
    C: Criteria<E>,
{
    pub fn new(name: &'static str, config: CacheConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &'static str, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: QueryCache::with_clock(name, clock),
            config,
            _criteria: PhantomData,
        }
    }

    /// Answer a query, loading the source collection only on a cache miss.
    #[instrument(
        level = "debug",
        skip(self, criteria, source),
        fields(pipeline = self.cache.name(), page = request.page(), page_size = request.page_size())
    )]
    pub fn query<S>(
        &self,
        scope: ListScope,
        request: PageRequest,
        criteria: &C,
        source: S,
    ) -> Result<Arc<PaginatedResult<E, C>>, QueryError>
    where
        S: FnOnce() -> Result<Vec<E>, QueryError>,
    {
        criteria.validate()?;

        if !self.config.enabled {
            let entities = source()?;
            return Ok(Arc::new(run_query(scope, request, criteria, &entities)));
        }

        let key = QueryKey::derive(scope, request, criteria)?;
        self.cache.get_or_compute(&key, self.config.ttl, || {
            let entities = source()?;
            debug!(
                pipeline = self.cache.name(),
                entity = E::KIND,
                source_len = entities.len(),
                "Computing query page"
            );
            Ok(run_query(scope, request, criteria, &entities))
        })
    }

    pub fn clear_cache(&self) -> usize {
        self.cache.clear()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use time::{Duration as TimeDuration, macros::datetime};
    use uuid::Uuid;

    use crate::application::filters::PostFilters;
    use crate::cache::ManualClock;
    use crate::domain::entities::{PostAuthor, PostRecord};
    use crate::domain::types::{ContentStatus, PostSortField, SortDirection};

    use super::*;

    fn post(index: u64, status: ContentStatus, tags: &[&str]) -> PostRecord {
        let created = datetime!(2024-01-01 00:00 UTC) + TimeDuration::days(index as i64);
        PostRecord {
            id: Uuid::from_u128(u128::from(index) + 1),
            slug: format!("post-{index}"),
            title: format!("Post {index}"),
            excerpt: String::new(),
            body: String::new(),
            status,
            author: PostAuthor {
                id: Uuid::from_u128(1000),
                name: "Ana".to_string(),
            },
            category_ids: BTreeSet::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            featured: false,
            views: index * 3 % 7,
            likes: 0,
            created_at: created,
            updated_at: created,
            published_at: (status != ContentStatus::Draft).then_some(created),
        }
    }

    fn request(page: u32, size: u32) -> PageRequest {
        PageRequest::new(page, size, 100).expect("valid request")
    }

    #[test]
    fn public_scope_hides_unpublished_entities() {
        let posts = vec![
            post(0, ContentStatus::Published, &[]),
            post(1, ContentStatus::Draft, &[]),
            post(2, ContentStatus::Archived, &[]),
        ];

        let public = run_query(
            ListScope::Public,
            request(1, 10),
            &PostFilters::default(),
            &posts,
        );
        let admin = run_query(
            ListScope::Admin,
            request(1, 10),
            &PostFilters::default(),
            &posts,
        );

        assert_eq!(public.pagination.total_items, 1);
        assert_eq!(admin.pagination.total_items, 3);
    }

    #[test]
    fn total_items_counts_filtered_set_before_pagination() {
        let posts: Vec<_> = (0..7)
            .map(|i| {
                let tags: &[&str] = if i % 2 == 0 { &["rust"] } else { &[] };
                post(i, ContentStatus::Published, tags)
            })
            .collect();
        let filters = PostFilters {
            tags: ["rust".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let page = run_query(ListScope::Public, request(1, 2), &filters, &posts);

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total_items, 4);
        assert_eq!(page.pagination.total_pages, 2);
        assert!(page.pagination.has_next);
    }

    #[test]
    fn cached_page_is_reused_until_ttl_elapses() {
        let clock = ManualClock::new();
        let config = CacheConfig {
            ttl: Duration::from_secs(30),
            ..Default::default()
        };
        let pipeline: QueryPipeline<PostRecord, PostFilters> =
            QueryPipeline::with_clock("posts", config, Arc::new(clock.clone()));
        let loads = AtomicUsize::new(0);
        let source = || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, QueryError>(vec![post(0, ContentStatus::Published, &[])])
        };
        let filters = PostFilters::default();

        let first = pipeline
            .query(ListScope::Public, request(1, 10), &filters, source)
            .expect("first query");
        let second = pipeline
            .query(ListScope::Public, request(1, 10), &filters, source)
            .expect("second query");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(30));
        let third = pipeline
            .query(ListScope::Public, request(1, 10), &filters, source)
            .expect("third query");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_cache_always_recomputes() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let pipeline: QueryPipeline<PostRecord, PostFilters> = QueryPipeline::new("posts", config);
        let loads = AtomicUsize::new(0);
        let source = || {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<Vec<PostRecord>, QueryError>(Vec::new())
        };

        for _ in 0..3 {
            pipeline
                .query(ListScope::Public, request(1, 10), &PostFilters::default(), source)
                .expect("query");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 3);
        assert_eq!(pipeline.cache_stats().entries, 0);
    }

    #[test]
    fn invalid_criteria_fail_before_loading_source() {
        let pipeline: QueryPipeline<PostRecord, PostFilters> =
            QueryPipeline::new("posts", CacheConfig::default());
        let filters = PostFilters {
            date_range: crate::application::filters::DateRange {
                from: Some(datetime!(2024-02-01 00:00 UTC)),
                to: Some(datetime!(2024-01-01 00:00 UTC)),
            },
            ..Default::default()
        };

        let result = pipeline.query(ListScope::Public, request(1, 10), &filters, || {
            panic!("source must not load for invalid criteria")
        });

        assert!(matches!(result, Err(QueryError::Validation(_))));
    }

    #[test]
    fn descending_views_are_non_increasing() {
        let posts: Vec<_> = (0..12)
            .map(|i| post(i, ContentStatus::Published, &[]))
            .collect();
        let filters = PostFilters {
            sort_by: PostSortField::Views,
            direction: SortDirection::Desc,
            ..Default::default()
        };

        let page = run_query(ListScope::Public, request(1, 12), &filters, &posts);

        assert!(page.data.windows(2).all(|pair| pair[0].views >= pair[1].views));
    }
}
