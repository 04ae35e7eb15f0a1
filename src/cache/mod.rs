//! Query result cache.
//!
//! Each query pipeline owns one [`QueryCache`] mapping a canonical
//! [`QueryKey`] to the page it computed. Entries expire after the configured
//! TTL and are otherwise only dropped by an explicit clear, typically after a
//! write when `invalidate_on_write` is enabled:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! invalidate_on_write = true
//! ```

mod clock;
mod config;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use keys::QueryKey;
pub use store::{CacheStats, QueryCache};

pub(crate) use lock::{rw_read, rw_write};
pub(crate) use store::{
    METRIC_CACHE_CLEAR_TOTAL, METRIC_CACHE_ENTRIES, METRIC_CACHE_HIT_TOTAL,
    METRIC_CACHE_MISS_TOTAL, METRIC_QUERY_COMPUTE_MS,
};
