//! Query cache configuration.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve repeated queries from the cache. When off every call recomputes.
    pub enabled: bool,
    /// How long a computed page stays valid.
    pub ttl: Duration,
    /// Drop cached pages whenever a service mutates the store.
    pub invalidate_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            invalidate_on_write: true,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: settings.ttl,
            invalidate_on_write: settings.invalidate_on_write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert!(config.invalidate_on_write);
    }
}
