//! Cache key derivation.
//!
//! A key is the canonical JSON rendering of `(scope, page, page_size,
//! filters)`. Filter types keep their set-valued predicates in ordered sets,
//! so two requests that differ only in the order their criteria were supplied
//! serialize to the same bytes.

use std::fmt;

use serde::Serialize;

use crate::application::pagination::PageRequest;
use crate::application::query::ListScope;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

#[derive(Serialize)]
struct KeyPayload<'a, F> {
    scope: ListScope,
    page: u32,
    page_size: u32,
    filters: &'a F,
}

impl QueryKey {
    pub fn derive<F: Serialize>(
        scope: ListScope,
        request: PageRequest,
        filters: &F,
    ) -> Result<Self, serde_json::Error> {
        let payload = KeyPayload {
            scope,
            page: request.page(),
            page_size: request.page_size(),
            filters,
        };
        serde_json::to_string(&payload).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueryKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
