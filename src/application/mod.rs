//! Application services layer.

pub mod caches;
pub mod categories;
pub mod error;
pub mod filters;
pub mod pagination;
pub mod posts;
pub mod query;
pub mod repos;
pub mod services;
