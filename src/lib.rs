//! Blog content store with a cached filter, sort and pagination pipeline.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
