//! Infrastructure adapters: entity store, content file loading, telemetry.

pub mod error;
pub mod memory;
pub mod seed;
pub mod telemetry;
