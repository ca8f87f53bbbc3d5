//! Internal layer exports for configuration, connections, discovery, models, loading, and migrations.

pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod migration;
pub mod model;
