//! Routing service around the `wayfinder_core` engine.
//!
//! Holds the live router graph behind an atomically swapped pointer, rebuilds
//! it when map data changes, resolves per-request options and caches results.

pub mod cache;
pub mod config;
pub mod service;
pub mod store;

pub use cache::{RouteCache, RouteKey};
pub use config::{CacheConfig, ServiceConfig};
pub use service::{RouteRequest, RoutingService};
pub use store::GraphStore;

pub use wayfinder_core::prelude;
