//! Home Timeline Service Library
//!
//! This library crate defines the modules behind the home timeline of the social network:
//! fanning new posts out to followers' timelines and serving those timelines back as posts.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`cache`**: The cache tier. Per-user ordered indexes held by cache nodes, reached through
//!   the `CacheConnection` seam (in-process or over HTTP).
//! - **`topology`**: The service configuration file and the one-time choice between a
//!   standalone cache, a primary/replica pair, or a sharded cluster.
//! - **`timeline`**: The fan-out/read engine: `TimelineStore`, shard batching, the write and
//!   read paths, and their HTTP handlers.
//! - **`clients`**: Typed clients for the social graph and post storage services.
//! - **`telemetry`**: Trace context propagation and logging setup.

pub mod cache;
pub mod clients;
pub mod telemetry;
pub mod timeline;
pub mod topology;
