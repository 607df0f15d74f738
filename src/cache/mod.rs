//! Cache Tier Module
//!
//! Implements the in-memory cache tier that backs every home timeline.
//!
//! ## Core Concepts
//! - **Ordered Index**: `SortedSet` keeps unique members ranked by score, newest first on read.
//! - **Node**: `CacheNode` holds one ordered index per key and executes pipelines of commands.
//! - **Connection**: `CacheConnection` is the seam the timeline store talks through. A call to
//!   `execute` is a single round trip, either in-process (`LocalConnection`) or over HTTP
//!   (`RemoteConnection`) to a binary started with `--cache-node`.

pub mod connection;
pub mod error;
pub mod handlers;
pub mod node;
pub mod protocol;
pub mod sorted_set;
