//! Topology Module
//!
//! Decides, once at startup, which cache tier shape the home timeline runs against.
//!
//! ## Shapes
//! - **Standalone**: A single cache node serves reads and writes.
//! - **Replicated**: Writes go to the primary, reads go to the replica (replica lag accepted).
//! - **Cluster**: Keys are spread over shards; writes are batched per shard.
//!
//! Replica mode and cluster mode (from the config file or `--redis-cluster`) are mutually
//! exclusive. Asking for both is a `ConfigError` and the service refuses to start.

pub mod config;
pub mod selector;
