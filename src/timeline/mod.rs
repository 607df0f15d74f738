//! Home Timeline Module
//!
//! The fan-out/read engine behind every user's home timeline.
//!
//! ## Workflow
//! 1. **Write**: `FanoutWriter` asks the social graph for the author's followers, adds the
//!    mentioned users, and inserts `(post_id, timestamp)` into each recipient's index. Inserts
//!    never overwrite, so a retried write is harmless.
//! 2. **Route**: In cluster mode `ShardRouter` groups the inserts by shard and sends one
//!    pipeline per shard touched, instead of one round trip per recipient.
//! 3. **Read**: `TimelineReader` reads a newest-first page of post ids and hydrates them
//!    through the post storage service without reordering.
//!
//! ## Submodules
//! - **`store`**: `TimelineStore`, one type over the standalone, replicated and cluster shapes.
//! - **`router`**: Slot hashing and the per-request `ShardBatch`.
//! - **`fanout`** / **`reader`**: The write and read paths.
//! - **`service`**: `HomeTimelineService`, the facade handed to the HTTP handlers.
//! - **`protocol`** / **`handlers`**: The HTTP surface.

pub mod error;
pub mod fanout;
pub mod handlers;
pub mod protocol;
pub mod reader;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;
