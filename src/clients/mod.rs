//! Collaborator Clients Module
//!
//! Typed call interfaces to the services the home timeline depends on but does not own.
//!
//! - **`graph`**: `SocialGraph`, resolving the followers of a post's author.
//! - **`posts`**: `PostStorage`, hydrating timeline post ids into full posts.
//!
//! Both are async traits so the timeline engine can be exercised against in-memory fakes;
//! the `Http*` implementations speak JSON over HTTP to the real services.

pub mod error;
pub mod graph;
pub mod http;
pub mod posts;
pub mod protocol;
pub mod types;
