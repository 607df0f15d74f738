use super::error::TimelineError;
use super::store::TimelineStore;
use crate::clients::posts::PostStorage;
use crate::clients::types::{Post, UserId};
use crate::telemetry::context::TraceContext;

use std::sync::Arc;
use tracing::Instrument;

/// Serves pages of a user's home timeline as full posts.
pub struct TimelineReader {
    store: Arc<TimelineStore>,
    post_storage: Arc<dyn PostStorage>,
}

impl TimelineReader {
    pub fn new(store: Arc<TimelineStore>, post_storage: Arc<dyn PostStorage>) -> Self {
        Self {
            store,
            post_storage,
        }
    }

    /// Returns the posts ranked `[start, stop)` in `user_id`'s timeline, newest
    /// first, in exactly the order the store ranked them.
    ///
    /// An empty or negative window is an empty page: nothing is contacted.
    pub async fn read_home_timeline(
        &self,
        req_id: i64,
        user_id: UserId,
        start: i32,
        stop: i32,
        trace: &TraceContext,
    ) -> Result<Vec<Post>, TimelineError> {
        if stop <= start || start < 0 {
            return Ok(Vec::new());
        }

        let post_ids = self
            .store
            .read_range(user_id, start as i64, stop as i64)
            .instrument(tracing::debug_span!("read_home_timeline_cache_find_client"))
            .await?;

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let posts = self
            .post_storage
            .read_posts(req_id, &post_ids, &trace.child())
            .instrument(tracing::debug_span!("read_posts_client"))
            .await
            .map_err(|e| {
                tracing::error!("Failed to hydrate {} post(s): {}", post_ids.len(), e);
                e
            })?;

        Ok(posts)
    }
}
