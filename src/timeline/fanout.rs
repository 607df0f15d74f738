use super::error::TimelineError;
use super::store::TimelineStore;
use crate::clients::graph::SocialGraph;
use crate::clients::types::{PostId, UserId};
use crate::telemetry::context::TraceContext;

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::Instrument;

/// Writes a new post into the home timeline of everyone who should see it.
pub struct FanoutWriter {
    store: Arc<TimelineStore>,
    social_graph: Arc<dyn SocialGraph>,
}

impl FanoutWriter {
    pub fn new(store: Arc<TimelineStore>, social_graph: Arc<dyn SocialGraph>) -> Self {
        Self {
            store,
            social_graph,
        }
    }

    /// Resolves the author's followers, adds the mentioned users, and inserts
    /// the post into each recipient's timeline.
    ///
    /// Repeating the call with the same arguments leaves the timelines as they
    /// are. On failure some recipients may already hold the entry; retrying is
    /// safe.
    pub async fn write_home_timeline(
        &self,
        req_id: i64,
        post_id: PostId,
        author_id: UserId,
        timestamp: i64,
        user_mentions_id: &[UserId],
        trace: &TraceContext,
    ) -> Result<usize, TimelineError> {
        let followers_trace = trace.child();
        let followers = self
            .social_graph
            .get_followers(req_id, author_id, &followers_trace)
            .instrument(tracing::debug_span!("get_followers_client"))
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve followers of {}: {}", author_id, e);
                e
            })?;

        let recipients = recipient_set(&followers, user_mentions_id);
        if recipients.is_empty() {
            tracing::debug!("Post {} by {} has no recipients", post_id, author_id);
            return Ok(0);
        }

        let added = self
            .store
            .upsert_many(recipients.iter().copied(), post_id, timestamp)
            .instrument(tracing::debug_span!("write_home_timeline_cache_update_client"))
            .await?;

        tracing::debug!(
            "Post {} fanned out to {} recipient(s), {} new entries",
            post_id,
            recipients.len(),
            added
        );
        Ok(added)
    }
}

/// Followers ∪ mentioned users, duplicates collapsed.
pub fn recipient_set(followers: &[UserId], mentions: &[UserId]) -> BTreeSet<UserId> {
    followers.iter().chain(mentions).copied().collect()
}
