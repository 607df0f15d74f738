use super::error::TimelineError;
use super::fanout::FanoutWriter;
use super::reader::TimelineReader;
use super::store::TimelineStore;
use crate::clients::graph::SocialGraph;
use crate::clients::posts::PostStorage;
use crate::clients::types::{Post, PostId, UserId};
use crate::telemetry::context::TraceContext;
use crate::topology::selector::{ConfigError, Topology, TopologyKind};

use std::sync::Arc;
use tracing::Instrument;

/// The home timeline service: fan-out on write, hydrate on read.
///
/// Built once at startup and shared read-only by every request handler.
pub struct HomeTimelineService {
    store: Arc<TimelineStore>,
    writer: FanoutWriter,
    reader: TimelineReader,
}

impl HomeTimelineService {
    pub fn new(
        topology: Topology,
        social_graph: Arc<dyn SocialGraph>,
        post_storage: Arc<dyn PostStorage>,
    ) -> Result<Arc<Self>, ConfigError> {
        let store = Arc::new(TimelineStore::new(topology)?);
        Ok(Arc::new(Self {
            writer: FanoutWriter::new(store.clone(), social_graph),
            reader: TimelineReader::new(store.clone(), post_storage),
            store,
        }))
    }

    pub fn topology(&self) -> TopologyKind {
        self.store.kind()
    }

    pub async fn write_home_timeline(
        &self,
        req_id: i64,
        post_id: PostId,
        author_id: UserId,
        timestamp: i64,
        user_mentions_id: &[UserId],
        trace: &TraceContext,
    ) -> Result<usize, TimelineError> {
        let span = tracing::info_span!(
            "write_home_timeline_server",
            req_id,
            post_id,
            trace_id = trace.trace_id().unwrap_or_default()
        );
        self.writer
            .write_home_timeline(req_id, post_id, author_id, timestamp, user_mentions_id, trace)
            .instrument(span)
            .await
    }

    pub async fn read_home_timeline(
        &self,
        req_id: i64,
        user_id: UserId,
        start: i32,
        stop: i32,
        trace: &TraceContext,
    ) -> Result<Vec<Post>, TimelineError> {
        let span = tracing::info_span!(
            "read_home_timeline_server",
            req_id,
            user_id,
            trace_id = trace.trace_id().unwrap_or_default()
        );
        self.reader
            .read_home_timeline(req_id, user_id, start, stop, trace)
            .instrument(span)
            .await
    }
}
