//! Home Timeline Module Tests
//!
//! Exercises the fan-out and read paths over every cache tier shape, using in-process cache
//! nodes and in-memory stand-ins for the social graph and post storage services.
//!
//! ## Test Scopes
//! - **Store**: Insert-if-absent semantics and replica/primary routing.
//! - **Fan-out**: Recipient resolution, idempotency and per-shard batching.
//! - **Read**: Window validation, ordering and hydration.
//! - **Failures**: Store and collaborator errors reaching the caller.

#[cfg(test)]
mod tests {
    use crate::cache::connection::{CacheConnection, LocalConnection};
    use crate::cache::error::StoreError;
    use crate::cache::node::CacheNode;
    use crate::cache::protocol::{Command, Reply};
    use crate::clients::error::ClientError;
    use crate::clients::graph::SocialGraph;
    use crate::clients::posts::PostStorage;
    use crate::clients::types::{Creator, Post, PostId, PostType, UserId};
    use crate::telemetry::context::{SPAN_ID_KEY, TRACE_ID_KEY, TraceContext};
    use crate::timeline::error::TimelineError;
    use crate::timeline::fanout::recipient_set;
    use crate::timeline::handlers::{handle_read_home_timeline, handle_write_home_timeline};
    use crate::timeline::protocol::{ReadHomeTimelineRequest, WriteHomeTimelineRequest};
    use crate::timeline::router::ShardRouter;
    use crate::timeline::service::HomeTimelineService;
    use crate::timeline::store::TimelineStore;
    use crate::topology::selector::{ConfigError, Topology, TopologyKind};

    use async_trait::async_trait;
    use axum::{Extension, Json, http::StatusCode};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // ============================================================
    // FAKES
    // ============================================================

    /// In-process connection that counts round trips.
    struct CountingConnection {
        inner: LocalConnection,
        calls: AtomicUsize,
    }

    impl CountingConnection {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                inner: LocalConnection::new(name, CacheNode::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn node(&self) -> &Arc<CacheNode> {
            self.inner.node()
        }
    }

    #[async_trait]
    impl CacheConnection for CountingConnection {
        fn endpoint(&self) -> &str {
            self.inner.endpoint()
        }

        async fn execute(&self, commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(commands).await
        }
    }

    /// Connection whose node is down.
    struct FailingConnection;

    #[async_trait]
    impl CacheConnection for FailingConnection {
        fn endpoint(&self) -> &str {
            "down:0"
        }

        async fn execute(&self, _commands: Vec<Command>) -> Result<Vec<Reply>, StoreError> {
            Err(StoreError::Status {
                endpoint: "down:0".to_string(),
                status: 503,
            })
        }
    }

    #[derive(Default)]
    struct FakeSocialGraph {
        followers: HashMap<UserId, Vec<UserId>>,
        seen_traces: Mutex<Vec<TraceContext>>,
        fail: bool,
    }

    impl FakeSocialGraph {
        fn with(user_id: UserId, followers: Vec<UserId>) -> Arc<Self> {
            let mut graph = Self::default();
            graph.followers.insert(user_id, followers);
            Arc::new(graph)
        }
    }

    #[async_trait]
    impl SocialGraph for FakeSocialGraph {
        async fn get_followers(
            &self,
            _req_id: i64,
            user_id: UserId,
            trace: &TraceContext,
        ) -> Result<Vec<UserId>, ClientError> {
            self.seen_traces.lock().unwrap().push(trace.clone());
            if self.fail {
                return Err(ClientError::Service {
                    service: "social-graph-service",
                    message: "graph unavailable".to_string(),
                });
            }
            Ok(self.followers.get(&user_id).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct FakePostStorage {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PostStorage for FakePostStorage {
        async fn read_posts(
            &self,
            req_id: i64,
            post_ids: &[PostId],
            _trace: &TraceContext,
        ) -> Result<Vec<Post>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ClientError::Status {
                    service: "post-storage-service",
                    status: 500,
                });
            }
            Ok(post_ids
                .iter()
                .map(|post_id| Post {
                    post_id: *post_id,
                    creator: Creator {
                        user_id: 42,
                        username: "user_42".to_string(),
                    },
                    req_id,
                    text: format!("post {}", post_id),
                    user_mentions: vec![],
                    media: vec![],
                    urls: vec![],
                    timestamp: 0,
                    post_type: PostType::Post,
                })
                .collect())
        }
    }

    fn post_ids(posts: &[Post]) -> Vec<PostId> {
        posts.iter().map(|post| post.post_id).collect()
    }

    fn standalone() -> (Arc<CountingConnection>, Topology) {
        let conn = CountingConnection::new("standalone");
        (conn.clone(), Topology::Standalone(conn))
    }

    fn cluster(shards: usize) -> (Vec<Arc<CountingConnection>>, Topology) {
        let conns: Vec<Arc<CountingConnection>> = (0..shards)
            .map(|i| CountingConnection::new(&format!("shard-{}", i)))
            .collect();
        let topology = Topology::Cluster(
            conns
                .iter()
                .map(|conn| conn.clone() as Arc<dyn CacheConnection>)
                .collect(),
        );
        (conns, topology)
    }

    // ============================================================
    // STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_upsert_first_write_wins() {
        let (conn, topology) = standalone();
        let store = TimelineStore::new(topology).unwrap();

        assert!(store.upsert(1, 900, 1000).await.unwrap());
        assert!(!store.upsert(1, 900, 2000).await.unwrap());

        assert_eq!(conn.node().score("1", "900"), Some(1000));
        assert_eq!(conn.node().index_len("1"), 1);
    }

    #[tokio::test]
    async fn test_read_range_is_half_open_and_newest_first() {
        let (_conn, topology) = standalone();
        let store = TimelineStore::new(topology).unwrap();

        for (post_id, ts) in [(1, 100), (2, 300), (3, 200), (4, 400)] {
            store.upsert(7, post_id, ts).await.unwrap();
        }

        assert_eq!(store.read_range(7, 0, 10).await.unwrap(), vec![4, 2, 3, 1]);
        assert_eq!(store.read_range(7, 1, 3).await.unwrap(), vec![2, 3]);
        assert!(store.read_range(7, 2, 2).await.unwrap().is_empty());
        assert!(store.read_range(8, 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replicated_writes_primary_reads_replica() {
        let primary = CountingConnection::new("primary");
        let replica = CountingConnection::new("replica");
        let store = TimelineStore::new(Topology::Replicated {
            primary: primary.clone(),
            replica: replica.clone(),
        }).unwrap();
        assert_eq!(store.kind(), TopologyKind::Replicated);

        store.upsert(1, 900, 1000).await.unwrap();
        assert_eq!(primary.node().index_len("1"), 1);
        assert_eq!(replica.calls(), 0, "Writes must never reach the replica");

        // Nothing replicates between in-process nodes: the replica still lags.
        assert!(store.read_range(1, 0, 10).await.unwrap().is_empty());
        assert_eq!(replica.calls(), 1);
        assert_eq!(primary.calls(), 1, "Reads must never reach the primary");
    }

    #[tokio::test]
    async fn test_cluster_read_routes_to_key_shard() {
        let (conns, topology) = cluster(4);
        let store = TimelineStore::new(topology).unwrap();

        store.upsert(12345, 900, 1000).await.unwrap();
        let before: Vec<usize> = conns.iter().map(|c| c.calls()).collect();

        assert_eq!(store.read_range(12345, 0, 10).await.unwrap(), vec![900]);

        let touched: Vec<usize> = conns
            .iter()
            .zip(before)
            .filter(|(conn, calls)| conn.calls() > *calls)
            .map(|(conn, _)| conn.calls())
            .collect();
        assert_eq!(touched.len(), 1, "A range read is a single-key operation");
    }

    #[test]
    fn test_router_is_deterministic_and_in_range() {
        let (_conns, topology) = cluster(4);
        let Topology::Cluster(shards) = topology else {
            panic!("expected cluster topology");
        };
        let router = ShardRouter::new(shards).unwrap();

        for user_id in 0..1000 {
            let key = user_id.to_string();
            assert_eq!(router.shard_for(&key), router.shard_for(&key));
            assert!(router.shard_for(&key) < router.shard_count());
        }
    }

    #[test]
    fn test_cluster_without_shards_is_rejected() {
        assert!(matches!(ShardRouter::new(vec![]), Err(ConfigError::NoShards)));
        assert!(matches!(
            TimelineStore::new(Topology::Cluster(vec![])),
            Err(ConfigError::NoShards)
        ));
    }

    // ============================================================
    // FAN-OUT TESTS
    // ============================================================

    #[test]
    fn test_recipient_set_is_union() {
        let recipients = recipient_set(&[3, 1, 2, 1], &[2, 9]);
        assert_eq!(recipients.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 9]);
    }

    #[tokio::test]
    async fn test_fanout_reaches_followers_and_mentions_only() {
        let (conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1, 2, 3]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let added = service
            .write_home_timeline(1, 900, 42, 1000, &[3, 4], &TraceContext::new())
            .await
            .unwrap();

        assert_eq!(added, 4);
        for user_id in [1, 2, 3, 4] {
            assert_eq!(conn.node().score(&user_id.to_string(), "900"), Some(1000));
        }
        assert_eq!(conn.node().index_len("42"), 0, "Author is not implicitly a recipient");
        assert_eq!(conn.node().index_len("5"), 0);
        assert_eq!(conn.calls(), 1, "Standalone fan-out is one pipeline");
    }

    #[tokio::test]
    async fn test_fanout_with_no_recipients_skips_store() {
        let (conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            Arc::new(FakeSocialGraph::default()),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let added = service
            .write_home_timeline(1, 900, 42, 1000, &[], &TraceContext::new())
            .await
            .unwrap();

        assert_eq!(added, 0);
        assert_eq!(conn.calls(), 0);
    }

    #[tokio::test]
    async fn test_fanout_is_idempotent() {
        let (conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1, 2]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();
        let trace = TraceContext::new();

        let first = service
            .write_home_timeline(1, 900, 42, 1000, &[], &trace)
            .await
            .unwrap();
        let second = service
            .write_home_timeline(1, 900, 42, 1000, &[], &trace)
            .await
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(conn.node().index_len("1"), 1);
        assert_eq!(conn.node().index_len("2"), 1);
    }

    #[tokio::test]
    async fn test_cluster_fanout_one_round_trip_per_shard() {
        let (conns, topology) = cluster(4);
        let followers: Vec<UserId> = (1..=1000).collect();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, followers),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let added = service
            .write_home_timeline(1, 900, 42, 1000, &[], &TraceContext::new())
            .await
            .unwrap();

        assert_eq!(added, 1000);
        let round_trips: usize = conns.iter().map(|conn| conn.calls()).sum();
        assert_eq!(round_trips, 4, "1000 recipients over 4 shards is 4 pipelines");

        let entries: usize = conns.iter().map(|conn| conn.node().key_count()).sum();
        assert_eq!(entries, 1000);
        for conn in &conns {
            assert_eq!(conn.calls(), 1);
            assert_eq!(conn.node().pipelines_executed(), 1);
        }
    }

    #[tokio::test]
    async fn test_cluster_fanout_touching_one_shard() {
        let (conns, topology) = cluster(4);
        let Topology::Cluster(shards) = topology.clone() else {
            panic!("expected cluster topology");
        };
        let router = ShardRouter::new(shards).unwrap();
        let same_shard: Vec<UserId> = (1..)
            .filter(|user_id: &UserId| router.shard_for(&user_id.to_string()) == 0)
            .take(50)
            .collect();

        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, same_shard),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();
        service
            .write_home_timeline(1, 900, 42, 1000, &[], &TraceContext::new())
            .await
            .unwrap();

        assert_eq!(conns[0].calls(), 1);
        assert_eq!(conns[0].node().key_count(), 50);
        assert!(conns[1..].iter().all(|conn| conn.calls() == 0));
    }

    #[tokio::test]
    async fn test_fanout_propagates_child_trace() {
        let (_conn, topology) = standalone();
        let graph = FakeSocialGraph::with(42, vec![1]);
        let service = HomeTimelineService::new(
            topology,
            graph.clone(),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let mut carrier = HashMap::new();
        carrier.insert(TRACE_ID_KEY.to_string(), "trace-abc".to_string());
        carrier.insert(SPAN_ID_KEY.to_string(), "span-root".to_string());
        let trace = TraceContext::from_carrier(carrier);

        service
            .write_home_timeline(1, 900, 42, 1000, &[], &trace)
            .await
            .unwrap();

        let seen = graph.seen_traces.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].trace_id(), Some("trace-abc"));
        assert_ne!(seen[0].span_id(), Some("span-root"));
    }

    #[tokio::test]
    async fn test_concurrent_fanouts_share_the_store() {
        let (conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1, 2, 3]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let mut handles = Vec::new();
        for post_id in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let trace = TraceContext::new();
                service
                    .write_home_timeline(post_id, post_id, 42, 1000 + post_id, &[], &trace)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for user_id in ["1", "2", "3"] {
            assert_eq!(conn.node().index_len(user_id), 20);
        }
    }

    // ============================================================
    // READ TESTS
    // ============================================================

    #[tokio::test]
    async fn test_invalid_window_contacts_nothing() {
        let (conn, topology) = standalone();
        let posts = Arc::new(FakePostStorage::default());
        let service = HomeTimelineService::new(
            topology,
            Arc::new(FakeSocialGraph::default()),
            posts.clone(),
        )
        .unwrap();
        let trace = TraceContext::new();

        for (start, stop) in [(5, 5), (6, 2), (-1, 10), (-3, -1)] {
            let page = service
                .read_home_timeline(1, 1, start, stop, &trace)
                .await
                .unwrap();
            assert!(page.is_empty(), "window [{}, {}) must be empty", start, stop);
        }

        assert_eq!(conn.calls(), 0);
        assert_eq!(posts.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_read_preserves_store_order() {
        let (_conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();
        let trace = TraceContext::new();

        for (post_id, ts) in [(901, 300), (902, 100), (903, 500), (904, 200)] {
            service
                .write_home_timeline(1, post_id, 42, ts, &[], &trace)
                .await
                .unwrap();
        }

        let page = service.read_home_timeline(1, 1, 0, 10, &trace).await.unwrap();
        assert_eq!(post_ids(&page), vec![903, 901, 904, 902]);

        let second_page = service.read_home_timeline(1, 1, 2, 4, &trace).await.unwrap();
        assert_eq!(post_ids(&second_page), vec![904, 902]);
    }

    #[tokio::test]
    async fn test_scenario_single_follower_sees_post() {
        for shape in ["standalone", "cluster"] {
            let topology = match shape {
                "standalone" => standalone().1,
                _ => cluster(3).1,
            };
            let service = HomeTimelineService::new(
                topology,
                FakeSocialGraph::with(42, vec![1, 2, 3]),
                Arc::new(FakePostStorage::default()),
            )
            .unwrap();
            let trace = TraceContext::new();

            service
                .write_home_timeline(1, 900, 42, 1000, &[], &trace)
                .await
                .unwrap();
            let page = service.read_home_timeline(2, 1, 0, 10, &trace).await.unwrap();
            assert_eq!(post_ids(&page), vec![900], "{} topology", shape);

            service
                .write_home_timeline(3, 900, 42, 1000, &[], &trace)
                .await
                .unwrap();
            let again = service.read_home_timeline(4, 1, 0, 10, &trace).await.unwrap();
            assert_eq!(post_ids(&again), vec![900], "{} topology", shape);
        }
    }

    // ============================================================
    // FAILURE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_store_failure_reaches_caller() {
        let service = HomeTimelineService::new(
            Topology::Standalone(Arc::new(FailingConnection)),
            FakeSocialGraph::with(42, vec![1]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();
        let trace = TraceContext::new();

        let write = service.write_home_timeline(1, 900, 42, 1000, &[], &trace).await;
        assert!(matches!(write, Err(TimelineError::Store(_))));

        let read = service.read_home_timeline(1, 1, 0, 10, &trace).await;
        assert!(matches!(read, Err(TimelineError::Store(_))));
    }

    #[tokio::test]
    async fn test_graph_failure_writes_nothing() {
        let (conn, topology) = standalone();
        let graph = Arc::new(FakeSocialGraph {
            fail: true,
            ..Default::default()
        });
        let service =
            HomeTimelineService::new(topology, graph, Arc::new(FakePostStorage::default())).unwrap();

        let result = service
            .write_home_timeline(1, 900, 42, 1000, &[7], &TraceContext::new())
            .await;

        assert!(matches!(result, Err(TimelineError::Collaborator(_))));
        assert_eq!(conn.calls(), 0);
    }

    #[tokio::test]
    async fn test_hydration_failure_returns_no_partial_list() {
        let (_conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1]),
            Arc::new(FakePostStorage {
                fail: true,
                ..Default::default()
            }),
        )
        .unwrap();
        let trace = TraceContext::new();
        service
            .write_home_timeline(1, 900, 42, 1000, &[], &trace)
            .await
            .unwrap();

        let result = service.read_home_timeline(1, 1, 0, 10, &trace).await;
        assert!(matches!(result, Err(TimelineError::Collaborator(_))));
    }

    #[tokio::test]
    async fn test_one_failed_shard_keeps_other_shards_written() {
        let healthy: Vec<Arc<CountingConnection>> = (0..3)
            .map(|i| CountingConnection::new(&format!("shard-{}", i)))
            .collect();
        let mut shards: Vec<Arc<dyn CacheConnection>> = healthy
            .iter()
            .map(|conn| conn.clone() as Arc<dyn CacheConnection>)
            .collect();
        shards.push(Arc::new(FailingConnection));

        let followers: Vec<UserId> = (1..=200).collect();
        let service = HomeTimelineService::new(
            Topology::Cluster(shards),
            FakeSocialGraph::with(42, followers),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let result = service
            .write_home_timeline(1, 900, 42, 1000, &[], &TraceContext::new())
            .await;

        assert!(matches!(result, Err(TimelineError::Store(_))));
        for conn in &healthy {
            assert_eq!(conn.calls(), 1);
            assert!(conn.node().key_count() > 0, "Healthy shards are not rolled back");
        }
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_handlers_round_trip() {
        let (_conn, topology) = standalone();
        let service = HomeTimelineService::new(
            topology,
            FakeSocialGraph::with(42, vec![1]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let (status, Json(written)) = handle_write_home_timeline(
            Extension(service.clone()),
            Json(WriteHomeTimelineRequest {
                req_id: 1,
                post_id: 900,
                user_id: 42,
                timestamp: 1000,
                user_mentions_id: vec![],
                carrier: TraceContext::new(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(written.success);

        let (status, Json(page)) = handle_read_home_timeline(
            Extension(service),
            Json(ReadHomeTimelineRequest {
                req_id: 2,
                user_id: 1,
                start: 0,
                stop: 10,
                carrier: TraceContext::new(),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(post_ids(&page.posts), vec![900]);
        assert!(page.error.is_none());
    }

    #[tokio::test]
    async fn test_handler_reports_store_failure() {
        let service = HomeTimelineService::new(
            Topology::Standalone(Arc::new(FailingConnection)),
            FakeSocialGraph::with(42, vec![1]),
            Arc::new(FakePostStorage::default()),
        )
        .unwrap();

        let (status, Json(page)) = handle_read_home_timeline(
            Extension(service),
            Json(ReadHomeTimelineRequest {
                req_id: 1,
                user_id: 1,
                start: 0,
                stop: 10,
                carrier: TraceContext::new(),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(page.posts.is_empty());
        assert!(page.error.is_some());
    }
}
