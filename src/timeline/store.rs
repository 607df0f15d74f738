use super::router::ShardRouter;
use crate::cache::connection::CacheConnection;
use crate::cache::error::StoreError;
use crate::cache::protocol::{Command, Reply};
use crate::clients::types::{PostId, UserId};
use crate::topology::selector::{ConfigError, Topology, TopologyKind};

use std::sync::Arc;

/// Per-user timeline indexes, uniform over the three cache tier shapes.
///
/// Each user's index is keyed by the user id; members are post ids scored by
/// timestamp. Inserting an existing post id leaves the stored entry alone, so
/// every write is safe to repeat.
pub enum TimelineStore {
    Standalone(Arc<dyn CacheConnection>),
    /// Writes to `primary`, reads from `replica`. Reads may lag writes.
    Replicated {
        primary: Arc<dyn CacheConnection>,
        replica: Arc<dyn CacheConnection>,
    },
    Cluster(ShardRouter),
}

impl TimelineStore {
    /// Fails only for a cluster topology without shards.
    pub fn new(topology: Topology) -> Result<Self, ConfigError> {
        Ok(match topology {
            Topology::Standalone(conn) => TimelineStore::Standalone(conn),
            Topology::Replicated { primary, replica } => {
                TimelineStore::Replicated { primary, replica }
            }
            Topology::Cluster(shards) => TimelineStore::Cluster(ShardRouter::new(shards)?),
        })
    }

    pub fn kind(&self) -> TopologyKind {
        match self {
            TimelineStore::Standalone(_) => TopologyKind::Standalone,
            TimelineStore::Replicated { .. } => TopologyKind::Replicated,
            TimelineStore::Cluster(_) => TopologyKind::Cluster,
        }
    }

    /// Inserts `post_id` into `user_id`'s timeline unless already present.
    /// Returns `true` if a new entry was written.
    pub async fn upsert(
        &self,
        user_id: UserId,
        post_id: PostId,
        timestamp: i64,
    ) -> Result<bool, StoreError> {
        let added = self.upsert_many([user_id], post_id, timestamp).await?;
        Ok(added > 0)
    }

    /// Inserts `post_id` into the timeline of every recipient.
    ///
    /// Standalone and replicated shapes send a single pipeline; a cluster sends
    /// one pipeline per shard touched. Returns the number of new entries.
    pub async fn upsert_many<I>(
        &self,
        recipients: I,
        post_id: PostId,
        timestamp: i64,
    ) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = UserId>,
    {
        let member = post_id.to_string();
        let upsert = |user_id: UserId| {
            let key = user_id.to_string();
            let command = Command::ZAddNx {
                key: key.clone(),
                member: member.clone(),
                score: timestamp,
            };
            (key, command)
        };

        let (endpoint, replies) = match self {
            TimelineStore::Standalone(conn) | TimelineStore::Replicated { primary: conn, .. } => {
                let commands: Vec<Command> = recipients
                    .into_iter()
                    .map(|user_id| upsert(user_id).1)
                    .collect();
                if commands.is_empty() {
                    return Ok(0);
                }
                let replies = execute_logged(conn.as_ref(), commands).await?;
                (conn.endpoint().to_string(), replies)
            }
            TimelineStore::Cluster(router) => {
                let mut batch = router.batch();
                for user_id in recipients {
                    let (key, command) = upsert(user_id);
                    batch.push(&key, command);
                }
                if batch.is_empty() {
                    return Ok(0);
                }
                tracing::debug!(
                    "Fan-out of post {} touches {} shard(s)",
                    post_id,
                    batch.shards_touched()
                );
                ("cluster".to_string(), batch.execute().await?)
            }
        };

        replies.iter().try_fold(0usize, |added, reply| match reply {
            Reply::Added(n) => Ok(added + *n as usize),
            other => Err(StoreError::protocol(
                &endpoint,
                format!("unexpected reply to ZAddNx: {:?}", other),
            )),
        })
    }

    /// Post ids ranked `[start, stop)` in `user_id`'s timeline, newest first.
    pub async fn read_range(
        &self,
        user_id: UserId,
        start: i64,
        stop: i64,
    ) -> Result<Vec<PostId>, StoreError> {
        if stop <= start {
            return Ok(Vec::new());
        }

        let key = user_id.to_string();
        let conn = match self {
            TimelineStore::Standalone(conn) => conn,
            TimelineStore::Replicated { replica, .. } => replica,
            TimelineStore::Cluster(router) => router.connection_for(&key),
        };

        let command = Command::ZRevRange {
            key,
            start,
            stop: stop - 1,
        };
        let mut replies = execute_logged(conn.as_ref(), vec![command]).await?;

        match replies.pop() {
            Some(Reply::Members(members)) => members
                .iter()
                .map(|member| {
                    member.parse::<PostId>().map_err(|e| {
                        StoreError::protocol(
                            conn.endpoint(),
                            format!("invalid post id {:?} in timeline {}: {}", member, user_id, e),
                        )
                    })
                })
                .collect(),
            other => Err(StoreError::protocol(
                conn.endpoint(),
                format!("unexpected reply to ZRevRange: {:?}", other),
            )),
        }
    }
}

async fn execute_logged(
    conn: &dyn CacheConnection,
    commands: Vec<Command>,
) -> Result<Vec<Reply>, StoreError> {
    conn.execute(commands).await.map_err(|e| {
        tracing::error!("Cache operation on {} failed: {}", conn.endpoint(), e);
        e
    })
}
