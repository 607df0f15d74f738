use crate::cache::connection::CacheConnection;
use crate::cache::error::StoreError;
use crate::cache::protocol::{Command, Reply};
use crate::topology::selector::ConfigError;

use futures::future::join_all;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Size of the slot space keys are hashed into.
pub const NUM_SLOTS: u32 = 16384;

/// Maps keys to cluster shards.
///
/// Keys hash into a fixed slot space and each shard owns a contiguous, equal
/// range of slots, so a key always lands on the same shard for a given shard
/// list.
pub struct ShardRouter {
    shards: Vec<Arc<dyn CacheConnection>>,
}

impl ShardRouter {
    pub fn new(shards: Vec<Arc<dyn CacheConnection>>) -> Result<Self, ConfigError> {
        if shards.is_empty() {
            return Err(ConfigError::NoShards);
        }
        Ok(Self { shards })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn get_slot(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % NUM_SLOTS as u64) as u32
    }

    pub fn shard_for(&self, key: &str) -> usize {
        let slot = self.get_slot(key) as usize;
        slot * self.shards.len() / NUM_SLOTS as usize
    }

    pub fn connection(&self, shard: usize) -> &Arc<dyn CacheConnection> {
        &self.shards[shard]
    }

    pub fn connection_for(&self, key: &str) -> &Arc<dyn CacheConnection> {
        self.connection(self.shard_for(key))
    }

    /// Starts an empty batch bound to this router.
    pub fn batch(&self) -> ShardBatch<'_> {
        ShardBatch {
            router: self,
            pending: BTreeMap::new(),
        }
    }
}

/// Commands grouped by destination shard for one request.
///
/// Built fresh per call and consumed by `execute`; nothing is shared between
/// concurrent requests.
pub struct ShardBatch<'a> {
    router: &'a ShardRouter,
    pending: BTreeMap<usize, Vec<Command>>,
}

impl ShardBatch<'_> {
    /// Appends `command` to the batch of the shard owning `key`.
    pub fn push(&mut self, key: &str, command: Command) {
        let shard = self.router.shard_for(key);
        self.pending.entry(shard).or_default().push(command);
    }

    /// Number of distinct shards this batch will touch.
    pub fn shards_touched(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Executes each shard's commands as one pipeline, all shards concurrently.
    ///
    /// Every shard is attempted even if another fails; the first failure is
    /// returned and nothing already applied is rolled back.
    pub async fn execute(self) -> Result<Vec<Reply>, StoreError> {
        let router = self.router;
        let executions = self.pending.into_iter().map(|(shard, commands)| {
            let conn = router.connection(shard).clone();
            async move {
                let count = commands.len();
                let result = conn.execute(commands).await;
                if let Err(e) = &result {
                    tracing::error!(
                        "Shard {} ({}) failed to execute {} command(s): {}",
                        shard,
                        conn.endpoint(),
                        count,
                        e
                    );
                }
                result
            }
        });

        let mut replies = Vec::new();
        let mut first_error = None;
        for result in join_all(executions).await {
            match result {
                Ok(shard_replies) => replies.extend(shard_replies),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(replies),
        }
    }
}
