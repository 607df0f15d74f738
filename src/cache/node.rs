use super::protocol::{Command, Reply};
use super::sorted_set::SortedSet;

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// One in-memory cache node holding an ordered index per key.
///
/// The node is shared by every request handler; `DashMap` shards its locks so
/// concurrent pipelines touching different keys do not contend.
pub struct CacheNode {
    local_data: DashMap<String, SortedSet>,
    pipelines_executed: AtomicU64,
}

impl CacheNode {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            local_data: DashMap::new(),
            pipelines_executed: AtomicU64::new(0),
        })
    }

    /// Applies every command in order and returns one reply per command.
    pub fn execute(&self, commands: &[Command]) -> Vec<Reply> {
        self.pipelines_executed.fetch_add(1, Ordering::Relaxed);

        commands
            .iter()
            .map(|command| match command {
                Command::ZAddNx { key, member, score } => {
                    let mut index = self.local_data.entry(key.clone()).or_default();
                    Reply::Added(index.insert_if_absent(member, *score) as u64)
                }
                Command::ZRevRange { key, start, stop } => Reply::Members(
                    self.local_data
                        .get(key)
                        .map(|index| index.rev_range(*start, *stop))
                        .unwrap_or_default(),
                ),
            })
            .collect()
    }

    pub fn score(&self, key: &str, member: &str) -> Option<i64> {
        self.local_data
            .get(key)
            .and_then(|index| index.score(member))
    }

    pub fn index_len(&self, key: &str) -> usize {
        self.local_data
            .get(key)
            .map(|index| index.len())
            .unwrap_or(0)
    }

    pub fn key_count(&self) -> usize {
        self.local_data.len()
    }

    pub fn pipelines_executed(&self) -> u64 {
        self.pipelines_executed.load(Ordering::Relaxed)
    }
}
