use super::config::{BackendSection, ServiceConfig};
use crate::cache::connection::{CacheConnection, RemoteConnection};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Startup configuration failures. All of them are fatal: the process must
/// not start serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Can't start service when cache cluster and cache replica are enabled at the same time \
         (use_cluster={use_cluster}, --redis-cluster={cluster_override})"
    )]
    ConflictingTopology {
        use_cluster: bool,
        cluster_override: bool,
    },
    #[error("missing configuration entry: {0}")]
    Missing(&'static str),
    #[error("cluster mode requires at least one shard address")]
    NoShards,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to set up connection to {addr}: {message}")]
    Connection { addr: String, message: String },
}

/// The three topology switches, read once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyFlags {
    pub use_cluster: bool,
    pub use_replica: bool,
    /// `--redis-cluster` on the command line.
    pub cluster_override: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyKind {
    Standalone,
    Replicated,
    Cluster,
}

/// Picks exactly one topology, refusing replica mode combined with any form
/// of cluster mode.
pub fn select_topology(flags: TopologyFlags) -> Result<TopologyKind, ConfigError> {
    let cluster = flags.use_cluster || flags.cluster_override;

    if flags.use_replica && cluster {
        return Err(ConfigError::ConflictingTopology {
            use_cluster: flags.use_cluster,
            cluster_override: flags.cluster_override,
        });
    }

    if flags.use_replica {
        Ok(TopologyKind::Replicated)
    } else if cluster {
        Ok(TopologyKind::Cluster)
    } else {
        Ok(TopologyKind::Standalone)
    }
}

/// Process-wide cache tier handle. Exactly one shape is populated, and it is
/// never changed once built.
#[derive(Clone)]
pub enum Topology {
    Standalone(Arc<dyn CacheConnection>),
    Replicated {
        primary: Arc<dyn CacheConnection>,
        replica: Arc<dyn CacheConnection>,
    },
    Cluster(Vec<Arc<dyn CacheConnection>>),
}

impl Topology {
    pub fn kind(&self) -> TopologyKind {
        match self {
            Topology::Standalone(_) => TopologyKind::Standalone,
            Topology::Replicated { .. } => TopologyKind::Replicated,
            Topology::Cluster(_) => TopologyKind::Cluster,
        }
    }

    /// Selects the topology from `config` plus the command line override and
    /// opens the matching connections.
    pub fn connect(config: &ServiceConfig, cluster_override: bool) -> Result<Self, ConfigError> {
        let cache = &config.cache;
        let kind = select_topology(TopologyFlags {
            use_cluster: cache.use_cluster,
            use_replica: cache.use_replica,
            cluster_override,
        })?;

        match kind {
            TopologyKind::Standalone => {
                let addr = cache
                    .addr
                    .as_deref()
                    .ok_or(ConfigError::Missing("home-timeline-redis.addr"))?;
                tracing::info!("Using home-timeline-service with standalone cache at {}", addr);
                Ok(Topology::Standalone(remote(
                    addr,
                    cache.connections,
                    cache.timeout(),
                )?))
            }
            TopologyKind::Replicated => {
                let primary = config
                    .primary
                    .as_ref()
                    .ok_or(ConfigError::Missing("redis-primary"))?;
                let replica = config
                    .replica
                    .as_ref()
                    .ok_or(ConfigError::Missing("redis-replica"))?;
                tracing::info!(
                    "Using home-timeline-service with replicated cache (primary={}, replica={})",
                    primary.addr,
                    replica.addr
                );
                Ok(Topology::Replicated {
                    primary: remote_backend(primary)?,
                    replica: remote_backend(replica)?,
                })
            }
            TopologyKind::Cluster => {
                if cache.shards.is_empty() {
                    return Err(ConfigError::NoShards);
                }
                tracing::info!(
                    "Using home-timeline-service with cache cluster support ({} shards)",
                    cache.shards.len()
                );
                let shards = cache
                    .shards
                    .iter()
                    .map(|addr| remote(addr, cache.connections, cache.timeout()))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Topology::Cluster(shards))
            }
        }
    }
}

fn remote_backend(section: &BackendSection) -> Result<Arc<dyn CacheConnection>, ConfigError> {
    remote(&section.addr, section.connections, section.timeout())
}

fn remote(
    addr: &str,
    connections: usize,
    timeout: Duration,
) -> Result<Arc<dyn CacheConnection>, ConfigError> {
    let conn = RemoteConnection::new(addr, connections, timeout).map_err(|e| {
        ConfigError::Connection {
            addr: addr.to_string(),
            message: e.to_string(),
        }
    })?;
    Ok(Arc::new(conn))
}
