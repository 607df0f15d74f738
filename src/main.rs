use axum::{Extension, Router, routing::post};
use home_timeline::cache::handlers::router as cache_router;
use home_timeline::cache::node::CacheNode;
use home_timeline::clients::graph::HttpSocialGraph;
use home_timeline::clients::posts::HttpPostStorage;
use home_timeline::telemetry::logging::{DEFAULT_LOG_LEVEL, init_logging, parse_level};
use home_timeline::timeline::handlers::{handle_read_home_timeline, handle_write_home_timeline};
use home_timeline::timeline::protocol::{ENDPOINT_READ_HOME_TIMELINE, ENDPOINT_WRITE_HOME_TIMELINE};
use home_timeline::timeline::service::HomeTimelineService;
use home_timeline::topology::config::{DEFAULT_CONFIG_PATH, ServiceConfig};
use home_timeline::topology::selector::Topology;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

struct Args {
    config_path: String,
    cluster_override: bool,
    cache_node: Option<SocketAddr>,
    log_level: tracing::Level,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--config <path>] [--redis-cluster] [--log-level <level>]",
        program
    );
    eprintln!("       {} --cache-node <addr:port>", program);
    eprintln!("Example: {} --config config/service-config.json", program);
    eprintln!("Example: {} --redis-cluster", program);
    eprintln!("Example: {} --cache-node 127.0.0.1:7000", program);
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();

    let mut parsed = Args {
        config_path: DEFAULT_CONFIG_PATH.to_string(),
        cluster_override: false,
        cache_node: None,
        log_level: DEFAULT_LOG_LEVEL,
    };

    let value = |i: usize| {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} expects a value", args[i]))
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                usage(&args[0]);
                std::process::exit(0);
            }
            "--config" => {
                parsed.config_path = value(i)?;
                i += 2;
            }
            "--redis-cluster" => {
                // Accepts a bare flag or an explicit boolean, as before.
                match args.get(i + 1).map(String::as_str) {
                    Some("true") | Some("1") => {
                        parsed.cluster_override = true;
                        i += 2;
                    }
                    Some("false") | Some("0") => {
                        parsed.cluster_override = false;
                        i += 2;
                    }
                    _ => {
                        parsed.cluster_override = true;
                        i += 1;
                    }
                }
            }
            "--cache-node" => {
                parsed.cache_node = Some(value(i)?.parse()?);
                i += 2;
            }
            "--log-level" => {
                let level = value(i)?;
                parsed.log_level = parse_level(&level)
                    .ok_or_else(|| anyhow::anyhow!("unknown log level {}", level))?;
                i += 2;
            }
            other => {
                eprintln!("Ignoring unknown argument {}", other);
                i += 1;
            }
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    init_logging(args.log_level);

    if let Some(bind_addr) = args.cache_node {
        return run_cache_node(bind_addr).await;
    }

    // 1. Configuration (read once):
    let config = ServiceConfig::load(&args.config_path)?;

    // 2. Topology. Conflicting switches abort before anything is served:
    let topology = match Topology::connect(&config, args.cluster_override) {
        Ok(topology) => topology,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    // 3. Collaborators:
    let social_graph = Arc::new(HttpSocialGraph::new(
        &config.social_graph.addr,
        config.social_graph.connections,
        config.social_graph.timeout(),
    )?);
    let post_storage = Arc::new(HttpPostStorage::new(
        &config.post_storage.addr,
        config.post_storage.connections,
        config.post_storage.timeout(),
    )?);

    let service = HomeTimelineService::new(topology, social_graph, post_storage)?;
    tracing::info!("Home timeline topology: {:?}", service.topology());

    // 4. HTTP Router:
    let app = Router::new()
        .route(ENDPOINT_WRITE_HOME_TIMELINE, post(handle_write_home_timeline))
        .route(ENDPOINT_READ_HOME_TIMELINE, post(handle_read_home_timeline))
        .layer(Extension(service));

    // 5. Start HTTP server:
    let http_addr: SocketAddr = config.service.addr.parse()?;
    tracing::info!("Starting the home-timeline-service server on {}", http_addr);

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_cache_node(bind_addr: SocketAddr) -> anyhow::Result<()> {
    let node = CacheNode::new();

    let app = cache_router(node.clone());

    // Stats reporter:
    let stats_node = node.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            tracing::info!(
                "Cache node stats: {} timelines, {} pipelines executed",
                stats_node.key_count(),
                stats_node.pipelines_executed()
            );
        }
    });

    tracing::info!("Cache node listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
