use std::str::FromStr;
use tracing::Level;

pub const DEFAULT_LOG_LEVEL: Level = Level::INFO;

/// Parses a level name (`trace`, `debug`, `info`, `warn`, `error`), case-insensitive.
pub fn parse_level(name: &str) -> Option<Level> {
    Level::from_str(name.trim()).ok()
}

/// Installs the global fmt subscriber. Call once, before serving.
pub fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
