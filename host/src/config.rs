//! Host configuration read from environment variables
//!
//! | Variable              | Default        | Meaning                              |
//! |-----------------------|----------------|--------------------------------------|
//! | `MAZE_GRAPH_PATH`     | built-in       | JSON cell table to carve mazes from  |
//! | `MAZE_RNG`            | `mono`         | maze generator (`mono` or `lcg`)     |
//! | `MAZE_SOLVE_DELAY_MS` | `100`          | pause between automated solve steps  |
//! | `MAZE_BIND_ADDRESS`   | `0.0.0.0:8080` | API server listen address            |
//! | `MAZE_SESSION_TTL_SECS` | `3600`       | idle time before the API drops a session |

use std::path::PathBuf;
use std::time::Duration;

use maze_core::{Graph, RngKind};

use crate::error::{HostError, HostResult};
use crate::persist::load_graph;

pub const DEFAULT_SOLVE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub graph_path: Option<PathBuf>,
    pub rng: RngKind,
    pub solve_delay: Duration,
    pub bind_address: String,
    pub session_ttl: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            graph_path: None,
            rng: RngKind::default(),
            solve_delay: DEFAULT_SOLVE_DELAY,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl HostConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> HostResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, for tests and embedding
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> HostResult<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("MAZE_GRAPH_PATH").filter(|p| !p.is_empty()) {
            config.graph_path = Some(PathBuf::from(path));
        }
        if let Some(kind) = lookup("MAZE_RNG") {
            config.rng = kind.parse().map_err(HostError::Config)?;
        }
        if let Some(ms) = lookup("MAZE_SOLVE_DELAY_MS") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|_| HostError::Config(format!("MAZE_SOLVE_DELAY_MS must be milliseconds, got '{}'", ms)))?;
            config.solve_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = lookup("MAZE_SESSION_TTL_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| HostError::Config(format!("MAZE_SESSION_TTL_SECS must be seconds, got '{}'", secs)))?;
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(addr) = lookup("MAZE_BIND_ADDRESS").filter(|a| !a.is_empty()) {
            config.bind_address = addr;
        }

        Ok(config)
    }

    /// The configured graph file, or the built-in lattice
    pub fn load_graph(&self) -> HostResult<Graph> {
        match &self.graph_path {
            Some(path) => {
                tracing::info!("Loading cell graph from {}", path.display());
                load_graph(path)
            }
            None => Ok(Graph::lattice()),
        }
    }
}
