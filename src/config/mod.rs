pub mod resolve;

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub data_dir: Option<String>,
    pub sqlite_path: Option<String>,
    /// Embedding dimension shared by every vector in the index.
    pub dimension: usize,
    pub default_k: usize,
    pub max_k: usize,
    /// Minimum `1 / (1 + distance)` a hit needs to be kept. 0 disables the filter.
    pub similarity_threshold: f32,
    /// Rebuild the whole index after each ingestion instead of appending.
    pub reindex_on_ingest: bool,
    /// Index size at which search switches to the rayon pool.
    pub parallel_search_min: usize,
    pub max_body_bytes: usize,
    pub max_question_len: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            data_dir: None,
            sqlite_path: None,
            dimension: 384,
            default_k: 5,
            max_k: 256,
            similarity_threshold: 0.0,
            reindex_on_ingest: true,
            parallel_search_min: 4096,
            max_body_bytes: 10 * 1024 * 1024,
            max_question_len: 1024,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = resolve::resolve_bind_addr()
            .and_then(|raw| match raw.parse::<IpAddr>() {
                Ok(addr) => Some(addr),
                Err(err) => {
                    tracing::warn!(value = %raw, error = %err, "invalid BIND_ADDR; using 127.0.0.1");
                    None
                }
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let config = Self {
            bind_addr,
            port: resolve::resolve_port(),
            data_dir: resolve::resolve_data_dir(),
            sqlite_path: resolve::resolve_sqlite_path(),
            dimension: resolve::resolve_dimension(),
            default_k: resolve::resolve_default_k(),
            max_k: resolve::resolve_max_k(),
            similarity_threshold: resolve::resolve_similarity_threshold(),
            reindex_on_ingest: resolve::resolve_reindex_on_ingest(),
            parallel_search_min: resolve::resolve_parallel_search_min(),
            max_body_bytes: resolve::resolve_max_body_mb(),
            max_question_len: resolve::resolve_max_question_len(),
            request_timeout_secs: resolve::resolve_request_timeout_secs(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dimension == 0 {
            anyhow::bail!("EMBEDDING_DIM must be greater than zero");
        }
        if self.default_k == 0 || self.default_k > self.max_k {
            anyhow::bail!(
                "TOP_K must be within 1..={} (got {})",
                self.max_k,
                self.default_k
            );
        }
        Ok(())
    }

    /// SQLite file backing the document store, if any. An explicit path wins
    /// over the data directory.
    pub fn sqlite_file(&self) -> Option<PathBuf> {
        self.sqlite_path.as_ref().map(PathBuf::from).or_else(|| {
            self.data_dir
                .as_ref()
                .map(|dir| PathBuf::from(dir).join("documents.db"))
        })
    }
}
