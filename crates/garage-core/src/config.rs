//! Configuration and index file layout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3020;
pub const DEFAULT_INDEX_DIR: &str = "data/indexes";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 45;

/// Paths to the JSON artifacts produced by the transform pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPaths {
    /// Directory holding every artifact (`data/indexes/`).
    pub root: PathBuf,
    /// Chunked procedure text (`procedure-chunks.json`).
    pub chunks: PathBuf,
    /// Document metadata (`documents.json`).
    pub documents: PathBuf,
    /// Parts catalogue entries (`parts-index.json`).
    pub parts: PathBuf,
    /// Part to procedure associations (`part-procedure-links.json`).
    pub links: PathBuf,
    /// Diagram hotspot groundings (`diagram-grounding.json`).
    pub groundings: PathBuf,
    /// Special tool catalogue (`tools.json`).
    pub tools: PathBuf,
    /// Torque value catalogue (`torque-values.json`).
    pub torque: PathBuf,
}

impl IndexPaths {
    /// Lay out the standard artifact names under a root directory.
    ///
    /// Unlike data directories, nothing is created here: the index directory
    /// is an input and its absence is reported by the loader.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            chunks: root.join("procedure-chunks.json"),
            documents: root.join("documents.json"),
            parts: root.join("parts-index.json"),
            links: root.join("part-procedure-links.json"),
            groundings: root.join("diagram-grounding.json"),
            tools: root.join("tools.json"),
            torque: root.join("torque-values.json"),
            root,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarageConfig {
    /// HTTP server port.
    pub port: u16,
    /// Index artifact locations.
    pub index_paths: IndexPaths,
    /// Upper bound on one outbound text-generation call, in seconds.
    pub llm_timeout_secs: u64,
}

impl GarageConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let index_dir = std::env::var("GARAGE_INDEX_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_INDEX_DIR));

        let llm_timeout_secs = std::env::var("GARAGE_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS);

        Self {
            port,
            index_paths: IndexPaths::new(index_dir),
            llm_timeout_secs,
        }
    }

    /// Configuration rooted at an explicit index directory (tests, CLI).
    pub fn with_index_dir(index_dir: impl AsRef<Path>) -> Self {
        Self {
            port: DEFAULT_PORT,
            index_paths: IndexPaths::new(index_dir),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
