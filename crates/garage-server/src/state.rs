//! Shared application state.

use std::sync::Arc;

use garage_chat::LLMConfig;
use garage_core::{Error, GarageConfig, Result};
use garage_index::{IndexCounts, RetrieverState};
use parking_lot::RwLock;
use tracing::info;

pub const NOT_READY: &str =
    "Indexes are not loaded. Build the indexes, then restart the server or call /reload-indexes.";

/// Shared application state accessible from all route handlers.
///
/// The snapshot is swapped whole on reload; requests hold their own `Arc`
/// so a reload never changes data under a running query.
pub struct AppState {
    pub config: GarageConfig,
    pub llm_config: LLMConfig,
    pub http: reqwest::Client,
    snapshot: RwLock<Option<Arc<RetrieverState>>>,
}

impl AppState {
    pub fn new(config: GarageConfig, llm_config: LLMConfig) -> Self {
        Self {
            config,
            llm_config,
            http: reqwest::Client::new(),
            snapshot: RwLock::new(None),
        }
    }

    /// The current snapshot, if one has been loaded.
    pub fn snapshot(&self) -> Option<Arc<RetrieverState>> {
        self.snapshot.read().clone()
    }

    /// The current snapshot, or `NotReady`.
    pub fn require_snapshot(&self) -> Result<Arc<RetrieverState>> {
        self.snapshot().ok_or_else(|| Error::NotReady(NOT_READY.into()))
    }

    /// Publish a freshly built snapshot.
    pub fn install(&self, state: RetrieverState) -> IndexCounts {
        let counts = state.counts();
        *self.snapshot.write() = Some(Arc::new(state));
        counts
    }

    /// Rebuild the snapshot from disk and publish it. On failure the
    /// previous snapshot stays in place.
    pub async fn reload(&self) -> Result<IndexCounts> {
        let paths = self.config.index_paths.clone();
        let state = tokio::task::spawn_blocking(move || garage_index::load(&paths))
            .await
            .map_err(|e| Error::Internal(format!("index load task failed: {}", e)))??;
        let counts = self.install(state);
        info!("Index snapshot published ({} chunks, {} parts)", counts.chunks, counts.parts);
        Ok(counts)
    }
}
