//! Index loader: artifacts on disk to one `RetrieverState`.
//!
//! A missing or corrupt artifact degrades to an empty collection so a
//! partially built index set can still serve. Only a missing index
//! directory fails the load.

use std::path::Path;

use garage_core::{Error, IndexPaths, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::state::{IndexCollections, RetrieverState};

/// Load every artifact under `paths` and build a fresh snapshot.
///
/// Re-running against unchanged files yields identical collections.
pub fn load(paths: &IndexPaths) -> Result<RetrieverState> {
    if !paths.root.is_dir() {
        return Err(Error::Config(format!(
            "index directory {} does not exist",
            paths.root.display()
        )));
    }

    let collections = IndexCollections {
        chunks: read_collection(&paths.chunks, "chunks"),
        documents: read_collection(&paths.documents, "documents"),
        parts: read_collection(&paths.parts, "items"),
        links: read_collection(&paths.links, "links"),
        groundings: read_collection(&paths.groundings, "groundings"),
        tools: read_collection(&paths.tools, "tools"),
        torque_values: read_collection(&paths.torque, "values"),
    };

    let state = RetrieverState::build(collections);
    let counts = state.counts();
    info!(
        "Loaded indexes from {}: chunks={}, documents={}, parts={}, links={}, groundings={}, tools={}, torque={}",
        paths.root.display(),
        counts.chunks,
        counts.documents,
        counts.parts,
        counts.links,
        counts.diagram_grounding,
        counts.tools,
        counts.torque_values
    );
    Ok(state)
}

fn read_collection<T: DeserializeOwned>(path: &Path, key: &str) -> Vec<T> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Index file {} unavailable ({}); `{}` will be empty", path.display(), e, key);
            return Vec::new();
        }
    };

    match parse_collection(&raw, key) {
        Ok(items) => items,
        Err(e) => {
            warn!("Index file {} is not usable ({}); `{}` will be empty", path.display(), e, key);
            Vec::new()
        }
    }
}

/// Decode `{ "<key>": [...] }`, or a bare array, into records.
pub fn parse_collection<T: DeserializeOwned>(raw: &str, key: &str) -> serde_json::Result<Vec<T>> {
    match serde_json::from_str::<Value>(raw)? {
        array @ Value::Array(_) => serde_json::from_value(array),
        Value::Object(mut map) => match map.remove(key) {
            Some(items) => serde_json::from_value(items),
            None => Err(serde::de::Error::custom(format!("missing `{}` array", key))),
        },
        _ => Err(serde::de::Error::custom("expected an object or array")),
    }
}
