//! The immutable retriever snapshot.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::normalize::normalize_part_no;
use crate::types::*;

/// Raw collections as decoded from the artifacts.
#[derive(Debug, Clone, Default)]
pub struct IndexCollections {
    pub chunks: Vec<ProcedureChunk>,
    pub documents: Vec<Document>,
    pub parts: Vec<PartRecord>,
    pub links: Vec<PartProcedureLink>,
    pub groundings: Vec<DiagramGrounding>,
    pub tools: Vec<Tool>,
    pub torque_values: Vec<TorqueValue>,
}

/// Collection sizes reported by health and reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCounts {
    pub chunks: usize,
    pub documents: usize,
    pub parts: usize,
    pub links: usize,
    pub diagram_grounding: usize,
    pub tools: usize,
    pub torque_values: usize,
}

/// Everything a query needs, grouped for lookup. Never mutated once built.
#[derive(Debug)]
pub struct RetrieverState {
    pub chunks: Vec<ProcedureChunk>,
    pub documents: Vec<Document>,
    pub parts: Vec<PartRecord>,
    pub links: Vec<PartProcedureLink>,
    pub groundings: Vec<DiagramGrounding>,
    pub tools: Vec<Tool>,
    pub torque_values: Vec<TorqueValue>,
    /// Seconds since the Unix epoch at build time.
    pub loaded_at: u64,
    chunks_by_doc: HashMap<String, Vec<usize>>,
    documents_by_id: HashMap<String, usize>,
    parts_by_number: HashMap<String, Vec<usize>>,
    groundings_by_number: HashMap<String, Vec<usize>>,
    tools_by_doc: HashMap<String, Vec<usize>>,
    torque_by_doc: HashMap<String, Vec<usize>>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn push_index(map: &mut HashMap<String, Vec<usize>>, key: &str, idx: usize) {
    map.entry(key.to_string()).or_default().push(idx);
}

impl RetrieverState {
    /// Group raw collections into lookup tables.
    pub fn build(collections: IndexCollections) -> Self {
        let IndexCollections {
            chunks,
            documents,
            parts,
            links,
            groundings,
            tools,
            torque_values,
        } = collections;

        let mut chunks_by_doc = HashMap::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            push_index(&mut chunks_by_doc, &chunk.doc_id, idx);
        }

        let mut documents_by_id = HashMap::new();
        for (idx, doc) in documents.iter().enumerate() {
            documents_by_id.entry(doc.doc_id.clone()).or_insert(idx);
        }

        // Keyed like every other part comparison; a part with no number at
        // all is still scanned lexically but cannot be looked up.
        let mut parts_by_number = HashMap::new();
        for (idx, part) in parts.iter().enumerate() {
            let key = part.normalized_part_no();
            if !key.is_empty() {
                push_index(&mut parts_by_number, &key, idx);
            }
        }

        // Same join key as `PartRecord::normalized_part_no`.
        let mut groundings_by_number = HashMap::new();
        for (idx, grounding) in groundings.iter().enumerate() {
            let raw = non_empty(grounding.part_no_normalized.as_deref()).unwrap_or(&grounding.part_no);
            let key = normalize_part_no(raw);
            if !key.is_empty() {
                push_index(&mut groundings_by_number, &key, idx);
            }
        }

        let mut tools_by_doc = HashMap::new();
        for (idx, tool) in tools.iter().enumerate() {
            for doc_id in &tool.used_in {
                push_index(&mut tools_by_doc, doc_id, idx);
            }
        }

        let mut torque_by_doc = HashMap::new();
        for (idx, torque) in torque_values.iter().enumerate() {
            if let Some(key) = non_empty(Some(&torque.source_page)) {
                push_index(&mut torque_by_doc, key, idx);
            }
        }

        let loaded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            chunks,
            documents,
            parts,
            links,
            groundings,
            tools,
            torque_values,
            loaded_at,
            chunks_by_doc,
            documents_by_id,
            parts_by_number,
            groundings_by_number,
            tools_by_doc,
            torque_by_doc,
        }
    }

    pub fn counts(&self) -> IndexCounts {
        IndexCounts {
            chunks: self.chunks.len(),
            documents: self.documents.len(),
            parts: self.parts.len(),
            links: self.links.len(),
            diagram_grounding: self.groundings.len(),
            tools: self.tools.len(),
            torque_values: self.torque_values.len(),
        }
    }

    pub fn chunks_for_doc<'a>(&'a self, doc_id: &str) -> impl Iterator<Item = &'a ProcedureChunk> + 'a {
        Self::resolve(&self.chunks_by_doc, doc_id, &self.chunks)
    }

    pub fn document(&self, doc_id: &str) -> Option<&Document> {
        self.documents_by_id.get(doc_id).map(|&idx| &self.documents[idx])
    }

    pub fn parts_for_number<'a>(&'a self, normalized: &str) -> impl Iterator<Item = &'a PartRecord> + 'a {
        Self::resolve(&self.parts_by_number, normalized, &self.parts)
    }

    pub fn groundings_for_number<'a>(
        &'a self,
        normalized: &str,
    ) -> impl Iterator<Item = &'a DiagramGrounding> + 'a {
        Self::resolve(&self.groundings_by_number, normalized, &self.groundings)
    }

    pub fn tools_for_doc<'a>(&'a self, doc_id: &str) -> impl Iterator<Item = &'a Tool> + 'a {
        Self::resolve(&self.tools_by_doc, doc_id, &self.tools)
    }

    pub fn torque_for_doc<'a>(&'a self, doc_id: &str) -> impl Iterator<Item = &'a TorqueValue> + 'a {
        Self::resolve(&self.torque_by_doc, doc_id, &self.torque_values)
    }

    fn resolve<'a, T>(
        map: &'a HashMap<String, Vec<usize>>,
        key: &str,
        items: &'a [T],
    ) -> impl Iterator<Item = &'a T> + 'a {
        map.get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &items[idx])
    }
}
