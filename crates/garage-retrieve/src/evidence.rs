//! Evidence aggregator: tools and torque specs for the selected documents.

use std::collections::HashSet;

use garage_index::{RetrieverState, Tool, TorqueValue};

use crate::types::{MAX_TOOLS, MAX_TORQUE_SPECS};

/// Tools used by any of `doc_ids`; first occurrence of a code wins.
pub fn collect_tools(state: &RetrieverState, doc_ids: &[String]) -> Vec<Tool> {
    let mut seen = HashSet::new();
    doc_ids
        .iter()
        .flat_map(|doc_id| state.tools_for_doc(doc_id))
        .filter(|tool| seen.insert(tool.code.as_str()))
        .take(MAX_TOOLS)
        .cloned()
        .collect()
}

/// Torque values quoted on any of `doc_ids`. Repeats across pages are kept,
/// each carries its own source page.
pub fn collect_torque(state: &RetrieverState, doc_ids: &[String]) -> Vec<TorqueValue> {
    doc_ids
        .iter()
        .flat_map(|doc_id| state.torque_for_doc(doc_id))
        .take(MAX_TORQUE_SPECS)
        .cloned()
        .collect()
}
