//! Part locator: catalogue entries by number, diagram, and/or reference.

use garage_core::{Error, Result};
use garage_index::{diagram_route, normalize_part_no, PartRecord, RetrieverState};
use serde::{Deserialize, Serialize};

pub const MAX_LOCATED: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateQuery {
    #[serde(default)]
    pub part_no: Option<String>,
    #[serde(default)]
    pub diagram_id: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedPart {
    #[serde(flatten)]
    pub part: PartRecord,
    pub diagram_route: Option<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Catalogue parts matching every supplied filter, up to `MAX_LOCATED`.
///
/// Part numbers go through the snapshot's number index, which is keyed by
/// `PartRecord::normalized_part_no`, the identity the part matcher uses.
pub fn locate_parts(state: &RetrieverState, query: &LocateQuery) -> Result<Vec<LocatedPart>> {
    let part_no = filled(&query.part_no).map(normalize_part_no);
    let diagram_id = filled(&query.diagram_id);
    let reference = filled(&query.reference).map(normalize_part_no);

    if part_no.is_none() && diagram_id.is_none() {
        return Err(Error::Validation("partNo or diagramId is required".into()));
    }

    let matches = |part: &PartRecord| {
        diagram_id.map_or(true, |d| part.diagram_id.as_deref().map(str::trim) == Some(d))
            && reference.as_ref().map_or(true, |r| part.normalized_ref() == *r)
    };

    let candidates: Box<dyn Iterator<Item = &PartRecord> + '_> = match &part_no {
        Some(n) => Box::new(state.parts_for_number(n)),
        None => Box::new(state.parts.iter()),
    };

    Ok(candidates
        .filter(|part| matches(*part))
        .take(MAX_LOCATED)
        .map(|part| LocatedPart {
            diagram_route: diagram_route(part.group_id.as_deref(), part.diagram_id.as_deref()),
            part: part.clone(),
        })
        .collect())
}
