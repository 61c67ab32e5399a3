//! Diagram grounding resolver: one best diagram location per part.

use std::collections::HashSet;

use garage_index::{diagram_route, DiagramGrounding, RetrieverState};

use crate::types::{GroundingMatch, MatchedPart, MAX_GROUNDINGS};

/// Highest-ranked candidate; ties keep input order.
///
/// Any candidate with a hotspot outranks every candidate without one.
pub fn best_candidate<'a, I>(candidates: I) -> Option<&'a DiagramGrounding>
where
    I: IntoIterator<Item = &'a DiagramGrounding>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.rank_score() >= candidate.rank_score() => Some(current),
        _ => Some(candidate),
    })
}

/// Ground each merged part, in merge order. Parts without candidates are
/// skipped; a part number is grounded once.
pub fn resolve_groundings(state: &RetrieverState, parts: &[MatchedPart]) -> Vec<GroundingMatch> {
    let mut seen = HashSet::new();
    let mut grounded = Vec::new();

    for matched in parts {
        if grounded.len() >= MAX_GROUNDINGS {
            break;
        }
        let number = matched.part.normalized_part_no();
        if number.is_empty() || seen.contains(&number) {
            continue;
        }
        let Some(best) = best_candidate(state.groundings_for_number(&number)) else {
            continue;
        };
        seen.insert(number);

        let group_id = best.group_id.as_deref().or(matched.part.group_id.as_deref());
        grounded.push(GroundingMatch {
            diagram_url: diagram_route(group_id, best.diagram.id.as_deref()),
            grounding: best.clone(),
        });
    }

    grounded
}
