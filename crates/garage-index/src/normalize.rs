//! Canonical identities used wherever parts are compared or joined.

/// Canonical part-number identity: outer whitespace and parentheses stripped,
/// inner whitespace removed, uppercased.
pub fn normalize_part_no(value: &str) -> String {
    value
        .trim_matches(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Viewer route for a parts diagram, when both identifiers are known.
pub fn diagram_route(group_id: Option<&str>, diagram_id: Option<&str>) -> Option<String> {
    let group_id = group_id.map(str::trim).filter(|s| !s.is_empty())?;
    let diagram_id = diagram_id.map(str::trim).filter(|s| !s.is_empty())?;
    Some(format!("/epc/{}/diagram/{}", group_id, diagram_id))
}
