//! Record builders shared by unit tests.

use garage_index::*;

pub fn chunk(
    chunk_id: &str,
    doc_id: &str,
    title: &str,
    text: &str,
    content_type: &str,
    engines: &[&str],
) -> ProcedureChunk {
    ProcedureChunk {
        chunk_id: chunk_id.into(),
        doc_id: doc_id.into(),
        title: title.into(),
        text: text.into(),
        content_type: Some(ContentType::from(content_type.to_string())),
        meta: None,
        engines: engines.iter().map(|e| e.to_string()).collect(),
    }
}

pub fn part(part_no: &str, description: &str, diagram_id: &str, reference: &str) -> PartRecord {
    PartRecord {
        part_no: part_no.into(),
        part_no_normalized: Some(normalize_part_no(part_no)),
        description: description.into(),
        diagram_id: Some(diagram_id.into()),
        group_id: Some("G1".into()),
        reference: Some(reference.into()),
        ..Default::default()
    }
}

pub fn grounding(part_no: &str, diagram_id: &str, has_hotspot: bool, confidence: f64) -> DiagramGrounding {
    DiagramGrounding {
        part_no: part_no.into(),
        part_no_normalized: Some(normalize_part_no(part_no)),
        description: String::new(),
        usage: None,
        reference: None,
        diagram: GroundingDiagram {
            id: Some(diagram_id.into()),
            sheet_code: None,
        },
        hotspot: HotspotInfo {
            has_hotspot,
            best_confidence: confidence,
            mode: None,
            geometry_count: u32::from(has_hotspot),
        },
        group_id: Some("G1".into()),
        group_name: None,
    }
}

pub fn tool(code: &str, used_in: &[&str]) -> Tool {
    Tool {
        code: code.into(),
        name: format!("Tool {}", code),
        description: String::new(),
        used_in: used_in.iter().map(|d| d.to_string()).collect(),
    }
}

pub fn torque(component: &str, value: &str, doc_id: &str) -> TorqueValue {
    TorqueValue {
        component: component.into(),
        value: value.into(),
        unit: "Nm".into(),
        source_page: doc_id.into(),
    }
}

pub fn state(collections: IndexCollections) -> RetrieverState {
    RetrieverState::build(collections)
}

/// A small brake-service corpus used across modules.
pub fn brake_corpus() -> IndexCollections {
    IndexCollections {
        chunks: vec![
            chunk(
                "g1",
                "d-overview",
                "Brake pads overview",
                "The brake pads wear against the disc.",
                "generic",
                &[],
            ),
            chunk(
                "p1",
                "d-pads",
                "Brake Pads – Remove and Install",
                "Remove the caliper bolts, then lift out the brake pads.",
                "procedure",
                &[],
            ),
            chunk(
                "p2",
                "d-pads",
                "Brake Pads – Remove and Install (cont.)",
                "Install new brake pads and torque the caliper bolts.",
                "procedure",
                &[],
            ),
            chunk(
                "z1",
                "d-diesel",
                "Brake vacuum pump",
                "Brake vacuum pump on the diesel engine.",
                "procedure",
                &["Z19DTH"],
            ),
        ],
        documents: vec![Document {
            doc_id: "d-pads".into(),
            title: "Front brakes".into(),
            extra: Default::default(),
        }],
        parts: vec![
            part("93176375", "Brake pad set, front", "D10", "1"),
            part("13301234", "Caliper bolt", "D10", "2"),
            part("55353213", "Oil filter", "D20", "4"),
        ],
        links: vec![PartProcedureLink {
            doc_id: "d-pads".into(),
            doc_title: "Front brakes".into(),
            epc_matches: vec![part("93176375", "Brake pad set, front", "D10", "1")],
        }],
        groundings: vec![
            grounding("93176375", "D10", false, 0.95),
            grounding("93176375", "D11", true, 0.40),
        ],
        tools: vec![tool("KM-6174", &["d-pads"]), tool("KM-6174", &["d-pads"]), tool("KM-900", &["d-pads"])],
        torque_values: vec![torque("Caliper bolt", "28", "d-pads"), torque("Caliper bolt", "28", "d-pads")],
    }
}
