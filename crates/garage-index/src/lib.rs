//! Index records and the retriever snapshot.
//!
//! The transform pipeline writes one JSON artifact per entity. This crate
//! decodes them into plain structs and groups them into lookup tables that
//! stay immutable for the lifetime of a snapshot.

pub mod de;
pub mod loader;
pub mod normalize;
pub mod state;
pub mod types;

pub use loader::{load, parse_collection};
pub use normalize::{diagram_route, normalize_part_no};
pub use state::{IndexCollections, IndexCounts, RetrieverState};
pub use types::*;
