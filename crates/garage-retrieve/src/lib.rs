//! Retrieval engine: turns a workshop query into ranked evidence.
//!
//! Every stage is a pure function of the query and one `RetrieverState`
//! snapshot; nothing is cached between requests.

pub mod evidence;
pub mod grounding;
pub mod locate;
pub mod parts;
pub mod query;
pub mod rank;
pub mod retriever;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use locate::{locate_parts, LocateQuery, LocatedPart};
pub use query::{normalize_part_no, AnalyzedQuery};
pub use retriever::Retriever;
pub use types::*;
