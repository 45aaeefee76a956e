//! Persisted similarity index: loading, validation, and nearest-neighbour scans.

mod store;
pub mod types;

pub use store::{INDEX_FILE_NAME, VectorIndex};
pub use types::{DocumentChunk, IndexError, IndexSummary};
