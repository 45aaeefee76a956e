//! Shared types for the persisted similarity index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the similarity index from disk.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Bundle directory or its index file does not exist.
    #[error("Vector index not found at {0}")]
    NotFound(PathBuf),
    /// Filesystem refused to hand over the index bytes.
    #[error("Failed to read vector index {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Index file exists but is not a valid bundle.
    #[error("Vector index {path} is corrupt: {reason}")]
    Corrupt {
        /// File that failed to parse or validate.
        path: PathBuf,
        /// Human readable parse/validation failure.
        reason: String,
    },
    /// An in-memory chunk carries a NaN or infinite embedding component.
    #[error("Chunk {chunk} has a non-finite embedding component")]
    NonFiniteEmbedding {
        /// Position of the offending chunk.
        chunk: usize,
    },
    /// Vectors do not match the dimensionality the embedding client produces.
    #[error("Vector index dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch {
        /// Dimension required by the configured embedding model.
        expected: usize,
        /// Dimension found in the bundle.
        actual: usize,
    },
}

/// Stored unit of source text together with its provenance metadata and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Optional identifier assigned when the index was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Chunk body.
    pub text: String,
    /// Provenance metadata (e.g. originating file), kept in on-disk key order.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Embedding vector for `text`.
    pub embedding: Vec<f32>,
}

/// Compact description of a loaded index, used for logs and health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    /// Number of chunks available for retrieval.
    pub chunks: usize,
    /// Vector dimensionality shared by every chunk.
    pub dimension: usize,
    /// Hex-encoded SHA-256 of the index file.
    pub digest: String,
}
