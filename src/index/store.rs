//! On-disk bundle loader and flat L2 search.

use crate::index::types::{DocumentChunk, IndexError, IndexSummary};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// File inside the bundle directory that carries dimension, chunks, and vectors.
pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Deserialize)]
struct IndexFile {
    dimension: usize,
    chunks: Vec<DocumentChunk>,
}

/// Immutable similarity index loaded once at process start.
///
/// Search is an exhaustive scan ranking chunks by squared Euclidean distance, which matches
/// the flat L2 index the bundle is exported from. The index is never mutated after load, so
/// it can be shared across request handlers without locking.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    chunks: Vec<DocumentChunk>,
    digest: String,
}

impl VectorIndex {
    /// Load and validate the bundle stored under `dir`.
    ///
    /// When `expected_dimension` is provided, the bundle must have been built with an
    /// embedding model of that dimensionality.
    pub fn load(dir: &Path, expected_dimension: Option<usize>) -> Result<Self, IndexError> {
        let path = dir.join(INDEX_FILE_NAME);
        if !path.is_file() {
            return Err(IndexError::NotFound(path));
        }

        let bytes = std::fs::read(&path).map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        })?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let file: IndexFile = serde_json::from_slice(&bytes).map_err(|error| IndexError::Corrupt {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        if file.dimension == 0 {
            return Err(IndexError::Corrupt {
                path,
                reason: "declared dimension is zero".into(),
            });
        }
        if let Some(position) = file
            .chunks
            .iter()
            .position(|chunk| chunk.embedding.len() != file.dimension)
        {
            return Err(IndexError::Corrupt {
                path,
                reason: format!(
                    "chunk {position} has {} components, expected {}",
                    file.chunks[position].embedding.len(),
                    file.dimension
                ),
            });
        }
        if let Some(position) = first_non_finite(&file.chunks) {
            return Err(IndexError::Corrupt {
                path,
                reason: format!("chunk {position} has a non-finite embedding component"),
            });
        }
        if let Some(expected) = expected_dimension {
            if expected != file.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: file.dimension,
                });
            }
        }

        let index = Self {
            dimension: file.dimension,
            chunks: file.chunks,
            digest,
        };
        tracing::info!(
            path = %path.display(),
            chunks = index.chunks.len(),
            dimension = index.dimension,
            digest = %index.digest,
            "Loaded vector index"
        );
        Ok(index)
    }

    /// Build an index from in-memory chunks, validating vector lengths.
    pub fn from_chunks(dimension: usize, chunks: Vec<DocumentChunk>) -> Result<Self, IndexError> {
        if let Some(chunk) = chunks
            .iter()
            .find(|chunk| chunk.embedding.len() != dimension)
        {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: chunk.embedding.len(),
            });
        }
        if let Some(chunk) = first_non_finite(&chunks) {
            return Err(IndexError::NonFiniteEmbedding { chunk });
        }
        let mut hasher = Sha256::new();
        for chunk in &chunks {
            hasher.update(chunk.text.as_bytes());
        }
        Ok(Self {
            dimension,
            chunks,
            digest: hex::encode(hasher.finalize()),
        })
    }

    /// Vector dimensionality shared by every stored chunk.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Borrow every stored chunk in on-disk order.
    pub fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    /// Summary used by logs, the health endpoint, and the index check tool.
    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            chunks: self.chunks.len(),
            dimension: self.dimension,
            digest: self.digest.clone(),
        }
    }

    /// Return up to `k` chunks nearest to `query`, closest first, with their squared L2
    /// distance. Equal distances keep on-disk order.
    ///
    /// `query` must have the index dimension and finite components; callers validate this.
    pub fn nearest(&self, query: &[f32], k: usize) -> Vec<(&DocumentChunk, f32)> {
        let mut scored: Vec<(&DocumentChunk, f32)> = self
            .chunks
            .iter()
            .map(|chunk| (chunk, squared_l2(&chunk.embedding, query)))
            .collect();
        // stable sort keeps insertion order for ties
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);
        scored
    }
}

fn first_non_finite(chunks: &[DocumentChunk]) -> Option<usize> {
    chunks
        .iter()
        .position(|chunk| chunk.embedding.iter().any(|value| !value.is_finite()))
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}
