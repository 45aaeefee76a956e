use crate::embedding::{EmbeddingClient, EmbeddingClientError};
use crate::index::{DocumentChunk, VectorIndex};
use std::sync::Arc;
use thiserror::Error;

/// Errors produced while mapping a query to its nearest chunks.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Query could not be embedded.
    #[error("Failed to embed query: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding model produced vectors of a different size than the index stores.
    #[error("Query embedding has {actual} components but the index stores {expected}")]
    DimensionMismatch {
        /// Index dimension.
        expected: usize,
        /// Query vector length.
        actual: usize,
    },
    /// Embedding model returned a NaN or infinite component.
    #[error("Query embedding contains a non-finite component")]
    NonFiniteQuery,
}

/// A stored chunk paired with its distance to the query (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// Retrieved chunk, copied out of the index.
    pub chunk: DocumentChunk,
    /// Squared L2 distance between the query and chunk embeddings.
    pub distance: f32,
}

/// Maps query strings to their `top_k` nearest chunks in the loaded index.
///
/// Built once at startup and shared read-only by every request.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    top_k: usize,
}

impl Retriever {
    /// Pair a loaded index with the embedding client it was built with.
    pub fn new(
        index: Arc<VectorIndex>,
        embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedding_client,
            top_k,
        }
    }

    /// Shared handle to the underlying index.
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    /// Embed `query` (one embedding call) and return the nearest chunks, closest first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let vector = self.embedding_client.embed_query(query).await?;
        if vector.len() != self.index.dimension() {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: vector.len(),
            });
        }
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(RetrievalError::NonFiniteQuery);
        }

        let hits: Vec<RetrievedChunk> = self
            .index
            .nearest(&vector, self.top_k)
            .into_iter()
            .map(|(chunk, distance)| RetrievedChunk {
                chunk: chunk.clone(),
                distance,
            })
            .collect();
        tracing::debug!(top_k = self.top_k, hits = hits.len(), "Retrieved chunks");
        Ok(hits)
    }
}
