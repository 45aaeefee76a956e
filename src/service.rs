//! Assistant service: the question-answering and summarization flows.

use crate::{
    config::Config,
    embedding::{EmbeddingClientError, get_embedding_client},
    generation::{GenerationClient, GenerationClientError, get_generation_client},
    index::{DocumentChunk, IndexError, IndexSummary, VectorIndex},
    metrics::{MetricsSnapshot, UsageMetrics},
    prompts::{excerpt, qa_prompt, summarization_prompt},
    retrieval::{RetrievalError, RetrievedChunk, Retriever},
};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Warning shown when the summarization tab is submitted without text.
pub const BLANK_REPORT_WARNING: &str = "Please paste a report to summarize.";

/// Errors that abort service construction before any request is served.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The similarity index could not be loaded.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// Embedding client construction failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    /// Generation client construction failed.
    #[error(transparent)]
    Generation(#[from] GenerationClientError),
}

/// Upstream failures raised while answering or summarizing.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Retrieval (query embedding) failed.
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
    /// The generation model call failed.
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationClientError),
}

/// Generated answer together with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Question that was answered.
    pub question: String,
    /// Model output.
    pub answer: String,
    /// Retrieved chunks, nearest first.
    pub sources: Vec<RetrievedChunk>,
}

impl Answer {
    /// Display form of every source, in retrieval order.
    pub fn excerpts(&self) -> Vec<SourceExcerpt> {
        self.sources
            .iter()
            .map(|hit| SourceExcerpt::from_chunk(&hit.chunk))
            .collect()
    }
}

/// A source chunk as shown to the user: verbatim metadata and a bounded excerpt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceExcerpt {
    /// Provenance metadata exactly as stored.
    pub metadata: Map<String, Value>,
    /// Leading characters of the chunk text.
    pub excerpt: String,
    /// Whether the chunk text was longer than the excerpt.
    pub truncated: bool,
}

impl SourceExcerpt {
    /// Build the display form of `chunk`.
    pub fn from_chunk(chunk: &DocumentChunk) -> Self {
        let (shown, truncated) = excerpt(&chunk.text);
        Self {
            metadata: chunk.metadata.clone(),
            excerpt: shown.to_string(),
            truncated,
        }
    }

    /// Plain-text block: metadata line, excerpt line, separator.
    pub fn render(&self) -> String {
        let metadata = Value::Object(self.metadata.clone());
        let ellipsis = if self.truncated { "..." } else { "" };
        format!(
            "Source: {metadata}\nExcerpt: {}{ellipsis}\n---",
            self.excerpt
        )
    }
}

/// Result of a summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Model-produced summary.
    Summary(String),
    /// Input was rejected locally; no model call was made.
    Warning(&'static str),
}

/// Abstraction over the assistant used by the HTTP surface.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Answer `question` from the indexed reports.
    ///
    /// Returns `Ok(None)` without any upstream call when the question is blank.
    async fn answer(&self, question: &str) -> Result<Option<Answer>, AssistantError>;

    /// Summarize a pasted report. Blank input yields [`SummaryOutcome::Warning`].
    async fn summarize(&self, report: &str) -> Result<SummaryOutcome, AssistantError>;

    /// Describe the loaded index.
    fn index_summary(&self) -> IndexSummary;

    /// Retrieve the current usage counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Owns the retriever and generation client shared by both flows.
///
/// Construct once near process start and share through an `Arc`; nothing inside is mutated
/// after construction apart from the atomic usage counters.
pub struct AssistantService {
    retriever: Retriever,
    generation_client: Box<dyn GenerationClient + Send + Sync>,
    metrics: UsageMetrics,
}

impl AssistantService {
    /// Assemble a service from already-built parts.
    pub fn new(
        retriever: Retriever,
        generation_client: Box<dyn GenerationClient + Send + Sync>,
    ) -> Self {
        Self {
            retriever,
            generation_client,
            metrics: UsageMetrics::new(),
        }
    }

    /// Load the index and build both model clients from configuration.
    ///
    /// Fails when the index bundle is missing, corrupt, or was built for a different embedding
    /// dimension.
    pub fn initialize(config: &Config) -> Result<Self, StartupError> {
        tracing::info!(path = %config.vectorstore_path.display(), "Loading vector index");
        let index = VectorIndex::load(&config.vectorstore_path, Some(config.embedding_dimension))?;
        let embedding_client = get_embedding_client(config)?;
        let generation_client = get_generation_client(config)?;
        let retriever = Retriever::new(
            Arc::new(index),
            embedding_client,
            config.retriever_top_k,
        );
        tracing::info!(top_k = config.retriever_top_k, "Assistant ready");
        Ok(Self::new(retriever, generation_client))
    }
}

#[async_trait]
impl AssistantApi for AssistantService {
    async fn answer(&self, question: &str) -> Result<Option<Answer>, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            self.metrics.record_blank();
            tracing::debug!("Ignoring blank question");
            return Ok(None);
        }

        let sources = self.retriever.retrieve(question).await?;
        let prompt = qa_prompt(question, &sources);
        let answer = self.generation_client.generate(prompt).await?;

        self.metrics.record_answer();
        tracing::info!(sources = sources.len(), "Question answered");
        Ok(Some(Answer {
            question: question.to_string(),
            answer,
            sources,
        }))
    }

    async fn summarize(&self, report: &str) -> Result<SummaryOutcome, AssistantError> {
        if report.trim().is_empty() {
            self.metrics.record_blank();
            return Ok(SummaryOutcome::Warning(BLANK_REPORT_WARNING));
        }

        let summary = self
            .generation_client
            .generate(summarization_prompt(report))
            .await?;

        self.metrics.record_summary();
        tracing::info!(report_chars = report.chars().count(), "Report summarized");
        Ok(SummaryOutcome::Summary(summary))
    }

    fn index_summary(&self) -> IndexSummary {
        self.retriever.index().summary()
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
