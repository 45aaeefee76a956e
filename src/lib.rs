#![deny(missing_docs)]

//! Core library for the chest X-ray report assistant.

/// HTTP routing and page handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the hosted API adapter.
pub mod embedding;
/// Completion client abstraction and the hosted API adapter.
pub mod generation;
/// Persisted similarity index.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Usage counters.
pub mod metrics;
/// Prompt templates and excerpt formatting.
pub mod prompts;
/// Suggested questions and per-request question resolution.
pub mod question;
/// Query-to-chunk retrieval over the loaded index.
pub mod retrieval;
/// Question-answering and summarization flows.
pub mod service;
