//! HTTP surface for the report assistant.
//!
//! - `GET /` – The two-tab page (Question Answering, Summarization).
//! - `POST /api/answer` – Resolve the pressed suggestion or typed question, retrieve the nearest
//!   report chunks, and return the generated answer with its source excerpts. A blank question
//!   returns `204 No Content` without contacting the model.
//! - `POST /api/summarize` – Summarize a pasted report. A blank report returns
//!   `422 Unprocessable Entity` with a warning.
//! - `GET /api/suggestions` – The fixed suggested questions, in declared order.
//! - `GET /metrics` – Usage counters.
//! - `GET /health` – Loaded index summary.

use crate::question::{QuestionSelection, SuggestedQuestion};
use crate::service::{AssistantApi, AssistantError, SourceExcerpt, SummaryOutcome};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const INDEX_PAGE: &str = include_str!("ui/index.html");

/// Build the HTTP router exposing the page and its JSON endpoints.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: AssistantApi + 'static,
{
    Router::new()
        .route("/", get(index_page))
        .route("/api/answer", post(answer_question::<S>))
        .route("/api/summarize", post(summarize_report::<S>))
        .route("/api/suggestions", get(list_suggestions))
        .route("/metrics", get(get_metrics::<S>))
        .route("/health", get(get_health::<S>))
        .with_state(service)
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// Request body for `POST /api/answer`.
#[derive(Deserialize)]
struct AnswerRequest {
    /// Suggestions marked pressed in this submission.
    #[serde(default)]
    suggestions: Vec<SuggestedQuestion>,
    /// Typed question, used when no suggestion is pressed.
    #[serde(default)]
    question: Option<String>,
}

/// Success response for `POST /api/answer`.
#[derive(Serialize)]
struct AnswerResponse {
    question: String,
    answer: String,
    sources: Vec<SourceBlock>,
}

/// A source excerpt plus the text block the page displays for it.
#[derive(Serialize)]
struct SourceBlock {
    #[serde(flatten)]
    source: SourceExcerpt,
    rendered: String,
}

async fn answer_question<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<AnswerRequest>,
) -> Result<Response, AppError>
where
    S: AssistantApi,
{
    let selection = QuestionSelection::resolve(request.suggestions, request.question.as_deref());
    tracing::debug!(selection = ?selection, "Answer request");

    let Some(answer) = service.answer(selection.question()).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let sources = answer
        .excerpts()
        .into_iter()
        .map(|source| SourceBlock {
            rendered: source.render(),
            source,
        })
        .collect();
    Ok(Json(AnswerResponse {
        question: answer.question,
        answer: answer.answer,
        sources,
    })
    .into_response())
}

/// Request body for `POST /api/summarize`.
#[derive(Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    report: String,
}

async fn summarize_report<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Response, AppError>
where
    S: AssistantApi,
{
    let response = match service.summarize(&request.report).await? {
        SummaryOutcome::Summary(summary) => Json(json!({ "summary": summary })).into_response(),
        SummaryOutcome::Warning(warning) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "warning": warning })),
        )
            .into_response(),
    };
    Ok(response)
}

/// Descriptor for one suggested question.
#[derive(Serialize)]
struct SuggestionDescriptor {
    id: SuggestedQuestion,
    label: &'static str,
    question: &'static str,
}

#[derive(Serialize)]
struct SuggestionsResponse {
    suggestions: Vec<SuggestionDescriptor>,
}

async fn list_suggestions() -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse {
        suggestions: SuggestedQuestion::ALL
            .into_iter()
            .map(|id| SuggestionDescriptor {
                id,
                label: id.label(),
                question: id.question(),
            })
            .collect(),
    })
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> impl IntoResponse
where
    S: AssistantApi,
{
    Json(service.metrics_snapshot())
}

async fn get_health<S>(State(service): State<Arc<S>>) -> impl IntoResponse
where
    S: AssistantApi,
{
    Json(json!({ "status": "ok", "index": service.index_summary() }))
}

struct AppError(AssistantError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Upstream model call failed");
        (
            StatusCode::BAD_GATEWAY,
            "The language model service could not complete the request.",
        )
            .into_response()
    }
}

impl From<AssistantError> for AppError {
    fn from(inner: AssistantError) -> Self {
        Self(inner)
    }
}
