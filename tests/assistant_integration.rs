use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use httpmock::{Method::POST, MockServer};
use reportqa::{
    api,
    config::Config,
    index::{INDEX_FILE_NAME, IndexError},
    service::{AssistantApi, AssistantService, StartupError},
};
use serde_json::{Value, json};
use tower::ServiceExt;

const DIMENSION: usize = 3;

fn write_bundle() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reportqa-bundle-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("bundle dir");
    let chunks: Vec<Value> = [
        ("report_001.txt", "The lungs are clear. No pleural effusion.", [1.0, 0.0, 0.0]),
        ("report_002.txt", "Heart size is normal. No pneumothorax.", [0.9, 0.1, 0.0]),
        ("report_003.txt", "Right lower lobe opacity concerning for pneumonia.", [0.0, 1.0, 0.0]),
        ("report_004.txt", "Mild cardiomegaly with pulmonary vascular congestion.", [0.0, 0.0, 1.0]),
    ]
    .into_iter()
    .map(|(source, text, embedding)| {
        json!({ "text": text, "metadata": { "source": source }, "embedding": embedding })
    })
    .collect();
    let body = json!({ "dimension": DIMENSION, "chunks": chunks });
    std::fs::write(dir.join(INDEX_FILE_NAME), body.to_string()).expect("write bundle");
    dir
}

fn config(base_url: String, vectorstore_path: &Path) -> Config {
    Config {
        openai_api_key: "sk-test".into(),
        openai_base_url: base_url,
        embedding_model: "text-embedding-ada-002".into(),
        embedding_dimension: DIMENSION,
        completion_model: "gpt-3.5-turbo-instruct".into(),
        completion_temperature: 0.0,
        completion_max_tokens: 256,
        vectorstore_path: vectorstore_path.to_path_buf(),
        retriever_top_k: 3,
        server_port: None,
    }
}

async fn post(app: axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn suggested_question_is_answered_from_three_sources() {
    let server = MockServer::start_async().await;
    let bundle = write_bundle();

    let embeddings = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embeddings")
                .json_body(json!({
                    "model": "text-embedding-ada-002",
                    "input": ["Is the chest X-ray normal?"]
                }));
            then.status(200).json_body(json!({
                "data": [{ "index": 0, "embedding": [1.0, 0.0, 0.0] }]
            }));
        })
        .await;
    let completions = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/completions")
                .body_contains("The lungs are clear. No pleural effusion.")
                .body_contains("Heart size is normal. No pneumothorax.")
                .body_contains("Right lower lobe opacity concerning for pneumonia.")
                .body_contains("Question: Is the chest X-ray normal?");
            then.status(200).json_body(json!({
                "choices": [{ "text": " Yes, the study is normal." }]
            }));
        })
        .await;

    let service = Arc::new(
        AssistantService::initialize(&config(server.base_url(), &bundle)).expect("service"),
    );
    let app = api::create_router(service.clone());

    let (status, body) = post(
        app,
        "/api/answer",
        json!({ "suggestions": ["normal_study"], "question": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Yes, the study is normal.");
    let sources = body["sources"].as_array().expect("sources");
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0]["metadata"]["source"], "report_001.txt");
    assert_eq!(sources[1]["metadata"]["source"], "report_002.txt");
    embeddings.assert_hits_async(1).await;
    completions.assert_hits_async(1).await;
    assert_eq!(service.metrics_snapshot().questions_answered, 1);
}

#[tokio::test]
async fn blank_report_never_reaches_the_model() {
    let server = MockServer::start_async().await;
    let bundle = write_bundle();
    let completions = server
        .mock_async(|when, then| {
            when.method(POST).path("/completions");
            then.status(200).json_body(json!({ "choices": [{ "text": "unused" }] }));
        })
        .await;

    let service = Arc::new(
        AssistantService::initialize(&config(server.base_url(), &bundle)).expect("service"),
    );
    let (status, body) = post(
        api::create_router(service),
        "/api/summarize",
        json!({ "report": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["warning"], "Please paste a report to summarize.");
    completions.assert_hits_async(0).await;
}

#[tokio::test]
async fn report_is_summarized_with_fixed_template() {
    let server = MockServer::start_async().await;
    let bundle = write_bundle();
    let report = "Findings: Heart size normal. Lungs clear.";
    let completions = server
        .mock_async(|when, then| {
            when.method(POST).path("/completions").json_body(json!({
                "model": "gpt-3.5-turbo-instruct",
                "prompt": "Please provide a concise summary of the following chest X-ray findings:\n\nFindings: Heart size normal. Lungs clear.\n\nSummary:",
                "temperature": 0.0,
                "max_tokens": 256
            }));
            then.status(200)
                .json_body(json!({ "choices": [{ "text": "Normal chest radiograph." }] }));
        })
        .await;
    let embeddings = server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(500);
        })
        .await;

    let service = Arc::new(
        AssistantService::initialize(&config(server.base_url(), &bundle)).expect("service"),
    );
    let (status, body) = post(
        api::create_router(service),
        "/api/summarize",
        json!({ "report": report }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "Normal chest radiograph.");
    completions.assert_hits_async(1).await;
    embeddings.assert_hits_async(0).await;
}

#[tokio::test]
async fn embedding_outage_surfaces_as_bad_gateway() {
    let server = MockServer::start_async().await;
    let bundle = write_bundle();
    server
        .mock_async(|when, then| {
            when.method(POST).path("/embeddings");
            then.status(503).body("overloaded");
        })
        .await;
    let completions = server
        .mock_async(|when, then| {
            when.method(POST).path("/completions");
            then.status(200).json_body(json!({ "choices": [{ "text": "unused" }] }));
        })
        .await;

    let service = Arc::new(
        AssistantService::initialize(&config(server.base_url(), &bundle)).expect("service"),
    );
    let (status, _) = post(
        api::create_router(service),
        "/api/answer",
        json!({ "question": "Is there evidence of pneumonia in this report?" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    completions.assert_hits_async(0).await;
}

#[test]
fn startup_fails_when_index_is_absent() {
    let missing = std::env::temp_dir().join(format!("reportqa-missing-{}", uuid::Uuid::new_v4()));
    let result = AssistantService::initialize(&config("http://127.0.0.1:9".into(), &missing));
    assert!(matches!(
        result,
        Err(StartupError::Index(IndexError::NotFound(_)))
    ));
}

#[test]
fn startup_fails_on_dimension_mismatch() {
    let bundle = write_bundle();
    let mut config = config("http://127.0.0.1:9".into(), &bundle);
    config.embedding_dimension = 1536;
    let result = AssistantService::initialize(&config);
    assert!(matches!(
        result,
        Err(StartupError::Index(IndexError::DimensionMismatch {
            expected: 1536,
            actual: DIMENSION
        }))
    ));
}
