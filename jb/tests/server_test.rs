//! HTTP integration tests for the journey builder
//!
//! Drives the router in-process with a scripted LLM client.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use journey_builder::catalog::BuiltinCatalog;
use journey_builder::config::{AmbiguityPolicy, ServerConfig};
use journey_builder::conversation::{ConversationEngine, EngineSettings};
use journey_builder::intent::IntentExtractor;
use journey_builder::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use journey_builder::prompts::PromptLoader;
use journey_builder::server::router;
use journey_builder::session::SessionStore;

const BASE: &str = "/journey/api";

/// Replies with scripted text in order, then fails
struct ScriptedLlm {
    replies: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .map(CompletionResponse::text)
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn app(replies: &[&str]) -> Router {
    let engine = ConversationEngine::new(
        SessionStore::spawn(),
        Arc::new(BuiltinCatalog),
        Arc::new(ScriptedLlm::new(replies)),
        PromptLoader::embedded_only(),
        IntentExtractor::with_defaults().unwrap(),
        EngineSettings {
            ambiguity_policy: AmbiguityPolicy::EveryTurn,
            guidance: false,
            max_tokens: 1024,
            temperature: 0.0,
            timeout: Duration::from_secs(5),
        },
    );
    router(Arc::new(engine), &ServerConfig::default())
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("{}{}", BASE, path))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("{}{}", BASE, path))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn start(app: &Router) -> String {
    let (status, body) = post(app, "/start", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

async fn say(app: &Router, session_id: &str, message: &str) -> (StatusCode, Value) {
    post(app, "/process", json!({"session_id": session_id, "message": message})).await
}

const LOAN_JOURNEY: &str = r#"```json
{
  "journey_name": "LoanJourney",
  "journey_type": "single",
  "no_screens": 1,
  "screens": [
    {"screen_id": 1, "screen_name": "PAN Check", "screen_components": [{"screen_component_name": "pan"}]}
  ],
  "navigation": []
}
```"#;

#[tokio::test]
async fn test_health() {
    let app = app(&[]);
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_start_get_and_post() {
    let app = app(&[]);

    let (status, body) = get(&app, "/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "session started");
    assert_eq!(body["final"], false);
    assert!(body["next_prompt"].as_str().unwrap().contains("name this journey"));

    let second = start(&app).await;
    assert_ne!(body["session_id"].as_str().unwrap(), second);
}

#[tokio::test]
async fn test_confirm_before_screens_asks_for_name() {
    let app = app(&[]);
    let session_id = start(&app).await;

    let (status, body) = say(&app, &session_id, "confirm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], false);
    assert!(body["next_prompt"].as_str().unwrap().contains("Add a name"));
}

#[tokio::test]
async fn test_free_text_then_confirm_single_screen() {
    let app = app(&[LOAN_JOURNEY]);
    let session_id = start(&app).await;

    let (status, body) = say(&app, &session_id, "Name it LoanJourney, 1 screen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], false);
    assert_eq!(body["needs_trigger_selection"], false);

    let journey = &body["journey_json"];
    assert_eq!(journey["journey_name"], "LoanJourney");
    assert_eq!(journey["no_screens"], 1);
    let screen = &journey["screens"][0];
    assert_eq!(screen["template"], "defaultTemplate");
    assert_eq!(screen["style"], "defaultScreenStyle");
    let component = &screen["screen_components"][0];
    assert_eq!(component["screen_component_id"], 2);
    assert_eq!(component["screen_component_style"], "defaultScreenComponentStyle");
    assert_eq!(component["field_components"][1]["isTriggerComponent"], true);
    assert!(body["flow_diagram"].as_str().unwrap().starts_with("flowchart TD"));

    let (status, body) = say(&app, &session_id, "confirm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], true);

    let (status, body) = say(&app, &session_id, "hello again").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid session ID or message");
}

#[tokio::test]
async fn test_quit_then_session_is_gone() {
    let app = app(&[]);
    let session_id = start(&app).await;

    let (status, body) = say(&app, &session_id, "bye").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], true);

    let (status, _) = say(&app, &session_id, "confirm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, &format!("/diagram/{}", session_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_rejects_missing_fields() {
    let app = app(&[]);
    let session_id = start(&app).await;

    let (status, body) = post(&app, "/process", json!({"message": "hi"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid session ID or message");

    let (status, _) = post(&app, "/process", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = say(&app, "not-a-session", "hi").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oracle_outage_is_a_conversational_reply() {
    let app = app(&[]);
    let session_id = start(&app).await;

    let (status, body) = say(&app, &session_id, "make a KYC journey").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["final"], false);
    assert_eq!(
        body["next_prompt"],
        "Sorry, I encountered an error processing your request. Please try again."
    );
    assert_eq!(body["journey_json"]["screens"], json!([]));
}

#[tokio::test]
async fn test_field_components_and_catalog_listing() {
    let app = app(&[]);

    let (status, body) = get(&app, "/field-components/pan").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[1]["fieldComponentId"], 13);
    assert_eq!(body[1]["fieldLabel"], "Validate PAN");

    let (status, body) = get(&app, "/field-components/selfie").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("selfie"));

    let (status, body) = get(&app, "/components").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["screen_component_name"], "CustomerDetails");
}

#[tokio::test]
async fn test_diagram_endpoint() {
    let app = app(&[LOAN_JOURNEY]);
    let session_id = start(&app).await;
    say(&app, &session_id, "Name it LoanJourney, 1 screen").await;

    let (status, body) = get(&app, &format!("/diagram/{}", session_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], session_id);
    assert!(body["flow_diagram"].as_str().unwrap().contains("S1[\"PAN Check\"]"));
}
