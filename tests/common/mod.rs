#![allow(dead_code)]

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use infer_probe::{error::ProbeError, tokenize::TokenCounter};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// What the stub generate endpoint answers with.
#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str),
}

#[derive(Clone)]
struct Stub {
    reply: Reply,
    delay: Duration,
    bodies: Arc<Mutex<Vec<Value>>>,
}

pub struct StubServer {
    pub url: String,
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

async fn generate(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.bodies.lock().await.push(body);
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    match stub.reply {
        Reply::Json(status, v) => (status, Json(v)).into_response(),
        Reply::Raw(status, text) => (status, text).into_response(),
    }
}

/// Stub Triton server on an ephemeral port.
pub async fn spawn_stub(reply: Reply, delay: Duration) -> StubServer {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub { reply, delay, bodies: bodies.clone() };
    let app = Router::new()
        .route("/v2/models/:model/generate", post(generate))
        .route("/v2/health/ready", get(|| async { StatusCode::OK }))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    StubServer { url: format!("http://{addr}"), bodies }
}

pub fn ok_reply(text: &str) -> Reply {
    Reply::Json(
        StatusCode::OK,
        serde_json::json!({"model_name": "vllm_model", "model_version": "1", "text_output": text}),
    )
}

/// A port nothing listens on.
pub fn dead_server_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// One id per whitespace separated word.
#[derive(Clone)]
pub struct WordTokenizer;

impl TokenCounter for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, ProbeError> {
        Ok(text.split_whitespace().map(|w| w.len() as u32).collect())
    }
}

/// Word-level tokenizer.json with a whitespace pre-tokenizer.
pub const WORD_LEVEL_TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": { "type": "Whitespace" },
  "post_processor": null,
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": { "[UNK]": 0, "San": 1, "Francisco": 2, "is": 3, "a": 4, "city": 5, "in": 6, "California": 7, ".": 8 },
    "unk_token": "[UNK]"
  }
}"#;
