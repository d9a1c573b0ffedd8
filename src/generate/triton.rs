use super::{GenerateRequest, GenerateResponse, Generator};
use crate::{error::ProbeError, validate::Validator};
use reqwest::Client;
use serde_json::Value;
use std::{sync::Arc, time::Duration};

#[derive(Clone, Debug)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self { connect: Duration::from_secs(10), request: Duration::from_secs(600) }
    }
}

struct Inner {
    http: Client,
    validator: Validator,
    endpoint: String,
    ready_url: String,
}

/// Client for the Triton generate extension:
/// `POST {server}/v2/models/{model}/generate`.
#[derive(Clone)]
pub struct TritonClient {
    inner: Arc<Inner>,
}

impl TritonClient {
    pub fn new(server_url: &str, model_name: &str, timeouts: ClientTimeouts) -> Result<Self, ProbeError> {
        let base = server_url.trim_end_matches('/');
        let endpoint = format!("{base}/v2/models/{model_name}/generate");
        let ready_url = format!("{base}/v2/health/ready");

        let http = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()
            .map_err(|e| ProbeError::transport(&endpoint, e))?;

        let validator = Validator::generate_response()
            .map_err(|reason| ProbeError::contract(&endpoint, None, reason))?;

        Ok(Self { inner: Arc::new(Inner { http, validator, endpoint, ready_url }) })
    }

    /// Checks the server's readiness probe. Any non-success status is a
    /// contract error.
    pub async fn ready(&self) -> Result<(), ProbeError> {
        let url = &self.inner.ready_url;
        let res = self.inner.http.get(url).send().await.map_err(|e| ProbeError::transport(url, e))?;
        let status = res.status();
        if !status.is_success() {
            return Err(ProbeError::contract(url, Some(status.as_u16()), "server is not ready"));
        }
        tracing::debug!(%url, "server ready");
        Ok(())
    }

    fn parse_body(&self, status: reqwest::StatusCode, body: &[u8]) -> Result<GenerateResponse, ProbeError> {
        let endpoint = &self.inner.endpoint;
        let code = (!status.is_success()).then(|| status.as_u16());

        let v: Value = serde_json::from_slice(body).map_err(|e| {
            ProbeError::contract(endpoint, code, format!("body is not JSON ({e}): {}", snippet(body)))
        })?;

        if let Some(code) = code {
            // Triton reports failures as {"error": "..."}
            let reason = v
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| snippet(body));
            return Err(ProbeError::contract(endpoint, Some(code), reason));
        }

        self.inner.validator.validate(&v).map_err(|reason| ProbeError::contract(endpoint, None, reason))?;
        serde_json::from_value(v).map_err(|e| ProbeError::contract(endpoint, None, e.to_string()))
    }
}

fn snippet(body: &[u8]) -> String {
    const MAX: usize = 256;
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.into_owned(),
    }
}

#[async_trait::async_trait]
impl Generator for TritonClient {
    fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ProbeError> {
        let endpoint = &self.inner.endpoint;
        let res = self
            .inner
            .http
            .post(endpoint)
            .json(req)
            .send()
            .await
            .map_err(|e| ProbeError::transport(endpoint, e))?;
        let status = res.status();
        let body = res.bytes().await.map_err(|e| ProbeError::transport(endpoint, e))?;
        tracing::trace!(%status, bytes = body.len(), "generate response received");
        self.parse_body(status, &body)
    }
}
