use crate::error::ProbeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generation options sent with every request.
///
/// `stream` is always off and `temperature` always zero; only `max_tokens`
/// varies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub stream: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const DEFAULT_MAX_TOKENS: u32 = 200;

impl GenerateParams {
    pub fn new(max_tokens: u32) -> Self {
        Self { stream: false, temperature: 0.0, max_tokens }
    }
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text_input: String,
    pub parameters: GenerateParams,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GenerateResponse {
    pub text_output: String,
    /// Echoed by Triton; shape unchecked.
    #[serde(default)]
    pub model_name: Option<Value>,
    #[serde(default)]
    pub model_version: Option<Value>,
}

/// A remote text generation endpoint.
#[async_trait::async_trait]
pub trait Generator: Send + Sync + 'static {
    /// Address requests are sent to, used in errors and logs.
    fn endpoint(&self) -> &str;

    /// One round trip. Resolves once the response body has been fully read.
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, ProbeError>;
}

pub mod triton;
