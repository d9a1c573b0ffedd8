use crate::{
    error::ProbeError,
    generate::{GenerateParams, GenerateRequest, Generator},
    prompt::PromptTemplate,
    tokenize::TokenCounter,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const DEFAULT_LABEL: &str = "triton-vllm-awq";

/// Outcome of one probe, serialized as one JSONL record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(rename = "answer")]
    pub generated_text: String,
    pub tok_count: usize,
    /// Seconds from just before the request went out until the full
    /// response body was in.
    #[serde(rename = "time")]
    pub elapsed_secs: f64,
    #[serde(rename = "note")]
    pub label: String,
}

pub struct Probe<G, T> {
    generator: G,
    tokenizer: T,
    template: PromptTemplate,
    params: GenerateParams,
    label: String,
}

impl<G: Generator, T: TokenCounter> Probe<G, T> {
    pub fn new(generator: G, tokenizer: T) -> Self {
        Self {
            generator,
            tokenizer,
            template: PromptTemplate::default(),
            params: GenerateParams::default(),
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Only `max_tokens` is taken from the caller; streaming stays off and
    /// temperature stays at zero.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.params = GenerateParams::new(max_tokens);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn build_request(&self, prompt: &str) -> Result<GenerateRequest, ProbeError> {
        Ok(GenerateRequest { text_input: self.template.render(prompt)?, parameters: self.params.clone() })
    }

    pub async fn run(&self, prompt: &str) -> Result<ProbeResult, ProbeError> {
        let outcome = self.run_inner(prompt).await;
        match &outcome {
            Ok(result) => {
                metrics::counter!("probe_requests_total").increment(1);
                metrics::counter!("probe_generated_tokens_total").increment(result.tok_count as u64);
                metrics::histogram!("probe_request_seconds").record(result.elapsed_secs);
            }
            Err(e) => {
                metrics::counter!("probe_errors_total", "kind" => e.kind()).increment(1);
            }
        }
        outcome
    }

    async fn run_inner(&self, prompt: &str) -> Result<ProbeResult, ProbeError> {
        if prompt.is_empty() {
            return Err(ProbeError::EmptyPrompt);
        }
        let req = self.build_request(prompt)?;

        let start = Instant::now();
        let res = self.generator.generate(&req).await?;
        let elapsed_secs = start.elapsed().as_secs_f64();

        let tok_count = self.tokenizer.count(&res.text_output)?;
        tracing::debug!(
            endpoint = self.generator.endpoint(),
            tok_count,
            elapsed_secs,
            model = res.model_name.as_ref().and_then(|v| v.as_str()).unwrap_or("-"),
            "probe done"
        );

        Ok(ProbeResult {
            prompt: prompt.to_string(),
            generated_text: res.text_output,
            tok_count,
            elapsed_secs,
            label: self.label.clone(),
        })
    }
}
