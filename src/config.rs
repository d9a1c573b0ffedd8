use clap::Parser;
use std::{path::PathBuf, time::Duration};

/// Measure latency and token counts of a Triton generate endpoint.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Prompts to send; falls back to --prompts-file, then a built-in prompt.
    pub prompts: Vec<String>,
    /// File with one prompt per line; blank lines are skipped.
    #[arg(long)]
    pub prompts_file: Option<PathBuf>,
    #[arg(long, env, default_value = "http://localhost:8000")]
    pub server_url: String,
    #[arg(long, env, default_value = "vllm_model")]
    pub model_name: String,
    #[arg(long, env, default_value = "TheBloke/Nous-Hermes-2-Mixtral-8x7B-DPO-AWQ")]
    pub tokenizer_model: String,
    /// Local tokenizer.json, or a directory searched for one.
    #[arg(long, env)]
    pub tokenizer_path: Option<PathBuf>,
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,
    /// Count tokens without BOS/EOS.
    #[arg(long)]
    pub no_special_tokens: bool,
    #[arg(long, env, default_value_t = 200)]
    pub max_tokens: u32,
    #[arg(long, env, default_value = "triton-vllm-awq")]
    pub label: String,
    /// minijinja template with a single `prompt` variable.
    #[arg(long, env, default_value = "{{ prompt }}")]
    pub prompt_template: String,
    /// Use the `[INST] ... [/INST]` template instead of --prompt-template.
    #[arg(long)]
    pub instruct: bool,
    #[arg(long, env, default_value_t = 600)]
    pub request_timeout_secs: u64,
    #[arg(long, env, default_value_t = 10)]
    pub connect_timeout_secs: u64,
    /// Number of times each prompt is sent.
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,
    /// Write results as JSON lines here (`-` for stdout) instead of printing a transcript.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write a Prometheus text snapshot of run metrics here.
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
    /// Log failed probes and continue instead of aborting.
    #[arg(long)]
    pub keep_going: bool,
    /// Check the server readiness endpoint before probing.
    #[arg(long)]
    pub check_ready: bool,
}

pub const DEFAULT_PROMPT: &str = "San Francisco is a city in";

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
