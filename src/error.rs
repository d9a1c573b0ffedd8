use thiserror::Error;

/// Everything that can go wrong while probing the generate endpoint.
///
/// `Transport` and `Contract` are the two failure modes of the round trip
/// itself; the rest come from the collaborators around it.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error talking to {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {endpoint}{}: {reason}", status_suffix(.status))]
    Contract {
        endpoint: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("prompt template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("prompt is empty")]
    EmptyPrompt,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl ProbeError {
    pub fn transport(endpoint: &str, source: reqwest::Error) -> Self {
        Self::Transport { endpoint: endpoint.to_string(), source }
    }

    pub fn contract(endpoint: &str, status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Contract { endpoint: endpoint.to_string(), status, reason: reason.into() }
    }

    /// Short label used for metrics and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Contract { .. } => "contract",
            Self::Tokenizer(_) => "tokenizer",
            Self::Template(_) => "template",
            Self::EmptyPrompt => "empty_prompt",
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_contract(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}
