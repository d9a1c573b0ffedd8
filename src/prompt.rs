use crate::error::ProbeError;
use minijinja::{context, Environment};

/// Sends the prompt unchanged.
pub const PASSTHROUGH_TEMPLATE: &str = "{{ prompt }}";
/// Mistral/Mixtral instruction format.
pub const INSTRUCT_TEMPLATE: &str = "[INST] {{ prompt }} [/INST]";

pub struct PromptTemplate {
    env: Environment<'static>,
    source: String,
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self, ProbeError> {
        let source = source.into();
        let env = Environment::new();
        // surfaces syntax errors up front
        env.render_str(&source, context! { prompt => "" })?;
        Ok(Self { env, source })
    }

    pub fn passthrough() -> Self {
        Self { env: Environment::new(), source: PASSTHROUGH_TEMPLATE.to_string() }
    }

    pub fn instruct() -> Self {
        Self { env: Environment::new(), source: INSTRUCT_TEMPLATE.to_string() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, prompt: &str) -> Result<String, ProbeError> {
        Ok(self.env.render_str(&self.source, context! { prompt => prompt })?)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::passthrough()
    }
}
