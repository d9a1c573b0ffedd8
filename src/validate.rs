use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Schema the generate extension's response body has to satisfy.
pub const GENERATE_RESPONSE_SCHEMA: &str = include_str!("../schema/generate_response.schema.json");

pub struct Validator {
    compiled: JSONSchema,
}

impl Validator {
    pub fn new(schema: &str) -> Result<Self, String> {
        let schema: Value = serde_json::from_str(schema).map_err(|e| format!("schema is not JSON: {e}"))?;
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft202012)
            .compile(&schema)
            .map_err(|e| format!("invalid schema: {e}"))?;
        Ok(Self { compiled })
    }

    pub fn generate_response() -> Result<Self, String> {
        Self::new(GENERATE_RESPONSE_SCHEMA)
    }

    /// Returns the first violation as `"<instance path>: <message>"`.
    pub fn validate(&self, v: &Value) -> Result<(), String> {
        if let Err(mut errors) = self.compiled.validate(v) {
            return match errors.next() {
                Some(first) => {
                    let path = first.instance_path.to_string();
                    let path = if path.is_empty() { "/".to_string() } else { path };
                    Err(format!("schema error at {path}: {first}"))
                }
                None => Err("schema validation failed".to_string()),
            };
        }
        Ok(())
    }
}
