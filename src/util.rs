use anyhow::Context;
use std::{fs, path::Path};

use crate::config::DEFAULT_PROMPT;

pub fn read_to_string<P: AsRef<Path>>(p: P) -> anyhow::Result<String> {
    fs::read_to_string(&p).with_context(|| format!("read file {:?}", p.as_ref()))
}

/// One prompt per line. Blank and whitespace-only lines are skipped; other
/// lines are kept verbatim.
pub fn read_prompts<P: AsRef<Path>>(p: P) -> anyhow::Result<Vec<String>> {
    let text = read_to_string(p)?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}

/// Positional prompts win, then the prompts file, then [`DEFAULT_PROMPT`].
pub fn resolve_prompts(positional: &[String], file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    if !positional.is_empty() {
        return Ok(positional.to_vec());
    }
    if let Some(path) = file {
        let prompts = read_prompts(path)?;
        if !prompts.is_empty() {
            return Ok(prompts);
        }
        tracing::warn!(path = %path.display(), "prompts file has no prompts, using default");
    }
    Ok(vec![DEFAULT_PROMPT.to_string()])
}
