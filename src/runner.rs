use crate::{
    error::ProbeError,
    generate::Generator,
    probe::{Probe, ProbeResult},
    report::Summary,
    tokenize::TokenCounter,
};

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Times each prompt is sent.
    pub repeat: usize,
    /// Count failures and continue instead of stopping at the first one.
    pub keep_going: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { repeat: 1, keep_going: false }
    }
}

pub struct RunOutcome {
    pub summary: Summary,
    /// The failure that stopped the run; always `None` with `keep_going`.
    pub aborted: Option<ProbeError>,
}

/// Sends every prompt `repeat` times, one after the other, handing each
/// result to `sink`. Probe failures end up in the outcome; only sink errors
/// are returned as `Err`.
pub async fn run_all<G, T, F>(
    probe: &Probe<G, T>,
    prompts: &[String],
    opts: &RunOptions,
    mut sink: F,
) -> anyhow::Result<RunOutcome>
where
    G: Generator,
    T: TokenCounter,
    F: FnMut(&ProbeResult) -> anyhow::Result<()>,
{
    let mut summary = Summary::new()?;
    for prompt in prompts {
        for _ in 0..opts.repeat {
            match probe.run(prompt).await {
                Ok(result) => {
                    summary.record(&result);
                    tracing::info!(tok_count = result.tok_count, time = result.elapsed_secs, "ok");
                    sink(&result)?;
                }
                Err(e) => {
                    summary.record_error();
                    tracing::error!(kind = e.kind(), error = %e, "probe failed");
                    if !opts.keep_going {
                        return Ok(RunOutcome { summary, aborted: Some(e) });
                    }
                }
            }
        }
    }
    Ok(RunOutcome { summary, aborted: None })
}
