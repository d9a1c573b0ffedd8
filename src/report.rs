use crate::probe::ProbeResult;
use anyhow::{Context, Result};
use hdrhistogram::Histogram;
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// One JSON object per line.
pub struct ResultWriter {
    out: Box<dyn Write + Send>,
}

impl ResultWriter {
    pub fn stdout() -> Self {
        Self { out: Box::new(io::stdout()) }
    }

    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path).with_context(|| format!("create {:?}", path.as_ref()))?;
        Ok(Self { out: Box::new(BufWriter::new(file)) })
    }

    pub fn from_writer<W: Write + Send + 'static>(w: W) -> Self {
        Self { out: Box::new(w) }
    }

    pub fn write(&mut self, result: &ProbeResult) -> Result<()> {
        serde_json::to_writer(&mut self.out, result)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummaryStats {
    pub requests: u64,
    pub errors: u64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub total_tokens: u64,
    pub tokens_per_sec: f64,
}

/// Latency percentiles (microsecond resolution) plus token throughput.
pub struct Summary {
    hist: Histogram<u64>,
    errors: u64,
    total_tokens: u64,
    total_secs: f64,
}

impl Summary {
    pub fn new() -> Result<Self> {
        Ok(Self { hist: Histogram::new(3)?, errors: 0, total_tokens: 0, total_secs: 0.0 })
    }

    pub fn record(&mut self, result: &ProbeResult) {
        let micros = (result.elapsed_secs * 1_000_000.0).round().max(1.0) as u64;
        self.hist.saturating_record(micros);
        self.total_tokens += result.tok_count as u64;
        self.total_secs += result.elapsed_secs;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn stats(&self) -> SummaryStats {
        let pct = |q: f64| self.hist.value_at_quantile(q) as f64 / 1000.0;
        let (p50_ms, p95_ms, p99_ms) =
            if self.hist.is_empty() { (0.0, 0.0, 0.0) } else { (pct(0.50), pct(0.95), pct(0.99)) };
        let tokens_per_sec = if self.total_secs > 0.0 { self.total_tokens as f64 / self.total_secs } else { 0.0 };
        SummaryStats {
            requests: self.hist.len(),
            errors: self.errors,
            p50_ms,
            p95_ms,
            p99_ms,
            total_tokens: self.total_tokens,
            tokens_per_sec,
        }
    }
}
