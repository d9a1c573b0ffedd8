//! Concurrent load against a Triton generate endpoint.
//!
//! `cargo run -p xtask -- [server_url] [model_name]`
//!
//! Requests go through `TritonClient`, so a response without a string
//! `text_output` counts as a failure just like in the probe CLI.

use hdrhistogram::Histogram;
use infer_probe::generate::triton::{ClientTimeouts, TritonClient};
use infer_probe::generate::{GenerateParams, GenerateRequest, Generator};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const WORKERS: usize = 8;
const REQUESTS_PER_WORKER: usize = 25;

const PROMPTS: &[&str] = &[
    "Tell me about AI",
    "Write a story about llamas",
    "What is 291 - 150?",
    "How much wood would a woodchuck chuck if a woodchuck could chuck wood?",
    "San Francisco is a city in",
];

#[derive(Default)]
struct WorkerReport {
    latencies: Vec<Duration>,
    failures: BTreeMap<&'static str, usize>,
}

async fn worker(client: TritonClient, params: GenerateParams) -> WorkerReport {
    let mut report = WorkerReport::default();
    for _ in 0..REQUESTS_PER_WORKER {
        let prompt = PROMPTS.choose(&mut rand::thread_rng()).copied().unwrap_or(PROMPTS[0]);
        let req = GenerateRequest { text_input: prompt.to_string(), parameters: params.clone() };

        let started = Instant::now();
        match client.generate(&req).await {
            Ok(_) => report.latencies.push(started.elapsed()),
            Err(e) => *report.failures.entry(e.kind()).or_default() += 1,
        }
    }
    report
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let server_url = args.next().unwrap_or_else(|| "http://127.0.0.1:8000".to_string());
    let model_name = args.next().unwrap_or_else(|| "vllm_model".to_string());

    let client = TritonClient::new(&server_url, &model_name, ClientTimeouts::default())?;
    let params = GenerateParams::default();
    println!("{} workers x {} requests -> {}", WORKERS, REQUESTS_PER_WORKER, client.endpoint());

    let started = Instant::now();
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| tokio::spawn(worker(client.clone(), params.clone())))
        .collect();

    let mut hist = Histogram::<u64>::new(3)?;
    let mut failures: BTreeMap<&'static str, usize> = BTreeMap::new();
    for handle in handles {
        let report = handle.await?;
        for d in report.latencies {
            hist.saturating_record(d.as_millis() as u64);
        }
        for (kind, n) in report.failures {
            *failures.entry(kind).or_default() += n;
        }
    }

    println!("ok: {} in {:?}", hist.len(), started.elapsed());
    for (kind, n) in &failures {
        println!("failed ({kind}): {n}");
    }
    if !hist.is_empty() {
        println!(
            "p50 {} ms / p95 {} ms / p99 {} ms",
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.95),
            hist.value_at_quantile(0.99)
        );
    }
    Ok(())
}
