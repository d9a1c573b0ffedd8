mod common;

use axum::http::StatusCode;
use common::{dead_server_url, ok_reply, spawn_stub, Reply, WordTokenizer};
use infer_probe::config::DEFAULT_PROMPT;
use infer_probe::generate::triton::{ClientTimeouts, TritonClient};
use infer_probe::runner::{run_all, RunOptions};
use infer_probe::util::{read_prompts, resolve_prompts};
use infer_probe::{Probe, ProbeResult};
use serde_json::json;
use std::{fs, time::Duration};
use temp_dir::TempDir;

const ANSWER: &str = "San Francisco is a city in California.";

fn build(url: &str) -> Probe<TritonClient, WordTokenizer> {
    let client = TritonClient::new(url, "vllm_model", ClientTimeouts::default()).unwrap();
    Probe::new(client, WordTokenizer)
}

fn prompts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn prompts_file_skips_blank_and_whitespace_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prompts.txt");
    fs::write(&path, "Tell me about AI\n\n   \n\t\n  What is 291 - 150?\r\nWrite a story about llamas\n").unwrap();

    assert_eq!(
        read_prompts(&path).unwrap(),
        prompts(&["Tell me about AI", "  What is 291 - 150?", "Write a story about llamas"])
    );
}

#[test]
fn positional_prompts_win_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prompts.txt");
    fs::write(&path, "from file\n").unwrap();

    let got = resolve_prompts(&prompts(&["from args"]), Some(path.as_path())).unwrap();
    assert_eq!(got, prompts(&["from args"]));

    let got = resolve_prompts(&[], Some(path.as_path())).unwrap();
    assert_eq!(got, prompts(&["from file"]));
}

#[test]
fn default_prompt_when_nothing_given() {
    assert_eq!(resolve_prompts(&[], None).unwrap(), prompts(&[DEFAULT_PROMPT]));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "\n  \n").unwrap();
    assert_eq!(resolve_prompts(&[], Some(path.as_path())).unwrap(), prompts(&[DEFAULT_PROMPT]));
}

#[test]
fn missing_prompts_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(resolve_prompts(&[], Some(dir.path().join("nope.txt").as_path())).is_err());
}

#[tokio::test]
async fn each_prompt_is_sent_repeat_times_in_order() {
    let stub = spawn_stub(ok_reply(ANSWER), Duration::ZERO).await;
    let probe = build(&stub.url);
    let opts = RunOptions { repeat: 3, keep_going: false };

    let mut seen: Vec<ProbeResult> = Vec::new();
    let outcome = run_all(&probe, &prompts(&["first", "second"]), &opts, |r| {
        seen.push(r.clone());
        Ok(())
    })
    .await
    .unwrap();

    assert!(outcome.aborted.is_none());
    let stats = outcome.summary.stats();
    assert_eq!(stats.requests, 6);
    assert_eq!(stats.errors, 0);
    assert_eq!(seen.len(), 6);
    assert!(seen[..3].iter().all(|r| r.prompt == "first"));
    assert!(seen[3..].iter().all(|r| r.prompt == "second"));

    let bodies = stub.bodies.lock().await;
    assert_eq!(bodies.len(), 6);
    assert_eq!(bodies[0]["text_input"], json!("first"));
    assert_eq!(bodies[5]["text_input"], json!("second"));
}

#[tokio::test]
async fn first_failure_stops_the_run() {
    let reply = Reply::Json(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "engine crashed"}));
    let stub = spawn_stub(reply, Duration::ZERO).await;
    let probe = build(&stub.url);
    let opts = RunOptions { repeat: 2, keep_going: false };

    let mut calls = 0;
    let outcome = run_all(&probe, &prompts(&["a", "b"]), &opts, |_| {
        calls += 1;
        Ok(())
    })
    .await
    .unwrap();

    let err = outcome.aborted.expect("run should stop on the first failure");
    assert!(err.is_contract(), "{err}");
    assert_eq!(calls, 0);
    assert_eq!(stub.bodies.lock().await.len(), 1);

    let stats = outcome.summary.stats();
    assert_eq!(stats.requests, 0);
    assert_eq!(stats.errors, 1);
}

#[tokio::test]
async fn keep_going_counts_every_failure() {
    let probe = build(&dead_server_url());
    let opts = RunOptions { repeat: 2, keep_going: true };

    let outcome = run_all(&probe, &prompts(&["a", "b", "c"]), &opts, |_| Ok(())).await.unwrap();

    assert!(outcome.aborted.is_none());
    let stats = outcome.summary.stats();
    assert_eq!(stats.requests, 0);
    assert_eq!(stats.errors, 6);
}

#[tokio::test]
async fn sink_errors_are_returned() {
    let stub = spawn_stub(ok_reply(ANSWER), Duration::ZERO).await;
    let probe = build(&stub.url);

    let res = run_all(&probe, &prompts(&["a"]), &RunOptions::default(), |_| anyhow::bail!("disk full")).await;
    assert!(res.is_err());
}
