use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use infer_probe::config::Config;
use infer_probe::generate::triton::{ClientTimeouts, TritonClient};
use infer_probe::generate::Generator;
use infer_probe::prompt::PromptTemplate;
use infer_probe::report::ResultWriter;
use infer_probe::runner::{run_all, RunOptions};
use infer_probe::tokenize::HfTokenizer;
use infer_probe::{util, Probe};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = Config::parse();

    // logs
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let metrics = match &cfg.metrics_out {
        Some(_) => Some(PrometheusBuilder::new().install_recorder().context("install metrics recorder")?),
        None => None,
    };

    let prompts = util::resolve_prompts(&cfg.prompts, cfg.prompts_file.as_deref())?;

    let template = if cfg.instruct {
        PromptTemplate::instruct()
    } else {
        PromptTemplate::new(cfg.prompt_template.clone())?
    };

    // tokenizer: local file/dir first, hub otherwise (blocking download)
    let tokenizer = match cfg.tokenizer_path.clone() {
        Some(path) => HfTokenizer::from_path(path)?,
        None => {
            let (model, token) = (cfg.tokenizer_model.clone(), cfg.hf_token.clone());
            tokio::task::spawn_blocking(move || HfTokenizer::from_hub(&model, token)).await??
        }
    }
    .with_special_tokens(!cfg.no_special_tokens);

    let timeouts = ClientTimeouts { connect: cfg.connect_timeout(), request: cfg.request_timeout() };
    let client = TritonClient::new(&cfg.server_url, &cfg.model_name, timeouts)?;
    if cfg.check_ready {
        client.ready().await?;
    }

    let probe = Probe::new(client, tokenizer)
        .with_template(template)
        .with_max_tokens(cfg.max_tokens)
        .with_label(cfg.label.clone());

    let mut writer = match &cfg.output {
        Some(path) if path.as_os_str() == "-" => Some(ResultWriter::stdout()),
        Some(path) => Some(ResultWriter::create(path)?),
        None => None,
    };

    tracing::info!(
        endpoint = probe.generator().endpoint(),
        prompts = prompts.len(),
        repeat = cfg.repeat,
        "probing"
    );
    let opts = RunOptions { repeat: cfg.repeat, keep_going: cfg.keep_going };
    let outcome = run_all(&probe, &prompts, &opts, |result| {
        match writer.as_mut() {
            Some(w) => w.write(result)?,
            None => println!("User: {}\nModel: {}", result.prompt, result.generated_text),
        }
        Ok(())
    })
    .await?;
    if let Some(w) = writer.as_mut() {
        w.flush()?;
    }

    let stats = outcome.summary.stats();
    tracing::info!(
        requests = stats.requests,
        errors = stats.errors,
        p50_ms = stats.p50_ms,
        p95_ms = stats.p95_ms,
        p99_ms = stats.p99_ms,
        total_tokens = stats.total_tokens,
        tokens_per_sec = stats.tokens_per_sec,
        "summary"
    );

    if let (Some(handle), Some(path)) = (metrics, &cfg.metrics_out) {
        std::fs::write(path, handle.render()).with_context(|| format!("write metrics {:?}", path))?;
    }

    match outcome.aborted {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
