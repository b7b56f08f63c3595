//! Command flows: resolve config overrides, obtain a dataset, then run it
//! through the configured sink.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rowflow_core::config::AppConfig;
use rowflow_core::executor::ProgressBarObserver;
use rowflow_core::{validate_config, BatchError, BatchRunner, Dataset, DatasetError, ExecStats};
use rowflow_plugins::extract::HttpExtractor;
use rowflow_plugins::factory::build_handler;
use rowflow_plugins::observers::JsonlEventObserver;
use rowflow_plugins::transform::parse_funds;

use crate::commands::cli::{BatchArgs, Commands, FileArgs, FundsArgs, SinkArgs};
use crate::error::CliError;

pub async fn dispatch(cmd: Commands, cfg: AppConfig) -> Result<i32, CliError> {
    match cmd {
        Commands::Funds(args) => run_funds(args, cfg).await,
        Commands::File(args) => run_file(args, cfg).await,
    }
}

#[tracing::instrument(name = "cli.funds", skip_all)]
pub async fn run_funds(args: FundsArgs, mut cfg: AppConfig) -> Result<i32, CliError> {
    resolve_run_config(&mut cfg, &args.batch, &args.sink)?;
    if let Some(url) = &args.url {
        cfg.source.url = url.clone();
    }

    let extractor = HttpExtractor::from_config(&cfg.source)?;
    tracing::info!("fetching fund list from {}", cfg.source.url);
    let response = extractor.get_json(&cfg.source.url).await?;
    let dataset = parse_funds(&response)?;
    tracing::info!("{} funds to process", dataset.len());

    execute(&dataset, &cfg, &args.batch).await
}

#[tracing::instrument(name = "cli.file", skip_all, fields(input = %args.input.display()))]
pub async fn run_file(args: FileArgs, mut cfg: AppConfig) -> Result<i32, CliError> {
    resolve_run_config(&mut cfg, &args.batch, &args.sink)?;
    let dataset = load_dataset(&args.input)?;
    tracing::info!("loaded {} rows", dataset.len());

    execute(&dataset, &cfg, &args.batch).await
}

/// Merge CLI flags into `cfg` and reject a bad batch config before any
/// fetch, file read or sink setup.
fn resolve_run_config(
    cfg: &mut AppConfig,
    batch_args: &BatchArgs,
    sink_args: &SinkArgs,
) -> Result<(), CliError> {
    batch_args.apply(&mut cfg.batch);
    sink_args.apply(&mut cfg.sink);
    validate_config(&cfg.batch)?;
    Ok(())
}

/// `.jsonl`/`.ndjson` is read line by line; anything else must hold a JSON array.
pub fn load_dataset(path: &Path) -> Result<Dataset, CliError> {
    let is_lines = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"));

    let file = File::open(path).map_err(DatasetError::Io)?;
    if is_lines {
        return Ok(Dataset::from_jsonl_reader(BufReader::new(file))?);
    }

    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Json {
            line: source.line(),
            source,
        })?;
    Ok(Dataset::from_json(value)?)
}

async fn execute(
    dataset: &Dataset,
    cfg: &AppConfig,
    batch_args: &BatchArgs,
) -> Result<i32, CliError> {
    let runner = build_runner(cfg, batch_args)?;
    let sink = build_handler(&cfg.sink)
        .await
        .map_err(|e| CliError::Config(format!("{e:#}")))?;
    tracing::debug!(sink = ?sink.kind(), "sink ready");

    let start = Instant::now();
    let result = runner.run_until(dataset, &sink, shutdown_signal()).await;
    // Flush whatever made it out, also after ctrl-c.
    let flushed = sink.finish().await;

    let stats = settle_run(result, flushed, start.elapsed().as_millis())?;
    print_summary(&stats, start.elapsed().as_millis());
    Ok(0)
}

/// The run outcome wins over a flush failure, so a cancelled run still
/// exits with the cancellation code.
fn settle_run(
    result: Result<ExecStats, BatchError>,
    flushed: anyhow::Result<()>,
    elapsed_ms: u128,
) -> Result<ExecStats, CliError> {
    match result {
        Ok(stats) => {
            flushed?;
            Ok(stats)
        }
        Err(err) => {
            if let Err(flush_err) = flushed {
                tracing::error!("failed to flush sink: {:#}", flush_err);
            }
            if let Some(partial) = err.partial_stats() {
                print_summary(partial, elapsed_ms);
            }
            Err(err.into())
        }
    }
}

fn build_runner(cfg: &AppConfig, batch_args: &BatchArgs) -> Result<BatchRunner, CliError> {
    let mut runner = BatchRunner::new(cfg.batch).with_tracing();

    if batch_args.progress_bar {
        runner = runner.with_observer(Arc::new(ProgressBarObserver::new(true)));
    }

    match batch_args.events_jsonl.as_deref().map(str::trim) {
        Some("-") => runner = runner.with_observer(Arc::new(JsonlEventObserver::stdout())),
        Some(path) if !path.is_empty() => {
            runner = runner.with_observer(Arc::new(JsonlEventObserver::to_file(path)?));
        }
        _ => {}
    }

    Ok(runner)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler unavailable: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::warn!("interrupt received, cancelling run");
}

fn print_summary(stats: &ExecStats, elapsed_ms: u128) {
    println!(
        "processed {} rows: {} succeeded, {} failed ({} ms)",
        stats.processed,
        stats.succeeded(),
        stats.errors,
        elapsed_ms
    );
}
