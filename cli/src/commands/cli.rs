use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use rowflow_core::config::{SinkConfig, SinkKind};
use rowflow_core::BatchConfig;

#[derive(Parser, Debug)]
#[command(name = "rowflow", version, about = "Bounded-concurrency batch row processor")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the fund list, flatten it and push every fund through the sink.
    Funds(FundsArgs),
    /// Process a local `.json` (array of objects) or `.jsonl` dataset.
    File(FileArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FundsArgs {
    /// Override `source.url`.
    #[arg(long)]
    pub url: Option<String>,

    #[command(flatten)]
    pub batch: BatchArgs,

    #[command(flatten)]
    pub sink: SinkArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FileArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub batch: BatchArgs,

    #[command(flatten)]
    pub sink: SinkArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct BatchArgs {
    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Progress granularity in percent.
    #[arg(long)]
    pub progress_step: Option<u32>,

    /// Do not log individual row failures (they are still counted).
    #[arg(long, default_value_t = false)]
    pub no_log_errors: bool,

    /// Draw a terminal progress bar on stderr.
    #[arg(long, default_value_t = false)]
    pub progress_bar: bool,

    /// Write run events as JSON lines to this file (`-` for stdout).
    #[arg(long)]
    pub events_jsonl: Option<String>,
}

impl BatchArgs {
    pub fn apply(&self, cfg: &mut BatchConfig) {
        if let Some(v) = self.batch_size {
            cfg.batch_size = v;
        }
        if let Some(v) = self.concurrency {
            cfg.concurrency = v;
        }
        if let Some(v) = self.progress_step {
            cfg.progress_step_percent = v;
        }
        if self.no_log_errors {
            cfg.log_errors = false;
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChoice {
    Log,
    Jsonl,
    Http,
}

impl From<SinkChoice> for SinkKind {
    fn from(choice: SinkChoice) -> Self {
        match choice {
            SinkChoice::Log => SinkKind::Log,
            SinkChoice::Jsonl => SinkKind::Jsonl,
            SinkChoice::Http => SinkKind::Http,
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SinkArgs {
    /// Where processed rows go; defaults to `sink.kind` from config.
    #[arg(long, value_enum)]
    pub sink: Option<SinkChoice>,

    /// Output file for the jsonl sink.
    #[arg(long)]
    pub output: Option<String>,

    /// Endpoint for the http sink.
    #[arg(long)]
    pub sink_url: Option<String>,

    #[arg(long)]
    pub sink_api_key: Option<String>,
}

impl SinkArgs {
    pub fn apply(&self, cfg: &mut SinkConfig) {
        if let Some(kind) = self.sink {
            cfg.kind = kind.into();
        }
        if let Some(path) = &self.output {
            cfg.path = Some(path.clone());
        }
        if let Some(url) = &self.sink_url {
            cfg.url = Some(url.clone());
        }
        if let Some(key) = &self.sink_api_key {
            cfg.api_key = Some(key.clone());
        }
    }
}
