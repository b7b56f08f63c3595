use anyhow::{anyhow, Result};
use async_trait::async_trait;

use rowflow_core::config::{SinkConfig, SinkKind};
use rowflow_core::{Row, RowHandler};

use crate::handlers::{HttpPostHandler, JsonlRowWriter, LogRowHandler};

/// The row sink selected by `[sink]` configuration.
pub enum RowSink {
    Log(LogRowHandler),
    Jsonl(JsonlRowWriter),
    Http(HttpPostHandler),
}

impl RowSink {
    pub fn kind(&self) -> SinkKind {
        match self {
            Self::Log(_) => SinkKind::Log,
            Self::Jsonl(_) => SinkKind::Jsonl,
            Self::Http(_) => SinkKind::Http,
        }
    }

    /// Flush buffered output. Call once after the run, also after cancellation.
    pub async fn finish(&self) -> Result<()> {
        match self {
            Self::Jsonl(writer) => writer.flush().await,
            Self::Log(_) | Self::Http(_) => Ok(()),
        }
    }
}

#[async_trait]
impl RowHandler for RowSink {
    async fn handle(&self, row: &Row) -> Result<()> {
        match self {
            Self::Log(h) => h.handle(row).await,
            Self::Jsonl(h) => h.handle(row).await,
            Self::Http(h) => h.handle(row).await,
        }
    }
}

pub async fn build_handler(cfg: &SinkConfig) -> Result<RowSink> {
    match cfg.kind {
        SinkKind::Log => Ok(RowSink::Log(LogRowHandler)),
        SinkKind::Jsonl => {
            let path = cfg
                .path
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| anyhow!("sink.path is required for the jsonl sink"))?;
            Ok(RowSink::Jsonl(JsonlRowWriter::open(path).await?))
        }
        SinkKind::Http => Ok(RowSink::Http(HttpPostHandler::from_config(cfg)?)),
    }
}
