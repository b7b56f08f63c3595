use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use rowflow_core::{RunEvent, RunObserver};
use serde_json::{json, Value};

const EVENT_BUFFER_BYTES: usize = 64 * 1024;

/// Writes one JSON object per run event, e.g. for `jq` or a log shipper.
///
/// Progress events are observed while the run's stats lock is held, so
/// lines are buffered in memory; the sink sees a write only when the buffer
/// fills, at `run.end`, at `run.cancelled` or on drop.
pub struct JsonlEventObserver {
    out: Mutex<BufWriter<Box<dyn Write + Send>>>,
}

impl JsonlEventObserver {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(BufWriter::with_capacity(EVENT_BUFFER_BYTES, out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn to_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(Box::new(file)))
    }

    fn event_to_json(event: &RunEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        let metadata = match event {
            RunEvent::RunStart { total, batches, .. } => json!({
                "total": total,
                "batches": batches,
            }),
            RunEvent::BatchStart {
                batch_index, rows, ..
            } => json!({
                "batch_index": batch_index,
                "rows": rows,
            }),
            RunEvent::BatchEnd { batch_index, .. } => json!({
                "batch_index": batch_index,
            }),
            RunEvent::Progress { event, .. } => json!({
                "percent": event.percent,
                "processed": event.processed,
                "total": event.total,
            }),
            RunEvent::RowFailed {
                row_index, error, ..
            } => json!({
                "row_index": row_index,
                "error": error,
            }),
            RunEvent::RunEnd {
                stats, duration_ms, ..
            } => json!({
                "total": stats.total,
                "processed": stats.processed,
                "errors": stats.errors,
                "duration_ms": duration_ms,
            }),
            RunEvent::Cancelled { stats, .. } => json!({
                "total": stats.total,
                "processed": stats.processed,
                "errors": stats.errors,
            }),
        };

        json!({
            "v": 1,
            "event_type": event.event_type(),
            "ts": ts,
            "run_id": event.run_id(),
            "metadata": metadata,
        })
    }
}

impl RunObserver for JsonlEventObserver {
    fn name(&self) -> &str {
        "jsonl-events"
    }

    fn observe(&self, event: &RunEvent) {
        let line = serde_json::to_string(&Self::event_to_json(event))
            .unwrap_or_else(|_| "{}".into());
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(out, "{line}") {
            tracing::warn!("failed to write run event: {}", err);
        }
        if matches!(event, RunEvent::RunEnd { .. } | RunEvent::Cancelled { .. }) {
            if let Err(err) = out.flush() {
                tracing::warn!("failed to flush run events: {}", err);
            }
        }
    }
}

impl Drop for JsonlEventObserver {
    fn drop(&mut self) {
        if let Ok(out) = self.out.get_mut() {
            let _ = out.flush();
        }
    }
}
