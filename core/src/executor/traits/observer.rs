use crate::executor::types::{ExecStats, ProgressEvent};

/// Write-only observability sink for a batch run.
pub trait RunObserver: Send + Sync {
    fn name(&self) -> &str;
    fn observe(&self, event: &RunEvent);
}

/// Events emitted by the runner over the lifetime of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStart {
        run_id: String,
        total: usize,
        batches: usize,
    },
    BatchStart {
        run_id: String,
        batch_index: usize,
        rows: usize,
    },
    BatchEnd {
        run_id: String,
        batch_index: usize,
    },
    Progress {
        run_id: String,
        event: ProgressEvent,
    },
    RowFailed {
        run_id: String,
        row_index: usize,
        error: String,
    },
    RunEnd {
        run_id: String,
        stats: ExecStats,
        duration_ms: u64,
    },
    Cancelled {
        run_id: String,
        stats: ExecStats,
    },
}

impl RunEvent {
    pub fn run_id(&self) -> &str {
        match self {
            Self::RunStart { run_id, .. }
            | Self::BatchStart { run_id, .. }
            | Self::BatchEnd { run_id, .. }
            | Self::Progress { run_id, .. }
            | Self::RowFailed { run_id, .. }
            | Self::RunEnd { run_id, .. }
            | Self::Cancelled { run_id, .. } => run_id,
        }
    }

    /// Stable dotted name, used by structured sinks.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStart { .. } => "run.start",
            Self::BatchStart { .. } => "batch.start",
            Self::BatchEnd { .. } => "batch.end",
            Self::Progress { .. } => "run.progress",
            Self::RowFailed { .. } => "row.failed",
            Self::RunEnd { .. } => "run.end",
            Self::Cancelled { .. } => "run.cancelled",
        }
    }
}
