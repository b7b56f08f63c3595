use serde::Serialize;

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecStats {
    /// Number of rows in the dataset; fixed at run start.
    pub total: usize,

    /// Rows whose handler call has finished, successfully or not.
    pub processed: usize,

    /// Rows whose handler call returned an error.
    pub errors: usize,

    /// Last progress percentage reported, `-1` before the first report.
    pub last_logged_percent: i32,
}

impl ExecStats {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            errors: 0,
            last_logged_percent: -1,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.processed - self.errors
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// A progress threshold crossed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub percent: u32,
    pub processed: usize,
    pub total: usize,
}
