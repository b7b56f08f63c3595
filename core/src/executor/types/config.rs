use std::num::{NonZeroU32, NonZeroUsize};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning knobs for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum rows per sequential batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum handler invocations in flight across the whole run.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Progress is reported each time the completed percentage lands on a
    /// multiple of this step.
    #[serde(default = "default_progress_step_percent")]
    pub progress_step_percent: u32,

    /// Report each failed row to the run observers.
    #[serde(default = "default_log_errors")]
    pub log_errors: bool,
}

fn default_batch_size() -> usize {
    1000
}

fn default_concurrency() -> usize {
    3
}

fn default_progress_step_percent() -> u32 {
    2
}

fn default_log_errors() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            progress_step_percent: default_progress_step_percent(),
            log_errors: default_log_errors(),
        }
    }
}

impl BatchConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress_step_percent(mut self, step: u32) -> Self {
        self.progress_step_percent = step;
        self
    }

    pub fn with_log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = log_errors;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits().map(|_| ())
    }

    /// Validated, non-zero view of the numeric settings.
    pub(crate) fn limits(&self) -> Result<RunLimits, ConfigError> {
        let batch_size = NonZeroUsize::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)?;
        let concurrency =
            NonZeroUsize::new(self.concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        let progress_step = NonZeroU32::new(self.progress_step_percent)
            .ok_or(ConfigError::ZeroProgressStep)?;
        Ok(RunLimits {
            batch_size,
            concurrency,
            progress_step,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RunLimits {
    pub batch_size: NonZeroUsize,
    pub concurrency: NonZeroUsize,
    pub progress_step: NonZeroU32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BatchConfig::default();
        assert_eq!(cfg.batch_size, 1000);
        assert_eq!(cfg.concurrency, 3);
        assert_eq!(cfg.progress_step_percent, 2);
        assert!(cfg.log_errors);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let base = BatchConfig::default();
        assert_eq!(
            base.with_batch_size(0).validate(),
            Err(ConfigError::ZeroBatchSize)
        );
        assert_eq!(
            base.with_concurrency(0).validate(),
            Err(ConfigError::ZeroConcurrency)
        );
        assert_eq!(
            base.with_progress_step_percent(0).validate(),
            Err(ConfigError::ZeroProgressStep)
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: BatchConfig = toml::from_str("concurrency = 8").unwrap();
        assert_eq!(cfg.concurrency, 8);
        assert_eq!(cfg.batch_size, 1000);
        assert_eq!(cfg.progress_step_percent, 2);
    }

    #[test]
    fn test_negative_values_fail_to_parse() {
        assert!(toml::from_str::<BatchConfig>("progress_step_percent = -5").is_err());
        assert!(toml::from_str::<BatchConfig>("concurrency = -1").is_err());
    }
}
