use serde::{Deserialize, Serialize};

use crate::exposure::DEFAULT_EXPOSURE_DECIMALS;
use crate::position::{PositionEngine, DEFAULT_SIGNIFICANCE_LEVEL};
use crate::runner::{RunnerConfig, MIN_PROGRESS_INTERVAL};

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// ANOVA significance level gating the Tukey test (default: 0.05)
    pub significance_level: f64,

    /// Decimal places exposures are rounded to before grouping (default: 2)
    pub exposure_decimals: u32,

    /// Include exposure 0 rows in position statistics (default: false)
    pub include_reference_exposure: bool,

    /// Worker threads for position statistics (default: available parallelism)
    pub num_workers: usize,

    /// Completed positions between progress events, at least 10 (default: 10)
    pub progress_interval: usize,

    /// Positions dispatched between cancellation checks (default: 256)
    pub batch_size: usize,

    /// Undelivered progress events buffered before new ones are dropped (default: 256)
    pub progress_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let runner = RunnerConfig::default();
        Self {
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            exposure_decimals: DEFAULT_EXPOSURE_DECIMALS,
            include_reference_exposure: false,
            num_workers: runner.num_workers,
            progress_interval: runner.progress_interval,
            batch_size: runner.batch_size,
            progress_capacity: 256,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with a fixed worker count
    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Position engine configured from this pipeline configuration.
    pub fn engine(&self) -> PositionEngine {
        PositionEngine::new()
            .with_significance_level(self.significance_level)
            .with_reference_exposure(self.include_reference_exposure)
    }

    /// Runner configuration with the progress interval clamped.
    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig {
            num_workers: self.num_workers.max(1),
            progress_interval: self.progress_interval.max(MIN_PROGRESS_INTERVAL),
            batch_size: self.batch_size.max(1),
        }
    }
}
