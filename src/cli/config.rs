//! TOML configuration file support for power users.
//!
//! Instead of passing many CLI flags, users can specify settings in a config file:
//!
//! ```toml
//! # hdxstat.toml
//! [analysis]
//! significance_level = 0.01
//! exposure_decimals = 2
//! include_reference_exposure = false
//! num_workers = 8
//! progress_interval = 50
//! batch_size = 512
//! ```
//!
//! Every field is optional. Explicit CLI flags win over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use hdxstat::pipeline::PipelineConfig;

use super::AnalysisArgs;

/// Root configuration structure for hdxstat.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Analysis-specific settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Configuration for the analyze and query commands.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    /// ANOVA significance level gating the Tukey test.
    pub significance_level: Option<f64>,

    /// Decimal places exposures are rounded to.
    pub exposure_decimals: Option<u32>,

    /// Include exposure 0 rows in position statistics.
    pub include_reference_exposure: Option<bool>,

    /// Worker threads for position statistics.
    pub num_workers: Option<usize>,

    /// Completed positions between progress events.
    pub progress_interval: Option<usize>,

    /// Positions dispatched between cancellation checks.
    pub batch_size: Option<usize>,

    /// Progress events buffered before new ones are dropped.
    pub progress_capacity: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl AnalysisConfig {
    /// Overlay the configured fields onto `config`.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(alpha) = self.significance_level {
            config.significance_level = alpha;
        }
        if let Some(decimals) = self.exposure_decimals {
            config.exposure_decimals = decimals;
        }
        if let Some(include) = self.include_reference_exposure {
            config.include_reference_exposure = include;
        }
        if let Some(workers) = self.num_workers {
            config.num_workers = workers;
        }
        if let Some(interval) = self.progress_interval {
            config.progress_interval = interval;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(capacity) = self.progress_capacity {
            config.progress_capacity = capacity;
        }
    }
}

/// Resolve the pipeline configuration: defaults, then the config file, then flags.
pub fn resolve(args: &AnalysisArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(path) = &args.config {
        Config::from_file(path)?.analysis.apply(&mut config);
    }

    if args.include_reference {
        config.include_reference_exposure = true;
    }
    if let Some(threads) = args.threads {
        config.num_workers = threads;
    }
    if let Some(alpha) = args.alpha {
        config.significance_level = alpha;
    }

    if !(config.significance_level > 0.0 && config.significance_level < 1.0) {
        anyhow::bail!(
            "Significance level must be in (0, 1), got {}",
            config.significance_level
        );
    }

    Ok(config)
}
