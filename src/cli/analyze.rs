use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use hdxstat::ingest;
use hdxstat::pipeline::Pipeline;
use hdxstat::runner::LogSink;

use super::config::resolve;
use super::AnalysisArgs;

/// Compute the position table of a cluster CSV file and write it as CSV
pub fn run(input: PathBuf, output: Option<PathBuf>, args: AnalysisArgs) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let config = resolve(&args)?;
    let output = output.unwrap_or_else(|| default_output(&input));

    info!("hdxstat analysis");
    info!("================");
    info!("Input: {}", input.display());
    info!("Output: {}", output.display());
    info!(
        "Significance level: {}, reference exposure {}",
        config.significance_level,
        if config.include_reference_exposure {
            "included"
        } else {
            "excluded"
        }
    );

    let rows = ingest::read_csv(&input)
        .with_context(|| format!("Failed to read cluster file: {}", input.display()))?;
    info!("Read {} measurements", rows.len());

    let result = Pipeline::new(config)
        .run(&rows, &mut LogSink)
        .context("Analysis failed")?;

    result
        .write_csv(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", result.diagnostics().format_colored());
    println!("Wrote {} rows to {}", result.positions().len(), output.display());

    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cluster".to_string());
    input.with_file_name(format!("{stem}_positions.csv"))
}
