use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use hdxstat::dataset::{ViewRow, ViewSelector};
use hdxstat::ingest;
use hdxstat::pipeline::Pipeline;
use hdxstat::runner::LogSink;

use super::config::resolve;
use super::AnalysisArgs;

/// JSON document printed by the query command
#[derive(Debug, Serialize)]
struct QueryOutput<'a> {
    generated_at: String,
    protein: &'a str,
    exposure: f64,
    view: String,
    min_max: (f64, f64),
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_min_max: Option<(f64, f64)>,
    data: &'a [ViewRow],
}

/// Run the pipeline and print one cached view as JSON
pub fn run(
    input: PathBuf,
    protein: String,
    exposure: f64,
    state: Option<String>,
    args: AnalysisArgs,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let config = resolve(&args)?;
    let rows = ingest::read_csv(&input)
        .with_context(|| format!("Failed to read cluster file: {}", input.display()))?;

    let result = Pipeline::new(config)
        .run(&rows, &mut LogSink)
        .context("Analysis failed")?;

    let view = result
        .get_dataset(&protein, exposure, state.as_deref())
        .context("Requested view is not available")?;

    let selector = ViewSelector::from_state(state.as_deref());
    let ref_min_max = match selector {
        ViewSelector::NoRef => None,
        ViewSelector::Reference(_) => result.ref_min_max(&protein),
    };

    let output = QueryOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        protein: &protein,
        exposure,
        view: selector.to_string(),
        min_max: view.min_max,
        ref_min_max,
        data: &view.data,
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize view")?;
    println!("{json}");

    Ok(())
}
