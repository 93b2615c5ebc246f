use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use hdxstat::exposure::{Exposure, DEFAULT_EXPOSURE_DECIMALS};
use hdxstat::ingest;

/// Display the states, exposures and proteins of a cluster CSV file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let rows = ingest::read_csv(&file)
        .with_context(|| format!("Failed to read cluster file: {}", file.display()))?;

    let mut states: Vec<&str> = Vec::new();
    let mut exposures: Vec<Exposure> = Vec::new();
    let mut proteins: Vec<&str> = Vec::new();
    let mut seen_states = HashSet::new();
    let mut seen_exposures = HashSet::new();
    let mut seen_proteins = HashSet::new();
    let mut peptides = BTreeSet::new();

    for row in &rows {
        if seen_states.insert(row.state.as_str()) {
            states.push(row.state.as_str());
        }
        let exposure = Exposure::new(row.exposure, DEFAULT_EXPOSURE_DECIMALS);
        if seen_exposures.insert(exposure) {
            exposures.push(exposure);
        }
        if seen_proteins.insert(row.protein.as_str()) {
            proteins.push(row.protein.as_str());
        }
        peptides.insert((row.protein.as_str(), row.sequence.as_str(), row.start, row.end));
    }

    println!("hdxstat Cluster Information");
    println!("===========================");
    println!("File: {}", file.display());
    println!();

    println!("Contents:");
    println!("  Measurements: {}", rows.len());
    println!("  Peptides: {}", peptides.len());
    println!();

    println!("States ({}):", states.len());
    for state in &states {
        println!("  {state}");
    }
    println!();

    println!("Exposures ({}):", exposures.len());
    for exposure in &exposures {
        if exposure.is_reference() {
            println!("  {exposure} (reference)");
        } else {
            println!("  {exposure}");
        }
    }
    println!();

    println!("Proteins ({}):", proteins.len());
    for protein in &proteins {
        let max_end = rows
            .iter()
            .filter(|r| r.protein == *protein)
            .map(|r| r.end)
            .max()
            .unwrap_or(0);
        println!("  {protein} (positions 1-{max_end})");
    }

    Ok(())
}
