use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use hdxstat::ingest::Measurement;
use hdxstat::uptake::PROTON_MASS;

const PROTEIN: &str = "DEMO";
const STATES: [&str; 2] = ["apo", "holo"];
const EXPOSURES: [f64; 4] = [0.0, 10.0, 60.0, 300.0];

/// Residues protected by ligand binding in the holo state
const PROTECTED: (u32, u32) = (20, 35);

/// Peptides as (sequence, start, end, charge, MHP)
const PEPTIDES: [(&str, u32, u32, u32, f64); 8] = [
    ("MKTAYIAKQR", 0, 10, 2, 1195.65),
    ("AYIAKQRQISF", 3, 14, 2, 1310.73),
    ("QISFVKSHFSR", 10, 21, 3, 1335.71),
    ("VKSHFSRQLEER", 14, 26, 3, 1502.79),
    ("QLEERLGLIEVQ", 21, 33, 2, 1412.78),
    ("LGLIEVQAPILSR", 26, 39, 2, 1394.83),
    ("APILSRVGDGTQD", 33, 46, 2, 1314.67),
    ("VGDGTQDNLSGAEK", 39, 53, 2, 1390.65),
];

/// Generate a synthetic two-state cluster CSV file
pub fn run(output: PathBuf, replicates: usize) -> Result<()> {
    info!("hdxstat demo cluster generator");
    info!("==============================");

    let rows = generate_demo_cluster(replicates.max(1));
    info!(
        "Generating {} measurements ({} peptides, {} states, {} exposures, {} replicates)",
        rows.len(),
        PEPTIDES.len(),
        STATES.len(),
        EXPOSURES.len(),
        replicates.max(1)
    );

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    for row in &rows {
        writer.serialize(row).context("Failed to write measurement")?;
    }
    writer.flush().context("Failed to flush demo file")?;

    println!("Wrote {} measurements to {}", rows.len(), output.display());
    println!("Try: hdxstat analyze {}", output.display());

    Ok(())
}

/// Mock replicate measurements with deterministic noise.
///
/// Uptake follows `1 - exp(-k t)` per peptide; the holo state exchanges
/// slower on peptides overlapping the protected region.
fn generate_demo_cluster(replicates: usize) -> Vec<Measurement> {
    let mut rows = Vec::new();
    let mut seed = 0usize;

    for &(sequence, start, end, charge, mhp) in &PEPTIDES {
        // prolines do not exchange; the first two residues back-exchange
        let max_uptake = (end - start) as f64
            - 2.0
            - sequence.chars().skip(2).filter(|c| *c == 'P').count() as f64;
        let overlaps_site = start < PROTECTED.1 && end > PROTECTED.0;

        for state in STATES {
            let rate = if state == "holo" && overlaps_site { 0.004 } else { 0.02 };

            for exposure in EXPOSURES {
                let uptake = max_uptake * (1.0 - (-rate * exposure).exp());

                for replicate in 0..replicates {
                    seed += 1;
                    let noise = (seed as f64 * 0.737).sin() * 0.03;
                    let mass = mhp + uptake + noise;
                    let z = charge as f64;

                    rows.push(Measurement {
                        protein: PROTEIN.to_string(),
                        sequence: sequence.to_string(),
                        start,
                        end,
                        exposure,
                        state: state.to_string(),
                        charge,
                        center: (mass + (z - 1.0) * PROTON_MASS) / z,
                        intensity: 1e5 * (1.0 + 0.2 * (replicate as f64 * 1.3).cos()),
                        max_uptake,
                        mhp,
                    });
                }
            }
        }
    }

    rows
}
