//! CSV export of the position table.

use std::collections::BTreeSet;
use std::io::Write;

use crate::position::PositionStat;

use super::PipelineError;

const FIXED_COLUMNS: [&str; 8] = [
    "Protein",
    "Position",
    "Exposure",
    "State",
    "Combined Mean",
    "Combined Variance",
    "Combined Count",
    "ANOVA p",
];

/// Write `rows` as CSV: the fixed columns followed by one `Tukey <state>`
/// column per state in the table. Cells for states not measured alongside a
/// row are left empty.
pub(crate) fn write_positions<W: Write>(
    rows: &[PositionStat],
    writer: W,
) -> Result<(), PipelineError> {
    let states: BTreeSet<&str> = rows.iter().map(|r| r.state.as_str()).collect();

    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(states.iter().map(|s| format!("Tukey {s}")));
    csv.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for row in rows {
        record.clear();
        record.push(row.protein.clone());
        record.push(row.position.to_string());
        record.push(row.exposure.to_string());
        record.push(row.state.clone());
        record.push(row.combined_mean.to_string());
        record.push(row.combined_variance.to_string());
        record.push(row.combined_count.to_string());
        record.push(row.anova_p.to_string());
        for state in &states {
            record.push(row.tukey_p(state).map(|p| p.to_string()).unwrap_or_default());
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}
