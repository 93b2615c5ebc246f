use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

/// Counters collected over one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDiagnostics {
    /// Input measurements
    pub measurements: usize,

    /// Replicate groups after aggregation
    pub replicate_groups: usize,

    /// Fractional uptake rows
    pub peptide_rows: usize,

    /// Proteins processed
    pub proteins: usize,

    /// Positions evaluated over all proteins
    pub positions_evaluated: usize,

    /// Positions covered by at least one peptide
    pub positions_covered: usize,

    /// Rows in the position table
    pub position_rows: usize,

    /// Tukey cells left at 1.0 because the distribution was undefined
    pub undefined_tukey_cells: usize,

    /// Progress events the sink accepted
    pub progress_delivered: usize,

    /// Progress events whose delivery failed
    pub progress_failures: usize,

    /// Progress events dropped undelivered when the run finished
    pub progress_discarded: usize,

    /// Wall-clock time of the run
    pub elapsed_seconds: f64,
}

impl RunDiagnostics {
    /// Fraction of evaluated positions with coverage
    pub fn coverage(&self) -> f64 {
        if self.positions_evaluated == 0 {
            0.0
        } else {
            self.positions_covered as f64 / self.positions_evaluated as f64
        }
    }

    /// Format the diagnostics with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            output.push_str(&format!("{}\n", style("hdxstat Run Summary").bold().cyan()));
            output.push_str(&format!("{}\n", style("===================").cyan()));
            output.push_str(&format!(
                "{}: {} measurements, {} replicate groups, {} peptide rows\n",
                style("Input").bold(),
                self.measurements,
                self.replicate_groups,
                self.peptide_rows
            ));
            output.push_str(&format!(
                "{}: {} proteins, {}/{} positions covered ({:.1}%)\n",
                style("Positions").bold(),
                self.proteins,
                self.positions_covered,
                self.positions_evaluated,
                self.coverage() * 100.0
            ));
            output.push_str(&format!(
                "{}: {} rows\n",
                style("Table").bold(),
                style(self.position_rows).green()
            ));

            if self.undefined_tukey_cells > 0 {
                output.push_str(&format!(
                    "{}: {} Tukey cells undefined\n",
                    style("WARNING").yellow().bold(),
                    self.undefined_tukey_cells
                ));
            }
            if self.progress_failures > 0 {
                output.push_str(&format!(
                    "{}: {} progress events rejected by the sink\n",
                    style("WARNING").yellow().bold(),
                    self.progress_failures
                ));
            }
            if self.progress_discarded > 0 {
                output.push_str(&format!(
                    "{}: {} progress events discarded\n",
                    style("Progress").bold(),
                    self.progress_discarded
                ));
            }

            output.push_str(&format!(
                "{}: {:.2}s\n",
                style("Elapsed").bold(),
                self.elapsed_seconds
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for RunDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hdxstat Run Summary")?;
        writeln!(f, "===================")?;
        writeln!(
            f,
            "Input: {} measurements, {} replicate groups, {} peptide rows",
            self.measurements, self.replicate_groups, self.peptide_rows
        )?;
        writeln!(
            f,
            "Positions: {} proteins, {}/{} positions covered ({:.1}%)",
            self.proteins,
            self.positions_covered,
            self.positions_evaluated,
            self.coverage() * 100.0
        )?;
        writeln!(f, "Table: {} rows", self.position_rows)?;
        if self.undefined_tukey_cells > 0 {
            writeln!(f, "WARNING: {} Tukey cells undefined", self.undefined_tukey_cells)?;
        }
        if self.progress_failures > 0 {
            writeln!(
                f,
                "WARNING: {} progress events rejected by the sink",
                self.progress_failures
            )?;
        }
        if self.progress_discarded > 0 {
            writeln!(f, "Progress: {} progress events discarded", self.progress_discarded)?;
        }
        writeln!(f, "Elapsed: {:.2}s", self.elapsed_seconds)
    }
}
