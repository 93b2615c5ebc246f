//! Cluster-export ingestion contract types and validation.
//!
//! A cluster export holds one row per replicate peptide measurement. Only the
//! columns below are read; any other columns in the file are ignored.
//!
//! | Column | Type | Description |
//! |--------|------|-------------|
//! | Protein | string | Protein identifier |
//! | Sequence | string | Peptide sequence |
//! | Start | integer | First residue of the peptide |
//! | End | integer | Last residue of the peptide (`Start < End`) |
//! | Exposure | real | Exchange time in seconds (0 = reference) |
//! | State | string | Experimental condition |
//! | z | integer | Charge state (>= 1) |
//! | Center | real | Observed centroid m/z (> 0) |
//! | Inten | real | Intensity, used as replicate weight (>= 0) |
//! | MaxUptake | real | Maximum exchangeable hydrogens |
//! | MHP | real | Monoisotopic mass of the protonated peptide (> 0) |

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Errors returned when reading or validating measurements.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// I/O error opening the input
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing or field conversion error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Contract violation on a specific data row (1-based).
    #[error("ingest contract violation on row {row}: {message}")]
    ContractViolation {
        /// 1-based data row (header excluded)
        row: usize,
        /// Human-readable description
        message: String,
    },
}

impl IngestError {
    fn violation(row: usize, message: impl Into<String>) -> Self {
        Self::ContractViolation {
            row,
            message: message.into(),
        }
    }
}

/// One observed replicate peptide signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Protein identifier.
    #[serde(rename = "Protein")]
    pub protein: String,
    /// Peptide sequence.
    #[serde(rename = "Sequence")]
    pub sequence: String,
    /// First residue of the peptide.
    #[serde(rename = "Start")]
    pub start: u32,
    /// Last residue of the peptide.
    #[serde(rename = "End")]
    pub end: u32,
    /// Exchange time in seconds; 0 is the undeuterated reference.
    #[serde(rename = "Exposure")]
    pub exposure: f64,
    /// Experimental condition label.
    #[serde(rename = "State")]
    pub state: String,
    /// Charge state.
    #[serde(rename = "z")]
    pub charge: u32,
    /// Observed centroid m/z.
    #[serde(rename = "Center")]
    pub center: f64,
    /// Signal intensity, used as the replicate weight.
    #[serde(rename = "Inten")]
    pub intensity: f64,
    /// Theoretical maximum number of exchangeable hydrogens.
    #[serde(rename = "MaxUptake")]
    pub max_uptake: f64,
    /// Monoisotopic mass of the protonated peptide.
    #[serde(rename = "MHP")]
    pub mhp: f64,
}

impl Measurement {
    /// Validate the contract invariants for a single measurement.
    ///
    /// `row` is only used to label the error.
    pub fn validate_contract(&self, row: usize) -> Result<(), IngestError> {
        if self.start >= self.end {
            return Err(IngestError::violation(
                row,
                format!("Start must be < End, got {}..{}", self.start, self.end),
            ));
        }

        if self.charge < 1 {
            return Err(IngestError::violation(row, "z must be >= 1, got 0"));
        }

        if !self.exposure.is_finite() || self.exposure < 0.0 {
            return Err(IngestError::violation(
                row,
                format!("Exposure must be finite and >= 0, got {}", self.exposure),
            ));
        }

        if !self.center.is_finite() || self.center <= 0.0 {
            return Err(IngestError::violation(
                row,
                format!("Center must be finite and > 0, got {}", self.center),
            ));
        }

        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(IngestError::violation(
                row,
                format!("Inten must be finite and >= 0, got {}", self.intensity),
            ));
        }

        // zero is tolerated; fractional uptake turns it into NaN downstream
        if !self.max_uptake.is_finite() || self.max_uptake < 0.0 {
            return Err(IngestError::violation(
                row,
                format!("MaxUptake must be finite and >= 0, got {}", self.max_uptake),
            ));
        }

        if !self.mhp.is_finite() || self.mhp <= 0.0 {
            return Err(IngestError::violation(
                row,
                format!("MHP must be finite and > 0, got {}", self.mhp),
            ));
        }

        Ok(())
    }
}

/// Validate every measurement, reporting the first violation.
pub fn validate_all(measurements: &[Measurement]) -> Result<(), IngestError> {
    for (index, measurement) in measurements.iter().enumerate() {
        measurement.validate_contract(index + 1)?;
    }
    Ok(())
}

/// Read and validate measurements from a cluster CSV file.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Measurement>, IngestError> {
    let file = File::open(path)?;
    from_reader(BufReader::new(file))
}

/// Read and validate measurements from any CSV reader.
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Measurement>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut measurements = Vec::new();
    for (index, record) in csv_reader.deserialize::<Measurement>().enumerate() {
        let measurement = record?;
        measurement.validate_contract(index + 1)?;
        measurements.push(measurement);
    }

    Ok(measurements)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Protein,Start,End,Sequence,Modification,MaxUptake,MHP,State,Exposure,File,z,RT,Inten,Center";

    fn sample_measurement() -> Measurement {
        Measurement {
            protein: "P1".to_string(),
            sequence: "PEPTIDE".to_string(),
            start: 10,
            end: 15,
            exposure: 0.0,
            state: "apo".to_string(),
            charge: 2,
            center: 400.0,
            intensity: 1000.0,
            max_uptake: 5.0,
            mhp: 798.0,
        }
    }

    #[test]
    fn test_reads_known_columns_and_ignores_others() {
        let csv = format!(
            "{HEADER}\nP1,10,15,PEPTIDE,,5,798.4,apo,0.5,run1.raw,2,5.2,12000,400.21\n"
        );
        let rows = from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.protein, "P1");
        assert_eq!(row.sequence, "PEPTIDE");
        assert_eq!((row.start, row.end), (10, 15));
        assert_eq!(row.state, "apo");
        assert_eq!(row.charge, 2);
        assert!((row.exposure - 0.5).abs() < 1e-12);
        assert!((row.center - 400.21).abs() < 1e-12);
        assert!((row.intensity - 12000.0).abs() < 1e-12);
        assert!((row.max_uptake - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let csv = "Protein,Start,End\nP1,1,5\n";
        let result = from_reader(csv.as_bytes());
        assert!(matches!(result, Err(IngestError::CsvError(_))));
    }

    #[test]
    fn test_start_not_before_end_is_rejected_with_row() {
        let csv = format!(
            "{HEADER}\nP1,10,15,PEPTIDE,,5,798.4,apo,0,run1.raw,2,5.2,12000,400.21\nP1,15,15,PEPTIDE,,5,798.4,apo,0,run1.raw,2,5.2,12000,400.21\n"
        );
        match from_reader(csv.as_bytes()) {
            Err(IngestError::ContractViolation { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn test_contract_checks() {
        assert!(sample_measurement().validate_contract(1).is_ok());

        let mut m = sample_measurement();
        m.charge = 0;
        assert!(m.validate_contract(1).is_err());

        let mut m = sample_measurement();
        m.intensity = -1.0;
        assert!(m.validate_contract(1).is_err());

        let mut m = sample_measurement();
        m.exposure = f64::NAN;
        assert!(m.validate_contract(1).is_err());

        let mut m = sample_measurement();
        m.max_uptake = 0.0;
        assert!(m.validate_contract(1).is_ok());
    }

    #[test]
    fn test_center_and_mhp_must_be_positive() {
        for center in [0.0, -400.0, f64::INFINITY] {
            let mut m = sample_measurement();
            m.center = center;
            match m.validate_contract(7) {
                Err(IngestError::ContractViolation { row, message }) => {
                    assert_eq!(row, 7);
                    assert!(message.starts_with("Center"), "{message}");
                }
                other => panic!("expected contract violation, got {other:?}"),
            }
        }

        for mhp in [0.0, -798.0, f64::NAN] {
            let mut m = sample_measurement();
            m.mhp = mhp;
            match m.validate_contract(4) {
                Err(IngestError::ContractViolation { row, message }) => {
                    assert_eq!(row, 4);
                    assert!(message.starts_with("MHP"), "{message}");
                }
                other => panic!("expected contract violation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_zero_mhp_in_file_reports_row() {
        let csv = format!(
            "{HEADER}\nP1,10,15,PEPTIDE,,5,798.4,apo,0,run1.raw,2,5.2,12000,400.21\nP1,10,15,PEPTIDE,,5,0,apo,30,run1.raw,2,5.2,12000,400.71\n"
        );
        match from_reader(csv.as_bytes()) {
            Err(IngestError::ContractViolation { row, message }) => {
                assert_eq!(row, 2);
                assert!(message.contains("MHP"), "{message}");
            }
            other => panic!("expected contract violation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_all_reports_first_bad_row() {
        let mut bad = sample_measurement();
        bad.end = 5;
        let rows = vec![sample_measurement(), sample_measurement(), bad];
        match validate_all(&rows) {
            Err(IngestError::ContractViolation { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected contract violation, got {other:?}"),
        }
    }
}
