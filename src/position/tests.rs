use super::*;

fn peptide(
    sequence: &str,
    start: u32,
    end: u32,
    exposure: f64,
    state: &str,
    count: u64,
    mean: f64,
    variance: f64,
) -> FractionalUptake {
    FractionalUptake {
        protein: "P1".to_string(),
        sequence: sequence.to_string(),
        start,
        end,
        exposure: Exposure::new(exposure, 2),
        state: state.to_string(),
        count,
        abs_uptake_mean: mean * 4.0,
        abs_uptake_variance: variance * 16.0,
        rel_uptake_mean: mean,
        rel_uptake_variance: variance,
    }
}

/// Three peptides spanning positions 1-5 in two well separated states.
fn two_state_peptides() -> Vec<FractionalUptake> {
    let mut peptides = Vec::new();
    for sequence in ["AAAAA", "CCCCC", "DDDDD"] {
        peptides.push(peptide(sequence, 0, 5, 30.0, "A", 3, 0.10, 0.0004));
        peptides.push(peptide(sequence, 0, 5, 30.0, "B", 3, 0.30, 0.0004));
    }
    peptides
}

// ==================== Coverage Tests ====================

#[test]
fn test_uncovered_position_has_no_rows() {
    let peptides = vec![peptide("PEP", 10, 15, 30.0, "A", 3, 0.2, 0.001)];
    let engine = PositionEngine::new();

    let outcome = engine.compute_position("P1", 5, &peptides);
    assert!(outcome.rows.is_empty());
    assert_eq!(outcome.position, 5);
}

#[test]
fn test_n_terminal_residue_excluded() {
    let peptides = vec![peptide("PEP", 10, 15, 30.0, "A", 3, 0.2, 0.001)];
    let engine = PositionEngine::new();

    assert!(engine.compute_position("P1", 10, &peptides).rows.is_empty());
    for position in 11..=15 {
        let outcome = engine.compute_position("P1", position, &peptides);
        assert_eq!(outcome.rows.len(), 1, "position {position}");
    }
    assert!(engine.compute_position("P1", 16, &peptides).rows.is_empty());
}

#[test]
fn test_max_position() {
    let peptides = vec![
        peptide("PEP", 10, 15, 30.0, "A", 3, 0.2, 0.001),
        peptide("PEPTIDE", 12, 40, 30.0, "A", 3, 0.2, 0.001),
    ];
    assert_eq!(PositionEngine::max_position(&peptides), 40);
    assert_eq!(PositionEngine::max_position(&[]), 0);
}

// ==================== Reference Exposure Tests ====================

#[test]
fn test_reference_exposure_excluded_by_default() {
    let peptides = vec![
        peptide("PEP", 0, 5, 0.0, "A", 3, 0.0, 0.0002),
        peptide("PEP", 0, 5, 30.0, "A", 3, 0.2, 0.001),
    ];

    let outcome = PositionEngine::new().compute_position("P1", 3, &peptides);
    assert_eq!(outcome.rows.len(), 1);
    assert!(!outcome.rows[0].exposure.is_reference());

    let outcome = PositionEngine::new()
        .with_reference_exposure(true)
        .compute_position("P1", 3, &peptides);
    assert_eq!(outcome.rows.len(), 2);
    assert!(outcome.rows[0].exposure.is_reference());
}

// ==================== ANOVA / Tukey Tests ====================

#[test]
fn test_single_state_is_never_significant() {
    let peptides = vec![
        peptide("PEP", 0, 5, 30.0, "A", 3, 0.2, 0.001),
        peptide("PEPT", 0, 6, 30.0, "A", 4, 0.6, 0.002),
    ];
    let outcome = PositionEngine::new().compute_position("P1", 3, &peptides);

    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert_eq!(row.anova_p, 1.0);
    assert_eq!(row.combined_count, 7);
    assert!(row.tukey.values().all(|&p| p == 1.0));
}

#[test]
fn test_non_significant_anova_leaves_tukey_at_one() {
    // large within-state spread hides the mean difference
    let peptides = vec![
        peptide("PEP", 0, 5, 30.0, "A", 3, 0.20, 0.5),
        peptide("PEP", 0, 5, 30.0, "B", 3, 0.25, 0.5),
    ];
    let outcome = PositionEngine::new().compute_position("P1", 2, &peptides);

    assert_eq!(outcome.rows.len(), 2);
    for row in &outcome.rows {
        assert!(row.anova_p >= 0.05);
        assert!(row.tukey.values().all(|&p| p == 1.0));
    }
}

#[test]
fn test_zero_within_variance_is_not_significant() {
    let peptides = vec![
        peptide("PEP", 0, 5, 30.0, "A", 5, 1.0, 0.0),
        peptide("PEP", 0, 5, 30.0, "B", 5, 2.0, 0.0),
    ];
    let outcome = PositionEngine::new().compute_position("P1", 2, &peptides);
    // pooling a single peptide with zero variance keeps zero variance
    for row in &outcome.rows {
        assert_eq!(row.combined_variance, 0.0);
        assert_eq!(row.anova_p, 1.0);
    }
}

#[test]
fn test_two_state_end_to_end_scenario() {
    let peptides = two_state_peptides();
    let engine = PositionEngine::new();

    for position in 1..=5 {
        let outcome = engine.compute_position("P1", position, &peptides);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.undefined_tukey_cells, 0);

        let a = outcome.rows.iter().find(|r| r.state == "A").unwrap();
        let b = outcome.rows.iter().find(|r| r.state == "B").unwrap();

        assert!((a.combined_mean - 0.10).abs() < 1e-9);
        assert!((b.combined_mean - 0.30).abs() < 1e-9);
        assert_eq!(a.combined_count, 9);
        assert!((a.combined_variance - 0.0024 / 7.0).abs() < 1e-12);

        assert!(a.anova_p < 0.05);
        assert_eq!(a.anova_p, b.anova_p);

        assert!(a.tukey_p("B").unwrap() < 0.05);
        assert!(b.tukey_p("A").unwrap() < 0.05);
        assert_eq!(a.tukey_p("A"), Some(1.0));
        assert_eq!(b.tukey_p("B"), Some(1.0));
    }

    assert!(engine.compute_position("P1", 6, &peptides).rows.is_empty());
}

#[test]
fn test_exposures_are_tested_separately() {
    let mut peptides = two_state_peptides();
    peptides.push(peptide("EEEEE", 0, 5, 120.0, "A", 3, 0.5, 0.001));

    let outcome = PositionEngine::new().compute_position("P1", 3, &peptides);
    assert_eq!(outcome.rows.len(), 3);

    let late = outcome
        .rows
        .iter()
        .find(|r| r.exposure == Exposure::new(120.0, 2))
        .unwrap();
    assert_eq!(late.anova_p, 1.0);
    assert_eq!(late.tukey.len(), 1);
}

#[test]
fn test_peptide_order_does_not_change_rows() {
    let peptides = vec![
        peptide("PEP", 0, 5, 30.0, "A", 3, 0.11, 0.0004),
        peptide("PEPT", 0, 6, 30.0, "A", 4, 0.13, 0.0006),
        peptide("PEPTI", 1, 7, 30.0, "A", 2, 0.09, 0.0002),
        peptide("PEP", 0, 5, 30.0, "B", 3, 0.31, 0.0004),
        peptide("PEPT", 0, 6, 30.0, "B", 4, 0.28, 0.0006),
    ];
    let mut reversed = peptides.clone();
    reversed.reverse();

    let engine = PositionEngine::new();
    assert_eq!(
        engine.compute_position("P1", 3, &peptides).rows,
        engine.compute_position("P1", 3, &reversed).rows
    );
}
