use derive_new::new;

use crate::{
    align::JointTable,
    config::AlignmentPolicy,
    error::{MatchError, Result},
    mapping::Call,
    math::ratio,
};

/// Row classification of a joint table
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlapCounts {
    pub rows: usize,
    pub overlap: usize,
    pub concordant: usize,
    pub discordant: usize,
}

/// Observed overlap and concordance of a joint table
#[derive(new, Debug, Clone, Copy, PartialEq)]
pub struct ConcordanceScore {
    /// Fraction of rows called nonzero in both columns
    pub overlap_fraction: f64,
    /// Net agreement among overlapping rows, in `[-1, 1]`
    pub concordance: f64,
    pub counts: OverlapCounts,
}

/// How a pair of cells contributes to the overlap counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowClass {
    Outside,
    Concordant,
    Discordant,
}

fn classify_row(control: Option<Call>, test: Option<Call>, missing_overlaps: bool) -> RowClass {
    match (control, test) {
        (Some(c), Some(t)) if c.is_changed() && t.is_changed() => {
            if c == t {
                RowClass::Concordant
            } else {
                RowClass::Discordant
            }
        }
        (Some(_), Some(_)) => RowClass::Outside,
        // a missing cell is never equal to anything, so it can only be discordant
        (None, other) | (other, None) if missing_overlaps => match other {
            Some(call) if !call.is_changed() => RowClass::Outside,
            _ => RowClass::Discordant,
        },
        _ => RowClass::Outside,
    }
}

/// Counts overlapping, concordant and discordant rows of two aligned columns
///
/// Every category starts at zero, so an absent category counts as 0.
pub fn count_columns(
    control: &[Option<Call>],
    test: &[Option<Call>],
    policy: AlignmentPolicy,
) -> OverlapCounts {
    let missing_overlaps = policy.missing_overlaps();
    let mut counts = OverlapCounts {
        rows: control.len(),
        ..Default::default()
    };
    for (c, t) in control.iter().zip(test.iter()) {
        match classify_row(*c, *t, missing_overlaps) {
            RowClass::Outside => {}
            RowClass::Concordant => {
                counts.overlap += 1;
                counts.concordant += 1;
            }
            RowClass::Discordant => {
                counts.overlap += 1;
                counts.discordant += 1;
            }
        }
    }
    counts
}

/// Scores two aligned columns
///
/// Fails with [`MatchError::NoOverlap`] when no row is called nonzero in both columns.
pub fn score_columns(
    control: &[Option<Call>],
    test: &[Option<Call>],
    policy: AlignmentPolicy,
) -> Result<ConcordanceScore> {
    let counts = count_columns(control, test, policy);
    score_counts(counts)
}

pub fn score_counts(counts: OverlapCounts) -> Result<ConcordanceScore> {
    let no_overlap = || MatchError::NoOverlap { rows: counts.rows };
    if counts.overlap == 0 {
        return Err(no_overlap());
    }
    let overlap_fraction = ratio(counts.overlap, counts.rows).ok_or_else(no_overlap)?;
    let concordance =
        (counts.concordant as f64 - counts.discordant as f64) / counts.overlap as f64;
    Ok(ConcordanceScore::new(overlap_fraction, concordance, counts))
}

/// Computes the overlap fraction and net concordance of a joint table
pub fn score(table: &JointTable) -> Result<ConcordanceScore> {
    score_columns(&table.control, &table.test, table.policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{align::align, mapping::CallVector};
    use approx::assert_relative_eq;

    fn to_call(v: i8) -> Call {
        match v {
            1 => Call::Up,
            -1 => Call::Down,
            _ => Call::Unchanged,
        }
    }

    fn table(control: &[i8], test: &[i8]) -> JointTable {
        JointTable {
            genes: (0..control.len()).map(|i| format!("g{i}")).collect(),
            control: control.iter().map(|v| Some(to_call(*v))).collect(),
            test: test.iter().map(|v| Some(to_call(*v))).collect(),
            policy: AlignmentPolicy::Outer,
        }
    }

    #[test]
    fn test_mixed_scenario() {
        let table = table(&[1, 1, -1, 0, -1], &[1, -1, -1, 0, 1]);
        let score = score(&table).unwrap();
        assert_relative_eq!(score.overlap_fraction, 0.8);
        assert_relative_eq!(score.concordance, 0.0);
        assert_eq!(score.counts, OverlapCounts::new(5, 4, 2, 2));
    }

    #[test]
    fn test_identical_calls() {
        let calls = [1, 0, -1, -1, 0, 1, 1, 0];
        let score = score(&table(&calls, &calls)).unwrap();
        assert_relative_eq!(score.concordance, 1.0);
        assert_relative_eq!(score.overlap_fraction, 5.0 / 8.0);
    }

    #[test]
    fn test_opposite_calls() {
        let score = score(&table(&[1, 1, 1], &[-1, -1, -1])).unwrap();
        assert_relative_eq!(score.concordance, -1.0);
        assert_relative_eq!(score.overlap_fraction, 1.0);
    }

    #[test]
    fn test_zero_overlap_is_an_error() {
        assert_eq!(
            score(&table(&[1, 0, 0], &[0, -1, 0])).unwrap_err(),
            MatchError::NoOverlap { rows: 3 }
        );
        assert_eq!(
            score(&table(&[], &[])).unwrap_err(),
            MatchError::NoOverlap { rows: 0 }
        );
    }

    #[test]
    fn test_idempotent_and_symmetric() {
        let table = table(&[1, -1, 0, 1, -1, 1, 0], &[1, 1, -1, 1, -1, -1, 0]);
        let first = score(&table).unwrap();
        let second = score(&table).unwrap();
        assert_eq!(first, second);

        let swapped = score(&table.swapped()).unwrap();
        assert_relative_eq!(swapped.overlap_fraction, first.overlap_fraction);
        assert_relative_eq!(swapped.concordance, first.concordance);
    }

    #[test]
    fn test_bounds() {
        let patterns: [(&[i8], &[i8]); 4] = [
            (&[1, 1, 0, -1], &[1, -1, 1, -1]),
            (&[0, 1, 0], &[1, 1, 1]),
            (&[-1, -1, 1, 1, 0], &[1, -1, -1, 1, 0]),
            (&[1], &[-1]),
        ];
        for (c, t) in patterns {
            let score = score(&table(c, t)).unwrap();
            assert!((0.0..=1.0).contains(&score.overlap_fraction));
            assert!((-1.0..=1.0).contains(&score.concordance));
        }
    }

    fn call_vector(name: &str, entries: &[(&str, Call)]) -> CallVector {
        CallVector {
            name: name.to_string(),
            genes: entries.iter().map(|(g, _)| g.to_string()).collect(),
            calls: entries.iter().map(|(_, c)| *c).collect(),
        }
    }

    fn one_sided_fixture() -> (CallVector, CallVector) {
        let control = call_vector(
            "ctrl",
            &[("A", Call::Up), ("B", Call::Down), ("C", Call::Up), ("E", Call::Unchanged)],
        );
        let test = call_vector("test", &[("A", Call::Up), ("B", Call::Down), ("D", Call::Down)]);
        (control, test)
    }

    #[test]
    fn test_missing_cells_never_overlap() {
        let (control, test) = one_sided_fixture();
        let score = score(&align(&control, &test, AlignmentPolicy::Outer)).unwrap();
        assert_eq!(score.counts, OverlapCounts::new(5, 2, 2, 0));
        assert_relative_eq!(score.overlap_fraction, 0.4);
        assert_relative_eq!(score.concordance, 1.0);
    }

    #[test]
    fn test_inner_alignment_drops_one_sided_genes() {
        let (control, test) = one_sided_fixture();
        let score = score(&align(&control, &test, AlignmentPolicy::Inner)).unwrap();
        assert_eq!(score.counts, OverlapCounts::new(2, 2, 2, 0));
        assert_relative_eq!(score.overlap_fraction, 1.0);
    }

    #[test]
    fn test_legacy_union_inflates_counts() {
        let (control, test) = one_sided_fixture();
        let score = score(&align(&control, &test, AlignmentPolicy::LegacyUnion)).unwrap();
        // C (Up, missing) and D (missing, Down) overlap discordantly, E (Unchanged, missing) does not
        assert_eq!(score.counts, OverlapCounts::new(5, 4, 2, 2));
        assert_relative_eq!(score.concordance, 0.0);
    }
}
