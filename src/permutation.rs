use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bon::Builder;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    align::JointTable,
    concordance::{count_columns, score, score_counts, ConcordanceScore},
    config::Column,
    error::{MatchError, Result},
    mapping::Call,
    math::{
        arithmetic_mean, empirical_two_tailed_pvalue, normal_two_tailed_pvalue, sample_std_dev,
        standardize,
    },
};

/// Number of permutation trials when none is given
pub const DEFAULT_PERMUTATIONS: usize = 100;

/// Permutation test of the observed concordance
///
/// Each trial shuffles one column of the joint table while the other is held fixed
/// and recomputes the concordance. The observed value is standardized against the
/// null distribution (observed value included) and converted to a two-tailed
/// normal p-value.
///
/// Trials run in parallel. Trial `i` draws from a `ChaCha8Rng` seeded with `seed` on
/// stream `i`, so a seeded test is reproducible regardless of the thread count.
///
/// The whole permuted column is shuffled, missing cells included: under an outer
/// alignment a gene absent from one profile can land on a row present in both, and
/// such a row never overlaps in that trial.
#[derive(Builder, Debug, Clone)]
pub struct PermutationTest {
    #[builder(default = DEFAULT_PERMUTATIONS)]
    n_permutations: usize,
    #[builder(default)]
    permuted: Column,
    seed: Option<u64>,
}

/// Outcome of a permutation test
#[derive(Debug, Clone)]
pub struct PermutationOutcome {
    pub observed: ConcordanceScore,
    /// Observed concordance at index 0 followed by every scored trial
    pub null_distribution: Vec<f64>,
    pub z_score: f64,
    /// Normal-approximated two-tailed p-value
    pub pvalue: f64,
    /// Fraction of trials at least as extreme as the observed value
    pub empirical_pvalue: f64,
    pub null_mean: f64,
    pub null_std_dev: f64,
    /// Trials without any overlapping gene; their concordance is undefined
    pub skipped_trials: usize,
    pub seed: u64,
}

impl PermutationOutcome {
    /// Number of trials that contributed to the null distribution
    pub fn scored_trials(&self) -> usize {
        self.null_distribution.len() - 1
    }
}

impl PermutationTest {
    pub fn n_permutations(&self) -> usize {
        self.n_permutations
    }

    pub fn permuted(&self) -> Column {
        self.permuted
    }

    pub fn run(&self, table: &JointTable) -> Result<PermutationOutcome> {
        self.run_with_cancel(table, &AtomicBool::new(false))
    }

    /// Runs the test, aborting between trials once `cancel` is set
    ///
    /// Trials already running on other workers finish, so the `completed` count
    /// carried by [`MatchError::Cancelled`] is a lower bound.
    pub fn run_with_cancel(
        &self,
        table: &JointTable,
        cancel: &AtomicBool,
    ) -> Result<PermutationOutcome> {
        if self.n_permutations == 0 {
            return Err(MatchError::InvalidPermutationCount(self.n_permutations));
        }

        let observed = score(table)?;
        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        debug!(
            n_permutations = self.n_permutations,
            permuted = self.permuted.name(),
            seed,
            observed = observed.concordance,
            "starting permutation test"
        );

        let trials = self.null_trials(table, seed, cancel)?;
        let skipped_trials = trials.iter().filter(|t| t.is_none()).count();
        if skipped_trials > 0 {
            warn!(
                skipped_trials,
                n_permutations = self.n_permutations,
                "permutation trials without overlapping genes were left out of the null"
            );
        }

        let null_distribution = std::iter::once(observed.concordance)
            .chain(trials.into_iter().flatten())
            .collect::<Vec<_>>();

        if null_distribution.len() < 2 {
            return Err(MatchError::DegeneratePermutation {
                reason: "no permutation trial had overlapping genes".to_string(),
            });
        }
        let standardized =
            standardize(&null_distribution).ok_or_else(|| MatchError::DegeneratePermutation {
                reason: format!(
                    "null distribution has zero variance over {} values",
                    null_distribution.len()
                ),
            })?;

        let z_score = standardized[0];
        let pvalue = normal_two_tailed_pvalue(z_score);
        let empirical_pvalue =
            empirical_two_tailed_pvalue(observed.concordance, &null_distribution[1..]);
        let null_mean = arithmetic_mean(&null_distribution);
        let null_std_dev = sample_std_dev(&null_distribution).unwrap_or_default();

        debug!(z_score, pvalue, empirical_pvalue, "permutation test finished");

        Ok(PermutationOutcome {
            observed,
            null_distribution,
            z_score,
            pvalue,
            empirical_pvalue,
            null_mean,
            null_std_dev,
            skipped_trials,
            seed,
        })
    }

    /// Computes the concordance of every trial, `None` for trials without overlap
    fn null_trials(
        &self,
        table: &JointTable,
        seed: u64,
        cancel: &AtomicBool,
    ) -> Result<Vec<Option<f64>>> {
        let permuted = table.column(self.permuted);
        let fixed = table.column(self.permuted.other());
        let completed = AtomicUsize::new(0);

        (0..self.n_permutations)
            .into_par_iter()
            .map(|trial| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(MatchError::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                        requested: self.n_permutations,
                    });
                }
                let shuffled = shuffle_column(permuted, seed, trial as u64);
                let counts = match self.permuted {
                    Column::Control => count_columns(&shuffled, fixed, table.policy),
                    Column::Test => count_columns(fixed, &shuffled, table.policy),
                };
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(score_counts(counts).ok().map(|s| s.concordance))
            })
            .collect()
    }
}

/// Uniform random permutation of a column for one trial
fn shuffle_column(column: &[Option<Call>], seed: u64, stream: u64) -> Vec<Option<Call>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    let mut shuffled = column.to_vec();
    shuffled.shuffle(&mut rng);
    shuffled
}
