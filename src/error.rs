use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatchError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Duplicate gene identifier `{gene}` in profile `{profile}`")]
    DuplicateGene { profile: String, gene: String },

    #[error("Metric `{metric}` in profile `{profile}` has {found} values but the profile has {expected} genes")]
    LengthMismatch {
        profile: String,
        metric: String,
        expected: usize,
        found: usize,
    },

    #[error("Non-numeric value {value} for gene `{gene}` in metric `{metric}` of profile `{profile}`")]
    NonFiniteValue {
        profile: String,
        metric: String,
        gene: String,
        value: f64,
    },

    #[error("Metric `{metric}` is already present in profile `{profile}`")]
    DuplicateMetric { profile: String, metric: String },

    #[error("Metric `{metric}` not found in profile `{profile}` (available: {available})")]
    UnknownMetric {
        profile: String,
        metric: String,
        available: String,
    },

    #[error("Threshold must be a finite value >= 0, got {0}")]
    InvalidThreshold(f64),

    #[error("Number of permutations must be at least 1, got {0}")]
    InvalidPermutationCount(usize),

    /// No gene is called up or down in both profiles, so concordance is undefined.
    #[error("No overlapping genes: no identifier is called nonzero in both profiles ({rows} rows)")]
    NoOverlap { rows: usize },

    /// The null distribution has no spread, so the observed value cannot be standardized.
    #[error("Degenerate permutation null: {reason}")]
    DegeneratePermutation { reason: String },

    /// `completed` is a lower bound on the trials finished before the flag was seen.
    #[error("Permutation test cancelled after {completed} of {requested} trials")]
    Cancelled { completed: usize, requested: usize },
}
