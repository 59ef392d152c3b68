use std::sync::atomic::AtomicBool;

use bon::Builder;
use tracing::info;

use crate::{
    align::{align, combine_summaries},
    config::{AlignmentPolicy, Column, MappingConfig},
    error::{MatchError, Result},
    mapping::map_with_config,
    permutation::{PermutationTest, DEFAULT_PERMUTATIONS},
    profile::Profile,
    results::MatchResults,
};

/// Two-sample molecular signature matching
///
/// Compares a control and a test profile by the direction of their
/// differential-expression calls.
#[derive(Builder, Debug, Clone)]
pub struct SignatureMatch<'a> {
    control: &'a Profile,
    test: &'a Profile,
    #[builder(default)]
    control_mapping: MappingConfig,
    #[builder(default)]
    test_mapping: MappingConfig,
    #[builder(default = DEFAULT_PERMUTATIONS)]
    n_permutations: usize,
    #[builder(default)]
    permuted: Column,
    #[builder(default)]
    alignment: AlignmentPolicy,
    seed: Option<u64>,
}

impl SignatureMatch<'_> {
    /// Run the signature match
    ///
    /// The comparison is a four-step process:
    /// 1. Map each profile to ternary calls
    /// 2. Align the call vectors and combine their proportions
    /// 3. Score the observed concordance
    /// 4. Build the permutation null and derive the p-value
    pub fn run(&self) -> Result<MatchResults> {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Run the signature match, aborting between permutation trials once `cancel` is set
    pub fn run_with_cancel(&self, cancel: &AtomicBool) -> Result<MatchResults> {
        self.validate()?;

        // Map each profile
        let (control_calls, control_summary) = map_with_config(self.control, &self.control_mapping)?;
        let (test_calls, test_summary) = map_with_config(self.test, &self.test_mapping)?;

        // Align the calls and summarize the mapping
        let table = align(&control_calls, &test_calls, self.alignment);
        let summary = combine_summaries(&[control_summary, test_summary]);

        // Score and permute
        let outcome = PermutationTest::builder()
            .n_permutations(self.n_permutations)
            .permuted(self.permuted)
            .maybe_seed(self.seed)
            .build()
            .run_with_cancel(&table, cancel)?;

        info!(
            control = self.control.name(),
            test = self.test.name(),
            overlap = outcome.observed.overlap_fraction,
            concordance = outcome.observed.concordance,
            pvalue = outcome.pvalue,
            "signature match complete"
        );

        Ok(MatchResults::builder()
            .control(self.control.name().to_string())
            .test(self.test.name().to_string())
            .control_mapping(self.control_mapping.clone())
            .test_mapping(self.test_mapping.clone())
            .n_permutations(self.n_permutations)
            .alignment(self.alignment)
            .outcome(outcome)
            .summary(summary)
            .build())
    }

    /// Checks every caller-supplied setting before any computation
    fn validate(&self) -> Result<()> {
        self.control_mapping.validate()?;
        self.test_mapping.validate()?;
        if self.n_permutations == 0 {
            return Err(MatchError::InvalidPermutationCount(self.n_permutations));
        }
        Ok(())
    }
}
