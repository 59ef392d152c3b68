use bon::Builder;

use crate::{
    align::AggregateSummary,
    config::{AlignmentPolicy, MappingConfig, Significance, SignificanceLevel},
    permutation::PermutationOutcome,
};

/// Results of a signature match between a control and a test profile
#[derive(Builder, Debug, Clone)]
pub struct MatchResults {
    pub control: String,
    pub test: String,
    pub control_mapping: MappingConfig,
    pub test_mapping: MappingConfig,
    pub n_permutations: usize,
    pub alignment: AlignmentPolicy,
    pub outcome: PermutationOutcome,
    /// Per-state mapping percentages of both profiles
    pub summary: AggregateSummary,
}

impl MatchResults {
    /// Fraction of genes called nonzero in both profiles
    pub fn overlap_fraction(&self) -> f64 {
        self.outcome.observed.overlap_fraction
    }

    pub fn concordance(&self) -> f64 {
        self.outcome.observed.concordance
    }

    /// Normal-approximated two-tailed permutation p-value
    pub fn pvalue(&self) -> f64 {
        self.outcome.pvalue
    }

    pub fn empirical_pvalue(&self) -> f64 {
        self.outcome.empirical_pvalue
    }

    pub fn significance(&self, level: SignificanceLevel) -> Significance {
        level.classify(self.pvalue())
    }

    /// Key/value rows describing the comparison and its outcome
    pub fn report_rows(&self, level: SignificanceLevel) -> Vec<(&'static str, String)> {
        vec![
            ("Control Source", self.control.clone()),
            ("Control DEG Format", self.control_mapping.format.to_string()),
            ("Control DEG Threshold", self.control_mapping.threshold.to_string()),
            ("Test Source", self.test.clone()),
            ("Test DEG Format", self.test_mapping.format.to_string()),
            ("Test DEG Threshold", self.test_mapping.threshold.to_string()),
            ("DEG Overlap", self.overlap_fraction().to_string()),
            ("Concordance", self.concordance().to_string()),
            ("n permutations", self.n_permutations.to_string()),
            ("p-value", self.pvalue().to_string()),
            ("Significance Threshold", level.to_string()),
            ("Significance", self.significance(level).to_string()),
        ]
    }

    pub fn pprint(&self, level: SignificanceLevel) {
        println!("Metric\tValue");
        println!("DEG Overlap\t{:.2}%", self.overlap_fraction() * 100.0);
        println!("Concordance\t{:.2}%", self.concordance() * 100.0);
        println!("p-value\t{:.4e}", self.pvalue());
        println!("Empirical p-value\t{:.4e}", self.empirical_pvalue());
        println!("Significance\t{}", self.significance(level));
        println!();
        self.summary.pprint();
    }
}
