//! sigmatch: Two-Sample Molecular Signature Matching
//!
//! This library compares two differential-expression profiles by the direction of
//! their calls. Each profile is discretized into up/down/unchanged calls at a
//! threshold, the two call vectors are aligned by gene identifier, and the net
//! agreement among genes called in both profiles (the concordance) is tested
//! against a permutation null.
//!
//! The main components of this library are:
//! - `SignatureMatch`: The end-to-end comparison of a control and a test profile
//! - `map_profile`: Ternary mapping of a profile and its proportion summary
//! - `align` / `combine_summaries`: Joining call vectors and their summaries
//! - `score`: Overlap fraction and concordance of a joint table
//! - `PermutationTest`: The permutation null and its normal-approximated p-value
//! - `MatchResults`: Structure to hold, classify and display the results

mod align;
mod concordance;
mod config;
mod error;
mod mapping;
mod matching;
mod math;
mod permutation;
mod profile;
mod results;

pub use align::{align, combine_summaries, AggregateSummary, JointTable, SummaryRow};
pub use concordance::{score, score_columns, ConcordanceScore, OverlapCounts};
pub use config::{
    AlignmentPolicy, Column, MappingConfig, MetricFormat, Significance, SignificanceLevel,
};
pub use error::{MatchError, Result};
pub use mapping::{map_profile, map_with_config, Call, CallVector, ProportionSummary};
pub use matching::SignatureMatch;
pub use permutation::{PermutationOutcome, PermutationTest, DEFAULT_PERMUTATIONS};
pub use profile::Profile;
pub use results::MatchResults;
