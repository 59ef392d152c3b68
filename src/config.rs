use std::fmt;

use derive_new::new;

use crate::error::{MatchError, Result};

/// The differential-expression metric a profile is mapped on
///
/// The label doubles as the metric column name in a [`Profile`](crate::Profile).
/// Numeric behavior is identical for every format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricFormat {
    Log2FoldChange,
    ZScore,
    Custom(String),
}

impl MetricFormat {
    pub fn label(&self) -> &str {
        match self {
            MetricFormat::Log2FoldChange => "log2FC",
            MetricFormat::ZScore => "Z-Score",
            MetricFormat::Custom(name) => name.as_str(),
        }
    }
}

impl fmt::Display for MetricFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A `(format, threshold)` pair describing how one profile is discretized
#[derive(new, Debug, Clone, PartialEq)]
pub struct MappingConfig {
    pub format: MetricFormat,
    pub threshold: f64,
}

impl MappingConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self::new(MetricFormat::Log2FoldChange, 1.0)
    }
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(MatchError::InvalidThreshold(threshold))
    }
}

/// How two call vectors are joined on their gene identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentPolicy {
    /// Union of identifiers; a gene absent from one side is `Missing` there and never overlaps.
    #[default]
    Outer,
    /// Only identifiers present in both profiles.
    Inner,
    /// Union of identifiers where a `Missing` cell compares as nonzero and unequal to any call.
    ///
    /// Reproduces the historical tool's counts, which inflate overlap and discordance.
    LegacyUnion,
}

impl AlignmentPolicy {
    /// Whether a missing cell behaves like a nonzero call in the overlap predicate
    pub fn missing_overlaps(&self) -> bool {
        matches!(self, AlignmentPolicy::LegacyUnion)
    }
}

/// A column of the joint table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Column {
    Control,
    #[default]
    Test,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Control => "Control",
            Column::Test => "Test",
        }
    }

    /// The column held fixed while this one is permuted
    pub fn other(&self) -> Self {
        match self {
            Column::Control => Column::Test,
            Column::Test => Column::Control,
        }
    }
}

/// The significance levels offered for classifying the permutation p-value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SignificanceLevel {
    Alpha01,
    #[default]
    Alpha05,
    Alpha10,
    Alpha25,
    Custom(f64),
}

impl SignificanceLevel {
    pub fn alpha(&self) -> f64 {
        match self {
            SignificanceLevel::Alpha01 => 0.01,
            SignificanceLevel::Alpha05 => 0.05,
            SignificanceLevel::Alpha10 => 0.10,
            SignificanceLevel::Alpha25 => 0.25,
            SignificanceLevel::Custom(alpha) => *alpha,
        }
    }

    pub fn classify(&self, pvalue: f64) -> Significance {
        if pvalue <= self.alpha() {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a<={}", self.alpha())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Significance {
    Significant,
    NotSignificant,
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Significance::Significant => f.write_str("Significant"),
            Significance::NotSignificant => f.write_str("Not Significant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_format_labels() {
        assert_eq!(MetricFormat::Log2FoldChange.label(), "log2FC");
        assert_eq!(MetricFormat::ZScore.label(), "Z-Score");
        assert_eq!(MetricFormat::Custom("stat".into()).to_string(), "stat");
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.5).is_ok());
        assert_eq!(
            validate_threshold(-0.1),
            Err(MatchError::InvalidThreshold(-0.1))
        );
        assert!(validate_threshold(f64::NAN).is_err());
        assert!(validate_threshold(f64::INFINITY).is_err());
    }

    #[test]
    fn test_significance_is_inclusive() {
        let level = SignificanceLevel::Alpha05;
        assert_eq!(level.classify(0.05), Significance::Significant);
        assert_eq!(level.classify(0.0501), Significance::NotSignificant);
        assert_eq!(level.to_string(), "a<=0.05");
    }

    #[test]
    fn test_significance_levels() {
        assert_eq!(SignificanceLevel::Alpha01.alpha(), 0.01);
        assert_eq!(SignificanceLevel::Alpha10.alpha(), 0.10);
        assert_eq!(SignificanceLevel::Alpha25.alpha(), 0.25);
        assert_eq!(SignificanceLevel::Custom(0.2).classify(0.15), Significance::Significant);
    }

    #[test]
    fn test_only_legacy_union_counts_missing() {
        assert!(!AlignmentPolicy::Outer.missing_overlaps());
        assert!(!AlignmentPolicy::Inner.missing_overlaps());
        assert!(AlignmentPolicy::LegacyUnion.missing_overlaps());
    }
}
