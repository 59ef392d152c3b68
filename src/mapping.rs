use std::fmt;

use tracing::debug;

use crate::{
    config::{validate_threshold, MappingConfig},
    error::Result,
    math::percentage,
    profile::Profile,
};

/// A ternary differential-expression call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Call {
    Down = -1,
    Unchanged = 0,
    Up = 1,
}

impl Call {
    /// All states in the order the summary tables display them
    pub const DISPLAY_ORDER: [Call; 3] = [Call::Unchanged, Call::Up, Call::Down];

    /// Classifies a metric value against a symmetric threshold
    ///
    /// Ties at exactly `±threshold` are `Unchanged`.
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value > threshold {
            Call::Up
        } else if value < -threshold {
            Call::Down
        } else {
            Call::Unchanged
        }
    }

    pub fn value(&self) -> i8 {
        *self as i8
    }

    pub fn is_changed(&self) -> bool {
        *self != Call::Unchanged
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// The ternary calls of one profile, in profile order
#[derive(Debug, Clone)]
pub struct CallVector {
    pub name: String,
    pub genes: Vec<String>,
    pub calls: Vec<Call>,
}

impl CallVector {
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Call)> {
        self.genes
            .iter()
            .map(String::as_str)
            .zip(self.calls.iter().copied())
    }
}

/// Percentage of a call vector in each state
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionSummary {
    pub name: String,
    pub down: f64,
    pub unchanged: f64,
    pub up: f64,
}

impl ProportionSummary {
    pub fn from_calls(name: &str, calls: &[Call]) -> Self {
        let (mut down, mut unchanged, mut up) = (0, 0, 0);
        for call in calls {
            match call {
                Call::Down => down += 1,
                Call::Unchanged => unchanged += 1,
                Call::Up => up += 1,
            }
        }
        Self {
            name: name.to_string(),
            down: percentage(down, calls.len()),
            unchanged: percentage(unchanged, calls.len()),
            up: percentage(up, calls.len()),
        }
    }

    pub fn get(&self, call: Call) -> f64 {
        match call {
            Call::Down => self.down,
            Call::Unchanged => self.unchanged,
            Call::Up => self.up,
        }
    }

    pub fn total(&self) -> f64 {
        self.down + self.unchanged + self.up
    }
}

/// Maps one metric column of a profile to ternary calls
///
/// Returns the call vector, named after the profile, and its proportion summary.
pub fn map_profile(
    profile: &Profile,
    metric: &str,
    threshold: f64,
) -> Result<(CallVector, ProportionSummary)> {
    validate_threshold(threshold)?;
    let values = profile.metric(metric)?;

    let calls = values
        .iter()
        .map(|v| Call::classify(*v, threshold))
        .collect::<Vec<_>>();
    let summary = ProportionSummary::from_calls(profile.name(), &calls);

    debug!(
        profile = profile.name(),
        metric,
        threshold,
        genes = calls.len(),
        up = summary.up,
        down = summary.down,
        "mapped profile to ternary calls"
    );

    let call_vector = CallVector {
        name: profile.name().to_string(),
        genes: profile.genes().to_vec(),
        calls,
    };
    Ok((call_vector, summary))
}

/// Maps a profile using the metric column named by the config's format label
pub fn map_with_config(
    profile: &Profile,
    config: &MappingConfig,
) -> Result<(CallVector, ProportionSummary)> {
    map_profile(profile, config.format.label(), config.threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::MetricFormat, error::MatchError};
    use approx::assert_relative_eq;

    fn profile(values: &[f64]) -> Profile {
        Profile::from_pairs(
            "ctrl",
            "log2FC",
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("g{i}"), *v)),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_ties_are_unchanged() {
        assert_eq!(Call::classify(1.0, 1.0), Call::Unchanged);
        assert_eq!(Call::classify(-1.0, 1.0), Call::Unchanged);
        assert_eq!(Call::classify(1.0001, 1.0), Call::Up);
        assert_eq!(Call::classify(-1.0001, 1.0), Call::Down);
        assert_eq!(Call::classify(0.0, 0.0), Call::Unchanged);
        assert_eq!(Call::classify(1e-9, 0.0), Call::Up);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let values = (-40..=40).map(|i| i as f64 * 0.1).collect::<Vec<_>>();
        for threshold in [0.0, 0.5, 1.0, 2.5] {
            for pair in values.windows(2) {
                let lo = Call::classify(pair[0], threshold);
                let hi = Call::classify(pair[1], threshold);
                assert!(hi >= lo);
                assert!([-1, 0, 1].contains(&hi.value()));
            }
        }
    }

    #[test]
    fn test_map_profile() {
        let profile = profile(&[2.0, -3.0, 0.5, 1.0, -1.0, 4.0]);
        let (calls, summary) = map_profile(&profile, "log2FC", 1.0).unwrap();
        assert_eq!(
            calls.calls,
            vec![
                Call::Up,
                Call::Down,
                Call::Unchanged,
                Call::Unchanged,
                Call::Unchanged,
                Call::Up
            ]
        );
        assert_eq!(calls.name, "ctrl");
        assert_eq!(calls.genes, profile.genes());
        assert_relative_eq!(summary.up, 100.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.down, 100.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(summary.unchanged, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_proportions_sum_to_hundred() {
        for values in [
            vec![0.3, -7.0, 2.2, 9.1, -0.2, 1.4, -1.6],
            vec![5.0, 5.0, 5.0],
            vec![0.0],
        ] {
            let (_, summary) = map_profile(&profile(&values), "log2FC", 1.0).unwrap();
            assert_relative_eq!(summary.total(), 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_state_profile() {
        let (_, summary) = map_profile(&profile(&[3.0, 4.0]), "log2FC", 1.0).unwrap();
        assert_eq!(summary.up, 100.0);
        assert_eq!(summary.down, 0.0);
        assert_eq!(summary.unchanged, 0.0);
    }

    #[test]
    fn test_empty_profile() {
        let (calls, summary) = map_profile(&profile(&[]), "log2FC", 1.0).unwrap();
        assert!(calls.is_empty());
        assert_eq!(summary.total(), 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let profile = profile(&[1.0]);
        assert_eq!(
            map_profile(&profile, "log2FC", -1.0).unwrap_err(),
            MatchError::InvalidThreshold(-1.0)
        );
        assert!(matches!(
            map_profile(&profile, "Z-Score", 1.0).unwrap_err(),
            MatchError::UnknownMetric { .. }
        ));
    }

    #[test]
    fn test_map_with_config_uses_format_label() {
        let profile = Profile::from_pairs("test", "Z-Score", [("A", 2.5), ("B", -0.5)]).unwrap();
        let config = MappingConfig::new(MetricFormat::ZScore, 2.0);
        let (calls, _) = map_with_config(&profile, &config).unwrap();
        assert_eq!(calls.calls, vec![Call::Up, Call::Unchanged]);
        assert!(map_with_config(&profile, &MappingConfig::default()).is_err());
    }
}
