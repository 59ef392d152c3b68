use std::f64::consts::SQRT_2;

use statrs::function::erf::erfc;

pub fn arithmetic_mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample standard deviation (`n - 1` denominator)
///
/// Returns `None` for fewer than two observations.
pub fn sample_std_dev(x: &[f64]) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }
    let mean = arithmetic_mean(x);
    let ss = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some((ss / (x.len() - 1) as f64).sqrt())
}

/// Centers and scales a sequence by its mean and sample standard deviation
///
/// Returns `None` when the standard deviation is undefined, zero or non-finite.
/// Identical values count as zero spread even where the mean rounds.
pub fn standardize(x: &[f64]) -> Option<Vec<f64>> {
    let first = *x.first()?;
    if x.iter().all(|v| *v == first) {
        return None;
    }
    let mean = arithmetic_mean(x);
    let sd = sample_std_dev(x).filter(|sd| sd.is_finite() && *sd > 0.0)?;
    Some(x.iter().map(|v| (v - mean) / sd).collect())
}

/// `count / total` as a percentage, zero for an empty total
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Ratio of two counts, `None` when the denominator is empty
pub fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Two-tailed p-value of a standard normal z-score
///
/// Equal to `2 * (1 - Phi(|z|))`, evaluated through `erfc` so that
/// large scores do not cancel to zero.
pub fn normal_two_tailed_pvalue(z: f64) -> f64 {
    erfc(z.abs() / SQRT_2).clamp(0.0, 1.0)
}

/// Two-tailed empirical p-value
///
/// The fraction of null samples at least as far from the null mean as the observed value.
pub fn empirical_two_tailed_pvalue(observed: f64, null: &[f64]) -> f64 {
    if null.is_empty() {
        return 1.0;
    }
    let center = arithmetic_mean(null);
    let distance = (observed - center).abs();
    let extreme = null
        .iter()
        .filter(|v| (*v - center).abs() >= distance)
        .count();
    extreme as f64 / null.len() as f64
}
