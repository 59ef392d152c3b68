use itertools::Itertools;

use crate::error::{MatchError, Result};

/// A differential-expression profile
///
/// An ordered set of unique gene identifiers with one or more named metric columns
/// (e.g. `log2FC` and `Z-Score`). Every metric value is finite.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    genes: Vec<String>,
    metrics: Vec<(String, Vec<f64>)>,
}

impl Profile {
    /// Creates a profile without metric columns, rejecting duplicate identifiers
    pub fn new(name: impl Into<String>, genes: Vec<String>) -> Result<Self> {
        let name = name.into();
        if let Some(gene) = genes.iter().duplicates().next() {
            return Err(MatchError::DuplicateGene {
                profile: name,
                gene: gene.clone(),
            });
        }
        Ok(Self {
            name,
            genes,
            metrics: Vec::new(),
        })
    }

    /// Creates a single-metric profile from `(gene, value)` pairs
    pub fn from_pairs<G: Into<String>>(
        name: impl Into<String>,
        metric: impl Into<String>,
        pairs: impl IntoIterator<Item = (G, f64)>,
    ) -> Result<Self> {
        let (genes, values): (Vec<String>, Vec<f64>) =
            pairs.into_iter().map(|(g, v)| (g.into(), v)).unzip();
        Self::new(name, genes)?.with_metric(metric, values)
    }

    /// Adds a metric column, one value per gene in profile order
    pub fn with_metric(mut self, metric: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let metric = metric.into();
        if self.metrics.iter().any(|(m, _)| *m == metric) {
            return Err(MatchError::DuplicateMetric {
                profile: self.name,
                metric,
            });
        }
        if values.len() != self.genes.len() {
            return Err(MatchError::LengthMismatch {
                profile: self.name,
                metric,
                expected: self.genes.len(),
                found: values.len(),
            });
        }
        if let Some((gene, value)) = self
            .genes
            .iter()
            .zip(values.iter())
            .find(|(_, v)| !v.is_finite())
        {
            return Err(MatchError::NonFiniteValue {
                profile: self.name.clone(),
                metric,
                gene: gene.clone(),
                value: *value,
            });
        }
        self.metrics.push((metric, values));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|(m, _)| m.as_str())
    }

    /// Returns the values of a metric column
    pub fn metric(&self, metric: &str) -> Result<&[f64]> {
        self.metrics
            .iter()
            .find(|(m, _)| m == metric)
            .map(|(_, values)| values.as_slice())
            .ok_or_else(|| MatchError::UnknownMetric {
                profile: self.name.clone(),
                metric: metric.to_string(),
                available: self.metric_names().join(", "),
            })
    }
}
