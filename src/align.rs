use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    config::{AlignmentPolicy, Column},
    mapping::{Call, CallVector, ProportionSummary},
    math::{arithmetic_mean, sample_std_dev},
};

/// Two call vectors joined on gene identifier
///
/// A `None` cell marks a gene absent from that side of the comparison.
#[derive(Debug, Clone)]
pub struct JointTable {
    pub genes: Vec<String>,
    pub control: Vec<Option<Call>>,
    pub test: Vec<Option<Call>>,
    pub policy: AlignmentPolicy,
}

impl JointTable {
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn column(&self, column: Column) -> &[Option<Call>] {
        match column {
            Column::Control => &self.control,
            Column::Test => &self.test,
        }
    }

    /// Number of rows with a missing cell on either side
    pub fn missing_rows(&self) -> usize {
        self.control
            .iter()
            .zip(self.test.iter())
            .filter(|(c, t)| c.is_none() || t.is_none())
            .count()
    }

    /// The same table with the control and test columns exchanged
    pub fn swapped(&self) -> Self {
        Self {
            genes: self.genes.clone(),
            control: self.test.clone(),
            test: self.control.clone(),
            policy: self.policy,
        }
    }
}

/// Joins two call vectors on gene identifier according to the alignment policy
///
/// Union rows keep control order followed by test-only genes in test order.
/// Inner rows keep control order.
pub fn align(control: &CallVector, test: &CallVector, policy: AlignmentPolicy) -> JointTable {
    let test_index = test
        .genes
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect::<HashMap<_, _>>();

    let mut genes = Vec::with_capacity(control.len());
    let mut control_calls = Vec::with_capacity(control.len());
    let mut test_calls = Vec::with_capacity(control.len());
    let mut shared = vec![false; test.len()];

    for (gene, call) in control.iter() {
        match test_index.get(gene) {
            Some(&j) => {
                shared[j] = true;
                genes.push(gene.to_string());
                control_calls.push(Some(call));
                test_calls.push(Some(test.calls[j]));
            }
            None if policy != AlignmentPolicy::Inner => {
                genes.push(gene.to_string());
                control_calls.push(Some(call));
                test_calls.push(None);
            }
            None => {}
        }
    }

    if policy != AlignmentPolicy::Inner {
        for ((gene, call), _) in test.iter().zip(shared.iter()).filter(|(_, s)| !**s) {
            genes.push(gene.to_string());
            control_calls.push(None);
            test_calls.push(Some(call));
        }
    }

    let table = JointTable {
        genes,
        control: control_calls,
        test: test_calls,
        policy,
    };

    let missing = table.missing_rows();
    if policy == AlignmentPolicy::LegacyUnion && missing > 0 {
        warn!(
            missing,
            "legacy union alignment counts missing cells as nonzero calls"
        );
    }
    debug!(
        control = control.name.as_str(),
        test = test.name.as_str(),
        rows = table.len(),
        missing,
        ?policy,
        "aligned call vectors"
    );
    table
}

/// One state's row of the aggregate summary
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub call: Call,
    pub percentages: Vec<f64>,
    pub mean: f64,
    pub std_dev: Option<f64>,
}

/// Per-state percentages of every profile, with cross-profile mean and sample standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSummary {
    pub profiles: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl AggregateSummary {
    pub fn row(&self, call: Call) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.call == call)
    }

    pub fn pprint(&self) {
        println!("MAP\t{}\tMean\tStd Dev", self.profiles.join("\t"));
        for row in &self.rows {
            let percentages = row
                .percentages
                .iter()
                .map(|p| format!("{p:.2}%"))
                .collect::<Vec<_>>()
                .join("\t");
            let std_dev = row
                .std_dev
                .map_or_else(|| "NA".to_string(), |s| format!("{s:.2}%"));
            println!("{}\t{}\t{:.2}%\t{}", row.call, percentages, row.mean, std_dev);
        }
    }
}

/// Combines proportion summaries into one table keyed by state
pub fn combine_summaries(summaries: &[ProportionSummary]) -> AggregateSummary {
    let rows = Call::DISPLAY_ORDER
        .iter()
        .map(|&call| {
            let percentages = summaries.iter().map(|s| s.get(call)).collect::<Vec<_>>();
            let mean = if percentages.is_empty() {
                0.0
            } else {
                arithmetic_mean(&percentages)
            };
            let std_dev = sample_std_dev(&percentages);
            SummaryRow {
                call,
                percentages,
                mean,
                std_dev,
            }
        })
        .collect();
    AggregateSummary {
        profiles: summaries.iter().map(|s| s.name.clone()).collect(),
        rows,
    }
}
