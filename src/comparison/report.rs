//! Result types produced by the comparison engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a compared pair within a category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComparisonKey {
    pub category: String,
    pub comp1: String,
    pub comp2: String,
}

impl ComparisonKey {
    pub fn new<S: Into<String>>(category: S, comp1: S, comp2: S) -> Self {
        Self {
            category: category.into(),
            comp1: comp1.into(),
            comp2: comp2.into(),
        }
    }
}

impl fmt::Display for ComparisonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.category, self.comp1, self.comp2)
    }
}

/// One p-value for one pair of groups on one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    #[serde(flatten)]
    pub key: ComparisonKey,
    pub metric: String,
    pub p_value: f64,
}

impl PairwiseComparison {
    pub fn new(key: ComparisonKey, metric: impl Into<String>, p_value: f64) -> Self {
        Self {
            key,
            metric: metric.into(),
            p_value,
        }
    }
}

/// All comparisons for a single metric, columns `category, comp1, comp2, <metric>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub metric: String,
    pub rows: Vec<PairwiseComparison>,
}

impl MetricTable {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keys in row order
    pub fn keys(&self) -> impl Iterator<Item = &ComparisonKey> {
        self.rows.iter().map(|r| &r.key)
    }
}

/// One report row: a compared pair with one p-value per metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub key: ComparisonKey,
    /// p-values aligned with [`ComparisonReport::metrics`]
    pub p_values: Vec<f64>,
}

/// Merged report keyed by (category, comp1, comp2), one column per metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub metrics: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ComparisonReport {
    /// Column headers: `category, comp1, comp2, <metrics...>`
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            "category".to_string(),
            "comp1".to_string(),
            "comp2".to_string(),
        ];
        headers.extend(self.metrics.iter().cloned());
        headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &ComparisonKey) -> Option<&ReportRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    /// p-value of `metric` for the pair identified by `key`
    pub fn p_value(&self, key: &ComparisonKey, metric: &str) -> Option<f64> {
        let column = self.metrics.iter().position(|m| m == metric)?;
        self.row(key).and_then(|r| r.p_values.get(column).copied())
    }
}
