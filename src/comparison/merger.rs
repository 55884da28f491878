//! Multi-metric merger
//!
//! Runs the category runner once per metric and folds the per-metric tables
//! into a single report keyed by (category, comp1, comp2). The fold starts from
//! the first metric's table, so report rows follow its order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::comparator::GroupComparator;
use super::report::{ComparisonKey, ComparisonReport, MetricTable, ReportRow};
use super::runner::run_metric;
use super::ComparisonCategory;
use crate::table::ObservationTable;
use crate::utils::error::{ReportError, Result};

/// What to do when per-metric tables disagree on their keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Fail with a merge key mismatch error
    #[default]
    Strict,
    /// Keep only keys present in every table, dropping the rest
    #[value(name = "inner_join")]
    InnerJoin,
}

/// Builds the merged comparison report for a set of metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiMetricMerger {
    comparator: GroupComparator,
    policy: MergePolicy,
}

impl MultiMetricMerger {
    pub fn new(comparator: GroupComparator, policy: MergePolicy) -> Self {
        Self { comparator, policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Compare every category on every metric and merge the results
    pub fn merge<S: AsRef<str>>(
        &self,
        table: &ObservationTable,
        categories: &[ComparisonCategory],
        metrics: &[S],
    ) -> Result<ComparisonReport> {
        let tables = metrics
            .iter()
            .map(|metric| run_metric(&self.comparator, table, categories, metric.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let report = merge_tables(tables, self.policy)?;
        info!(
            "Built comparison report: {} rows x {} metrics",
            report.len(),
            report.metrics.len()
        );
        Ok(report)
    }
}

/// Fold per-metric tables into one report by successive joins on the comparison key
pub fn merge_tables(tables: Vec<MetricTable>, policy: MergePolicy) -> Result<ComparisonReport> {
    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return Err(ReportError::validation("at least one metric is required"));
    };

    if policy == MergePolicy::Strict {
        ensure_unique_keys(&first)?;
    }

    let mut report = ComparisonReport {
        metrics: vec![first.metric.clone()],
        rows: first
            .rows
            .into_iter()
            .map(|r| ReportRow {
                key: r.key,
                p_values: vec![r.p_value],
            })
            .collect(),
    };

    for table in tables {
        report = join(report, table, policy)?;
    }

    Ok(report)
}

fn join(report: ComparisonReport, table: MetricTable, policy: MergePolicy) -> Result<ComparisonReport> {
    if report.metrics.contains(&table.metric) {
        return Err(ReportError::validation(format!(
            "metric '{}' appears more than once",
            table.metric
        )));
    }

    if policy == MergePolicy::Strict {
        ensure_unique_keys(&table)?;
        let left: BTreeSet<&ComparisonKey> = report.rows.iter().map(|r| &r.key).collect();
        let right: BTreeSet<&ComparisonKey> = table.keys().collect();
        if left != right {
            return Err(ReportError::MergeKeyMismatch {
                metric: table.metric.clone(),
                missing: left.difference(&right).map(|k| k.to_string()).collect(),
                unexpected: right.difference(&left).map(|k| k.to_string()).collect(),
            });
        }
    }

    let mut by_key: HashMap<&ComparisonKey, Vec<f64>> = HashMap::new();
    for row in &table.rows {
        by_key.entry(&row.key).or_default().push(row.p_value);
    }

    let left_rows = report.rows.len();
    let mut rows = Vec::with_capacity(left_rows);
    for row in report.rows {
        if let Some(p_values) = by_key.get(&row.key) {
            for &p in p_values {
                let mut joined = row.p_values.clone();
                joined.push(p);
                rows.push(ReportRow {
                    key: row.key.clone(),
                    p_values: joined,
                });
            }
        }
    }

    let narrower = left_rows.min(table.rows.len());
    if rows.len() < narrower {
        warn!(
            "Join on metric '{}' dropped unmatched keys ({} rows from {} and {})",
            table.metric,
            rows.len(),
            left_rows,
            table.rows.len()
        );
    } else {
        debug!("Joined metric '{}': {} rows", table.metric, rows.len());
    }

    let mut metrics = report.metrics;
    metrics.push(table.metric);
    Ok(ComparisonReport { metrics, rows })
}

fn ensure_unique_keys(table: &MetricTable) -> Result<()> {
    let mut seen = BTreeSet::new();
    for key in table.keys() {
        if !seen.insert(key) {
            return Err(ReportError::validation(format!(
                "duplicate comparison key '{}' for metric '{}'",
                key, table.metric
            )));
        }
    }
    Ok(())
}
