//! Group comparator
//!
//! Partitions an observation table by a grouping spec and runs the test that
//! fits the number of groups: a two-sample t-test for two groups, Tukey's HSD
//! for three. Any other group count is rejected before any statistic is computed.

use tracing::debug;

use super::report::{ComparisonKey, PairwiseComparison};
use crate::stats::hypothesis::{tukey_hsd, two_sample_t_test, VarianceAssumption};
use crate::stats::label::normalize_key;
use crate::table::ObservationTable;
use crate::utils::error::{ReportError, Result};

/// Pairs reported for three groups, in first-encountered group order
pub const THREE_GROUP_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// A labelled sample of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String,
    pub values: Vec<f64>,
}

/// Test selected for a set of groups
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonPlan {
    TwoGroups([Group; 2]),
    ThreeGroups([Group; 3]),
}

impl ComparisonPlan {
    /// Choose the test from the group count; only 2 and 3 are supported
    pub fn select(groups: Vec<Group>, category: &str, metric: &str) -> Result<Self> {
        match <[Group; 2]>::try_from(groups) {
            Ok(pair) => Ok(ComparisonPlan::TwoGroups(pair)),
            Err(groups) => match <[Group; 3]>::try_from(groups) {
                Ok(triple) => Ok(ComparisonPlan::ThreeGroups(triple)),
                Err(groups) => Err(ReportError::group_cardinality(
                    category,
                    metric,
                    groups.into_iter().map(|g| g.label).collect(),
                )),
            },
        }
    }

    /// Run the selected test and emit one result per compared pair
    pub fn execute(
        &self,
        category: &str,
        metric: &str,
        variance: VarianceAssumption,
    ) -> Result<Vec<PairwiseComparison>> {
        match self {
            ComparisonPlan::TwoGroups([a, b]) => {
                let result = two_sample_t_test(&a.values, &b.values, variance)?;
                debug!(
                    "t-test {} vs {} on {}: t = {:.4}, p = {:.4}",
                    a.label, b.label, metric, result.statistic, result.p_value
                );
                Ok(vec![PairwiseComparison::new(
                    ComparisonKey::new(category, a.label.as_str(), b.label.as_str()),
                    metric,
                    result.p_value,
                )])
            }
            ComparisonPlan::ThreeGroups(groups) => {
                let samples: Vec<&[f64]> = groups.iter().map(|g| g.values.as_slice()).collect();
                let result = tukey_hsd(&samples)?;
                THREE_GROUP_PAIRS
                    .iter()
                    .map(|&(i, j)| {
                        let p_value = result.p_value(i, j).ok_or_else(|| {
                            ReportError::statistics(
                                "tukey_hsd".to_string(),
                                format!("missing p-value for pair ({}, {})", i, j),
                            )
                        })?;
                        Ok(PairwiseComparison::new(
                            ComparisonKey::new(
                                category,
                                groups[i].label.as_str(),
                                groups[j].label.as_str(),
                            ),
                            metric,
                            p_value,
                        ))
                    })
                    .collect()
            }
        }
    }
}

/// Compares the groups of one category on one metric
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupComparator {
    variance: VarianceAssumption,
}

impl GroupComparator {
    pub fn new(variance: VarianceAssumption) -> Self {
        Self { variance }
    }

    pub fn variance(&self) -> VarianceAssumption {
        self.variance
    }

    /// Partition `table` by `grouping` and extract `metric` for every group
    pub fn groups<S: AsRef<str>>(
        &self,
        table: &ObservationTable,
        grouping: &[S],
        metric: &str,
        category: &str,
    ) -> Result<Vec<Group>> {
        table
            .group_by(grouping)?
            .into_iter()
            .map(|row_group| {
                let label = normalize_key(&row_group.key);
                let values = table.numeric_values(metric, &row_group.rows)?;
                if values.is_empty() {
                    return Err(ReportError::EmptyGroup {
                        category: category.to_string(),
                        label,
                    });
                }
                Ok(Group { label, values })
            })
            .collect()
    }

    /// Compare all groups of `grouping` on `metric`, yielding 1 or 3 results
    pub fn compare<S: AsRef<str>>(
        &self,
        table: &ObservationTable,
        grouping: &[S],
        metric: &str,
        category: &str,
    ) -> Result<Vec<PairwiseComparison>> {
        let groups = self.groups(table, grouping, metric, category)?;
        debug!(
            "Comparing: {}",
            groups
                .iter()
                .map(|g| g.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        ComparisonPlan::select(groups, category, metric)?.execute(category, metric, self.variance)
    }
}

/// Compare with the default (pooled variance) t-test
pub fn compare<S: AsRef<str>>(
    table: &ObservationTable,
    grouping: &[S],
    metric: &str,
    category: &str,
) -> Result<Vec<PairwiseComparison>> {
    GroupComparator::default().compare(table, grouping, metric, category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table(models: &[&str], scores: &[f64]) -> ObservationTable {
        let mut table = ObservationTable::new(["model", "score"]);
        for (m, s) in models.iter().zip(scores) {
            table.push_row(vec![Value::from(*m), Value::Float(*s)]).unwrap();
        }
        table
    }

    #[test]
    fn test_two_groups_yield_one_row() {
        let t = table(
            &["A", "A", "A", "B", "B", "B"],
            &[0.9, 0.8, 0.85, 0.5, 0.55, 0.6],
        );
        let rows = compare(&t, &["model"], "score", "model_cmp").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, ComparisonKey::new("model_cmp", "A", "B"));
        assert_eq!(rows[0].metric, "score");
        assert!((rows[0].p_value - 0.001_826_26).abs() < 1e-7);
    }

    #[test]
    fn test_three_groups_yield_three_pairs() {
        let t = table(
            &["A", "A", "B", "B", "C", "C"],
            &[0.9, 0.8, 0.85, 0.5, 0.55, 0.6],
        );
        let rows = compare(&t, &["model"], "score", "model_cmp").unwrap();
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.key.comp1.as_str(), r.key.comp2.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert!((rows[0].p_value - 0.545_028).abs() < 1e-4);
        assert!((rows[1].p_value - 0.300_473).abs() < 1e-4);
        assert!((rows[2].p_value - 0.797_173).abs() < 1e-4);
    }

    #[test]
    fn test_first_encountered_order_drives_pairs() {
        let t = table(
            &["C", "A", "C", "B", "A", "B"],
            &[0.55, 0.9, 0.6, 0.85, 0.8, 0.5],
        );
        let rows = compare(&t, &["model"], "score", "model_cmp").unwrap();
        assert_eq!(rows[0].key, ComparisonKey::new("model_cmp", "C", "A"));
        assert_eq!(rows[1].key, ComparisonKey::new("model_cmp", "C", "B"));
        assert_eq!(rows[2].key, ComparisonKey::new("model_cmp", "A", "B"));
    }

    #[test]
    fn test_unsupported_cardinality_fails() {
        let one = table(&["A", "A", "A"], &[0.1, 0.2, 0.3]);
        let err = compare(&one, &["model"], "score", "model_cmp").unwrap_err();
        assert!(matches!(err, ReportError::GroupCardinality { groups: 1, .. }));

        let four = table(
            &["A", "A", "B", "B", "C", "C", "D", "D"],
            &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8],
        );
        let err = compare(&four, &["model"], "score", "model_cmp").unwrap_err();
        match err {
            ReportError::GroupCardinality { groups, labels, .. } => {
                assert_eq!(groups, 4);
                assert_eq!(labels, vec!["A", "B", "C", "D"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let empty = table(&[], &[]);
        let err = compare(&empty, &["model"], "score", "model_cmp").unwrap_err();
        assert!(matches!(err, ReportError::GroupCardinality { groups: 0, .. }));
    }

    #[test]
    fn test_composite_grouping_labels() {
        let mut t = ObservationTable::new(["agentic_retrieval", "reranking", "score"]);
        for (agentic, rerank, score) in [
            (true, false, 0.7),
            (true, false, 0.75),
            (false, false, 0.6),
            (false, false, 0.62),
            (true, true, 0.8),
            (true, true, 0.85),
        ] {
            t.push_row(vec![agentic.into(), rerank.into(), Value::Float(score)])
                .unwrap();
        }
        let rows = compare(&t, &["agentic_retrieval", "reranking"], "score", "agentic_rerank")
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key.comp1, "True, False");
        assert_eq!(rows[0].key.comp2, "False, False");
        assert_eq!(rows[2].key.comp2, "True, True");
    }

    #[test]
    fn test_non_numeric_metric_is_rejected() {
        let t = table(&["A", "B"], &[0.1, 0.2]);
        assert!(matches!(
            compare(&t, &["model"], "model", "model_cmp"),
            Err(ReportError::InvalidValue { .. })
        ));
        assert!(matches!(
            compare(&t, &["model"], "missing", "model_cmp"),
            Err(ReportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_plan_selection() {
        let g = |label: &str| Group {
            label: label.to_string(),
            values: vec![1.0, 2.0],
        };
        assert!(matches!(
            ComparisonPlan::select(vec![g("a"), g("b")], "c", "m").unwrap(),
            ComparisonPlan::TwoGroups(_)
        ));
        assert!(matches!(
            ComparisonPlan::select(vec![g("a"), g("b"), g("c")], "c", "m").unwrap(),
            ComparisonPlan::ThreeGroups(_)
        ));
        assert!(ComparisonPlan::select(vec![g("a")], "c", "m").is_err());
    }
}
