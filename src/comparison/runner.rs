//! Category runner: one metric across every configured category

use tracing::debug;

use super::comparator::GroupComparator;
use super::report::MetricTable;
use super::ComparisonCategory;
use crate::table::ObservationTable;
use crate::utils::error::Result;

/// Run every category against `metric` and concatenate the results.
///
/// Rows are not deduplicated; a category listed twice yields its rows twice.
pub fn run_metric(
    comparator: &GroupComparator,
    table: &ObservationTable,
    categories: &[ComparisonCategory],
    metric: &str,
) -> Result<MetricTable> {
    let mut metric_table = MetricTable::new(metric);
    for category in categories {
        let rows = comparator.compare(table, category.columns.as_slice(), metric, &category.label)?;
        debug!(
            "Category '{}' on '{}' produced {} comparison(s)",
            category.label,
            metric,
            rows.len()
        );
        metric_table.rows.extend(rows);
    }
    Ok(metric_table)
}
