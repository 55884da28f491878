//! Multi-metric statistical comparison engine
//!
//! Given an observation table annotated with categorical factors and numeric
//! metrics, decides for every factor whether its levels differ on every metric
//! and assembles one report keyed by (category, comp1, comp2).
//!
//! ```rust,no_run
//! use rag_significance::comparison::{ComparisonCategory, MultiMetricMerger};
//! use rag_significance::ObservationTable;
//!
//! # fn main() -> rag_significance::Result<()> {
//! let table = ObservationTable::from_csv_path("data/ragas_statistics.csv")?;
//! let categories = vec![
//!     ComparisonCategory::new("embedding_model", ["embedding_model"]),
//!     ComparisonCategory::new("agentic_rerank", ["agentic_retrieval", "reranking"]),
//! ];
//! let report = MultiMetricMerger::default().merge(&table, &categories, &["faithfulness"])?;
//! println!("{} comparisons", report.len());
//! # Ok(())
//! # }
//! ```

pub mod comparator;
pub mod merger;
pub mod report;
pub mod runner;

use serde::{Deserialize, Serialize};

pub use comparator::{compare, ComparisonPlan, Group, GroupComparator};
pub use merger::{merge_tables, MergePolicy, MultiMetricMerger};
pub use report::{ComparisonKey, ComparisonReport, MetricTable, PairwiseComparison, ReportRow};
pub use runner::run_metric;

/// A named comparison axis and the columns that define its groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonCategory {
    /// Report label, e.g. `embedding_model`
    pub label: String,
    /// Grouping columns; several columns form a composite key
    pub columns: Vec<String>,
}

impl ComparisonCategory {
    pub fn new<S: Into<String>>(label: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            label: label.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}
