//! # RAG Significance
//!
//! Multi-metric statistical comparison of experiment results. Given a table of
//! runs annotated with categorical factors (deployment, embedding model, search
//! algorithm, ...) and numeric quality metrics, it tests for every factor whether
//! its levels differ on every metric and merges the results into one report.
//!
//! ## Features
//!
//! - **Test selection by group count**: Student (or Welch) t-test for two groups,
//!   Tukey HSD for three, an error for anything else
//! - **Merged report**: one row per (category, comp1, comp2), one p-value column per metric
//! - **Typed labels**: group labels come from canonical value formatting, composite keys
//!   join as `"a, b"`
//! - **Export**: coloured terminal table, HTML, CSV, JSON and YAML
//! - **Embedding service**: request/response handler for text-to-vector encoders
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rag_significance::{ReportConfig, ReportPipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     rag_significance::init()?;
//!
//!     let config = ReportConfig::ragas().with_input("data/ragas_statistics.csv");
//!     let outcome = ReportPipeline::new(config)?.run()?;
//!     println!("{} comparisons", outcome.report.len());
//!
//!     Ok(())
//! }
//! ```

pub mod comparison;
pub mod config;
pub mod embedding;
pub mod pipeline;
pub mod rendering;
pub mod stats;
pub mod table;
pub mod utils;

// Re-export main types for convenience
pub use comparison::{
    compare, ComparisonCategory, ComparisonKey, ComparisonReport, MergePolicy, MultiMetricMerger,
    PairwiseComparison,
};
pub use config::ReportConfig;
pub use pipeline::{PipelineOutcome, ReportPipeline};
pub use table::{ObservationTable, Value};
pub use utils::error::{ReportError, Result};

/// Initialize the library with default logging
pub fn init() -> Result<()> {
    utils::logging::init_logging()?;
    Ok(())
}

/// Initialize the library with custom logging configuration
pub fn init_with_logging(level: tracing::Level) -> Result<()> {
    utils::logging::init_logging_with_level(level)?;
    Ok(())
}
