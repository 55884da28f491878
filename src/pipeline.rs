//! Report pipeline: load the observation table, build the merged report, export it

use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::comparison::{ComparisonReport, GroupComparator, MultiMetricMerger};
use crate::config::ReportConfig;
use crate::rendering;
use crate::table::ObservationTable;
use crate::utils::error::Result;

/// Summary of a completed pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: ComparisonReport,
    pub rows_loaded: usize,
    pub output: Option<PathBuf>,
    pub elapsed_ms: f64,
}

/// Runs one configured comparison report end to end
pub struct ReportPipeline {
    config: ReportConfig,
    merger: MultiMetricMerger,
}

impl ReportPipeline {
    /// Create a pipeline; the configuration is validated up front
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        let merger = MultiMetricMerger::new(
            GroupComparator::new(config.analysis.variance),
            config.analysis.merge_policy,
        );
        Ok(Self { config, merger })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Build the merged report for an already loaded table
    pub fn build_report(&self, table: &ObservationTable) -> Result<ComparisonReport> {
        self.merger.merge(
            table,
            &self.config.categories,
            self.config.metrics.as_slice(),
        )
    }

    /// Load the configured input, build the report and export it
    pub fn run(&self) -> Result<PipelineOutcome> {
        let start = Instant::now();
        info!("Running report '{}'", self.config.name);

        let table = ObservationTable::from_csv_path(&self.config.input)?;
        let report = self.build_report(&table)?;
        let output = self.config.output.path.clone();
        rendering::export(
            &report,
            &self.config.styles,
            self.config.output.format,
            &self.config.name,
            output.as_deref(),
        )?;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            "Report '{}' finished in {:.1}ms ({} comparisons)",
            self.config.name,
            elapsed_ms,
            report.len()
        );
        Ok(PipelineOutcome {
            report,
            rows_loaded: table.len(),
            output,
            elapsed_ms,
        })
    }
}
