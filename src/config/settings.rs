use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::comparison::{ComparisonCategory, MergePolicy};
use crate::rendering::{ReportFormat, StylePalette};
use crate::stats::VarianceAssumption;
use crate::utils::error::{ReportError, Result};

/// Environment variable prefix for configuration overrides, e.g. `RAGSIG_OUTPUT__FORMAT=csv`
pub const ENV_PREFIX: &str = "RAGSIG";

/// Main configuration for a comparison report run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report name, used as the page title
    pub name: String,
    /// Path to the CSV observation table
    pub input: PathBuf,
    /// Metric columns evaluated for every category
    pub metrics: Vec<String>,
    /// Comparison categories, in report order
    pub categories: Vec<ComparisonCategory>,
    /// Statistical settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Row colours per category
    #[serde(default)]
    pub styles: StylePalette,
}

/// Statistical settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Policy when metrics disagree on comparison keys
    #[serde(default)]
    pub merge_policy: MergePolicy,
    /// Variance assumption of the two-group t-test
    #[serde(default)]
    pub variance: VarianceAssumption,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination file; stdout when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Output format
    #[serde(default)]
    pub format: ReportFormat,
}

const REFERENCE_CATEGORIES: [(&str, &[&str]); 4] = [
    ("deployment_name", &["deployment_name"]),
    ("embedding_model", &["embedding_model"]),
    ("search_algorithm", &["search_algorithm"]),
    ("agentic_rerank", &["agentic_retrieval", "reranking"]),
];

fn reference_categories() -> Vec<ComparisonCategory> {
    REFERENCE_CATEGORIES
        .iter()
        .map(|(label, columns)| ComparisonCategory::new(*label, columns.iter().copied()))
        .collect()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::ragas()
    }
}

impl ReportConfig {
    /// Preset comparing RAGAS quality scores
    pub fn ragas() -> Self {
        Self {
            name: "ragas".to_string(),
            input: PathBuf::from("data/ragas_statistics.csv"),
            metrics: ["faithfulness", "context_recall", "context_precision", "aggregated_score"]
                .into_iter()
                .map(String::from)
                .collect(),
            categories: reference_categories(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                path: Some(PathBuf::from("images/ragas.html")),
                format: ReportFormat::Html,
            },
            styles: StylePalette::default(),
        }
    }

    /// Preset comparing ROUGE precision, recall and F-measure
    pub fn rouge() -> Self {
        Self {
            name: "rouge".to_string(),
            input: PathBuf::from("data/rouge_statistics.csv"),
            metrics: [
                "rouge1_precision",
                "rouge1_recall",
                "rouge1_fmeasure",
                "rougeL_precision",
                "rougeL_recall",
                "rougeL_fmeasure",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            categories: reference_categories(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                path: Some(PathBuf::from("images/rouge.html")),
                format: ReportFormat::Html,
            },
            styles: StylePalette::default(),
        }
    }

    /// Set the input table path
    pub fn with_input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input = path.into();
        self
    }

    /// Set the output destination and format
    pub fn with_output(mut self, path: Option<PathBuf>, format: ReportFormat) -> Self {
        self.output = OutputConfig { path, format };
        self
    }

    /// Set the merge policy
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.analysis.merge_policy = policy;
        self
    }

    /// Load configuration from a TOML file, with `RAGSIG_*` environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_env_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn from_file_with_env_prefix<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReportError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ReportError::config(format!("Failed to read config file: {}", e)))?;

        let config: ReportConfig = settings
            .try_deserialize()
            .map_err(|e| ReportError::config(format!("Failed to parse config file: {}", e)))?;
        debug!("Loaded configuration '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReportError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(ReportError::config("at least one metric is required"));
        }
        if self.categories.is_empty() {
            return Err(ReportError::config("at least one category is required"));
        }

        let mut metrics = HashSet::new();
        for metric in &self.metrics {
            if metric.trim().is_empty() {
                return Err(ReportError::config("metric names must not be empty"));
            }
            if !metrics.insert(metric) {
                return Err(ReportError::config(format!("duplicate metric '{}'", metric)));
            }
        }

        let mut labels = HashSet::new();
        for category in &self.categories {
            if category.columns.is_empty() {
                return Err(ReportError::config(format!(
                    "category '{}' has no grouping columns",
                    category.label
                )));
            }
            if !labels.insert(&category.label) {
                return Err(ReportError::config(format!(
                    "duplicate category '{}'",
                    category.label
                )));
            }
        }

        Ok(())
    }
}
