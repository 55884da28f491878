use thiserror::Error;

/// Result type alias for the comparison engine
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error types for the comparison engine, report pipeline and embedding service
#[derive(Error, Debug)]
pub enum ReportError {
    /// A category's grouping produced a group count other than 2 or 3
    #[error(
        "Group cardinality error: category '{category}' on metric '{metric}' produced {groups} groups ({labels:?}), expected 2 or 3"
    )]
    GroupCardinality {
        category: String,
        metric: String,
        groups: usize,
        labels: Vec<String>,
    },

    /// Per-metric result tables disagree on their (category, comp1, comp2) keys
    #[error(
        "Merge key mismatch on metric '{metric}': missing {missing:?}, unexpected {unexpected:?}"
    )]
    MergeKeyMismatch {
        metric: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A referenced column does not exist in the observation table
    #[error("Missing column: {column}")]
    MissingColumn { column: String },

    /// A cell could not be used the way the caller requested
    #[error("Invalid value in column '{column}' at row {row}: {value}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// A group selected for comparison has no values
    #[error("Empty group '{label}' in category '{category}'")]
    EmptyGroup { category: String, label: String },

    /// Statistical computation errors
    #[error("Statistics error: {test}: {message}")]
    Statistics { test: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Embedding service errors
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Report rendering errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system errors
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("Report error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl ReportError {
    /// Create a new group cardinality error
    pub fn group_cardinality<S: Into<String>>(
        category: S,
        metric: S,
        labels: Vec<String>,
    ) -> Self {
        Self::GroupCardinality {
            category: category.into(),
            metric: metric.into(),
            groups: labels.len(),
            labels,
        }
    }

    /// Create a new missing column error
    pub fn missing_column<S: Into<String>>(column: S) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value<S: Into<String>>(column: S, row: usize, value: S) -> Self {
        Self::InvalidValue {
            column: column.into(),
            row,
            value: value.into(),
        }
    }

    /// Create a new statistics error
    pub fn statistics<S: Into<String>>(test: S, message: S) -> Self {
        Self::Statistics {
            test: test.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new embedding error
    pub fn embedding<S: Into<String>>(message: S) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Check if this error comes from the shape of the input data rather than the setup
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ReportError::GroupCardinality { .. }
                | ReportError::MergeKeyMismatch { .. }
                | ReportError::InvalidValue { .. }
                | ReportError::EmptyGroup { .. }
                | ReportError::MissingColumn { .. }
        )
    }

    /// Check if this error is due to an unsupported group count
    pub fn is_cardinality_error(&self) -> bool {
        matches!(self, ReportError::GroupCardinality { .. })
    }

    /// Check if this error is due to mismatched keys across metrics
    pub fn is_merge_mismatch(&self) -> bool {
        matches!(self, ReportError::MergeKeyMismatch { .. })
    }
}
