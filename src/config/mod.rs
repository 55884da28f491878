pub mod settings;

pub use settings::{AnalysisConfig, OutputConfig, ReportConfig, ENV_PREFIX};
