//! Statistical building blocks: label normalization, sampling distributions
//! and the hypothesis tests used by the group comparator.

pub mod distributions;
pub mod hypothesis;
pub mod label;

pub use hypothesis::{tukey_hsd, two_sample_t_test, TTestResult, TukeyHsdResult, VarianceAssumption};
pub use label::{normalize_key, normalize_label};
