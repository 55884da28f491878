//! Two-sample t-test and Tukey's honestly-significant-difference test

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::distributions::{student_t_two_sided, studentized_range_sf};
use crate::utils::error::{ReportError, Result};

/// Variance assumption of the two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VarianceAssumption {
    /// Student's t-test with pooled variance
    #[default]
    Equal,
    /// Welch's t-test with Satterthwaite degrees of freedom
    Unequal,
}

/// Outcome of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Outcome of a Tukey HSD test over `k` groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TukeyHsdResult {
    /// Group means in input order
    pub means: Vec<f64>,
    /// Pooled within-group mean square
    pub mean_square_error: f64,
    /// Error degrees of freedom, `N - k`
    pub df: f64,
    /// Studentized range statistic per pair, `k x k`, zero on the diagonal
    pub statistic: Vec<Vec<f64>>,
    /// Adjusted p-value per pair, `k x k`, one on the diagonal
    pub pvalue: Vec<Vec<f64>>,
}

impl TukeyHsdResult {
    /// Adjusted p-value for the pair (i, j)
    pub fn p_value(&self, i: usize, j: usize) -> Option<f64> {
        self.pvalue.get(i).and_then(|row| row.get(j)).copied()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_squares(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

/// Two-sided independent two-sample t-test
pub fn two_sample_t_test(
    sample1: &[f64],
    sample2: &[f64],
    variance: VarianceAssumption,
) -> Result<TTestResult> {
    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;
    if sample1.is_empty() || sample2.is_empty() || sample1.len() + sample2.len() < 3 {
        return Err(ReportError::statistics(
            "t_test".to_string(),
            format!(
                "needs at least 3 observations across both samples (got {} and {})",
                sample1.len(),
                sample2.len()
            ),
        ));
    }

    let mean1 = mean(sample1);
    let mean2 = mean(sample2);
    let ss1 = sum_squares(sample1, mean1);
    let ss2 = sum_squares(sample2, mean2);

    let (std_error, df) = match variance {
        VarianceAssumption::Equal => {
            let df = n1 + n2 - 2.0;
            let pooled = (ss1 + ss2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        VarianceAssumption::Unequal => {
            if sample1.len() < 2 || sample2.len() < 2 {
                return Err(ReportError::statistics(
                    "welch_t_test",
                    "each sample needs at least 2 observations",
                ));
            }
            let v1 = ss1 / (n1 - 1.0) / n1;
            let v2 = ss2 / (n2 - 1.0) / n2;
            let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
            ((v1 + v2).sqrt(), df)
        }
    };

    if std_error == 0.0 {
        warn!("t-test on samples with zero variance");
    }
    let statistic = (mean1 - mean2) / std_error;
    let p_value = if df.is_finite() && df > 0.0 {
        student_t_two_sided(statistic, df)?
    } else {
        f64::NAN
    };

    Ok(TTestResult {
        statistic,
        df,
        p_value,
    })
}

/// Tukey-Kramer HSD test for all pairwise mean differences
pub fn tukey_hsd(groups: &[&[f64]]) -> Result<TukeyHsdResult> {
    let k = groups.len();
    if k < 2 {
        return Err(ReportError::statistics(
            "tukey_hsd".to_string(),
            format!("needs at least 2 groups, got {}", k),
        ));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(ReportError::statistics("tukey_hsd", "groups must not be empty"));
    }

    let total: usize = groups.iter().map(|g| g.len()).sum();
    if total <= k {
        return Err(ReportError::statistics(
            "tukey_hsd".to_string(),
            format!("needs more observations than groups ({} <= {})", total, k),
        ));
    }

    let means: Vec<f64> = groups.iter().map(|g| mean(g)).collect();
    let df = (total - k) as f64;
    let mean_square_error = groups
        .iter()
        .zip(&means)
        .map(|(g, &m)| sum_squares(g, m))
        .sum::<f64>()
        / df;
    if mean_square_error == 0.0 {
        warn!("Tukey HSD on groups with zero within-group variance");
    }

    let mut statistic = vec![vec![0.0; k]; k];
    let mut pvalue = vec![vec![1.0; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let ni = groups[i].len() as f64;
            let nj = groups[j].len() as f64;
            let std_error = (mean_square_error / 2.0 * (1.0 / ni + 1.0 / nj)).sqrt();
            let q = (means[i] - means[j]).abs() / std_error;
            let p = studentized_range_sf(q, k, df)?;
            statistic[i][j] = q;
            statistic[j][i] = q;
            pvalue[i][j] = p;
            pvalue[j][i] = p;
        }
    }

    Ok(TukeyHsdResult {
        means,
        mean_square_error,
        df,
        statistic,
        pvalue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_student_t_test_reference_scenario() {
        let a = [0.9, 0.8, 0.85];
        let b = [0.5, 0.55, 0.6];
        let result = two_sample_t_test(&a, &b, VarianceAssumption::Equal).unwrap();
        assert_close(result.statistic, 7.348_469_228, 1e-8);
        assert_eq!(result.df, 4.0);
        assert_close(result.p_value, 0.001_826_26, 1e-7);
    }

    #[test]
    fn test_welch_matches_student_for_equal_sizes_and_variances() {
        let a = [0.9, 0.8, 0.85];
        let b = [0.5, 0.55, 0.6];
        let welch = two_sample_t_test(&a, &b, VarianceAssumption::Unequal).unwrap();
        assert_close(welch.df, 4.0, 1e-9);
        assert_close(welch.p_value, 0.001_826_26, 1e-7);
    }

    #[test]
    fn test_t_test_identical_samples() {
        let a = [1.0, 2.0, 3.0];
        let result = two_sample_t_test(&a, &a, VarianceAssumption::Equal).unwrap();
        assert_close(result.statistic, 0.0, 1e-12);
        assert_close(result.p_value, 1.0, 1e-12);
    }

    #[test]
    fn test_t_test_zero_variance() {
        let result =
            two_sample_t_test(&[1.0, 1.0], &[2.0, 2.0], VarianceAssumption::Equal).unwrap();
        assert!(result.statistic.is_infinite());
        assert_eq!(result.p_value, 0.0);

        let result =
            two_sample_t_test(&[1.0, 1.0], &[1.0, 1.0], VarianceAssumption::Equal).unwrap();
        assert!(result.p_value.is_nan());
    }

    #[test]
    fn test_t_test_too_few_observations() {
        assert!(two_sample_t_test(&[1.0], &[2.0], VarianceAssumption::Equal).is_err());
        assert!(two_sample_t_test(&[], &[2.0, 3.0], VarianceAssumption::Equal).is_err());
        assert!(two_sample_t_test(&[1.0], &[2.0, 3.0], VarianceAssumption::Unequal).is_err());
    }

    #[test]
    fn test_tukey_hsd_reference_values() {
        let g0 = [1.0, 2.0, 3.0, 4.0];
        let g1 = [2.0, 3.0, 4.0, 5.0];
        let g2 = [6.0, 7.0, 8.0, 9.0];
        let result = tukey_hsd(&[&g0, &g1, &g2]).unwrap();

        assert_eq!(result.df, 9.0);
        assert_close(result.statistic[0][1], 1.549_193_338, 1e-8);
        assert_close(result.p_value(0, 1).unwrap(), 0.540_248, 1e-4);
        assert_close(result.p_value(0, 2).unwrap(), 0.001_020_2, 1e-5);
        assert_close(result.p_value(1, 2).unwrap(), 0.004_512_2, 1e-5);
        assert_eq!(result.p_value(2, 1), result.p_value(1, 2));
        assert_eq!(result.p_value(1, 1), Some(1.0));
    }

    #[test]
    fn test_tukey_hsd_unbalanced_groups() {
        let g0 = [0.9, 0.8];
        let g1 = [0.85, 0.5];
        let g2 = [0.55, 0.6];
        let result = tukey_hsd(&[&g0, &g1, &g2]).unwrap();
        assert_close(result.p_value(0, 1).unwrap(), 0.545_028, 1e-4);
        assert_close(result.p_value(0, 2).unwrap(), 0.300_473, 1e-4);
        assert_close(result.p_value(1, 2).unwrap(), 0.797_173, 1e-4);

        let g3 = [0.7];
        assert!(tukey_hsd(&[&g0, &g1, &g3]).is_ok());
    }

    #[test]
    fn test_tukey_hsd_single_error_degree_of_freedom() {
        let g0 = [1.0, 2.0];
        let g1 = [10.0];
        let g2 = [3.0];
        let result = tukey_hsd(&[&g0, &g1, &g2]).unwrap();

        assert_eq!(result.df, 1.0);
        assert_close(result.statistic[0][1], 13.880_441_876, 1e-8);
        assert_close(result.p_value(0, 1).unwrap(), 0.096_834, 1e-4);
        assert_close(result.p_value(0, 2).unwrap(), 0.482_584, 1e-4);
        assert_close(result.p_value(1, 2).unwrap(), 0.135_160, 1e-4);
    }

    #[test]
    fn test_tukey_hsd_rejects_degenerate_input() {
        let g = [1.0];
        assert!(tukey_hsd(&[&g]).is_err());
        assert!(tukey_hsd(&[&g, &g, &g]).is_err());
        let empty: [f64; 0] = [];
        assert!(tukey_hsd(&[&g, &empty]).is_err());
    }
}
