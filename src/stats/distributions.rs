//! Sampling distributions used by the hypothesis tests
//!
//! The Student t distribution comes from `statrs`. The studentized range
//! distribution has no implementation there, so its CDF is computed by
//! Gauss-Legendre integration (Copenhaver & Holland, 1988).

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::function::erf::erfc;
use statrs::function::gamma::ln_gamma;
use std::f64::consts::{LN_2, SQRT_2};

use crate::utils::error::{ReportError, Result};

/// Two-sided p-value of a t statistic with `df` degrees of freedom
pub fn student_t_two_sided(t: f64, df: f64) -> Result<f64> {
    if t.is_nan() {
        return Ok(f64::NAN);
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
        ReportError::statistics("student_t".to_string(), format!("df = {}: {}", df, e))
    })?;
    Ok((2.0 * dist.cdf(-t.abs())).clamp(0.0, 1.0))
}

/// Upper tail `P(Q > q)` of the studentized range distribution for `k` groups
pub fn studentized_range_sf(q: f64, k: usize, df: f64) -> Result<f64> {
    Ok((1.0 - studentized_range_cdf(q, k, df)?).clamp(0.0, 1.0))
}

/// `P(Q <= q)` for the studentized range of `k` means with `df` error degrees of freedom
pub fn studentized_range_cdf(q: f64, k: usize, df: f64) -> Result<f64> {
    if k < 2 || df < 1.0 || df.is_nan() {
        return Err(ReportError::statistics(
            "studentized_range".to_string(),
            format!("requires k >= 2 and df >= 1 (k = {}, df = {})", k, df),
        ));
    }
    if q.is_nan() {
        return Ok(f64::NAN);
    }
    if q <= 0.0 {
        return Ok(0.0);
    }
    if q.is_infinite() {
        return Ok(1.0);
    }

    let cc = k as f64;
    if df > DF_LARGE {
        return Ok(range_cdf_known_variance(q, cc));
    }
    if df < 2.0 {
        return Ok(range_cdf_small_df(q, cc, df));
    }

    // Outer integral over the distribution of s / sigma.
    let f2 = df * 0.5;
    let f21 = f2 - 1.0;
    let ff4 = df * 0.25;
    let ulen: f64 = if df <= 100.0 {
        1.0
    } else if df <= 800.0 {
        0.5
    } else if df <= 5000.0 {
        0.25
    } else {
        0.125
    };
    let f2lf = (f2 * df.ln()) - (df * LN_2) - ln_gamma(f2) + ulen.ln();

    let mut ans = 0.0;
    for i in 1..=50 {
        let twa1 = (2 * i - 1) as f64 * ulen;
        let mut otsum = 0.0;

        for (&x, &a) in OUTER_NODES.iter().zip(OUTER_WEIGHTS.iter()) {
            for u in [twa1 - x * ulen, twa1 + x * ulen] {
                let t1 = f2lf + f21 * u.ln() - u * ff4;
                if t1 >= -30.0 {
                    let w = q * (u * 0.5).sqrt();
                    otsum += range_cdf_known_variance(w, cc) * a * t1.exp();
                }
            }
        }

        if i as f64 * ulen >= 1.0 && otsum <= 1.0e-14 {
            break;
        }
        ans += otsum;
    }

    Ok(ans.min(1.0))
}

const DF_LARGE: f64 = 25_000.0;

/// Outer integral for `1 <= df < 2`.
///
/// The density of `u` has a `u^(df/2 - 1)` singularity at zero that the fixed
/// panels above cannot resolve, so integrate over `s = sqrt(u)` instead, where
/// the integrand `2 s^(df-1) exp(-df s^2 / 4) W(q s / sqrt(2))` is bounded.
fn range_cdf_small_df(q: f64, cc: f64, df: f64) -> f64 {
    const WIDTH: f64 = 0.5;
    const HALF: f64 = WIDTH * 0.5;

    let f2 = df * 0.5;
    let ff4 = df * 0.25;
    let log_norm = (f2 * df.ln()) - (df * LN_2) - ln_gamma(f2) + (2.0 * HALF).ln();

    let mut ans = 0.0;
    for i in 0..200 {
        let lower = i as f64 * WIDTH;
        let mid = lower + HALF;
        let mut panel = 0.0;

        for (&x, &a) in OUTER_NODES.iter().zip(OUTER_WEIGHTS.iter()) {
            for s in [mid - x * HALF, mid + x * HALF] {
                let t1 = log_norm + (df - 1.0) * s.ln() - s * s * ff4;
                if t1 >= -30.0 {
                    panel += range_cdf_known_variance(q * s / SQRT_2, cc) * a * t1.exp();
                }
            }
        }

        ans += panel;
        if lower >= 1.0 && panel <= 1.0e-14 {
            break;
        }
    }

    ans.min(1.0)
}

/// 16-point Gauss-Legendre nodes (positive half)
const OUTER_NODES: [f64; 8] = [
    0.989_400_934_991_649_9,
    0.944_575_023_073_232_6,
    0.865_631_202_387_831_7,
    0.755_404_408_355_003,
    0.617_876_244_402_643_7,
    0.458_016_777_657_227_4,
    0.281_603_550_779_258_9,
    0.095_012_509_837_637_44,
];

const OUTER_WEIGHTS: [f64; 8] = [
    0.027_152_459_411_754_095,
    0.062_253_523_938_647_89,
    0.095_158_511_682_492_78,
    0.124_628_971_255_533_87,
    0.149_595_988_816_576_73,
    0.169_156_519_395_002_54,
    0.182_603_415_044_923_59,
    0.189_450_610_455_068_5,
];

/// 12-point Gauss-Legendre nodes (positive half)
const INNER_NODES: [f64; 6] = [
    0.981_560_634_246_719_3,
    0.904_117_256_370_474_9,
    0.769_902_674_194_304_7,
    0.587_317_954_286_617_4,
    0.367_831_498_998_180_2,
    0.125_233_408_511_468_92,
];

const INNER_WEIGHTS: [f64; 6] = [
    0.047_175_336_386_511_83,
    0.106_939_325_995_318_43,
    0.160_078_328_543_346_23,
    0.203_167_426_723_065_92,
    0.233_492_536_538_354_8,
    0.249_147_045_813_402_8,
];

fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// CDF of the range of `cc` standard normal variables (sigma known)
fn range_cdf_known_variance(w: f64, cc: f64) -> f64 {
    const UPPER: f64 = 8.0;
    let qsqz = w * 0.5;
    if qsqz >= UPPER {
        return 1.0;
    }

    // (2 * Phi(w / 2) - 1) ^ cc
    let mut pr_w = 2.0 * normal_cdf(qsqz) - 1.0;
    pr_w = if pr_w >= (-50.0 / cc).exp() {
        pr_w.powf(cc)
    } else {
        0.0
    };

    let intervals = if w > 3.0 { 2 } else { 3 };
    let binc = (UPPER - qsqz) / intervals as f64;
    let cc1 = cc - 1.0;
    let mut blb = qsqz;
    let mut bub = blb + binc;
    let mut einsum = 0.0;

    for _ in 0..intervals {
        let a = 0.5 * (bub + blb);
        let b = 0.5 * (bub - blb);
        let mut elsum = 0.0;

        // Nodes visited from the lower end upwards; the tail is negligible
        // once ac^2 exceeds 60.
        let ordered = INNER_NODES
            .iter()
            .zip(INNER_WEIGHTS.iter())
            .map(|(&x, &wt)| (-x, wt))
            .chain(
                INNER_NODES
                    .iter()
                    .zip(INNER_WEIGHTS.iter())
                    .rev()
                    .map(|(&x, &wt)| (x, wt)),
            );
        for (x, weight) in ordered {
            let ac = a + b * x;
            let qexpo = ac * ac;
            if qexpo > 60.0 {
                break;
            }
            let rinsum = normal_cdf(ac) - normal_cdf(ac - w);
            if rinsum >= (-30.0 / cc1).exp() {
                elsum += weight * (-0.5 * qexpo).exp() * rinsum.powf(cc1);
            }
        }

        einsum += elsum * (2.0 * b * cc) / (2.0 * std::f64::consts::PI).sqrt();
        blb = bub;
        bub += binc;
    }

    pr_w += einsum;
    if pr_w <= (-30.0_f64).exp() {
        return 0.0;
    }
    pr_w.min(1.0)
}
