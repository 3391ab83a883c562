//! Student t-tests for comparing mean errors.
//!
//! # Example
//!
//! ```
//! use runpredict::stats::hypothesis::ttest_rel;
//!
//! let baseline = vec![3.1, 2.9, 3.4, 3.0, 3.3];
//! let candidate = vec![2.0, 2.1, 2.2, 1.8, 2.4];
//!
//! let result = ttest_rel(&baseline, &candidate).expect("valid t-test inputs");
//! assert!(result.statistic > 0.0);
//! assert!(result.pvalue_greater() < 0.01);
//! ```

use crate::error::{Result, RunpredictError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Result of a t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    /// t-statistic
    pub statistic: f64,

    /// p-value (two-tailed)
    pub pvalue: f64,

    /// Degrees of freedom
    pub df: f64,
}

impl TTestResult {
    /// One-sided p-value for the alternative "mean is greater".
    #[must_use]
    pub fn pvalue_greater(&self) -> f64 {
        student_t_sf(self.statistic, self.df)
    }

    /// One-sided p-value for the alternative "mean is smaller".
    #[must_use]
    pub fn pvalue_less(&self) -> f64 {
        student_t_sf(-self.statistic, self.df)
    }
}

/// One-sample t-test: Tests if sample mean differs from population mean.
///
/// H₀: μ = `population_mean`
///
/// # Errors
///
/// Returns [`RunpredictError::InsufficientData`] for fewer than 2 values and
/// [`RunpredictError::DivisionByZero`] when the sample has zero spread.
pub fn ttest_1samp(sample: &[f64], population_mean: f64) -> Result<TTestResult> {
    let n = sample.len();
    if n < 2 {
        return Err(RunpredictError::insufficient(
            "t-test with at least 2 samples",
            format!("{n} samples"),
        ));
    }

    let sample_mean = sample.iter().sum::<f64>() / n as f64;
    let variance = sample
        .iter()
        .map(|&x| (x - sample_mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let std = variance.sqrt();
    if std == 0.0 {
        return Err(RunpredictError::division_by_zero(
            "t-statistic (zero standard deviation)",
        ));
    }

    // t = (x̄ - μ₀) / (s / √n)
    let t_stat = (sample_mean - population_mean) / (std / (n as f64).sqrt());
    let df = (n - 1) as f64;

    Ok(TTestResult {
        statistic: t_stat,
        pvalue: t_distribution_pvalue(t_stat.abs(), df),
        df,
    })
}

/// Paired t-test on `sample1 - sample2`.
///
/// H₀: `μ_diff` = 0
///
/// # Errors
///
/// Returns [`RunpredictError::SchemaMismatch`] for samples of different
/// length, otherwise as [`ttest_1samp`].
pub fn ttest_rel(sample1: &[f64], sample2: &[f64]) -> Result<TTestResult> {
    if sample1.len() != sample2.len() {
        return Err(RunpredictError::SchemaMismatch {
            expected: format!("{} samples in sample2", sample1.len()),
            actual: format!("{} samples", sample2.len()),
        });
    }
    let diffs: Vec<f64> = sample1
        .iter()
        .zip(sample2)
        .map(|(&x1, &x2)| x1 - x2)
        .collect();
    ttest_1samp(&diffs, 0.0)
}

// ============================================================================
// Distribution functions
// ============================================================================

/// Upper tail `P(T > t)` of Student's t-distribution.
#[must_use]
pub fn student_t_sf(t: f64, df: f64) -> f64 {
    let two_sided = t_distribution_pvalue(t.abs(), df);
    if t >= 0.0 {
        0.5 * two_sided
    } else {
        1.0 - 0.5 * two_sided
    }
}

/// Two-tailed p-value `P(|T| > t)`.
fn t_distribution_pvalue(t: f64, df: f64) -> f64 {
    if df > 1_000.0 {
        return 2.0 * normal_cdf(-t.abs());
    }
    // P(|T| > t) = I_x(df/2, 1/2) with x = df / (df + t²)
    let x = df / (df + t * t);
    incomplete_beta(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

/// Standard normal CDF.
fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Error function (Abramowitz and Stegun 7.1.26).
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736
                + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_bt = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let bt = ln_bt.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        bt * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - bt * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for incomplete beta (Lentz's algorithm).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-14;
    const FPMIN: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        // Even step
        let aa = m_f * (b - m_f) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m_f) * (qab + m_f) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Natural log of the gamma function (Lanczos, g = 7).
fn ln_gamma(z: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if z < 0.5 {
        // Reflection formula: Γ(z)Γ(1-z) = π / sin(πz)
        return (PI / (PI * z).sin()).abs().ln() - ln_gamma(1.0 - z);
    }
    let z = z - 1.0;
    let mut sum = COEFFS[0];
    for (i, &c) in COEFFS.iter().enumerate().skip(1) {
        sum += c / (z + i as f64);
    }
    let t = z + 7.5;
    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + sum.ln()
}

#[cfg(test)]
#[path = "hypothesis_tests.rs"]
mod tests;
