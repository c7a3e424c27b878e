//! Statistical primitives used by the dependency tests
//!
//! Pearson correlation with a two-sided p-value, one-way ANOVA and
//! sample skewness. The distribution CDFs come from `statrs`.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use super::error::{Result, TabularError};

/// Pearson correlation coefficient with its significance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PearsonResult {
    /// Correlation coefficient in [-1, 1]
    pub r: f64,
    /// Two-sided p-value for H0: r = 0
    pub p_value: f64,
    /// Number of paired samples used
    pub n: usize,
}

/// One-way ANOVA (equal means) result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    pub df_between: usize,
    pub df_within: usize,
}

/// Pearson correlation between two equally long samples.
///
/// The p-value uses the t statistic `r * sqrt((n - 2) / (1 - r²))` with
/// `n - 2` degrees of freedom. With only two samples the correlation is
/// always ±1 and the p-value is 1.
///
/// # Errors
/// * `InvalidArgument` if the samples differ in length
/// * `Computation` for fewer than two samples or a constant sample
pub fn pearson(x: &[f64], y: &[f64]) -> Result<PearsonResult> {
    if x.len() != y.len() {
        return Err(TabularError::invalid(format!(
            "samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n < 2 {
        return Err(TabularError::computation(format!(
            "correlation needs at least 2 paired samples, got {}",
            n
        )));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(TabularError::computation(
            "correlation is undefined for a constant input series",
        ));
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);

    let p_value = if n == 2 {
        1.0
    } else {
        let dof = (n - 2) as f64;
        let denom = 1.0 - r * r;
        if denom <= 0.0 {
            0.0
        } else {
            let t = r * (dof / denom).sqrt();
            let dist = StudentsT::new(0.0, 1.0, dof)
                .map_err(|e| TabularError::computation(e.to_string()))?;
            (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
        }
    };

    Ok(PearsonResult { r, p_value, n })
}

/// One-way ANOVA across groups of observations.
///
/// # Errors
/// `Computation` when fewer than two non-empty groups are given, when there
/// are no within-group degrees of freedom, or when every group is constant
/// with the same value.
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaResult> {
    let k = groups.len();
    if k < 2 {
        return Err(TabularError::computation(format!(
            "ANOVA needs at least 2 groups, got {}",
            k
        )));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(TabularError::computation("ANOVA received an empty group"));
    }

    let total_n: usize = groups.iter().map(|g| g.len()).sum();
    let df_between = k - 1;
    let df_within = total_n - k;
    if df_within == 0 {
        return Err(TabularError::computation(
            "ANOVA has no within-group degrees of freedom (every group has one sample)",
        ));
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total_n as f64;
    let group_means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();

    let ss_between: f64 = groups
        .iter()
        .zip(group_means.iter())
        .map(|(g, &gm)| g.len() as f64 * (gm - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(group_means.iter())
        .map(|(g, &gm)| g.iter().map(|&x| (x - gm).powi(2)).sum::<f64>())
        .sum();

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    if ms_within <= 1e-300 {
        if ms_between <= 1e-300 {
            return Err(TabularError::computation(
                "ANOVA is undefined when all groups are constant and equal",
            ));
        }
        return Ok(AnovaResult {
            f_statistic: f64::INFINITY,
            p_value: 0.0,
            df_between,
            df_within,
        });
    }

    let f_statistic = ms_between / ms_within;
    let dist = FisherSnedecor::new(df_between as f64, df_within as f64)
        .map_err(|e| TabularError::computation(e.to_string()))?;
    let p_value = (1.0 - dist.cdf(f_statistic)).clamp(0.0, 1.0);

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
    })
}

/// Adjusted Fisher-Pearson sample skewness (G1).
///
/// A constant sample has skewness 0.
pub fn skewness(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 3 {
        return Err(TabularError::computation(format!(
            "skewness needs at least 3 values, got {}",
            n
        )));
    }

    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let m2 = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|&v| (v - mean).powi(3)).sum::<f64>() / nf;

    // floating point residue on constant input
    if m2 < 1e-14 {
        return Ok(0.0);
    }

    let g1 = m3 / m2.powf(1.5);
    Ok(g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0))
}

/// Mean and sample standard deviation (n - 1 denominator).
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, var.sqrt()))
}

/// Percentile with linear interpolation between closest ranks.
/// `sorted` must be ascending; `q` is clamped to [0, 100]. `None` for an
/// empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (q.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Some(sorted[lo])
    } else {
        let frac = rank - lo as f64;
        Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
    }
}
