//! Two-proportion z-test for control vs. treatment conversion rates.
//!
//! Everything here is a pure function of its inputs: no I/O, no logging,
//! no shared state. Callers own reduction of raw rows and rendering.

use crate::domain::model::{ComparisonResult, GroupSample, Recommendation, Verdict};
use crate::utils::error::{AnalysisError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

pub const DEFAULT_ALPHA: f64 = 0.05;

/// Critical value used for the conventional 95% interval.
const Z_CRITICAL_95: f64 = 1.96;

fn check_sample(name: &str, sample: &GroupSample) -> Result<()> {
    if sample.trials == 0 {
        return Err(AnalysisError::invalid_input(format!(
            "{} group has zero trials",
            name
        )));
    }
    if sample.successes > sample.trials {
        return Err(AnalysisError::invalid_input(format!(
            "{} group has {} successes out of only {} trials",
            name, sample.successes, sample.trials
        )));
    }
    Ok(())
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| AnalysisError::StatisticsError {
        message: format!("Failed to create normal distribution: {}", e),
    })
}

/// Two-sided critical value z_(1 - alpha/2).
fn critical_value(normal: &Normal, alpha: f64) -> f64 {
    if (alpha - DEFAULT_ALPHA).abs() < 1e-12 {
        Z_CRITICAL_95
    } else {
        normal.inverse_cdf(1.0 - alpha / 2.0)
    }
}

/// Compares two binomial proportions.
///
/// The confidence interval for the uplift reuses the pooled standard error of
/// the z-test rather than the unpooled two-sample error.
pub fn compare(control: GroupSample, treatment: GroupSample, alpha: f64) -> Result<ComparisonResult> {
    check_sample("control", &control)?;
    check_sample("treatment", &treatment)?;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AnalysisError::invalid_input(format!(
            "alpha must be between 0 and 1, got {}",
            alpha
        )));
    }

    let normal = standard_normal()?;

    let rate_control = control.successes as f64 / control.trials as f64;
    let rate_treatment = treatment.successes as f64 / treatment.trials as f64;
    let uplift = rate_treatment - rate_control;

    let n_c = control.trials as f64;
    let n_t = treatment.trials as f64;
    let p_pool = (control.successes as f64 + treatment.successes as f64) / (n_c + n_t);
    let se_pool = (p_pool * (1.0 - p_pool) * (1.0 / n_c + 1.0 / n_t)).sqrt();

    // Both arms all-zero or all-one: no variance to test against.
    let (z_score, p_value) = if se_pool == 0.0 {
        (0.0, 1.0)
    } else {
        let z = uplift / se_pool;
        let p = 2.0 * (1.0 - normal.cdf(z.abs()));
        (z, p.clamp(0.0, 1.0))
    };

    let margin = critical_value(&normal, alpha) * se_pool;

    Ok(ComparisonResult {
        rate_control,
        rate_treatment,
        uplift,
        z_score,
        p_value,
        ci_lower: uplift - margin,
        ci_upper: uplift + margin,
        significant: p_value < alpha,
    })
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Maps a comparison onto a verdict and a one-line recommendation.
pub fn describe(result: &ComparisonResult, alpha: f64) -> Recommendation {
    let (verdict, message) = if result.significant {
        (
            Verdict::Significant,
            format!(
                "Launch the treatment variant: it converts {} {} than control.",
                percent(result.uplift.abs()),
                if result.uplift < 0.0 { "worse" } else { "better" }
            ),
        )
    } else {
        (
            Verdict::NotSignificant,
            "Continue testing or collect more data before deciding.".to_string(),
        )
    };

    Recommendation {
        verdict,
        uplift: result.uplift,
        p_value: result.p_value,
        ci_lower: result.ci_lower,
        ci_upper: result.ci_upper,
        confidence_level: 1.0 - alpha,
        message,
    }
}
