use crate::domain::model::{ComparisonResult, GroupSummary, Recommendation, Verdict};
use crate::utils::error::{AnalysisError, Result};
use serde::Serialize;

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Everything the renderers need, borrowed from the pipeline.
pub struct ReportContext<'a> {
    pub control: &'a GroupSummary,
    pub treatment: &'a GroupSummary,
    pub result: &'a ComparisonResult,
    pub recommendation: &'a Recommendation,
    pub warnings: &'a [String],
    pub rows_read: usize,
    pub rows_used: usize,
}

pub fn render_insight(rec: &Recommendation) -> String {
    let level = format!("{:.0}%", rec.confidence_level * 100.0);
    let ci = format!("({}, {})", percent(rec.ci_lower), percent(rec.ci_upper));

    match rec.verdict {
        Verdict::Significant => format!(
            "✅ **Statistically significant difference detected**\n\n\
             The treatment shows an uplift of **{}** over control.  \n\
             p-value = {:.5}  \n\
             {} CI = {}  \n\
             **Recommendation:** {}\n",
            percent(rec.uplift),
            rec.p_value,
            level,
            ci,
            rec.message
        ),
        Verdict::NotSignificant => format!(
            "⚠️ **No statistically significant difference detected**\n\n\
             Observed uplift = **{}**  \n\
             p-value = {:.5}  \n\
             {} CI = {}  \n\
             **Recommendation:** {}\n",
            percent(rec.uplift),
            rec.p_value,
            level,
            ci,
            rec.message
        ),
    }
}

pub fn render_markdown(ctx: &ReportContext<'_>) -> String {
    let mut out = String::new();

    out.push_str("# A/B Test Report\n\n");
    out.push_str(&format!(
        "_Generated {}. {} rows read, {} used._\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        ctx.rows_read,
        ctx.rows_used
    ));

    out.push_str("## Key Metrics\n\n");
    out.push_str("| Group | Conversions | Samples | Conversion rate |\n");
    out.push_str("|---|---:|---:|---:|\n");
    for group in [ctx.control, ctx.treatment] {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            group.label,
            group.sample.successes,
            group.sample.trials,
            percent(group.rate)
        ));
    }
    out.push_str(&format!(
        "\nUplift: **{}** (z = {:.4})\n\n",
        percent(ctx.result.uplift),
        ctx.result.z_score
    ));

    if !ctx.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in ctx.warnings {
            out.push_str(&format!("- ⚠️ {}\n", warning));
        }
        out.push('\n');
    }

    out.push_str("## Auto Insight\n\n");
    out.push_str(&render_insight(ctx.recommendation));
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    rows_read: usize,
    rows_used: usize,
    control: &'a GroupSummary,
    treatment: &'a GroupSummary,
    result: &'a ComparisonResult,
    recommendation: &'a Recommendation,
    warnings: &'a [String],
}

pub fn render_json(ctx: &ReportContext<'_>) -> Result<String> {
    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        rows_read: ctx.rows_read,
        rows_used: ctx.rows_used,
        control: ctx.control,
        treatment: ctx.treatment,
        result: ctx.result,
        recommendation: ctx.recommendation,
        warnings: ctx.warnings,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Per-group rates, the data behind the comparison chart.
pub fn render_groups_csv(groups: &[&GroupSummary]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["group", "successes", "trials", "conversion_rate"])?;
    for group in groups {
        writer.write_record([
            group.label.clone(),
            group.sample.successes.to_string(),
            group.sample.trials.to_string(),
            format!("{:.6}", group.rate),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AnalysisError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::data(e.to_string()))
}
