use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One CSV row keyed by header name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(|v| v.trim())
    }
}

/// Parsed CSV: the header row plus every data row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Successes out of trials for one arm of the experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSample {
    pub successes: u64,
    pub trials: u64,
}

impl GroupSample {
    pub fn new(successes: u64, trials: u64) -> Self {
        Self { successes, trials }
    }

    pub fn rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub rate_control: f64,
    pub rate_treatment: f64,
    pub uplift: f64,
    pub z_score: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Significant,
    NotSignificant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub verdict: Verdict,
    pub uplift: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence_level: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub label: String,
    pub sample: GroupSample,
    pub rate: f64,
}

impl GroupSummary {
    pub fn new(label: impl Into<String>, sample: GroupSample) -> Self {
        Self {
            label: label.into(),
            rate: sample.rate(),
            sample,
        }
    }
}

/// How raw rows are validated, filtered and reduced before comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
#[serde(default)]
pub struct DatasetPolicy {
    #[cfg_attr(feature = "cli", arg(long, default_value = "group"))]
    pub group_column: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "control"))]
    pub control_label: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "treatment"))]
    pub treatment_label: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "converted"))]
    pub converted_column: String,

    /// Used when the conversion column is absent: converted = count >= 1
    #[cfg_attr(feature = "cli", arg(long, default_value = "# of Purchase"))]
    pub purchase_column: String,

    /// Keep only rows where control saw the control page and treatment saw the treatment page
    #[cfg_attr(feature = "cli", arg(long))]
    pub require_landing_page_consistency: bool,

    #[cfg_attr(feature = "cli", arg(long, default_value = "landing_page"))]
    pub landing_page_column: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "old_page"))]
    pub control_landing_page: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "new_page"))]
    pub treatment_landing_page: String,

    /// Drop repeated rows for the same value of this column, keeping the first
    #[cfg_attr(feature = "cli", arg(long))]
    pub dedupe_by: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, default_value = "10"))]
    pub min_samples_per_group: u64,
}

impl Default for DatasetPolicy {
    fn default() -> Self {
        Self {
            group_column: "group".to_string(),
            control_label: "control".to_string(),
            treatment_label: "treatment".to_string(),
            converted_column: "converted".to_string(),
            purchase_column: "# of Purchase".to_string(),
            require_landing_page_consistency: false,
            landing_page_column: "landing_page".to_string(),
            control_landing_page: "old_page".to_string(),
            treatment_landing_page: "new_page".to_string(),
            dedupe_by: None,
            min_samples_per_group: 10,
        }
    }
}

/// Two reduced groups plus bookkeeping from the filtering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedDataset {
    pub control: GroupSample,
    pub treatment: GroupSample,
    pub rows_read: usize,
    pub rows_used: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub control: GroupSummary,
    pub treatment: GroupSummary,
    pub result: ComparisonResult,
    pub recommendation: Recommendation,
    pub warnings: Vec<String>,
    pub rows_read: usize,
    pub rows_used: usize,
    pub markdown: String,
    pub json: String,
    pub groups_csv: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub output_path: String,
    pub recommendation: Recommendation,
    pub warnings: Vec<String>,
}
