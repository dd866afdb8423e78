use crate::domain::model::{Dataset, DatasetPolicy, GroupSample, Record, ReducedDataset};
use crate::utils::error::{AnalysisError, Result};
use std::collections::{HashMap, HashSet};

/// Parses CSV bytes with a header row.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let data: HashMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        records.push(Record { data });
    }

    tracing::debug!("Parsed {} rows with columns: {:?}", records.len(), headers);
    Ok(Dataset { headers, records })
}

fn require_column(dataset: &Dataset, column: &str) -> Result<()> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(AnalysisError::MissingColumnError {
            column: column.to_string(),
            available: dataset.headers.join(", "),
        })
    }
}

fn parse_converted(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        other => match other.parse::<f64>() {
            Ok(v) if v == 1.0 => Some(true),
            Ok(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}

fn parse_purchase_count(value: &str) -> Option<bool> {
    match value.parse::<f64>() {
        Ok(count) if count.is_finite() && count >= 0.0 => Some(count >= 1.0),
        _ => None,
    }
}

/// Where the conversion flag of each row comes from.
enum ConversionSource<'a> {
    Flag(&'a str),
    PurchaseCount(&'a str),
}

impl<'a> ConversionSource<'a> {
    fn resolve(dataset: &Dataset, policy: &'a DatasetPolicy) -> Result<Self> {
        if dataset.has_column(&policy.converted_column) {
            Ok(Self::Flag(&policy.converted_column))
        } else if dataset.has_column(&policy.purchase_column) {
            tracing::debug!(
                "No '{}' column, deriving conversions from '{}'",
                policy.converted_column,
                policy.purchase_column
            );
            Ok(Self::PurchaseCount(&policy.purchase_column))
        } else {
            Err(AnalysisError::MissingColumnError {
                column: format!("{}' or '{}", policy.converted_column, policy.purchase_column),
                available: dataset.headers.join(", "),
            })
        }
    }

    fn converted(&self, record: &Record, row: usize) -> Result<bool> {
        let (column, parsed) = match self {
            Self::Flag(column) => (*column, record.get(column).and_then(parse_converted)),
            Self::PurchaseCount(column) => {
                (*column, record.get(column).and_then(parse_purchase_count))
            }
        };
        parsed.ok_or_else(|| {
            AnalysisError::data(format!(
                "row {}: invalid value '{}' in column '{}'",
                row,
                record.get(column).unwrap_or_default(),
                column
            ))
        })
    }
}

/// Applies the policy to raw rows and reduces them to control and treatment samples.
pub fn reduce(dataset: &Dataset, policy: &DatasetPolicy) -> Result<ReducedDataset> {
    require_column(dataset, &policy.group_column)?;
    let source = ConversionSource::resolve(dataset, policy)?;
    if policy.require_landing_page_consistency {
        require_column(dataset, &policy.landing_page_column)?;
    }
    if let Some(key) = &policy.dedupe_by {
        require_column(dataset, key)?;
    }
    if dataset.is_empty() {
        return Err(AnalysisError::data("the dataset has no rows"));
    }
    let records = &dataset.records;

    let mut control = GroupSample::new(0, 0);
    let mut treatment = GroupSample::new(0, 0);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unknown_group = 0usize;
    let mut inconsistent = 0usize;
    let mut duplicates = 0usize;

    for (index, record) in records.iter().enumerate() {
        // 第 1 行是表頭
        let row = index + 2;
        let label = record.get(&policy.group_column).unwrap_or_default();

        let (sample, expected_page) = if label == policy.control_label {
            (&mut control, &policy.control_landing_page)
        } else if label == policy.treatment_label {
            (&mut treatment, &policy.treatment_landing_page)
        } else {
            unknown_group += 1;
            continue;
        };

        if policy.require_landing_page_consistency
            && record.get(&policy.landing_page_column) != Some(expected_page.as_str())
        {
            inconsistent += 1;
            continue;
        }

        if let Some(key) = &policy.dedupe_by {
            let id = record.get(key).unwrap_or_default();
            if !seen.insert(id) {
                duplicates += 1;
                continue;
            }
        }

        let converted = source.converted(record, row)?;
        sample.trials += 1;
        if converted {
            sample.successes += 1;
        }
    }

    if unknown_group > 0 {
        tracing::warn!(
            "Ignored {} rows whose '{}' is neither '{}' nor '{}'",
            unknown_group,
            policy.group_column,
            policy.control_label,
            policy.treatment_label
        );
    }
    if inconsistent > 0 {
        tracing::info!("Dropped {} rows with a mismatched landing page", inconsistent);
    }
    if duplicates > 0 {
        tracing::info!("Dropped {} duplicate rows", duplicates);
    }

    for (label, sample) in [
        (&policy.control_label, &control),
        (&policy.treatment_label, &treatment),
    ] {
        if sample.trials == 0 {
            return Err(AnalysisError::data(format!(
                "no rows left for group '{}' after filtering",
                label
            )));
        }
    }

    let mut warnings = Vec::new();
    for (label, sample) in [
        (&policy.control_label, &control),
        (&policy.treatment_label, &treatment),
    ] {
        if sample.trials < policy.min_samples_per_group {
            let warning = format!(
                "Only {} samples in '{}' (fewer than {}). Results may be unreliable.",
                sample.trials, label, policy.min_samples_per_group
            );
            tracing::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    let rows_used = (control.trials as usize).saturating_add(treatment.trials as usize);
    tracing::debug!(
        "Reduced {} rows to control {}/{} and treatment {}/{}",
        records.len(),
        control.successes,
        control.trials,
        treatment.successes,
        treatment.trials
    );

    Ok(ReducedDataset {
        control,
        treatment,
        rows_read: records.len(),
        rows_used,
        warnings,
    })
}

/// Shape of a generated sample file.
#[derive(Debug, Clone, Copy)]
pub struct SampleSpec {
    pub rows_per_group: u64,
    pub control_conversions: u64,
    pub treatment_conversions: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            rows_per_group: 150,
            control_conversions: 30,
            treatment_conversions: 45,
        }
    }
}

/// Builds a campaign-style CSV (`# of Purchase` per row) for trying the analyzer.
pub fn sample_csv(spec: &SampleSpec) -> Result<String> {
    if spec.rows_per_group == 0
        || spec.control_conversions > spec.rows_per_group
        || spec.treatment_conversions > spec.rows_per_group
    {
        return Err(AnalysisError::invalid_input(format!(
            "cannot place {}/{} conversions in {} rows per group",
            spec.control_conversions, spec.treatment_conversions, spec.rows_per_group
        )));
    }

    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .ok_or_else(|| AnalysisError::data("invalid sample start date"))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Campaign Name", "Date", "group", "# of Purchase"])?;

    for (campaign, group, conversions) in [
        ("Test A", "control", spec.control_conversions),
        ("Test B", "treatment", spec.treatment_conversions),
    ] {
        for i in 0..spec.rows_per_group {
            let date = start + chrono::Duration::days((i % 30) as i64);
            let purchases = if i < conversions { 1 + i % 3 } else { 0 };
            writer.write_record([
                campaign.to_string(),
                date.format("%Y-%m-%d").to_string(),
                group.to_string(),
                purchases.to_string(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AnalysisError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| AnalysisError::data(e.to_string()))
}
