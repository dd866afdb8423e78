use crate::core::comparison::{compare, describe};
use crate::core::dataset::{parse_dataset, reduce};
use crate::core::report::{render_groups_csv, render_json, render_markdown, ReportContext};
use crate::core::{AnalysisReport, ConfigProvider, Dataset, Pipeline, Storage};
use crate::domain::model::GroupSummary;
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_ARCHIVE: &str = "ab_report.zip";
pub const MARKDOWN_FILE: &str = "report.md";
pub const JSON_FILE: &str = "result.json";
pub const GROUPS_FILE: &str = "groups.csv";

pub const VALID_FORMATS: [&str; 3] = ["markdown", "json", "csv"];

pub struct AnalysisPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> AnalysisPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// Output files selected by the configured formats, in a stable order.
    fn outputs<'r>(&self, report: &'r AnalysisReport) -> Vec<(&'static str, &'r str)> {
        let formats = self.config.output_formats();
        let wanted = |f: &str| formats.iter().any(|x| x == f);

        let mut files = Vec::new();
        if wanted("markdown") {
            files.push((MARKDOWN_FILE, report.markdown.as_str()));
        }
        if wanted("json") {
            files.push((JSON_FILE, report.json.as_str()));
        }
        if wanted("csv") {
            files.push((GROUPS_FILE, report.groups_csv.as_str()));
        }
        files
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AnalysisPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!("Reading input from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        parse_dataset(&bytes)
    }

    async fn transform(&self, dataset: Dataset) -> Result<AnalysisReport> {
        let policy = self.config.policy();
        let alpha = self.config.alpha();

        let reduced = reduce(&dataset, policy)?;
        let result = compare(reduced.control, reduced.treatment, alpha)?;
        let recommendation = describe(&result, alpha);

        tracing::debug!(
            "z = {:.4}, p = {:.5}, CI = ({:.4}, {:.4})",
            result.z_score,
            result.p_value,
            result.ci_lower,
            result.ci_upper
        );

        let control = GroupSummary::new(policy.control_label.clone(), reduced.control);
        let treatment = GroupSummary::new(policy.treatment_label.clone(), reduced.treatment);

        let ctx = ReportContext {
            control: &control,
            treatment: &treatment,
            result: &result,
            recommendation: &recommendation,
            warnings: &reduced.warnings,
            rows_read: reduced.rows_read,
            rows_used: reduced.rows_used,
        };
        let markdown = render_markdown(&ctx);
        let json = render_json(&ctx)?;
        let groups_csv = render_groups_csv(&[&control, &treatment])?;

        Ok(AnalysisReport {
            control,
            treatment,
            result,
            recommendation,
            warnings: reduced.warnings,
            rows_read: reduced.rows_read,
            rows_used: reduced.rows_used,
            markdown,
            json,
            groups_csv,
        })
    }

    async fn load(&self, report: &AnalysisReport) -> Result<String> {
        let files = self.outputs(report);

        if !self.config.archive() {
            for (name, content) in &files {
                let path = self.output_file(name);
                tracing::debug!("Writing {} ({} bytes)", path, content.len());
                self.storage.write_file(&path, content.as_bytes()).await?;
            }
            return Ok(self.config.output_path().to_string());
        }

        tracing::debug!("Creating ZIP file with {} files", files.len());

        // 建立 ZIP 檔案
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, content) in &files {
                zip.start_file::<_, ()>(*name, FileOptions::default())?;
                zip.write_all(content.as_bytes())?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        let path = self.output_file(REPORT_ARCHIVE);
        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&path, &zip_data).await?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DatasetPolicy, Verdict};
    use crate::utils::error::AnalysisError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AnalysisError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
        policy: DatasetPolicy,
        formats: Vec<String>,
        archive: bool,
    }

    impl MockConfig {
        fn new(archive: bool) -> Self {
            Self {
                input_path: "input.csv".to_string(),
                output_path: "out".to_string(),
                policy: DatasetPolicy::default(),
                formats: VALID_FORMATS.iter().map(|f| f.to_string()).collect(),
                archive,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn alpha(&self) -> f64 {
            0.05
        }

        fn policy(&self) -> &DatasetPolicy {
            &self.policy
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn archive(&self) -> bool {
            self.archive
        }
    }

    fn scenario_csv() -> String {
        let mut csv = String::from("group,converted\n");
        for i in 0..150 {
            csv.push_str(&format!("control,{}\n", u8::from(i < 30)));
            csv.push_str(&format!("treatment,{}\n", u8::from(i < 45)));
        }
        csv
    }

    #[tokio::test]
    async fn test_extract_reads_configured_input() {
        let storage = MockStorage::with_file("input.csv", "group,converted\ncontrol,1\n");
        let pipeline = AnalysisPipeline::new(storage, MockConfig::new(true));

        let dataset = pipeline.extract().await.unwrap();
        assert_eq!(dataset.headers, vec!["group", "converted"]);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].get("group"), Some("control"));
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let storage = MockStorage::with_file("other.csv", "");
        let pipeline = AnalysisPipeline::new(storage, MockConfig::new(true));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AnalysisError::IoError(_)));
    }

    #[tokio::test]
    async fn test_transform_scenario() {
        let storage = MockStorage::with_file("input.csv", &scenario_csv());
        let pipeline = AnalysisPipeline::new(storage, MockConfig::new(true));

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();

        assert_eq!(report.control.sample, crate::domain::model::GroupSample::new(30, 150));
        assert_eq!(report.recommendation.verdict, Verdict::Significant);
        assert!(report.warnings.is_empty());
        assert!(report.markdown.contains("Auto Insight"));
        assert!(report.groups_csv.starts_with("group,successes"));
    }

    #[tokio::test]
    async fn test_load_writes_zip_bundle() {
        let storage = MockStorage::with_file("input.csv", &scenario_csv());
        let pipeline = AnalysisPipeline::new(storage.clone(), MockConfig::new(true));

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();
        let path = pipeline.load(&report).await.unwrap();

        assert!(path.ends_with(REPORT_ARCHIVE));
        let zip_data = storage.get_file(&path).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        assert_eq!(archive.len(), 3);
        assert!(names.contains(&MARKDOWN_FILE));
        assert!(names.contains(&JSON_FILE));
        assert!(names.contains(&GROUPS_FILE));
    }

    #[tokio::test]
    async fn test_load_plain_files_for_selected_formats() {
        let storage = MockStorage::with_file("input.csv", &scenario_csv());
        let mut config = MockConfig::new(false);
        config.formats = vec!["json".to_string()];
        let pipeline = AnalysisPipeline::new(storage.clone(), config);

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();
        let path = pipeline.load(&report).await.unwrap();

        assert_eq!(path, "out");
        let json_path = Path::new("out").join(JSON_FILE).to_string_lossy().into_owned();
        assert!(storage.get_file(&json_path).await.is_some());
        let md_path = Path::new("out").join(MARKDOWN_FILE).to_string_lossy().into_owned();
        assert!(storage.get_file(&md_path).await.is_none());
    }
}
