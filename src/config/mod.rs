pub mod cli;
pub mod toml_config;

use crate::core::comparison::DEFAULT_ALPHA;
use crate::core::pipeline::VALID_FORMATS;
use crate::domain::model::DatasetPolicy;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};

impl Validate for DatasetPolicy {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("group_column", &self.group_column)?;
        validate_non_empty_string("control_label", &self.control_label)?;
        validate_non_empty_string("treatment_label", &self.treatment_label)?;
        validate_non_empty_string("converted_column", &self.converted_column)?;
        validate_non_empty_string("purchase_column", &self.purchase_column)?;

        if self.control_label == self.treatment_label {
            return Err(crate::utils::error::AnalysisError::InvalidConfigValueError {
                field: "treatment_label".to_string(),
                value: self.treatment_label.clone(),
                reason: "Control and treatment labels must differ".to_string(),
            });
        }

        if self.require_landing_page_consistency {
            validate_non_empty_string("landing_page_column", &self.landing_page_column)?;
        }

        if let Some(column) = &self.dedupe_by {
            validate_non_empty_string("dedupe_by", column)?;
        }

        Ok(())
    }
}

pub fn default_formats() -> Vec<String> {
    VALID_FORMATS.iter().map(|f| f.to_string()).collect()
}

pub fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

#[cfg(feature = "cli")]
mod cli_config {
    use super::*;
    use crate::core::ConfigProvider;
    use crate::utils::validation::{
        validate_alpha, validate_input_extension, validate_output_formats, validate_path,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "ab-insight")]
    #[command(about = "Significance test and recommendation for A/B conversion data")]
    pub struct CliConfig {
        /// CSV file with one row per user
        #[arg(short, long)]
        pub input: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        /// Significance level for the two-sided test
        #[arg(long, default_value_t = DEFAULT_ALPHA)]
        pub alpha: f64,

        #[arg(long, value_delimiter = ',', default_values_t = default_formats())]
        pub formats: Vec<String>,

        /// Write report files directly instead of a ZIP bundle
        #[arg(long)]
        pub no_archive: bool,

        #[command(flatten)]
        pub policy: DatasetPolicy,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn alpha(&self) -> f64 {
            self.alpha
        }

        fn policy(&self) -> &DatasetPolicy {
            &self.policy
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn archive(&self) -> bool {
            !self.no_archive
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("input", &self.input)?;
            validate_input_extension("input", &self.input, &["csv"])?;
            validate_path("output_path", &self.output_path)?;
            validate_alpha("alpha", self.alpha)?;
            validate_output_formats("formats", &self.formats, &VALID_FORMATS)?;
            self.policy.validate()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_defaults() {
            let config = CliConfig::parse_from(["ab-insight", "--input", "data.csv"]);

            assert_eq!(config.input, "data.csv");
            assert_eq!(config.alpha, 0.05);
            assert_eq!(config.formats, vec!["markdown", "json", "csv"]);
            assert!(config.archive());
            assert_eq!(config.policy, DatasetPolicy::default());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_parse_policy_flags() {
            let config = CliConfig::parse_from([
                "ab-insight",
                "-i",
                "ab_data.csv",
                "--alpha",
                "0.01",
                "--formats",
                "json,csv",
                "--no-archive",
                "--require-landing-page-consistency",
                "--dedupe-by",
                "user_id",
            ]);

            assert_eq!(config.alpha, 0.01);
            assert_eq!(config.formats, vec!["json", "csv"]);
            assert!(!config.archive());
            assert!(config.policy.require_landing_page_consistency);
            assert_eq!(config.policy.dedupe_by.as_deref(), Some("user_id"));
        }

        #[test]
        fn test_validation_rejects_bad_values() {
            let mut config = CliConfig::parse_from(["ab-insight", "--input", "data.csv"]);
            config.alpha = 1.2;
            assert!(config.validate().is_err());

            let mut config = CliConfig::parse_from(["ab-insight", "--input", "data.xlsx"]);
            assert!(config.validate().is_err());
            config.input = "data.csv".to_string();
            config.formats = vec!["pdf".to_string()];
            assert!(config.validate().is_err());

            let mut config = CliConfig::parse_from(["ab-insight", "--input", "data.csv"]);
            config.policy.treatment_label = "control".to_string();
            assert!(config.validate().is_err());
        }
    }
}

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;
