use crate::config::{default_alpha, default_formats};
use crate::core::pipeline::VALID_FORMATS;
use crate::core::ConfigProvider;
use crate::domain::model::DatasetPolicy;
use crate::utils::error::{AnalysisError, Result};
use crate::utils::validation::{
    validate_alpha, validate_input_extension, validate_output_formats, validate_path,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub dataset: DatasetPolicy,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default = "default_name")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

fn default_name() -> String {
    "ab-test".to_string()
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            alpha: default_alpha(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_archive")]
    pub archive: bool,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_archive() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            formats: default_formats(),
            archive: default_archive(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub verbose: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalysisError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INPUT_CSV})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        let input = validate_required_field("source.input_path", &self.source.input_path)?;
        validate_path("source.input_path", input)?;
        validate_input_extension("source.input_path", input, &["csv"])?;

        validate_path("output.output_path", &self.output.output_path)?;
        validate_alpha("analysis.alpha", self.analysis.alpha)?;
        validate_output_formats("output.formats", &self.output.formats, &VALID_FORMATS)?;

        self.dataset.validate()
    }

    pub fn logging_json(&self) -> bool {
        self.logging.as_ref().map(|l| l.json).unwrap_or(false)
    }

    pub fn logging_verbose(&self) -> bool {
        self.logging.as_ref().map(|l| l.verbose).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.source.input_path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn alpha(&self) -> f64 {
        self.analysis.alpha
    }

    fn policy(&self) -> &DatasetPolicy {
        &self.dataset
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn archive(&self) -> bool {
        self.output.archive
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
