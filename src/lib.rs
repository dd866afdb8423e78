pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    comparison::{compare, describe, DEFAULT_ALPHA},
    engine::AnalysisEngine,
    pipeline::AnalysisPipeline,
};
pub use domain::model::{
    ComparisonResult, DatasetPolicy, GroupSample, Recommendation, Verdict,
};
pub use utils::error::{AnalysisError, Result};
