use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Missing required column '{column}' (available: {available})")]
    MissingColumnError { column: String, available: String },

    #[error("Data processing error: {message}")]
    DataError { message: String },

    #[error("Statistics error: {message}")]
    StatisticsError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Io,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalysisError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::DataError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::MissingColumnError { .. } | Self::DataError { .. } | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::StatisticsError { .. } | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => {
                "Each group needs at least one trial and no more successes than trials"
            }
            Self::MissingColumnError { .. } => {
                "Add a 'group' column plus either 'converted' or '# of Purchase', or point the column options at your headers"
            }
            Self::DataError { .. } => {
                "Check that both groups have rows left after filtering and that conversion values are 0/1"
            }
            Self::CsvError(_) => "Make sure the file is a comma-separated CSV with a header row",
            Self::IoError(_) => "Check that the input file exists and the output directory is writable",
            Self::ZipError(_) => "Retry with --no-archive to write plain report files",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration value and run again",
            Self::StatisticsError { .. } | Self::SerializationError(_) => {
                "This is likely a bug; please report it with the input file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidInput { message } => format!("Cannot compare the groups: {}", message),
            Self::MissingColumnError { column, .. } => {
                format!("Required column missing: '{}'", column)
            }
            Self::DataError { message } => format!("Problem with the uploaded data: {}", message),
            Self::CsvError(e) => format!("Could not read the CSV file: {}", e),
            Self::IoError(e) => format!("File error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
