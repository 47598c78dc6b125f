use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Model invocation failed: {message}")]
    ModelError { message: String },

    #[error("Script execution failed: {message}")]
    ScriptError { message: String },

    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Model,
    Script,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 已在管線內部恢復，僅提示用戶
    Low,
    /// 單一階段失敗，Session 狀態保留
    Medium,
    /// 輸入或輸出無法處理
    High,
    /// 啟動前置條件失敗，程式終止
    Critical,
}

impl CleanerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CleanerError::ConfigError { .. }
            | CleanerError::MissingConfigError { .. }
            | CleanerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CleanerError::InputError { .. } | CleanerError::CsvError(_) => ErrorCategory::Input,
            CleanerError::ModelError { .. } => ErrorCategory::Model,
            CleanerError::ScriptError { .. } => ErrorCategory::Script,
            CleanerError::IoError(_) | CleanerError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Model | ErrorCategory::Script => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CleanerError::MissingConfigError { field } => {
                format!("Set the {} environment variable (a .env file next to the binary also works)", field)
            }
            CleanerError::InvalidConfigValueError { field, .. } => {
                format!("Check the value passed for --{}", field.replace('_', "-"))
            }
            CleanerError::ConfigError { .. } => {
                "Review the command-line flags and environment".to_string()
            }
            CleanerError::InputError { .. } | CleanerError::CsvError(_) => {
                "Verify the input file is valid delimited text with a header row".to_string()
            }
            CleanerError::ModelError { .. } => {
                "Check network connectivity and the API key, then re-run the analysis".to_string()
            }
            CleanerError::ScriptError { .. } => {
                "Deselect the offending issue or re-generate the script".to_string()
            }
            CleanerError::IoError(_) => "Check filesystem permissions and paths".to_string(),
            CleanerError::SerializationError(_) => {
                "The model returned malformed data; re-run the stage".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CleanerError::MissingConfigError { field } => {
                format!("API key not found ({} is not set)", field)
            }
            CleanerError::ModelError { message } => format!("The AI call failed: {}", message),
            CleanerError::ScriptError { message } => {
                format!("The cleaning script failed: {}", message)
            }
            CleanerError::InputError { message } => format!("Could not read the file: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CleanerError>;
