use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_range,
    validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// API key 只從環境讀取（支援 .env），不接受旗標，避免出現在 shell 歷史
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tidy-agent")]
#[command(about = "An interactive AI data cleaning agent for delimited tabular files")]
pub struct CliConfig {
    /// CSV file to load
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Model used for the data audit
    #[arg(long, default_value = "gemini-2.5-pro")]
    pub audit_model: String,

    /// Model used for cleaning-script generation
    #[arg(long, default_value = "gemini-2.0-flash")]
    pub codegen_model: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Rows included in the audit prompt sample
    #[arg(long, default_value = "50")]
    pub sample_rows: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process stats after each stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn audit_model(&self) -> &str {
        &self.audit_model
    }

    fn codegen_model(&self) -> &str {
        &self.codegen_model
    }

    fn sample_rows(&self) -> usize {
        self.sample_rows
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &["csv"])?;
        validate_path("output_path", &self.output_path)?;
        validate_non_empty_string("audit_model", &self.audit_model)?;
        validate_non_empty_string("codegen_model", &self.codegen_model)?;
        validate_range("sample_rows", self.sample_rows, 1, 500)?;
        Ok(())
    }
}
