//! Startup-time errors.
//!
//! Both types here are fatal: they are reported once and the process exits.

use std::path::PathBuf;
use thiserror::Error;

/// A connection or sink parameter is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ntfy topic is required")]
    MissingTopic,

    #[error("Slack webhook URL is required")]
    MissingSinkUrl,

    #[error("invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("invalid topic format: {0}")]
    InvalidTopic(String),

    #[error("invalid Slack webhook URL format. Must be a valid HTTPS URL: {0}")]
    InvalidSinkUrl(String),

    #[error("invalid post-process webhook URL format. Must be a valid HTTP/HTTPS URL: {0}")]
    InvalidWebhookUrl(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::MissingTopic | ValidationError::MissingSinkUrl => "E_VAL_MISSING",
            ValidationError::InvalidDomain(_) => "E_VAL_DOMAIN",
            ValidationError::InvalidTopic(_) => "E_VAL_TOPIC",
            ValidationError::InvalidSinkUrl(_) | ValidationError::InvalidWebhookUrl(_) => {
                "E_VAL_URL"
            }
            ValidationError::OutOfRange { .. } => "E_VAL_RANGE",
        }
    }
}

/// The post-processing setup is inconsistent or unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "only one post-processing option can be specified: webhook, template file, or inline template"
    )]
    MultiplePostProcessors,

    #[error("failed to read template file {}: {source}", path.display())]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template: {0}")]
    TemplateSyntax(String),

    #[error("template validation failed with {sample} data: {message}")]
    TemplateValidation {
        sample: &'static str,
        message: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::MultiplePostProcessors => "E_CFG_MULTI",
            ConfigError::TemplateFile { .. } => "E_CFG_TPL_FILE",
            ConfigError::TemplateSyntax(_) => "E_CFG_TPL_SYNTAX",
            ConfigError::TemplateValidation { .. } => "E_CFG_TPL_EXEC",
            ConfigError::HttpClient(_) => "E_CFG_HTTP",
        }
    }
}
