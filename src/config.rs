//! Relay configuration.
//!
//! [`RelayOptions`] holds raw values as collected from flags and environment;
//! [`RelayConfig`] is the immutable, validated form handed to every component
//! constructor at startup.
//!
//! # Example
//!
//! ```ignore
//! use ntfy_relay::config::{RelayConfig, RelayOptions};
//!
//! let options = RelayOptions::new("alerts", "https://hooks.slack.com/services/X")
//!     .with_template("{{.Title}}: {{.Message}}");
//! let config = RelayConfig::from_options(options)?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, RelayError, ValidationError};

/// Default ntfy server.
pub const DEFAULT_NTFY_DOMAIN: &str = "ntfy.sh";
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEBHOOK_RETRIES: u32 = 3;
pub const DEFAULT_WEBHOOK_MAX_RESPONSE_MB: u64 = 1;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const WEBHOOK_TIMEOUT_RANGE: (u64, u64) = (1, 300);
pub const WEBHOOK_RETRIES_RANGE: (u64, u64) = (0, 10);
pub const WEBHOOK_MAX_RESPONSE_RANGE: (u64, u64) = (1, 100);

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z]{2,})+$")
        .expect("Invalid domain regex pattern")
});

static TOPIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").expect("Invalid topic regex pattern")
});

/// Check that `domain` looks like a DNS name with a TLD.
pub fn validate_domain(domain: &str) -> Result<&str, ValidationError> {
    if DOMAIN_RE.is_match(domain) {
        Ok(domain)
    } else {
        Err(ValidationError::InvalidDomain(domain.to_string()))
    }
}

/// Check that `topic` is 1-64 characters of `[a-zA-Z0-9_-]`.
pub fn validate_topic(topic: &str) -> Result<&str, ValidationError> {
    if TOPIC_RE.is_match(topic) {
        Ok(topic)
    } else {
        Err(ValidationError::InvalidTopic(topic.to_string()))
    }
}

fn has_scheme(raw: &str, schemes: &[&str]) -> bool {
    match Url::parse(raw) {
        Ok(url) => schemes.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

fn check_range(field: &'static str, value: u64, (min, max): (u64, u64)) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Raw configuration values before validation.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayOptions {
    pub ntfy_domain: String,
    pub ntfy_topic: String,
    pub ntfy_auth: Option<String>,
    pub slack_webhook: String,
    pub post_process_webhook: Option<String>,
    pub post_process_template_file: Option<PathBuf>,
    pub post_process_template: Option<String>,
    pub webhook_timeout_secs: u64,
    pub webhook_retries: u64,
    pub webhook_max_response_mb: u64,
    pub log_level: String,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            ntfy_domain: DEFAULT_NTFY_DOMAIN.to_string(),
            ntfy_topic: String::new(),
            ntfy_auth: None,
            slack_webhook: String::new(),
            post_process_webhook: None,
            post_process_template_file: None,
            post_process_template: None,
            webhook_timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
            webhook_retries: DEFAULT_WEBHOOK_RETRIES as u64,
            webhook_max_response_mb: DEFAULT_WEBHOOK_MAX_RESPONSE_MB,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl fmt::Debug for RelayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayOptions")
            .field("ntfy_domain", &self.ntfy_domain)
            .field("ntfy_topic", &self.ntfy_topic)
            .field("ntfy_auth", &self.ntfy_auth.as_ref().map(|_| "<redacted>"))
            .field("slack_webhook", &self.slack_webhook)
            .field("post_process_webhook", &self.post_process_webhook)
            .field("post_process_template_file", &self.post_process_template_file)
            .field("post_process_template", &self.post_process_template)
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("webhook_retries", &self.webhook_retries)
            .field("webhook_max_response_mb", &self.webhook_max_response_mb)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl RelayOptions {
    /// Options with defaults for everything but the required fields.
    pub fn new(topic: impl Into<String>, slack_webhook: impl Into<String>) -> Self {
        Self {
            ntfy_topic: topic.into(),
            slack_webhook: slack_webhook.into(),
            ..Self::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.ntfy_domain = domain.into();
        self
    }

    pub fn with_auth(mut self, token: impl Into<String>) -> Self {
        self.ntfy_auth = Some(token.into());
        self
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.post_process_webhook = Some(url.into());
        self
    }

    pub fn with_template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.post_process_template_file = Some(path.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.post_process_template = Some(template.into());
        self
    }

    pub fn with_webhook_limits(mut self, timeout_secs: u64, retries: u64, max_response_mb: u64) -> Self {
        self.webhook_timeout_secs = timeout_secs;
        self.webhook_retries = retries;
        self.webhook_max_response_mb = max_response_mb;
        self
    }

    /// Number of post-processing options set.
    fn post_processor_count(&self) -> usize {
        [
            self.post_process_webhook.is_some(),
            self.post_process_template_file.is_some(),
            self.post_process_template.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Settings for the webhook post-processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    pub url: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub max_response_mb: u64,
}

impl WebhookSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            max_retries: DEFAULT_WEBHOOK_RETRIES,
            max_response_mb: DEFAULT_WEBHOOK_MAX_RESPONSE_MB,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_response_mb(mut self, mb: u64) -> Self {
        self.max_response_mb = mb;
        self
    }
}

/// Where a template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    File(PathBuf),
}

/// The single post-processor selected at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostProcessorConfig {
    #[default]
    None,
    Template(TemplateSource),
    Webhook(WebhookSettings),
}

impl PostProcessorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            PostProcessorConfig::None => "none",
            PostProcessorConfig::Template(_) => "template",
            PostProcessorConfig::Webhook(_) => "webhook",
        }
    }
}

/// Immutable relay configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub ntfy_domain: String,
    pub ntfy_topic: String,
    pub ntfy_auth: Option<String>,
    pub slack_webhook: String,
    pub post_processor: PostProcessorConfig,
    pub log_level: String,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("ntfy_domain", &self.ntfy_domain)
            .field("ntfy_topic", &self.ntfy_topic)
            .field("ntfy_auth", &self.ntfy_auth.as_ref().map(|_| "<redacted>"))
            .field("slack_webhook", &self.slack_webhook)
            .field("post_processor", &self.post_processor)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl RelayConfig {
    /// Validate raw options and build the config.
    pub fn from_options(options: RelayOptions) -> Result<Self, RelayError> {
        Self::check_options(&options)?;

        let post_processor = if let Some(url) = options.post_process_webhook {
            PostProcessorConfig::Webhook(WebhookSettings {
                url,
                timeout: Duration::from_secs(options.webhook_timeout_secs),
                max_retries: options.webhook_retries as u32,
                max_response_mb: options.webhook_max_response_mb,
            })
        } else if let Some(path) = options.post_process_template_file {
            PostProcessorConfig::Template(TemplateSource::File(path))
        } else if let Some(template) = options.post_process_template {
            PostProcessorConfig::Template(TemplateSource::Inline(template))
        } else {
            PostProcessorConfig::None
        };

        let config = Self {
            ntfy_domain: options.ntfy_domain,
            ntfy_topic: options.ntfy_topic,
            ntfy_auth: options.ntfy_auth.filter(|token| !token.is_empty()),
            slack_webhook: options.slack_webhook,
            post_processor,
            log_level: options.log_level,
        };
        config.validate()?;
        Ok(config)
    }

    fn check_options(options: &RelayOptions) -> Result<(), RelayError> {
        if options.post_processor_count() > 1 {
            return Err(ConfigError::MultiplePostProcessors.into());
        }
        if options.post_process_webhook.is_some() {
            check_range("webhook timeout", options.webhook_timeout_secs, WEBHOOK_TIMEOUT_RANGE)?;
            check_range("webhook retries", options.webhook_retries, WEBHOOK_RETRIES_RANGE)?;
            check_range(
                "webhook max response size (MB)",
                options.webhook_max_response_mb,
                WEBHOOK_MAX_RESPONSE_RANGE,
            )?;
        }
        Ok(())
    }

    /// Check every structural constraint.
    ///
    /// Order matches what an operator fixes first: required fields, then
    /// formats, then post-processor settings.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.ntfy_topic.is_empty() {
            return Err(ValidationError::MissingTopic.into());
        }
        if self.slack_webhook.is_empty() {
            return Err(ValidationError::MissingSinkUrl.into());
        }
        validate_domain(&self.ntfy_domain)?;
        validate_topic(&self.ntfy_topic)?;
        if !has_scheme(&self.slack_webhook, &["https"]) {
            return Err(ValidationError::InvalidSinkUrl(self.slack_webhook.clone()).into());
        }

        if let PostProcessorConfig::Webhook(settings) = &self.post_processor {
            if !has_scheme(&settings.url, &["http", "https"]) {
                return Err(ValidationError::InvalidWebhookUrl(settings.url.clone()).into());
            }
            check_range("webhook timeout", settings.timeout.as_secs(), WEBHOOK_TIMEOUT_RANGE)?;
            check_range(
                "webhook retries",
                u64::from(settings.max_retries),
                WEBHOOK_RETRIES_RANGE,
            )?;
            check_range(
                "webhook max response size (MB)",
                settings.max_response_mb,
                WEBHOOK_MAX_RESPONSE_RANGE,
            )?;
        }
        Ok(())
    }
}
