//! Command-line argument parsing.
//!
//! Every flag falls back to an environment variable, so the relay can be
//! configured entirely from the environment in a container.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::{
    RelayOptions, DEFAULT_LOG_LEVEL, DEFAULT_NTFY_DOMAIN, DEFAULT_WEBHOOK_MAX_RESPONSE_MB,
    DEFAULT_WEBHOOK_RETRIES, DEFAULT_WEBHOOK_TIMEOUT_SECS,
};

const AFTER_HELP: &str = "\
Post-Processing:
  Only one post-processing option can be specified at a time.
  Templates see Id, Time, Event, Topic, Title and Message; {{.Title}} and {{ Title }} both work.
  Templates use Jinja syntax: Go actions like {{if .Title}}...{{end}} or {{printf ...}} are rejected;
  write {% if Title %}...{% endif %} and filters instead.
  Webhooks receive POST requests with a JSON payload (keys Id, Time, Event, Topic, Title, Message)
  and should return JSON {\"text\": ...} or plain text.";

/// Flags and their environment fallbacks.
#[derive(Clone, Parser)]
#[command(
    name = "ntfy-relay",
    about = "Forwards ntfy messages to a Slack webhook",
    disable_version_flag = true,
    after_help = AFTER_HELP
)]
pub struct Args {
    /// ntfy server to subscribe to
    #[arg(long, env = "NTFY_DOMAIN", default_value = DEFAULT_NTFY_DOMAIN)]
    pub ntfy_domain: String,

    /// ntfy topic to subscribe to
    #[arg(long, env = "NTFY_TOPIC")]
    pub ntfy_topic: Option<String>,

    /// Token for reserved topics
    #[arg(long, env = "NTFY_AUTH", hide_env_values = true)]
    pub ntfy_auth: Option<String>,

    /// Slack webhook URL to send messages to
    #[arg(long, env = "SLACK_WEBHOOK_URL")]
    pub slack_webhook: Option<String>,

    /// Webhook URL for post-processing messages
    #[arg(long, env = "POST_PROCESS_WEBHOOK")]
    pub post_process_webhook: Option<String>,

    /// Template file for post-processing messages
    #[arg(long, env = "POST_PROCESS_TEMPLATE_FILE")]
    pub post_process_template_file: Option<PathBuf>,

    /// Inline template for post-processing messages
    #[arg(long, env = "POST_PROCESS_TEMPLATE")]
    pub post_process_template: Option<String>,

    /// Webhook timeout in seconds
    #[arg(long, env = "WEBHOOK_TIMEOUT_SECONDS", default_value_t = DEFAULT_WEBHOOK_TIMEOUT_SECS)]
    pub webhook_timeout: u64,

    /// Number of webhook retries
    #[arg(long, env = "WEBHOOK_RETRIES", default_value_t = DEFAULT_WEBHOOK_RETRIES as u64)]
    pub webhook_retries: u64,

    /// Maximum webhook response size in MB
    #[arg(long, env = "WEBHOOK_MAX_RESPONSE_SIZE_MB", default_value_t = DEFAULT_WEBHOOK_MAX_RESPONSE_MB)]
    pub webhook_max_response_size: u64,

    /// Log level (debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Print the version and exit
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Args {
    pub fn into_options(self) -> RelayOptions {
        RelayOptions {
            ntfy_domain: self.ntfy_domain,
            ntfy_topic: self.ntfy_topic.unwrap_or_default(),
            ntfy_auth: non_empty(self.ntfy_auth),
            slack_webhook: self.slack_webhook.unwrap_or_default(),
            post_process_webhook: non_empty(self.post_process_webhook),
            post_process_template_file: self
                .post_process_template_file
                .filter(|p| !p.as_os_str().is_empty()),
            post_process_template: non_empty(self.post_process_template),
            webhook_timeout_secs: self.webhook_timeout,
            webhook_retries: self.webhook_retries,
            webhook_max_response_mb: self.webhook_max_response_size,
            log_level: self.log_level,
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Print usage; nothing was configured
    Help,
    /// Print the version
    Version,
    /// Run the relay
    Run(RelayOptions),
}

fn env_is_set(key: &str) -> bool {
    std::env::var(key).map(|v| !v.is_empty()).unwrap_or(false)
}

/// Parse command-line arguments, with environment fallbacks.
///
/// With no arguments and neither `NTFY_TOPIC` nor `SLACK_WEBHOOK_URL` set,
/// the result is [`CliCommand::Help`].
pub fn parse_args<I, T>(args: I) -> Result<CliCommand, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(Into::into).collect();
    let parsed = Args::try_parse_from(&args)?;

    if parsed.version {
        return Ok(CliCommand::Version);
    }
    if args.len() <= 1 && !env_is_set("NTFY_TOPIC") && !env_is_set("SLACK_WEBHOOK_URL") {
        return Ok(CliCommand::Help);
    }
    Ok(CliCommand::Run(parsed.into_options()))
}

/// Print the full help text to stdout.
pub fn print_help() {
    let mut command = Args::command();
    if let Err(e) = command.print_long_help() {
        eprintln!("failed to print help: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "NTFY_DOMAIN",
        "NTFY_TOPIC",
        "NTFY_AUTH",
        "SLACK_WEBHOOK_URL",
        "POST_PROCESS_WEBHOOK",
        "POST_PROCESS_TEMPLATE_FILE",
        "POST_PROCESS_TEMPLATE",
        "WEBHOOK_TIMEOUT_SECONDS",
        "WEBHOOK_RETRIES",
        "WEBHOOK_MAX_RESPONSE_SIZE_MB",
        "LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn run_options(args: &[&str]) -> RelayOptions {
        match parse_args(args.iter().copied()).unwrap() {
            CliCommand::Run(options) => options,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_no_args_no_env_is_help() {
        clear_env();
        assert_eq!(parse_args(["ntfy-relay"]).unwrap(), CliCommand::Help);
    }

    #[test]
    #[serial]
    fn test_version_flag() {
        clear_env();
        assert_eq!(parse_args(["ntfy-relay", "-v"]).unwrap(), CliCommand::Version);
    }

    #[test]
    #[serial]
    fn test_flags_with_defaults() {
        clear_env();
        let options = run_options(&[
            "ntfy-relay",
            "--ntfy-topic",
            "alerts",
            "--slack-webhook",
            "https://hooks.slack.com/x",
        ]);

        assert_eq!(options.ntfy_domain, "ntfy.sh");
        assert_eq!(options.ntfy_topic, "alerts");
        assert_eq!(options.webhook_timeout_secs, 30);
        assert_eq!(options.webhook_retries, 3);
        assert_eq!(options.webhook_max_response_mb, 1);
        assert_eq!(options.log_level, "info");
        assert!(options.ntfy_auth.is_none());
    }

    #[test]
    #[serial]
    fn test_env_fallbacks() {
        clear_env();
        std::env::set_var("NTFY_TOPIC", "from-env");
        std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.com/env");
        std::env::set_var("WEBHOOK_RETRIES", "7");
        std::env::set_var("NTFY_AUTH", "tk_env");

        let options = run_options(&["ntfy-relay"]);
        clear_env();

        assert_eq!(options.ntfy_topic, "from-env");
        assert_eq!(options.slack_webhook, "https://hooks.slack.com/env");
        assert_eq!(options.webhook_retries, 7);
        assert_eq!(options.ntfy_auth.as_deref(), Some("tk_env"));
    }

    #[test]
    #[serial]
    fn test_flag_overrides_env() {
        clear_env();
        std::env::set_var("NTFY_TOPIC", "from-env");

        let options = run_options(&["ntfy-relay", "--ntfy-topic", "from-flag"]);
        clear_env();

        assert_eq!(options.ntfy_topic, "from-flag");
    }

    #[test]
    #[serial]
    fn test_non_numeric_timeout_is_error() {
        clear_env();
        assert!(parse_args(["ntfy-relay", "--webhook-timeout", "soon"]).is_err());
    }
}
