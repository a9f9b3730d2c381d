use ntfy_relay::adapters::ReqwestHttpClient;
use ntfy_relay::cli::{handle_version_command, parse_args, print_help, CliCommand, VERSION};
use ntfy_relay::config::RelayConfig;
use ntfy_relay::error::RelayError;
use ntfy_relay::ntfy::NtfyConnector;
use ntfy_relay::postprocess::build_post_processor;
use ntfy_relay::relay::{RelayPipeline, Supervisor};
use ntfy_relay::sink::WebhookSink;
use ntfy_relay::traits::HttpClient;

use color_eyre::Result;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies.
fn init_logging(level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(level).or_else(|_| EnvFilter::try_new("info"))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
    Ok(())
}

fn exit_fatal(err: &RelayError) -> ! {
    tracing::error!(code = err.error_code(), error = %err, "Fatal configuration error");
    eprintln!("Error: {}", err);
    std::process::exit(1)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let options = match parse_args(std::env::args_os()) {
        Ok(CliCommand::Run(options)) => options,
        Ok(CliCommand::Version) => handle_version_command(),
        Ok(CliCommand::Help) => {
            print_help();
            std::process::exit(1)
        }
        Err(e) => e.exit(),
    };

    init_logging(&options.log_level)?;

    let config = match RelayConfig::from_options(options) {
        Ok(config) => config,
        Err(err) => exit_fatal(&err),
    };
    tracing::info!(version = VERSION, domain = %config.ntfy_domain, topic = %config.ntfy_topic, "ntfy-relay starting");

    let client: Arc<dyn HttpClient> = match ReqwestHttpClient::for_relay() {
        Ok(client) => Arc::new(client),
        Err(err) => exit_fatal(&err.into()),
    };

    let processor = match build_post_processor(&config.post_processor, client.clone()) {
        Ok(processor) => processor,
        Err(err) => exit_fatal(&err.into()),
    };

    let sink = Arc::new(WebhookSink::new(config.slack_webhook.clone(), client.clone()));
    let source = Arc::new(NtfyConnector::new(
        config.ntfy_domain.clone(),
        config.ntfy_topic.clone(),
        config.ntfy_auth.clone(),
        client,
    ));
    let supervisor = Supervisor::new(source, RelayPipeline::new(processor, sink));

    tokio::select! {
        result = supervisor.run() => {
            if let Err(err) = result {
                exit_fatal(&err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
