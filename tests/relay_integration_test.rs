//! Integration tests for the relay pipeline.
//!
//! These tests feed ntfy stream bodies through the full pipeline:
//! - Default formatting scenarios
//! - Malformed lines interleaved with valid ones
//! - Template and webhook post-processing, including fallback
//! - Reconnect supervision over a scripted source

mod common;

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use ntfy_relay::config::{PostProcessorConfig, TemplateSource, WebhookSettings};
use ntfy_relay::error::RelayError;
use ntfy_relay::ntfy::parse_all;
use ntfy_relay::postprocess::DefaultFormatter;
use ntfy_relay::relay::{ConnectionOutcome, RelayPipeline, Supervisor, SupervisorState};
use tokio::time::Instant;

const HOOK_URL: &str = "https://transform.example.com/hook";

// ============================================================================
// Default formatting
// ============================================================================

#[tokio::test]
async fn test_message_without_title_is_body_only() {
    let relay = TestRelay::new();

    let outcome = relay
        .run_lines(&[r#"{"event":"message","title":"","message":"ping"}"#.to_string()])
        .await;

    assert_eq!(outcome, ConnectionOutcome::Eof);
    assert_eq!(relay.sink.texts(), vec!["ping"]);
}

#[tokio::test]
async fn test_message_with_title_is_bold_prefixed() {
    let relay = TestRelay::new();

    relay
        .run_lines(&[r#"{"event":"message","title":"Alert","message":"Down"}"#.to_string()])
        .await;

    assert_eq!(relay.sink.texts(), vec!["**Alert**: Down"]);
}

#[tokio::test]
async fn test_control_events_are_not_delivered() {
    let relay = TestRelay::new();

    relay
        .run_lines(&[
            kind_line("open"),
            kind_line("keepalive"),
            kind_line("poll_request"),
            message_line("", "only this"),
            kind_line("keepalive"),
        ])
        .await;

    assert_eq!(relay.sink.texts(), vec!["only this"]);
}

// ============================================================================
// Malformed input
// ============================================================================

#[tokio::test]
async fn test_malformed_lines_are_skipped_in_arrival_order() {
    let relay = TestRelay::new();
    let lines = vec![
        message_line("", "first"),
        "this is not json".to_string(),
        message_line("", "second"),
        "{\"event\":\"message\",".to_string(),
        "[]".to_string(),
        message_line("T", "third"),
    ];

    let outcome = relay.run_lines(&lines).await;

    assert_eq!(outcome, ConnectionOutcome::Eof);
    assert_eq!(relay.sink.texts(), vec!["first", "second", "**T**: third"]);
}

#[test]
fn test_parser_is_a_pure_function_of_input() {
    let body = stream_body(&[
        kind_line("open"),
        "garbage".to_string(),
        message_line("a", "b"),
        message_line("", "c"),
    ]);

    let first = parse_all(body.as_bytes());
    let second = parse_all(body.as_bytes());

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[tokio::test]
async fn test_events_split_across_tiny_chunks() {
    let sink = RecordingSink::new();
    let pipeline = RelayPipeline::new(Box::new(DefaultFormatter), Arc::new(sink.clone()));
    let body = stream_body(&[message_line("Split", "across chunks"), message_line("", "two")]);

    pipeline.run(chunked_stream(&body, 1)).await;

    assert_eq!(sink.texts(), vec!["**Split**: across chunks", "two"]);
}

// ============================================================================
// Post-processing
// ============================================================================

#[tokio::test]
async fn test_inline_template_renders_fields() {
    let relay = TestRelay::with_post_processor(&PostProcessorConfig::Template(
        TemplateSource::Inline("{{.Title}}: {{.Message}}".to_string()),
    ));

    relay.run_lines(&[message_line("A", "B")]).await;

    assert_eq!(relay.sink.texts(), vec!["A: B"]);
}

#[tokio::test]
async fn test_template_file_renders_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slack.tpl");
    std::fs::write(&path, "[{{ Topic }}] {{ Message }}").unwrap();

    let relay = TestRelay::with_post_processor(&PostProcessorConfig::Template(
        TemplateSource::File(path),
    ));
    relay.run_lines(&[message_line("ignored", "disk full")]).await;

    assert_eq!(relay.sink.texts(), vec!["[alerts] disk full"]);
}

#[tokio::test]
async fn test_webhook_reply_becomes_text() {
    let relay = TestRelay::with_post_processor(&PostProcessorConfig::Webhook(
        WebhookSettings::new(HOOK_URL),
    ));
    relay.client.set_response(
        HOOK_URL,
        MockResponse::Success(Response::new(200, Bytes::from(r#"{"text":"enriched"}"#))),
    );

    relay.run_lines(&[message_line("A", "B")]).await;

    assert_eq!(relay.sink.texts(), vec!["enriched"]);
}

#[tokio::test]
async fn test_webhook_rejection_falls_back_to_default_format() {
    let relay = TestRelay::with_post_processor(&PostProcessorConfig::Webhook(
        WebhookSettings::new(HOOK_URL).with_max_retries(3),
    ));
    relay.client.set_response(
        HOOK_URL,
        MockResponse::Success(Response::new(422, Bytes::from("unprocessable"))),
    );

    relay.run_lines(&[message_line("Alert", "Down")]).await;

    assert_eq!(relay.client.call_count(), 1);
    assert_eq!(relay.sink.texts(), vec!["**Alert**: Down"]);
}

#[tokio::test(start_paused = true)]
async fn test_webhook_exhaustion_falls_back_after_all_attempts() {
    let relay = TestRelay::with_post_processor(&PostProcessorConfig::Webhook(
        WebhookSettings::new(HOOK_URL).with_max_retries(2),
    ));
    relay.client.set_response(
        HOOK_URL,
        MockResponse::Success(Response::new(500, Bytes::from("down"))),
    );

    relay.run_lines(&[message_line("", "still delivered")]).await;

    assert_eq!(relay.client.call_count(), 3);
    assert_eq!(relay.sink.texts(), vec!["still delivered"]);
}

// ============================================================================
// Supervision
// ============================================================================

fn supervisor(source: ScriptedSource, sink: &RecordingSink) -> Supervisor {
    let pipeline = RelayPipeline::new(Box::new(DefaultFormatter), Arc::new(sink.clone()));
    Supervisor::new(Arc::new(source), pipeline)
}

#[tokio::test(start_paused = true)]
async fn test_validation_failure_reported_without_delay() {
    let source = ScriptedSource::new(vec![SourceStep::Invalid]);
    let sink = RecordingSink::new();
    let supervisor = supervisor(source.clone(), &sink);
    let started = Instant::now();

    let err = supervisor.run().await.unwrap_err();

    assert!(matches!(err, RelayError::Validation(_)));
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(source.connects(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnects_after_refusal_and_eof() {
    let source = ScriptedSource::new(vec![
        SourceStep::Refuse(502),
        SourceStep::Stream(stream_body(&[message_line("", "one")])),
        SourceStep::Stream(stream_body(&[message_line("", "two")])),
        SourceStep::Invalid,
    ]);
    let sink = RecordingSink::new();
    let supervisor = supervisor(source.clone(), &sink).with_reconnect_delay(Duration::from_secs(30));
    let started = Instant::now();

    let err = supervisor.run().await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(source.connects(), 4);
    assert_eq!(sink.texts(), vec!["one", "two"]);
    // refusal, then two stream ends
    assert!(started.elapsed() >= Duration::from_secs(90));
}

#[tokio::test(start_paused = true)]
async fn test_single_step_transitions() {
    let source = ScriptedSource::new(vec![SourceStep::Stream(stream_body(&[message_line(
        "", "x",
    )]))]);
    let sink = RecordingSink::new();
    let supervisor = supervisor(source, &sink).with_reconnect_delay(Duration::from_secs(1));

    let relaying = supervisor.step(SupervisorState::Connecting).await.unwrap();
    assert!(matches!(relaying, SupervisorState::Relaying(_)));

    let connecting = supervisor.step(relaying).await.unwrap();
    assert!(connecting.is_connecting());
    assert_eq!(sink.texts(), vec!["x"]);
}
