// File: discolytics-core/tests/unit/command_timer_tests.rs

use std::sync::Arc;

use http::Method;
use serde_json::json;

use discolytics_core::clock::ManualClock;
use discolytics_core::{ClientConfig, CommandMode, Discolytics};

use crate::helpers::*;

fn client_with_clock(
    config: ClientConfig,
    transport: Arc<RecordingTransport>,
    clock: Arc<ManualClock>,
) -> Discolytics {
    Discolytics::builder(config)
        .transport(transport)
        .clock(clock)
        .log_sink(CapturingSink::new())
        .sampler(Arc::new(StaticSampler(None)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn buffered_timer_reports_elapsed_millis_on_flush() {
    let transport = RecordingTransport::new();
    let clock = Arc::new(ManualClock::new(5_000));
    let client = client_with_clock(secondary_config(), transport.clone(), clock.clone());

    let timer = client.start_command("ping", "u1");
    clock.advance(250);
    assert!(timer.end(Some(json!({ "ok": true }))).await.success);

    assert_eq!(client.pending().commands, 1);
    assert!(transport.requests().is_empty());

    client.flush().await;
    let posted = transport.requests_to(Method::POST, "/commands");
    assert_eq!(
        body_of(&posted[0]),
        json!({ "commands": [
            { "name": "ping", "userId": "u1", "duration": 250, "metadata": { "ok": true } }
        ]})
    );
}

#[tokio::test]
async fn immediate_mode_posts_each_command_on_its_own() {
    let transport = RecordingTransport::new();
    let clock = Arc::new(ManualClock::new(0));
    let config = config_builder()
        .primary(false)
        .command_mode(CommandMode::Immediate)
        .build()
        .unwrap();
    let client = client_with_clock(config, transport.clone(), clock.clone());

    let timer = client.start_command("ban", "u2");
    clock.advance(40);
    assert!(timer.end(None).await.success);

    assert_eq!(client.pending().commands, 0);
    let posted = transport.requests_to(Method::POST, "/bots/123/command");
    assert_eq!(posted.len(), 1);
    assert_eq!(
        body_of(&posted[0]),
        json!({ "name": "ban", "userId": "u2", "duration": 40 })
    );
    assert!(transport.requests_to(Method::POST, "/commands").is_empty());
}

#[tokio::test]
async fn immediate_mode_failure_is_reported_in_the_outcome() {
    let transport = RecordingTransport::new();
    transport.on(Method::POST, "/command", Reply::Status(503));
    let config = config_builder()
        .primary(false)
        .command_mode(CommandMode::Immediate)
        .build()
        .unwrap();
    let client = client_with_clock(config, transport, Arc::new(ManualClock::new(0)));

    let outcome = client.start_command("kick", "u3").end(None).await;
    assert!(!outcome.success);
}

#[tokio::test]
async fn concurrent_timers_are_independent() {
    let transport = RecordingTransport::new();
    let clock = Arc::new(ManualClock::new(0));
    let client = client_with_clock(secondary_config(), transport, clock.clone());

    let slow = client.start_command("slow", "u1");
    clock.advance(100);
    let fast = client.start_command("fast", "u2");
    clock.advance(10);

    assert_eq!(fast.measure(None).duration_ms, 10);
    assert_eq!(slow.measure(None).duration_ms, 110);
}
