// File: discolytics-core/tests/unit/identity_tests.rs

use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use serde_json::json;

use discolytics_common::models::ClientType;
use discolytics_core::clock::ManualClock;
use discolytics_core::{ClientConfig, Discolytics};

use crate::helpers::*;

const NOW: i64 = 1_700_000_000_000;
const MIGRATED_ID: &str = "80351110224678912";

fn client_at(config: ClientConfig, transport: Arc<RecordingTransport>, clock: Arc<ManualClock>) -> Discolytics {
    Discolytics::builder(config)
        .transport(transport)
        .clock(clock)
        .sampler(Arc::new(StaticSampler(None)))
        .log_sink(CapturingSink::new())
        .build()
        .unwrap()
}

fn stored_profile(transport: &RecordingTransport, last_updated: Option<i64>, capture: &[&str]) {
    transport.on(
        Method::GET,
        "/bots/123",
        Reply::Json(json!({
            "captureEvents": capture,
            "botUserId": MIGRATED_ID,
            "botUserName": "old-name",
            "botUserAvatar": null,
            "profileLastUpdated": last_updated,
        })),
    );
}

fn discord_user(transport: &RecordingTransport, avatar: Option<&str>) {
    transport.on(
        Method::GET,
        "/users/@me",
        Reply::Json(json!({
            "id": MIGRATED_ID,
            "username": "maow",
            "discriminator": "0",
            "avatar": avatar,
        })),
    );
}

#[tokio::test]
async fn stale_profile_is_refreshed_from_discord() {
    let transport = RecordingTransport::new();
    stored_profile(&transport, Some(NOW - 90_000_000), &[]);
    discord_user(&transport, None);
    let clock = Arc::new(ManualClock::new(NOW));
    let config = config_builder()
        .client_type(ClientType::Twilight)
        .client_version(Some("9.9.9".into()))
        .build()
        .unwrap();
    let client = client_at(config, transport.clone(), clock);

    let outcome = client.sync_profile().await;
    assert!(outcome.success);

    let me = transport.requests_to(Method::GET, "/users/@me");
    assert_eq!(me.len(), 1);
    assert!(me[0].url.starts_with(DISCORD_URL));
    assert_eq!(me[0].header_value("Authorization"), Some("Bot secret-token"));

    let index = (80351110224678912u64 >> 22) % 6;
    let avatar = format!("https://cdn.discordapp.com/embed/avatars/{index}.png");
    let patches = transport.requests_to(Method::PATCH, "/bots/123");
    assert_eq!(patches.len(), 1);
    assert!(patches[0].url.starts_with(API_URL));
    assert_eq!(
        body_of(&patches[0]),
        json!({
            "botUserId": MIGRATED_ID,
            "botUserName": "maow",
            "botUserAvatar": avatar,
            "clientType": 6,
            "clientVersion": "9.9.9",
        })
    );

    let identity = client.identity();
    assert_eq!(identity.user_name.as_deref(), Some("maow"));
    assert_eq!(identity.avatar_url.as_deref(), Some(avatar.as_str()));
    assert_eq!(identity.profile_last_updated_at, Some(NOW));
}

#[tokio::test]
async fn fresh_profile_is_left_alone() {
    let transport = RecordingTransport::new();
    stored_profile(&transport, Some(NOW - 1000), &[]);
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    assert!(client.sync_profile().await.success);

    assert!(transport.requests_to(Method::GET, "/users/@me").is_empty());
    assert!(transport.requests_to(Method::PATCH, "/bots/123").is_empty());
    let identity = client.identity();
    assert_eq!(identity.user_name.as_deref(), Some("old-name"));
    assert_eq!(identity.profile_last_updated_at, Some(NOW - 1000));
}

#[tokio::test]
async fn missing_timestamp_counts_as_stale() {
    let transport = RecordingTransport::new();
    stored_profile(&transport, None, &[]);
    discord_user(&transport, Some("abc123"));
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    client.sync_profile().await;

    let patches = transport.requests_to(Method::PATCH, "/bots/123");
    assert_eq!(patches.len(), 1);
    assert_eq!(
        body_of(&patches[0])["botUserAvatar"],
        json!(format!("https://cdn.discordapp.com/avatars/{MIGRATED_ID}/abc123.png"))
    );
}

#[tokio::test]
async fn rejected_patch_does_not_advance_the_timestamp() {
    let transport = RecordingTransport::new();
    let stale = NOW - 90_000_000;
    stored_profile(&transport, Some(stale), &[]);
    discord_user(&transport, None);
    transport.on(Method::PATCH, "/bots/123", Reply::Status(500));
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    assert!(!client.sync_profile().await.success);
    assert_eq!(client.identity().profile_last_updated_at, Some(stale));

    // Still stale, so the next sync tries again.
    client.sync_profile().await;
    assert_eq!(transport.requests_to(Method::GET, "/users/@me").len(), 2);
}

#[tokio::test]
async fn failed_profile_read_stops_the_sync() {
    let transport = RecordingTransport::new();
    transport.on(Method::GET, "/bots/123", Reply::NetworkError);
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    assert!(!client.sync_profile().await.success);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn capture_events_observers_see_every_update() {
    let transport = RecordingTransport::new();
    let clock = Arc::new(ManualClock::new(NOW));
    let client = client_at(primary_config(), transport.clone(), clock);

    let seen = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
    let sink = seen.clone();
    client.on_capture_events_update(move |events| sink.lock().push(events.to_vec()));

    stored_profile(&transport, Some(NOW), &["MESSAGE_CREATE"]);
    client.sync_profile().await;
    stored_profile(&transport, Some(NOW), &["GUILD_CREATE", "READY"]);
    client.sync_profile().await;

    assert_eq!(client.capture_events(), vec!["GUILD_CREATE", "READY"]);
    assert_eq!(
        *seen.lock(),
        vec![
            vec!["MESSAGE_CREATE".to_string()],
            vec!["GUILD_CREATE".to_string(), "READY".to_string()],
        ]
    );
}

#[tokio::test]
async fn observers_may_subscribe_from_inside_a_callback() {
    let transport = RecordingTransport::new();
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    let nested_calls = Arc::new(Mutex::new(0usize));
    let handle = client.clone();
    let counter = nested_calls.clone();
    client.on_capture_events_update(move |_| {
        let counter = counter.clone();
        handle.on_capture_events_update(move |_| *counter.lock() += 1);
    });

    stored_profile(&transport, Some(NOW), &["READY"]);
    client.sync_profile().await;
    assert_eq!(client.capture_events_observers(), 2);
    assert_eq!(*nested_calls.lock(), 0, "added during the update, not part of it");

    client.sync_profile().await;
    assert_eq!(client.capture_events_observers(), 3);
    assert_eq!(*nested_calls.lock(), 1);
}

#[tokio::test]
async fn removed_observer_is_not_called_again() {
    let transport = RecordingTransport::new();
    let client = client_at(primary_config(), transport.clone(), Arc::new(ManualClock::new(NOW)));

    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let id = client.on_capture_events_update(move |_| *counter.lock() += 1);

    stored_profile(&transport, Some(NOW), &[]);
    client.sync_profile().await;
    assert!(client.remove_capture_events_observer(id));
    assert!(!client.remove_capture_events_observer(id));
    client.sync_profile().await;

    assert_eq!(*calls.lock(), 1);
    assert_eq!(client.capture_events_observers(), 0);
}

#[tokio::test]
async fn client_metadata_patch_carries_only_type_and_version() {
    let transport = RecordingTransport::new();
    let config = config_builder()
        .client_type(ClientType::Eris)
        .client_version(Some("1.2.3".into()))
        .build()
        .unwrap();
    let client = client_at(config, transport.clone(), Arc::new(ManualClock::new(NOW)));

    assert!(client.register_client_metadata().await.success);

    let patches = transport.requests_to(Method::PATCH, "/bots/123");
    assert_eq!(
        body_of(&patches[0]),
        json!({ "clientType": 2, "clientVersion": "1.2.3" })
    );
    assert_eq!(patches[0].header_value("Authorization"), Some(API_KEY));
}
