// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end relay behaviour through the tokio channel bridge

use std::sync::Arc;

use intercept_relay::{
    ChannelBridge, Delivery, InterceptCoordinator, InterceptOutcome, RelayConfig, SurfaceId,
    SurfaceState, SERVICE_WORKER_SURFACE,
};
use tokio::sync::broadcast::error::TryRecvError;

fn relay(config: RelayConfig) -> (InterceptCoordinator, ChannelBridge) {
    let bridge = ChannelBridge::new(64);
    let coordinator = InterceptCoordinator::new(config, Arc::new(bridge.clone())).unwrap();
    (coordinator, bridge)
}

#[tokio::test]
async fn login_filter_scenario() {
    let (relay, bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from(1);
    let mut events = bridge.listen(1);

    relay.subscribe(&view);
    relay.set_patterns(&view, ["login"]);

    relay.on_request(&view, "https://x.com/login");
    assert_eq!(relay.get_recent(&view, 10).await.unwrap(), vec!["https://x.com/login"]);
    assert_eq!(events.recv().await.unwrap().url, "https://x.com/login");

    relay.on_request(&view, "https://x.com/home");
    assert_eq!(relay.get_recent(&view, 10).await.unwrap(), vec!["https://x.com/login"]);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn falls_back_to_broadcast_without_surface_listener() {
    let (relay, bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from(42);
    let mut broadcast = bridge.listen_broadcast();

    relay.subscribe(&view);
    let outcome = relay.on_request(&view, "https://cdn.example/index.m3u8");
    assert_eq!(outcome, InterceptOutcome::Notified(Delivery::Fallback));

    let msg = broadcast.recv().await.unwrap();
    assert_eq!(msg.channel, "RNInterceptNative");
    assert_eq!(msg.event.surface, view);
    assert_eq!(msg.event.url, "https://cdn.example/index.m3u8");
}

#[tokio::test]
async fn service_worker_requests_go_to_broadcast() {
    let (relay, bridge) = relay(RelayConfig::for_media_capture());
    let mut broadcast = bridge.listen_broadcast();

    // Not a media URL, and no surface involved: still relayed
    let outcome = relay.on_service_worker_request("https://x.com/sw/app.js");
    assert_eq!(outcome, InterceptOutcome::Notified(Delivery::Fallback));

    let msg = broadcast.recv().await.unwrap();
    assert_eq!(msg.channel, "RNInterceptNative");
    assert_eq!(msg.event.surface, SurfaceId::from(SERVICE_WORKER_SURFACE));
    assert!(msg.event.surface.is_service_worker());
    assert_eq!(msg.event.url, "https://x.com/sw/app.js");
    assert!(relay.store().surfaces().is_empty());
}

#[tokio::test]
async fn dropped_when_nobody_listens() {
    let (relay, _bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from("orphan");
    relay.subscribe(&view);

    assert_eq!(
        relay.on_request(&view, "https://x"),
        InterceptOutcome::Notified(Delivery::Dropped)
    );
    // buffering does not depend on delivery
    assert_eq!(relay.get_recent(&view, 1).await.unwrap(), vec!["https://x"]);
}

#[tokio::test]
async fn in_page_echo_reaches_page_listener() {
    let (relay, bridge) = relay(RelayConfig::default().in_page_echo(true));
    let view = SurfaceId::from(5);
    let _surface_rx = bridge.listen(5);
    let mut page = bridge.listen_page();

    relay.subscribe(&view);
    relay.on_request(&view, "https://x.com/a\"b");

    let script = page.recv().await.unwrap();
    assert_eq!(script.surface, view);
    assert!(script.script.contains(r#"kind:"native""#));
    assert!(script.script.contains(r#"https://x.com/a\"b"#));
}

#[tokio::test]
async fn capacity_and_ordering() {
    let (relay, _bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from(1);

    for i in 0..205 {
        relay.on_request(&view, &format!("https://x/{}", i));
    }

    let all = relay.get_recent(&view, 500).await.unwrap();
    assert_eq!(all.len(), 200);
    assert_eq!(all.first().map(String::as_str), Some("https://x/204"));
    assert_eq!(all.last().map(String::as_str), Some("https://x/5"));
}

#[tokio::test]
async fn malformed_pattern_does_not_poison_others() {
    let (relay, _bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from(1);

    let report = relay.set_patterns(&view, [r"^https://a\.com", "(unclosed", "video"]);
    assert_eq!(report.active, 2);
    assert!(!report.is_clean());

    assert!(relay.on_request(&view, "https://A.com/x").is_buffered());
    assert!(relay.on_request(&view, "https://b.com/video/1").is_buffered());
    assert_eq!(relay.on_request(&view, "https://b.com"), InterceptOutcome::Filtered);

    relay.set_patterns(&view, Vec::<String>::new());
    assert!(relay.on_request(&view, "https://b.com").is_buffered());
}

#[tokio::test]
async fn surface_lifecycle() {
    let (relay, _bridge) = relay(RelayConfig::default());
    let view = SurfaceId::from(8);

    assert_eq!(relay.surface_state(&view), SurfaceState::Unobserved);
    relay.on_request(&view, "https://x");
    assert_eq!(relay.surface_state(&view), SurfaceState::Active);

    relay.clear_surface(&view);
    assert_eq!(relay.surface_state(&view), SurfaceState::Unobserved);
    assert!(relay.get_recent(&view, 10).await.unwrap().is_empty());
}
