// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Concurrent producers and readers against one coordinator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use futures::future::join_all;
use intercept_relay::{InterceptCoordinator, NullBridge, RelayConfig, SurfaceId};

#[test]
fn readers_never_see_more_than_capacity() {
    let relay = InterceptCoordinator::new(RelayConfig::default().buffer_capacity(50), Arc::new(NullBridge)).unwrap();
    let view = SurfaceId::from(1);
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let relay = relay.clone();
            let view = view.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    relay.on_request(&view, &format!("https://x/{}/{}", w, i));
                }
            })
        })
        .collect();

    let reader = {
        let relay = relay.clone();
        let view = view.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut max_seen = 0;
            while !done.load(Ordering::Relaxed) {
                let len = relay.recent(&view, 1_000).len();
                max_seen = max_seen.max(len);
            }
            max_seen
        })
    };

    // UI-thread style mutations interleaved with traffic
    for _ in 0..200 {
        relay.subscribe(&view);
        relay.set_patterns(&view, ["https"]);
        relay.unsubscribe(&view);
    }

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::Relaxed);
    let max_seen = reader.join().unwrap();

    assert!(max_seen <= 50);
    assert_eq!(relay.recent(&view, 1_000).len(), 50);
    assert_eq!(relay.metrics().requests_seen, 8_000);
}

#[test]
fn host_patterns_never_overwritten_by_defaults() {
    let config = RelayConfig::default().default_pattern("video");
    let relay = InterceptCoordinator::new(config, Arc::new(NullBridge)).unwrap();
    let rounds = 2_000i64;
    let barrier = Arc::new(Barrier::new(2));

    // I/O thread sees the first URL of each surface while the UI thread sets filters
    let io = {
        let relay = relay.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            for i in 0..rounds {
                barrier.wait();
                relay.on_request(&SurfaceId::from(i), "https://x/app.js");
            }
        })
    };

    for i in 0..rounds {
        let surface = SurfaceId::from(i);
        barrier.wait();
        if i % 2 == 0 {
            relay.set_patterns(&surface, ["explicit"]);
        } else {
            relay.set_patterns(&surface, Vec::<String>::new());
        }
    }
    io.join().unwrap();

    for i in 0..rounds {
        let patterns = relay.store().patterns().patterns(&SurfaceId::from(i));
        if i % 2 == 0 {
            assert_eq!(patterns, vec!["explicit".to_string()], "surface {}", i);
        } else {
            assert!(patterns.is_empty(), "surface {} got {:?}", i, patterns);
        }
    }
}

#[test]
fn first_requests_see_installed_defaults() {
    let config = RelayConfig::default().default_pattern("video");
    let relay = InterceptCoordinator::new(config, Arc::new(NullBridge)).unwrap();
    let threads = 4;
    let surfaces = 500i64;
    let barrier = Arc::new(Barrier::new(threads));

    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let relay = relay.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                for i in 0..surfaces {
                    barrier.wait();
                    relay.on_request(&SurfaceId::from(i), "https://x/app.js");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    for i in 0..surfaces {
        assert!(relay.recent(&SurfaceId::from(i), 10).is_empty(), "surface {}", i);
    }
    let report = relay.metrics();
    assert_eq!(report.buffered, 0);
    assert_eq!(report.filtered_out, threads as u64 * surfaces as u64);
}

#[tokio::test]
async fn parallel_queries_across_surfaces() {
    let relay = InterceptCoordinator::new(RelayConfig::default(), Arc::new(NullBridge)).unwrap();
    let surfaces: Vec<SurfaceId> = (0..16i64).map(SurfaceId::from).collect();

    for surface in &surfaces {
        for i in 0..3 {
            relay.on_request(surface, &format!("https://{}/{}", surface, i));
        }
    }

    let results = join_all(surfaces.iter().map(|s| relay.get_recent(s, 2))).await;
    for (surface, result) in surfaces.iter().zip(results) {
        let entries = result.unwrap();
        assert_eq!(entries, vec![format!("https://{}/2", surface), format!("https://{}/1", surface)]);
    }
}
