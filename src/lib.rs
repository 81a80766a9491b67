// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # intercept-relay - Webview Request Interception Core
//!
//! Filters the outbound request URLs an embedded webview reports, keeps a
//! bounded most-recent-first history per webview and relays matches to the
//! application layer.
//!
//! ## Features
//!
//! - Per-surface regex filters: case-insensitive, substring search, JS
//!   `/body/flags` literals accepted, invalid entries skipped
//! - Default-permit: a surface without patterns relays everything
//! - Ring buffer: last 200 matches per surface, newest first
//! - Dual-channel delivery: surface-targeted event, broadcast fallback
//! - Subscription gating: unsubscribed surfaces buffer but are never notified
//! - Lock-sharded state safe to hit from host I/O and UI threads at once
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use intercept_relay::{ChannelBridge, InterceptCoordinator, RelayConfig, SurfaceId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = ChannelBridge::default();
//!     let mut events = bridge.listen(1);
//!     let relay = InterceptCoordinator::new(RelayConfig::default(), Arc::new(bridge))?;
//!
//!     let view = SurfaceId::from(1);
//!     relay.set_patterns(&view, ["login"]);
//!     relay.subscribe(&view);
//!
//!     relay.on_request(&view, "https://example.com/login");
//!     println!("event: {:?}", events.recv().await?);
//!     println!("recent: {:?}", relay.get_recent(&view, 10).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod relay;
pub mod surface;

// Re-exports for convenience

// Coordinator
pub use coordinator::{InterceptCoordinator, InterceptOutcome, InterceptStore, SurfaceState};

// Configuration
pub use config::RelayConfig;

// Filtering
pub use filter::{compile_pattern, compile_patterns, PatternReport, PatternSet, VIDEO_MEDIA_PATTERN};

// Buffering
pub use buffer::RingBuffer;

// Delivery
pub use relay::{
    sanitize_for_js, BroadcastEvent, CallbackBridge, ChannelBridge, ChannelMessage, Delivery,
    EventSink, HostBridge, InPageMessage, InterceptKind, InterceptedRequest, NullBridge,
    SurfaceEvent,
};

// Metrics
pub use metrics::{MetricsReport, RelayMetrics};

// Errors
pub use error::{Error, ErrorContext, Result};

// Surfaces
pub use surface::{SurfaceId, SERVICE_WORKER_SURFACE};

/// intercept-relay version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
