// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Interception coordinator

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::store::{InterceptStore, SurfaceState};
use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::filter::PatternReport;
use crate::metrics::{MetricsReport, RelayMetrics};
use crate::relay::{panic_message, Delivery, EventSink, HostBridge, InterceptedRequest};
use crate::surface::SurfaceId;

/// What happened to one intercepted URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterceptOutcome {
    /// Empty URL, nothing done
    Ignored,
    /// Rejected by the surface's patterns
    Filtered,
    /// Stored, surface not subscribed
    Buffered,
    /// Stored and handed to the event sink
    Notified(Delivery),
}

impl InterceptOutcome {
    /// Whether the URL was stored
    pub fn is_buffered(&self) -> bool {
        matches!(self, InterceptOutcome::Buffered | InterceptOutcome::Notified(_))
    }
}

/// Entry point for host request callbacks
///
/// Cheap to clone; clones share the same store, sink and metrics, so the
/// host may rebind callbacks as often as it likes.
#[derive(Debug, Clone)]
pub struct InterceptCoordinator {
    store: Arc<InterceptStore>,
    sink: EventSink,
    metrics: Arc<RelayMetrics>,
    default_patterns: Arc<Vec<String>>,
}

impl InterceptCoordinator {
    /// Create a coordinator with a fresh store
    pub fn new(config: RelayConfig, bridge: Arc<dyn HostBridge>) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(InterceptStore::new(&config));
        Ok(Self::with_store(store, &config, bridge))
    }

    /// Create a coordinator over an existing store
    pub fn with_store(store: Arc<InterceptStore>, config: &RelayConfig, bridge: Arc<dyn HostBridge>) -> Self {
        let metrics = Arc::new(RelayMetrics::new());
        Self {
            store,
            sink: EventSink::new(bridge, config, metrics.clone()),
            metrics,
            default_patterns: Arc::new(config.default_patterns.clone()),
        }
    }

    /// Handle one URL seen by a surface's request callback.
    ///
    /// Never fails and never blocks beyond a map shard lock, which on a
    /// surface's first URL also covers installing its default patterns.
    pub fn on_request(&self, surface: &SurfaceId, url: &str) -> InterceptOutcome {
        if url.is_empty() {
            return InterceptOutcome::Ignored;
        }
        self.metrics.record_request();

        if let Some(report) = self.store.observe(surface, &self.default_patterns) {
            self.metrics.record_pattern_errors(report.rejected.len());
        }

        let matched = self.store.is_echo_all(surface) || self.store.patterns().matches(surface, url);
        if !matched {
            self.metrics.record_filtered();
            tracing::trace!(surface = %surface, url = %url, "Request filtered");
            return InterceptOutcome::Filtered;
        }

        if self.store.buffer().push(surface, url) {
            self.metrics.record_buffered();
        }

        if !self.store.is_subscribed(surface) {
            tracing::debug!(surface = %surface, url = %url, "Match buffered");
            return InterceptOutcome::Buffered;
        }

        InterceptOutcome::Notified(self.sink.notify(surface, url))
    }

    /// Handle a request with full metadata.
    ///
    /// Service-worker requests are routed to
    /// [`on_service_worker_request`](Self::on_service_worker_request) whatever
    /// `surface` says; otherwise only the URL is used.
    pub fn on_intercepted(&self, surface: &SurfaceId, request: &InterceptedRequest) -> InterceptOutcome {
        if request.from_service_worker {
            return self.on_service_worker_request(&request.url);
        }
        self.on_request(surface, &request.url)
    }

    /// Handle a URL fetched by a service worker.
    ///
    /// Service workers belong to no webview, so there are no patterns,
    /// buffer or subscription to consult. The URL goes straight to the
    /// broadcast channel with [`SurfaceId::service_worker`] as its surface.
    pub fn on_service_worker_request(&self, url: &str) -> InterceptOutcome {
        if url.is_empty() {
            return InterceptOutcome::Ignored;
        }
        self.metrics.record_request();
        InterceptOutcome::Notified(self.sink.broadcast(&SurfaceId::service_worker(), url))
    }

    /// Enable live notifications for a surface
    pub fn subscribe(&self, surface: &SurfaceId) {
        tracing::debug!(surface = %surface, "Subscribed");
        self.store.subscribe(surface);
    }

    /// Disable live notifications; buffering continues
    pub fn unsubscribe(&self, surface: &SurfaceId) {
        tracing::debug!(surface = %surface, "Unsubscribed");
        self.store.unsubscribe(surface);
    }

    /// Replace a surface's filter patterns; an empty list means match-all
    pub fn set_patterns<I, S>(&self, surface: &SurfaceId, patterns: I) -> PatternReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let report = self.store.set_patterns(surface, patterns);
        self.metrics.record_pattern_errors(report.rejected.len());
        report
    }

    /// Relay every URL of a surface regardless of its patterns
    pub fn set_echo_all(&self, surface: &SurfaceId, echo: bool) {
        self.store.set_echo_all(surface, echo);
    }

    /// Most recent matched URLs, newest first.
    ///
    /// Fails only with [`Error::BufferQuery`] on an unexpected internal fault.
    pub async fn get_recent(&self, surface: &SurfaceId, n: i64) -> Result<Vec<String>> {
        let buffer = self.store.buffer();
        catch_unwind(AssertUnwindSafe(|| buffer.recent(surface, n))).map_err(|panic| {
            let message = panic_message(&*panic);
            tracing::error!(surface = %surface, error = %message, "Buffer query failed");
            Error::buffer_query(message)
        })
    }

    /// Synchronous variant of [`get_recent`](Self::get_recent) that never fails
    pub fn recent(&self, surface: &SurfaceId, n: i64) -> Vec<String> {
        self.store.buffer().recent(surface, n)
    }

    /// Lifecycle state of a surface
    pub fn surface_state(&self, surface: &SurfaceId) -> SurfaceState {
        self.store.surface_state(surface)
    }

    /// Drop all state for a surface, returning it to unobserved
    pub fn clear_surface(&self, surface: &SurfaceId) {
        tracing::debug!(surface = %surface, "Surface cleared");
        self.store.clear_surface(surface);
    }

    /// Shared store
    pub fn store(&self) -> &Arc<InterceptStore> {
        &self.store
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}
