// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay counters
//!
//! Cheap atomic counters bumped on the interception path, readable as a
//! serialisable report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Relay metrics collector
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// URLs handed over by the host (non-empty)
    requests_seen: AtomicU64,
    /// URLs rejected by the surface's patterns
    filtered_out: AtomicU64,
    /// URLs stored in a ring buffer
    buffered: AtomicU64,
    /// Events accepted by surface delivery
    delivered_primary: AtomicU64,
    /// Events accepted by the broadcast fallback
    delivered_fallback: AtomicU64,
    /// Events both channels refused
    dropped: AtomicU64,
    /// Pattern entries rejected at compile time
    pattern_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: RwLock<Option<Instant>>,
    /// Wall-clock time of the last buffered match
    last_match_at: RwLock<Option<DateTime<Utc>>>,
}

/// Metrics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Uptime in seconds
    pub uptime_secs: u64,
    pub requests_seen: u64,
    pub filtered_out: u64,
    pub buffered: u64,
    pub delivered_primary: u64,
    pub delivered_fallback: u64,
    pub dropped: u64,
    pub pattern_errors: u64,
    /// Share of seen requests that matched
    pub match_ratio: f64,
    pub last_match_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

impl RelayMetrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        let metrics = Self::default();
        *metrics.start_time.write() = Some(Instant::now());
        metrics
    }

    pub fn record_request(&self) {
        self.requests_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self) {
        self.filtered_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffered match
    pub fn record_buffered(&self) {
        self.buffered.fetch_add(1, Ordering::Relaxed);
        *self.last_match_at.write() = Some(Utc::now());
    }

    pub fn record_primary(&self) {
        self.delivered_primary.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.delivered_fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record rejected pattern entries
    pub fn record_pattern_errors(&self, count: usize) {
        self.pattern_errors.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get current report
    pub fn report(&self) -> MetricsReport {
        let requests_seen = self.requests_seen.load(Ordering::Relaxed);
        let buffered = self.buffered.load(Ordering::Relaxed);

        let uptime_secs = self
            .start_time
            .read()
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);

        let match_ratio = if requests_seen > 0 {
            buffered as f64 / requests_seen as f64
        } else {
            0.0
        };

        MetricsReport {
            uptime_secs,
            requests_seen,
            filtered_out: self.filtered_out.load(Ordering::Relaxed),
            buffered,
            delivered_primary: self.delivered_primary.load(Ordering::Relaxed),
            delivered_fallback: self.delivered_fallback.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            pattern_errors: self.pattern_errors.load(Ordering::Relaxed),
            match_ratio,
            last_match_at: *self.last_match_at.read(),
            generated_at: Utc::now(),
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.requests_seen.store(0, Ordering::Relaxed);
        self.filtered_out.store(0, Ordering::Relaxed);
        self.buffered.store(0, Ordering::Relaxed);
        self.delivered_primary.store(0, Ordering::Relaxed);
        self.delivered_fallback.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.pattern_errors.store(0, Ordering::Relaxed);
        *self.start_time.write() = Some(Instant::now());
        *self.last_match_at.write() = None;
    }
}
