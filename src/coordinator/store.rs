// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared per-surface state

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::buffer::RingBuffer;
use crate::config::RelayConfig;
use crate::filter::{PatternReport, PatternSet};
use crate::surface::SurfaceId;

/// Lifecycle state of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceState {
    /// Never seen, or cleared
    Unobserved,
    /// Seen a URL or had filters set
    Active,
}

/// Bookkeeping for an active surface
#[derive(Debug, Clone)]
struct SurfaceRecord {
    first_seen: DateTime<Utc>,
}

impl SurfaceRecord {
    fn new() -> Self {
        Self { first_seen: Utc::now() }
    }
}

/// All mutable relay state, owned explicitly rather than held in globals
///
/// Every map is internally synchronised; the store is shared behind an `Arc`
/// between the host's I/O callbacks and its UI thread.
///
/// Pattern writes for a surface happen while holding that surface's entry in
/// `surfaces`. Lock order is always `surfaces` first, then the other maps.
#[derive(Debug)]
pub struct InterceptStore {
    patterns: PatternSet,
    buffer: RingBuffer,
    subscriptions: DashMap<SurfaceId, bool>,
    echo_all: DashMap<SurfaceId, bool>,
    surfaces: DashMap<SurfaceId, SurfaceRecord>,
}

impl Default for InterceptStore {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}

impl InterceptStore {
    /// Create an empty store sized from config
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            patterns: PatternSet::new(config.regex_size_limit),
            buffer: RingBuffer::new(config.buffer_capacity),
            subscriptions: DashMap::new(),
            echo_all: DashMap::new(),
            surfaces: DashMap::new(),
        }
    }

    /// Pattern registry
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// URL history
    pub fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    /// Replace a surface's patterns and mark it active
    pub fn set_patterns<I, S>(&self, surface: &SurfaceId, patterns: I) -> PatternReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // An existing record means defaults were already decided; a new one
        // tells later observations the host chose first.
        let _record = self
            .surfaces
            .entry(surface.clone())
            .or_insert_with(SurfaceRecord::new);
        self.patterns.set_patterns(surface, patterns)
    }

    /// Mark a surface as observed.
    ///
    /// On the first observation `defaults` are installed unless the host
    /// already set patterns; the compile report is returned in that case.
    /// The defaults land before the entry is released, so no concurrent
    /// request for the surface is matched against an empty set first.
    pub fn observe(&self, surface: &SurfaceId, defaults: &[String]) -> Option<PatternReport> {
        match self.surfaces.entry(surface.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let _record = vacant.insert(SurfaceRecord::new());
                if defaults.is_empty() {
                    None
                } else {
                    Some(self.patterns.set_patterns(surface, defaults))
                }
            }
        }
    }

    pub fn subscribe(&self, surface: &SurfaceId) {
        self.subscriptions.insert(surface.clone(), true);
    }

    pub fn unsubscribe(&self, surface: &SurfaceId) {
        self.subscriptions.remove(surface);
    }

    pub fn is_subscribed(&self, surface: &SurfaceId) -> bool {
        self.subscriptions.get(surface).map(|v| *v).unwrap_or(false)
    }

    /// Bypass patterns for a surface
    pub fn set_echo_all(&self, surface: &SurfaceId, echo: bool) {
        if echo {
            self.echo_all.insert(surface.clone(), true);
        } else {
            self.echo_all.remove(surface);
        }
    }

    pub fn is_echo_all(&self, surface: &SurfaceId) -> bool {
        self.echo_all.get(surface).map(|v| *v).unwrap_or(false)
    }

    /// Current lifecycle state
    pub fn surface_state(&self, surface: &SurfaceId) -> SurfaceState {
        if self.surfaces.contains_key(surface) {
            SurfaceState::Active
        } else {
            SurfaceState::Unobserved
        }
    }

    /// When the surface was first observed
    pub fn first_seen(&self, surface: &SurfaceId) -> Option<DateTime<Utc>> {
        self.surfaces.get(surface).map(|r| r.first_seen)
    }

    /// Active surfaces
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.surfaces.iter().map(|e| e.key().clone()).collect()
    }

    /// Drop every piece of state held for a surface
    pub fn clear_surface(&self, surface: &SurfaceId) {
        let entry = self.surfaces.entry(surface.clone());
        self.patterns.clear(surface);
        self.buffer.clear(surface);
        self.subscriptions.remove(surface);
        self.echo_all.remove(surface);
        if let Entry::Occupied(occupied) = entry {
            occupied.remove();
        }
    }
}
