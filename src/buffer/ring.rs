// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Most-recent-first ring buffer keyed by surface

use std::collections::VecDeque;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::DEFAULT_BUFFER_CAPACITY;
use crate::surface::SurfaceId;

/// Fixed-capacity history of matched URLs, newest first
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// Entries by surface; index 0 is the newest
    entries: Arc<DashMap<SurfaceId, VecDeque<String>>>,
    /// Maximum entries per surface
    capacity: usize,
    /// Makes `recent` panic, to exercise query fault handling
    #[cfg(test)]
    fail_reads: Arc<AtomicBool>,
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl RingBuffer {
    /// Create a buffer holding at most `capacity` entries per surface
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            #[cfg(test)]
            fail_reads: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Per-surface capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert at the front, evicting from the tail past capacity.
    ///
    /// Empty values are ignored. Returns whether the value was stored.
    pub fn push(&self, surface: &SurfaceId, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return false;
        }

        // The shard write guard covers both the insert and the trim
        let mut list = self
            .entries
            .entry(surface.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity.min(16)));
        list.push_front(value);
        if list.len() > self.capacity {
            list.truncate(self.capacity);
        }
        true
    }

    /// Up to `n` most recent entries, newest first
    pub fn recent(&self, surface: &SurfaceId, n: i64) -> Vec<String> {
        #[cfg(test)]
        {
            if self.fail_reads.load(Ordering::SeqCst) {
                panic!("buffer read fault for {}", surface);
            }
        }

        if n <= 0 {
            return Vec::new();
        }
        let limit = usize::try_from(n).unwrap_or(usize::MAX);
        self.entries
            .get(surface)
            .map(|list| list.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries held for a surface
    pub fn len(&self, surface: &SurfaceId) -> usize {
        self.entries.get(surface).map(|list| list.len()).unwrap_or(0)
    }

    /// Whether a surface has no entries
    pub fn is_empty(&self, surface: &SurfaceId) -> bool {
        self.len(surface) == 0
    }

    /// Whether the buffer has ever stored a value for the surface
    pub fn contains(&self, surface: &SurfaceId) -> bool {
        self.entries.contains_key(surface)
    }

    /// Drop the history for a surface
    pub fn clear(&self, surface: &SurfaceId) {
        self.entries.remove(surface);
    }

    /// Surfaces with buffered history
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Total entries across all surfaces
    pub fn total_len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let buffer = RingBuffer::default();
        let s = SurfaceId::from(1);
        buffer.push(&s, "a");
        buffer.push(&s, "b");
        buffer.push(&s, "c");

        assert_eq!(buffer.recent(&s, 5), vec!["c", "b", "a"]);
        assert_eq!(buffer.recent(&s, 2), vec!["c", "b"]);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let buffer = RingBuffer::new(200);
        let s = SurfaceId::from(1);
        for i in 0..205 {
            buffer.push(&s, format!("url-{}", i));
        }

        assert_eq!(buffer.len(&s), 200);
        let all = buffer.recent(&s, 1000);
        assert_eq!(all.len(), 200);
        assert_eq!(all[0], "url-204");
        assert_eq!(all[199], "url-5");
        assert!(!all.contains(&"url-4".to_string()));
    }

    #[test]
    fn test_non_positive_count() {
        let buffer = RingBuffer::default();
        let s = SurfaceId::from(1);
        buffer.push(&s, "a");

        assert!(buffer.recent(&s, 0).is_empty());
        assert!(buffer.recent(&s, -3).is_empty());
    }

    #[test]
    fn test_missing_surface() {
        let buffer = RingBuffer::default();
        assert!(buffer.recent(&SurfaceId::from("nope"), 10).is_empty());
        assert_eq!(buffer.len(&SurfaceId::from("nope")), 0);
    }

    #[test]
    fn test_empty_value_rejected() {
        let buffer = RingBuffer::default();
        let s = SurfaceId::from(1);
        assert!(!buffer.push(&s, ""));
        assert!(!buffer.contains(&s));
    }

    #[test]
    fn test_clear() {
        let buffer = RingBuffer::new(3);
        let s = SurfaceId::from(9);
        buffer.push(&s, "a");
        buffer.clear(&s);
        assert!(buffer.is_empty(&s));
        assert!(buffer.surfaces().is_empty());
    }
}
