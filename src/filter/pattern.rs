// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Compiled pattern sets keyed by surface

use std::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::config::DEFAULT_REGEX_SIZE_LIMIT;
use crate::error::Error;
use crate::surface::SurfaceId;

/// Streaming media URLs (HLS, DASH, MP4, WebM, MPEG-TS segments)
pub const VIDEO_MEDIA_PATTERN: &str =
    r"/(\.m3u8(\?.*)?$)|(\.mp4(\?.*)?$)|(\.webm(\?.*)?$)|(\.mpd(\?.*)?$)|(\.ts(\?.*)?$)/i";

/// Flag letters a JS `RegExp` literal may carry
const JS_FLAGS: &str = "dgimsuy";

lazy_static! {
    /// `/body/flags` as produced by `String(/.../)` on the JS side
    static ref JS_LITERAL: Regex = Regex::new(r"(?s)^/(.+)/([a-z]*)$").unwrap();
}

/// A single compiled filter pattern
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Pattern as registered by the host
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substring search against the candidate
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Outcome of compiling a list of patterns
#[derive(Debug, Default)]
pub struct CompiledPatterns {
    /// Patterns that compiled
    pub active: Vec<CompiledPattern>,
    /// One error per rejected entry
    pub rejected: Vec<Error>,
}

/// Summary returned when a surface's patterns are replaced
#[derive(Debug, Default)]
pub struct PatternReport {
    /// Number of patterns now active on the surface
    pub active: usize,
    /// Entries that were skipped
    pub rejected: Vec<Error>,
}

impl PatternReport {
    /// True when every entry compiled
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Compile one pattern string.
///
/// Plain strings are compiled case-insensitively. A JS literal such as
/// `/\.m3u8$/i` is unwrapped first; its `m` and `s` flags are honoured and
/// matching stays case-insensitive regardless of `i`.
pub fn compile_pattern(raw: &str, size_limit: usize) -> Result<CompiledPattern, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::pattern_compile(raw, "empty pattern"));
    }

    let (body, flags) = split_js_literal(trimmed).unwrap_or((trimmed, ""));

    let regex = RegexBuilder::new(body)
        .case_insensitive(true)
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .size_limit(size_limit)
        .build()
        .map_err(|e| Error::pattern_compile(raw, e.to_string()))?;

    Ok(CompiledPattern {
        source: raw.to_string(),
        regex,
    })
}

/// Compile a list of patterns, keeping the valid ones
pub fn compile_patterns<I, S>(patterns: I, size_limit: usize) -> CompiledPatterns
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = CompiledPatterns::default();
    for raw in patterns {
        match compile_pattern(raw.as_ref(), size_limit) {
            Ok(pattern) => out.active.push(pattern),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping filter pattern");
                out.rejected.push(e);
            }
        }
    }
    out
}

fn split_js_literal(pattern: &str) -> Option<(&str, &str)> {
    let caps = JS_LITERAL.captures(pattern)?;
    let body = caps.get(1)?.as_str();
    let flags = caps.get(2)?.as_str();
    if flags.chars().all(|c| JS_FLAGS.contains(c)) {
        Some((body, flags))
    } else {
        None
    }
}

/// Per-surface pattern registry
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Arc<DashMap<SurfaceId, Arc<Vec<CompiledPattern>>>>,
    size_limit: usize,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new(DEFAULT_REGEX_SIZE_LIMIT)
    }
}

impl PatternSet {
    /// Create an empty registry
    pub fn new(size_limit: usize) -> Self {
        Self {
            patterns: Arc::new(DashMap::new()),
            size_limit,
        }
    }

    /// Replace the patterns for a surface.
    ///
    /// An empty list clears filtering (match-all). Invalid entries are
    /// skipped; the rest still apply.
    pub fn set_patterns<I, S>(&self, surface: &SurfaceId, patterns: I) -> PatternReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = compile_patterns(patterns, self.size_limit);
        let active = compiled.active.len();

        if compiled.active.is_empty() {
            self.patterns.remove(surface);
        } else {
            self.patterns.insert(surface.clone(), Arc::new(compiled.active));
        }

        tracing::debug!(
            surface = %surface,
            active,
            rejected = compiled.rejected.len(),
            "Filter patterns updated"
        );

        PatternReport {
            active,
            rejected: compiled.rejected,
        }
    }

    /// Check a candidate against the surface's patterns
    pub fn matches(&self, surface: &SurfaceId, candidate: &str) -> bool {
        // Clone the Arc so matching runs without holding the shard lock
        let patterns = match self.patterns.get(surface) {
            Some(entry) => Arc::clone(entry.value()),
            None => return true,
        };
        patterns.is_empty() || patterns.iter().any(|p| p.is_match(candidate))
    }

    /// Source strings of the active patterns
    pub fn patterns(&self, surface: &SurfaceId) -> Vec<String> {
        self.patterns
            .get(surface)
            .map(|entry| entry.iter().map(|p| p.source.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of active patterns for a surface
    pub fn active_count(&self, surface: &SurfaceId) -> usize {
        self.patterns.get(surface).map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the surface has any patterns registered
    pub fn has_patterns(&self, surface: &SurfaceId) -> bool {
        self.patterns.contains_key(surface)
    }

    /// Remove all patterns for a surface
    pub fn clear(&self, surface: &SurfaceId) {
        self.patterns.remove(surface);
    }
}
