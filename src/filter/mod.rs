// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-surface URL filtering
//!
//! Patterns are case-insensitive regexes searched anywhere in the candidate.
//! A surface without patterns matches everything.

mod pattern;

pub use pattern::{
    compile_pattern, compile_patterns, CompiledPattern, CompiledPatterns, PatternReport,
    PatternSet, VIDEO_MEDIA_PATTERN,
};
