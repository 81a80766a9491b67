// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::VIDEO_MEDIA_PATTERN;

/// Default number of URLs kept per surface
pub const DEFAULT_BUFFER_CAPACITY: usize = 200;

/// Default name of the surface-targeted event
pub const DEFAULT_SURFACE_EVENT: &str = "onIntercept";

/// Default name of the broadcast fallback channel
pub const DEFAULT_BROADCAST_CHANNEL: &str = "RNInterceptNative";

/// Default compiled-size ceiling for a single pattern (bytes)
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum URLs retained per surface
    pub buffer_capacity: usize,
    /// Event name used for surface-targeted delivery
    pub surface_event: String,
    /// Well-known channel used when surface delivery fails
    pub broadcast_channel: String,
    /// Also post a sanitized `kind: "native"` message into the page
    pub in_page_echo: bool,
    /// Compiled-size ceiling for each pattern
    pub regex_size_limit: usize,
    /// Patterns installed on a surface the first time it is observed
    pub default_patterns: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            surface_event: DEFAULT_SURFACE_EVENT.to_string(),
            broadcast_channel: DEFAULT_BROADCAST_CHANNEL.to_string(),
            in_page_echo: false,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
            default_patterns: vec![],
        }
    }
}

impl RelayConfig {
    /// Create a new relay config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set buffer capacity
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set surface event name
    pub fn surface_event(mut self, name: impl Into<String>) -> Self {
        self.surface_event = name.into();
        self
    }

    /// Set broadcast channel name
    pub fn broadcast_channel(mut self, name: impl Into<String>) -> Self {
        self.broadcast_channel = name.into();
        self
    }

    /// Enable/disable the in-page echo
    pub fn in_page_echo(mut self, enabled: bool) -> Self {
        self.in_page_echo = enabled;
        self
    }

    /// Set regex size limit
    pub fn regex_size_limit(mut self, limit: usize) -> Self {
        self.regex_size_limit = limit;
        self
    }

    /// Add a pattern installed on newly observed surfaces
    pub fn default_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.default_patterns.push(pattern.into());
        self
    }

    /// Config that only relays streaming media URLs
    pub fn for_media_capture() -> Self {
        Self {
            default_patterns: vec![VIDEO_MEDIA_PATTERN.to_string()],
            ..Default::default()
        }
    }

    /// Parse config from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check config for values the relay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::config("buffer_capacity must be at least 1"));
        }
        if self.surface_event.is_empty() {
            return Err(Error::config("surface_event must not be empty"));
        }
        if self.broadcast_channel.is_empty() {
            return Err(Error::config("broadcast_channel must not be empty"));
        }
        if self.regex_size_limit == 0 {
            return Err(Error::config("regex_size_limit must be non-zero"));
        }
        Ok(())
    }
}
