// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Surface identifiers
//!
//! A surface is one observed webview instance. The relay never owns browser
//! state; the identifier is only a correlation key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Surface name carried by broadcasts for service-worker requests, which
/// belong to no webview
pub const SERVICE_WORKER_SURFACE: &str = "service-worker";

/// Opaque key for one observed webview
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurfaceId {
    /// Numeric view tag assigned by the host
    Numeric(i64),
    /// Named surface
    Named(String),
}

impl SurfaceId {
    /// Numeric value, if this is a numeric surface
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            SurfaceId::Numeric(n) => Some(*n),
            SurfaceId::Named(_) => None,
        }
    }

    /// Pseudo-surface for service-worker requests
    pub fn service_worker() -> Self {
        SurfaceId::Named(SERVICE_WORKER_SURFACE.to_string())
    }

    pub fn is_service_worker(&self) -> bool {
        matches!(self, SurfaceId::Named(name) if name == SERVICE_WORKER_SURFACE)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceId::Numeric(n) => write!(f, "{}", n),
            SurfaceId::Named(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SurfaceId {
    fn from(n: i64) -> Self {
        SurfaceId::Numeric(n)
    }
}

impl From<i32> for SurfaceId {
    fn from(n: i32) -> Self {
        SurfaceId::Numeric(n as i64)
    }
}

impl From<u32> for SurfaceId {
    fn from(n: u32) -> Self {
        SurfaceId::Numeric(n as i64)
    }
}

impl From<&str> for SurfaceId {
    fn from(s: &str) -> Self {
        SurfaceId::Named(s.to_string())
    }
}

impl From<String> for SurfaceId {
    fn from(s: String) -> Self {
        SurfaceId::Named(s)
    }
}

impl From<&SurfaceId> for SurfaceId {
    fn from(id: &SurfaceId) -> Self {
        id.clone()
    }
}
