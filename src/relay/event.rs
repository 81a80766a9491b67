// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event payloads exchanged with the host

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::surface::SurfaceId;

/// Payload of the surface-targeted event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceEvent {
    /// Matched request URL
    pub url: String,
}

/// Payload of the broadcast fallback event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEvent {
    /// Surface the request came from
    pub surface: SurfaceId,
    /// Matched request URL
    pub url: String,
}

/// Origin of an intercepted URL as seen by page listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptKind {
    /// Seen by the host's native request callback
    Native,
    /// DOM element load (img, script, iframe)
    Dom,
    /// Media element source
    Video,
    /// XMLHttpRequest
    Xhr,
    /// Fetch API
    Fetch,
}

/// Message posted into the page's own message bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InPageMessage {
    pub kind: InterceptKind,
    pub url: String,
}

impl InPageMessage {
    /// Message for a URL seen by the native callback
    pub fn native(url: impl Into<String>) -> Self {
        Self {
            kind: InterceptKind::Native,
            url: url.into(),
        }
    }

    /// Script that posts this message through `window.ReactNativeWebView`.
    ///
    /// The kind uses its serde name; the URL is escaped for a double-quoted
    /// JS string literal.
    pub fn to_script(&self) -> Result<String> {
        let kind = serde_json::to_string(&self.kind)?;
        Ok(format!(
            "(function(){{try{{if(window.ReactNativeWebView&&window.ReactNativeWebView.postMessage){{\
window.ReactNativeWebView.postMessage(JSON.stringify({{__rnIntercept:true,payload:{{kind:{},url:\"{}\"}}}}));\
}}}}catch(e){{}}}})();true;",
            kind,
            sanitize_for_js(&self.url)
        ))
    }
}

/// Escape a string for embedding in a double-quoted JS string literal.
///
/// Backslash, quote, `\n`, `\r` and `\t` get short escapes; other control
/// characters and U+2028/U+2029 become `\uXXXX`.
pub fn sanitize_for_js(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Request metadata handed over by a host callback.
///
/// Only `url` takes part in filtering and delivery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterceptedRequest {
    /// Request URL
    pub url: String,
    /// HTTP method, when the host exposes it
    pub method: Option<String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Whether the request loads the top-level document
    pub is_main_frame: bool,
    /// Whether the request came from a service worker
    pub from_service_worker: bool,
}

impl InterceptedRequest {
    /// Create request metadata for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Mark as a main-frame navigation
    pub fn main_frame(mut self, main_frame: bool) -> Self {
        self.is_main_frame = main_frame;
        self
    }

    /// Mark as service-worker originated
    pub fn service_worker(mut self, from_sw: bool) -> Self {
        self.from_service_worker = from_sw;
        self
    }
}
