// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event delivery with broadcast fallback

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::bridge::HostBridge;
use super::event::{BroadcastEvent, InPageMessage, SurfaceEvent};
use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::metrics::RelayMetrics;
use crate::surface::SurfaceId;

/// Which channel, if any, accepted an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// Surface-targeted delivery accepted the event
    Primary,
    /// Broadcast channel accepted the event, after a failed surface
    /// delivery or for a request with no surface
    Fallback,
    /// Both channels failed
    Dropped,
}

impl Delivery {
    /// Whether some channel accepted the event
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Delivery::Dropped)
    }
}

/// Delivers matched URLs to the application listener layer
///
/// Delivery is best-effort: failures are logged and never returned as errors.
#[derive(Clone)]
pub struct EventSink {
    bridge: Arc<dyn HostBridge>,
    surface_event: String,
    broadcast_channel: String,
    in_page_echo: bool,
    metrics: Arc<RelayMetrics>,
}

impl EventSink {
    /// Create a sink over a host bridge
    pub fn new(bridge: Arc<dyn HostBridge>, config: &RelayConfig, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            bridge,
            surface_event: config.surface_event.clone(),
            broadcast_channel: config.broadcast_channel.clone(),
            in_page_echo: config.in_page_echo,
            metrics,
        }
    }

    /// Deliver a matched URL for a surface
    pub fn notify(&self, surface: &SurfaceId, url: &str) -> Delivery {
        let delivery = match self.emit_primary(surface, url) {
            Ok(()) => {
                tracing::debug!(surface = %surface, url = %url, "Surface delivery succeeded");
                self.metrics.record_primary();
                Delivery::Primary
            }
            Err(primary_err) => {
                tracing::debug!(surface = %surface, error = %primary_err, "Surface delivery failed, using broadcast");
                match self.emit_broadcast(surface, url) {
                    Ok(()) => {
                        self.metrics.record_fallback();
                        Delivery::Fallback
                    }
                    Err(fallback_err) => {
                        tracing::warn!(
                            surface = %surface,
                            url = %url,
                            error = %fallback_err,
                            "Event dropped"
                        );
                        self.metrics.record_dropped();
                        Delivery::Dropped
                    }
                }
            }
        };

        if self.in_page_echo {
            if let Err(e) = self.emit_in_page(surface, url) {
                tracing::debug!(surface = %surface, error = %e, "In-page echo failed");
            }
        }

        delivery
    }

    /// Deliver a URL on the broadcast channel only.
    ///
    /// Used for requests that belong to no surface, such as service-worker
    /// fetches; there is no surface event and no in-page echo.
    pub fn broadcast(&self, surface: &SurfaceId, url: &str) -> Delivery {
        match self.emit_broadcast(surface, url) {
            Ok(()) => {
                tracing::debug!(surface = %surface, url = %url, "Broadcast delivery succeeded");
                self.metrics.record_fallback();
                Delivery::Fallback
            }
            Err(e) => {
                tracing::warn!(surface = %surface, url = %url, error = %e, "Event dropped");
                self.metrics.record_dropped();
                Delivery::Dropped
            }
        }
    }

    fn emit_primary(&self, surface: &SurfaceId, url: &str) -> Result<()> {
        let payload = SurfaceEvent { url: url.to_string() };
        guarded(&self.surface_event, || {
            self.bridge.emit_to_surface(surface, &self.surface_event, &payload)
        })
    }

    fn emit_broadcast(&self, surface: &SurfaceId, url: &str) -> Result<()> {
        let payload = BroadcastEvent {
            surface: surface.clone(),
            url: url.to_string(),
        };
        guarded(&self.broadcast_channel, || {
            self.bridge.broadcast(&self.broadcast_channel, &payload)
        })
    }

    fn emit_in_page(&self, surface: &SurfaceId, url: &str) -> Result<()> {
        let script = InPageMessage::native(url).to_script()?;
        guarded("page", || self.bridge.evaluate_in_page(surface, &script))
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("surface_event", &self.surface_event)
            .field("broadcast_channel", &self.broadcast_channel)
            .field("in_page_echo", &self.in_page_echo)
            .finish()
    }
}

/// Run a bridge call, turning a panic inside host code into a delivery error
fn guarded<F>(channel: &str, call: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(panic) => Err(Error::delivery(channel, panic_message(&*panic))),
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in host bridge".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::bridge::{CallbackBridge, NullBridge};
    use parking_lot::Mutex;

    fn sink(bridge: impl HostBridge + 'static, config: &RelayConfig) -> (EventSink, Arc<RelayMetrics>) {
        let metrics = Arc::new(RelayMetrics::new());
        (EventSink::new(Arc::new(bridge), config, metrics.clone()), metrics)
    }

    #[test]
    fn test_primary_delivery() {
        let (sink, metrics) = sink(NullBridge, &RelayConfig::default());
        assert_eq!(sink.notify(&SurfaceId::from(1), "https://x"), Delivery::Primary);
        assert_eq!(metrics.report().delivered_primary, 1);
    }

    #[test]
    fn test_fallback_on_primary_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();
        let bridge = CallbackBridge::new()
            .on_surface(Arc::new(|_: &SurfaceId, event: &str, _: &SurfaceEvent| -> Result<()> {
                Err(Error::delivery(event, "view gone"))
            }))
            .on_broadcast(Arc::new(move |channel: &str, payload: &BroadcastEvent| -> Result<()> {
                seen_cb.lock().push((channel.to_string(), payload.clone()));
                Ok(())
            }));
        let (sink, metrics) = sink(bridge, &RelayConfig::default());

        assert_eq!(sink.notify(&SurfaceId::from(5), "https://x/a"), Delivery::Fallback);

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "RNInterceptNative");
        assert_eq!(seen[0].1.surface, SurfaceId::from(5));
        assert_eq!(seen[0].1.url, "https://x/a");
        assert_eq!(metrics.report().delivered_fallback, 1);
    }

    #[test]
    fn test_fallback_on_primary_panic() {
        let bridge = CallbackBridge::new()
            .on_surface(Arc::new(|_: &SurfaceId, _: &str, _: &SurfaceEvent| -> Result<()> {
                panic!("bridge torn down")
            }))
            .on_broadcast(Arc::new(|_: &str, _: &BroadcastEvent| -> Result<()> { Ok(()) }));
        let (sink, _) = sink(bridge, &RelayConfig::default());
        assert_eq!(sink.notify(&SurfaceId::from(1), "https://x"), Delivery::Fallback);
    }

    #[test]
    fn test_both_channels_fail() {
        let (sink, metrics) = sink(CallbackBridge::new(), &RelayConfig::default());
        let delivery = sink.notify(&SurfaceId::from(1), "https://x");
        assert_eq!(delivery, Delivery::Dropped);
        assert!(!delivery.is_delivered());
        assert_eq!(metrics.report().dropped, 1);
    }

    #[test]
    fn test_in_page_echo() {
        let scripts = Arc::new(Mutex::new(Vec::new()));
        let scripts_cb = scripts.clone();
        let bridge = CallbackBridge::new()
            .on_surface(Arc::new(|_: &SurfaceId, _: &str, _: &SurfaceEvent| -> Result<()> { Ok(()) }))
            .on_page(Arc::new(move |_: &SurfaceId, script: &str| -> Result<()> {
                scripts_cb.lock().push(script.to_string());
                Ok(())
            }));
        let config = RelayConfig::default().in_page_echo(true);
        let (sink, _) = sink(bridge, &config);

        assert_eq!(sink.notify(&SurfaceId::from(1), "https://x/v.m3u8"), Delivery::Primary);
        let scripts = scripts.lock();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains(r#"url:"https://x/v.m3u8""#));
    }

    #[test]
    fn test_broadcast_only_skips_surface_and_page() {
        let surfaces = Arc::new(Mutex::new(0usize));
        let surfaces_cb = surfaces.clone();
        let broadcasts = Arc::new(Mutex::new(Vec::new()));
        let broadcasts_cb = broadcasts.clone();
        let bridge = CallbackBridge::new()
            .on_surface(Arc::new(move |_: &SurfaceId, _: &str, _: &SurfaceEvent| -> Result<()> {
                *surfaces_cb.lock() += 1;
                Ok(())
            }))
            .on_broadcast(Arc::new(move |_: &str, payload: &BroadcastEvent| -> Result<()> {
                broadcasts_cb.lock().push(payload.clone());
                Ok(())
            }));
        let config = RelayConfig::default().in_page_echo(true);
        let (silent, silent_metrics) = sink(CallbackBridge::new(), &config);
        let (sink, metrics) = sink(bridge, &config);

        let sw = SurfaceId::service_worker();
        assert_eq!(sink.broadcast(&sw, "https://x/sw.js"), Delivery::Fallback);
        assert_eq!(*surfaces.lock(), 0);
        assert_eq!(broadcasts.lock()[0].surface, sw);
        assert_eq!(metrics.report().delivered_fallback, 1);

        assert_eq!(silent.broadcast(&sw, "https://x/sw.js"), Delivery::Dropped);
        assert_eq!(silent_metrics.report().dropped, 1);
    }

    #[test]
    fn test_custom_event_names() {
        let names = Arc::new(Mutex::new(Vec::new()));
        let names_cb = names.clone();
        let bridge = CallbackBridge::new().on_surface(Arc::new(move |_: &SurfaceId, event: &str, _: &SurfaceEvent| -> Result<()> {
            names_cb.lock().push(event.to_string());
            Ok(())
        }));
        let config = RelayConfig::default().surface_event("onMatch");
        let (sink, _) = sink(bridge, &config);
        sink.notify(&SurfaceId::from(1), "u");
        assert_eq!(names.lock().as_slice(), ["onMatch".to_string()]);
    }
}
