// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host bridge abstraction
//!
//! The host owns the actual event emitters. The relay only needs three
//! fire-and-forget operations from it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use super::event::{BroadcastEvent, SurfaceEvent};
use crate::error::{Error, Result};
use crate::surface::SurfaceId;

/// Outbound side of the host runtime
///
/// All methods must return promptly; they are called on the host's request
/// callback thread.
pub trait HostBridge: Send + Sync {
    /// Deliver an event to one specific surface
    fn emit_to_surface(&self, surface: &SurfaceId, event: &str, payload: &SurfaceEvent) -> Result<()>;

    /// Deliver an event on an application-wide channel
    fn broadcast(&self, channel: &str, payload: &BroadcastEvent) -> Result<()>;

    /// Run a script inside the surface's page
    fn evaluate_in_page(&self, surface: &SurfaceId, script: &str) -> Result<()> {
        let _ = (surface, script);
        Err(Error::Unsupported("evaluate_in_page".to_string()))
    }
}

/// Bridge that accepts and discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBridge;

impl HostBridge for NullBridge {
    fn emit_to_surface(&self, _: &SurfaceId, _: &str, _: &SurfaceEvent) -> Result<()> {
        Ok(())
    }

    fn broadcast(&self, _: &str, _: &BroadcastEvent) -> Result<()> {
        Ok(())
    }
}

/// Surface delivery callback
pub type SurfaceCallback = Arc<dyn Fn(&SurfaceId, &str, &SurfaceEvent) -> Result<()> + Send + Sync>;

/// Broadcast delivery callback
pub type BroadcastCallback = Arc<dyn Fn(&str, &BroadcastEvent) -> Result<()> + Send + Sync>;

/// In-page script callback
pub type PageCallback = Arc<dyn Fn(&SurfaceId, &str) -> Result<()> + Send + Sync>;

/// Bridge backed by plain closures
///
/// A missing callback makes the corresponding operation fail, which lets a
/// host wire only the broadcast path and rely on the fallback.
#[derive(Clone, Default)]
pub struct CallbackBridge {
    on_surface: Option<SurfaceCallback>,
    on_broadcast: Option<BroadcastCallback>,
    on_page: Option<PageCallback>,
}

impl CallbackBridge {
    /// Create a bridge with no callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set surface callback
    pub fn on_surface(mut self, callback: SurfaceCallback) -> Self {
        self.on_surface = Some(callback);
        self
    }

    /// Set broadcast callback
    pub fn on_broadcast(mut self, callback: BroadcastCallback) -> Self {
        self.on_broadcast = Some(callback);
        self
    }

    /// Set in-page callback
    pub fn on_page(mut self, callback: PageCallback) -> Self {
        self.on_page = Some(callback);
        self
    }
}

impl std::fmt::Debug for CallbackBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackBridge")
            .field("on_surface", &self.on_surface.is_some())
            .field("on_broadcast", &self.on_broadcast.is_some())
            .field("on_page", &self.on_page.is_some())
            .finish()
    }
}

impl HostBridge for CallbackBridge {
    fn emit_to_surface(&self, surface: &SurfaceId, event: &str, payload: &SurfaceEvent) -> Result<()> {
        match self.on_surface {
            Some(ref callback) => callback(surface, event, payload),
            None => Err(Error::delivery(event, "no surface callback installed")),
        }
    }

    fn broadcast(&self, channel: &str, payload: &BroadcastEvent) -> Result<()> {
        match self.on_broadcast {
            Some(ref callback) => callback(channel, payload),
            None => Err(Error::delivery(channel, "no broadcast callback installed")),
        }
    }

    fn evaluate_in_page(&self, surface: &SurfaceId, script: &str) -> Result<()> {
        match self.on_page {
            Some(ref callback) => callback(surface, script),
            None => Err(Error::Unsupported("evaluate_in_page".to_string())),
        }
    }
}

/// Message seen by broadcast listeners of a [`ChannelBridge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Channel name the event was sent on
    pub channel: String,
    /// Event payload
    pub event: BroadcastEvent,
}

/// Script handed to a [`ChannelBridge`] page listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScript {
    pub surface: SurfaceId,
    pub script: String,
}

/// Bridge built on tokio broadcast channels
///
/// Surface delivery succeeds only while a listener holds a receiver for that
/// surface; otherwise it fails and the sink falls back to the broadcast
/// channel.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    surfaces: Arc<DashMap<SurfaceId, broadcast::Sender<SurfaceEvent>>>,
    broadcast_tx: broadcast::Sender<ChannelMessage>,
    page_tx: broadcast::Sender<PageScript>,
    capacity: usize,
}

impl ChannelBridge {
    /// Create a bridge whose channels buffer `capacity` events per listener
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (broadcast_tx, _) = broadcast::channel(capacity);
        let (page_tx, _) = broadcast::channel(capacity);
        Self {
            surfaces: Arc::new(DashMap::new()),
            broadcast_tx,
            page_tx,
            capacity,
        }
    }

    /// Listen for events targeted at one surface
    pub fn listen(&self, surface: impl Into<SurfaceId>) -> broadcast::Receiver<SurfaceEvent> {
        self.surfaces
            .entry(surface.into())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Listen on the broadcast channel
    pub fn listen_broadcast(&self) -> broadcast::Receiver<ChannelMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Listen for in-page scripts
    pub fn listen_page(&self) -> broadcast::Receiver<PageScript> {
        self.page_tx.subscribe()
    }

    /// Forget the listener registry for a surface
    pub fn detach(&self, surface: &SurfaceId) {
        self.surfaces.remove(surface);
    }
}

impl Default for ChannelBridge {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HostBridge for ChannelBridge {
    fn emit_to_surface(&self, surface: &SurfaceId, event: &str, payload: &SurfaceEvent) -> Result<()> {
        let sender = self
            .surfaces
            .get(surface)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::delivery(event, format!("no listener for surface {}", surface)))?;
        sender
            .send(payload.clone())
            .map(|_| ())
            .map_err(|_| Error::delivery(event, format!("listeners for surface {} dropped", surface)))
    }

    fn broadcast(&self, channel: &str, payload: &BroadcastEvent) -> Result<()> {
        self.broadcast_tx
            .send(ChannelMessage {
                channel: channel.to_string(),
                event: payload.clone(),
            })
            .map(|_| ())
            .map_err(|_| Error::delivery(channel, "no broadcast listeners"))
    }

    fn evaluate_in_page(&self, surface: &SurfaceId, script: &str) -> Result<()> {
        self.page_tx
            .send(PageScript {
                surface: surface.clone(),
                script: script.to_string(),
            })
            .map(|_| ())
            .map_err(|_| Error::delivery("page", "no page listeners"))
    }
}
