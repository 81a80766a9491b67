// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Event fan-out to the application listener layer
//!
//! Matched URLs go to the surface-targeted event first and fall back to a
//! well-known broadcast channel when that fails.

mod bridge;
mod event;
mod sink;

pub use bridge::{
    BroadcastCallback, CallbackBridge, ChannelBridge, ChannelMessage, HostBridge, NullBridge,
    PageCallback, PageScript, SurfaceCallback,
};
pub use event::{
    sanitize_for_js, BroadcastEvent, InPageMessage, InterceptKind, InterceptedRequest,
    SurfaceEvent,
};
pub use sink::{Delivery, EventSink};

pub(crate) use sink::panic_message;
