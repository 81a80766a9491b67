// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request interception coordinator
//!
//! Host callback → filter → buffer → notify (subscribed surfaces only).

mod intercept;
mod store;

pub use intercept::{InterceptCoordinator, InterceptOutcome};
pub use store::{InterceptStore, SurfaceState};
