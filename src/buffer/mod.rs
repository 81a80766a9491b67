// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded per-surface URL history

mod ring;

pub use ring::RingBuffer;
