// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Buffer growth policy.
//!
//! Capacity grows in whole steps and never crosses the frame size ceiling.
//! When a packet needs `required` bytes and `required >= capacity`:
//!
//! ```text
//! increments   = ceil(required / step)
//! new_capacity = capacity + increments * step      (must be <= max)
//! ```

use crate::config::FrameBufferConfig;
use crate::error::{Error, Result};

/// Step/ceiling pair taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BufferGrowth {
    step: usize,
    max: usize,
}

impl BufferGrowth {
    pub(crate) fn new(config: &FrameBufferConfig) -> Self {
        Self {
            step: config.buffer_step_size.max(1),
            max: config.max_frame_size,
        }
    }

    /// Capacity to grow to, or `None` when `capacity` already suffices.
    pub(crate) fn plan(&self, capacity: usize, required: usize) -> Result<Option<usize>> {
        if required < capacity {
            return Ok(None);
        }

        let increments = required.div_ceil(self.step);
        let new_capacity = increments
            .checked_mul(self.step)
            .and_then(|grow| grow.checked_add(capacity))
            .filter(|&size| size <= self.max)
            .ok_or(Error::FrameTooLarge {
                required,
                max: self.max,
            })?;

        if new_capacity == capacity {
            return Ok(None);
        }
        Ok(Some(new_capacity))
    }
}
