// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frame buffer configuration.
//!
//! Size ceilings and the growth step are per-deployment settings, not globals:
//! a frame buffer receives its `FrameBufferConfig` at construction and frames
//! of one pool usually share it through an `Arc`.
//!
//! Supports both programmatic and file-based configuration (the latter behind
//! the default `config-file` feature).
//!
//! ```rust,no_run
//! use hdds_vcm::FrameBufferConfig;
//!
//! # fn main() -> Result<(), hdds_vcm::ConfigError> {
//! let config = FrameBufferConfig::default()
//!     .with_max_frame_size(1_000_000)
//!     .with_buffer_step_size(10_000);
//! config.validate()?;
//!
//! // Or from a TOML file:
//! // max_frame_size = 1000000
//! // buffer_step_size = 10000
//! // start_code = [0, 0, 1]
//! # #[cfg(feature = "config-file")]
//! let config = FrameBufferConfig::from_file("frame_buffer.toml")?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "config-file")]
use std::path::Path;

use crate::error::ConfigError;

/// Default hard ceiling for one assembled frame (4 MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4_000_000;

/// Default buffer growth increment (30 KB).
pub const DEFAULT_BUFFER_STEP_SIZE: usize = 30_000;

/// Annex-B start code synthesized in front of H.264 NAL units.
pub const H264_START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// Frame buffer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct FrameBufferConfig {
    /// Hard maximum number of bytes one frame may occupy.
    pub max_frame_size: usize,

    /// Capacity grows in whole multiples of this many bytes.
    pub buffer_step_size: usize,

    /// Bytes prefixed to packets flagged with `insert_start_code`.
    pub start_code: Vec<u8>,
}

impl Default for FrameBufferConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            buffer_step_size: DEFAULT_BUFFER_STEP_SIZE,
            start_code: H264_START_CODE.to_vec(),
        }
    }
}

impl FrameBufferConfig {
    /// Load configuration from a TOML file.
    #[cfg(feature = "config-file")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum frame size.
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Set the buffer growth step.
    pub fn with_buffer_step_size(mut self, buffer_step_size: usize) -> Self {
        self.buffer_step_size = buffer_step_size;
        self
    }

    /// Set the synthesized start code.
    pub fn with_start_code(mut self, start_code: impl Into<Vec<u8>>) -> Self {
        self.start_code = start_code.into();
        self
    }

    /// Length of the synthesized start code, used in size projections.
    pub fn start_code_len(&self) -> usize {
        self.start_code.len()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_step_size == 0 {
            return Err(ConfigError::Invalid(
                "buffer_step_size must be greater than zero".into(),
            ));
        }
        if self.buffer_step_size > self.max_frame_size {
            return Err(ConfigError::Invalid(format!(
                "buffer_step_size ({}) exceeds max_frame_size ({})",
                self.buffer_step_size, self.max_frame_size
            )));
        }
        if self.start_code.len() > self.max_frame_size {
            return Err(ConfigError::Invalid(format!(
                "start code of {} bytes cannot fit in max_frame_size ({})",
                self.start_code.len(),
                self.max_frame_size
            )));
        }
        Ok(())
    }
}
