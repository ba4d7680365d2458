// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for frame reassembly.
//!
//! Packet insertion never fails with an `Error`: its outcomes are values of
//! [`InsertOutcome`](crate::InsertOutcome). `Error` covers the operations that
//! can genuinely fail (state transitions, allocation, storage extraction,
//! NACK-list pruning and configuration).

use thiserror::Error;

use crate::frame_buffer::FrameState;
use crate::session::NackListError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Frame buffer errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested state change is not part of the frame lifecycle.
    #[error("illegal frame state transition {from} -> {to}")]
    IllegalTransition { from: FrameState, to: FrameState },

    /// Raw state value does not name a frame state.
    #[error("unknown frame state value {0}")]
    UnknownState(u8),

    /// Allocator refused the requested capacity.
    #[error("out of memory: cannot allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Growing the buffer would cross the configured frame size ceiling.
    #[error("frame too large: {required} bytes exceeds maximum of {max} bytes")]
    FrameTooLarge { required: usize, max: usize },

    /// NACK list could not be pruned.
    #[error("NACK list error: {0}")]
    NackList(#[from] NackListError),

    /// Invalid frame buffer configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias for frame buffer operations.
pub type Result<T> = std::result::Result<T, Error>;
