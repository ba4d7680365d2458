// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS VCM - Video frame reassembly
//!
//! Reassembles encoded video frames from transport packets that arrive out of
//! order, duplicated or lossy, and decides when a frame can be handed to the
//! decoder. This is the per-frame core of a video jitter buffer: the pool of
//! frames, the decode scheduler and the NACK scheduler live above it.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hdds_vcm::{FrameBuffer, FrameBufferConfig, FrameState, FrameType, InsertOutcome, Packet};
//!
//! fn main() -> hdds_vcm::Result<()> {
//!     let config = Arc::new(FrameBufferConfig::default());
//!     let mut frame = FrameBuffer::new(config);
//!     frame.set_state(FrameState::Empty)?;
//!
//!     let second = Packet::new(2, 3000, FrameType::Key, vec![0xBB; 800]).marker();
//!     let first = Packet::new(1, 3000, FrameType::Key, vec![0xAA; 1200]).first();
//!
//!     assert_eq!(frame.insert_packet(&second, 10), InsertOutcome::Incomplete);
//!     assert_eq!(frame.insert_packet(&first, 12), InsertOutcome::CompleteSession);
//!
//!     frame.set_state(FrameState::Complete)?;
//!     frame.set_state(FrameState::Decoding)?;
//!     assert_eq!(frame.encoded_frame().length(), 2000);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |            Jitter buffer (frame pool, decode / NACK scheduling)     |
//! +---------------------------------------------------------------------+
//! |  FrameBuffer        state machine | size ceiling | buffer growth    |
//! +---------------------------------------------------------------------+
//! |  PacketList         ordering | duplicates | completeness | NACK     |
//! +---------------------------------------------------------------------+
//! |  EncodedFrame       owned bytes + decoder metadata                  |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`FrameBuffer`] | One frame under assembly, owns its lifecycle |
//! | [`FrameState`] | Lifecycle state (`Free` .. `Decoding`) |
//! | [`InsertOutcome`] | Result of inserting one packet |
//! | [`Packet`] | Transport packet supplied by the caller |
//! | [`PacketList`] | Packet bookkeeping contract, [`SessionInfo`] by default |
//! | [`FrameBufferConfig`] | Size ceiling, growth step, start code |
//!
//! ## Modules Overview
//!
//! - [`frame_buffer`] - Frame assembly and state machine (start here)
//! - [`session`] - Packet-list bookkeeping and NACK pruning
//! - [`encoded_frame`] - Decoder-facing frame
//! - [`packet`] - Transport packet and sequence-number helpers
//! - [`config`] - Configuration (TOML via the `config-file` feature)
//!
//! ## Concurrency
//!
//! Nothing here is synchronized. A frame buffer is mutated through `&mut self`
//! only; share a pool of frames behind whatever lock the owner already uses.

pub mod config;
pub mod encoded_frame;
pub mod error;
pub mod frame_buffer;
pub mod packet;
pub mod session;

pub use config::{
    FrameBufferConfig, DEFAULT_BUFFER_STEP_SIZE, DEFAULT_MAX_FRAME_SIZE, H264_START_CODE,
};
pub use encoded_frame::{EncodedFrame, EncodedFrameType, EncodedVideoData};
pub use error::{ConfigError, Error, Result};
pub use frame_buffer::{FrameBuffer, FrameState, InsertOutcome};
pub use packet::{is_newer_seq_num, FrameType, Packet, VideoCodec};
pub use session::{
    InsertError, NackListError, PacketList, SessionInfo, HYBRID_NACK_SCORE_THRESHOLD,
};
