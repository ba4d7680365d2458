// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encoded frame: owned payload buffer plus decoder-facing metadata.
//!
//! `EncodedFrame` is held by value inside each [`FrameBuffer`](crate::FrameBuffer).
//! The buffer is a `Vec<u8>` whose length *is* the capacity (zero-filled);
//! `length` counts the bytes actually occupied.

use crate::error::{Error, Result};
use crate::packet::{FrameType, VideoCodec};

/// Frame type as presented to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodedFrameType {
    Key,
    #[default]
    Delta,
    Golden,
    AltRef,
    /// Nothing to decode (only control packets were received).
    Skip,
}

impl From<FrameType> for EncodedFrameType {
    fn from(frame_type: FrameType) -> Self {
        match frame_type {
            FrameType::Key => EncodedFrameType::Key,
            FrameType::Delta => EncodedFrameType::Delta,
            FrameType::Golden => EncodedFrameType::Golden,
            FrameType::AltRef => EncodedFrameType::AltRef,
            FrameType::Empty => EncodedFrameType::Skip,
        }
    }
}

/// A previously stored encoded frame (metadata + payload).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedVideoData {
    pub frame_type: FrameType,
    pub timestamp: u32,
    pub payload_type: u8,
    pub encoded_width: u32,
    pub encoded_height: u32,
    pub missing_frame: bool,
    pub complete_frame: bool,
    pub render_time_ms: Option<i64>,
    pub codec: VideoCodec,
    pub payload: Vec<u8>,
}

/// Encoded frame base.
#[derive(Debug, Clone, Default)]
pub struct EncodedFrame {
    buffer: Vec<u8>,
    length: usize,
    pub(crate) timestamp: u32,
    pub(crate) payload_type: u8,
    pub(crate) codec: VideoCodec,
    pub(crate) encoded_width: u32,
    pub(crate) encoded_height: u32,
    pub(crate) render_time_ms: Option<i64>,
    pub(crate) frame_type: EncodedFrameType,
    pub(crate) complete_frame: bool,
    pub(crate) missing_frame: bool,
}

impl EncodedFrame {
    /// Create an empty frame with no backing memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Occupied bytes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Occupied part of the buffer.
    pub fn payload(&self) -> &[u8] {
        &self.buffer[..self.length]
    }

    /// Whole allocated buffer (occupied bytes followed by zero fill).
    pub(crate) fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub(crate) fn set_length(&mut self, length: usize) {
        debug_assert!(length <= self.buffer.len(), "length beyond capacity");
        self.length = length.min(self.buffer.len());
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    pub fn codec(&self) -> VideoCodec {
        self.codec
    }

    pub fn encoded_width(&self) -> u32 {
        self.encoded_width
    }

    pub fn encoded_height(&self) -> u32 {
        self.encoded_height
    }

    pub fn render_time_ms(&self) -> Option<i64> {
        self.render_time_ms
    }

    pub fn frame_type(&self) -> EncodedFrameType {
        self.frame_type
    }

    /// True when every packet of the frame was received.
    pub fn is_complete_frame(&self) -> bool {
        self.complete_frame
    }

    /// True when the previous frame was lost (decoder should expect artifacts).
    pub fn is_missing_frame(&self) -> bool {
        self.missing_frame
    }

    /// Ensure the buffer holds at least `min_size` bytes.
    ///
    /// Existing bytes are preserved; the new tail is zero-filled. The buffer is
    /// left untouched if the allocator refuses the request.
    pub fn verify_and_allocate(&mut self, min_size: usize) -> Result<()> {
        let current = self.buffer.len();
        if min_size <= current {
            return Ok(());
        }

        self.buffer
            .try_reserve_exact(min_size - current)
            .map_err(|_| Error::OutOfMemory {
                requested: min_size,
            })?;
        self.buffer.resize(min_size, 0);
        Ok(())
    }

    /// Reset metadata and release the buffer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
