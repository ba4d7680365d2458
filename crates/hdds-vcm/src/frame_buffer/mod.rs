// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Frame buffer
//!
//! Reassembles one encoded video frame from transport packets that may arrive
//! out of order, duplicated or not at all, and tracks whether the frame is
//! ready to decode.
//!
//! ## Insertion flow
//!
//! ```text
//! transport ---> insert_packet(packet, arrival_ms)
//!                  |  state / timestamp / size checks
//!                  |  grow buffer (whole steps, under max_frame_size)
//!                  |  PacketList::insert_packet (places bytes, rejects duplicates)
//!                  |  latch metadata, advance length
//!                  v
//!                InsertOutcome ---> caller: NACK / set_state(Complete) / drop
//! ```
//!
//! The frame buffer never moves itself to `Complete`: on
//! [`InsertOutcome::CompleteSession`] the owner decides (it may need to take
//! the frame out of a waiting list first) and calls
//! [`FrameBuffer::set_state`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hdds_vcm::{FrameBuffer, FrameBufferConfig, FrameState, FrameType, InsertOutcome, Packet};
//!
//! # fn main() -> hdds_vcm::Result<()> {
//! let mut frame = FrameBuffer::new(Arc::new(FrameBufferConfig::default()));
//! frame.set_state(FrameState::Empty)?;
//!
//! let packet = Packet::new(7, 90_000, FrameType::Key, vec![0x65; 100]).first().marker();
//! let now_ms = 1_000;
//! match frame.insert_packet(&packet, now_ms) {
//!     InsertOutcome::CompleteSession => frame.set_state(FrameState::Complete)?,
//!     InsertOutcome::DuplicatePacket | InsertOutcome::Incomplete => {}
//!     other => log::debug!("packet dropped: {:?}", other),
//! }
//! assert_eq!(frame.state(), FrameState::Complete);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Not synchronized. Every mutation takes `&mut self`; the owning frame pool
//! serializes access.

mod growth;
mod state;

use std::sync::Arc;

use crate::config::FrameBufferConfig;
use crate::encoded_frame::{EncodedFrame, EncodedFrameType, EncodedVideoData};
use crate::error::{Error, Result};
use crate::packet::{FrameType, Packet, VideoCodec};
use crate::session::{InsertError, PacketList, SessionInfo};

use growth::BufferGrowth;
pub use state::FrameState;

/// Result of [`FrameBuffer::insert_packet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Accepted (or ignored while decoding); frame not complete yet.
    Incomplete,
    /// Accepted; the packet list reports every packet present.
    CompleteSession,
    /// Sequence number already held by this frame.
    DuplicatePacket,
    /// Packet belongs to another frame.
    TimeStampError,
    /// Frame would exceed its size ceiling, payload missing, or allocation failed.
    SizeError,
    /// Frame slot is not active.
    StateError,
}

impl InsertOutcome {
    /// True for outcomes caused by a bad packet or a bad caller.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            InsertOutcome::TimeStampError | InsertOutcome::SizeError | InsertOutcome::StateError
        )
    }
}

/// One frame being assembled.
#[derive(Debug, Clone)]
pub struct FrameBuffer<L: PacketList = SessionInfo> {
    config: Arc<FrameBufferConfig>,
    growth: BufferGrowth,
    frame: EncodedFrame,
    state: FrameState,
    frame_counted: bool,
    session: L,
    nack_count: u16,
    latest_packet_time_ms: Option<i64>,
}

impl FrameBuffer<SessionInfo> {
    /// Create a free frame buffer using the default packet list.
    ///
    /// `config` is expected to pass [`FrameBufferConfig::validate`]; use
    /// [`FrameBuffer::try_new`] for configurations built at runtime.
    pub fn new(config: Arc<FrameBufferConfig>) -> Self {
        Self::with_packet_list(config, SessionInfo::default())
    }

    /// Create a free frame buffer, rejecting an invalid configuration.
    pub fn try_new(config: Arc<FrameBufferConfig>) -> Result<Self> {
        Self::try_with_packet_list(config, SessionInfo::default())
    }
}

impl Default for FrameBuffer<SessionInfo> {
    fn default() -> Self {
        Self::new(Arc::new(FrameBufferConfig::default()))
    }
}

impl<L: PacketList> FrameBuffer<L> {
    /// Create a free frame buffer around a specific packet list.
    ///
    /// An invalid `config` trips a debug assertion; release builds log a
    /// warning and grow in steps of at least one byte.
    pub fn with_packet_list(config: Arc<FrameBufferConfig>, session: L) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("[FrameBuf] invalid frame buffer configuration: {}", e);
            if cfg!(debug_assertions) {
                panic!("invalid frame buffer configuration: {}", e);
            }
        }
        Self::build(config, session)
    }

    /// Like [`with_packet_list`](Self::with_packet_list), but returns
    /// [`Error::Config`] for an invalid configuration.
    pub fn try_with_packet_list(config: Arc<FrameBufferConfig>, session: L) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, session))
    }

    fn build(config: Arc<FrameBufferConfig>, session: L) -> Self {
        let growth = BufferGrowth::new(&config);
        Self {
            config,
            growth,
            frame: EncodedFrame::new(),
            state: FrameState::Free,
            frame_counted: false,
            session,
            nack_count: 0,
            latest_packet_time_ms: None,
        }
    }

    // ========================================================================
    // Packet insertion
    // ========================================================================

    /// Insert a packet received at `arrival_ms`.
    ///
    /// Rejected packets leave the frame untouched.
    pub fn insert_packet(&mut self, packet: &Packet, arrival_ms: i64) -> InsertOutcome {
        match self.state {
            // Already handed to the decoder: late duplicates are expected.
            FrameState::Decoding => return InsertOutcome::Incomplete,
            FrameState::Free => return InsertOutcome::StateError,
            _ => {}
        }

        let timestamp = self.frame.timestamp();
        if timestamp != 0 && timestamp != packet.timestamp {
            log::debug!(
                "[FrameBuf] ts={} rejected packet seq={} with ts={}",
                timestamp,
                packet.seq_num,
                packet.timestamp
            );
            return InsertOutcome::TimeStampError;
        }

        let incoming = packet.inserted_len(self.config.start_code_len());
        // Projected against the allocated size, not the occupied length.
        let projected = self.frame.capacity() + incoming;
        if projected > self.config.max_frame_size {
            log::debug!(
                "[FrameBuf] ts={} seq={} projects frame to {} bytes (max {})",
                packet.timestamp,
                packet.seq_num,
                projected,
                self.config.max_frame_size
            );
            return InsertOutcome::SizeError;
        }
        if packet.data.is_none() && packet.size_bytes > 0 {
            return InsertOutcome::SizeError;
        }

        let required = self.frame.length() + incoming;
        if let Err(e) = self.reserve(required) {
            log::debug!("[FrameBuf] ts={} growth failed: {}", packet.timestamp, e);
            return InsertOutcome::SizeError;
        }

        let written = match self.session.insert_packet(
            packet,
            self.frame.buffer_mut(),
            &self.config.start_code,
        ) {
            Ok(written) => written,
            Err(InsertError::Size) => return InsertOutcome::SizeError,
            Err(InsertError::Duplicate) => return InsertOutcome::DuplicatePacket,
        };

        self.latch_packet_metadata(packet);
        self.frame.set_length(self.frame.length() + written);
        self.latest_packet_time_ms = Some(arrival_ms);

        if self.session.is_session_complete() {
            return InsertOutcome::CompleteSession;
        }
        if self.state == FrameState::Complete {
            // A complete layer was seen, but an independent layer of the same
            // frame is still missing packets.
            self.state = FrameState::Incomplete;
        }
        InsertOutcome::Incomplete
    }

    fn latch_packet_metadata(&mut self, packet: &Packet) {
        if packet.frame_type.is_media() && !self.session.have_start_seq_num() {
            self.session.set_start_seq_num(packet.seq_num);
        }
        if packet.data.is_some() {
            self.frame.payload_type = packet.payload_type;
        }
        if self.state == FrameState::Empty {
            self.frame.timestamp = packet.timestamp;
            self.frame.codec = packet.codec;
            if packet.frame_type.is_media() {
                self.state = FrameState::Incomplete;
            }
        }
    }

    /// Grow the buffer so `required` bytes fit.
    fn reserve(&mut self, required: usize) -> Result<()> {
        match self.growth.plan(self.frame.capacity(), required)? {
            Some(new_capacity) => self.frame.verify_and_allocate(new_capacity),
            None => Ok(()),
        }
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Request a lifecycle transition.
    ///
    /// Requests outside the transition table are programming errors: they
    /// trip a debug assertion, and in release builds they are logged and
    /// rejected without modifying the frame.
    pub fn set_state(&mut self, state: FrameState) -> Result<()> {
        if self.state == state {
            return Ok(());
        }

        match state {
            FrameState::Free => {
                // Caller must already have removed the frame from any
                // timestamp-ordered list.
                self.reset();
                return Ok(());
            }
            FrameState::Decodable if self.state == FrameState::Complete => {
                // Complete implies decodable.
                return Ok(());
            }
            _ => {}
        }

        if !state.can_transition_from(self.state) {
            return Err(self.reject_transition(state));
        }

        let target = match state {
            FrameState::Decodable if self.session.is_session_complete() => FrameState::Complete,
            FrameState::Decoding => {
                self.restructure_frame_information();
                FrameState::Decoding
            }
            other => other,
        };

        log::debug!(
            "[FrameBuf] ts={} state {} -> {}",
            self.frame.timestamp(),
            self.state,
            target
        );
        self.state = target;
        Ok(())
    }

    fn reject_transition(&self, to: FrameState) -> Error {
        log::warn!(
            "[FrameBuf] ts={} illegal state transition {} -> {} ignored",
            self.frame.timestamp(),
            self.state,
            to
        );
        if cfg!(debug_assertions) {
            panic!("illegal frame state transition {} -> {}", self.state, to);
        }
        Error::IllegalTransition {
            from: self.state,
            to,
        }
    }

    /// Transfer session information into the encoded frame for decoding.
    fn restructure_frame_information(&mut self) {
        let codec = self.frame.codec();
        let length = self
            .session
            .prepare_for_decode(self.frame.buffer_mut(), codec);
        self.frame.set_length(length);
        self.frame.frame_type = EncodedFrameType::from(self.session.frame_type());
        self.frame.complete_frame = self.session.is_session_complete();
        self.frame.missing_frame = self.session.previous_frame_loss();
    }

    /// Current state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Current state together with the frame timestamp.
    pub fn state_and_timestamp(&self) -> (FrameState, u32) {
        (self.state, self.frame.timestamp())
    }

    // ========================================================================
    // Reset / decodability
    // ========================================================================

    /// Return to `Free`: all data and bookkeeping cleared, buffer released.
    pub fn reset(&mut self) {
        self.frame.reset();
        self.session.reset();
        self.frame_counted = false;
        self.nack_count = 0;
        self.latest_packet_time_ms = None;
        self.state = FrameState::Free;
    }

    /// Drop data that cannot be decoded (packets after a loss).
    pub fn make_session_decodable(&mut self) {
        let removed = self.session.make_session_decodable(self.frame.buffer_mut());
        let length = self.frame.length().saturating_sub(removed);
        self.frame.set_length(length);
    }

    /// Treat the highest received packet as the last one.
    ///
    /// Returns whether the session is now complete.
    pub fn force_set_have_last_packet(&mut self) -> bool {
        self.session.force_set_have_last_packet();
        self.session.is_session_complete()
    }

    // ========================================================================
    // Storage extraction
    // ========================================================================

    /// Rebuild the frame from a stored encoded frame, bypassing packet assembly.
    ///
    /// The frame is not modified if the payload cannot be allocated.
    pub fn extract_from_storage(&mut self, stored: &EncodedVideoData) -> Result<()> {
        let size = stored.payload.len();
        if size > self.config.max_frame_size {
            return Err(Error::OutOfMemory { requested: size });
        }
        self.frame.verify_and_allocate(size)?;

        self.frame.frame_type = EncodedFrameType::from(stored.frame_type);
        self.frame.timestamp = stored.timestamp;
        self.frame.payload_type = stored.payload_type;
        self.frame.encoded_width = stored.encoded_width;
        self.frame.encoded_height = stored.encoded_height;
        self.frame.missing_frame = stored.missing_frame;
        self.frame.complete_frame = stored.complete_frame;
        self.frame.render_time_ms = stored.render_time_ms;
        self.frame.codec = stored.codec;

        self.frame.buffer_mut()[..size].copy_from_slice(&stored.payload);
        self.frame.set_length(size);
        Ok(())
    }

    // ========================================================================
    // Loss / retransmission bookkeeping
    // ========================================================================

    /// Record one more retransmission request for this frame.
    pub fn increment_nack_count(&mut self) {
        self.nack_count = self.nack_count.saturating_add(1);
    }

    pub fn nack_count(&self) -> u16 {
        self.nack_count
    }

    /// Arrival time of the last accepted packet.
    pub fn latest_packet_time_ms(&self) -> Option<i64> {
        self.latest_packet_time_ms
    }

    pub fn is_retransmitted(&self) -> bool {
        self.session.is_retransmitted()
    }

    /// Clear NACK entries this frame no longer needs.
    pub fn zero_out_seq_num(&self, list: &mut [Option<u16>]) -> Result<()> {
        Ok(self.session.zero_out_seq_num(list)?)
    }

    /// Clear NACK entries, weighing retransmission against `rtt_score`.
    pub fn zero_out_seq_num_hybrid(&self, list: &mut [Option<u16>], rtt_score: f32) -> Result<()> {
        Ok(self.session.zero_out_seq_num_hybrid(list, rtt_score)?)
    }

    /// Sequence numbers missing inside the received range.
    pub fn missing_seq_nums(&self) -> Vec<u16> {
        self.session.missing_seq_nums()
    }

    pub fn set_previous_frame_loss(&mut self) {
        self.session.set_previous_frame_loss();
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn low_seq_num(&self) -> Option<u16> {
        self.session.low_seq_num()
    }

    pub fn high_seq_num(&self) -> Option<u16> {
        self.session.high_seq_num()
    }

    pub fn is_session_complete(&self) -> bool {
        self.session.is_session_complete()
    }

    pub fn have_last_packet(&self) -> bool {
        self.session.have_last_packet()
    }

    /// Frame type as reported by the packet list.
    pub fn frame_type(&self) -> FrameType {
        self.session.frame_type()
    }

    /// Frame timestamp (0 until the first packet is accepted).
    pub fn timestamp(&self) -> u32 {
        self.frame.timestamp()
    }

    pub fn length(&self) -> usize {
        self.frame.length()
    }

    pub fn capacity(&self) -> usize {
        self.frame.capacity()
    }

    /// Assembled bytes.
    pub fn payload(&self) -> &[u8] {
        self.frame.payload()
    }

    pub fn payload_type(&self) -> u8 {
        self.frame.payload_type()
    }

    pub fn codec(&self) -> VideoCodec {
        self.frame.codec()
    }

    /// Decoder-facing view of the frame.
    pub fn encoded_frame(&self) -> &EncodedFrame {
        &self.frame
    }

    pub fn packet_list(&self) -> &L {
        &self.session
    }

    pub fn config(&self) -> &FrameBufferConfig {
        &self.config
    }

    /// Mark whether the owner's frame statistics include this frame.
    pub fn set_counted_frame(&mut self, counted: bool) {
        self.frame_counted = counted;
    }

    pub fn is_counted_frame(&self) -> bool {
        self.frame_counted
    }
}
