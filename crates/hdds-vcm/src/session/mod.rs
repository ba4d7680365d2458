// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Packet-list bookkeeping
//!
//! The frame buffer owns the bytes; the packet list owns the knowledge of
//! *which* packets those bytes came from. It tracks the sequence numbers of one
//! frame, places each payload at its logical offset, detects duplicates and
//! answers the completeness/decodability questions.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`PacketList`] | Contract consumed by [`FrameBuffer`](crate::FrameBuffer) |
//! | [`SessionInfo`] | Default implementation (RTP sequence/marker based) |
//! | [`NackListError`] | Failure modes of NACK-list pruning |
//!
//! ## Value semantics
//!
//! Implementations are plain values: cloning a frame buffer deep-copies its
//! packet list, so two frames never alias the same bookkeeping state.

mod info;
mod nack;

use std::fmt::Debug;

use crate::packet::{FrameType, Packet, VideoCodec};

pub use info::SessionInfo;
pub use nack::{NackListError, HYBRID_NACK_SCORE_THRESHOLD};

/// Why a packet could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// Buffer too small for the packet, or payload shorter than declared.
    Size,
    /// Sequence number already present in this frame.
    Duplicate,
}

/// Packet-list bookkeeping contract.
pub trait PacketList: Clone + Default + Debug {
    /// Write `packet` into `buffer` at its logical offset.
    ///
    /// `buffer` is the whole allocated frame buffer; bytes already placed by
    /// earlier packets are moved as needed so the buffer stays in sequence
    /// order. `start_code` is prefixed when the packet requests it.
    ///
    /// Returns the number of bytes added.
    fn insert_packet(
        &mut self,
        packet: &Packet,
        buffer: &mut [u8],
        start_code: &[u8],
    ) -> Result<usize, InsertError>;

    /// All packets of the frame are present.
    fn is_session_complete(&self) -> bool;

    /// The packet carrying the marker bit was received (or force-set).
    fn have_last_packet(&self) -> bool;

    /// Treat the highest received packet as the last one.
    fn force_set_have_last_packet(&mut self);

    fn have_start_seq_num(&self) -> bool;

    fn set_start_seq_num(&mut self, seq_num: u16);

    /// Lowest received sequence number.
    fn low_seq_num(&self) -> Option<u16>;

    /// Highest received sequence number.
    fn high_seq_num(&self) -> Option<u16>;

    fn frame_type(&self) -> FrameType;

    fn set_previous_frame_loss(&mut self);

    fn previous_frame_loss(&self) -> bool;

    fn is_retransmitted(&self) -> bool;

    /// Clear NACK entries this frame no longer needs (strict mode).
    fn zero_out_seq_num(&self, list: &mut [Option<u16>]) -> Result<(), NackListError>;

    /// Clear NACK entries, also suppressing requests not worth their RTT.
    fn zero_out_seq_num_hybrid(
        &self,
        list: &mut [Option<u16>],
        rtt_score: f32,
    ) -> Result<(), NackListError>;

    /// Sequence numbers missing between the low and high sequence numbers.
    fn missing_seq_nums(&self) -> Vec<u16>;

    /// Finalize the buffer for decoding. Returns the usable length.
    fn prepare_for_decode(&mut self, buffer: &mut [u8], codec: VideoCodec) -> usize;

    /// Drop data that cannot be decoded. Returns the number of bytes removed.
    fn make_session_decodable(&mut self, buffer: &mut [u8]) -> usize;

    fn reset(&mut self);
}
