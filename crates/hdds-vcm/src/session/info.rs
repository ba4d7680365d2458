// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Default packet list: RTP sequence-number and marker-bit bookkeeping.
//!
//! Packets are kept as slots sorted by (wrap-aware) sequence number and their
//! bytes are laid out in the same order in the frame buffer. A packet arriving
//! out of order is spliced in by shifting the tail of the buffer, so at any
//! time the occupied part of the buffer is the in-order concatenation of every
//! accepted payload.
//!
//! ```text
//! slots:   [seq 10 | seq 11 | seq 13]        seq 12 arrives
//! buffer:  [aaaa   | bbb    | dd    ]   ->   [aaaa | bbb | cc | dd]
//!                           ^ offset of slot 2, tail moved right by 2
//! ```

use super::nack::NackListError;
use super::{InsertError, PacketList};
use crate::packet::{is_newer_seq_num, seq_num_distance, FrameType, Packet, VideoCodec};

/// Bookkeeping for one received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PacketSlot {
    pub(super) seq_num: u16,
    pub(super) frame_type: FrameType,
    /// Bytes occupied in the buffer, start code included.
    pub(super) size: usize,
    pub(super) is_first_packet: bool,
    pub(super) marker_bit: bool,
}

/// Packet list for one frame.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    pub(super) packets: Vec<PacketSlot>,
    start_seq_num: Option<u16>,
    pub(super) frame_type: FrameType,
    forced_last_packet: bool,
    previous_frame_loss: bool,
    retransmitted: bool,
}

impl SessionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes occupied by all received packets.
    pub fn length(&self) -> usize {
        self.packets.iter().map(|p| p.size).sum()
    }

    /// Number of received packets (control packets included).
    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// Sequence number of the first media packet.
    pub fn start_seq_num(&self) -> Option<u16> {
        self.start_seq_num
    }

    /// At least one packet carries media.
    pub fn has_media(&self) -> bool {
        self.packets.iter().any(|p| p.frame_type.is_media())
    }

    /// Locate `seq_num`: `Ok(index)` if present, `Err(insert_position)` otherwise.
    ///
    /// Scans from the back since packets mostly arrive in order.
    pub(super) fn find_slot(&self, seq_num: u16) -> Result<usize, usize> {
        for (index, slot) in self.packets.iter().enumerate().rev() {
            if slot.seq_num == seq_num {
                return Ok(index);
            }
            if is_newer_seq_num(seq_num, slot.seq_num) {
                return Err(index + 1);
            }
        }
        Err(0)
    }

    fn offset_of(&self, index: usize) -> usize {
        self.packets[..index].iter().map(|p| p.size).sum()
    }

    fn is_contiguous(&self) -> bool {
        match (self.packets.first(), self.packets.last()) {
            (Some(first), Some(last)) => {
                usize::from(seq_num_distance(first.seq_num, last.seq_num)) + 1
                    == self.packets.len()
            }
            _ => false,
        }
    }

    /// Length of the gap-free run starting at the lowest slot.
    fn contiguous_prefix(&self) -> usize {
        if self.packets.is_empty() {
            return 0;
        }
        let mut run = 1;
        while run < self.packets.len()
            && self.packets[run].seq_num == self.packets[run - 1].seq_num.wrapping_add(1)
        {
            run += 1;
        }
        run
    }

    fn recompute_frame_type(&mut self) {
        self.frame_type = self
            .packets
            .iter()
            .map(|p| p.frame_type)
            .fold(FrameType::Empty, merge_frame_type);
    }
}

/// Key frames win; otherwise the first media tag seen sticks.
fn merge_frame_type(current: FrameType, incoming: FrameType) -> FrameType {
    match (current, incoming) {
        (_, FrameType::Key) => FrameType::Key,
        (FrameType::Empty, other) => other,
        (current, _) => current,
    }
}

impl PacketList for SessionInfo {
    fn insert_packet(
        &mut self,
        packet: &Packet,
        buffer: &mut [u8],
        start_code: &[u8],
    ) -> Result<usize, InsertError> {
        let position = match self.find_slot(packet.seq_num) {
            Ok(_) => {
                log::debug!("[Session] seq={} duplicate dropped", packet.seq_num);
                return Err(InsertError::Duplicate);
            }
            Err(position) => position,
        };

        let payload = packet.payload();
        if payload.len() < packet.size_bytes {
            return Err(InsertError::Size);
        }
        let payload = &payload[..packet.size_bytes];
        let prefix: &[u8] = if packet.insert_start_code {
            start_code
        } else {
            &[]
        };
        let inserted = prefix.len() + payload.len();

        let used = self.length();
        if used + inserted > buffer.len() {
            return Err(InsertError::Size);
        }

        let offset = self.offset_of(position);
        buffer.copy_within(offset..used, offset + inserted);
        buffer[offset..offset + prefix.len()].copy_from_slice(prefix);
        buffer[offset + prefix.len()..offset + inserted].copy_from_slice(payload);

        if position < self.packets.len() {
            // Filled a hole below the highest sequence number: late or resent.
            self.retransmitted = true;
        }

        self.packets.insert(
            position,
            PacketSlot {
                seq_num: packet.seq_num,
                frame_type: packet.frame_type,
                size: inserted,
                is_first_packet: packet.is_first_packet,
                marker_bit: packet.marker_bit,
            },
        );
        self.frame_type = merge_frame_type(self.frame_type, packet.frame_type);

        log::debug!(
            "[Session] seq={} stored at slot {}/{} offset={} ({} bytes)",
            packet.seq_num,
            position,
            self.packets.len(),
            offset,
            inserted
        );

        Ok(inserted)
    }

    fn is_session_complete(&self) -> bool {
        let mut media = self.packets.iter().filter(|p| p.frame_type.is_media());
        let Some(first) = media.next() else {
            return false;
        };
        let last = media.last().unwrap_or(first);

        first.is_first_packet
            && (last.marker_bit || self.forced_last_packet)
            && self.is_contiguous()
    }

    fn have_last_packet(&self) -> bool {
        self.forced_last_packet || self.packets.iter().any(|p| p.marker_bit)
    }

    fn force_set_have_last_packet(&mut self) {
        self.forced_last_packet = true;
    }

    fn have_start_seq_num(&self) -> bool {
        self.start_seq_num.is_some()
    }

    fn set_start_seq_num(&mut self, seq_num: u16) {
        self.start_seq_num = Some(seq_num);
    }

    fn low_seq_num(&self) -> Option<u16> {
        self.packets.first().map(|p| p.seq_num)
    }

    fn high_seq_num(&self) -> Option<u16> {
        self.packets.last().map(|p| p.seq_num)
    }

    fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    fn set_previous_frame_loss(&mut self) {
        self.previous_frame_loss = true;
    }

    fn previous_frame_loss(&self) -> bool {
        self.previous_frame_loss
    }

    fn is_retransmitted(&self) -> bool {
        self.retransmitted
    }

    fn zero_out_seq_num(&self, list: &mut [Option<u16>]) -> Result<(), NackListError> {
        self.prune_nack_list(list, false)
    }

    fn zero_out_seq_num_hybrid(
        &self,
        list: &mut [Option<u16>],
        rtt_score: f32,
    ) -> Result<(), NackListError> {
        let suppress_missing = self.suppress_missing_nacks(rtt_score)?;
        self.prune_nack_list(list, suppress_missing)
    }

    fn missing_seq_nums(&self) -> Vec<u16> {
        let mut missing = Vec::new();
        for pair in self.packets.windows(2) {
            let mut seq = pair[0].seq_num.wrapping_add(1);
            while seq != pair[1].seq_num {
                missing.push(seq);
                seq = seq.wrapping_add(1);
            }
        }
        missing
    }

    fn prepare_for_decode(&mut self, buffer: &mut [u8], codec: VideoCodec) -> usize {
        // VP8 conceals lost partitions itself; other codecs need a clean prefix.
        if codec != VideoCodec::Vp8 && !self.is_session_complete() {
            self.make_session_decodable(buffer);
        }
        self.length()
    }

    fn make_session_decodable(&mut self, buffer: &mut [u8]) -> usize {
        let run = self.contiguous_prefix();
        let starts_frame = self.packets[..run]
            .iter()
            .find(|p| p.frame_type.is_media())
            .is_some_and(|p| p.is_first_packet);
        let keep = if starts_frame { run } else { 0 };

        if keep == self.packets.len() {
            return 0;
        }

        let kept_len = self.offset_of(keep);
        let total = self.length();
        buffer[kept_len..total].fill(0);
        self.packets.truncate(keep);
        self.recompute_frame_type();

        log::debug!(
            "[Session] made decodable: kept {} packets, removed {} bytes",
            keep,
            total - kept_len
        );

        total - kept_len
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
