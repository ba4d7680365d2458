// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::doc_markdown)] // Test documentation
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::similar_names)] // Test variable naming

//! Frame assembly integration tests
//!
//! Drives `FrameBuffer` through realistic packet sequences: activation,
//! loss, reordering, duplicates, control packets, size ceilings, layer
//! regression and the hand-off to the decoder.

use std::sync::Arc;

use hdds_vcm::{
    EncodedFrameType, FrameBuffer, FrameBufferConfig, FrameState, FrameType, InsertError,
    InsertOutcome, NackListError, Packet, PacketList, VideoCodec,
};

const TS: u32 = 3000;

fn config(max: usize, step: usize) -> Arc<FrameBufferConfig> {
    Arc::new(
        FrameBufferConfig::default()
            .with_max_frame_size(max)
            .with_buffer_step_size(step),
    )
}

fn activated(config: Arc<FrameBufferConfig>) -> FrameBuffer {
    let mut frame = FrameBuffer::new(config);
    frame.set_state(FrameState::Empty).expect("activation");
    frame
}

fn delta(seq: u16, len: usize) -> Packet {
    Packet::new(seq, TS, FrameType::Delta, vec![seq as u8; len])
}

// ============================================================================
// Basic assembly
// ============================================================================

#[test]
fn test_two_packet_frame_in_reverse_order() {
    let mut frame = activated(Arc::new(FrameBufferConfig::default()));

    let second = delta(2, 800).marker();
    let first = delta(1, 1200).first();

    assert_eq!(frame.insert_packet(&second, 100), InsertOutcome::Incomplete);
    assert_eq!(frame.state(), FrameState::Incomplete);
    assert_eq!(frame.insert_packet(&first, 105), InsertOutcome::CompleteSession);

    assert_eq!(frame.length(), 2000);
    assert_eq!(frame.capacity(), 30_000);
    assert_eq!(frame.timestamp(), TS);
    assert_eq!(frame.latest_packet_time_ms(), Some(105));
    assert!(frame.is_retransmitted());

    let payload = frame.payload();
    assert!(payload[..1200].iter().all(|&b| b == 1));
    assert!(payload[1200..].iter().all(|&b| b == 2));
}

#[test]
fn test_h264_start_codes_are_synthesized() {
    let mut frame = activated(Arc::new(FrameBufferConfig::default()));
    let nal = |seq: u16, byte: u8| {
        Packet::new(seq, TS, FrameType::Key, vec![byte; 3])
            .with_codec(VideoCodec::H264)
            .with_start_code()
    };

    frame.insert_packet(&nal(10, 0x67).first(), 0);
    frame.insert_packet(&nal(11, 0x65).marker(), 1);

    assert_eq!(frame.codec(), VideoCodec::H264);
    assert_eq!(
        frame.payload(),
        &[0, 0, 0, 1, 0x67, 0x67, 0x67, 0, 0, 0, 1, 0x65, 0x65, 0x65]
    );
}

#[test]
fn test_custom_start_code() {
    let config = Arc::new(FrameBufferConfig::default().with_start_code(vec![0, 0, 1]));
    let mut frame = activated(config);
    frame.insert_packet(&delta(1, 2).with_start_code(), 0);
    assert_eq!(frame.payload(), &[0, 0, 1, 1, 1]);
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_timestamp_mismatch_leaves_frame_unchanged() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 10).first(), 1);

    let other = Packet::new(2, TS + 3000, FrameType::Delta, vec![9; 10]);
    assert_eq!(frame.insert_packet(&other, 2), InsertOutcome::TimeStampError);
    assert!(InsertOutcome::TimeStampError.is_error());
    assert_eq!(frame.length(), 10);
    assert_eq!(frame.high_seq_num(), Some(1));
    assert_eq!(frame.latest_packet_time_ms(), Some(1));
}

#[test]
fn test_free_frame_rejects_packets() {
    let mut frame = FrameBuffer::new(config(10_000, 1000));
    assert_eq!(frame.insert_packet(&delta(1, 10), 0), InsertOutcome::StateError);
    assert_eq!(frame.state(), FrameState::Free);
    assert_eq!(frame.capacity(), 0);
}

#[test]
fn test_duplicate_packet() {
    let mut frame = activated(config(10_000, 1000));
    let packet = delta(5, 40).first();

    assert_eq!(frame.insert_packet(&packet, 0), InsertOutcome::Incomplete);
    assert_eq!(frame.insert_packet(&packet, 1), InsertOutcome::DuplicatePacket);
    assert!(!InsertOutcome::DuplicatePacket.is_error());
    assert_eq!(frame.length(), 40);
    assert_eq!(frame.latest_packet_time_ms(), Some(0));
}

#[test]
fn test_capacity_stays_on_step_and_under_ceiling() {
    let mut frame = activated(config(2000, 300));
    let mut seq = 0u16;

    loop {
        let outcome = frame.insert_packet(&delta(seq, 170), i64::from(seq));
        assert!(frame.length() <= frame.capacity());
        assert!(frame.capacity() <= 2000);
        assert_eq!(frame.capacity() % 300, 0);
        if outcome == InsertOutcome::SizeError {
            break;
        }
        assert_eq!(outcome, InsertOutcome::Incomplete);
        seq += 1;
    }

    // The rejected packet left no trace.
    assert_eq!(frame.high_seq_num(), Some(seq - 1));
    assert_eq!(frame.length(), usize::from(seq) * 170);
}

#[test]
fn test_ceiling_counts_allocated_capacity() {
    let mut frame = activated(config(1000, 600));
    assert_eq!(frame.insert_packet(&delta(1, 10).first(), 0), InsertOutcome::Incomplete);
    assert_eq!(frame.capacity(), 600);

    assert_eq!(frame.insert_packet(&delta(2, 500), 1), InsertOutcome::SizeError);
    assert_eq!(frame.length(), 10);
    assert_eq!(frame.latest_packet_time_ms(), Some(0));
}

#[test]
fn test_packet_beyond_max_frame_size() {
    let mut frame = activated(config(1000, 100));
    frame.insert_packet(&delta(1, 600).first(), 0);
    assert_eq!(frame.insert_packet(&delta(2, 401), 1), InsertOutcome::SizeError);
    assert_eq!(frame.length(), 600);
}

// ============================================================================
// Control packets and layers
// ============================================================================

#[test]
fn test_control_packet_then_media() {
    let mut frame = activated(config(10_000, 1000));

    let fec = Packet::empty(20, TS).with_payload_type(127);
    assert_eq!(frame.insert_packet(&fec, 0), InsertOutcome::Incomplete);
    assert_eq!(frame.state(), FrameState::Empty);
    assert_eq!(frame.timestamp(), TS);
    // No payload, no payload type latched.
    assert_eq!(frame.payload_type(), 0);
    assert!(frame.packet_list().start_seq_num().is_none());

    let media = delta(21, 30).first().marker().with_payload_type(96);
    assert_eq!(frame.insert_packet(&media, 1), InsertOutcome::CompleteSession);
    assert_eq!(frame.state(), FrameState::Incomplete);
    assert_eq!(frame.payload_type(), 96);
    assert_eq!(frame.packet_list().start_seq_num(), Some(21));
    assert_eq!(frame.length(), 30);
}

#[test]
fn test_complete_frame_regresses_on_new_layer() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 10).first(), 0);
    assert_eq!(
        frame.insert_packet(&delta(2, 10).marker(), 1),
        InsertOutcome::CompleteSession
    );
    frame.set_state(FrameState::Complete).expect("complete");

    // A packet of a further layer, with a gap before it.
    assert_eq!(frame.insert_packet(&delta(4, 10), 2), InsertOutcome::Incomplete);
    assert_eq!(frame.state(), FrameState::Incomplete);
    assert_eq!(frame.missing_seq_nums(), vec![3]);
}

#[test]
fn test_forced_decodable_on_complete_session() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 10).first().marker(), 0);
    frame.set_state(FrameState::Complete).expect("complete");

    frame.set_state(FrameState::Decodable).expect("ignored");
    assert_eq!(frame.state(), FrameState::Complete);
}

#[test]
fn test_force_last_packet_then_decode() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 10).first(), 0);
    frame.insert_packet(&delta(2, 10), 1);
    assert!(!frame.have_last_packet());

    assert!(frame.force_set_have_last_packet());
    frame.set_state(FrameState::Decodable).expect("decodable");
    assert_eq!(frame.state(), FrameState::Complete);
}

// ============================================================================
// Decode hand-off and reuse
// ============================================================================

#[test]
fn test_lossy_h264_frame_is_trimmed_before_decode() {
    let mut frame = activated(config(10_000, 1000));
    let packet = |seq: u16| delta(seq, 5).with_codec(VideoCodec::H264);

    frame.insert_packet(&packet(1).first(), 0);
    frame.insert_packet(&packet(2), 1);
    frame.insert_packet(&packet(4).marker(), 2);
    frame.set_previous_frame_loss();

    frame.set_state(FrameState::Decodable).expect("decodable");
    assert_eq!(frame.state(), FrameState::Decodable);
    frame.set_state(FrameState::Decoding).expect("decoding");

    let encoded = frame.encoded_frame();
    assert_eq!(encoded.length(), 10);
    assert_eq!(encoded.frame_type(), EncodedFrameType::Delta);
    assert!(!encoded.is_complete_frame());
    assert!(encoded.is_missing_frame());
}

#[test]
fn test_lossy_vp8_frame_is_kept_whole() {
    let mut frame = activated(config(10_000, 1000));
    let packet = |seq: u16| delta(seq, 5).with_codec(VideoCodec::Vp8);

    frame.insert_packet(&packet(1).first(), 0);
    frame.insert_packet(&packet(3).marker(), 1);
    frame.set_state(FrameState::Decoding).expect("decoding");

    assert_eq!(frame.encoded_frame().length(), 10);
    assert!(!frame.encoded_frame().is_complete_frame());
}

#[test]
fn test_control_only_frame_decodes_as_skip() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&Packet::empty(1, TS), 0);
    frame.set_state(FrameState::Complete).expect("complete");
    frame.set_state(FrameState::Decoding).expect("decoding");
    assert_eq!(frame.encoded_frame().frame_type(), EncodedFrameType::Skip);
}

#[test]
fn test_decoding_back_to_incomplete() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 10).first().marker(), 0);
    frame.set_state(FrameState::Complete).expect("complete");
    frame.set_state(FrameState::Decoding).expect("decoding");
    frame.set_state(FrameState::Incomplete).expect("incomplete");
    assert_eq!(frame.state(), FrameState::Incomplete);
}

#[test]
fn test_reset_and_reuse() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(1, 500).first(), 0);
    frame.increment_nack_count();
    frame.set_counted_frame(true);

    frame.reset();
    frame.reset();
    assert_eq!(frame.state_and_timestamp(), (FrameState::Free, 0));
    assert_eq!(frame.length(), 0);
    assert_eq!(frame.capacity(), 0);
    assert_eq!(frame.codec(), VideoCodec::Unknown);
    assert_eq!(frame.nack_count(), 0);
    assert_eq!(frame.latest_packet_time_ms(), None);
    assert!(!frame.is_counted_frame());
    assert_eq!(frame.low_seq_num(), None);

    frame.set_state(FrameState::Empty).expect("reactivate");
    let other = Packet::new(9, TS + 3000, FrameType::Key, vec![1; 4]).first().marker();
    assert_eq!(frame.insert_packet(&other, 50), InsertOutcome::CompleteSession);
    assert_eq!(frame.timestamp(), TS + 3000);
    assert_eq!(frame.frame_type(), FrameType::Key);
}

/// Drive a fresh frame into `target` through the normal lifecycle.
fn frame_in_state(target: FrameState) -> FrameBuffer {
    let mut frame = FrameBuffer::new(config(10_000, 1000));
    if target == FrameState::Free {
        return frame;
    }
    frame.set_state(FrameState::Empty).expect("activation");
    if target == FrameState::Empty {
        return frame;
    }

    frame.insert_packet(&delta(1, 10).first(), 5);
    frame.increment_nack_count();
    frame.set_counted_frame(true);
    match target {
        FrameState::Incomplete => {}
        FrameState::Decodable => frame.set_state(FrameState::Decodable).expect("decodable"),
        FrameState::Complete => {
            frame.insert_packet(&delta(2, 10).marker(), 6);
            frame.set_state(FrameState::Complete).expect("complete");
        }
        FrameState::Decoding => frame.set_state(FrameState::Decoding).expect("decoding"),
        FrameState::Free | FrameState::Empty => unreachable!(),
    }
    frame
}

#[test]
fn test_reset_from_every_state() {
    let states = [
        FrameState::Free,
        FrameState::Empty,
        FrameState::Incomplete,
        FrameState::Complete,
        FrameState::Decodable,
        FrameState::Decoding,
    ];

    for state in states {
        let mut frame = frame_in_state(state);
        assert_eq!(frame.state(), state);

        frame.reset();
        assert_eq!(frame.state(), FrameState::Free, "from {}", state);
        assert_eq!(frame.length(), 0, "from {}", state);
        assert_eq!(frame.capacity(), 0, "from {}", state);
        assert_eq!(frame.timestamp(), 0, "from {}", state);
        assert_eq!(frame.nack_count(), 0, "from {}", state);
        assert_eq!(frame.latest_packet_time_ms(), None, "from {}", state);
        assert!(!frame.is_counted_frame(), "from {}", state);
        assert_eq!(frame.low_seq_num(), None, "from {}", state);
    }
}

// ============================================================================
// NACK bookkeeping through the frame
// ============================================================================

#[test]
fn test_nack_pruning_through_frame() {
    let mut frame = activated(config(10_000, 1000));
    frame.insert_packet(&delta(100, 4).first(), 0);
    frame.insert_packet(&delta(102, 4).marker(), 1);

    let mut list = vec![Some(99), Some(100), Some(101), Some(102), Some(103)];
    frame.zero_out_seq_num(&mut list).expect("pruned");
    assert_eq!(list, vec![None, None, Some(101), None, Some(103)]);

    let mut list = vec![Some(101)];
    frame
        .zero_out_seq_num_hybrid(&mut list, 0.05)
        .expect("pruned");
    assert_eq!(list, vec![None]);

    let err = frame.zero_out_seq_num(&mut []).unwrap_err();
    assert!(matches!(
        err,
        hdds_vcm::Error::NackList(NackListError::EmptyList)
    ));
}

// ============================================================================
// Custom packet list
// ============================================================================

/// Packet list whose completeness answer is scripted per insertion.
#[derive(Debug, Clone, Default)]
struct ScriptedList {
    used: usize,
    inserts: usize,
    script: Vec<bool>,
    complete: bool,
    start: Option<u16>,
    reject_next: Option<InsertError>,
}

impl ScriptedList {
    fn with_script(script: &[bool]) -> Self {
        Self {
            script: script.to_vec(),
            ..Self::default()
        }
    }
}

impl PacketList for ScriptedList {
    fn insert_packet(
        &mut self,
        packet: &Packet,
        buffer: &mut [u8],
        _start_code: &[u8],
    ) -> Result<usize, InsertError> {
        if let Some(err) = self.reject_next.take() {
            return Err(err);
        }
        let payload = packet.payload();
        buffer[self.used..self.used + payload.len()].copy_from_slice(payload);
        self.used += payload.len();
        self.complete = self.script.get(self.inserts).copied().unwrap_or(false);
        self.inserts += 1;
        Ok(payload.len())
    }
    fn is_session_complete(&self) -> bool {
        self.complete
    }
    fn have_last_packet(&self) -> bool {
        self.complete
    }
    fn force_set_have_last_packet(&mut self) {
        self.complete = true;
    }
    fn have_start_seq_num(&self) -> bool {
        self.start.is_some()
    }
    fn set_start_seq_num(&mut self, seq_num: u16) {
        self.start = Some(seq_num);
    }
    fn low_seq_num(&self) -> Option<u16> {
        self.start
    }
    fn high_seq_num(&self) -> Option<u16> {
        self.start
    }
    fn frame_type(&self) -> FrameType {
        FrameType::Golden
    }
    fn set_previous_frame_loss(&mut self) {}
    fn previous_frame_loss(&self) -> bool {
        false
    }
    fn is_retransmitted(&self) -> bool {
        false
    }
    fn zero_out_seq_num(&self, _list: &mut [Option<u16>]) -> Result<(), NackListError> {
        Err(NackListError::NoMediaPackets)
    }
    fn zero_out_seq_num_hybrid(
        &self,
        _list: &mut [Option<u16>],
        _rtt_score: f32,
    ) -> Result<(), NackListError> {
        Err(NackListError::NoMediaPackets)
    }
    fn missing_seq_nums(&self) -> Vec<u16> {
        Vec::new()
    }
    fn prepare_for_decode(&mut self, _buffer: &mut [u8], _codec: VideoCodec) -> usize {
        self.used
    }
    fn make_session_decodable(&mut self, _buffer: &mut [u8]) -> usize {
        0
    }
    fn reset(&mut self) {
        *self = Self::default();
    }
}

fn scripted_frame(list: ScriptedList) -> FrameBuffer<ScriptedList> {
    let mut frame = FrameBuffer::with_packet_list(config(10_000, 1000), list);
    frame.set_state(FrameState::Empty).expect("activation");
    frame
}

#[test]
fn test_custom_list_regression_from_complete() {
    // Complete after the second packet, incomplete again after the third.
    let mut frame = scripted_frame(ScriptedList::with_script(&[false, true, false]));

    assert_eq!(frame.insert_packet(&delta(1, 8), 0), InsertOutcome::Incomplete);
    assert_eq!(frame.insert_packet(&delta(2, 8), 1), InsertOutcome::CompleteSession);
    assert_eq!(frame.state(), FrameState::Incomplete);

    frame.set_state(FrameState::Complete).expect("complete");
    assert_eq!(frame.insert_packet(&delta(3, 8), 2), InsertOutcome::Incomplete);
    assert_eq!(frame.state(), FrameState::Incomplete);
    assert_eq!(frame.length(), 24);
}

#[test]
fn test_custom_list_rejection_does_not_mutate() {
    let mut frame = scripted_frame(ScriptedList {
        reject_next: Some(InsertError::Size),
        ..ScriptedList::default()
    });

    let packet = delta(7, 8).with_payload_type(100);
    assert_eq!(frame.insert_packet(&packet, 0), InsertOutcome::SizeError);
    assert_eq!(frame.state(), FrameState::Empty);
    assert_eq!(frame.timestamp(), 0);
    assert_eq!(frame.payload_type(), 0);
    assert_eq!(frame.low_seq_num(), None);
    assert_eq!(frame.latest_packet_time_ms(), None);

    // Next attempt goes through and latches everything.
    assert_eq!(frame.insert_packet(&packet, 1), InsertOutcome::Incomplete);
    assert_eq!(frame.low_seq_num(), Some(7));
    assert_eq!(frame.payload_type(), 100);
    assert_eq!(frame.frame_type(), FrameType::Golden);
    assert!(frame.zero_out_seq_num(&mut [Some(7)]).is_err());
}
