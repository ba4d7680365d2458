// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transport packets as seen by the frame buffer.
//!
//! A `Packet` is one RTP-level unit of an encoded frame. It is supplied by the
//! transport and never modified here; the frame buffer copies its payload.

/// Frame type tag carried by a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameType {
    /// Control/padding packet (FEC, empty RTP packet). Occupies a sequence
    /// number but carries no media.
    #[default]
    Empty,
    /// Intra frame.
    Key,
    /// Inter frame.
    Delta,
    /// VP8 golden frame.
    Golden,
    /// VP8 alternate reference frame.
    AltRef,
}

impl FrameType {
    /// True for every tag except `Empty`.
    pub fn is_media(self) -> bool {
        self != FrameType::Empty
    }
}

/// Codec of the frame being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoCodec {
    #[default]
    Unknown,
    Vp8,
    H264,
    I420,
    Generic,
}

/// A received transport packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// RTP sequence number (wraps at 2^16).
    pub seq_num: u16,
    /// RTP timestamp, shared by every packet of a frame.
    pub timestamp: u32,
    pub payload_type: u8,
    pub frame_type: FrameType,
    /// Declared payload size in bytes.
    pub size_bytes: usize,
    /// Payload. `None` is only valid together with `size_bytes == 0`.
    pub data: Option<Vec<u8>>,
    pub codec: VideoCodec,
    /// Prefix the configured start code before this payload on insertion.
    pub insert_start_code: bool,
    /// First packet of the frame (start of the first partition / NAL unit).
    pub is_first_packet: bool,
    /// RTP marker bit: last packet of the frame.
    pub marker_bit: bool,
}

impl Packet {
    /// Create a media packet carrying `data`.
    pub fn new(seq_num: u16, timestamp: u32, frame_type: FrameType, data: Vec<u8>) -> Self {
        Self {
            seq_num,
            timestamp,
            payload_type: 0,
            frame_type,
            size_bytes: data.len(),
            data: Some(data),
            codec: VideoCodec::Unknown,
            insert_start_code: false,
            is_first_packet: false,
            marker_bit: false,
        }
    }

    /// Create a zero-length control packet (no payload).
    pub fn empty(seq_num: u16, timestamp: u32) -> Self {
        Self {
            seq_num,
            timestamp,
            payload_type: 0,
            frame_type: FrameType::Empty,
            size_bytes: 0,
            data: None,
            codec: VideoCodec::Unknown,
            insert_start_code: false,
            is_first_packet: false,
            marker_bit: false,
        }
    }

    /// Mark as first packet of the frame.
    pub fn first(mut self) -> Self {
        self.is_first_packet = true;
        self
    }

    /// Set the RTP marker bit.
    pub fn marker(mut self) -> Self {
        self.marker_bit = true;
        self
    }

    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_payload_type(mut self, payload_type: u8) -> Self {
        self.payload_type = payload_type;
        self
    }

    /// Request a synthesized start code in front of the payload.
    pub fn with_start_code(mut self) -> Self {
        self.insert_start_code = true;
        self
    }

    /// Payload bytes (empty slice for control packets).
    pub fn payload(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Bytes this packet occupies once inserted with a start code of
    /// `start_code_len` bytes.
    pub fn inserted_len(&self, start_code_len: usize) -> usize {
        if self.insert_start_code {
            self.size_bytes + start_code_len
        } else {
            self.size_bytes
        }
    }
}

/// Check if `seq` is newer than `prev` (handles wraparound).
///
/// Uses the RTP convention: `seq` is newer when the forward distance from
/// `prev` is below half the sequence space.
pub fn is_newer_seq_num(seq: u16, prev: u16) -> bool {
    let diff = seq.wrapping_sub(prev);
    diff != 0 && diff < 0x8000
}

/// Forward distance from `start` to `end` (wrapping).
pub fn seq_num_distance(start: u16, end: u16) -> u16 {
    end.wrapping_sub(start)
}
