// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Rebuilding frames from stored encoded data.

use std::sync::Arc;

use hdds_vcm::{
    EncodedFrameType, EncodedVideoData, Error, FrameBuffer, FrameBufferConfig, FrameState,
    FrameType, VideoCodec,
};

fn stored(len: usize) -> EncodedVideoData {
    EncodedVideoData {
        frame_type: FrameType::Key,
        timestamp: 450_000,
        payload_type: 100,
        encoded_width: 1280,
        encoded_height: 720,
        missing_frame: false,
        complete_frame: true,
        render_time_ms: Some(1_700_000_000_123),
        codec: VideoCodec::Vp8,
        payload: (0..len).map(|i| (i % 251) as u8).collect(),
    }
}

#[test]
fn test_extract_copies_metadata_and_payload() {
    let mut frame = FrameBuffer::new(Arc::new(FrameBufferConfig::default()));
    let data = stored(12_345);

    frame.extract_from_storage(&data).expect("extraction");

    let encoded = frame.encoded_frame();
    assert_eq!(encoded.payload(), &data.payload[..]);
    assert_eq!(encoded.length(), 12_345);
    assert_eq!(encoded.timestamp(), 450_000);
    assert_eq!(encoded.payload_type(), 100);
    assert_eq!(encoded.encoded_width(), 1280);
    assert_eq!(encoded.encoded_height(), 720);
    assert_eq!(encoded.render_time_ms(), Some(1_700_000_000_123));
    assert_eq!(encoded.codec(), VideoCodec::Vp8);
    assert_eq!(encoded.frame_type(), EncodedFrameType::Key);
    assert!(encoded.is_complete_frame());
    assert!(!encoded.is_missing_frame());

    // Exact allocation, not rounded to the growth step.
    assert_eq!(frame.capacity(), 12_345);
    // Extraction does not drive the state machine.
    assert_eq!(frame.state(), FrameState::Free);
}

#[test]
fn test_extract_oversized_frame_changes_nothing() {
    let config = Arc::new(
        FrameBufferConfig::default()
            .with_max_frame_size(1000)
            .with_buffer_step_size(100),
    );
    let mut frame = FrameBuffer::new(config);
    frame.extract_from_storage(&stored(10)).expect("small frame");

    let result = frame.extract_from_storage(&stored(1001));
    assert!(matches!(
        result,
        Err(Error::OutOfMemory { requested: 1001 })
    ));
    assert_eq!(frame.length(), 10);
    assert_eq!(frame.timestamp(), 450_000);
    assert_eq!(frame.payload(), &stored(10).payload[..]);
}

#[test]
fn test_extract_into_larger_buffer_keeps_capacity() {
    let mut frame = FrameBuffer::new(Arc::new(FrameBufferConfig::default()));
    frame.extract_from_storage(&stored(5000)).expect("first");
    frame.extract_from_storage(&stored(100)).expect("second");

    assert_eq!(frame.capacity(), 5000);
    assert_eq!(frame.length(), 100);
    assert_eq!(frame.payload(), &stored(100).payload[..]);
}

#[test]
fn test_extract_empty_payload() {
    let mut frame = FrameBuffer::new(Arc::new(FrameBufferConfig::default()));
    let mut data = stored(0);
    data.frame_type = FrameType::Empty;

    frame.extract_from_storage(&data).expect("empty");
    assert_eq!(frame.length(), 0);
    assert_eq!(frame.encoded_frame().frame_type(), EncodedFrameType::Skip);
}
