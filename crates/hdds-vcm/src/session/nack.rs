// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NACK-list pruning for the default packet list.
//!
//! The NACK scheduler keeps a list of sequence numbers it intends to request.
//! Each frame clears the entries it has no use for: anything at or before its
//! lowest sequence number and anything it already holds. Entries newer than
//! the frame's highest sequence number belong to later frames and are kept.
//!
//! Hybrid mode additionally weighs the round-trip time: `rtt_score` ranges from
//! 0.0 (retransmission will arrive too late) to 1.0 (retransmission is cheap).

use thiserror::Error;

use super::info::SessionInfo;
use crate::packet::{is_newer_seq_num, FrameType};

/// Below this RTT score, missing packets of delta frames are not requested.
pub const HYBRID_NACK_SCORE_THRESHOLD: f32 = 0.25;

/// NACK-list pruning errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NackListError {
    #[error("NACK list is empty")]
    EmptyList,

    #[error("frame holds no media packets")]
    NoMediaPackets,

    #[error("RTT score {0} outside 0.0..=1.0")]
    InvalidScore(f32),
}

impl SessionInfo {
    /// Decide whether hybrid mode drops the frame's missing packets.
    pub(super) fn suppress_missing_nacks(&self, rtt_score: f32) -> Result<bool, NackListError> {
        if !(0.0..=1.0).contains(&rtt_score) {
            return Err(NackListError::InvalidScore(rtt_score));
        }
        Ok(self.frame_type != FrameType::Key && rtt_score < HYBRID_NACK_SCORE_THRESHOLD)
    }

    pub(super) fn prune_nack_list(
        &self,
        list: &mut [Option<u16>],
        suppress_missing: bool,
    ) -> Result<(), NackListError> {
        if list.is_empty() {
            return Err(NackListError::EmptyList);
        }
        if !self.has_media() {
            return Err(NackListError::NoMediaPackets);
        }
        let (Some(low), Some(high)) = (
            self.packets.first().map(|p| p.seq_num),
            self.packets.last().map(|p| p.seq_num),
        ) else {
            return Err(NackListError::NoMediaPackets);
        };

        let mut cleared = 0usize;
        for entry in list.iter_mut() {
            let Some(seq) = *entry else {
                continue;
            };
            if is_newer_seq_num(seq, high) {
                continue;
            }
            let stale = !is_newer_seq_num(seq, low);
            if stale || suppress_missing || self.find_slot(seq).is_ok() {
                *entry = None;
                cleared += 1;
            }
        }

        log::debug!(
            "[Session] NACK list pruned: {} of {} entries cleared (low={} high={} suppress={})",
            cleared,
            list.len(),
            low,
            high,
            suppress_missing
        );
        Ok(())
    }
}
