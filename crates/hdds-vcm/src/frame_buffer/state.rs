// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Frame lifecycle states and the transition table.
//!
//! ```text
//!            activate              first media packet
//!   Free ------------> Empty -------------------------> Incomplete
//!    ^                   |  \                            |   ^   |
//!    | reset             |   \ force decodable           |   |   | force decodable
//!    | (any state)       |    \                          |   |   v
//!    |                   |     +-------------------> Decodable   |
//!    |                   |  session complete             |       |
//!    |                   +-----------------> Complete <--+-------+
//!    |                                          |   (regression on re-evaluation
//!    |                                          |    moves Complete -> Incomplete)
//!    |                                          v
//!    +------------------------------------- Decoding
//! ```

use std::fmt;

use crate::error::Error;

/// Frame buffer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FrameState {
    /// Unused slot, no identity, no memory.
    #[default]
    Free = 0,
    /// Activated; identity latched by the first packet, no media yet.
    Empty = 1,
    /// Has media, not complete.
    Incomplete = 2,
    /// Every packet of the session is present.
    Complete = 3,
    /// Not complete, but judged good enough to attempt a decode.
    Decodable = 4,
    /// Handed to the decode path.
    Decoding = 5,
}

impl FrameState {
    /// States a transition into `self` may start from.
    ///
    /// `Free` is reachable from everywhere and handled separately.
    pub(crate) fn allowed_sources(self) -> &'static [FrameState] {
        use FrameState::*;
        match self {
            Free => &[Free, Empty, Incomplete, Complete, Decodable, Decoding],
            Empty => &[Free],
            Incomplete => &[Empty, Decoding],
            Complete => &[Empty, Incomplete, Decodable],
            Decodable => &[Empty, Incomplete],
            Decoding => &[Complete, Incomplete, Decodable],
        }
    }

    /// Whether `from -> self` is in the transition table.
    pub fn can_transition_from(self, from: FrameState) -> bool {
        self == from || self.allowed_sources().contains(&from)
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameState::Free => "Free",
            FrameState::Empty => "Empty",
            FrameState::Incomplete => "Incomplete",
            FrameState::Complete => "Complete",
            FrameState::Decodable => "Decodable",
            FrameState::Decoding => "Decoding",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for FrameState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FrameState::Free),
            1 => Ok(FrameState::Empty),
            2 => Ok(FrameState::Incomplete),
            3 => Ok(FrameState::Complete),
            4 => Ok(FrameState::Decodable),
            5 => Ok(FrameState::Decoding),
            other => {
                log::warn!("[FrameBuf] unknown state value {}", other);
                Err(Error::UnknownState(other))
            }
        }
    }
}
