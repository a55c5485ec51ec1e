// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Art-Net operation codes handled by the bus.

use std::fmt;

/// Operation code of an inbound packet.
///
/// Only the codes the bus reacts to are named; anything else is kept as
/// [`OpCode::Unknown`] so it can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Discovery request.
    Poll,
    /// Discovery answer from a node.
    PollReply,
    /// Text command.
    Command,
    /// DMX frame for one universe.
    Dmx,
    /// Trigger frame carrying a sensor name and payload.
    Trigger,
    /// Any other operation.
    Unknown(u16),
}

impl OpCode {
    /// Maps a raw operation code.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            0x2000 => Self::Poll,
            0x2100 => Self::PollReply,
            0x2400 => Self::Command,
            0x5000 => Self::Dmx,
            0x9900 => Self::Trigger,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw operation code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Poll => 0x2000,
            Self::PollReply => 0x2100,
            Self::Command => 0x2400,
            Self::Dmx => 0x5000,
            Self::Trigger => 0x9900,
            Self::Unknown(code) => *code,
        }
    }
}

impl From<u16> for OpCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poll => write!(f, "OpPoll"),
            Self::PollReply => write!(f, "OpPollReply"),
            Self::Command => write!(f, "OpCommand"),
            Self::Dmx => write!(f, "OpDmx"),
            Self::Trigger => write!(f, "OpTrigger"),
            Self::Unknown(code) => write!(f, "Op({code:#06x})"),
        }
    }
}
