// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote node records and their health status.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::MacAddress;

/// Health of a remote node as seen by the poll loop.
///
/// ```text
/// New ──► Connected ──► MissedReplies(1..) ──► LostConnection
///  ▲          ▲                │                     │
///  │          └──── reply ─────┴─────── reply ───────┘
/// first reply
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeStatus {
    /// The node answered its first poll this cycle.
    New,
    /// The node answered the last poll.
    Connected,
    /// The node missed this many consecutive polls.
    MissedReplies(u32),
    /// The node missed enough polls to be considered gone.
    LostConnection,
}

impl NodeStatus {
    /// Returns `true` if the node answered the most recent poll.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::New | Self::Connected)
    }

    /// Returns `true` if the node has missed at least one poll.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::MissedReplies(_) | Self::LostConnection)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Connected => write!(f, "connected"),
            Self::MissedReplies(n) => write!(f, "missed {n} replies"),
            Self::LostConnection => write!(f, "lost connection"),
        }
    }
}

/// A remote embedded controller discovered through poll replies.
///
/// Nodes are never removed from the table; a lost node stays so that its
/// reconnection can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Short name reported by the node.
    pub name: String,
    /// Hardware address.
    pub mac: MacAddress,
    /// Last known IP address.
    pub ip: IpAddr,
    /// Last status report text sent by the node.
    pub report: String,
    /// Current health status.
    pub status: NodeStatus,
    /// Consecutive poll cycles without a reply.
    pub missed_replies: u32,
    /// When the last reply was received.
    pub last_seen: DateTime<Utc>,
}

impl Node {
    /// Returns `true` if the node answered the most recent poll.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}) {}", self.name, self.mac, self.ip, self.status)
    }
}
