// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node table and per-cycle reconciliation of poll replies.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, trace, warn};

use crate::protocol::PollReply;
use crate::types::MacAddress;

use super::{Node, NodeStatus};

/// A health change observed while reconciling one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeTransition {
    /// A node answered for the first time.
    Discovered(Node),
    /// A known node name answered with a different MAC address.
    MacChanged {
        /// Node name.
        name: String,
        /// Previous hardware address.
        old: MacAddress,
        /// New hardware address.
        new: MacAddress,
    },
    /// A degraded or lost node answered again.
    Reconnected {
        /// Node name.
        name: String,
        /// Consecutive cycles it had missed.
        after_missed: u32,
    },
    /// A node missed another poll.
    Missed {
        /// Node name.
        name: String,
        /// Consecutive cycles missed so far.
        count: u32,
    },
    /// A node missed enough polls to be considered gone.
    Lost {
        /// Node name.
        name: String,
    },
}

impl NodeTransition {
    /// Returns the name of the node concerned.
    #[must_use]
    pub fn node_name(&self) -> &str {
        match self {
            Self::Discovered(node) => &node.name,
            Self::MacChanged { name, .. }
            | Self::Reconnected { name, .. }
            | Self::Missed { name, .. }
            | Self::Lost { name } => name,
        }
    }
}

impl fmt::Display for NodeTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered(node) => write!(f, "discovered {node}"),
            Self::MacChanged { name, old, new } => write!(f, "{name} changed MAC {old} -> {new}"),
            Self::Reconnected { name, after_missed } => {
                write!(f, "{name} reconnected after {after_missed} missed replies")
            }
            Self::Missed { name, count } => write!(f, "{name} missed {count} replies"),
            Self::Lost { name } => write!(f, "{name} lost connection"),
        }
    }
}

/// Every node ever seen, in discovery order.
///
/// Nodes are never removed. Only the health monitor mutates the table.
#[derive(Debug, Clone)]
pub struct NodeTable {
    nodes: Vec<Node>,
    lost_after: u32,
}

impl NodeTable {
    /// Creates an empty table; nodes are lost after `lost_after` silent cycles.
    #[must_use]
    pub fn new(lost_after: u32) -> Self {
        Self {
            nodes: Vec::new(),
            lost_after: lost_after.max(1),
        }
    }

    /// Applies the replies collected during one poll cycle.
    ///
    /// Replies are de-duplicated by MAC address (the last one wins), so a node
    /// answering twice in the same window is counted once. Every known node
    /// without a reply moves one step towards
    /// [`NodeStatus::LostConnection`].
    pub fn reconcile(&mut self, replies: &[PollReply], now: DateTime<Utc>) -> Vec<NodeTransition> {
        let mut unique: Vec<&PollReply> = Vec::with_capacity(replies.len());
        for reply in replies {
            match unique.iter_mut().find(|r| r.mac == reply.mac) {
                Some(slot) => *slot = reply,
                None => unique.push(reply),
            }
        }

        let mut transitions = Vec::new();
        let seen: HashSet<MacAddress> = unique.iter().map(|r| r.mac).collect();

        for reply in unique {
            self.apply_reply(reply, now, &mut transitions);
        }

        for node in self
            .nodes
            .iter_mut()
            .filter(|n| !seen.contains(&n.mac) && n.status != NodeStatus::LostConnection)
        {
            node.missed_replies += 1;
            if node.missed_replies >= self.lost_after {
                node.status = NodeStatus::LostConnection;
                error!(node = %node.name, mac = %node.mac, missed = node.missed_replies, "Node lost connection");
                transitions.push(NodeTransition::Lost {
                    name: node.name.clone(),
                });
            } else {
                node.status = NodeStatus::MissedReplies(node.missed_replies);
                warn!(node = %node.name, mac = %node.mac, missed = node.missed_replies, "Node missed poll reply");
                transitions.push(NodeTransition::Missed {
                    name: node.name.clone(),
                    count: node.missed_replies,
                });
            }
        }

        transitions
    }

    fn apply_reply(
        &mut self,
        reply: &PollReply,
        now: DateTime<Utc>,
        transitions: &mut Vec<NodeTransition>,
    ) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.mac == reply.mac) {
            let reconnected = reconnection(node);
            refresh(node, reply, now);
            match reconnected {
                Some(transition) => transitions.push(transition),
                None => trace!(node = %node.name, ip = %node.ip, "Node heartbeat"),
            }
            return;
        }

        if let Some(node) = self.nodes.iter_mut().find(|n| n.name == reply.short_name) {
            let old = node.mac;
            let reconnected = reconnection(node);
            node.mac = reply.mac;
            refresh(node, reply, now);
            warn!(node = %node.name, old = %old, new = %node.mac, "Node changed MAC address");
            transitions.push(NodeTransition::MacChanged {
                name: node.name.clone(),
                old,
                new: node.mac,
            });
            transitions.extend(reconnected);
            return;
        }

        let node = Node {
            name: reply.short_name.clone(),
            mac: reply.mac,
            ip: reply.ip,
            report: reply.report.clone(),
            status: NodeStatus::New,
            missed_replies: 0,
            last_seen: now,
        };
        info!(node = %node.name, mac = %node.mac, ip = %node.ip, "Discovered node");
        self.nodes.push(node.clone());
        transitions.push(NodeTransition::Discovered(node));
    }

    /// Returns all nodes in discovery order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Looks up a node by MAC address.
    #[must_use]
    pub fn by_mac(&self, mac: MacAddress) -> Option<&Node> {
        self.nodes.iter().find(|n| n.mac == mac)
    }

    /// Returns the number of known nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Reports a degraded node answering again. Must run before `refresh`.
fn reconnection(node: &Node) -> Option<NodeTransition> {
    if !node.status.is_degraded() {
        return None;
    }
    info!(node = %node.name, mac = %node.mac, missed = node.missed_replies, "Node reconnected");
    Some(NodeTransition::Reconnected {
        name: node.name.clone(),
        after_missed: node.missed_replies,
    })
}

fn refresh(node: &mut Node, reply: &PollReply, now: DateTime<Utc>) {
    node.name.clone_from(&reply.short_name);
    node.ip = reply.ip;
    node.report.clone_from(&reply.report);
    node.status = NodeStatus::Connected;
    node.missed_replies = 0;
    node.last_seen = now;
}
