// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic poll / collect / reconcile loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::config::BusConfig;
use crate::event::{BusEvent, EventFeed};
use crate::protocol::{PollReply, Transport};

use super::{Node, NodeTable, NodeTransition};

/// Owner of the node table.
///
/// Every cycle broadcasts a poll, collects replies for a fixed window,
/// reconciles them into the table and publishes a fresh snapshot. Other
/// components only ever see snapshots.
pub(crate) struct HealthMonitor {
    transport: Arc<dyn Transport>,
    replies: mpsc::UnboundedReceiver<PollReply>,
    table: NodeTable,
    snapshot: watch::Sender<Vec<Node>>,
    feed: EventFeed,
    poll_interval: Duration,
    reply_window: Duration,
}

impl HealthMonitor {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        replies: mpsc::UnboundedReceiver<PollReply>,
        snapshot: watch::Sender<Vec<Node>>,
        feed: EventFeed,
        config: &BusConfig,
    ) -> Self {
        Self {
            transport,
            replies,
            table: NodeTable::new(config.lost_threshold),
            snapshot,
            feed,
            poll_interval: config.poll_interval,
            reply_window: config.reply_window,
        }
    }

    /// Runs cycles forever, the first one immediately.
    pub(crate) async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// Runs one poll cycle and returns the transitions it caused.
    pub(crate) async fn run_cycle(&mut self) -> Vec<NodeTransition> {
        // Late replies from the previous window are not counted.
        while self.replies.try_recv().is_ok() {}

        if let Err(e) = self.transport.send_poll() {
            warn!(error = %e, "Failed to send poll");
        }

        let replies = self.collect(Instant::now() + self.reply_window).await;
        debug!(replies = replies.len(), "Poll window closed");

        let transitions = self.table.reconcile(&replies, Utc::now());
        self.snapshot.send_replace(self.table.nodes().to_vec());
        for transition in &transitions {
            self.feed.publish(BusEvent::Node(transition.clone()));
        }
        transitions
    }

    async fn collect(&mut self, deadline: Instant) -> Vec<PollReply> {
        let mut replies = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, self.replies.recv()).await {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => {
                    tokio::time::sleep_until(deadline).await;
                    break;
                }
                Err(_) => break,
            }
        }
        replies
    }
}
