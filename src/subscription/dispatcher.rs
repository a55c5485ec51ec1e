// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event queue and the dispatch loop draining it.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::event::{BusEvent, Event, EventFeed};

use super::SubscriptionRegistry;

/// Matches events against the registry and launches callbacks.
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl Dispatcher {
    pub(crate) fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches one event; returns the number of callbacks launched.
    ///
    /// Fire-once subscribers are unlinked as soon as their invocation is
    /// spawned, before it completes. Must run inside a Tokio runtime.
    pub(crate) fn dispatch(&self, event: &Arc<Event>) -> usize {
        let mut launched = 0;

        for subscriber in self.registry.matching(event) {
            if !subscriber.try_fire(event) {
                continue;
            }
            launched += 1;
            if subscriber.is_fire_once() {
                self.registry.remove(subscriber.id());
            }
        }

        trace!(event = %event, launched, "Dispatched event");
        launched
    }

    /// Drains the queue in FIFO order until every sender is gone.
    pub(crate) async fn run(self, mut queue: mpsc::UnboundedReceiver<Arc<Event>>) {
        while let Some(event) = queue.recv().await {
            self.dispatch(&event);
        }
        debug!("Event queue closed, dispatcher stopped");
    }
}

/// Entry point for firing events onto the bus.
///
/// Shared by the public facade and the packet router so that events decoded
/// from packets and events raised by scripts take the same path.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    queue: mpsc::UnboundedSender<Arc<Event>>,
    feed: EventFeed,
    local_addr: Option<SocketAddr>,
}

impl EventSink {
    pub(crate) fn new(
        queue: mpsc::UnboundedSender<Arc<Event>>,
        feed: EventFeed,
        local_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            queue,
            feed,
            local_addr,
        }
    }

    /// Enqueues an event for dispatch and mirrors it to the feed.
    ///
    /// Events without a sender are attributed to the local address. Returns
    /// `false` once the dispatcher has stopped.
    pub(crate) fn fire(&self, event: Event) -> bool {
        let event = if event.sender().is_none() {
            event.with_sender(self.local_addr)
        } else {
            event
        };
        let event = Arc::new(event);

        self.feed.publish(BusEvent::Fired(Arc::clone(&event)));

        if self.queue.send(event).is_err() {
            debug!("Dispatcher stopped, event not delivered to subscribers");
            return false;
        }
        true
    }
}
