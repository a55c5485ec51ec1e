// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observer feed mirroring bus activity.

use tokio::sync::broadcast;

use crate::config::DEFAULT_FEED_CAPACITY;

use super::BusEvent;

/// Broadcast feed of everything happening on the bus.
///
/// The feed is meant for observers such as a UI or a recorder: fired events
/// and node transitions are published here independently of subscription
/// dispatch. Slow receivers lose the oldest items (they get a
/// `RecvError::Lagged`), the bus itself never waits for them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use artbus_lib::event::{BusEvent, Event, EventFeed};
///
/// let feed = EventFeed::new();
/// let mut rx = feed.subscribe();
///
/// feed.publish(BusEvent::Fired(Arc::new(Event::new("Door", "Opened", true))));
///
/// let item = rx.try_recv().unwrap();
/// assert!(item.is_fired());
/// ```
#[derive(Debug, Clone)]
pub struct EventFeed {
    sender: broadcast::Sender<BusEvent>,
}

impl EventFeed {
    /// Creates a feed with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Creates a feed buffering at most `capacity` items per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to the feed.
    ///
    /// The receiver sees every item published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an item; discarded when nobody listens.
    pub fn publish(&self, item: BusEvent) {
        let _ = self.sender.send(item);
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::node::NodeTransition;
    use std::sync::Arc;

    #[test]
    fn subscriber_count_tracks_receivers() {
        let feed = EventFeed::new();
        assert_eq!(feed.subscriber_count(), 0);

        let rx = feed.subscribe();
        let clone = feed.clone();
        assert_eq!(clone.subscriber_count(), 1);

        drop(rx);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn publish_without_receivers_is_silent() {
        let feed = EventFeed::with_capacity(4);
        feed.publish(BusEvent::Node(NodeTransition::Lost {
            name: "Altar".into(),
        }));
    }

    #[tokio::test]
    async fn delivers_to_every_receiver() {
        let feed = EventFeed::new();
        let mut rx1 = feed.subscribe();
        let mut rx2 = feed.subscribe();

        feed.publish(BusEvent::Fired(Arc::new(Event::new("Door", "Opened", true))));

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                BusEvent::Fired(event) => assert_eq!(event.source(), "Door"),
                BusEvent::Node(_) => panic!("unexpected node transition"),
            }
        }
    }
}
