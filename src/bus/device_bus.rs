// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Public facade of the device bus.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::device::{Device, DeviceRegistry};
use crate::error::{ConfigError, Error};
use crate::event::{BusEvent, Condition, Event, EventFeed};
use crate::node::Node;
use crate::protocol::{PacketRouter, Transport};
use crate::subscription::{Callback, EventSink, SubscribeOptions, SubscriptionId, SubscriptionRegistry};
use crate::types::Value;

use super::DeviceBusBuilder;

pub(crate) struct Inner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) devices: Arc<DeviceRegistry>,
    /// Sole owner of the router; the transport handler only holds a weak reference.
    pub(crate) router: Mutex<Option<Arc<PacketRouter>>>,
    pub(crate) subscriptions: Arc<SubscriptionRegistry>,
    pub(crate) sink: EventSink,
    pub(crate) feed: EventFeed,
    pub(crate) nodes: watch::Receiver<Vec<Node>>,
    pub(crate) skipped: Vec<ConfigError>,
    pub(crate) tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Inner {
    fn stop_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.stop_tasks();
    }
}

/// Handle to a running device bus.
///
/// Scripts fire events, subscribe to them and address fixtures through this
/// handle. Cloning is cheap; all clones share the same bus. The background
/// tasks stop on [`shutdown`](Self::shutdown) or when the last handle is
/// dropped.
///
/// A callback that captures a clone of the bus keeps it alive for as long as
/// the subscription exists. Call `shutdown` (which drops every subscription)
/// or unsubscribe such callbacks before letting the bus go.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use artbus_lib::{Callback, Condition, DeviceBus, SubscribeOptions};
/// # use artbus_lib::protocol::Transport;
///
/// # fn example(transport: Arc<dyn Transport>) -> artbus_lib::Result<()> {
/// let bus = DeviceBus::builder(transport).start()?;
///
/// let lights = bus.clone();
/// bus.subscribe(
///     Condition::any().source("Door").action("Opened"),
///     Callback::new(move |_event| {
///         let lights = lights.clone();
///         async move {
///             lights.send_dmx("HallLeds", &[255, 180, 40]);
///             Ok(())
///         }
///     }),
///     SubscribeOptions::new(),
/// );
///
/// bus.fire_event("Door", "Opened", true);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DeviceBus {
    inner: Arc<Inner>,
}

impl DeviceBus {
    /// Creates a builder for a bus running on `transport`.
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> DeviceBusBuilder {
        DeviceBusBuilder::new(transport)
    }

    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Fires an event from this process.
    ///
    /// The event is stamped with the current time and the local address, and
    /// queued for dispatch. Returns `false` if the bus has been shut down.
    pub fn fire_event(
        &self,
        source: impl Into<String>,
        action: impl Into<String>,
        value: impl Into<Value>,
    ) -> bool {
        self.fire(Event::new(source, action, value))
    }

    /// Fires a prepared event, keeping its sender and timestamp.
    ///
    /// Events without a sender are attributed to the local address.
    pub fn fire(&self, event: Event) -> bool {
        self.inner.sink.fire(event)
    }

    /// Registers a callback under `condition`.
    ///
    /// Fields left as wildcards in the condition match any value.
    pub fn subscribe(
        &self,
        condition: Condition,
        callback: Callback,
        options: SubscribeOptions,
    ) -> SubscriptionId {
        let description = condition.to_string();
        let id = self.inner.subscriptions.insert(condition, callback, options);
        debug!(subscription = %id, condition = %description, ?options, "Subscribed");
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `true` if it was still registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.inner.subscriptions.remove(id);
        debug!(subscription = %id, removed, "Unsubscribed");
        removed
    }

    /// Returns the number of active subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    /// Subscribes to the observer feed of fired events and node transitions.
    #[must_use]
    pub fn subscribe_feed(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.feed.subscribe()
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Sends a DMX frame to the fixture called `name`.
    ///
    /// Unknown names, sensors, invalid frames and transport failures are
    /// logged and the call does nothing. Returns `true` if the frame was sent.
    pub fn send_dmx(&self, name: &str, data: &[u8]) -> bool {
        let fixture = match self.inner.devices.resolve_fixture(name) {
            Ok(fixture) => fixture,
            Err(e) => {
                warn!(device = %name, error = %e, "Cannot send DMX");
                return false;
            }
        };

        match fixture.send_dmx(data) {
            Ok(()) => true,
            Err(e) => {
                warn!(device = %name, universe = %fixture.universe(), error = %e, "DMX frame not sent");
                false
            }
        }
    }

    /// Sends a raw trigger frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the transport fails.
    pub fn send_trigger(&self, key: u8, sub_key: u8, data: &[u8]) -> Result<(), Error> {
        self.inner.transport.send_trigger(key, sub_key, data)?;
        Ok(())
    }

    /// Looks up a device by name.
    #[must_use]
    pub fn get_device(&self, name: &str) -> Option<Device> {
        self.inner.devices.get(name).cloned()
    }

    /// Returns the device registry.
    #[must_use]
    pub fn devices(&self) -> &DeviceRegistry {
        &self.inner.devices
    }

    /// Returns the manifest entries skipped at startup, with the reason.
    #[must_use]
    pub fn skipped_entries(&self) -> &[ConfigError] {
        &self.inner.skipped
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Returns a snapshot of every node seen so far.
    #[must_use]
    pub fn nodes(&self) -> Vec<Node> {
        self.inner.nodes.borrow().clone()
    }

    /// Returns a snapshot of one node.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<Node> {
        self.inner
            .nodes
            .borrow()
            .iter()
            .find(|n| n.name == name)
            .cloned()
    }

    /// Returns a receiver notified after every poll cycle.
    #[must_use]
    pub fn watch_nodes(&self) -> watch::Receiver<Vec<Node>> {
        self.inner.nodes.clone()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stops the dispatcher and health monitor and drops every subscription.
    ///
    /// Callbacks already running are left to finish. Events fired afterwards
    /// are not delivered and inbound packets are ignored. Bus handles captured
    /// by callbacks are released together with their subscriptions.
    pub fn shutdown(&self) {
        self.inner.router.lock().take();
        self.inner.stop_tasks();
        self.inner.subscriptions.clear();
        debug!("Device bus shut down");
    }
}

impl fmt::Debug for DeviceBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBus")
            .field("devices", &self.inner.devices.len())
            .field("subscriptions", &self.inner.subscriptions.len())
            .field("nodes", &self.inner.nodes.borrow().len())
            .finish_non_exhaustive()
    }
}
