// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Startup wiring of the bus.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use crate::config::BusConfig;
use crate::device::{DeviceRegistry, DeviceTypeRegistry, Manifest};
use crate::error::Error;
use crate::event::EventFeed;
use crate::node::HealthMonitor;
use crate::protocol::{PacketRouter, Transport};
use crate::subscription::{Dispatcher, EventSink, SubscriptionRegistry};

use super::device_bus::{DeviceBus, Inner};

/// Builder for a [`DeviceBus`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use artbus_lib::{BusConfig, DeviceBus, Manifest};
/// # use artbus_lib::protocol::Transport;
///
/// # fn example(transport: Arc<dyn Transport>) -> artbus_lib::Result<()> {
/// let manifest = Manifest::from_json(r#"{"nodes": []}"#).unwrap();
///
/// let bus = DeviceBus::builder(transport)
///     .with_config(BusConfig::default())
///     .with_manifest(manifest)
///     .start()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceBusBuilder {
    transport: Arc<dyn Transport>,
    config: BusConfig,
    device_types: DeviceTypeRegistry,
    manifest: Manifest,
}

impl DeviceBusBuilder {
    pub(crate) fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: BusConfig::default(),
            device_types: DeviceTypeRegistry::with_builtin(),
            manifest: Manifest::default(),
        }
    }

    /// Sets the bus configuration.
    #[must_use]
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the device types available to the manifest.
    ///
    /// Defaults to [`DeviceTypeRegistry::with_builtin`].
    #[must_use]
    pub fn with_device_types(mut self, device_types: DeviceTypeRegistry) -> Self {
        self.device_types = device_types;
        self
    }

    /// Sets the device manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Builds the devices and starts the dispatcher and health monitor.
    ///
    /// Manifest entries that cannot be built are skipped; see
    /// [`DeviceBus::skipped_entries`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is inconsistent, or
    /// `Error::NoRuntime` when called outside a Tokio runtime.
    pub fn start(self) -> Result<DeviceBus, Error> {
        self.config.validate()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        let Self {
            transport,
            config,
            device_types,
            manifest,
        } = self;

        let local_address = config.local_address.or_else(|| transport.local_addr());

        let mut devices = DeviceRegistry::new();
        let skipped = devices.instantiate(
            &manifest,
            &device_types,
            &transport,
            config.universe_assignment,
        );
        let devices = Arc::new(devices);

        let feed = EventFeed::with_capacity(config.feed_capacity);
        let subscriptions = Arc::new(SubscriptionRegistry::new());

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(queue_tx, feed.clone(), local_address);

        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, nodes) = watch::channel(Vec::new());

        let dispatcher = runtime.spawn(Dispatcher::new(Arc::clone(&subscriptions)).run(queue_rx));
        let monitor = runtime.spawn(
            HealthMonitor::new(
                Arc::clone(&transport),
                reply_rx,
                snapshot_tx,
                feed.clone(),
                &config,
            )
            .run(),
        );

        let router = Arc::new(PacketRouter::new(
            Arc::clone(&devices),
            sink.clone(),
            reply_tx,
            config.trigger_key,
            local_address.map(|addr| addr.ip()),
        ));
        // The devices hold the transport, so the transport must not own the router
        let handler_router = Arc::downgrade(&router);
        transport.subscribe_all(Arc::new(move |packet| {
            if let Some(router) = handler_router.upgrade() {
                router.route(packet);
            }
        }));

        tracing::info!(
            devices = devices.len(),
            skipped = skipped.len(),
            local_address = ?local_address,
            "Device bus started"
        );

        Ok(DeviceBus::from_inner(Inner {
            transport,
            devices,
            router: Mutex::new(Some(router)),
            subscriptions,
            sink,
            feed,
            nodes,
            skipped,
            tasks: Mutex::new(vec![dispatcher, monitor]),
        }))
    }
}
