// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ArtBus` Lib - a device event bus for interactive installations.
//!
//! Embedded controllers ("nodes") on a UDP broadcast lighting network expose
//! sensors (buttons, RFID readers, dials, keypads) and fixtures (LED strips,
//! lamps, displays, DMX lights). This library sits between the wire transport
//! and the application scripts:
//!
//! - **Discovery and health**: nodes are polled periodically and tracked
//!   through `New`, `Connected`, `MissedReplies(n)` and `LostConnection`.
//! - **Decoding**: trigger packets are turned into typed [`Event`]s by the
//!   sensor they name.
//! - **Dispatch**: events are matched against wildcard [`Condition`]s and
//!   delivered to subscribed callbacks, each running as its own task.
//! - **Output**: scripts address fixtures by name with
//!   [`DeviceBus::send_dmx`].
//!
//! The wire format itself belongs to a [`Transport`](protocol::Transport)
//! implementation supplied by the host.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use artbus_lib::{BusConfig, Callback, Condition, DeviceBus, Manifest, SubscribeOptions};
//! # use artbus_lib::protocol::Transport;
//!
//! # async fn example(transport: Arc<dyn Transport>) -> artbus_lib::Result<()> {
//! let manifest = Manifest::from_json(r#"{
//!     "nodes": [{
//!         "name": "Altar",
//!         "devices": [
//!             { "type": "Button", "args": { "name": "AltarButton" } },
//!             { "type": "LedStrip", "args": { "name": "AltarLeds", "channels": 90 } }
//!         ]
//!     }]
//! }"#).expect("valid manifest");
//!
//! let bus = DeviceBus::builder(transport)
//!     .with_config(BusConfig::default())
//!     .with_manifest(manifest)
//!     .start()?;
//!
//! let leds = bus.clone();
//! bus.subscribe(
//!     Condition::any().source("AltarButton").action("Pressed"),
//!     Callback::new(move |_event| {
//!         let leds = leds.clone();
//!         async move {
//!             leds.send_dmx("AltarLeds", &[255; 90]);
//!             Ok(())
//!         }
//!     }),
//!     SubscribeOptions::new(),
//! );
//!
//! // Scripts raise their own events through the same path
//! bus.fire_event("Altar", "Unlocked", true);
//! # Ok(())
//! # }
//! ```
//!
//! # Observing the bus
//!
//! ```no_run
//! # async fn example(bus: artbus_lib::DeviceBus) {
//! use artbus_lib::event::BusEvent;
//!
//! let mut feed = bus.subscribe_feed();
//! while let Ok(item) = feed.recv().await {
//!     match item {
//!         BusEvent::Fired(event) => println!("{event}"),
//!         BusEvent::Node(transition) => println!("{transition}"),
//!     }
//! }
//! # }
//! ```

mod bus;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod node;
pub mod protocol;
pub mod subscription;
pub mod types;

pub use bus::{DeviceBus, DeviceBusBuilder};
pub use config::{BusConfig, DEFAULT_TRIGGER_KEY, UniverseAssignment};
pub use device::{Device, DeviceKind, DeviceTypeRegistry, Fixture, Manifest, Sensor};
pub use error::{AddressError, ConfigError, DecodeError, Error, Result, TransportError, ValueError};
pub use event::{BusEvent, Condition, Event};
pub use node::{Node, NodeStatus, NodeTransition};
pub use subscription::{Callback, SubscribeOptions, SubscriptionId};
pub use types::{MacAddress, Universe, Value};
