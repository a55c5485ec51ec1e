// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensors, fixtures and the registry that owns them.
//!
//! Devices come in two kinds:
//!
//! - A [`Sensor`] turns the raw payload of a trigger packet into an action
//!   name and a [`Value`].
//! - A [`Fixture`] owns a DMX [`Universe`] and sends frames to it.
//!
//! Devices are built once at startup from a [`Manifest`] by looking up each
//! declared type name in a [`DeviceTypeRegistry`], and live in the
//! [`DeviceRegistry`] for the lifetime of the bus.

mod args;
mod builtin;
mod manifest;
mod registry;
mod sequence;
mod type_registry;

use std::fmt;
use std::sync::Arc;

pub use args::DeviceArgs;
pub use builtin::{Button, Dial, DmxFixture, DmxOutput, Keypad, RfidReader};
pub use manifest::{Manifest, ManifestEntry, NodeManifest};
pub use registry::DeviceRegistry;
pub use sequence::SequenceTracker;
pub use type_registry::{DeviceContext, DeviceFactory, DeviceKind, DeviceType, DeviceTypeRegistry};

use crate::error::{DecodeError, Error};
use crate::types::{Universe, Value};

/// A device producing events from physical input.
pub trait Sensor: Send + Sync + fmt::Debug {
    /// Returns the unique device name.
    fn name(&self) -> &str;

    /// Decodes a raw trigger payload into an action name and value.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the payload is malformed for this sensor.
    fn decode(&self, payload: &[u8]) -> Result<(String, Value), DecodeError>;

    /// Returns the tracker used to drop retransmitted triggers.
    fn sequence(&self) -> &SequenceTracker;
}

/// A device consuming DMX frames.
pub trait Fixture: Send + Sync + fmt::Debug {
    /// Returns the unique device name.
    fn name(&self) -> &str;

    /// Returns the universe this fixture listens on.
    fn universe(&self) -> Universe;

    /// Sends one DMX frame to the fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is invalid for this fixture or the
    /// transport fails.
    fn send_dmx(&self, data: &[u8]) -> Result<(), Error>;
}

/// A registered device.
#[derive(Debug, Clone)]
pub enum Device {
    /// An input device.
    Sensor(Arc<dyn Sensor>),
    /// An output device.
    Fixture(Arc<dyn Fixture>),
}

impl Device {
    /// Returns the device name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Sensor(sensor) => sensor.name(),
            Self::Fixture(fixture) => fixture.name(),
        }
    }

    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Sensor(_) => DeviceKind::Sensor,
            Self::Fixture(_) => DeviceKind::Fixture,
        }
    }

    /// Returns the sensor, if this is one.
    #[must_use]
    pub fn as_sensor(&self) -> Option<&Arc<dyn Sensor>> {
        match self {
            Self::Sensor(sensor) => Some(sensor),
            Self::Fixture(_) => None,
        }
    }

    /// Returns the fixture, if this is one.
    #[must_use]
    pub fn as_fixture(&self) -> Option<&Arc<dyn Fixture>> {
        match self {
            Self::Fixture(fixture) => Some(fixture),
            Self::Sensor(_) => None,
        }
    }
}
