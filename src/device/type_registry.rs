// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table of constructible device types, keyed by manifest type name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::protocol::Transport;
use crate::types::Universe;

use super::builtin::{Button, Dial, DmxFixture, Keypad, RfidReader};
use super::{Device, DeviceArgs};

/// Whether a device type produces a sensor or a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Input device.
    Sensor,
    /// Output device.
    Fixture,
}

/// Everything a factory needs to build one device.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    /// Device name from the manifest.
    pub name: String,
    /// Name of the node hosting the device.
    pub node: String,
    /// Universe resolved by the registry (fixtures only).
    pub universe: Option<Universe>,
    /// Constructor arguments, filtered to the ones the type accepts.
    pub args: DeviceArgs,
    /// Shared transport.
    pub transport: Arc<dyn Transport>,
}

impl DeviceContext {
    /// Returns the resolved universe.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingArgument` when called for a sensor.
    pub fn require_universe(&self, device_type: &str) -> Result<Universe, ConfigError> {
        self.universe.ok_or_else(|| ConfigError::MissingArgument {
            device_type: device_type.to_string(),
            argument: "universe".to_string(),
        })
    }
}

/// Constructor for one device type.
pub type DeviceFactory = Arc<dyn Fn(DeviceContext) -> Result<Device, ConfigError> + Send + Sync>;

/// A registered device type.
#[derive(Clone)]
pub struct DeviceType {
    kind: DeviceKind,
    accepted_args: Vec<String>,
    factory: DeviceFactory,
}

impl DeviceType {
    /// Returns the device kind.
    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Returns `true` if the type accepts this constructor argument.
    ///
    /// `name` and `universe` are handled by the registry and never passed on.
    #[must_use]
    pub fn accepts(&self, arg: &str) -> bool {
        self.accepted_args.iter().any(|a| a == arg)
    }

    /// Runs the factory.
    ///
    /// # Errors
    ///
    /// Returns whatever `ConfigError` the factory reports.
    pub fn build(&self, context: DeviceContext) -> Result<Device, ConfigError> {
        (self.factory)(context)
    }
}

impl fmt::Debug for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceType")
            .field("kind", &self.kind)
            .field("accepted_args", &self.accepted_args)
            .finish_non_exhaustive()
    }
}

/// Explicit map from type names to device factories.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use artbus_lib::device::{Device, DeviceKind, DeviceTypeRegistry, DmxFixture};
///
/// let mut types = DeviceTypeRegistry::with_builtin();
/// types.register("Projector", DeviceKind::Fixture, &["channels"], |ctx| {
///     Ok(Device::Fixture(Arc::new(DmxFixture::from_context("Projector", ctx)?)))
/// });
///
/// assert!(types.get("Projector").is_some());
/// assert!(types.get("Button").is_some());
/// assert!(types.get("Toaster").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceTypeRegistry {
    types: HashMap<String, DeviceType>,
}

impl DeviceTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in sensor and fixture drivers.
    ///
    /// Sensors: `Button`, `RfidReader`, `Dial`, `Keypad`.
    /// Fixtures: `DmxFixture`, plus the aliases `LedStrip`, `PwmLamp`,
    /// `SevenSegment` and `DmxLight`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut types = Self::new();

        types.register("Button", DeviceKind::Sensor, &["invert"], |ctx| {
            Ok(Device::Sensor(Arc::new(Button::from_context(ctx)?)))
        });
        types.register("RfidReader", DeviceKind::Sensor, &[], |ctx| {
            Ok(Device::Sensor(Arc::new(RfidReader::new(ctx.name))))
        });
        types.register("Dial", DeviceKind::Sensor, &[], |ctx| {
            Ok(Device::Sensor(Arc::new(Dial::new(ctx.name))))
        });
        types.register("Keypad", DeviceKind::Sensor, &["keys"], |ctx| {
            Ok(Device::Sensor(Arc::new(Keypad::from_context(ctx)?)))
        });

        for alias in ["DmxFixture", "LedStrip", "PwmLamp", "SevenSegment", "DmxLight"] {
            types.register(alias, DeviceKind::Fixture, &["channels"], move |ctx| {
                Ok(Device::Fixture(Arc::new(DmxFixture::from_context(alias, ctx)?)))
            });
        }

        types
    }

    /// Registers (or replaces) a device type.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        kind: DeviceKind,
        accepted_args: &[&str],
        factory: F,
    ) where
        F: Fn(DeviceContext) -> Result<Device, ConfigError> + Send + Sync + 'static,
    {
        self.types.insert(
            name.into(),
            DeviceType {
                kind,
                accepted_args: accepted_args.iter().map(ToString::to_string).collect(),
                factory: Arc::new(factory),
            },
        );
    }

    /// Looks up a device type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DeviceType> {
        self.types.get(name)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
