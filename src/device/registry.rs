// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of the devices built from the manifest.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::UniverseAssignment;
use crate::error::{AddressError, ConfigError};
use crate::protocol::Transport;
use crate::types::Universe;

use super::{
    Device, DeviceArgs, DeviceContext, DeviceKind, DeviceType, DeviceTypeRegistry, Fixture,
    Manifest, ManifestEntry, Sensor,
};

/// Arguments consumed by the registry itself, never passed to a factory.
const RESERVED_ARGS: [&str; 2] = ["name", "universe"];

/// All devices of the installation, indexed by name and by universe.
///
/// Built once at startup, then only read.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, Device>,
    universes: HashMap<Universe, String>,
    nodes: HashMap<String, String>,
    next_sequential: Option<Universe>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every device declared in the manifest.
    ///
    /// Entries that cannot be built are logged and skipped; the returned list
    /// holds one error per skipped entry, in manifest order.
    pub fn instantiate(
        &mut self,
        manifest: &Manifest,
        types: &DeviceTypeRegistry,
        transport: &Arc<dyn Transport>,
        assignment: UniverseAssignment,
    ) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for node in &manifest.nodes {
            for entry in &node.devices {
                match self.build_entry(&node.name, entry, types, transport, assignment) {
                    Ok(device) => {
                        debug!(
                            device = %device.name(),
                            node = %node.name,
                            kind = ?device.kind(),
                            "Registered device"
                        );
                        self.insert(&node.name, device);
                    }
                    Err(e) => {
                        if matches!(e, ConfigError::DuplicateUniverse { .. }) {
                            error!(node = %node.name, error = %e, "Skipping manifest entry");
                        } else {
                            warn!(node = %node.name, error = %e, "Skipping manifest entry");
                        }
                        errors.push(e);
                    }
                }
            }
        }

        info!(
            devices = self.devices.len(),
            skipped = errors.len(),
            "Device registry built"
        );
        errors
    }

    fn build_entry(
        &mut self,
        node: &str,
        entry: &ManifestEntry,
        types: &DeviceTypeRegistry,
        transport: &Arc<dyn Transport>,
        assignment: UniverseAssignment,
    ) -> Result<Device, ConfigError> {
        let name = entry.name().ok_or_else(|| ConfigError::MissingArgument {
            device_type: entry.type_name.clone(),
            argument: "name".to_string(),
        })?;

        let device_type = types
            .get(&entry.type_name)
            .ok_or_else(|| ConfigError::UnknownDeviceType(entry.type_name.clone()))?;

        if self.devices.contains_key(name) {
            return Err(ConfigError::DuplicateDevice(name.to_string()));
        }

        let args = DeviceArgs::new(entry.args.clone());
        let universe = match device_type.kind() {
            DeviceKind::Fixture => Some(self.resolve_universe(name, &args, assignment)?),
            DeviceKind::Sensor => None,
        };

        let context = DeviceContext {
            name: name.to_string(),
            node: node.to_string(),
            universe,
            args: filter_args(name, args, device_type),
            transport: Arc::clone(transport),
        };

        let device = device_type.build(context)?;
        if device.kind() != device_type.kind() {
            return Err(ConfigError::KindMismatch {
                device_type: entry.type_name.clone(),
                device: name.to_string(),
                expected: device_type.kind(),
                actual: device.kind(),
            });
        }

        // Factories may ignore the resolved universe
        if let Device::Fixture(fixture) = &device {
            self.check_universe_free(fixture.universe(), name)?;
        }

        Ok(device)
    }

    fn resolve_universe(
        &mut self,
        device: &str,
        args: &DeviceArgs,
        assignment: UniverseAssignment,
    ) -> Result<Universe, ConfigError> {
        let universe = match args.u64("universe")? {
            Some(explicit) => u16::try_from(explicit)
                .ok()
                .and_then(|u| Universe::new(u).ok())
                .ok_or_else(|| ConfigError::InvalidArgument {
                    argument: "universe".to_string(),
                    message: format!("{explicit} is not a valid universe"),
                })?,
            None => match assignment {
                UniverseAssignment::Hashed => Universe::from_name(device),
                UniverseAssignment::Sequential { base } => self.next_free_universe(base)?,
            },
        };

        self.check_universe_free(universe, device)?;
        Ok(universe)
    }

    fn check_universe_free(&self, universe: Universe, device: &str) -> Result<(), ConfigError> {
        match self.universes.get(&universe) {
            Some(existing) => Err(ConfigError::DuplicateUniverse {
                universe,
                existing: existing.clone(),
                device: device.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn next_free_universe(&mut self, base: Universe) -> Result<Universe, ConfigError> {
        let exhausted = || ConfigError::InvalidArgument {
            argument: "universe".to_string(),
            message: format!("no free universe left above {base}"),
        };

        let mut candidate = self.next_sequential.unwrap_or(base);
        while self.universes.contains_key(&candidate) {
            candidate = candidate.next().ok_or_else(exhausted)?;
        }
        self.next_sequential = candidate.next();
        Ok(candidate)
    }

    fn insert(&mut self, node: &str, device: Device) {
        let name = device.name().to_string();
        if let Device::Fixture(fixture) = &device {
            self.universes.insert(fixture.universe(), name.clone());
        }
        self.nodes.insert(name.clone(), node.to_string());
        self.devices.insert(name, device);
    }

    /// Looks up any device by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }

    /// Looks up a sensor by name.
    #[must_use]
    pub fn sensor(&self, name: &str) -> Option<&Arc<dyn Sensor>> {
        self.devices.get(name).and_then(Device::as_sensor)
    }

    /// Looks up a fixture by name.
    #[must_use]
    pub fn fixture(&self, name: &str) -> Option<&Arc<dyn Fixture>> {
        self.devices.get(name).and_then(Device::as_fixture)
    }

    /// Looks up a fixture by name, explaining why the lookup failed.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::UnknownDevice` if nothing has that name, or
    /// `AddressError::NotAFixture` if the name belongs to a sensor.
    pub fn resolve_fixture(&self, name: &str) -> Result<&Arc<dyn Fixture>, AddressError> {
        match self.devices.get(name) {
            Some(Device::Fixture(fixture)) => Ok(fixture),
            Some(Device::Sensor(_)) => Err(AddressError::NotAFixture(name.to_string())),
            None => Err(AddressError::UnknownDevice(name.to_string())),
        }
    }

    /// Looks up the fixture listening on a universe.
    #[must_use]
    pub fn fixture_by_universe(&self, universe: Universe) -> Option<&Arc<dyn Fixture>> {
        self.universes
            .get(&universe)
            .and_then(|name| self.fixture(name))
    }

    /// Returns the name of the node hosting a device.
    #[must_use]
    pub fn node_of(&self, device: &str) -> Option<&str> {
        self.nodes.get(device).map(String::as_str)
    }

    /// Returns the device names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Drops reserved arguments and the ones the device type does not accept.
fn filter_args(device: &str, mut args: DeviceArgs, device_type: &DeviceType) -> DeviceArgs {
    args.retain(|key| {
        if RESERVED_ARGS.contains(&key) {
            return false;
        }
        let accepted = device_type.accepts(key);
        if !accepted {
            debug!(device = %device, argument = %key, "Dropping unsupported argument");
        }
        accepted
    });
    args
}
