// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device bus: startup wiring and the public facade.

mod builder;
mod device_bus;

pub use builder::DeviceBusBuilder;
pub use device_bus::DeviceBus;
