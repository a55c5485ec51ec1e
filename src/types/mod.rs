// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the bus.
//!
//! Each type validates its range at construction time, so the rest of the
//! crate never has to re-check a universe or a MAC address.
//!
//! # Types
//!
//! - [`Value`] - The payload of an event (bool, int, text, bytes, tuple or absent)
//! - [`Universe`] - A 15-bit DMX universe (port address)
//! - [`MacAddress`] - The hardware address identifying a node

mod mac;
mod universe;
mod value;

pub use mac::MacAddress;
pub use universe::Universe;
pub use value::Value;
