// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application events and subscription conditions.
//!
//! An [`Event`] is the `(source, action, value)` triple raised by a sensor or a
//! script. A [`Condition`] is the same triple where any field may be a
//! wildcard; subscribers are stored under the condition they asked for.
//!
//! Everything fired on the bus is also mirrored to an [`EventFeed`], together
//! with node health transitions, for observers that want the raw stream.
//!
//! # Examples
//!
//! ```
//! use artbus_lib::event::{Condition, Event};
//!
//! let condition = Condition::any().action("Opened");
//! assert!(condition.matches(&Event::new("Door", "Opened", true)));
//! assert!(!condition.matches(&Event::new("Door", "Closed", true)));
//! ```

mod app_event;
mod bus_event;
mod condition;
mod feed;

pub use app_event::Event;
pub use bus_event::BusEvent;
pub use condition::{Condition, Pattern};
pub use feed::EventFeed;
