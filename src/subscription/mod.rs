// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscriptions and event dispatch.
//!
//! Subscribers are stored in a [`SubscriptionRegistry`] under the exact
//! [`Condition`](crate::event::Condition) they asked for. A single dispatch
//! loop drains fired events in FIFO order; for each event it looks up the
//! eight wildcard projections and spawns one task per matching subscriber.
//!
//! Each subscriber carries a [`SubscribeOptions`] policy:
//!
//! - without `allow_parallelism`, a firing that arrives while the previous
//!   invocation is still running is dropped for that subscriber;
//! - with `fire_once`, the subscriber is unlinked as soon as its first
//!   invocation starts.
//!
//! # Examples
//!
//! ```no_run
//! use artbus_lib::event::Condition;
//! use artbus_lib::subscription::{Callback, SubscribeOptions};
//!
//! # fn example(bus: &artbus_lib::DeviceBus) {
//! let id = bus.subscribe(
//!     Condition::any().source("Door").action("Opened"),
//!     Callback::new(|event| async move {
//!         println!("door opened: {}", event.value());
//!         Ok(())
//!     }),
//!     SubscribeOptions::new(),
//! );
//!
//! bus.unsubscribe(id);
//! # }
//! ```

mod dispatcher;
mod registry;
mod subscriber;

pub(crate) use dispatcher::{Dispatcher, EventSink};
pub use registry::SubscriptionRegistry;
pub(crate) use subscriber::Subscriber;
pub use subscriber::{Callback, CallbackError, CallbackResult, SubscribeOptions, SubscriptionId};
