// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote node discovery and health monitoring.
//!
//! The health monitor broadcasts a poll every interval, collects the replies
//! for a fixed window, and reconciles them into the [`NodeTable`]. Each node
//! moves through [`NodeStatus`] as it answers or stays silent; changes are
//! reported as [`NodeTransition`]s on the observer feed.

mod monitor;
mod status;
mod table;

pub(crate) use monitor::HealthMonitor;
pub use status::{Node, NodeStatus};
pub use table::{NodeTable, NodeTransition};
