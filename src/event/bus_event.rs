// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Items published on the observer feed.

use std::sync::Arc;

use crate::node::NodeTransition;

use super::Event;

/// Something that happened on the bus.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use artbus_lib::event::{BusEvent, Event};
/// use artbus_lib::node::NodeTransition;
///
/// let fired = BusEvent::Fired(Arc::new(Event::new("Door", "Opened", true)));
/// assert_eq!(fired.event().unwrap().action(), "Opened");
///
/// let lost = BusEvent::Node(NodeTransition::Lost { name: "Altar".into() });
/// assert!(lost.is_node());
/// assert!(lost.event().is_none());
/// ```
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// An event was fired, by a sensor or by a script.
    Fired(Arc<Event>),
    /// A node changed health status.
    Node(NodeTransition),
}

impl BusEvent {
    /// Returns `true` for fired events.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }

    /// Returns `true` for node transitions.
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    /// Returns the fired event, if this is one.
    #[must_use]
    pub fn event(&self) -> Option<&Arc<Event>> {
        match self {
            Self::Fired(event) => Some(event),
            Self::Node(_) => None,
        }
    }

    /// Returns the node transition, if this is one.
    #[must_use]
    pub fn transition(&self) -> Option<&NodeTransition> {
        match self {
            Self::Node(transition) => Some(transition),
            Self::Fired(_) => None,
        }
    }
}

impl From<NodeTransition> for BusEvent {
    fn from(transition: NodeTransition) -> Self {
        Self::Node(transition)
    }
}

impl From<Arc<Event>> for BusEvent {
    fn from(event: Arc<Event>) -> Self {
        Self::Fired(event)
    }
}
