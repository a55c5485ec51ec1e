// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application event type.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Value;

/// An application event, raised by a decoded trigger packet or by a script.
///
/// Events are immutable once fired. They are shared between subscribers as
/// `Arc<Event>`.
///
/// # Examples
///
/// ```
/// use artbus_lib::event::Event;
/// use artbus_lib::types::Value;
///
/// let event = Event::new("Door", "Opened", true);
/// assert_eq!(event.source(), "Door");
/// assert_eq!(event.value(), &Value::Bool(true));
/// assert!(event.sender().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    source: String,
    action: String,
    value: Value,
    sender: Option<SocketAddr>,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time and no sender.
    #[must_use]
    pub fn new(source: impl Into<String>, action: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            source: source.into(),
            action: action.into(),
            value: value.into(),
            sender: None,
            timestamp: Utc::now(),
        }
    }

    /// Sets the address of the node (or process) that raised the event.
    #[must_use]
    pub fn with_sender(mut self, sender: Option<SocketAddr>) -> Self {
        self.sender = sender;
        self
    }

    /// Overrides the event timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the name of the device or script that raised the event.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the event value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the sender address, if known.
    #[must_use]
    pub fn sender(&self) -> Option<SocketAddr> {
        self.sender
    }

    /// Returns when the event was raised.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.source, self.action, self.value)
    }
}
