// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription conditions and wildcard projection.
//!
//! A [`Condition`] is stored exactly as it was requested. Matching never
//! scans conditions: instead every fired event is projected onto the eight
//! conditions that could match it (see [`Condition::projections`]) and each
//! projection is looked up directly.

use std::borrow::Borrow;
use std::fmt;

use crate::types::Value;

use super::Event;

/// One field of a condition: either a concrete value or a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Pattern<T> {
    /// Matches any value.
    #[default]
    Any,
    /// Matches only this value.
    Exact(T),
}

impl<T> Pattern<T> {
    /// Returns `true` if this is the wildcard.
    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns `true` if `value` matches this pattern.
    #[must_use]
    pub fn matches<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        match self {
            Self::Any => true,
            Self::Exact(expected) => expected.borrow() == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Pattern<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(value) => write!(f, "{value}"),
        }
    }
}

/// A (possibly wildcarded) subscription key over source, action and value.
///
/// Equality is structural, so two subscriptions requesting the same pattern
/// share a bucket.
///
/// # Examples
///
/// ```
/// use artbus_lib::event::{Condition, Event};
///
/// let condition = Condition::any().source("Door").action("Opened");
///
/// assert!(condition.matches(&Event::new("Door", "Opened", true)));
/// assert!(!condition.matches(&Event::new("Window", "Opened", true)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Condition {
    /// The event source pattern.
    pub source: Pattern<String>,
    /// The event action pattern.
    pub action: Pattern<String>,
    /// The event value pattern.
    pub value: Pattern<Value>,
}

impl Condition {
    /// Creates a condition matching every event.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the condition to one source.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Pattern::Exact(source.into());
        self
    }

    /// Restricts the condition to one action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Pattern::Exact(action.into());
        self
    }

    /// Restricts the condition to one value.
    ///
    /// Passing [`Value::Absent`] matches only events without a value; leave
    /// the field unset for a wildcard.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Pattern::Exact(value.into());
        self
    }

    /// Returns `true` if the event matches every field of this condition.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        self.source.matches(event.source())
            && self.action.matches(event.action())
            && self.value.matches(event.value())
    }

    /// Returns the eight conditions an event can match, in dispatch order.
    ///
    /// Each field is either kept or replaced by the wildcard. The order is
    /// fixed: `(s,a,v)`, `(s,a,*)`, `(s,*,v)`, `(s,*,*)`, `(*,a,v)`,
    /// `(*,a,*)`, `(*,*,v)`, `(*,*,*)`. Subscribers are started in this order.
    #[must_use]
    pub fn projections(event: &Event) -> [Self; 8] {
        let project = |keep_source: bool, keep_action: bool, keep_value: bool| Self {
            source: keep(keep_source, event.source().to_string()),
            action: keep(keep_action, event.action().to_string()),
            value: keep(keep_value, event.value().clone()),
        };

        [
            project(true, true, true),
            project(true, true, false),
            project(true, false, true),
            project(true, false, false),
            project(false, true, true),
            project(false, true, false),
            project(false, false, true),
            project(false, false, false),
        ]
    }
}

fn keep<T>(keep: bool, value: T) -> Pattern<T> {
    if keep {
        Pattern::Exact(value)
    } else {
        Pattern::Any
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.source, self.action, self.value)
    }
}
