// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Condition-keyed subscriber table.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::event::{Condition, Event};

use super::{Callback, SubscribeOptions, Subscriber, SubscriptionId};

/// Registry mapping each [`Condition`] to the subscribers stored under it.
///
/// A subscriber lives in exactly one bucket: the condition it was registered
/// with. Wildcards are expanded at lookup time, see [`Condition::projections`].
#[derive(Debug)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    buckets: RwLock<HashMap<Condition, Vec<Arc<Subscriber>>>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a new subscriber under `condition`.
    pub fn insert(
        &self,
        condition: Condition,
        callback: Callback,
        options: SubscribeOptions,
    ) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let subscriber = Arc::new(Subscriber::new(id, callback, options));
        self.buckets
            .write()
            .entry(condition)
            .or_default()
            .push(subscriber);
        id
    }

    /// Returns the subscribers matching `event`, bucket by bucket in
    /// projection order, and in registration order within a bucket.
    pub(crate) fn matching(&self, event: &Event) -> Vec<Arc<Subscriber>> {
        let buckets = self.buckets.read();
        Condition::projections(event)
            .iter()
            .filter_map(|condition| buckets.get(condition))
            .flatten()
            .cloned()
            .collect()
    }

    /// Unlinks a subscriber from every bucket holding it.
    ///
    /// Returns `true` if anything was removed; removing twice is harmless.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut buckets = self.buckets.write();
        let mut removed = false;
        buckets.retain(|_, subscribers| {
            let before = subscribers.len();
            subscribers.retain(|s| s.id() != id);
            removed |= subscribers.len() != before;
            !subscribers.is_empty()
        });
        removed
    }

    /// Returns `true` if the subscription is still registered.
    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.buckets
            .read()
            .values()
            .flatten()
            .any(|s| s.id() == id)
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.read().values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }

    /// Returns the number of distinct conditions in use.
    #[must_use]
    pub fn condition_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.buckets.write().clear();
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Callback::without_event(|| async { Ok(()) })
    }

    fn ids(subscribers: &[Arc<Subscriber>]) -> Vec<u64> {
        subscribers.iter().map(|s| s.id().value()).collect()
    }

    #[test]
    fn matching_follows_projection_order() {
        let registry = SubscriptionRegistry::new();
        let everything = registry.insert(Condition::any(), noop(), SubscribeOptions::new());
        let by_action = registry.insert(Condition::any().action("Opened"), noop(), SubscribeOptions::new());
        let exact = registry.insert(
            Condition::any().source("Door").action("Opened").value(true),
            noop(),
            SubscribeOptions::new(),
        );
        let other = registry.insert(Condition::any().source("Window"), noop(), SubscribeOptions::new());

        let matched = registry.matching(&Event::new("Door", "Opened", true));
        assert_eq!(
            ids(&matched),
            vec![exact.value(), by_action.value(), everything.value()]
        );
        assert!(!ids(&matched).contains(&other.value()));
    }

    #[test]
    fn same_condition_keeps_registration_order() {
        let registry = SubscriptionRegistry::new();
        let first = registry.insert(Condition::any().source("Door"), noop(), SubscribeOptions::new());
        let second = registry.insert(Condition::any().source("Door"), noop(), SubscribeOptions::new());

        assert_eq!(registry.condition_count(), 1);
        assert_eq!(
            ids(&registry.matching(&Event::new("Door", "Closed", false))),
            vec![first.value(), second.value()]
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let id = registry.insert(Condition::any(), noop(), SubscribeOptions::new());

        assert!(registry.contains(id));
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
        assert_eq!(registry.condition_count(), 0);
    }

    #[test]
    fn absent_value_is_not_a_wildcard() {
        let registry = SubscriptionRegistry::new();
        registry.insert(Condition::any().value(()), noop(), SubscribeOptions::new());

        assert!(registry.matching(&Event::new("Reader", "Scanned", "04A2")).is_empty());
        assert_eq!(registry.matching(&Event::new("Reader", "Removed", ())).len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let registry = SubscriptionRegistry::new();
        let a = registry.insert(Condition::any(), noop(), SubscribeOptions::new());
        let b = registry.insert(Condition::any(), noop(), SubscribeOptions::new());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }
}
