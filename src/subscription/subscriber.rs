// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribers, their callbacks and the per-subscriber concurrency gate.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

use crate::event::Event;

/// Unique identifier for a subscription.
///
/// Returned by [`DeviceBus::subscribe`](crate::DeviceBus::subscribe) and
/// accepted by [`DeviceBus::unsubscribe`](crate::DeviceBus::unsubscribe).
/// Identifiers are never reused by a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Error a callback may return. It is logged, never propagated.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one callback invocation.
pub type CallbackResult = Result<(), CallbackError>;

type BoxFuture = Pin<Box<dyn Future<Output = CallbackResult> + Send>>;

#[derive(Clone)]
enum Handler {
    WithEvent(Arc<dyn Fn(Arc<Event>) -> BoxFuture + Send + Sync>),
    WithoutEvent(Arc<dyn Fn() -> BoxFuture + Send + Sync>),
    Blocking(Arc<dyn Fn(Arc<Event>) -> CallbackResult + Send + Sync>),
}

/// A subscriber's reaction to a matching event.
///
/// Every invocation runs as its own Tokio task, so a slow callback never
/// holds up dispatch of later events or other subscribers.
///
/// # Examples
///
/// ```
/// use artbus_lib::subscription::Callback;
///
/// let with_event = Callback::new(|event| async move {
///     println!("{event}");
///     Ok(())
/// });
/// assert!(with_event.wants_event());
///
/// let without_event = Callback::without_event(|| async { Ok(()) });
/// assert!(!without_event.wants_event());
/// ```
#[derive(Clone)]
pub struct Callback(Handler);

impl Callback {
    /// Creates an async callback receiving the event.
    pub fn new<F, Fut>(callback: F) -> Self
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self(Handler::WithEvent(Arc::new(move |event| {
            Box::pin(callback(event)) as BoxFuture
        })))
    }

    /// Creates an async callback that does not look at the event.
    pub fn without_event<F, Fut>(callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self(Handler::WithoutEvent(Arc::new(move || {
            Box::pin(callback()) as BoxFuture
        })))
    }

    /// Creates a synchronous callback, run on the blocking thread pool.
    pub fn blocking<F>(callback: F) -> Self
    where
        F: Fn(Arc<Event>) -> CallbackResult + Send + Sync + 'static,
    {
        Self(Handler::Blocking(Arc::new(callback)))
    }

    /// Returns `true` if the callback receives the event.
    #[must_use]
    pub fn wants_event(&self) -> bool {
        !matches!(self.0, Handler::WithoutEvent(_))
    }

    /// Spawns one invocation and a supervisor that logs its outcome.
    ///
    /// The returned handle completes when the callback does.
    fn spawn(&self, id: SubscriptionId, event: Arc<Event>) -> JoinHandle<()> {
        let handler = self.0.clone();
        tokio::spawn(async move {
            let label = event.to_string();
            let outcome = match handler {
                Handler::WithEvent(f) => tokio::spawn(f(event)).await,
                Handler::WithoutEvent(f) => tokio::spawn(f()).await,
                Handler::Blocking(f) => tokio::task::spawn_blocking(move || f(event)).await,
            };

            match outcome {
                Ok(Ok(())) => trace!(subscription = %id, event = %label, "Callback finished"),
                Ok(Err(e)) => {
                    warn!(subscription = %id, event = %label, error = %e, "Callback failed");
                }
                Err(e) if e.is_panic() => {
                    error!(subscription = %id, event = %label, "Callback panicked");
                }
                Err(_) => debug!(subscription = %id, event = %label, "Callback cancelled"),
            }
        })
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.0 {
            Handler::WithEvent(_) => "WithEvent",
            Handler::WithoutEvent(_) => "WithoutEvent",
            Handler::Blocking(_) => "Blocking",
        };
        f.debug_tuple("Callback").field(&kind).finish()
    }
}

/// Dispatch policy of a subscription.
///
/// # Examples
///
/// ```
/// use artbus_lib::subscription::SubscribeOptions;
///
/// let options = SubscribeOptions::new().fire_once();
/// assert!(options.is_fire_once());
/// assert!(!options.allows_parallelism());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubscribeOptions {
    fire_once: bool,
    allow_parallelism: bool,
}

impl SubscribeOptions {
    /// Default policy: fire repeatedly, at most one invocation in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlinks the subscription after its first invocation.
    #[must_use]
    pub fn fire_once(mut self) -> Self {
        self.fire_once = true;
        self
    }

    /// Lets invocations overlap instead of dropping firings while one runs.
    #[must_use]
    pub fn allow_parallelism(mut self) -> Self {
        self.allow_parallelism = true;
        self
    }

    /// Returns `true` if the subscription is consumed by its first invocation.
    #[must_use]
    pub fn is_fire_once(&self) -> bool {
        self.fire_once
    }

    /// Returns `true` if invocations may overlap.
    #[must_use]
    pub fn allows_parallelism(&self) -> bool {
        self.allow_parallelism
    }
}

/// A registered callback plus its dispatch policy and in-flight state.
pub(crate) struct Subscriber {
    id: SubscriptionId,
    callback: Callback,
    options: SubscribeOptions,
    running: Mutex<Option<JoinHandle<()>>>,
    consumed: AtomicBool,
}

impl Subscriber {
    pub(crate) fn new(id: SubscriptionId, callback: Callback, options: SubscribeOptions) -> Self {
        Self {
            id,
            callback,
            options,
            running: Mutex::new(None),
            consumed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    pub(crate) fn is_fire_once(&self) -> bool {
        self.options.is_fire_once()
    }

    /// Returns `true` while a previous invocation has not completed.
    pub(crate) fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Invokes the callback unless the gate drops this firing.
    ///
    /// Must be called from within a Tokio runtime. Returns `true` if an
    /// invocation was spawned.
    pub(crate) fn try_fire(&self, event: &Arc<Event>) -> bool {
        let mut running = self.running.lock();

        if !self.options.allows_parallelism()
            && running.as_ref().is_some_and(|handle| !handle.is_finished())
        {
            debug!(subscription = %self.id, event = %event, "Previous invocation still running, dropping");
            return false;
        }

        if self.options.is_fire_once() && self.consumed.swap(true, Ordering::AcqRel) {
            return false;
        }

        *running = Some(self.callback.spawn(self.id, Arc::clone(event)));
        true
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("callback", &self.callback)
            .field("options", &self.options)
            .field("consumed", &self.consumed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
