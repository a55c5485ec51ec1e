// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::Universe;

/// Protocol key every inbound trigger packet must carry.
pub const DEFAULT_TRIGGER_KEY: u8 = 0x10;

/// Default period between two poll broadcasts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default time spent collecting poll replies after each broadcast.
pub const DEFAULT_REPLY_WINDOW: Duration = Duration::from_secs(3);

/// Default number of silent cycles before a node is reported lost.
pub const DEFAULT_LOST_THRESHOLD: u32 = 3;

/// Default capacity of the observer feed.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// How fixtures without an explicit `universe` argument get one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UniverseAssignment {
    /// Derive the universe from a hash of the device name.
    #[default]
    Hashed,
    /// Hand out the next free universe, starting at `base`.
    Sequential {
        /// First universe to assign.
        base: Universe,
    },
}

/// Configuration for a [`DeviceBus`](crate::DeviceBus).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use artbus_lib::{BusConfig, UniverseAssignment, Universe};
///
/// let config = BusConfig::new()
///     .with_poll_interval(Duration::from_secs(5))
///     .with_reply_window(Duration::from_secs(1))
///     .with_universe_assignment(UniverseAssignment::Sequential {
///         base: Universe::new(100).unwrap(),
///     });
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Period between two poll broadcasts.
    pub poll_interval: Duration,
    /// Time spent collecting replies after each poll.
    pub reply_window: Duration,
    /// Silent cycles before a node is reported lost.
    pub lost_threshold: u32,
    /// Key expected on inbound trigger packets.
    pub trigger_key: u8,
    /// Own address, used for loopback suppression and as default event sender.
    ///
    /// Falls back to [`Transport::local_addr`](crate::protocol::Transport::local_addr).
    pub local_address: Option<SocketAddr>,
    /// Universe assignment for fixtures without an explicit universe.
    pub universe_assignment: UniverseAssignment,
    /// Capacity of the observer feed.
    pub feed_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reply_window: DEFAULT_REPLY_WINDOW,
            lost_threshold: DEFAULT_LOST_THRESHOLD,
            trigger_key: DEFAULT_TRIGGER_KEY,
            local_address: None,
            universe_assignment: UniverseAssignment::default(),
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

impl BusConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the reply collection window.
    #[must_use]
    pub fn with_reply_window(mut self, window: Duration) -> Self {
        self.reply_window = window;
        self
    }

    /// Sets the number of silent cycles before a node is lost.
    #[must_use]
    pub fn with_lost_threshold(mut self, threshold: u32) -> Self {
        self.lost_threshold = threshold;
        self
    }

    /// Sets the expected trigger key.
    #[must_use]
    pub fn with_trigger_key(mut self, key: u8) -> Self {
        self.trigger_key = key;
        self
    }

    /// Sets the local address.
    #[must_use]
    pub fn with_local_address(mut self, address: SocketAddr) -> Self {
        self.local_address = Some(address);
        self
    }

    /// Sets the universe assignment mode.
    #[must_use]
    pub fn with_universe_assignment(mut self, assignment: UniverseAssignment) -> Self {
        self.universe_assignment = assignment;
        self
    }

    /// Sets the observer feed capacity.
    #[must_use]
    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSettings` if the reply window is not
    /// shorter than the poll interval, or if the lost threshold or feed
    /// capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reply_window >= self.poll_interval {
            return Err(ConfigError::InvalidSettings(format!(
                "reply window ({:?}) must be shorter than poll interval ({:?})",
                self.reply_window, self.poll_interval
            )));
        }
        if self.lost_threshold == 0 {
            return Err(ConfigError::InvalidSettings(
                "lost threshold must be at least 1".to_string(),
            ));
        }
        if self.feed_capacity == 0 {
            return Err(ConfigError::InvalidSettings(
                "feed capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
