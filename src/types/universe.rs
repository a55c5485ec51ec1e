// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DMX universe addressing.
//!
//! Art-Net addresses universes with a 15-bit port address (net, sub-net and
//! universe packed together). Every fixture on the bus owns exactly one.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::ValueError;

/// A 15-bit DMX universe (port address) in the range 0-32767.
///
/// # Examples
///
/// ```
/// use artbus_lib::types::Universe;
///
/// let u = Universe::new(12).unwrap();
/// assert_eq!(u.value(), 12);
///
/// assert!(Universe::new(40_000).is_err());
///
/// // Names always hash to the same universe
/// assert_eq!(Universe::from_name("Stage"), Universe::from_name("Stage"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Universe(u16);

impl Universe {
    /// Highest addressable universe.
    pub const MAX: Self = Self(0x7FFF);

    /// Creates a universe after validating the 15-bit range.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `value` exceeds 32767.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i64::from(Self::MAX.0),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Derives a universe deterministically from a fixture name.
    ///
    /// The first two bytes of the SHA-1 digest of the name, read big-endian
    /// and truncated to 15 bits. Nodes flashed with a universe derived the
    /// same way rely on these exact values.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let digest = Sha1::digest(name.as_bytes());
        Self(u16::from_be_bytes([digest[0], digest[1]]) & Self::MAX.0)
    }

    /// Returns the raw port address.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the universe following this one, if any.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        Self::new(self.0.checked_add(1)?).ok()
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Universe {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Universe> for u16 {
    fn from(universe: Universe) -> Self {
        universe.0
    }
}
