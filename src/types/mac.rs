// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware address of a remote node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A 48-bit MAC address, the stable identity of a node on the network.
///
/// # Examples
///
/// ```
/// use artbus_lib::types::MacAddress;
///
/// let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
/// assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Creates a MAC address from its six octets.
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Creates a MAC address from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidMac` unless the slice is exactly six bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValueError> {
        let octets: [u8; 6] = bytes
            .try_into()
            .map_err(|_| ValueError::InvalidMac(format!("{} bytes", bytes.len())))?;
        Ok(Self(octets))
    }

    /// Returns the six octets.
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for MacAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split([':', '-']);

        for octet in &mut octets {
            let part = parts
                .next()
                .ok_or_else(|| ValueError::InvalidMac(s.to_string()))?;
            *octet =
                u8::from_str_radix(part, 16).map_err(|_| ValueError::InvalidMac(s.to_string()))?;
        }

        if parts.next().is_some() {
            return Err(ValueError::InvalidMac(s.to_string()));
        }

        Ok(Self(octets))
    }
}
