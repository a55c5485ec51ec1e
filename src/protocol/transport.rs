// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary to the UDP broadcast transport.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::TransportError;
use crate::types::Universe;

use super::InboundPacket;

/// Callback receiving every decoded inbound packet.
pub type PacketHandler = Arc<dyn Fn(InboundPacket) + Send + Sync>;

/// The wire transport the bus runs on.
///
/// Implementations own the socket and the binary packet layout. All send
/// methods are fire-and-forget and may be called concurrently from the
/// dispatcher, subscriber callbacks and the health monitor, so
/// implementations must serialize access internally.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Registers the handler that receives every inbound packet.
    ///
    /// The bus calls this once at startup.
    fn subscribe_all(&self, handler: PacketHandler);

    /// Broadcasts a discovery poll.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the frame could not be sent.
    fn send_poll(&self) -> Result<(), TransportError>;

    /// Sends a trigger frame.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the frame could not be sent.
    fn send_trigger(&self, key: u8, sub_key: u8, data: &[u8]) -> Result<(), TransportError>;

    /// Sends a DMX frame for one universe.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the frame could not be sent.
    fn send_dmx(&self, universe: Universe, sequence: u8, data: &[u8])
    -> Result<(), TransportError>;

    /// Returns the address this process sends from, if known.
    ///
    /// Used for loopback suppression and as the default sender of events
    /// fired locally.
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}
