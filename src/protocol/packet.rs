// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded inbound packets.
//!
//! The transport owns the binary layout; what reaches the bus is an
//! operation code plus a map of named, already-decoded fields.

use std::collections::HashMap;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};

use super::OpCode;

/// Well-known field names used by the router.
pub mod field {
    /// Trigger key (`OpTrigger`).
    pub const KEY: &str = "key";
    /// Trigger sub-key, used as sequence number (`OpTrigger`).
    pub const SUB_KEY: &str = "sub_key";
    /// Payload bytes (`OpTrigger`, `OpDmx`).
    pub const DATA: &str = "data";
    /// Universe / port address (`OpDmx`).
    pub const UNIVERSE: &str = "universe";
    /// DMX sequence number (`OpDmx`).
    pub const SEQUENCE: &str = "sequence";
    /// Command text (`OpCommand`).
    pub const COMMAND: &str = "command";
    /// Node short name (`OpPollReply`).
    pub const SHORT_NAME: &str = "short_name";
    /// Node MAC address bytes (`OpPollReply`).
    pub const MAC: &str = "mac";
    /// Node IP address (`OpPollReply`).
    pub const IP: &str = "ip";
    /// Node status report (`OpPollReply`).
    pub const NODE_REPORT: &str = "node_report";
}

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Numeric field.
    Int(i64),
    /// Binary field.
    Bytes(Vec<u8>),
    /// Text field.
    Text(String),
}

/// The decoded fields of one packet.
///
/// # Examples
///
/// ```
/// use artbus_lib::protocol::{PacketFields, field};
///
/// let fields = PacketFields::new()
///     .with_int(field::KEY, 16)
///     .with_bytes(field::DATA, b"Door\0\x01".to_vec());
///
/// assert_eq!(fields.int(field::KEY), Some(16));
/// assert_eq!(fields.bytes(field::DATA), Some(&b"Door\0\x01"[..]));
/// assert_eq!(fields.text(field::COMMAND), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketFields(HashMap<String, Field>);

impl PacketFields {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field.
    pub fn insert(&mut self, name: impl Into<String>, value: Field) {
        self.0.insert(name.into(), value);
    }

    /// Adds a numeric field.
    #[must_use]
    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.insert(name, Field::Int(value));
        self
    }

    /// Adds a binary field.
    #[must_use]
    pub fn with_bytes(mut self, name: impl Into<String>, value: Vec<u8>) -> Self {
        self.insert(name, Field::Bytes(value));
        self
    }

    /// Adds a text field.
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Field::Text(value.into()));
        self
    }

    /// Returns a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.0.get(name)
    }

    /// Returns a numeric field.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.0.get(name)? {
            Field::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a binary field.
    #[must_use]
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.0.get(name)? {
            Field::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a text field.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            Field::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// A decoded packet as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    /// Operation code.
    pub op_code: OpCode,
    /// Address of the sending node.
    pub sender: SocketAddr,
    /// When the packet was received.
    pub timestamp: DateTime<Utc>,
    /// Decoded fields.
    pub fields: PacketFields,
}

impl InboundPacket {
    /// Creates a packet received now.
    #[must_use]
    pub fn new(op_code: impl Into<OpCode>, sender: SocketAddr, fields: PacketFields) -> Self {
        Self {
            op_code: op_code.into(),
            sender,
            timestamp: Utc::now(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getters_check_field_type() {
        let fields = PacketFields::new()
            .with_int(field::UNIVERSE, 3)
            .with_text(field::COMMAND, "Reset");

        assert_eq!(fields.int(field::UNIVERSE), Some(3));
        assert_eq!(fields.text(field::UNIVERSE), None);
        assert_eq!(fields.bytes(field::COMMAND), None);
        assert_eq!(fields.text(field::COMMAND), Some("Reset"));
    }

    #[test]
    fn insert_replaces() {
        let mut fields = PacketFields::new().with_int(field::KEY, 1);
        fields.insert(field::KEY, Field::Int(2));
        assert_eq!(fields.int(field::KEY), Some(2));
    }

    #[test]
    fn packet_from_raw_code() {
        let sender: SocketAddr = "10.0.0.2:6454".parse().unwrap();
        let packet = InboundPacket::new(0x9900u16, sender, PacketFields::new());
        assert_eq!(packet.op_code, OpCode::Trigger);
        assert_eq!(packet.sender, sender);
    }
}
