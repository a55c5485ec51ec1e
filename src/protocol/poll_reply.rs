// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node answers to discovery polls.

use std::net::{IpAddr, Ipv4Addr};

use crate::error::ParseError;
use crate::types::MacAddress;

use super::packet::{Field, InboundPacket, field};

/// The parts of a poll reply the health monitor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply {
    /// Short name of the node.
    pub short_name: String,
    /// Hardware address of the node.
    pub mac: MacAddress,
    /// IP address the node reports (falls back to the sender address).
    pub ip: IpAddr,
    /// Free-form status report.
    pub report: String,
}

impl PollReply {
    /// Creates a poll reply.
    #[must_use]
    pub fn new(short_name: impl Into<String>, mac: MacAddress, ip: IpAddr) -> Self {
        Self {
            short_name: short_name.into(),
            mac,
            ip,
            report: String::new(),
        }
    }

    /// Sets the status report text.
    #[must_use]
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = report.into();
        self
    }

    /// Extracts a poll reply from a decoded `OpPollReply` packet.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the short name or MAC address is missing or
    /// malformed.
    pub fn from_packet(packet: &InboundPacket) -> Result<Self, ParseError> {
        let fields = &packet.fields;

        let short_name = fields
            .text(field::SHORT_NAME)
            .ok_or_else(|| ParseError::MissingField(field::SHORT_NAME.to_string()))?
            .trim_end_matches('\0')
            .to_string();

        let mac = match fields.get(field::MAC) {
            Some(Field::Bytes(bytes)) => MacAddress::from_bytes(bytes)?,
            Some(Field::Text(text)) => text.parse()?,
            _ => return Err(ParseError::MissingField(field::MAC.to_string())),
        };

        let ip = match fields.get(field::IP) {
            Some(Field::Text(text)) => text.parse().map_err(|_| ParseError::InvalidValue {
                field: field::IP.to_string(),
                message: format!("not an IP address: {text}"),
            })?,
            Some(Field::Bytes(bytes)) if bytes.len() == 4 => {
                IpAddr::V4(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
            }
            _ => packet.sender.ip(),
        };

        let report = fields
            .text(field::NODE_REPORT)
            .unwrap_or_default()
            .trim_end_matches('\0')
            .to_string();

        Ok(Self {
            short_name,
            mac,
            ip,
            report,
        })
    }
}
