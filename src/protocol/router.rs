// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification of inbound packets.
//!
//! ```text
//! Transport ── InboundPacket ──► PacketRouter.route()
//!                                   │
//!          ┌────────────────────────┼───────────────────────┐
//!          ▼                        ▼                       ▼
//!      OpTrigger               OpPollReply          OpDmx / OpCommand
//!   sensor.decode()        health monitor buffer      logged only
//!          │
//!          ▼
//!     EventSink.fire() ──► dispatcher queue
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::device::DeviceRegistry;
use crate::event::Event;
use crate::subscription::EventSink;
use crate::types::Universe;

use super::{InboundPacket, OpCode, PollReply, field};

/// Routes decoded packets to the device registry, the health monitor or the
/// log, depending on their operation code.
///
/// Every malformed or unexpected packet is dropped; nothing here is fatal.
#[derive(Debug, Clone)]
pub(crate) struct PacketRouter {
    devices: Arc<DeviceRegistry>,
    sink: EventSink,
    replies: mpsc::UnboundedSender<PollReply>,
    trigger_key: u8,
    local_ip: Option<IpAddr>,
}

impl PacketRouter {
    pub(crate) fn new(
        devices: Arc<DeviceRegistry>,
        sink: EventSink,
        replies: mpsc::UnboundedSender<PollReply>,
        trigger_key: u8,
        local_ip: Option<IpAddr>,
    ) -> Self {
        Self {
            devices,
            sink,
            replies,
            trigger_key,
            local_ip,
        }
    }

    /// Routes one packet.
    ///
    /// Returns `true` if the packet fired an event or fed the health monitor.
    pub(crate) fn route(&self, packet: InboundPacket) -> bool {
        if self.local_ip == Some(packet.sender.ip()) {
            tracing::trace!(sender = %packet.sender, op = %packet.op_code, "Ignoring own packet");
            return false;
        }

        match packet.op_code {
            OpCode::Trigger => self.route_trigger(packet),
            OpCode::PollReply => self.route_poll_reply(&packet),
            OpCode::Dmx => {
                self.log_dmx(&packet);
                false
            }
            OpCode::Command => {
                tracing::debug!(
                    sender = %packet.sender,
                    command = packet.fields.text(field::COMMAND).unwrap_or_default(),
                    "Command packet"
                );
                false
            }
            OpCode::Poll => false,
            OpCode::Unknown(_) => {
                tracing::debug!(sender = %packet.sender, op = %packet.op_code, "Unknown op-code");
                false
            }
        }
    }

    fn route_trigger(&self, packet: InboundPacket) -> bool {
        let sender = packet.sender;
        let fields = &packet.fields;

        if fields.int(field::KEY) != Some(i64::from(self.trigger_key)) {
            tracing::trace!(sender = %sender, key = ?fields.int(field::KEY), "Trigger with foreign key");
            return false;
        }

        let Some(data) = fields.bytes(field::DATA) else {
            tracing::trace!(sender = %sender, "Trigger without payload");
            return false;
        };

        let Some((name, payload)) = split_payload(data) else {
            tracing::trace!(sender = %sender, "Trigger payload without sensor name");
            return false;
        };

        let Some(sensor) = self.devices.sensor(name) else {
            tracing::debug!(sender = %sender, device = %name, "Trigger for unknown sensor");
            return false;
        };

        let Ok(sequence) = u8::try_from(fields.int(field::SUB_KEY).unwrap_or(0)) else {
            tracing::trace!(sender = %sender, device = %name, "Trigger with invalid sequence");
            return false;
        };

        if !sensor.sequence().accept(sequence) {
            tracing::trace!(device = %name, sequence, "Dropping retransmitted trigger");
            return false;
        }

        let (action, value) = match sensor.decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(device = %name, error = %e, "Undecodable trigger payload");
                return false;
            }
        };

        let event = Event::new(name, action, value)
            .with_sender(Some(sender))
            .with_timestamp(packet.timestamp);
        self.sink.fire(event)
    }

    fn route_poll_reply(&self, packet: &InboundPacket) -> bool {
        match PollReply::from_packet(packet) {
            Ok(reply) => {
                if self.replies.send(reply).is_err() {
                    tracing::trace!(sender = %packet.sender, "Health monitor stopped, dropping poll reply");
                    return false;
                }
                true
            }
            Err(e) => {
                tracing::debug!(sender = %packet.sender, error = %e, "Malformed poll reply");
                false
            }
        }
    }

    fn log_dmx(&self, packet: &InboundPacket) {
        let universe = packet
            .fields
            .int(field::UNIVERSE)
            .and_then(|u| u16::try_from(u).ok())
            .and_then(|u| Universe::new(u).ok());
        let fixture = universe
            .and_then(|u| self.devices.fixture_by_universe(u))
            .map(|f| f.name().to_string());

        tracing::trace!(
            sender = %packet.sender,
            universe = ?universe,
            fixture = ?fixture,
            "DMX frame"
        );
    }
}

/// Splits a trigger payload at the first NUL into sensor name and data.
fn split_payload(data: &[u8]) -> Option<(&str, &[u8])> {
    let nul = data.iter().position(|b| *b == 0)?;
    let name = std::str::from_utf8(&data[..nul]).ok()?;
    if name.is_empty() {
        return None;
    }
    Some((name, &data[nul + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_TRIGGER_KEY, UniverseAssignment};
    use crate::device::{DeviceTypeRegistry, Manifest, ManifestEntry, NodeManifest};
    use crate::event::EventFeed;
    use crate::protocol::testing::RecordingTransport;
    use crate::protocol::{PacketFields, Transport};
    use crate::types::{MacAddress, Value};
    use std::net::SocketAddr;

    struct Harness {
        router: PacketRouter,
        events: mpsc::UnboundedReceiver<Arc<Event>>,
        replies: mpsc::UnboundedReceiver<PollReply>,
    }

    fn harness(local_ip: Option<IpAddr>) -> Harness {
        let transport: Arc<dyn Transport> = Arc::new(RecordingTransport::default());
        let manifest = Manifest::new().with_node(
            NodeManifest::new("Hall")
                .with_device(ManifestEntry::new("Button").arg("name", "Door"))
                .with_device(ManifestEntry::new("LedStrip").arg("name", "Bar").arg("universe", 3)),
        );
        let mut devices = DeviceRegistry::new();
        devices.instantiate(
            &manifest,
            &DeviceTypeRegistry::with_builtin(),
            &transport,
            UniverseAssignment::Hashed,
        );

        let (event_tx, events) = mpsc::unbounded_channel();
        let (reply_tx, replies) = mpsc::unbounded_channel();
        let sink = EventSink::new(event_tx, EventFeed::new(), None);

        Harness {
            router: PacketRouter::new(
                Arc::new(devices),
                sink,
                reply_tx,
                DEFAULT_TRIGGER_KEY,
                local_ip,
            ),
            events,
            replies,
        }
    }

    fn sender() -> SocketAddr {
        "10.0.0.7:6454".parse().unwrap()
    }

    fn trigger(data: &[u8], sequence: i64) -> InboundPacket {
        InboundPacket::new(
            OpCode::Trigger,
            sender(),
            PacketFields::new()
                .with_int(field::KEY, i64::from(DEFAULT_TRIGGER_KEY))
                .with_int(field::SUB_KEY, sequence)
                .with_bytes(field::DATA, data.to_vec()),
        )
    }

    #[test]
    fn trigger_fires_decoded_event() {
        let mut h = harness(None);
        let packet = trigger(b"Door\0\x01", 1);
        let timestamp = packet.timestamp;

        assert!(h.router.route(packet));

        let event = h.events.try_recv().unwrap();
        assert_eq!(event.source(), "Door");
        assert_eq!(event.action(), "Pressed");
        assert_eq!(event.value(), &Value::Bool(true));
        assert_eq!(event.sender(), Some(sender()));
        assert_eq!(event.timestamp(), timestamp);
    }

    #[test]
    fn payload_without_nul_is_dropped() {
        let mut h = harness(None);
        assert!(!h.router.route(trigger(b"Door\x01", 1)));
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn wrong_key_unknown_sensor_and_fixture_are_dropped() {
        let mut h = harness(None);

        let mut wrong_key = trigger(b"Door\0\x01", 1);
        wrong_key.fields.insert(field::KEY, crate::protocol::Field::Int(0x42));
        assert!(!h.router.route(wrong_key));
        assert!(!h.router.route(trigger(b"Ghost\0\x01", 1)));
        assert!(!h.router.route(trigger(b"Bar\0\x01", 1)));
        assert!(!h.router.route(trigger(b"\0\x01", 1)));

        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn retransmission_is_dropped() {
        let mut h = harness(None);
        assert!(h.router.route(trigger(b"Door\0\x01", 5)));
        assert!(!h.router.route(trigger(b"Door\0\x01", 5)));
        assert!(h.router.route(trigger(b"Door\0\x00", 6)));

        assert_eq!(h.events.try_recv().unwrap().action(), "Pressed");
        assert_eq!(h.events.try_recv().unwrap().action(), "Released");
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn undecodable_payload_is_dropped() {
        let mut h = harness(None);
        assert!(!h.router.route(trigger(b"Door\0\x01\x02", 1)));
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn loopback_is_suppressed() {
        let mut h = harness(Some(sender().ip()));
        assert!(!h.router.route(trigger(b"Door\0\x01", 1)));
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn poll_reply_feeds_monitor() {
        let mut h = harness(None);
        let packet = InboundPacket::new(
            OpCode::PollReply,
            sender(),
            PacketFields::new()
                .with_text(field::SHORT_NAME, "Altar")
                .with_text(field::MAC, "AA:BB:CC:DD:EE:FF"),
        );

        assert!(h.router.route(packet));
        let reply = h.replies.try_recv().unwrap();
        assert_eq!(reply.short_name, "Altar");
        assert_eq!(reply.mac, MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn dmx_command_and_unknown_fire_nothing() {
        let mut h = harness(None);
        let dmx = InboundPacket::new(
            OpCode::Dmx,
            sender(),
            PacketFields::new().with_int(field::UNIVERSE, 3),
        );
        let command = InboundPacket::new(
            OpCode::Command,
            sender(),
            PacketFields::new().with_text(field::COMMAND, "Reset"),
        );
        let unknown = InboundPacket::new(0xF000u16, sender(), PacketFields::new());

        assert!(!h.router.route(dmx));
        assert!(!h.router.route(command));
        assert!(!h.router.route(unknown));
        assert!(h.events.try_recv().is_err());
        assert!(h.replies.try_recv().is_err());
    }

    #[test]
    fn split_payload_at_first_nul() {
        assert_eq!(split_payload(b"A\0b\0c"), Some(("A", &b"b\0c"[..])));
        assert_eq!(split_payload(b"A\0"), Some(("A", &b""[..])));
        assert_eq!(split_payload(b"A"), None);
    }
}
