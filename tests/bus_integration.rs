// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end tests driving the bus through a scripted in-memory transport.

use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use artbus_lib::device::{ManifestEntry, NodeManifest};
use artbus_lib::error::TransportError;
use artbus_lib::protocol::{InboundPacket, OpCode, PacketFields, PacketHandler, Transport, field};
use artbus_lib::{
    BusConfig, BusEvent, Callback, Condition, DEFAULT_TRIGGER_KEY, DeviceBus, Error, Event,
    Manifest, NodeStatus, NodeTransition, SubscribeOptions, Universe, Value,
};
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};
use tokio::time::{sleep, timeout};

// ============================================================================
// Scripted transport
// ============================================================================

#[derive(Default)]
struct ScriptedTransport {
    handler: Mutex<Option<PacketHandler>>,
    poll_script: Mutex<VecDeque<Vec<InboundPacket>>>,
    polls: AtomicUsize,
    triggers: Mutex<Vec<(u8, u8, Vec<u8>)>>,
    frames: Mutex<Vec<(Universe, u8, Vec<u8>)>>,
    fail_dmx: AtomicBool,
}

impl ScriptedTransport {
    /// Queues the replies answered to the next poll.
    fn script_poll(&self, replies: Vec<InboundPacket>) {
        self.poll_script.lock().push_back(replies);
    }

    /// Delivers a packet as if it had been received.
    fn inject(&self, packet: InboundPacket) {
        let handler = self.handler.lock().clone();
        if let Some(handler) = handler {
            handler(packet);
        }
    }
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("polls", &self.polls.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Transport for ScriptedTransport {
    fn subscribe_all(&self, handler: PacketHandler) {
        *self.handler.lock() = Some(handler);
    }

    fn send_poll(&self) -> Result<(), TransportError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let replies = self.poll_script.lock().pop_front().unwrap_or_default();
        for reply in replies {
            self.inject(reply);
        }
        Ok(())
    }

    fn send_trigger(&self, key: u8, sub_key: u8, data: &[u8]) -> Result<(), TransportError> {
        self.triggers.lock().push((key, sub_key, data.to_vec()));
        Ok(())
    }

    fn send_dmx(&self, universe: Universe, sequence: u8, data: &[u8]) -> Result<(), TransportError> {
        if self.fail_dmx.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.frames.lock().push((universe, sequence, data.to_vec()));
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

const NODE_ADDR: &str = "10.0.0.7:6454";

fn node_addr() -> SocketAddr {
    NODE_ADDR.parse().unwrap()
}

fn manifest() -> Manifest {
    Manifest::new().with_node(
        NodeManifest::new("Hall")
            .with_device(ManifestEntry::new("Button").arg("name", "Door"))
            .with_device(ManifestEntry::new("RfidReader").arg("name", "Reader"))
            .with_device(
                ManifestEntry::new("LedStrip")
                    .arg("name", "Bar")
                    .arg("universe", 3)
                    .arg("channels", 4),
            ),
    )
}

fn start_with(config: BusConfig, manifest: Manifest) -> (DeviceBus, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    let bus = DeviceBus::builder(transport.clone())
        .with_config(config)
        .with_manifest(manifest)
        .start()
        .unwrap();
    (bus, transport)
}

fn start() -> (DeviceBus, Arc<ScriptedTransport>) {
    start_with(BusConfig::default(), manifest())
}

fn trigger_from(sender: SocketAddr, data: &[u8], sequence: i64) -> InboundPacket {
    InboundPacket::new(
        OpCode::Trigger,
        sender,
        PacketFields::new()
            .with_int(field::KEY, i64::from(DEFAULT_TRIGGER_KEY))
            .with_int(field::SUB_KEY, sequence)
            .with_bytes(field::DATA, data.to_vec()),
    )
}

fn trigger(data: &[u8], sequence: i64) -> InboundPacket {
    trigger_from(node_addr(), data, sequence)
}

fn poll_reply(name: &str, mac: &str) -> InboundPacket {
    InboundPacket::new(
        OpCode::PollReply,
        node_addr(),
        PacketFields::new()
            .with_text(field::SHORT_NAME, name)
            .with_text(field::MAC, mac)
            .with_text(field::IP, "10.0.0.7"),
    )
}

/// Callback forwarding every received event to a channel.
fn forwarding() -> (Callback, mpsc::UnboundedReceiver<Arc<Event>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback = Callback::new(move |event| {
        let tx = tx.clone();
        async move {
            tx.send(event)?;
            Ok(())
        }
    });
    (callback, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Arc<Event>>) -> Arc<Event> {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("callback not invoked in time")
        .expect("channel closed")
}

async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<Arc<Event>>) {
    sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err(), "unexpected callback invocation");
}

async fn wait_for(counter: &AtomicUsize, expected: usize) {
    timeout(Duration::from_secs(1), async {
        while counter.load(Ordering::SeqCst) < expected {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("counter not reached in time");
}

// ============================================================================
// Dispatch
// ============================================================================

mod dispatch {
    use super::*;

    #[tokio::test]
    async fn exact_subscription_receives_event() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Door").action("Opened"),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        assert!(bus.fire_event("Door", "Opened", true));

        let event = next(&mut rx).await;
        assert_eq!(event.source(), "Door");
        assert_eq!(event.value(), &Value::Bool(true));
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn wildcard_source_receives_every_source() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().action("Opened"),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        bus.fire_event("Door", "Opened", true);
        bus.fire_event("Window", "Opened", false);
        bus.fire_event("Window", "Closed", false);

        assert_eq!(next(&mut rx).await.source(), "Door");
        let second = next(&mut rx).await;
        assert_eq!(second.source(), "Window");
        assert_eq!(second.value(), &Value::Bool(false));
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn events_are_dispatched_in_fire_order() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Counter"),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        for i in 0..5 {
            bus.fire_event("Counter", "Tick", i);
        }

        let mut received = Vec::new();
        for _ in 0..5 {
            received.push(next(&mut rx).await.value().as_int().unwrap());
        }
        received.sort_unstable();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn busy_subscriber_drops_firings() {
        let (bus, _transport) = start();
        let release = Arc::new(Notify::new());
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let callback = {
            let release = Arc::clone(&release);
            let started = Arc::clone(&started);
            let finished = Arc::clone(&finished);
            Callback::without_event(move || {
                let release = Arc::clone(&release);
                let started = Arc::clone(&started);
                let finished = Arc::clone(&finished);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    release.notified().await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };
        bus.subscribe(Condition::any().source("Door"), callback, SubscribeOptions::new());

        bus.fire_event("Door", "Opened", true);
        bus.fire_event("Door", "Closed", false);
        wait_for(&started, 1).await;
        sleep(Duration::from_millis(50)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        release.notify_one();
        wait_for(&finished, 1).await;
        sleep(Duration::from_millis(20)).await;

        bus.fire_event("Door", "Opened", true);
        wait_for(&started, 2).await;
        release.notify_one();
        wait_for(&finished, 2).await;
    }

    #[tokio::test]
    async fn fire_once_subscriber_is_consumed() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        let id = bus.subscribe(
            Condition::any(),
            callback,
            SubscribeOptions::new().fire_once(),
        );

        bus.fire_event("Door", "Opened", true);
        bus.fire_event("Door", "Closed", false);

        assert_eq!(next(&mut rx).await.action(), "Opened");
        assert_silent(&mut rx).await;
        assert_eq!(bus.subscription_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[tokio::test]
    async fn failing_callback_does_not_affect_others() {
        let (bus, _transport) = start();
        let failures = Arc::new(AtomicUsize::new(0));
        let failing = {
            let failures = Arc::clone(&failures);
            Callback::blocking(move |_| {
                failures.fetch_add(1, Ordering::SeqCst);
                Err("sensor script crashed".into())
            })
        };
        bus.subscribe(
            Condition::any().source("Door"),
            failing,
            SubscribeOptions::new().allow_parallelism(),
        );
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Door"),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        bus.fire_event("Door", "Opened", true);
        bus.fire_event("Door", "Closed", false);

        next(&mut rx).await;
        next(&mut rx).await;
        wait_for(&failures, 2).await;
        assert_eq!(bus.subscription_count(), 2);
    }

    #[tokio::test]
    async fn failing_fire_once_subscriber_is_still_consumed() {
        let (bus, _transport) = start();
        let calls = Arc::new(AtomicUsize::new(0));
        let failing = {
            let calls = Arc::clone(&calls);
            Callback::new(move |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("door script failed".into())
                }
            })
        };
        bus.subscribe(
            Condition::any().source("Door"),
            failing,
            SubscribeOptions::new().fire_once(),
        );

        bus.fire_event("Door", "Opened", true);
        wait_for(&calls, 1).await;
        assert_eq!(bus.subscription_count(), 0);

        bus.fire_event("Door", "Opened", true);
        sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_callback_is_isolated() {
        let (bus, _transport) = start();
        bus.subscribe(
            Condition::any().source("Door"),
            Callback::blocking(|_| panic!("sensor script panicked")),
            SubscribeOptions::new().allow_parallelism(),
        );
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any(),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        bus.fire_event("Door", "Opened", true);
        bus.fire_event("Door", "Closed", false);
        assert_eq!(next(&mut rx).await.action(), "Opened");
        assert_eq!(next(&mut rx).await.action(), "Closed");

        sleep(Duration::from_millis(50)).await;
        bus.fire_event("Window", "Opened", true);
        assert_eq!(next(&mut rx).await.source(), "Window");
        assert_eq!(bus.subscription_count(), 2);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        let id = bus.subscribe(Condition::any(), callback, SubscribeOptions::new());

        assert!(bus.unsubscribe(id));
        bus.fire_event("Door", "Opened", true);
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn fired_events_reach_the_feed() {
        let (bus, _transport) = start();
        let mut feed = bus.subscribe_feed();

        bus.fire_event("Door", "Opened", true);

        let item = timeout(Duration::from_secs(1), feed.recv())
            .await
            .unwrap()
            .unwrap();
        match item {
            BusEvent::Fired(event) => assert_eq!(event.action(), "Opened"),
            BusEvent::Node(other) => panic!("unexpected transition {other}"),
        }
    }
}

// ============================================================================
// Inbound packets
// ============================================================================

mod packets {
    use super::*;

    #[tokio::test]
    async fn trigger_packet_becomes_event() {
        let (bus, transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Door").action("Pressed"),
            callback,
            SubscribeOptions::new(),
        );

        transport.inject(trigger(b"Door\0\x01", 1));

        let event = next(&mut rx).await;
        assert_eq!(event.value(), &Value::Bool(true));
        assert_eq!(event.sender(), Some(node_addr()));
    }

    #[tokio::test]
    async fn rfid_removal_matches_absent_value() {
        let (bus, transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Reader").value(()),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        transport.inject(trigger(b"Reader\0\x04\xA2", 1));
        transport.inject(trigger(b"Reader\0", 2));

        let event = next(&mut rx).await;
        assert_eq!(event.action(), "Removed");
        assert!(event.value().is_absent());
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn payload_without_nul_is_ignored() {
        let (bus, transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(Condition::any(), callback, SubscribeOptions::new());

        transport.inject(trigger(b"Door\x01", 1));
        assert_silent(&mut rx).await;

        bus.fire_event("Still", "Alive", true);
        assert_eq!(next(&mut rx).await.source(), "Still");
    }

    #[tokio::test]
    async fn retransmitted_trigger_is_ignored() {
        let (bus, transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(
            Condition::any().source("Door"),
            callback,
            SubscribeOptions::new().allow_parallelism(),
        );

        transport.inject(trigger(b"Door\0\x01", 9));
        transport.inject(trigger(b"Door\0\x01", 9));

        next(&mut rx).await;
        assert_silent(&mut rx).await;
    }

    #[tokio::test]
    async fn own_packets_are_suppressed() {
        let local: SocketAddr = "10.0.0.1:6454".parse().unwrap();
        let (bus, transport) = start_with(BusConfig::new().with_local_address(local), manifest());
        let (callback, mut rx) = forwarding();
        bus.subscribe(Condition::any(), callback, SubscribeOptions::new());

        let echo: SocketAddr = "10.0.0.1:50000".parse().unwrap();
        transport.inject(trigger_from(echo, b"Door\0\x01", 1));
        assert_silent(&mut rx).await;

        bus.fire_event("Script", "Ran", ());
        assert_eq!(next(&mut rx).await.sender(), Some(local));
    }
}

// ============================================================================
// Node health
// ============================================================================

mod nodes {
    use super::*;

    const MAC: &str = "AA:BB:CC:DD:EE:FF";

    #[tokio::test(start_paused = true)]
    async fn two_silent_cycles_leave_node_missing_two_replies() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.script_poll(vec![poll_reply("Altar", MAC)]);
        let bus = DeviceBus::builder(transport.clone()).start().unwrap();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(bus.node("Altar").unwrap().status, NodeStatus::New);

        sleep(Duration::from_secs(20)).await;
        let node = bus.node("Altar").unwrap();
        assert_eq!(node.status, NodeStatus::MissedReplies(2));
        assert_eq!(node.missed_replies, 2);
        assert_eq!(node.mac.to_string(), MAC);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(bus.node("Altar").unwrap().status, NodeStatus::LostConnection);
        assert_eq!(transport.polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_replies_create_one_node() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.script_poll(vec![poll_reply("Altar", MAC), poll_reply("Altar", MAC)]);
        transport.script_poll(vec![poll_reply("Altar", MAC)]);
        let bus = DeviceBus::builder(transport.clone()).start().unwrap();

        sleep(Duration::from_secs(15)).await;
        let nodes = bus.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].status, NodeStatus::Connected);
        assert_eq!(nodes[0].missed_replies, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reconnection_is_reported_on_the_feed() {
        let transport = Arc::new(ScriptedTransport::default());
        transport.script_poll(vec![poll_reply("Altar", MAC)]);
        transport.script_poll(vec![]);
        transport.script_poll(vec![poll_reply("Altar", MAC)]);
        let bus = DeviceBus::builder(transport.clone()).start().unwrap();
        let mut feed = bus.subscribe_feed();

        sleep(Duration::from_secs(25)).await;

        let mut transitions = Vec::new();
        while let Ok(item) = feed.try_recv() {
            if let BusEvent::Node(transition) = item {
                transitions.push(transition);
            }
        }
        assert!(matches!(transitions[0], NodeTransition::Discovered(_)));
        assert_eq!(
            transitions[1..],
            [
                NodeTransition::Missed {
                    name: "Altar".into(),
                    count: 1
                },
                NodeTransition::Reconnected {
                    name: "Altar".into(),
                    after_missed: 1
                },
            ]
        );
        assert_eq!(bus.node("Altar").unwrap().status, NodeStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_network_is_tolerated() {
        let transport = Arc::new(ScriptedTransport::default());
        let bus = DeviceBus::builder(transport.clone()).start().unwrap();

        sleep(Duration::from_secs(35)).await;
        assert!(bus.nodes().is_empty());
        assert_eq!(transport.polls.load(Ordering::SeqCst), 4);
    }
}

// ============================================================================
// Devices and outbound traffic
// ============================================================================

mod devices {
    use super::*;

    #[tokio::test]
    async fn send_dmx_reaches_fixture_universe() {
        let (bus, transport) = start();

        assert!(bus.send_dmx("Bar", &[1, 2]));
        assert!(bus.send_dmx("Bar", &[3, 4, 5, 6]));

        let frames = transport.frames.lock();
        assert_eq!(frames[0], (Universe::new(3).unwrap(), 1, vec![1, 2]));
        assert_eq!(frames[1].1, 2);
    }

    #[tokio::test]
    async fn send_dmx_errors_are_no_ops() {
        let (bus, transport) = start();

        assert!(!bus.send_dmx("Ghost", &[1]));
        assert!(!bus.send_dmx("Door", &[1]));
        assert!(!bus.send_dmx("Bar", &[0; 5]));

        transport.fail_dmx.store(true, Ordering::SeqCst);
        assert!(!bus.send_dmx("Bar", &[1]));

        assert!(transport.frames.lock().is_empty());
    }

    #[tokio::test]
    async fn send_trigger_goes_to_transport() {
        let (bus, transport) = start();
        bus.send_trigger(DEFAULT_TRIGGER_KEY, 3, b"Door\0\x01").unwrap();

        assert_eq!(
            transport.triggers.lock()[0],
            (DEFAULT_TRIGGER_KEY, 3, b"Door\0\x01".to_vec())
        );
    }

    #[tokio::test]
    async fn get_device_and_skipped_entries() {
        let manifest = manifest().with_node(
            NodeManifest::new("Cellar")
                .with_device(ManifestEntry::new("Toaster").arg("name", "Breakfast")),
        );
        let (bus, _transport) = start_with(BusConfig::default(), manifest);

        assert_eq!(bus.get_device("Door").unwrap().name(), "Door");
        assert!(bus.get_device("Bar").unwrap().as_fixture().is_some());
        assert!(bus.get_device("Breakfast").is_none());
        assert_eq!(bus.skipped_entries().len(), 1);
        assert_eq!(bus.devices().node_of("Bar"), Some("Hall"));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn start_requires_runtime() {
        let transport = Arc::new(ScriptedTransport::default());
        let result = DeviceBus::builder(transport).start();
        assert!(matches!(result, Err(Error::NoRuntime)));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let transport = Arc::new(ScriptedTransport::default());
        let result = DeviceBus::builder(transport)
            .with_config(BusConfig::new().with_lost_threshold(0))
            .start();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn shutdown_stops_delivery() {
        let (bus, _transport) = start();
        let (callback, mut rx) = forwarding();
        bus.subscribe(Condition::any(), callback, SubscribeOptions::new());

        bus.shutdown();
        assert_eq!(bus.subscription_count(), 0);

        timeout(Duration::from_secs(1), async {
            while bus.fire_event("Door", "Opened", true) {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("dispatcher did not stop");
        assert_silent(&mut rx).await;
    }

    /// Sets its flag when dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn shutdown_releases_handles_captured_by_callbacks() {
        let (bus, _transport) = start();
        let released = Arc::new(AtomicBool::new(false));

        let captured = bus.clone();
        let guard = DropFlag(Arc::clone(&released));
        bus.subscribe(
            Condition::any().source("Door"),
            Callback::without_event(move || {
                let _keep = &guard;
                let bus = captured.clone();
                async move {
                    bus.send_dmx("Bar", &[255]);
                    Ok(())
                }
            }),
            SubscribeOptions::new(),
        );
        assert!(!released.load(Ordering::SeqCst));

        bus.shutdown();
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropping_the_bus_releases_the_transport() {
        let (bus, transport) = start();
        let (callback, _rx) = forwarding();
        bus.subscribe(Condition::any(), callback, SubscribeOptions::new());

        drop(bus);
        timeout(Duration::from_secs(1), async {
            while Arc::strong_count(&transport) > 1 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("transport still referenced");

        // The registered handler outlives the bus and must ignore traffic
        transport.inject(trigger(b"Door\0\x01", 1));
        transport.inject(poll_reply("Altar", "AA:BB:CC:DD:EE:FF"));
    }

    #[tokio::test]
    async fn inbound_packets_are_ignored_after_shutdown() {
        let (bus, transport) = start();
        let mut feed = bus.subscribe_feed();

        bus.shutdown();
        transport.inject(trigger(b"Door\0\x01", 1));

        sleep(Duration::from_millis(20)).await;
        assert!(feed.try_recv().is_err());
    }
}
