// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in sensor and fixture drivers.
//!
//! These cover the hardware found on most nodes. Installations with custom
//! hardware register their own types next to them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{ConfigError, DecodeError, Error, ValueError};
use crate::protocol::Transport;
use crate::types::{Universe, Value};

use super::{DeviceContext, Fixture, Sensor, SequenceTracker};

/// Number of channels in a full DMX universe.
const DMX_CHANNELS: u16 = 512;

/// A push button reporting `Pressed` / `Released`.
///
/// Payload: one byte, non-zero while the contact is closed.
#[derive(Debug)]
pub struct Button {
    name: String,
    invert: bool,
    sequence: SequenceTracker,
}

impl Button {
    /// Creates a button.
    #[must_use]
    pub fn new(name: impl Into<String>, invert: bool) -> Self {
        Self {
            name: name.into(),
            invert,
            sequence: SequenceTracker::new(),
        }
    }

    /// Builds a button from manifest arguments (`invert`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if `invert` is not a boolean.
    pub fn from_context(ctx: DeviceContext) -> Result<Self, ConfigError> {
        let invert = ctx.args.bool("invert")?.unwrap_or(false);
        Ok(Self::new(ctx.name, invert))
    }
}

impl Sensor for Button {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, payload: &[u8]) -> Result<(String, Value), DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let [state] = payload else {
            return Err(DecodeError::UnexpectedLength {
                expected: 1,
                actual: payload.len(),
            });
        };
        let pressed = (*state != 0) != self.invert;
        let action = if pressed { "Pressed" } else { "Released" };
        Ok((action.to_string(), Value::Bool(pressed)))
    }

    fn sequence(&self) -> &SequenceTracker {
        &self.sequence
    }
}

/// An RFID reader reporting `Scanned` with the tag id, or `Removed`.
///
/// Payload: the raw tag UID, empty when the tag leaves the field.
#[derive(Debug)]
pub struct RfidReader {
    name: String,
    sequence: SequenceTracker,
}

impl RfidReader {
    /// Creates a reader.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: SequenceTracker::new(),
        }
    }
}

impl Sensor for RfidReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, payload: &[u8]) -> Result<(String, Value), DecodeError> {
        if payload.is_empty() {
            return Ok(("Removed".to_string(), Value::Absent));
        }
        let uid: String = payload.iter().map(|b| format!("{b:02X}")).collect();
        Ok(("Scanned".to_string(), Value::Text(uid)))
    }

    fn sequence(&self) -> &SequenceTracker {
        &self.sequence
    }
}

/// A rotary dial reporting `Turned` with its signed position.
///
/// Payload: big-endian `i16`.
#[derive(Debug)]
pub struct Dial {
    name: String,
    sequence: SequenceTracker,
}

impl Dial {
    /// Creates a dial.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: SequenceTracker::new(),
        }
    }
}

impl Sensor for Dial {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, payload: &[u8]) -> Result<(String, Value), DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let bytes: [u8; 2] = payload
            .try_into()
            .map_err(|_| DecodeError::UnexpectedLength {
                expected: 2,
                actual: payload.len(),
            })?;
        Ok((
            "Turned".to_string(),
            Value::Int(i64::from(i16::from_be_bytes(bytes))),
        ))
    }

    fn sequence(&self) -> &SequenceTracker {
        &self.sequence
    }
}

/// A shift-register keypad reporting `Keys` with the pressed key indices.
///
/// Payload: a bitmask, bit `i` of byte `j` set when key `j * 8 + i` is down.
#[derive(Debug)]
pub struct Keypad {
    name: String,
    keys: usize,
    sequence: SequenceTracker,
}

impl Keypad {
    /// Creates a keypad with the given number of keys.
    #[must_use]
    pub fn new(name: impl Into<String>, keys: usize) -> Self {
        Self {
            name: name.into(),
            keys,
            sequence: SequenceTracker::new(),
        }
    }

    /// Builds a keypad from manifest arguments (`keys`, default 8).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if `keys` is not a positive integer.
    pub fn from_context(ctx: DeviceContext) -> Result<Self, ConfigError> {
        let keys = ctx.args.u64("keys")?.unwrap_or(8);
        let keys = usize::try_from(keys)
            .ok()
            .filter(|k| *k > 0)
            .ok_or_else(|| ConfigError::InvalidArgument {
                argument: "keys".to_string(),
                message: format!("expected a positive key count, got {keys}"),
            })?;
        Ok(Self::new(ctx.name, keys))
    }
}

impl Sensor for Keypad {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, payload: &[u8]) -> Result<(String, Value), DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        let expected = self.keys.div_ceil(8);
        if payload.len() != expected {
            return Err(DecodeError::UnexpectedLength {
                expected,
                actual: payload.len(),
            });
        }

        let is_set = |key: &usize| payload[key / 8] & (1 << (key % 8)) != 0;

        // Padding bits above the last key must stay clear
        if let Some(key) = (self.keys..expected * 8).find(is_set) {
            return Err(DecodeError::InvalidValue(format!(
                "key {key} reported but keypad has {} keys",
                self.keys
            )));
        }

        let pressed = (0..self.keys)
            .filter(is_set)
            .map(|key| Value::Int(i64::try_from(key).unwrap_or(i64::MAX)))
            .collect();

        Ok(("Keys".to_string(), Value::Tuple(pressed)))
    }

    fn sequence(&self) -> &SequenceTracker {
        &self.sequence
    }
}

/// Outbound DMX channel for one universe, with its rolling sequence number.
pub struct DmxOutput {
    universe: Universe,
    sequence: AtomicU8,
    transport: Arc<dyn Transport>,
}

impl DmxOutput {
    /// Creates an output bound to a universe.
    #[must_use]
    pub fn new(universe: Universe, transport: Arc<dyn Transport>) -> Self {
        Self {
            universe,
            sequence: AtomicU8::new(0),
            transport,
        }
    }

    /// Returns the universe.
    #[must_use]
    pub fn universe(&self) -> Universe {
        self.universe
    }

    /// Sends a frame, stamping it with the next sequence number (1-255).
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the transport fails.
    pub fn send(&self, data: &[u8]) -> Result<(), Error> {
        let sequence = self.next_sequence();
        self.transport.send_dmx(self.universe, sequence, data)?;
        Ok(())
    }

    fn next_sequence(&self) -> u8 {
        let previous = self
            .sequence
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                Some(if s == u8::MAX { 1 } else { s + 1 })
            })
            .unwrap_or_default();
        if previous == u8::MAX { 1 } else { previous + 1 }
    }
}

impl fmt::Debug for DmxOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmxOutput")
            .field("universe", &self.universe)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// A generic DMX fixture (LED strip, PWM lamp, seven-segment display...).
///
/// Frames longer than the configured channel count are rejected.
#[derive(Debug)]
pub struct DmxFixture {
    name: String,
    type_name: String,
    channels: u16,
    output: DmxOutput,
}

impl DmxFixture {
    /// Creates a fixture.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `channels` is not within 1-512.
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        channels: u16,
        output: DmxOutput,
    ) -> Result<Self, ValueError> {
        if channels == 0 || channels > DMX_CHANNELS {
            return Err(ValueError::OutOfRange {
                min: 1,
                max: i64::from(DMX_CHANNELS),
                actual: i64::from(channels),
            });
        }
        Ok(Self {
            name: name.into(),
            type_name: type_name.into(),
            channels,
            output,
        })
    }

    /// Builds a fixture from manifest arguments (`channels`, default 512).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the universe is unresolved or `channels` is invalid.
    pub fn from_context(type_name: &str, ctx: DeviceContext) -> Result<Self, ConfigError> {
        let universe = ctx.require_universe(type_name)?;
        let invalid_channels = |message: String| ConfigError::InvalidArgument {
            argument: "channels".to_string(),
            message,
        };

        let channels = ctx.args.u64("channels")?.unwrap_or(u64::from(DMX_CHANNELS));
        let channels = u16::try_from(channels).map_err(|e| invalid_channels(e.to_string()))?;

        Self::new(
            ctx.name,
            type_name,
            channels,
            DmxOutput::new(universe, ctx.transport),
        )
        .map_err(|e| invalid_channels(e.to_string()))
    }

    /// Returns the type name this fixture was registered under.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the channel count.
    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Fixture for DmxFixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn universe(&self) -> Universe {
        self.output.universe()
    }

    fn send_dmx(&self, data: &[u8]) -> Result<(), Error> {
        if data.len() > usize::from(self.channels) {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: i64::from(self.channels),
                actual: i64::try_from(data.len()).unwrap_or(i64::MAX),
            }
            .into());
        }
        self.output.send(data)
    }
}
