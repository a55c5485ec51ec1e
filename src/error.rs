// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ArtBus` library.
//!
//! Most failures on the bus are recoverable and never reach the caller:
//! configuration problems skip a single manifest entry, malformed packets are
//! dropped by the router and failing callbacks are logged. The types here are
//! what those paths produce internally, and what the few fallible public
//! operations return.

use thiserror::Error;

use crate::device::DeviceKind;
use crate::types::Universe;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A manifest entry or the bus configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The transport failed to send a frame.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A decoded packet is missing a field or carries a malformed one.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A device name did not resolve to the expected kind of device.
    #[error("addressing error: {0}")]
    Address(#[from] AddressError),

    /// The bus was started outside of a Tokio runtime.
    #[error("no tokio runtime available to spawn the bus tasks")]
    NoRuntime,
}

/// Errors in the device manifest or bus configuration.
///
/// These never abort a registry build; the offending entry is skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The manifest names a device type that is not registered.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    /// Two devices share the same name.
    #[error("duplicate device name: {0}")]
    DuplicateDevice(String),

    /// Two fixtures resolved to the same DMX universe.
    #[error("universe {universe} of {device} is already assigned to {existing}")]
    DuplicateUniverse {
        /// The contested universe.
        universe: Universe,
        /// The fixture that already owns it.
        existing: String,
        /// The fixture that was skipped.
        device: String,
    },

    /// A factory built a different kind of device than its type declares.
    #[error("{device_type} is declared as {expected:?} but built {device} as {actual:?}")]
    KindMismatch {
        /// The device type being constructed.
        device_type: String,
        /// The device that was skipped.
        device: String,
        /// Kind declared at registration.
        expected: DeviceKind,
        /// Kind the factory returned.
        actual: DeviceKind,
    },

    /// A required constructor argument is missing.
    #[error("{device_type} requires argument `{argument}`")]
    MissingArgument {
        /// The device type being constructed.
        device_type: String,
        /// The missing argument name.
        argument: String,
    },

    /// A constructor argument has the wrong type or an invalid value.
    #[error("invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// The argument name.
        argument: String,
        /// Description of the problem.
        message: String,
    },

    /// The bus configuration is inconsistent.
    #[error("invalid bus configuration: {0}")]
    InvalidSettings(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A MAC address could not be parsed.
    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

/// Errors reported by a [`Transport`](crate::protocol::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been shut down.
    #[error("transport closed")]
    Closed,

    /// The frame could not be sent for another reason.
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Errors extracting typed data from decoded packet fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Expected field is missing from the packet.
    #[error("missing field in packet: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },

    /// A field holds a value outside its valid range.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// Errors returned by a sensor when its raw payload cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload was empty but the sensor requires data.
    #[error("empty payload")]
    EmptyPayload,

    /// The payload length does not match what the sensor expects.
    #[error("expected {expected} payload bytes, got {actual}")]
    UnexpectedLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        actual: usize,
    },

    /// The payload contains an invalid value.
    #[error("invalid payload: {0}")]
    InvalidValue(String),
}

/// Errors addressing a device by name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// No device is registered under this name.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// The device exists but is a sensor, not a fixture.
    #[error("{0} is not a fixture")]
    NotAFixture(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 32767,
            actual: 40000,
        };
        assert_eq!(err.to_string(), "value 40000 is out of range [0, 32767]");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::UnknownDeviceType("Toaster".to_string()).into();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownDeviceType(ref name)) if name == "Toaster"
        ));
    }

    #[test]
    fn duplicate_universe_display() {
        let err = ConfigError::DuplicateUniverse {
            universe: Universe::new(7).unwrap(),
            existing: "Stage".to_string(),
            device: "Bar".to_string(),
        };
        assert_eq!(err.to_string(), "universe 7 of Bar is already assigned to Stage");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::MissingField("mac".to_string());
        assert_eq!(err.to_string(), "missing field in packet: mac");
    }

    #[test]
    fn address_error_display() {
        let err = AddressError::NotAFixture("DoorButton".to_string());
        assert_eq!(err.to_string(), "DoorButton is not a fixture");
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::UnexpectedLength {
            expected: 2,
            actual: 5,
        };
        assert_eq!(err.to_string(), "expected 2 payload bytes, got 5");
    }
}
