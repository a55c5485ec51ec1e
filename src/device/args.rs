// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constructor arguments taken from manifest entries.

use serde_json::{Map, Value as JsonValue};

use crate::error::ConfigError;

/// Keyword arguments passed to a device constructor.
///
/// The registry has already removed every argument the device type does not
/// declare, so drivers only see what they asked for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceArgs(Map<String, JsonValue>);

impl DeviceArgs {
    /// Wraps a JSON object.
    #[must_use]
    pub fn new(args: Map<String, JsonValue>) -> Self {
        Self(args)
    }

    /// Returns `true` if the argument is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the argument names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keeps only the arguments for which `keep` returns `true`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    /// Returns a boolean argument.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if the argument is not a boolean.
    pub fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.typed(key, "a boolean", JsonValue::as_bool)
    }

    /// Returns an unsigned integer argument.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if the argument is not a
    /// non-negative integer.
    pub fn u64(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        self.typed(key, "a non-negative integer", JsonValue::as_u64)
    }

    /// Returns a string argument.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidArgument` if the argument is not a string.
    pub fn str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        self.typed(key, "a string", JsonValue::as_str)
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &str,
        convert: impl FnOnce(&'a JsonValue) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        match self.0.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => convert(value).map(Some).ok_or_else(|| ConfigError::InvalidArgument {
                argument: key.to_string(),
                message: format!("expected {expected}, got {value}"),
            }),
        }
    }
}

impl From<Map<String, JsonValue>> for DeviceArgs {
    fn from(args: Map<String, JsonValue>) -> Self {
        Self(args)
    }
}
