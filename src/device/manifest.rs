// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manifest: which devices live on which node.
//!
//! The manifest is plain `serde` data, so the host can load it from any
//! format. A JSON manifest looks like:
//!
//! ```json
//! {
//!   "nodes": [
//!     {
//!       "name": "Altar",
//!       "devices": [
//!         { "type": "Button", "args": { "name": "AltarButton" } },
//!         { "type": "LedStrip", "args": { "name": "AltarLeds", "channels": 180 } }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// The full device manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    /// Nodes and the devices they host, in declaration order.
    #[serde(default)]
    pub nodes: Vec<NodeManifest>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    #[must_use]
    pub fn with_node(mut self, node: NodeManifest) -> Self {
        self.nodes.push(node);
        self
    }

    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text is not a valid manifest.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// The devices declared for one node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeManifest {
    /// Node name.
    pub name: String,
    /// Devices hosted by the node, in declaration order.
    #[serde(default)]
    pub devices: Vec<ManifestEntry>,
}

impl NodeManifest {
    /// Creates a node without devices.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            devices: Vec::new(),
        }
    }

    /// Adds a device entry.
    #[must_use]
    pub fn with_device(mut self, entry: ManifestEntry) -> Self {
        self.devices.push(entry);
        self
    }
}

/// One device declaration: a type name plus constructor arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestEntry {
    /// Registered device type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Constructor arguments.
    #[serde(default)]
    pub args: Map<String, JsonValue>,
}

impl ManifestEntry {
    /// Creates an entry with no arguments.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            args: Map::new(),
        }
    }

    /// Adds a constructor argument.
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Returns the declared device name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.args.get("name").and_then(JsonValue::as_str)
    }
}
