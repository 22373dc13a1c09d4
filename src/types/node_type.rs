// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node type classification.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of endpoint a node represents.
///
/// Smartbox hubs report a type string for each node. The three heater
/// variants get dedicated variants; anything else is kept verbatim so it can
/// be logged and ignored by climate logic.
///
/// # Examples
///
/// ```
/// use smartbox_lib::types::NodeType;
///
/// let ty: NodeType = "htr_mod".parse().unwrap();
/// assert_eq!(ty, NodeType::HtrMod);
/// assert!(ty.is_heater());
///
/// let other = NodeType::from("pmo");
/// assert!(!other.is_heater());
/// assert_eq!(other.as_str(), "pmo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Standard heater.
    Htr,
    /// Storage (accumulator) heater, heats by charging.
    Acm,
    /// Heater variant with comfort/eco/ice temperature tiers.
    HtrMod,
    /// Any other node type reported by the hub.
    Other(String),
}

impl NodeType {
    /// Node types handled by climate logic.
    pub const HEATERS: [NodeType; 3] = [NodeType::Htr, NodeType::Acm, NodeType::HtrMod];

    /// Returns the vendor string for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Htr => "htr",
            Self::Acm => "acm",
            Self::HtrMod => "htr_mod",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for the heater node types.
    #[must_use]
    pub fn is_heater(&self) -> bool {
        matches!(self, Self::Htr | Self::Acm | Self::HtrMod)
    }

    /// Returns `true` for the "mod" heater variant.
    #[must_use]
    pub fn is_mod(&self) -> bool {
        matches!(self, Self::HtrMod)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        match value {
            "htr" => Self::Htr,
            "acm" => Self::Acm,
            "htr_mod" => Self::HtrMod,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        match value {
            NodeType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for NodeType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}
