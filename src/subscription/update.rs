// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push updates delivered for a device.

use crate::types::{NodeType, Setup, Status};

/// One push update for a device.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The device away status changed.
    AwayStatus(bool),
    /// The device power limit changed (watts).
    PowerLimit(i64),
    /// A node published a new status.
    NodeStatus {
        /// Node type.
        node_type: NodeType,
        /// Node address.
        addr: u32,
        /// Full status document.
        status: Status,
    },
    /// A node published a new setup.
    NodeSetup {
        /// Node type.
        node_type: NodeType,
        /// Node address.
        addr: u32,
        /// Full setup document.
        setup: Setup,
    },
}

impl Update {
    /// Returns a short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AwayStatus(_) => "away_status",
            Self::PowerLimit(_) => "power_limit",
            Self::NodeStatus { .. } => "node_status",
            Self::NodeSetup { .. } => "node_setup",
        }
    }
}
