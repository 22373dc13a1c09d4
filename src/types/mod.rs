// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the library.
//!
//! # Types
//!
//! - [`NodeType`] - Heater variant (`htr`, `acm`, `htr_mod`) or other node kind
//! - [`HvacMode`], [`HvacAction`], [`PresetMode`] - Host climate vocabulary
//! - [`TemperatureUnit`] - Unit reported by a node
//! - [`PowerLimit`] - Device power limit (0-9999 W)
//! - [`Status`], [`Setup`], [`StatusPatch`] - Vendor key-value documents

mod hvac;
mod node_type;
mod power_limit;
pub(crate) mod status;
mod temperature;

pub use hvac::{HvacAction, HvacMode, PresetMode};
pub use node_type::NodeType;
pub use power_limit::PowerLimit;
pub use status::{SYNC_STATUS, Setup, Status, StatusPatch, SyncStatus, value_as_bool, value_as_f64};
pub use temperature::{TemperatureUnit, format_temperature};
