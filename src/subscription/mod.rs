// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for push updates.
//!
//! Smartbox hubs push away status, power limit, node status and node setup
//! changes over a socket owned by the session. Those changes are modelled as
//! [`Update`]s and delivered to the callbacks held in an
//! [`UpdateCallbacks`] registry.
//!
//! # Usage
//!
//! ```
//! use smartbox_lib::subscription::{Update, UpdateCallbacks};
//!
//! let callbacks = UpdateCallbacks::new();
//! let sub_id = callbacks.on_away_status(|away| {
//!     println!("away: {away}");
//! });
//!
//! callbacks.dispatch(&Update::AwayStatus(true));
//! assert!(callbacks.unsubscribe(sub_id));
//! ```

mod callback;
mod update;

pub use callback::{SubscriptionId, UpdateCallbacks};
pub use update::Update;
