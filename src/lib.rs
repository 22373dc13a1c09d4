// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smartbox Lib - A Rust library to integrate Smartbox electric heaters.
//!
//! Smartbox hubs expose heater nodes through a vendor cloud. This library
//! turns the vendor's status documents into a climate vocabulary (HVAC mode,
//! preset, target temperature), keeps a live object model of devices and
//! nodes from push updates, and derives sensor readings.
//!
//! Talking to the cloud is left to a [`Session`] implementation; the
//! library depends only on that trait.
//!
//! # Supported Features
//!
//! - **Climate**: HVAC mode, presets, target temperature for `htr`, `acm`
//!   and `htr_mod` heaters
//! - **Live state**: push updates for away status, power limit, node status
//!   and node setup
//! - **Sensors**: temperature, power, duty cycle, energy, charge level
//! - **Settings**: away status, power limit, window mode, true radiant
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use smartbox_lib::{HvacMode, get_devices};
//!
//! #[tokio::main]
//! async fn main() -> smartbox_lib::Result<()> {
//!     let session = Arc::new(MySession::connect().await?);
//!
//!     for device in get_devices(session).await? {
//!         for node in device.get_nodes() {
//!             println!("{}: {}", node.name(), node.hvac_mode()?);
//!             node.set_hvac_mode(HvacMode::Auto).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Pure Translation
//!
//! The [`climate`] functions work on plain status maps:
//!
//! ```
//! use serde_json::json;
//! use smartbox_lib::{HvacMode, NodeType, climate};
//!
//! let status = json!({"mode": "manual", "stemp": "21.5", "units": "C"});
//! let status = status.as_object().unwrap();
//!
//! assert_eq!(climate::get_hvac_mode(&NodeType::Htr, status).unwrap(), HvacMode::Heat);
//! assert_eq!(climate::get_target_temperature(&NodeType::Htr, status).unwrap(), 21.5);
//! ```

pub mod climate;
pub mod config;
pub mod error;
pub mod model;
pub mod router;
pub mod sensor;
pub mod session;
pub mod subscription;
pub mod types;

pub use config::{SessionOptions, SmartboxConfig};
pub use error::{Error, LookupError, Result, SessionError, ValueError};
pub use model::{Device, Node, create_smartbox_device, get_devices};
pub use router::{ChannelUpdateManager, SocketMessage, UpdateSender};
pub use sensor::{SensorKind, SensorTracker};
pub use session::{DeviceInfo, Home, HomeSummary, NodeInfo, Sample, Session, UpdateManager};
pub use subscription::{SubscriptionId, Update, UpdateCallbacks};
pub use types::{
    HvacAction, HvacMode, NodeType, PowerLimit, PresetMode, Setup, Status, StatusPatch,
    SyncStatus, TemperatureUnit,
};
