// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and node object model.
//!
//! A [`Device`] is one hub discovered through a [`Session`]; it owns its
//! [`Node`]s and keeps them current from the session's push updates. Local
//! writes go through the session first and are then merged into the cached
//! state.
//!
//! # Discovery
//!
//! ```ignore
//! use std::sync::Arc;
//! use smartbox_lib::model::get_devices;
//!
//! let devices = get_devices(Arc::new(session)).await?;
//! for device in &devices {
//!     println!("{} ({} nodes)", device.name(), device.get_nodes().len());
//! }
//! ```

mod device;
mod node;

use std::sync::Arc;

use chrono::TimeDelta;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::session::{DeviceInfo, Session};
use crate::types::Setup;

pub use device::Device;
pub use node::Node;

/// Trailing window of energy samples fetched for each node.
pub const SAMPLE_WINDOW: TimeDelta = TimeDelta::hours(3);

/// Lists every device visible to the session, initialised and running.
///
/// Each device record is tagged with the home it was listed under.
///
/// # Errors
///
/// Returns error if any session request fails.
pub async fn get_devices<S: Session>(session: Arc<S>) -> Result<Vec<Device<S>>> {
    let homes = session.get_homes().await?;
    tracing::debug!(count = homes.len(), "Fetched homes");

    let mut devices = Vec::new();
    for home in homes {
        let summary = home.summary();
        for mut info in home.devs {
            info.home = Some(summary.clone());
            devices.push(create_smartbox_device(info, Arc::clone(&session)).await?);
        }
    }
    Ok(devices)
}

/// Creates a device and initialises its nodes.
///
/// # Errors
///
/// Returns error if any session request fails.
pub async fn create_smartbox_device<S: Session>(
    info: DeviceInfo,
    session: Arc<S>,
) -> Result<Device<S>> {
    let device = Device::new(info, session);
    device.initialise_nodes().await?;
    Ok(device)
}

/// Returns `true` for heater nodes (`htr`, `acm`, `htr_mod`).
#[must_use]
pub fn is_heater_node<S: Session>(node: &Node<S>) -> bool {
    node.node_type().is_heater()
}

/// Returns `true` for nodes this library exposes.
#[must_use]
pub fn is_supported_node<S: Session>(node: &Node<S>) -> bool {
    is_heater_node(node)
}

/// Returns the factory options advertised in a setup document.
#[must_use]
pub fn factory_options(setup: &Setup) -> Option<&Map<String, Value>> {
    setup.get("factory_options").and_then(Value::as_object)
}

fn factory_flag(setup: &Setup, key: &str) -> bool {
    factory_options(setup)
        .and_then(|options| options.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Returns `true` if the node supports window mode.
#[must_use]
pub fn window_mode_available<S: Session>(node: &Node<S>) -> bool {
    factory_flag(&node.setup(), "window_mode_available")
}

/// Returns `true` if the node supports true radiant.
#[must_use]
pub fn true_radiant_available<S: Session>(node: &Node<S>) -> bool {
    factory_flag(&node.setup(), "true_radiant_available")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup(value: Value) -> Setup {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn sample_window_is_three_hours() {
        assert_eq!(SAMPLE_WINDOW.num_seconds(), 3 * 3600);
    }

    #[test]
    fn factory_options_present() {
        let s = setup(json!({"factory_options": {"window_mode_available": true}}));
        let options = factory_options(&s).unwrap();
        assert_eq!(options.get("window_mode_available"), Some(&json!(true)));
        assert!(factory_flag(&s, "window_mode_available"));
        assert!(!factory_flag(&s, "true_radiant_available"));
    }

    #[test]
    fn factory_options_absent() {
        let s = setup(json!({"window_mode_enabled": false}));
        assert!(factory_options(&s).is_none());
        assert!(!factory_flag(&s, "window_mode_available"));
    }
}
