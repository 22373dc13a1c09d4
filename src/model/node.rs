// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater nodes and their cached state.

use std::sync::{Arc, Weak};

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::climate;
use crate::error::{Error, Result};
use crate::session::{NodeInfo, Sample, Session};
use crate::types::status::require_bool;
use crate::types::{
    HvacAction, HvacMode, NodeType, PresetMode, Setup, Status, StatusPatch, SyncStatus,
    TemperatureUnit,
};

use super::SAMPLE_WINDOW;
use super::device::DeviceShared;

/// Cached documents of a node.
#[derive(Debug, Default)]
struct NodeData {
    status: Status,
    setup: Setup,
    /// The two most recent energy samples, oldest first.
    samples: Vec<Sample>,
}

/// Keeps at most the last two samples.
fn last_two(mut samples: Vec<Sample>) -> Vec<Sample> {
    let excess = samples.len().saturating_sub(2);
    samples.drain(..excess);
    samples
}

/// One heater (or other endpoint) under a device.
///
/// A `Node` is a cheap handle: clones share the same cached status, setup
/// and samples. Status and setup are replaced wholesale by push updates and
/// shallow-merged by local writes, so after a write the cache reflects the
/// requested values until the hub confirms or overrides them.
///
/// The node holds a weak reference to its device; device-level operations
/// fail with [`Error::DeviceGone`] once the device has been dropped.
pub struct Node<S: Session> {
    session: Arc<S>,
    device: Weak<DeviceShared>,
    dev_id: Arc<str>,
    info: NodeInfo,
    data: Arc<RwLock<NodeData>>,
}

impl<S: Session> Clone for Node<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            device: Weak::clone(&self.device),
            dev_id: Arc::clone(&self.dev_id),
            info: self.info.clone(),
            data: Arc::clone(&self.data),
        }
    }
}

impl<S: Session> std::fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("dev_id", &self.dev_id)
            .field("info", &self.info)
            .field("data", &*self.data.read())
            .finish_non_exhaustive()
    }
}

impl<S: Session> Node<S> {
    pub(crate) fn new(
        session: Arc<S>,
        device: Weak<DeviceShared>,
        dev_id: Arc<str>,
        info: NodeInfo,
        status: Status,
        setup: Setup,
        samples: Vec<Sample>,
    ) -> Self {
        Self {
            session,
            device,
            dev_id,
            info,
            data: Arc::new(RwLock::new(NodeData {
                status,
                setup,
                samples: last_two(samples),
            })),
        }
    }

    // ========== Identity ==========

    /// Returns the node descriptor.
    #[must_use]
    pub fn node_info(&self) -> &NodeInfo {
        &self.info
    }

    /// Returns `"{dev_id}_{addr}"`, unique across devices.
    #[must_use]
    pub fn node_id(&self) -> String {
        format!("{}_{}", self.dev_id, self.info.addr)
    }

    /// Returns the identifier of the owning device.
    #[must_use]
    pub fn dev_id(&self) -> &str {
        &self.dev_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Returns the node type.
    #[must_use]
    pub fn node_type(&self) -> &NodeType {
        &self.info.node_type
    }

    /// Returns the node address.
    #[must_use]
    pub fn addr(&self) -> u32 {
        self.info.addr
    }

    // ========== Status and setup ==========

    /// Returns a snapshot of the cached status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.data.read().status.clone()
    }

    /// Replaces the cached status.
    pub fn update_status(&self, status: Status) {
        tracing::debug!(node = %self.info.name, status = ?status, "Updating node status");
        self.data.write().status = status;
    }

    /// Returns a snapshot of the cached setup.
    #[must_use]
    pub fn setup(&self) -> Setup {
        self.data.read().setup.clone()
    }

    /// Replaces the cached setup.
    pub fn update_setup(&self, setup: Setup) {
        tracing::debug!(node = %self.info.name, setup = ?setup, "Updating node setup");
        self.data.write().setup = setup;
    }

    /// Returns `true` while the hub reports the node as in sync.
    #[must_use]
    pub fn is_available(&self) -> bool {
        SyncStatus::is_available(&self.data.read().status)
    }

    /// Writes a partial status to the node.
    ///
    /// The written fields are merged into the cached status, which is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns error if the session rejects the write; the cache is left
    /// untouched in that case.
    pub async fn set_status(&self, patch: StatusPatch) -> Result<Status> {
        self.session
            .set_node_status(&self.dev_id, &self.info, &patch)
            .await?;
        let mut data = self.data.write();
        data.status.extend(patch);
        Ok(data.status.clone())
    }

    async fn set_setup_flag(&self, key: &str, value: bool) -> Result<()> {
        let mut patch = Map::new();
        patch.insert(key.to_string(), Value::Bool(value));
        self.session
            .set_node_setup(&self.dev_id, &self.info, &patch)
            .await?;
        self.data.write().setup.extend(patch);
        Ok(())
    }

    /// Returns whether window mode is enabled.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the setup lacks `window_mode_enabled`.
    pub fn window_mode(&self) -> Result<bool> {
        require_bool("window_mode_enabled", &self.info.node_type, &self.data.read().setup)
    }

    /// Enables or disables window mode.
    ///
    /// # Errors
    ///
    /// Returns error if the session rejects the write.
    pub async fn set_window_mode(&self, window_mode: bool) -> Result<()> {
        self.set_setup_flag("window_mode_enabled", window_mode).await
    }

    /// Returns whether true radiant is enabled.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the setup lacks `true_radiant_enabled`.
    pub fn true_radiant(&self) -> Result<bool> {
        require_bool("true_radiant_enabled", &self.info.node_type, &self.data.read().setup)
    }

    /// Enables or disables true radiant.
    ///
    /// # Errors
    ///
    /// Returns error if the session rejects the write.
    pub async fn set_true_radiant(&self, true_radiant: bool) -> Result<()> {
        self.set_setup_flag("true_radiant_enabled", true_radiant).await
    }

    // ========== Device ==========

    fn device(&self) -> Result<Arc<DeviceShared>> {
        self.device
            .upgrade()
            .ok_or_else(|| Error::DeviceGone(self.dev_id.to_string()))
    }

    /// Returns the away status of the owning device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceGone` if the device has been dropped.
    pub fn away(&self) -> Result<bool> {
        Ok(self.device()?.away())
    }

    /// Sets the away status of the owning device.
    ///
    /// # Errors
    ///
    /// Returns error if the device has been dropped or the write fails.
    pub async fn update_device_away_status(&self, away: bool) -> Result<()> {
        let device = self.device()?;
        device.set_away_status(self.session.as_ref(), away).await
    }

    // ========== Heating and energy ==========

    /// Returns `true` if `status` shows the heater drawing power.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if `charging` (storage heaters) or `active`
    /// (others) is missing.
    pub fn is_heating(&self, status: &Status) -> Result<bool> {
        climate::is_heating(&self.info.node_type, status)
    }

    /// Fetches samples between two unix timestamps.
    ///
    /// # Errors
    ///
    /// Returns error if the session request fails.
    pub async fn get_samples(&self, start: i64, end: i64) -> Result<Vec<Sample>> {
        Ok(self
            .session
            .get_node_samples(&self.dev_id, &self.info, start, end)
            .await?)
    }

    /// Refetches the trailing sample window and keeps its last two samples.
    ///
    /// The cache is only replaced when at least two samples came back.
    ///
    /// # Errors
    ///
    /// Returns error if the session request fails.
    pub async fn update_samples(&self) -> Result<()> {
        let end = Utc::now().timestamp();
        let samples = self.get_samples(end - SAMPLE_WINDOW.num_seconds(), end).await?;
        if samples.len() >= 2 {
            let samples = last_two(samples);
            tracing::debug!(node = %self.info.name, samples = ?samples, "Updating node samples");
            self.data.write().samples = samples;
        }
        Ok(())
    }

    /// Returns the cached samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.data.read().samples.clone()
    }

    /// Returns the latest energy counter, in watt-hours.
    #[must_use]
    pub fn total_energy(&self) -> Option<f64> {
        self.data.read().samples.last().map(|s| s.counter)
    }

    /// Returns the energy used between the two cached samples, in
    /// watt-hours.
    #[must_use]
    pub fn energy_delta(&self) -> Option<f64> {
        match self.data.read().samples.as_slice() {
            [previous, latest] => Some(latest.counter - previous.counter),
            _ => None,
        }
    }

    // ========== Climate ==========

    /// Returns the HVAC mode of the cached status.
    ///
    /// # Errors
    ///
    /// See [`climate::get_hvac_mode`].
    pub fn hvac_mode(&self) -> Result<HvacMode> {
        climate::get_hvac_mode(&self.info.node_type, &self.data.read().status)
    }

    /// Returns what the heater is currently doing.
    ///
    /// # Errors
    ///
    /// See [`climate::hvac_action`].
    pub fn hvac_action(&self) -> Result<HvacAction> {
        climate::hvac_action(&self.info.node_type, &self.data.read().status)
    }

    /// Returns the target temperature of the cached status.
    ///
    /// # Errors
    ///
    /// See [`climate::get_target_temperature`].
    pub fn target_temperature(&self) -> Result<f64> {
        climate::get_target_temperature(&self.info.node_type, &self.data.read().status)
    }

    /// Returns the measured temperature.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if `mtemp` is missing.
    pub fn current_temperature(&self) -> Result<f64> {
        climate::current_temperature(&self.info.node_type, &self.data.read().status)
    }

    /// Returns the temperature unit of the cached status.
    ///
    /// # Errors
    ///
    /// See [`climate::get_temperature_unit`].
    pub fn temperature_unit(&self) -> Result<Option<TemperatureUnit>> {
        climate::get_temperature_unit(&self.data.read().status)
    }

    /// Returns the preset shown for this node.
    ///
    /// # Errors
    ///
    /// Returns error if the device is gone or the status maps to no preset.
    pub fn preset_mode(&self) -> Result<PresetMode> {
        let away = self.away()?;
        climate::get_preset_mode(&self.info.node_type, &self.data.read().status, away)
    }

    /// Returns the presets this node offers.
    #[must_use]
    pub fn preset_modes(&self) -> Vec<PresetMode> {
        climate::preset_modes(&self.info.node_type)
    }

    /// Switches the node to `hvac_mode`.
    ///
    /// # Errors
    ///
    /// See [`climate::set_hvac_mode_args`] and [`set_status`](Self::set_status).
    pub async fn set_hvac_mode(&self, hvac_mode: HvacMode) -> Result<Status> {
        let patch = climate::set_hvac_mode_args(&self.info.node_type, &self.status(), hvac_mode)?;
        self.set_status(patch).await
    }

    /// Sets the target temperature.
    ///
    /// # Errors
    ///
    /// See [`climate::set_temperature_args`] and [`set_status`](Self::set_status).
    pub async fn set_target_temperature(&self, temp: f64) -> Result<Status> {
        let patch = climate::set_temperature_args(&self.info.node_type, &self.status(), temp)?;
        self.set_status(patch).await
    }

    /// Applies a preset.
    ///
    /// Home and away toggle the device away status. Other presets clear the
    /// away status if set and write the node status patch for the preset.
    ///
    /// # Errors
    ///
    /// Returns error if the preset is not supported by this node type, the
    /// device is gone or a write fails.
    pub async fn apply_preset_mode(&self, preset_mode: PresetMode) -> Result<()> {
        match preset_mode {
            PresetMode::Home => self.update_device_away_status(false).await,
            PresetMode::Away => self.update_device_away_status(true).await,
            preset => {
                let patch = climate::set_preset_mode_status_update(
                    &self.info.node_type,
                    &self.status(),
                    preset,
                )?;
                if self.away()? {
                    self.update_device_away_status(false).await?;
                }
                self.set_status(patch).await.map(|_| ())
            }
        }
    }
}
