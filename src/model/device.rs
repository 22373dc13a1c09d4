// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smartbox hubs and their push update task.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::session::{DeviceInfo, HomeSummary, Session, UpdateManager};
use crate::types::{NodeType, PowerLimit};

use super::SAMPLE_WINDOW;
use super::node::Node;

/// Mutable device-level state.
#[derive(Debug, Default, Clone, Copy)]
struct DeviceState {
    away: bool,
    power_limit: i64,
}

/// Device data shared with nodes and push handlers.
#[derive(Debug)]
pub(crate) struct DeviceShared {
    dev_id: Arc<str>,
    info: DeviceInfo,
    state: RwLock<DeviceState>,
}

impl DeviceShared {
    pub(crate) fn away(&self) -> bool {
        self.state.read().away
    }

    fn power_limit(&self) -> i64 {
        self.state.read().power_limit
    }

    fn update_away_status(&self, away: bool) {
        tracing::debug!(dev_id = %self.dev_id, away, "Away status update");
        self.state.write().away = away;
    }

    fn update_power_limit(&self, power_limit: i64) {
        tracing::debug!(dev_id = %self.dev_id, power_limit, "Power limit update");
        self.state.write().power_limit = power_limit;
    }

    pub(crate) async fn set_away_status<S: Session>(&self, session: &S, away: bool) -> Result<()> {
        session.set_device_away_status(&self.dev_id, away).await?;
        self.state.write().away = away;
        Ok(())
    }
}

type NodeList<S> = Arc<RwLock<Vec<Node<S>>>>;

fn find_node<S: Session>(nodes: &NodeList<S>, node_type: &NodeType, addr: u32) -> Option<Node<S>> {
    nodes
        .read()
        .iter()
        .find(|node| node.node_type() == node_type && node.addr() == addr)
        .cloned()
}

/// A Smartbox hub and its nodes.
///
/// Created through [`create_smartbox_device`](super::create_smartbox_device)
/// or [`get_devices`](super::get_devices). After
/// [`initialise_nodes`](Self::initialise_nodes) the device owns one background
/// task that applies push updates to its nodes. The task is aborted when the
/// device is dropped; [`shutdown`](Self::shutdown) also waits for it to end.
///
/// # Examples
///
/// ```ignore
/// let device = create_smartbox_device(info, session).await?;
/// for node in device.get_nodes() {
///     println!("{}: {:?}", node.name(), node.hvac_mode());
/// }
/// device.set_away_status(true).await?;
/// device.shutdown().await;
/// ```
pub struct Device<S: Session> {
    session: Arc<S>,
    shared: Arc<DeviceShared>,
    nodes: NodeList<S>,
    update_task: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Session> std::fmt::Debug for Device<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("info", &self.shared.info)
            .field("state", &*self.shared.state.read())
            .field("nodes", &self.nodes.read().len())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl<S: Session> Device<S> {
    /// Creates a device with no nodes.
    #[must_use]
    pub fn new(info: DeviceInfo, session: Arc<S>) -> Self {
        let shared = DeviceShared {
            dev_id: Arc::from(info.dev_id.as_str()),
            info,
            state: RwLock::new(DeviceState::default()),
        };
        Self {
            session,
            shared: Arc::new(shared),
            nodes: Arc::new(RwLock::new(Vec::new())),
            update_task: Mutex::new(None),
        }
    }

    /// Loads the nodes and starts the push update task.
    ///
    /// Fetches each node's status, setup and trailing energy samples, then
    /// subscribes to away status, power limit, node status and node setup
    /// updates and spawns the update loop. Calling this again replaces the
    /// nodes and restarts the task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if any session request fails.
    pub async fn initialise_nodes(&self) -> Result<()> {
        let dev_id = Arc::clone(&self.shared.dev_id);
        let session = self.session.as_ref();

        let end = Utc::now().timestamp();
        let start = end - SAMPLE_WINDOW.num_seconds();

        let mut nodes: Vec<Node<S>> = Vec::new();
        for info in session.get_nodes(&dev_id).await? {
            if nodes
                .iter()
                .any(|node| node.node_type() == &info.node_type && node.addr() == info.addr)
            {
                tracing::warn!(
                    dev_id = %dev_id,
                    node_type = %info.node_type,
                    addr = info.addr,
                    "Ignoring duplicate node"
                );
                continue;
            }
            let status = session.get_node_status(&dev_id, &info).await?;
            let setup = session.get_node_setup(&dev_id, &info).await?;
            let samples = session.get_node_samples(&dev_id, &info, start, end).await?;
            nodes.push(Node::new(
                Arc::clone(&self.session),
                Arc::downgrade(&self.shared),
                Arc::clone(&dev_id),
                info,
                status,
                setup,
                samples,
            ));
        }
        tracing::debug!(dev_id = %dev_id, count = nodes.len(), "Initialised nodes");
        *self.nodes.write() = nodes;

        let manager = session.update_manager(&dev_id);

        // Weak: a dropped device must be unreachable even before its
        // aborted task is reaped.
        let shared = Arc::downgrade(&self.shared);
        manager.subscribe_to_device_away_status(move |away| {
            if let Some(shared) = shared.upgrade() {
                shared.update_away_status(away);
            }
        });

        let shared = Arc::downgrade(&self.shared);
        manager.subscribe_to_device_power_limit(move |limit| {
            if let Some(shared) = shared.upgrade() {
                shared.update_power_limit(limit);
            }
        });

        let nodes = Arc::clone(&self.nodes);
        let id = Arc::clone(&dev_id);
        manager.subscribe_to_node_status(move |node_type, addr, status| {
            match find_node(&nodes, node_type, addr) {
                Some(node) => node.update_status(status.clone()),
                None => tracing::error!(
                    dev_id = %id,
                    node_type = %node_type,
                    addr,
                    "Received status update for unknown node"
                ),
            }
        });

        let nodes = Arc::clone(&self.nodes);
        let id = Arc::clone(&dev_id);
        manager.subscribe_to_node_setup(move |node_type, addr, setup| {
            match find_node(&nodes, node_type, addr) {
                Some(node) => node.update_setup(setup.clone()),
                None => tracing::error!(
                    dev_id = %id,
                    node_type = %node_type,
                    addr,
                    "Received setup update for unknown node"
                ),
            }
        });

        let id = Arc::clone(&dev_id);
        let handle = tokio::spawn(async move {
            if let Err(e) = manager.run().await {
                tracing::error!(dev_id = %id, error = %e, "Update loop failed");
            }
            tracing::debug!(dev_id = %id, "Update loop ended");
        });

        if let Some(previous) = self.update_task.lock().replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn dev_id(&self) -> &str {
        &self.shared.dev_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.info.name
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.shared.info.product_id
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn sw_version(&self) -> &str {
        &self.shared.info.fw_version
    }

    /// Returns the serial number.
    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.shared.info.serial_id
    }

    /// Returns the home this device belongs to, if known.
    #[must_use]
    pub fn home(&self) -> Option<&HomeSummary> {
        self.shared.info.home.as_ref()
    }

    /// Returns the device record.
    #[must_use]
    pub fn info(&self) -> &DeviceInfo {
        &self.shared.info
    }

    /// Returns the away status.
    #[must_use]
    pub fn away(&self) -> bool {
        self.shared.away()
    }

    /// Returns the power limit in watts.
    #[must_use]
    pub fn power_limit(&self) -> i64 {
        self.shared.power_limit()
    }

    /// Returns handles to all nodes, in discovery order.
    #[must_use]
    pub fn get_nodes(&self) -> Vec<Node<S>> {
        self.nodes.read().clone()
    }

    /// Returns the node with the given type and address.
    #[must_use]
    pub fn node(&self, node_type: &NodeType, addr: u32) -> Option<Node<S>> {
        find_node(&self.nodes, node_type, addr)
    }

    /// Sets the away status.
    ///
    /// # Errors
    ///
    /// Returns error if the session rejects the write.
    pub async fn set_away_status(&self, away: bool) -> Result<()> {
        self.shared.set_away_status(self.session.as_ref(), away).await
    }

    /// Sets the power limit.
    ///
    /// # Errors
    ///
    /// Returns error if the session rejects the write.
    pub async fn set_power_limit(&self, power_limit: PowerLimit) -> Result<()> {
        self.session
            .set_device_power_limit(&self.shared.dev_id, power_limit)
            .await?;
        self.shared.state.write().power_limit = i64::from(power_limit.watts());
        Ok(())
    }

    /// Returns `true` while the push update task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.update_task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the push update task and waits for it to finish.
    pub async fn shutdown(&self) {
        let handle = self.update_task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            if let Err(e) = handle.await
                && !e.is_cancelled()
            {
                tracing::error!(dev_id = %self.shared.dev_id, error = %e, "Update task panicked");
            }
            tracing::debug!(dev_id = %self.shared.dev_id, "Device shut down");
        }
    }
}

impl<S: Session> Drop for Device<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.update_task.get_mut().take() {
            handle.abort();
        }
    }
}
