// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory session shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use smartbox_lib::router::{ChannelUpdateManager, UpdateSender};
use smartbox_lib::session::{DeviceInfo, Home, NodeInfo, Sample, Session};
use smartbox_lib::subscription::Update;
use smartbox_lib::{NodeType, PowerLimit, SessionError, Setup, Status, StatusPatch};

/// A write received by the mock session.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    NodeStatus {
        dev_id: String,
        addr: u32,
        patch: StatusPatch,
    },
    NodeSetup {
        dev_id: String,
        addr: u32,
        setup: Setup,
    },
    AwayStatus {
        dev_id: String,
        away: bool,
    },
    PowerLimit {
        dev_id: String,
        watts: u16,
    },
}

type NodeKey = (String, u32);

/// Session backed by fixed data that records every write.
#[derive(Debug, Default)]
pub struct MockSession {
    homes: Vec<Home>,
    nodes: HashMap<String, Vec<NodeInfo>>,
    status: Mutex<HashMap<NodeKey, Status>>,
    setup: Mutex<HashMap<NodeKey, Setup>>,
    samples: Mutex<HashMap<NodeKey, Vec<Sample>>>,
    sample_windows: Mutex<Vec<(i64, i64)>>,
    writes: Mutex<Vec<Write>>,
    senders: Mutex<HashMap<String, UpdateSender>>,
    fail_writes: AtomicBool,
}

fn object(value: Value) -> Status {
    value.as_object().cloned().unwrap_or_default()
}

pub fn node_status(node_type: &NodeType) -> Status {
    let mut status = object(json!({
        "mtemp": "19.5",
        "units": "C",
        "sync_status": "ok",
        "locked": false,
        "power": "854",
        "mode": "auto",
    }));
    match node_type {
        NodeType::Acm => {
            status.insert("charging".into(), json!(true));
            status.insert("charge_level".into(), json!("4"));
        }
        _ => {
            status.insert("active".into(), json!(true));
        }
    }
    if matches!(node_type, NodeType::Htr) {
        status.insert("duty".into(), json!("50"));
    }
    if node_type.is_mod() {
        status.insert("on".into(), json!(true));
        status.insert("selected_temp".into(), json!("comfort"));
        status.insert("comfort_temp".into(), json!("22"));
        status.insert("eco_offset".into(), json!("2"));
        status.insert("ice_temp".into(), json!("7"));
    } else {
        status.insert("stemp".into(), json!("20"));
    }
    status
}

pub fn node_setup(window_mode_available: bool) -> Setup {
    object(json!({
        "window_mode_enabled": false,
        "true_radiant_enabled": true,
        "factory_options": {
            "window_mode_available": window_mode_available,
            "true_radiant_available": true,
        },
    }))
}

pub fn sample(t: i64, counter: f64) -> Sample {
    Sample {
        t,
        temp: Some("19.5".to_string()),
        counter,
    }
}

fn device_info(dev_id: &str, name: &str) -> DeviceInfo {
    DeviceInfo {
        dev_id: dev_id.to_string(),
        name: name.to_string(),
        product_id: "product_id_1".to_string(),
        fw_version: "1.2.3".to_string(),
        serial_id: format!("serial_{dev_id}"),
        home: None,
    }
}

fn node_info(addr: u32, node_type: NodeType) -> NodeInfo {
    NodeInfo {
        addr,
        name: format!("node_{addr}"),
        node_type,
    }
}

impl MockSession {
    /// One home with two devices.
    ///
    /// `device_1` holds an `htr` (addr 1), an `htr_mod` (addr 2) and an
    /// `acm` (addr 3); `device_2` holds a single `htr` (addr 1) and a
    /// non-heater `pmo` (addr 5).
    pub fn new() -> Self {
        let mut session = Self {
            homes: vec![Home {
                id: "home_1".to_string(),
                name: "Home 1".to_string(),
                devs: vec![
                    device_info("device_1", "Device 1"),
                    device_info("device_2", "Device 2"),
                ],
            }],
            ..Self::default()
        };
        session.add_node("device_1", node_info(1, NodeType::Htr), true);
        session.add_node("device_1", node_info(2, NodeType::HtrMod), false);
        session.add_node("device_1", node_info(3, NodeType::Acm), false);
        session.add_node("device_2", node_info(1, NodeType::Htr), false);
        session.add_node("device_2", node_info(5, NodeType::from("pmo")), false);
        session
    }

    fn add_node(&mut self, dev_id: &str, info: NodeInfo, window_mode_available: bool) {
        let key = (dev_id.to_string(), info.addr);
        self.status
            .get_mut()
            .insert(key.clone(), node_status(&info.node_type));
        self.setup
            .get_mut()
            .insert(key.clone(), node_setup(window_mode_available));
        self.samples.get_mut().insert(
            key,
            vec![sample(1000, 100.0), sample(2000, 150.0), sample(3000, 210.0)],
        );
        self.nodes.entry(dev_id.to_string()).or_default().push(info);
    }

    pub fn device_info(&self, dev_id: &str) -> DeviceInfo {
        self.homes
            .iter()
            .flat_map(|home| home.devs.iter())
            .find(|dev| dev.dev_id == dev_id)
            .cloned()
            .expect("unknown device")
    }

    pub fn set_samples(&self, dev_id: &str, addr: u32, samples: Vec<Sample>) {
        self.samples.lock().insert((dev_id.to_string(), addr), samples);
    }

    pub fn sample_windows(&self) -> Vec<(i64, i64)> {
        self.sample_windows.lock().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().clone()
    }

    /// Returns the sender feeding the update manager of `dev_id`.
    pub fn sender(&self, dev_id: &str) -> UpdateSender {
        self.senders
            .lock()
            .get(dev_id)
            .cloned()
            .expect("no update manager for device")
    }

    pub fn push(&self, dev_id: &str, update: Update) {
        self.sender(dev_id).send(update).expect("update channel closed");
    }

    /// Drops the stored sender so the device's update loop can end.
    pub fn close_updates(&self, dev_id: &str) {
        self.senders.lock().remove(dev_id);
    }

    fn record(&self, write: Write) -> Result<(), SessionError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionError::RequestFailed("mock write rejected".to_string()));
        }
        self.writes.lock().push(write);
        Ok(())
    }

    fn lookup<T: Clone>(
        map: &Mutex<HashMap<NodeKey, T>>,
        dev_id: &str,
        node: &NodeInfo,
    ) -> Result<T, SessionError> {
        map.lock()
            .get(&(dev_id.to_string(), node.addr))
            .cloned()
            .ok_or_else(|| SessionError::RequestFailed(format!("no node {dev_id}/{}", node.addr)))
    }
}

impl Session for MockSession {
    type Updates = ChannelUpdateManager;

    async fn get_homes(&self) -> Result<Vec<Home>, SessionError> {
        Ok(self.homes.clone())
    }

    async fn get_nodes(&self, dev_id: &str) -> Result<Vec<NodeInfo>, SessionError> {
        Ok(self.nodes.get(dev_id).cloned().unwrap_or_default())
    }

    async fn get_node_status(&self, dev_id: &str, node: &NodeInfo) -> Result<Status, SessionError> {
        Self::lookup(&self.status, dev_id, node)
    }

    async fn get_node_setup(&self, dev_id: &str, node: &NodeInfo) -> Result<Setup, SessionError> {
        Self::lookup(&self.setup, dev_id, node)
    }

    async fn get_node_samples(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        start: i64,
        end: i64,
    ) -> Result<Vec<Sample>, SessionError> {
        self.sample_windows.lock().push((start, end));
        Self::lookup(&self.samples, dev_id, node)
    }

    async fn set_node_status(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        status: &StatusPatch,
    ) -> Result<(), SessionError> {
        self.record(Write::NodeStatus {
            dev_id: dev_id.to_string(),
            addr: node.addr,
            patch: status.clone(),
        })
    }

    async fn set_node_setup(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        setup: &Setup,
    ) -> Result<(), SessionError> {
        self.record(Write::NodeSetup {
            dev_id: dev_id.to_string(),
            addr: node.addr,
            setup: setup.clone(),
        })
    }

    async fn set_device_away_status(&self, dev_id: &str, away: bool) -> Result<(), SessionError> {
        self.record(Write::AwayStatus {
            dev_id: dev_id.to_string(),
            away,
        })
    }

    async fn set_device_power_limit(
        &self,
        dev_id: &str,
        power_limit: PowerLimit,
    ) -> Result<(), SessionError> {
        self.record(Write::PowerLimit {
            dev_id: dev_id.to_string(),
            watts: power_limit.watts(),
        })
    }

    fn update_manager(&self, dev_id: &str) -> ChannelUpdateManager {
        let (manager, sender) = ChannelUpdateManager::new(dev_id);
        self.senders.lock().insert(dev_id.to_string(), sender);
        manager
    }
}

/// Polls `condition` until it holds or a second has passed.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
