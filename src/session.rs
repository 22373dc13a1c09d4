// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contract with the external Smartbox session.
//!
//! This library does not talk to the vendor cloud itself. Transport,
//! authentication and push-socket reconnection are owned by a session
//! implementation, which plugs in through two traits:
//!
//! - [`Session`] - request/response calls (discovery, status, setup, samples
//!   and writes)
//! - [`UpdateManager`] - the long-lived push update loop, delivering updates
//!   to subscribed callbacks
//!
//! [`ChannelUpdateManager`](crate::router::ChannelUpdateManager) is a ready
//! made [`UpdateManager`] for sessions that can forward raw socket messages
//! into a channel.

use std::future::Future;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SessionError;
use crate::subscription::SubscriptionId;
use crate::types::{NodeType, PowerLimit, Setup, Status, StatusPatch, value_as_f64};

/// A home as returned by the vendor API, with the hubs it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    /// Home identifier.
    pub id: String,
    /// Home display name.
    pub name: String,
    /// Hubs installed in this home.
    #[serde(default)]
    pub devs: Vec<DeviceInfo>,
}

impl Home {
    /// Returns this home's identity without its device list.
    #[must_use]
    pub fn summary(&self) -> HomeSummary {
        HomeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// A home without its device list, attached to each discovered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeSummary {
    /// Home identifier.
    pub id: String,
    /// Home display name.
    pub name: String,
}

/// A hub as returned by the vendor API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device identifier.
    pub dev_id: String,
    /// Display name.
    pub name: String,
    /// Model identifier.
    pub product_id: String,
    /// Firmware version.
    pub fw_version: String,
    /// Serial number.
    pub serial_id: String,
    /// Home the device belongs to, filled in during discovery.
    #[serde(default)]
    pub home: Option<HomeSummary>,
}

/// A node as listed by the vendor API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Address of the node on its hub.
    pub addr: u32,
    /// Display name.
    pub name: String,
    /// Node type.
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

/// One energy counter sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp of the sample.
    pub t: i64,
    /// Temperature at sampling time, as reported.
    #[serde(default)]
    pub temp: Option<String>,
    /// Cumulative energy counter in watt-hours.
    #[serde(deserialize_with = "lenient_f64")]
    pub counter: f64,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    value_as_f64(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a number, got {value}")))
}

/// Request/response interface of a Smartbox session.
///
/// Implementations own transport and authentication. All returned futures
/// are `Send` so that device operations can run on any tokio worker.
pub trait Session: Send + Sync + 'static {
    /// Push update loop type created for each device.
    type Updates: UpdateManager;

    /// Lists the homes visible to the account, with their devices.
    fn get_homes(&self) -> impl Future<Output = Result<Vec<Home>, SessionError>> + Send;

    /// Lists the nodes of a device.
    fn get_nodes(
        &self,
        dev_id: &str,
    ) -> impl Future<Output = Result<Vec<NodeInfo>, SessionError>> + Send;

    /// Fetches the status of a node.
    fn get_node_status(
        &self,
        dev_id: &str,
        node: &NodeInfo,
    ) -> impl Future<Output = Result<Status, SessionError>> + Send;

    /// Fetches the setup of a node.
    fn get_node_setup(
        &self,
        dev_id: &str,
        node: &NodeInfo,
    ) -> impl Future<Output = Result<Setup, SessionError>> + Send;

    /// Fetches energy samples between two unix timestamps.
    fn get_node_samples(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        start: i64,
        end: i64,
    ) -> impl Future<Output = Result<Vec<Sample>, SessionError>> + Send;

    /// Writes a partial status to a node.
    fn set_node_status(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        status: &StatusPatch,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Writes a partial setup to a node.
    fn set_node_setup(
        &self,
        dev_id: &str,
        node: &NodeInfo,
        setup: &Setup,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Sets the away status of a device.
    fn set_device_away_status(
        &self,
        dev_id: &str,
        away: bool,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Sets the power limit of a device.
    fn set_device_power_limit(
        &self,
        dev_id: &str,
        power_limit: PowerLimit,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Creates the push update loop for a device.
    fn update_manager(&self, dev_id: &str) -> Self::Updates;
}

/// Push update loop for one device.
///
/// Callbacks are registered before [`run`](Self::run) is called and invoked
/// from the task driving the loop.
pub trait UpdateManager: Send + 'static {
    /// Subscribes to device away status updates.
    fn subscribe_to_device_away_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static;

    /// Subscribes to device power limit updates.
    fn subscribe_to_device_power_limit<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(i64) + Send + Sync + 'static;

    /// Subscribes to node status updates, keyed by node type and address.
    fn subscribe_to_node_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Status) + Send + Sync + 'static;

    /// Subscribes to node setup updates, keyed by node type and address.
    fn subscribe_to_node_setup<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Setup) + Send + Sync + 'static;

    /// Runs the push loop until the connection is given up.
    fn run(self) -> impl Future<Output = Result<(), SessionError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_info_uses_vendor_field_names() {
        let node: NodeInfo =
            serde_json::from_str(r#"{"addr": 3, "name": "Lounge", "type": "htr_mod"}"#).unwrap();
        assert_eq!(node.addr, 3);
        assert_eq!(node.node_type, NodeType::HtrMod);
    }

    #[test]
    fn sample_counter_accepts_strings() {
        let sample: Sample =
            serde_json::from_str(r#"{"t": 1700000000, "temp": "19.5", "counter": "1234.5"}"#)
                .unwrap();
        assert_eq!(sample.counter, 1234.5);
        let sample: Sample = serde_json::from_str(r#"{"t": 1, "counter": 7}"#).unwrap();
        assert_eq!(sample.counter, 7.0);
        assert!(sample.temp.is_none());
    }

    #[test]
    fn home_summary_drops_devices() {
        let home: Home = serde_json::from_str(
            r#"{"id": "h1", "name": "Home", "devs": [
                {"dev_id": "d1", "name": "Hub", "product_id": "p",
                 "fw_version": "1.0", "serial_id": "s"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(home.devs.len(), 1);
        assert_eq!(
            home.summary(),
            HomeSummary {
                id: "h1".to_string(),
                name: "Home".to_string()
            }
        );
    }
}
