// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing of raw push-socket messages to typed updates.
//!
//! The hub socket emits two kinds of payloads:
//!
//! - incremental updates, `{"path": "/htr/2/status", "body": {...}}`
//! - full device data dumps, sent on (re)connection, holding the away
//!   status, the power limit and every node's status and setup
//!
//! [`parse_socket_update`] and [`parse_dev_data`] turn these into
//! [`Update`]s. [`ChannelUpdateManager`] is an
//! [`UpdateManager`] fed through an [`UpdateSender`], for sessions that only
//! need to forward socket traffic.
//!
//! # Architecture
//!
//! ```text
//! socket message: /htr_mod/3/status → {...}
//!                     ↓
//!        UpdateSender.send_socket_message()
//!                     ↓
//!          parse_socket_update() → Update
//!                     ↓
//!        mpsc channel → ChannelUpdateManager.run()
//!                     ↓
//!          UpdateCallbacks.dispatch()
//!                     ↓
//!        Device push handler → Node::update_status
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::SessionError;
use crate::session::UpdateManager;
use crate::subscription::{SubscriptionId, Update, UpdateCallbacks};
use crate::types::{NodeType, Setup, Status};

/// A raw incremental socket message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketMessage {
    /// Resource path, e.g. `/mgr/away_status` or `/acm/1/setup`.
    pub path: String,
    /// New content of the resource.
    pub body: Value,
}

/// A parsed socket resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParsedPath<'a> {
    AwayStatus,
    PowerLimit,
    NodeStatus { node_type: &'a str, addr: u32 },
    NodeSetup { node_type: &'a str, addr: u32 },
}

impl<'a> ParsedPath<'a> {
    fn parse(path: &'a str) -> Option<Self> {
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        match parts.as_slice() {
            ["mgr", "away_status"] => Some(Self::AwayStatus),
            ["htr_system", "power_limit" | "setup"] => Some(Self::PowerLimit),
            [node_type, addr, "status"] => Some(Self::NodeStatus {
                node_type: *node_type,
                addr: addr.parse().ok()?,
            }),
            [node_type, addr, "setup"] => Some(Self::NodeSetup {
                node_type: *node_type,
                addr: addr.parse().ok()?,
            }),
            _ => None,
        }
    }
}

fn away_from(body: &Value) -> Option<bool> {
    body.get("away").and_then(Value::as_bool)
}

fn power_limit_from(body: &Value) -> Option<i64> {
    match body.get("power_limit")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn object(body: &Value) -> Option<Status> {
    body.as_object().cloned()
}

/// Parses one incremental socket message.
///
/// Returns `None` for paths this library does not track and for bodies
/// that do not have the expected shape.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use smartbox_lib::router::parse_socket_update;
/// use smartbox_lib::subscription::Update;
///
/// let update = parse_socket_update("/mgr/away_status", &json!({"away": true}));
/// assert_eq!(update, Some(Update::AwayStatus(true)));
///
/// assert_eq!(parse_socket_update("/connected", &json!({})), None);
/// ```
#[must_use]
pub fn parse_socket_update(path: &str, body: &Value) -> Option<Update> {
    let Some(parsed) = ParsedPath::parse(path) else {
        tracing::trace!(path = %path, "Ignoring untracked socket path");
        return None;
    };
    let update = match parsed {
        ParsedPath::AwayStatus => away_from(body).map(Update::AwayStatus),
        ParsedPath::PowerLimit => power_limit_from(body).map(Update::PowerLimit),
        ParsedPath::NodeStatus { node_type, addr } => object(body).map(|status| Update::NodeStatus {
            node_type: NodeType::from(node_type),
            addr,
            status,
        }),
        ParsedPath::NodeSetup { node_type, addr } => object(body).map(|setup| Update::NodeSetup {
            node_type: NodeType::from(node_type),
            addr,
            setup,
        }),
    };
    if update.is_none() {
        tracing::debug!(path = %path, body = %body, "Ignoring socket message with unexpected body");
    }
    update
}

/// Expands a full device data dump into updates.
///
/// Away status, power limit (`htr_system.setup.power_limit`) and each entry
/// of `nodes` with a `type` and `addr` are converted; absent sections are
/// skipped.
#[must_use]
pub fn parse_dev_data(body: &Value) -> Vec<Update> {
    let mut updates = Vec::new();

    if let Some(away) = body.get("away_status").and_then(away_from) {
        updates.push(Update::AwayStatus(away));
    }
    if let Some(limit) = body
        .get("htr_system")
        .and_then(|system| system.get("setup"))
        .and_then(power_limit_from)
    {
        updates.push(Update::PowerLimit(limit));
    }

    let nodes = body.get("nodes").and_then(Value::as_array);
    for node in nodes.into_iter().flatten() {
        let Some(node_type) = node.get("type").and_then(Value::as_str) else {
            continue;
        };
        let Some(addr) = node
            .get("addr")
            .and_then(Value::as_u64)
            .and_then(|a| u32::try_from(a).ok())
        else {
            continue;
        };
        let node_type = NodeType::from(node_type);
        if let Some(status) = node.get("status").and_then(object) {
            updates.push(Update::NodeStatus {
                node_type: node_type.clone(),
                addr,
                status,
            });
        }
        if let Some(setup) = node.get("setup").and_then(object) {
            updates.push(Update::NodeSetup {
                node_type,
                addr,
                setup,
            });
        }
    }

    updates
}

/// Sending half of a [`ChannelUpdateManager`].
///
/// Cheap to clone; safe to use from any thread, including callbacks of a
/// socket library.
#[derive(Debug, Clone)]
pub struct UpdateSender {
    dev_id: Arc<str>,
    sender: mpsc::UnboundedSender<Update>,
}

impl UpdateSender {
    /// Queues a typed update.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ChannelClosed` once the manager has stopped.
    pub fn send(&self, update: Update) -> Result<(), SessionError> {
        self.sender
            .send(update)
            .map_err(|_| SessionError::ChannelClosed(self.dev_id.to_string()))
    }

    /// Parses and queues an incremental socket message.
    ///
    /// Returns `false` if the message was ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ChannelClosed` once the manager has stopped.
    pub fn send_socket_message(&self, message: &SocketMessage) -> Result<bool, SessionError> {
        match parse_socket_update(&message.path, &message.body) {
            Some(update) => self.send(update).map(|()| true),
            None => Ok(false),
        }
    }

    /// Parses and queues a full device data dump.
    ///
    /// Returns the number of updates queued.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ChannelClosed` once the manager has stopped.
    pub fn send_dev_data(&self, body: &Value) -> Result<usize, SessionError> {
        let updates = parse_dev_data(body);
        let count = updates.len();
        for update in updates {
            self.send(update)?;
        }
        Ok(count)
    }
}

/// An [`UpdateManager`] driven by a channel of updates.
///
/// [`run`](UpdateManager::run) dispatches updates until every
/// [`UpdateSender`] has been dropped.
///
/// # Examples
///
/// ```
/// use smartbox_lib::router::ChannelUpdateManager;
/// use smartbox_lib::session::UpdateManager;
/// use smartbox_lib::subscription::Update;
///
/// # #[tokio::main]
/// # async fn main() {
/// let (manager, sender) = ChannelUpdateManager::new("dev_1");
/// manager.subscribe_to_device_power_limit(|limit| assert_eq!(limit, 2000));
///
/// sender.send(Update::PowerLimit(2000)).unwrap();
/// drop(sender);
/// manager.run().await.unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct ChannelUpdateManager {
    dev_id: Arc<str>,
    callbacks: Arc<UpdateCallbacks>,
    receiver: mpsc::UnboundedReceiver<Update>,
}

impl ChannelUpdateManager {
    /// Creates a manager and the sender feeding it.
    #[must_use]
    pub fn new(dev_id: impl Into<String>) -> (Self, UpdateSender) {
        let dev_id: Arc<str> = Arc::from(dev_id.into());
        let (sender, receiver) = mpsc::unbounded_channel();
        let manager = Self {
            dev_id: Arc::clone(&dev_id),
            callbacks: Arc::new(UpdateCallbacks::new()),
            receiver,
        };
        (manager, UpdateSender { dev_id, sender })
    }

    /// Returns the callback registry updates are dispatched to.
    #[must_use]
    pub fn callbacks(&self) -> &Arc<UpdateCallbacks> {
        &self.callbacks
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.callbacks.unsubscribe(id)
    }
}

impl UpdateManager for ChannelUpdateManager {
    fn subscribe_to_device_away_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.callbacks.on_away_status(callback)
    }

    fn subscribe_to_device_power_limit<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        self.callbacks.on_power_limit(callback)
    }

    fn subscribe_to_node_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Status) + Send + Sync + 'static,
    {
        self.callbacks.on_node_status(callback)
    }

    fn subscribe_to_node_setup<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Setup) + Send + Sync + 'static,
    {
        self.callbacks.on_node_setup(callback)
    }

    async fn run(mut self) -> Result<(), SessionError> {
        tracing::debug!(dev_id = %self.dev_id, "Update manager started");
        while let Some(update) = self.receiver.recv().await {
            tracing::trace!(dev_id = %self.dev_id, kind = update.kind(), "Dispatching update");
            self.callbacks.dispatch(&update);
        }
        tracing::debug!(dev_id = %self.dev_id, "Update channel closed");
        Ok(())
    }
}
