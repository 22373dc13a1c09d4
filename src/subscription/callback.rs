// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for push update subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`UpdateCallbacks`] - Registry for storing and dispatching callbacks

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::types::{NodeType, Setup, Status};

use super::Update;

/// Unique identifier for a subscription.
///
/// IDs are unique within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type AwayStatusCallback = Arc<dyn Fn(bool) + Send + Sync>;

type PowerLimitCallback = Arc<dyn Fn(i64) + Send + Sync>;

type NodeStatusCallback = Arc<dyn Fn(&NodeType, u32, &Status) + Send + Sync>;

type NodeSetupCallback = Arc<dyn Fn(&NodeType, u32, &Setup) + Send + Sync>;

/// Registry of push update callbacks for one device.
///
/// Thread-safe through `parking_lot::RwLock`; callbacks are wrapped in `Arc`
/// and cloned out of the lock before being invoked, so a callback may
/// register or remove subscriptions without deadlocking.
pub struct UpdateCallbacks {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    away_status_callbacks: RwLock<HashMap<SubscriptionId, AwayStatusCallback>>,
    power_limit_callbacks: RwLock<HashMap<SubscriptionId, PowerLimitCallback>>,
    node_status_callbacks: RwLock<HashMap<SubscriptionId, NodeStatusCallback>>,
    node_setup_callbacks: RwLock<HashMap<SubscriptionId, NodeSetupCallback>>,
}

impl UpdateCallbacks {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            away_status_callbacks: RwLock::new(HashMap::new()),
            power_limit_callbacks: RwLock::new(HashMap::new()),
            node_status_callbacks: RwLock::new(HashMap::new()),
            node_setup_callbacks: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for device away status updates.
    pub fn on_away_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.away_status_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for device power limit updates.
    pub fn on_power_limit<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.power_limit_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for node status updates.
    pub fn on_node_status<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Status) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.node_status_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for node setup updates.
    pub fn on_node_setup<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&NodeType, u32, &Setup) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.node_setup_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.away_status_callbacks.write().remove(&id).is_some()
            || self.power_limit_callbacks.write().remove(&id).is_some()
            || self.node_status_callbacks.write().remove(&id).is_some()
            || self.node_setup_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.away_status_callbacks.write().clear();
        self.power_limit_callbacks.write().clear();
        self.node_status_callbacks.write().clear();
        self.node_setup_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches an update to the callbacks registered for its kind.
    pub fn dispatch(&self, update: &Update) {
        match update {
            Update::AwayStatus(away) => {
                let callbacks: Vec<_> = self
                    .away_status_callbacks
                    .read()
                    .values()
                    .cloned()
                    .collect();
                for callback in callbacks {
                    callback(*away);
                }
            }
            Update::PowerLimit(limit) => {
                let callbacks: Vec<_> = self
                    .power_limit_callbacks
                    .read()
                    .values()
                    .cloned()
                    .collect();
                for callback in callbacks {
                    callback(*limit);
                }
            }
            Update::NodeStatus {
                node_type,
                addr,
                status,
            } => {
                let callbacks: Vec<_> = self
                    .node_status_callbacks
                    .read()
                    .values()
                    .cloned()
                    .collect();
                for callback in callbacks {
                    callback(node_type, *addr, status);
                }
            }
            Update::NodeSetup {
                node_type,
                addr,
                setup,
            } => {
                let callbacks: Vec<_> = self
                    .node_setup_callbacks
                    .read()
                    .values()
                    .cloned()
                    .collect();
                for callback in callbacks {
                    callback(node_type, *addr, setup);
                }
            }
        }
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.away_status_callbacks.read().len()
            + self.power_limit_callbacks.read().len()
            + self.node_status_callbacks.read().len()
            + self.node_setup_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for UpdateCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UpdateCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateCallbacks")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = UpdateCallbacks::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn away_status_callback_and_unsubscribe() {
        let registry = UpdateCallbacks::new();
        let received = Arc::new(RwLock::new(None::<bool>));
        let received_clone = received.clone();

        let id = registry.on_away_status(move |away| {
            *received_clone.write() = Some(away);
        });
        registry.dispatch(&Update::AwayStatus(true));
        assert_eq!(*received.read(), Some(true));

        assert!(registry.unsubscribe(id));
        registry.dispatch(&Update::AwayStatus(false));
        assert_eq!(*received.read(), Some(true));
    }

    #[test]
    fn node_status_callback_receives_key() {
        let registry = UpdateCallbacks::new();
        let received = Arc::new(RwLock::new(None::<(NodeType, u32)>));
        let received_clone = received.clone();

        registry.on_node_status(move |ty, addr, _status| {
            *received_clone.write() = Some((ty.clone(), addr));
        });
        registry.dispatch(&Update::NodeStatus {
            node_type: NodeType::Acm,
            addr: 4,
            status: Status::new(),
        });

        assert_eq!(*received.read(), Some((NodeType::Acm, 4)));
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let registry = UpdateCallbacks::new();
        let counter = Arc::new(AtomicU32::new(0));
        let c1 = counter.clone();
        let c2 = counter.clone();

        registry.on_power_limit(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_node_setup(move |_, _, _| {
            c2.fetch_add(10, Ordering::SeqCst);
        });

        registry.dispatch(&Update::PowerLimit(1500));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        registry.dispatch(&Update::AwayStatus(true));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_nonexistent() {
        let registry = UpdateCallbacks::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn unique_ids_and_clear() {
        let registry = UpdateCallbacks::new();
        let id1 = registry.on_away_status(|_| {});
        let id2 = registry.on_power_limit(|_| {});
        let id3 = registry.on_node_status(|_, _, _| {});
        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_eq!(registry.callback_count(), 3);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_debug() {
        let registry = UpdateCallbacks::new();
        registry.on_away_status(|_| {});
        let debug = format!("{registry:?}");
        assert!(debug.contains("UpdateCallbacks"));
        assert!(debug.contains("callback_count"));
    }
}
