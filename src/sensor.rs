// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor readings derived from node status.
//!
//! Each heater exposes a subset of [`SensorKind`]s depending on its node
//! type. A [`SensorTracker`] follows a node's status over successive polls,
//! suppressing readings while the node is out of sync and measuring the time
//! between in-sync updates for energy integration.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeDelta, Utc};
//! use serde_json::json;
//! use smartbox_lib::sensor::{SensorKind, SensorTracker};
//! use smartbox_lib::types::NodeType;
//!
//! let status = json!({
//!     "sync_status": "ok", "active": true, "power": "1000", "duty": 50,
//! });
//! let status = status.as_object().unwrap().clone();
//!
//! let mut tracker = SensorTracker::new(NodeType::Htr);
//! let start = Utc::now();
//! tracker.update_at(status.clone(), start);
//! tracker.update_at(status, start + TimeDelta::hours(1));
//!
//! assert_eq!(tracker.value(SensorKind::Energy).unwrap(), Some(500.0));
//! ```

use chrono::{DateTime, TimeDelta, Utc};

use crate::climate;
use crate::error::Result;
use crate::model::Node;
use crate::session::Session;
use crate::types::status::{require_bool, require_f64};
use crate::types::{NodeType, Status, SyncStatus};

/// A reading a heater can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Measured room temperature.
    Temperature,
    /// Instantaneous power draw.
    Power,
    /// Share of time the element is on.
    DutyCycle,
    /// Energy used since the previous update.
    Energy,
    /// Charge level of a storage heater.
    ChargeLevel,
}

impl SensorKind {
    /// Every sensor kind.
    pub const ALL: [SensorKind; 5] = [
        Self::Temperature,
        Self::Power,
        Self::DutyCycle,
        Self::Energy,
        Self::ChargeLevel,
    ];

    /// Returns the suffix used in sensor names and identifiers.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Power => "power",
            Self::DutyCycle => "duty_cycle",
            Self::Energy => "energy",
            Self::ChargeLevel => "charge_level",
        }
    }

    /// Returns `true` if nodes of `node_type` report this reading.
    ///
    /// Only `htr` nodes report a duty cycle, which energy depends on.
    #[must_use]
    pub fn applies_to(&self, node_type: &NodeType) -> bool {
        match self {
            Self::Temperature => node_type.is_heater(),
            Self::Power => node_type.is_heater() && !node_type.is_mod(),
            Self::DutyCycle | Self::Energy => matches!(node_type, NodeType::Htr),
            Self::ChargeLevel => matches!(node_type, NodeType::Acm),
        }
    }

    /// Returns the sensor kinds reported by nodes of `node_type`.
    #[must_use]
    pub fn for_node_type(node_type: &NodeType) -> Vec<SensorKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.applies_to(node_type))
            .collect()
    }

    /// Returns the unit of measurement.
    ///
    /// Temperature takes its unit from the status and is `None` when the
    /// status carries none.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::UnknownUnit` for an unrecognised temperature unit.
    pub fn unit(&self, status: &Status) -> Result<Option<&'static str>> {
        Ok(match self {
            Self::Temperature => climate::get_temperature_unit(status)?.map(|u| u.symbol()),
            Self::Power => Some("W"),
            Self::DutyCycle | Self::ChargeLevel => Some("%"),
            Self::Energy => Some("Wh"),
        })
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Follows one node's status for its sensors.
///
/// An in-sync status is kept and timestamped; anything else marks the
/// sensors unavailable and forgets the previous update time, so energy is
/// only integrated across consecutive in-sync updates.
#[derive(Debug, Clone)]
pub struct SensorTracker {
    node_type: NodeType,
    status: Option<Status>,
    available: bool,
    last_update: Option<DateTime<Utc>>,
    time_since_last_update: Option<TimeDelta>,
}

impl SensorTracker {
    /// Creates a tracker with no status yet.
    #[must_use]
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            status: None,
            available: false,
            last_update: None,
            time_since_last_update: None,
        }
    }

    /// Records `status` as observed now.
    pub fn update(&mut self, status: Status) {
        self.update_at(status, Utc::now());
    }

    /// Records `status` as observed at `now`.
    pub fn update_at(&mut self, status: Status, now: DateTime<Utc>) {
        if SyncStatus::is_available(&status) {
            self.time_since_last_update = self.last_update.map(|last| now - last);
            self.last_update = Some(now);
            self.status = Some(status);
            self.available = true;
        } else {
            tracing::debug!(node_type = %self.node_type, "Node out of sync, sensors unavailable");
            self.available = false;
            self.last_update = None;
            self.time_since_last_update = None;
        }
    }

    /// Records the current cached status of `node`.
    pub fn refresh<S: Session>(&mut self, node: &Node<S>) {
        self.update(node.status());
    }

    /// Returns `true` if the last observed status was in sync.
    #[must_use]
    pub fn available(&self) -> bool {
        self.available
    }

    /// Returns the last in-sync status.
    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Returns when the last in-sync status was observed.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Returns the time between the last two consecutive in-sync updates.
    #[must_use]
    pub fn time_since_last_update(&self) -> Option<TimeDelta> {
        self.time_since_last_update
    }

    fn current(&self) -> Option<&Status> {
        self.status.as_ref().filter(|_| self.available)
    }

    /// Returns the `locked` attribute of the status.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if the status lacks `locked`.
    pub fn locked(&self) -> Result<Option<bool>> {
        self.current()
            .map(|status| require_bool("locked", &self.node_type, status))
            .transpose()
    }

    /// Returns the current reading for `kind`.
    ///
    /// `None` while unavailable, and for energy until two consecutive
    /// in-sync updates have been seen.
    ///
    /// # Errors
    ///
    /// Returns a lookup error if a field the reading needs is missing.
    pub fn value(&self, kind: SensorKind) -> Result<Option<f64>> {
        let Some(status) = self.current() else {
            return Ok(None);
        };
        let node_type = &self.node_type;
        let value = match kind {
            SensorKind::Temperature => climate::current_temperature(node_type, status)?,
            SensorKind::Power => {
                if climate::is_heating(node_type, status)? {
                    require_f64("power", node_type, status)?
                } else {
                    0.0
                }
            }
            SensorKind::DutyCycle => require_f64("duty", node_type, status)?,
            SensorKind::Energy => {
                let Some(elapsed) = self.time_since_last_update else {
                    return Ok(None);
                };
                let power = require_f64("power", node_type, status)?;
                let duty = require_f64("duty", node_type, status)?;
                #[allow(clippy::cast_precision_loss)]
                let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
                power * duty / 100.0 * seconds / 3600.0
            }
            SensorKind::ChargeLevel => require_f64("charge_level", node_type, status)?,
        };
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn status(value: Value) -> Status {
        value.as_object().cloned().unwrap()
    }

    fn htr_status() -> Status {
        status(json!({
            "sync_status": "ok",
            "mtemp": "19.5",
            "units": "C",
            "active": true,
            "power": "1200",
            "duty": 25,
            "locked": false,
        }))
    }

    #[test]
    fn applicability_per_node_type() {
        assert_eq!(
            SensorKind::for_node_type(&NodeType::Htr),
            vec![
                SensorKind::Temperature,
                SensorKind::Power,
                SensorKind::DutyCycle,
                SensorKind::Energy,
            ]
        );
        assert_eq!(
            SensorKind::for_node_type(&NodeType::Acm),
            vec![SensorKind::Temperature, SensorKind::Power, SensorKind::ChargeLevel]
        );
        assert_eq!(
            SensorKind::for_node_type(&NodeType::HtrMod),
            vec![SensorKind::Temperature]
        );
        assert!(SensorKind::for_node_type(&NodeType::from("pmo")).is_empty());
    }

    #[test]
    fn units() {
        let s = htr_status();
        assert_eq!(SensorKind::Temperature.unit(&s).unwrap(), Some("°C"));
        assert_eq!(SensorKind::Power.unit(&s).unwrap(), Some("W"));
        assert_eq!(SensorKind::Energy.unit(&s).unwrap(), Some("Wh"));
        assert_eq!(SensorKind::Temperature.unit(&Status::new()).unwrap(), None);
    }

    #[test]
    fn readings_when_available() {
        let mut tracker = SensorTracker::new(NodeType::Htr);
        tracker.update(htr_status());

        assert!(tracker.available());
        assert_eq!(tracker.value(SensorKind::Temperature).unwrap(), Some(19.5));
        assert_eq!(tracker.value(SensorKind::Power).unwrap(), Some(1200.0));
        assert_eq!(tracker.value(SensorKind::DutyCycle).unwrap(), Some(25.0));
        assert_eq!(tracker.locked().unwrap(), Some(false));
    }

    #[test]
    fn power_is_zero_when_idle() {
        let mut s = htr_status();
        s.insert("active".into(), json!(false));
        let mut tracker = SensorTracker::new(NodeType::Htr);
        tracker.update(s);
        assert_eq!(tracker.value(SensorKind::Power).unwrap(), Some(0.0));
    }

    #[test]
    fn acm_power_follows_charging() {
        let mut tracker = SensorTracker::new(NodeType::Acm);
        tracker.update(status(json!({
            "sync_status": "ok",
            "charging": true,
            "power": 800,
            "charge_level": 3,
        })));
        assert_eq!(tracker.value(SensorKind::Power).unwrap(), Some(800.0));
        assert_eq!(tracker.value(SensorKind::ChargeLevel).unwrap(), Some(3.0));
    }

    #[test]
    fn energy_needs_two_updates() {
        let mut tracker = SensorTracker::new(NodeType::Htr);
        let start = Utc::now();

        tracker.update_at(htr_status(), start);
        assert_eq!(tracker.value(SensorKind::Energy).unwrap(), None);

        tracker.update_at(htr_status(), start + TimeDelta::minutes(30));
        assert_eq!(tracker.time_since_last_update(), Some(TimeDelta::minutes(30)));
        // 1200 W at 25% for half an hour
        assert_eq!(tracker.value(SensorKind::Energy).unwrap(), Some(150.0));
    }

    #[test]
    fn lost_sync_clears_readings() {
        let mut tracker = SensorTracker::new(NodeType::Htr);
        let start = Utc::now();
        tracker.update_at(htr_status(), start);
        tracker.update_at(htr_status(), start + TimeDelta::minutes(1));

        tracker.update_at(status(json!({"sync_status": "lost"})), start + TimeDelta::minutes(2));
        assert!(!tracker.available());
        assert!(tracker.last_update().is_none());
        assert!(tracker.time_since_last_update().is_none());
        assert_eq!(tracker.value(SensorKind::Temperature).unwrap(), None);
        assert_eq!(tracker.locked().unwrap(), None);

        // Energy restarts from scratch after recovery
        tracker.update_at(htr_status(), start + TimeDelta::minutes(3));
        assert_eq!(tracker.value(SensorKind::Energy).unwrap(), None);
    }

    #[test]
    fn missing_sync_status_is_unavailable() {
        let mut tracker = SensorTracker::new(NodeType::Htr);
        let mut s = htr_status();
        s.remove("sync_status");
        tracker.update(s);
        assert!(!tracker.available());
    }

    #[test]
    fn missing_field_is_an_error() {
        let mut tracker = SensorTracker::new(NodeType::Htr);
        tracker.update(status(json!({"sync_status": "ok", "active": true})));
        assert!(tracker.value(SensorKind::DutyCycle).is_err());
        assert!(tracker.locked().is_err());
    }
}
