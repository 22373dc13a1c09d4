// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor status and setup maps.
//!
//! The hub's status and setup documents are untyped key-value maps whose
//! schema depends on node type and firmware. They are stored as JSON maps and
//! checked field by field where a value is needed, so a missing field is
//! reported against the node type that lacked it instead of being defaulted.
//!
//! Numeric fields arrive either as JSON numbers or as strings (`"21.5"`);
//! [`require_f64`] accepts both.

use serde_json::{Map, Value};

use crate::error::{Error, LookupError, ValueError};
use crate::types::NodeType;

/// A node status document (`mode`, `stemp`, `mtemp`, `sync_status`, ...).
pub type Status = Map<String, Value>;

/// A node setup document (`window_mode_enabled`, `factory_options`, ...).
pub type Setup = Map<String, Value>;

/// A partial status document to be written to a node.
pub type StatusPatch = Map<String, Value>;

/// Status field carrying the freshness of the cached status.
pub const SYNC_STATUS: &str = "sync_status";

/// Freshness of a node's cached status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// The hub is in contact with the node.
    Ok,
    /// The node is unreachable; other status fields are stale or absent.
    Lost,
    /// Any other value reported by the hub.
    Other(String),
}

impl SyncStatus {
    /// Reads the sync status from a status map, if present.
    #[must_use]
    pub fn of(status: &Status) -> Option<Self> {
        status.get(SYNC_STATUS).and_then(Value::as_str).map(|s| match s {
            "ok" => Self::Ok,
            "lost" => Self::Lost,
            other => Self::Other(other.to_string()),
        })
    }

    /// Returns `true` only for a status known to be in sync.
    #[must_use]
    pub fn is_available(status: &Status) -> bool {
        matches!(Self::of(status), Some(Self::Ok))
    }
}

/// Returns the value for `key`, or a lookup error naming the field.
pub(crate) fn require<'a>(
    key: &str,
    node_type: &NodeType,
    map: &'a Map<String, Value>,
) -> Result<&'a Value, LookupError> {
    map.get(key).ok_or_else(|| LookupError::MissingField {
        field: key.to_string(),
        node_type: node_type.to_string(),
        context: Value::Object(map.clone()).to_string(),
    })
}

/// Returns the string value for `key`.
pub(crate) fn require_str<'a>(
    key: &str,
    node_type: &NodeType,
    map: &'a Map<String, Value>,
) -> Result<&'a str, Error> {
    let value = require(key, node_type, map)?;
    value.as_str().ok_or_else(|| invalid(key, value).into())
}

/// Returns the numeric value for `key`, accepting numbers and numeric strings.
pub(crate) fn require_f64(
    key: &str,
    node_type: &NodeType,
    map: &Map<String, Value>,
) -> Result<f64, Error> {
    let value = require(key, node_type, map)?;
    value_as_f64(value).ok_or_else(|| invalid(key, value).into())
}

/// Returns the boolean value for `key`.
pub(crate) fn require_bool(
    key: &str,
    node_type: &NodeType,
    map: &Map<String, Value>,
) -> Result<bool, Error> {
    let value = require(key, node_type, map)?;
    value_as_bool(value).ok_or_else(|| invalid(key, value).into())
}

/// Interprets a JSON value as a float.
#[must_use]
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Interprets a JSON value as a boolean.
#[must_use]
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn invalid(key: &str, value: &Value) -> ValueError {
    ValueError::InvalidField {
        field: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn sync_status_detection() {
        assert!(SyncStatus::is_available(&map(json!({"sync_status": "ok"}))));
        assert!(!SyncStatus::is_available(&map(json!({"sync_status": "lost"}))));
        assert!(!SyncStatus::is_available(&map(json!({}))));
        assert_eq!(
            SyncStatus::of(&map(json!({"sync_status": "pending"}))),
            Some(SyncStatus::Other("pending".to_string()))
        );
    }

    #[test]
    fn require_reports_field_and_node_type() {
        let status = map(json!({"mode": "auto"}));
        let err = require("stemp", &NodeType::Htr, &status).unwrap_err();
        match err {
            LookupError::MissingField {
                field,
                node_type,
                context,
            } => {
                assert_eq!(field, "stemp");
                assert_eq!(node_type, "htr");
                assert!(context.contains("auto"));
            }
            LookupError::UnexpectedValue { .. } => panic!("wrong variant"),
        }
    }

    #[test]
    fn numbers_accept_strings() {
        let status = map(json!({"stemp": "21.5", "mtemp": 19, "units": "C"}));
        assert_eq!(require_f64("stemp", &NodeType::Htr, &status).unwrap(), 21.5);
        assert_eq!(require_f64("mtemp", &NodeType::Htr, &status).unwrap(), 19.0);
        assert!(matches!(
            require_f64("units", &NodeType::Htr, &status),
            Err(Error::Value(ValueError::InvalidField { .. }))
        ));
    }

    #[test]
    fn booleans() {
        assert_eq!(value_as_bool(&json!(true)), Some(true));
        assert_eq!(value_as_bool(&json!(0)), Some(false));
        assert_eq!(value_as_bool(&json!("false")), Some(false));
        assert_eq!(value_as_bool(&json!("maybe")), None);
    }
}
