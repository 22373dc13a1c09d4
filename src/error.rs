// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `smartbox_lib` library.
//!
//! Vendor status and setup maps are validated lazily, at the point where a
//! field is needed. A missing or unexpected field is never defaulted: it
//! surfaces as a [`LookupError`] carrying the field, the node type and a hint
//! pointing at the issue tracker. Values that are present but cannot be
//! translated surface as a [`ValueError`].

use thiserror::Error;

/// Where unrecognised vendor state should be reported.
pub const ISSUES_URL: &str = "https://github.com/ajtudela/hass-smartbox/issues";

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A required status or setup field was missing or unexpected.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// A value could not be translated.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The external session failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The device owning a node has been dropped.
    #[error("device {0} is no longer available")]
    DeviceGone(String),
}

/// Errors raised when a required vendor field is absent or holds a value
/// this library does not know about.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// A required field is missing from a status or setup map.
    #[error(
        "'{field}' not found in {node_type} - please report to {}. status: {context}",
        ISSUES_URL
    )]
    MissingField {
        /// The missing field.
        field: String,
        /// Node type the map belongs to.
        node_type: String,
        /// Rendering of the map that was inspected.
        context: String,
    },

    /// A field holds a value outside the known vendor vocabulary.
    #[error(
        "unexpected '{field}' value {value} found for {node_type} - please report to {}. status: {context}",
        ISSUES_URL
    )]
    UnexpectedValue {
        /// The field holding the value.
        field: String,
        /// The unexpected value.
        value: String,
        /// Node type the map belongs to.
        node_type: String,
        /// Rendering of the map that was inspected.
        context: String,
    },
}

/// Errors raised when a value cannot be translated between vendor and host
/// vocabularies.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// The node reported a mode this library does not know.
    #[error("unknown smartbox node mode {0}")]
    UnknownMode(String),

    /// A mod heater selected a temperature tier with no matching preset.
    #[error(
        "unknown selected_temp {value} for {node_type} - please report to {}",
        ISSUES_URL
    )]
    UnknownSelectedTemp {
        /// The reported tier.
        value: String,
        /// The node type.
        node_type: String,
    },

    /// The requested HVAC mode cannot be applied to a heater.
    #[error("unsupported hvac mode {0}")]
    UnsupportedHvacMode(String),

    /// The requested preset is not supported by the node type.
    #[error("unsupported preset {preset} for node type {node_type}")]
    UnsupportedPreset {
        /// The preset that was requested.
        preset: String,
        /// The node type.
        node_type: String,
    },

    /// Temperatures cannot be set while a mod heater runs its frost tier.
    #[error("can't set temperature for htr_mod devices when ice mode is selected")]
    TemperatureInFrostMode,

    /// The `units` field holds an unknown unit.
    #[error("unknown temp unit {0}")]
    UnknownUnit(String),

    /// A field holds a value of the wrong shape.
    #[error("invalid value for '{field}': {value}")]
    InvalidField {
        /// The field.
        field: String,
        /// Rendering of the offending value.
        value: String,
    },

    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors reported by the external session collaborator.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A request to the vendor API failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The push update channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// A payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display_names_field_and_tracker() {
        let err = LookupError::MissingField {
            field: "stemp".to_string(),
            node_type: "htr".to_string(),
            context: "{}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("'stemp' not found in htr"));
        assert!(msg.contains(ISSUES_URL));
    }

    #[test]
    fn out_of_range_display() {
        let err = ValueError::OutOfRange {
            min: 0,
            max: 9999,
            actual: 10_000,
        };
        assert_eq!(err.to_string(), "value 10000 is out of range [0, 9999]");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::TemperatureInFrostMode.into();
        assert!(matches!(
            err,
            Error::Value(ValueError::TemperatureInFrostMode)
        ));
    }

    #[test]
    fn session_error_display() {
        let err = SessionError::RequestFailed("timeout".to_string());
        assert_eq!(err.to_string(), "request failed: timeout");
    }
}
