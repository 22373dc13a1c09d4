// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between heater status documents and the host climate model.
//!
//! Smartbox heaters describe their operating state with overlapping vendor
//! fields: a `mode` string (`off`, `manual`, `auto`, `self_learn`, ...),
//! and on `htr_mod` nodes an `on` flag plus a `selected_temp` tier
//! (`comfort`, `eco`, `ice`). The host wants three orthogonal concepts:
//! an [`HvacMode`], a [`PresetMode`] and a target temperature.
//!
//! Every function in this module is pure. The `get_*` functions read a
//! status document; the `set_*` functions return a [`StatusPatch`] to be
//! written with [`Node::set_status`](crate::model::Node::set_status).
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use smartbox_lib::climate::{get_hvac_mode, get_preset_mode, get_target_temperature};
//! use smartbox_lib::types::{HvacMode, NodeType, PresetMode};
//!
//! let status = json!({
//!     "mode": "manual",
//!     "on": true,
//!     "selected_temp": "eco",
//!     "comfort_temp": "22",
//!     "eco_offset": "2",
//! });
//! let status = status.as_object().unwrap();
//!
//! let ty = NodeType::HtrMod;
//! assert_eq!(get_hvac_mode(&ty, status).unwrap(), HvacMode::Heat);
//! assert_eq!(get_preset_mode(&ty, status, false).unwrap(), PresetMode::Eco);
//! assert_eq!(get_target_temperature(&ty, status).unwrap(), 20.0);
//! ```

use serde_json::{Value, json};

use crate::error::{Error, LookupError, Result, ValueError};
use crate::types::status::{require, require_bool, require_f64, require_str};
use crate::types::{
    HvacAction, HvacMode, NodeType, PresetMode, Status, StatusPatch, TemperatureUnit,
    format_temperature,
};

/// Tier selected on an `htr_mod` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectedTemp {
    Comfort,
    Eco,
    Ice,
}

impl SelectedTemp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Comfort => "comfort",
            Self::Eco => "eco",
            Self::Ice => "ice",
        }
    }

    /// Reads `selected_temp`, rejecting values outside the known tiers.
    fn of(node_type: &NodeType, status: &Status) -> Result<Self> {
        match require_str("selected_temp", node_type, status)? {
            "comfort" => Ok(Self::Comfort),
            "eco" => Ok(Self::Eco),
            "ice" => Ok(Self::Ice),
            other => Err(unexpected_selected_temp(node_type, status, other)),
        }
    }
}

fn unexpected_selected_temp(node_type: &NodeType, status: &Status, value: &str) -> Error {
    LookupError::UnexpectedValue {
        field: "selected_temp".to_string(),
        value: value.to_string(),
        node_type: node_type.to_string(),
        context: Value::Object(status.clone()).to_string(),
    }
    .into()
}

fn unknown_mode(mode: &str) -> Error {
    tracing::error!(mode = %mode, "Unknown smartbox node mode");
    ValueError::UnknownMode(mode.to_string()).into()
}

fn patch(value: Value) -> StatusPatch {
    match value {
        Value::Object(map) => map,
        _ => StatusPatch::new(),
    }
}

/// Derives the HVAC mode from a node status.
///
/// `off`, or an `htr_mod` node whose `on` flag is false, is
/// [`HvacMode::Off`]; `manual` is [`HvacMode::Heat`]; the schedule and
/// learning driven modes (`auto`, `modified_auto`, `self_learn`,
/// `presence`) all collapse to [`HvacMode::Auto`].
///
/// # Errors
///
/// Returns a lookup error if `mode` (or `on`, for `htr_mod`) is missing and
/// `ValueError::UnknownMode` for any other mode string.
pub fn get_hvac_mode(node_type: &NodeType, status: &Status) -> Result<HvacMode> {
    let mode = require_str("mode", node_type, status)?;
    if mode == "off" || (node_type.is_mod() && !require_bool("on", node_type, status)?) {
        return Ok(HvacMode::Off);
    }
    match mode {
        "manual" => Ok(HvacMode::Heat),
        // modified_auto is reported when the temperature was changed while
        // running the schedule.
        "auto" | "modified_auto" | "self_learn" | "presence" => Ok(HvacMode::Auto),
        other => Err(unknown_mode(other)),
    }
}

/// Builds the status patch that switches a node to `hvac_mode`.
///
/// # Errors
///
/// Returns `ValueError::UnsupportedHvacMode` for modes other than off, heat
/// and auto, and a lookup error if an `htr_mod` node switching to heat has
/// no `selected_temp` to carry over.
pub fn set_hvac_mode_args(
    node_type: &NodeType,
    status: &Status,
    hvac_mode: HvacMode,
) -> Result<StatusPatch> {
    if node_type.is_mod() {
        return match hvac_mode {
            HvacMode::Off => Ok(patch(json!({"on": false}))),
            HvacMode::Heat => {
                let selected_temp = require("selected_temp", node_type, status)?.clone();
                Ok(patch(json!({
                    "selected_temp": selected_temp,
                    "on": true,
                    "mode": "manual",
                })))
            }
            HvacMode::Auto => Ok(patch(json!({"on": true, "mode": "auto"}))),
            other => Err(ValueError::UnsupportedHvacMode(other.to_string()).into()),
        };
    }
    match hvac_mode {
        HvacMode::Off => Ok(patch(json!({"mode": "off"}))),
        HvacMode::Heat => Ok(patch(json!({"mode": "manual"}))),
        HvacMode::Auto => Ok(patch(json!({"mode": "auto"}))),
        other => Err(ValueError::UnsupportedHvacMode(other.to_string()).into()),
    }
}

/// Reads the temperature the node is currently aiming for.
///
/// `htr_mod` nodes derive it from the selected tier: `comfort_temp`,
/// `comfort_temp - eco_offset` or `ice_temp`. Other heaters report it in
/// `stemp`.
///
/// # Errors
///
/// Returns a lookup error when a required field is missing or
/// `selected_temp` holds an unknown tier.
pub fn get_target_temperature(node_type: &NodeType, status: &Status) -> Result<f64> {
    if !node_type.is_mod() {
        return require_f64("stemp", node_type, status);
    }
    match SelectedTemp::of(node_type, status)? {
        SelectedTemp::Comfort => require_f64("comfort_temp", node_type, status),
        SelectedTemp::Eco => {
            let comfort = require_f64("comfort_temp", node_type, status)?;
            let offset = require_f64("eco_offset", node_type, status)?;
            Ok(comfort - offset)
        }
        SelectedTemp::Ice => require_f64("ice_temp", node_type, status),
    }
}

/// Builds the status patch that sets the target temperature to `temp`.
///
/// On `htr_mod` nodes the comfort temperature is what gets written: in eco
/// the eco offset is added back so the effective target becomes `temp`.
///
/// # Errors
///
/// Returns a lookup error when `units` (or a tier field) is missing and
/// `ValueError::TemperatureInFrostMode` when an `htr_mod` node is on its
/// ice tier.
pub fn set_temperature_args(
    node_type: &NodeType,
    status: &Status,
    temp: f64,
) -> Result<StatusPatch> {
    let units = require("units", node_type, status)?.clone();
    if !node_type.is_mod() {
        return Ok(patch(json!({
            "stemp": format_temperature(temp),
            "units": units,
        })));
    }

    let selected = SelectedTemp::of(node_type, status)?;
    let target = match selected {
        SelectedTemp::Comfort => temp,
        SelectedTemp::Eco => temp + require_f64("eco_offset", node_type, status)?,
        SelectedTemp::Ice => return Err(ValueError::TemperatureInFrostMode.into()),
    };
    Ok(patch(json!({
        "on": true,
        "mode": require("mode", node_type, status)?.clone(),
        "selected_temp": selected.as_str(),
        "comfort_temp": format_temperature(target),
        "eco_offset": require("eco_offset", node_type, status)?.clone(),
        "units": units,
    })))
}

/// Derives the preset mode shown for a node.
///
/// A device in away mode always shows [`PresetMode::Away`]. Otherwise
/// `htr_mod` nodes map their mode and tier to a preset, and other heaters
/// show [`PresetMode::Home`].
///
/// # Errors
///
/// Returns a value error for `htr_mod` statuses whose mode or tier has no
/// preset, and a lookup error when `mode` or `selected_temp` is missing.
pub fn get_preset_mode(node_type: &NodeType, status: &Status, away: bool) -> Result<PresetMode> {
    if away {
        return Ok(PresetMode::Away);
    }
    if !node_type.is_mod() {
        return Ok(PresetMode::Home);
    }
    match require_str("mode", node_type, status)? {
        "manual" => match require_str("selected_temp", node_type, status)? {
            "comfort" => Ok(PresetMode::Comfort),
            "eco" => Ok(PresetMode::Eco),
            "ice" => Ok(PresetMode::Frost),
            other => {
                tracing::error!(
                    selected_temp = %other,
                    node_type = %node_type,
                    "Unknown smartbox selected_temp"
                );
                Err(ValueError::UnknownSelectedTemp {
                    value: other.to_string(),
                    node_type: node_type.to_string(),
                }
                .into())
            }
        },
        "auto" => Ok(PresetMode::Schedule),
        "presence" => Ok(PresetMode::Activity),
        "self_learn" => Ok(PresetMode::SelfLearn),
        other => Err(unknown_mode(other)),
    }
}

/// Presets a node of the given type offers.
#[must_use]
pub fn preset_modes(node_type: &NodeType) -> Vec<PresetMode> {
    if node_type.is_mod() {
        vec![
            PresetMode::Activity,
            PresetMode::Comfort,
            PresetMode::Eco,
            PresetMode::Frost,
            PresetMode::Schedule,
            PresetMode::SelfLearn,
            PresetMode::Away,
        ]
    } else {
        vec![PresetMode::Home, PresetMode::Away]
    }
}

/// Builds the status patch selecting `preset_mode` on an `htr_mod` node.
///
/// # Errors
///
/// Returns `ValueError::UnsupportedPreset` for node types without presets.
///
/// # Panics
///
/// Panics if `preset_mode` is [`PresetMode::Home`] or [`PresetMode::Away`]:
/// those presets are applied through the device away status, never through
/// a node status patch.
pub fn set_preset_mode_status_update(
    node_type: &NodeType,
    status: &Status,
    preset_mode: PresetMode,
) -> Result<StatusPatch> {
    assert!(
        !preset_mode.is_away_status(),
        "preset {preset_mode} is applied through the device away status"
    );
    if !node_type.is_mod() {
        return Err(ValueError::UnsupportedPreset {
            preset: preset_mode.to_string(),
            node_type: node_type.to_string(),
        }
        .into());
    }
    let selected_temp = match preset_mode {
        PresetMode::Schedule => return set_hvac_mode_args(node_type, status, HvacMode::Auto),
        PresetMode::SelfLearn => return Ok(patch(json!({"on": true, "mode": "self_learn"}))),
        PresetMode::Activity => return Ok(patch(json!({"on": true, "mode": "presence"}))),
        PresetMode::Comfort => SelectedTemp::Comfort,
        PresetMode::Eco => SelectedTemp::Eco,
        PresetMode::Frost => SelectedTemp::Ice,
        PresetMode::Home | PresetMode::Away => unreachable!("rejected above"),
    };
    Ok(patch(json!({
        "on": true,
        "mode": "manual",
        "selected_temp": selected_temp.as_str(),
    })))
}

/// Reads the temperature unit of a status.
///
/// # Errors
///
/// Returns `ValueError::UnknownUnit` for units other than `C` and `F`.
pub fn get_temperature_unit(status: &Status) -> Result<Option<TemperatureUnit>> {
    let Some(units) = status.get("units") else {
        return Ok(None);
    };
    let code = units.as_str().ok_or_else(|| ValueError::UnknownUnit(units.to_string()))?;
    Ok(Some(code.parse()?))
}

/// Reads the measured room temperature (`mtemp`).
///
/// # Errors
///
/// Returns a lookup error if `mtemp` is missing.
pub fn current_temperature(node_type: &NodeType, status: &Status) -> Result<f64> {
    require_f64("mtemp", node_type, status)
}

/// Returns `true` if the heater is drawing power.
///
/// Storage heaters report this in `charging`, other heaters in `active`.
///
/// # Errors
///
/// Returns a lookup error if the relevant field is missing.
pub fn is_heating(node_type: &NodeType, status: &Status) -> Result<bool> {
    let key = if matches!(node_type, NodeType::Acm) {
        "charging"
    } else {
        "active"
    };
    require_bool(key, node_type, status)
}

/// Derives what the heater is currently doing.
///
/// # Errors
///
/// Propagates the errors of [`get_hvac_mode`] and [`is_heating`].
pub fn hvac_action(node_type: &NodeType, status: &Status) -> Result<HvacAction> {
    if get_hvac_mode(node_type, status)? == HvacMode::Off {
        return Ok(HvacAction::Off);
    }
    if is_heating(node_type, status)? {
        Ok(HvacAction::Heating)
    } else {
        Ok(HvacAction::Idle)
    }
}
