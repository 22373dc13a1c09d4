// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-side climate vocabulary: HVAC modes, actions and presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// HVAC mode as understood by the home-automation host.
///
/// Heaters only ever report or accept [`Off`](Self::Off),
/// [`Heat`](Self::Heat) and [`Auto`](Self::Auto); the remaining variants
/// exist so that a host request can be represented and rejected.
///
/// # Examples
///
/// ```
/// use smartbox_lib::types::HvacMode;
///
/// assert_eq!("heat".parse::<HvacMode>().unwrap(), HvacMode::Heat);
/// assert_eq!(HvacMode::Auto.as_str(), "auto");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    /// Heating disabled.
    Off,
    /// Manual heating to a target temperature.
    Heat,
    /// Cooling.
    Cool,
    /// Heating and cooling to a range.
    HeatCool,
    /// Schedule or learning driven operation.
    Auto,
    /// Dehumidifying.
    Dry,
    /// Fan only.
    FanOnly,
}

impl HvacMode {
    /// Returns the host string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::HeatCool => "heat_cool",
            Self::Auto => "auto",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        }
    }

    /// HVAC modes a heater node offers.
    #[must_use]
    pub const fn heater_modes() -> [HvacMode; 3] {
        [Self::Heat, Self::Auto, Self::Off]
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "heat_cool" => Ok(Self::HeatCool),
            "auto" => Ok(Self::Auto),
            "dry" => Ok(Self::Dry),
            "fan_only" => Ok(Self::FanOnly),
            _ => Err(ValueError::UnsupportedHvacMode(s.to_string())),
        }
    }
}

/// What the heater is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    /// Switched off.
    Off,
    /// Actively heating (or charging, for storage heaters).
    Heating,
    /// On but not drawing power.
    Idle,
}

impl HvacAction {
    /// Returns the host string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heating => "heating",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preset modes exposed to the host.
///
/// `Home` and `Away` are backed by the device-wide away status; every other
/// preset is backed by the node's own `mode`/`selected_temp` fields and is
/// only offered by `htr_mod` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetMode {
    /// Occupied; device away status cleared.
    Home,
    /// Device away status set.
    Away,
    /// Manual, comfort tier.
    Comfort,
    /// Manual, eco tier.
    Eco,
    /// Manual, ice (frost protection) tier.
    Frost,
    /// Follows the programmed schedule.
    Schedule,
    /// Presence detection driven.
    Activity,
    /// Self-learning.
    SelfLearn,
}

impl PresetMode {
    /// Returns the host string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
            Self::Comfort => "comfort",
            Self::Eco => "eco",
            Self::Frost => "frost",
            Self::Schedule => "schedule",
            Self::Activity => "activity",
            Self::SelfLearn => "self_learn",
        }
    }

    /// Returns `true` for the presets backed by device away status.
    #[must_use]
    pub const fn is_away_status(&self) -> bool {
        matches!(self, Self::Home | Self::Away)
    }
}

impl fmt::Display for PresetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Self::Home),
            "away" => Ok(Self::Away),
            "comfort" => Ok(Self::Comfort),
            "eco" => Ok(Self::Eco),
            "frost" => Ok(Self::Frost),
            "schedule" => Ok(Self::Schedule),
            "activity" => Ok(Self::Activity),
            "self_learn" => Ok(Self::SelfLearn),
            _ => Err(ValueError::InvalidField {
                field: "preset_mode".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hvac_mode_parse_rejects_unknown() {
        assert!(matches!(
            "boost".parse::<HvacMode>(),
            Err(ValueError::UnsupportedHvacMode(_))
        ));
    }

    #[test]
    fn hvac_mode_strings_round_trip() {
        for mode in [
            HvacMode::Off,
            HvacMode::Heat,
            HvacMode::Cool,
            HvacMode::HeatCool,
            HvacMode::Auto,
            HvacMode::Dry,
            HvacMode::FanOnly,
        ] {
            assert_eq!(mode.as_str().parse::<HvacMode>().unwrap(), mode);
        }
    }

    #[test]
    fn preset_away_status_flags() {
        assert!(PresetMode::Home.is_away_status());
        assert!(PresetMode::Away.is_away_status());
        assert!(!PresetMode::Schedule.is_away_status());
    }

    #[test]
    fn preset_serde_snake_case() {
        let json = serde_json::to_string(&PresetMode::SelfLearn).unwrap();
        assert_eq!(json, "\"self_learn\"");
    }
}
