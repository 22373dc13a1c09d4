// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature units and the vendor's textual rendering of temperatures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Temperature unit reported in a node's `units` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Degrees Celsius (`"C"`).
    #[serde(rename = "C")]
    Celsius,
    /// Degrees Fahrenheit (`"F"`).
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Returns the vendor code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Returns the display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TemperatureUnit {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            _ => Err(ValueError::UnknownUnit(s.to_string())),
        }
    }
}

/// Renders a temperature the way the vendor API expects it in a status
/// patch: integral values keep one decimal (`22.0`), others use the shortest
/// representation that round-trips (`21.5`).
///
/// # Examples
///
/// ```
/// use smartbox_lib::types::format_temperature;
///
/// assert_eq!(format_temperature(22.0), "22.0");
/// assert_eq!(format_temperature(19.5), "19.5");
/// ```
#[must_use]
pub fn format_temperature(temp: f64) -> String {
    // f64's Debug output is shortest round-trip and keeps ".0" on integers.
    format!("{temp:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_parse() {
        assert_eq!("C".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!(
            "K".parse::<TemperatureUnit>(),
            Err(ValueError::UnknownUnit("K".to_string()))
        );
    }

    #[test]
    fn unit_symbol() {
        assert_eq!(TemperatureUnit::Celsius.to_string(), "°C");
        assert_eq!(TemperatureUnit::Fahrenheit.code(), "F");
    }

    #[test]
    fn format_keeps_single_decimal_for_integers() {
        assert_eq!(format_temperature(20.0), "20.0");
        assert_eq!(format_temperature(-3.0), "-3.0");
    }

    #[test]
    fn format_uses_shortest_representation() {
        assert_eq!(format_temperature(21.5), "21.5");
        assert_eq!(format_temperature(0.1 + 0.2), "0.30000000000000004");
    }
}
