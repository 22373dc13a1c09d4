// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device power limit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Maximum power a hub may draw across all its heaters, in watts.
///
/// The hub accepts limits between 0 (no limit) and 9999 W.
///
/// # Examples
///
/// ```
/// use smartbox_lib::types::PowerLimit;
///
/// let limit = PowerLimit::new(2500).unwrap();
/// assert_eq!(limit.watts(), 2500);
///
/// assert!(PowerLimit::new(10_000).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct PowerLimit(u16);

impl PowerLimit {
    /// Smallest accepted limit.
    pub const MIN: Self = Self(0);

    /// Largest accepted limit.
    pub const MAX: Self = Self(9999);

    /// Creates a power limit.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `watts` is negative or above 9999.
    pub fn new(watts: i64) -> Result<Self, ValueError> {
        if !(i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&watts) {
            return Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN.0),
                max: i64::from(Self::MAX.0),
                actual: watts,
            });
        }
        Ok(Self(u16::try_from(watts).unwrap_or(Self::MAX.0)))
    }

    /// Returns the limit in watts.
    #[must_use]
    pub const fn watts(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for PowerLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} W", self.0)
    }
}

impl TryFrom<i64> for PowerLimit {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PowerLimit> for i64 {
    fn from(value: PowerLimit) -> Self {
        i64::from(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(PowerLimit::new(0).unwrap(), PowerLimit::MIN);
        assert_eq!(PowerLimit::new(9999).unwrap(), PowerLimit::MAX);
    }

    #[test]
    fn rejects_negative_and_too_large() {
        assert_eq!(
            PowerLimit::new(-1),
            Err(ValueError::OutOfRange {
                min: 0,
                max: 9999,
                actual: -1
            })
        );
        assert!(PowerLimit::new(10_000).is_err());
    }

    #[test]
    fn display_in_watts() {
        assert_eq!(PowerLimit::new(1200).unwrap().to_string(), "1200 W");
    }

    #[test]
    fn deserialize_validates() {
        let ok: PowerLimit = serde_json::from_str("1500").unwrap();
        assert_eq!(ok.watts(), 1500);
        assert!(serde_json::from_str::<PowerLimit>("12000").is_err());
    }
}
