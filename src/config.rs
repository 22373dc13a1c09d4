// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Account and session configuration.
//!
//! These settings are consumed by session implementations; the library
//! itself only validates them and derives retry delays.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Credentials and session options for one Smartbox account.
///
/// # Examples
///
/// ```
/// use smartbox_lib::config::{SessionOptions, SmartboxConfig};
///
/// let config = SmartboxConfig::new("api-helki", "user@example.com", "secret", "Basic abc=")
///     .with_options(SessionOptions::default().with_session_retry_attempts(5));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.options.session_retry_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartboxConfig {
    /// Name of the vendor API (selects the cloud endpoint).
    pub api_name: String,
    /// Account user name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// HTTP basic auth credentials of the vendor app.
    pub basic_auth_creds: String,
    /// Retry and reconnection settings.
    #[serde(flatten)]
    pub options: SessionOptions,
}

impl SmartboxConfig {
    /// Creates a configuration with default session options.
    #[must_use]
    pub fn new(
        api_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        basic_auth_creds: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            username: username.into(),
            password: password.into(),
            basic_auth_creds: basic_auth_creds.into(),
            options: SessionOptions::default(),
        }
    }

    /// Sets the session options.
    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks that credentials are present and options are usable.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidConfiguration` naming the first problem.
    pub fn validate(&self) -> Result<(), ValueError> {
        for (name, value) in [
            ("api_name", &self.api_name),
            ("username", &self.username),
            ("password", &self.password),
            ("basic_auth_creds", &self.basic_auth_creds),
        ] {
            if value.trim().is_empty() {
                return Err(ValueError::InvalidConfiguration(format!("{name} is empty")));
            }
        }
        self.options.validate()
    }
}

/// Retry and reconnection settings for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Attempts for each API request.
    pub session_retry_attempts: u32,
    /// Backoff factor between API request attempts, in seconds.
    pub session_backoff_factor: f64,
    /// Attempts to reconnect the push socket.
    pub socket_reconnect_attempts: u32,
    /// Backoff factor between socket reconnections, in seconds.
    pub socket_backoff_factor: f64,
}

/// Delay before retry `attempt`: `factor * 2^attempt` seconds.
///
/// A zero factor never waits, whatever the attempt.
fn backoff(factor: f64, attempt: u32) -> Duration {
    if factor <= 0.0 {
        return Duration::ZERO;
    }
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    Duration::try_from_secs_f64(factor * 2f64.powi(exponent)).unwrap_or(Duration::MAX)
}

impl SessionOptions {
    /// Sets the API request attempts.
    #[must_use]
    pub fn with_session_retry_attempts(mut self, attempts: u32) -> Self {
        self.session_retry_attempts = attempts;
        self
    }

    /// Sets the API request backoff factor.
    #[must_use]
    pub fn with_session_backoff_factor(mut self, factor: f64) -> Self {
        self.session_backoff_factor = factor;
        self
    }

    /// Sets the socket reconnection attempts.
    #[must_use]
    pub fn with_socket_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.socket_reconnect_attempts = attempts;
        self
    }

    /// Sets the socket reconnection backoff factor.
    #[must_use]
    pub fn with_socket_backoff_factor(mut self, factor: f64) -> Self {
        self.socket_backoff_factor = factor;
        self
    }

    /// Checks that both backoff factors are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidConfiguration` for a bad factor.
    pub fn validate(&self) -> Result<(), ValueError> {
        for (name, factor) in [
            ("session_backoff_factor", self.session_backoff_factor),
            ("socket_backoff_factor", self.socket_backoff_factor),
        ] {
            if !factor.is_finite() || factor < 0.0 {
                return Err(ValueError::InvalidConfiguration(format!(
                    "{name} must be a non-negative number, got {factor}"
                )));
            }
        }
        Ok(())
    }

    /// Returns the delay before API request retry `attempt`.
    #[must_use]
    pub fn session_backoff(&self, attempt: u32) -> Duration {
        backoff(self.session_backoff_factor, attempt)
    }

    /// Returns the delay before socket reconnection `attempt`.
    #[must_use]
    pub fn socket_backoff(&self, attempt: u32) -> Duration {
        backoff(self.socket_backoff_factor, attempt)
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            session_retry_attempts: 8,
            session_backoff_factor: 0.1,
            socket_reconnect_attempts: 3,
            socket_backoff_factor: 0.1,
        }
    }
}
