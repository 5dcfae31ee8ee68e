// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Configuration for the Rithmic session engine.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    common::{
        consts::{
            DEFAULT_CLOSE_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_IDLE_TIMEOUT_SECS,
            DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_MAX_MESSAGES, DEFAULT_RETRY_ATTEMPTS,
            DEFAULT_RETRY_DELAY_SECS, DEFAULT_WS_PING_INTERVAL_SECS, RITHMIC_APP_NAME,
            RITHMIC_APP_VERSION, RITHMIC_DEFAULT_SYSTEM_NAME, RITHMIC_TEMPLATE_VERSION,
        },
        enums::RithmicPlant,
        urls::{RITHMIC_TEST_WS_URL, is_secure_url},
    },
    error::{RithmicError, RithmicResult},
    websocket::transport::RetryPolicy,
};

pub const ENV_URI: &str = "RITHMIC_URI";
pub const ENV_SYSTEM_NAME: &str = "RITHMIC_SYSTEM_NAME";
pub const ENV_CERT_PATH: &str = "RITHMIC_CERT_PATH";

/// Configuration for a Rithmic session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RithmicConfig {
    /// The WebSocket endpoint, `ws://` or `wss://`.
    pub uri: String,
    /// The Rithmic system to log into.
    pub system_name: String,
    /// The plant (infrastructure type) requested at login.
    pub plant: RithmicPlant,
    pub app_name: String,
    pub app_version: String,
    pub template_version: String,
    /// PEM trust bundle used for `wss://` endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<PathBuf>,
    /// Connect attempts including the first.
    pub retry_attempts: u32,
    /// Backoff base; attempt `n` (0-indexed) is followed by `delay * 2^n`.
    pub retry_delay_secs: f64,
    pub connect_timeout_secs: Option<u64>,
    pub login_timeout_secs: Option<u64>,
    /// Idle wait before a heartbeat is sent.
    pub idle_timeout_secs: f64,
    /// WebSocket-level keepalive ping interval.
    pub ws_ping_interval_secs: Option<u64>,
    /// Wait for the peer to acknowledge the close handshake.
    pub close_timeout_secs: u64,
    /// Upper bound on messages consumed after the snapshot request.
    pub max_messages: u64,
}

impl Default for RithmicConfig {
    fn default() -> Self {
        Self {
            uri: RITHMIC_TEST_WS_URL.to_string(),
            system_name: RITHMIC_DEFAULT_SYSTEM_NAME.to_string(),
            plant: RithmicPlant::Pnl,
            app_name: RITHMIC_APP_NAME.to_string(),
            app_version: RITHMIC_APP_VERSION.to_string(),
            template_version: RITHMIC_TEMPLATE_VERSION.to_string(),
            cert_path: None,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            connect_timeout_secs: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            login_timeout_secs: Some(DEFAULT_LOGIN_TIMEOUT_SECS),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            ws_ping_interval_secs: Some(DEFAULT_WS_PING_INTERVAL_SECS),
            close_timeout_secs: DEFAULT_CLOSE_TIMEOUT_SECS,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl RithmicConfig {
    /// Creates a configuration for `uri` and `system_name` with defaults elsewhere.
    pub fn new(uri: impl Into<String>, system_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            system_name: system_name.into(),
            ..Default::default()
        }
    }

    /// Loads a configuration from a JSON file; absent fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> RithmicResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Applies `RITHMIC_URI`, `RITHMIC_SYSTEM_NAME` and `RITHMIC_CERT_PATH` when set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup(ENV_URI) {
            self.uri = uri;
        }
        if let Some(system_name) = lookup(ENV_SYSTEM_NAME) {
            self.system_name = system_name;
        }
        if let Some(cert_path) = lookup(ENV_CERT_PATH) {
            self.cert_path = Some(PathBuf::from(cert_path));
        }
        self
    }

    /// Checks the configuration for values the session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicError::Config`] describing the first invalid value.
    pub fn validate(&self) -> RithmicResult<()> {
        if !self.uri.starts_with("ws://") && !is_secure_url(&self.uri) {
            return Err(RithmicError::Config(format!(
                "uri must use ws:// or wss://, was {:?}",
                self.uri
            )));
        }
        if self.system_name.is_empty() {
            return Err(RithmicError::Config("system_name is empty".to_string()));
        }
        if !self.retry_delay_secs.is_finite() || self.retry_delay_secs < 0.0 {
            return Err(RithmicError::Config(format!(
                "retry_delay_secs must be non-negative, was {}",
                self.retry_delay_secs
            )));
        }
        if !self.idle_timeout_secs.is_finite() || self.idle_timeout_secs <= 0.0 {
            return Err(RithmicError::Config(format!(
                "idle_timeout_secs must be positive, was {}",
                self.idle_timeout_secs
            )));
        }
        if self.max_messages == 0 {
            return Err(RithmicError::Config("max_messages is zero".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_secs_f64(self.retry_delay_secs.max(0.0)),
        )
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn login_timeout(&self) -> Option<Duration> {
        self.login_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.idle_timeout_secs.max(0.0))
    }

    #[must_use]
    pub fn ws_ping_interval(&self) -> Option<Duration> {
        self.ws_ping_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    #[must_use]
    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}
