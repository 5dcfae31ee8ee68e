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

//! Transport abstraction and connect-with-retry policy.
//!
//! The session engine only talks to a [`Transport`]: a persistent, message
//! framed connection which can send a unit, wait for the next unit with an
//! optional timeout, and perform an orderly close. A [`Connector`] opens one.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::{RithmicWsError, RithmicWsResult};
use crate::common::consts::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS};

/// Outcome of a bounded receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// One complete message unit, as delimited by the transport.
    Message(Vec<u8>),
    /// The timeout elapsed before a unit arrived.
    Timeout,
}

/// A connected, message-framed transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one unit.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::SendFailure`] if the connection is not open.
    async fn send(&self, data: Vec<u8>) -> RithmicWsResult<()>;

    /// Waits for the next unit, or until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::ConnectionClosed`] once the peer has closed.
    async fn receive(&self, timeout: Option<Duration>) -> RithmicWsResult<Received>;

    fn is_open(&self) -> bool;

    /// Performs the close handshake. Closing a closed connection is a no-op.
    async fn close(&self, code: u16, reason: &str) -> RithmicWsResult<()>;
}

/// Opens [`Transport`]s; one call is one connect attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport + 'static;

    /// Makes a single connect attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::ConnectionReset`] for reset-type failures,
    /// which [`connect_with_retry`] retries. Any other error is fatal.
    async fn connect(&self, uri: &str) -> RithmicWsResult<Self::Transport>;
}

/// Bounded exponential backoff for connect attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum attempts including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            base_delay: Duration::from_secs_f64(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay following the failed attempt `attempt` (0-indexed): `base * 2^attempt`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        match 1u32.checked_shl(attempt) {
            Some(multiplier) => self
                .base_delay
                .checked_mul(multiplier)
                .unwrap_or(Duration::MAX),
            None => Duration::MAX,
        }
    }
}

/// Connects through `connector`, retrying reset-type failures with backoff.
///
/// Each attempt is bounded by `attempt_timeout` when set; an elapsed attempt
/// is fatal and not retried.
///
/// # Errors
///
/// Returns [`RithmicWsError::ConnectFailure`] once attempts are exhausted or
/// on any non-retryable failure, [`RithmicWsError::TlsSetupFailure`] as is,
/// and [`RithmicWsError::Timeout`] when an attempt elapses.
pub async fn connect_with_retry<C>(
    connector: &C,
    uri: &str,
    policy: &RetryPolicy,
    attempt_timeout: Option<Duration>,
) -> RithmicWsResult<C::Transport>
where
    C: Connector + ?Sized,
{
    let mut last_reason = "no connect attempt made".to_string();

    for attempt in 0..policy.max_attempts {
        debug!(uri, attempt = attempt + 1, "Connecting");

        let result = match attempt_timeout {
            Some(duration) => tokio::time::timeout(duration, connector.connect(uri))
                .await
                .map_err(|_| RithmicWsError::Timeout {
                    operation: "connect",
                    duration,
                })?,
            None => connector.connect(uri).await,
        };

        match result {
            Ok(transport) => {
                debug!(uri, "Connected");
                return Ok(transport);
            }
            Err(e) if e.is_retryable() => {
                warn!(
                    "Connection reset by peer, attempt {} of {}: {e}",
                    attempt + 1,
                    policy.max_attempts
                );
                last_reason = e.to_string();

                if attempt + 1 < policy.max_attempts {
                    let delay = policy.backoff_delay(attempt);
                    debug!(?delay, "Backing off before next connect attempt");
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e @ RithmicWsError::TlsSetupFailure(_)) => return Err(e),
            Err(e @ RithmicWsError::ConnectFailure { .. }) => return Err(e),
            Err(e) => {
                return Err(RithmicWsError::ConnectFailure {
                    uri: uri.to_string(),
                    attempts: attempt + 1,
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(RithmicWsError::ConnectFailure {
        uri: uri.to_string(),
        attempts: policy.max_attempts,
        reason: last_reason,
    })
}
