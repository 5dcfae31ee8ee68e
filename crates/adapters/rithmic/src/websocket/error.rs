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

//! Error types produced by the Rithmic session engine.

use std::{fmt::Debug, time::Duration};

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::websocket::enums::SessionState;

#[derive(Error, Debug)]
pub enum RithmicWsError {
    /// Connecting failed, either fatally or after exhausting retries.
    #[error("Connect failure to {uri} after {attempts} attempt(s): {reason}")]
    ConnectFailure {
        uri: String,
        attempts: u32,
        reason: String,
    },

    /// A reset-type transport error during connect, retried with backoff.
    #[error("Connection reset: {0}")]
    ConnectionReset(String),

    #[error("TLS setup failure: {0}")]
    TlsSetupFailure(String),

    /// Fewer bytes than the length prefix were received.
    #[error("Malformed frame: {len} byte(s) is shorter than the 4-byte length prefix")]
    MalformedFrame { len: usize },

    /// The payload did not match the schema registered for its template id.
    #[error("Decode failure for template id {template_id}: {reason}")]
    DecodeFailure { template_id: i32, reason: String },

    #[error("Login rejected (rp_code: {rp_code:?}, user_msg: {user_msg:?})")]
    LoginRejected {
        rp_code: Vec<String>,
        user_msg: Vec<String>,
    },

    #[error("Request rejected by template id {template_id} (rp_code: {rp_code:?})")]
    RequestRejected {
        template_id: i32,
        rp_code: Vec<String>,
    },

    #[error("Send failure: {0}")]
    SendFailure(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout during {operation} after {duration:?}")]
    Timeout {
        operation: &'static str,
        duration: Duration,
    },

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

pub type RithmicWsResult<T> = Result<T, RithmicWsError>;

impl RithmicWsError {
    /// Determines if the error is retried by the connect loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RithmicWsError::ConnectionReset(_))
    }

    /// Determines if the error aborts the session lifecycle.
    ///
    /// Decode failures are isolated to a single message and a closed
    /// connection ends the consume loop without error.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RithmicWsError::DecodeFailure { .. }
                | RithmicWsError::ConnectionClosed
                | RithmicWsError::ConnectionReset(_)
        )
    }
}

impl From<tungstenite::Error> for RithmicWsError {
    fn from(error: tungstenite::Error) -> Self {
        match error {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::ConnectionClosed
            }
            tungstenite::Error::Io(e) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                Self::ConnectionReset(e.to_string())
            }
            other => Self::Transport(other.to_string()),
        }
    }
}
