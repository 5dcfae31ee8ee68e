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

//! Session lifecycle enums for the Rithmic adapter.

use serde::{Deserialize, Serialize};

/// Represents the lifecycle state of a [`RithmicSession`](super::session::RithmicSession).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Connect attempts in progress, possibly retrying with backoff.
    Connecting,
    Connected,
    LoggingIn,
    LoggedIn,
    RequestSent,
    /// Consuming streamed updates.
    Streaming,
    Done,
    LoggingOut,
    /// Terminal success state.
    Closed,
    /// Terminal failure state.
    Failed,
}

impl SessionState {
    /// Returns `true` for the two absorbing states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "DISCONNECTED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::LoggingIn => "LOGGING_IN",
            Self::LoggedIn => "LOGGED_IN",
            Self::RequestSent => "REQUEST_SENT",
            Self::Streaming => "STREAMING",
            Self::Done => "DONE",
            Self::LoggingOut => "LOGGING_OUT",
            Self::Closed => "CLOSED",
            Self::Failed => "FAILED",
        };
        write!(f, "{name}")
    }
}

/// Why a consume loop stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StreamEnd {
    /// A snapshot response with a non-empty result code was received.
    Completed,
    /// The message cap was reached before completion.
    MessageCap,
    /// The connection was observed closed.
    ConnectionClosed,
}
