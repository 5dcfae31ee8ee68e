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

//! Protocol constants for the Rithmic R|Protocol API.
//!
//! Template ids are fixed by the protocol and identify the schema of every
//! message carried on the wire.

/// Login request.
pub const TEMPLATE_LOGIN_REQUEST: i32 = 10;
/// Login response.
pub const TEMPLATE_LOGIN_RESPONSE: i32 = 11;
/// Logout request.
pub const TEMPLATE_LOGOUT_REQUEST: i32 = 12;
/// Logout response.
pub const TEMPLATE_LOGOUT_RESPONSE: i32 = 13;
/// System info request.
pub const TEMPLATE_SYSTEM_INFO_REQUEST: i32 = 16;
/// System info response.
pub const TEMPLATE_SYSTEM_INFO_RESPONSE: i32 = 17;
/// Heartbeat request.
pub const TEMPLATE_HEARTBEAT_REQUEST: i32 = 18;
/// Heartbeat response.
pub const TEMPLATE_HEARTBEAT_RESPONSE: i32 = 19;
/// PnL position snapshot request.
pub const TEMPLATE_PNL_SNAPSHOT_REQUEST: i32 = 402;
/// PnL position snapshot response (query acknowledgement).
pub const TEMPLATE_PNL_SNAPSHOT_RESPONSE: i32 = 403;
/// Instrument-level PnL position update.
pub const TEMPLATE_INSTRUMENT_PNL_UPDATE: i32 = 450;
/// Account-level PnL position update.
pub const TEMPLATE_ACCOUNT_PNL_UPDATE: i32 = 451;

/// Result code signalling success.
pub const RP_CODE_SUCCESS: &str = "0";

/// Protocol template version sent with the login request.
pub const RITHMIC_TEMPLATE_VERSION: &str = "3.9";

/// Default client application name announced on login.
pub const RITHMIC_APP_NAME: &str = "CHANGE_ME:rithmic-pnl-snapshot";

/// Default client application version announced on login.
pub const RITHMIC_APP_VERSION: &str = "0.1.0.0";

/// Default system name to log into.
pub const RITHMIC_DEFAULT_SYSTEM_NAME: &str = "Rithmic Paper Trading";

/// WebSocket close code for a normal closure.
pub const WS_CLOSE_NORMAL: u16 = 1000;

/// Reason sent with the normal closure frame.
pub const WS_CLOSE_REASON: &str = "see you tomorrow";

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: f64 = 2.0;
pub const DEFAULT_IDLE_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WS_PING_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_CLOSE_TIMEOUT_SECS: u64 = 5;

/// Hard cap on the number of messages consumed by one streaming loop.
pub const DEFAULT_MAX_MESSAGES: u64 = 100_000;
