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

//! URL helpers for Rithmic gateway endpoints.

/// Rithmic Test gateway, used for conformance testing and paper trading setups.
pub const RITHMIC_TEST_WS_URL: &str = "wss://rituz00100.rithmic.com:443";

/// Returns `true` when the URI requires a TLS-secured transport.
#[must_use]
pub fn is_secure_url(uri: &str) -> bool {
    uri.trim_start().to_ascii_lowercase().starts_with("wss://")
}

/// Extracts the `host[:port]` authority from a WebSocket URI, for logging.
#[must_use]
pub fn url_authority(uri: &str) -> &str {
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    rest.split(['/', '?']).next().unwrap_or(rest)
}
