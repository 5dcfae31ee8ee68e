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

//! Credentials for Rithmic sessions.
//!
//! The engine treats every field as an opaque string: the user and password
//! are sent with the login request, the FCM, IB and account ids identify the
//! account targeted by the PnL position snapshot request.

use std::fmt::Debug;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Rithmic login and account credentials.
#[derive(Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct RithmicCredential {
    /// The Rithmic username.
    pub user: String,
    /// The Rithmic password.
    pub password: String,
    /// Futures Commission Merchant id.
    pub fcm_id: String,
    /// Introducing Broker id.
    pub ib_id: String,
    /// The account name.
    pub account_id: String,
}

impl RithmicCredential {
    pub fn builder() -> RithmicCredentialBuilder {
        RithmicCredentialBuilder::default()
    }
}

impl Debug for RithmicCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RithmicCredential))
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("fcm_id", &self.fcm_id)
            .field("ib_id", &self.ib_id)
            .field("account_id", &self.account_id)
            .finish()
    }
}
