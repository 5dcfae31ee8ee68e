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

//! Template-id based dispatch of Rithmic payloads into typed messages.
//!
//! Dispatch is two-phase: [`classify`] decodes only the [`Base`] envelope so
//! it succeeds even when the full schema would not, then
//! [`MessageDispatcher::decode`] runs the decoder registered for the template id.

use std::{collections::HashMap, fmt::Debug};

use prost::Message;

use super::{
    error::{RithmicWsError, RithmicWsResult},
    messages::{
        AccountPnLPositionUpdate, Base, InstrumentPnLPositionUpdate, ResponseHeartbeat,
        ResponseLogin, ResponseLogout, ResponsePnLPositionSnapshot, ResponseRithmicSystemInfo,
    },
};
use crate::common::consts::{
    TEMPLATE_ACCOUNT_PNL_UPDATE, TEMPLATE_HEARTBEAT_RESPONSE, TEMPLATE_INSTRUMENT_PNL_UPDATE,
    TEMPLATE_LOGIN_RESPONSE, TEMPLATE_LOGOUT_RESPONSE, TEMPLATE_PNL_SNAPSHOT_RESPONSE,
    TEMPLATE_SYSTEM_INFO_RESPONSE,
};

/// Typed messages received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum RithmicMessage {
    LoginResponse(ResponseLogin),
    LogoutResponse(ResponseLogout),
    HeartbeatResponse(ResponseHeartbeat),
    SystemInfoResponse(ResponseRithmicSystemInfo),
    PnlSnapshotResponse(ResponsePnLPositionSnapshot),
    InstrumentPnlUpdate(InstrumentPnLPositionUpdate),
    AccountPnlUpdate(AccountPnLPositionUpdate),
    /// No decoder is registered for the template id.
    Unrecognized { template_id: i32 },
}

impl RithmicMessage {
    /// Returns the template id the message was dispatched under.
    #[must_use]
    pub fn template_id(&self) -> i32 {
        match self {
            Self::LoginResponse(msg) => msg.template_id,
            Self::LogoutResponse(msg) => msg.template_id,
            Self::HeartbeatResponse(msg) => msg.template_id,
            Self::SystemInfoResponse(msg) => msg.template_id,
            Self::PnlSnapshotResponse(msg) => msg.template_id,
            Self::InstrumentPnlUpdate(msg) => msg.template_id,
            Self::AccountPnlUpdate(msg) => msg.template_id,
            Self::Unrecognized { template_id } => *template_id,
        }
    }
}

/// Decoder turning a payload into a typed message.
pub type Decoder = Box<dyn Fn(&[u8]) -> Result<RithmicMessage, prost::DecodeError> + Send + Sync>;

/// Reads only the template id discriminator from a payload.
///
/// # Errors
///
/// Returns [`RithmicWsError::DecodeFailure`] (with template id 0) if the
/// payload is not a valid protobuf message.
pub fn classify(payload: &[u8]) -> RithmicWsResult<i32> {
    Base::decode(payload)
        .map(|base| base.template_id)
        .map_err(|e| RithmicWsError::DecodeFailure {
            template_id: 0,
            reason: e.to_string(),
        })
}

/// Dispatch table mapping template ids to decoders.
pub struct MessageDispatcher {
    decoders: HashMap<i32, Decoder>,
}

impl Debug for MessageDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.decoders.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct(stringify!(MessageDispatcher))
            .field("template_ids", &ids)
            .finish()
    }
}

impl Default for MessageDispatcher {
    /// Creates a dispatcher with decoders for every PnL plant response and update.
    fn default() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(TEMPLATE_LOGIN_RESPONSE, |buf| {
            ResponseLogin::decode(buf).map(RithmicMessage::LoginResponse)
        });
        dispatcher.register(TEMPLATE_LOGOUT_RESPONSE, |buf| {
            ResponseLogout::decode(buf).map(RithmicMessage::LogoutResponse)
        });
        dispatcher.register(TEMPLATE_SYSTEM_INFO_RESPONSE, |buf| {
            ResponseRithmicSystemInfo::decode(buf).map(RithmicMessage::SystemInfoResponse)
        });
        dispatcher.register(TEMPLATE_HEARTBEAT_RESPONSE, |buf| {
            ResponseHeartbeat::decode(buf).map(RithmicMessage::HeartbeatResponse)
        });
        dispatcher.register(TEMPLATE_PNL_SNAPSHOT_RESPONSE, |buf| {
            ResponsePnLPositionSnapshot::decode(buf).map(RithmicMessage::PnlSnapshotResponse)
        });
        dispatcher.register(TEMPLATE_INSTRUMENT_PNL_UPDATE, |buf| {
            InstrumentPnLPositionUpdate::decode(buf).map(RithmicMessage::InstrumentPnlUpdate)
        });
        dispatcher.register(TEMPLATE_ACCOUNT_PNL_UPDATE, |buf| {
            AccountPnLPositionUpdate::decode(buf).map(RithmicMessage::AccountPnlUpdate)
        });
        dispatcher
    }
}

impl MessageDispatcher {
    /// Creates a dispatcher with no registered decoders.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers (or replaces) the decoder for `template_id`.
    pub fn register<F>(&mut self, template_id: i32, decoder: F)
    where
        F: Fn(&[u8]) -> Result<RithmicMessage, prost::DecodeError> + Send + Sync + 'static,
    {
        self.decoders.insert(template_id, Box::new(decoder));
    }

    #[must_use]
    pub fn is_registered(&self, template_id: i32) -> bool {
        self.decoders.contains_key(&template_id)
    }

    /// Decodes `payload` with the decoder registered for `template_id`.
    ///
    /// Unregistered template ids yield [`RithmicMessage::Unrecognized`].
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::DecodeFailure`] if the payload does not match
    /// the registered schema.
    pub fn decode(&self, template_id: i32, payload: &[u8]) -> RithmicWsResult<RithmicMessage> {
        let Some(decoder) = self.decoders.get(&template_id) else {
            return Ok(RithmicMessage::Unrecognized { template_id });
        };

        decoder(payload).map_err(|e| RithmicWsError::DecodeFailure {
            template_id,
            reason: e.to_string(),
        })
    }

    /// Classifies and decodes a payload in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if either phase fails.
    pub fn dispatch(&self, payload: &[u8]) -> RithmicWsResult<RithmicMessage> {
        let template_id = classify(payload)?;
        self.decode(template_id, payload)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::websocket::messages::RequestHeartbeat;

    fn account_update_payload() -> Vec<u8> {
        AccountPnLPositionUpdate {
            template_id: TEMPLATE_ACCOUNT_PNL_UPDATE,
            account_id: Some("999999".to_string()),
            account_balance: Some("10000.0".to_string()),
            day_pnl: Some("50.0".to_string()),
            ..Default::default()
        }
        .encode_to_vec()
    }

    #[rstest]
    fn test_classify_reads_template_id_only() {
        assert_eq!(classify(&account_update_payload()).unwrap(), 451);
    }

    #[rstest]
    fn test_classify_garbage_fails() {
        let err = classify(&[0xFF, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, RithmicWsError::DecodeFailure { .. }));
    }

    #[rstest]
    fn test_dispatch_account_update() {
        let dispatcher = MessageDispatcher::default();
        let message = dispatcher.dispatch(&account_update_payload()).unwrap();

        match message {
            RithmicMessage::AccountPnlUpdate(update) => {
                assert_eq!(update.account_id.as_deref(), Some("999999"));
                assert_eq!(update.account_balance.as_deref(), Some("10000.0"));
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[rstest]
    fn test_unknown_template_id_is_unrecognized() {
        let dispatcher = MessageDispatcher::default();
        let payload = Base { template_id: 999 }.encode_to_vec();

        let message = dispatcher.dispatch(&payload).unwrap();
        assert_eq!(message, RithmicMessage::Unrecognized { template_id: 999 });
        assert_eq!(message.template_id(), 999);
    }

    #[rstest]
    fn test_classify_succeeds_when_full_decode_fails() {
        // Valid envelope followed by the symbol field (tag 110100) encoded as
        // a varint instead of a string.
        let mut payload = Base { template_id: 450 }.encode_to_vec();
        payload.extend_from_slice(&[0xA0, 0xE1, 0x35, 0x01]);

        assert_eq!(classify(&payload).unwrap(), 450);

        let err = MessageDispatcher::default()
            .decode(450, &payload)
            .unwrap_err();
        assert!(matches!(
            err,
            RithmicWsError::DecodeFailure {
                template_id: 450,
                ..
            }
        ));
    }

    #[rstest]
    fn test_register_custom_decoder() {
        let mut dispatcher = MessageDispatcher::empty();
        assert!(!dispatcher.is_registered(18));

        dispatcher.register(18, |buf| {
            RequestHeartbeat::decode(buf).map(|msg| RithmicMessage::Unrecognized {
                template_id: msg.template_id + 1000,
            })
        });

        let payload = RequestHeartbeat { template_id: 18 }.encode_to_vec();
        let message = dispatcher.dispatch(&payload).unwrap();
        assert_eq!(message.template_id(), 1018);
    }

    #[rstest]
    fn test_default_registers_pnl_plant_templates() {
        let dispatcher = MessageDispatcher::default();
        for template_id in [11, 13, 17, 19, 403, 450, 451] {
            assert!(dispatcher.is_registered(template_id), "{template_id}");
        }
        assert!(!dispatcher.is_registered(10));
    }
}
