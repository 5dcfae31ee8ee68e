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

//! Testing utilities and fixtures for the Rithmic adapter.
//!
//! [`ScriptedTransport`] replays a queue of inbound events and records every
//! outbound frame, so the session engine can be driven without a network
//! endpoint. [`ScriptedConnector`] hands it out after an optional series of
//! failed connect attempts.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use prost::Message;
use tokio::time::Instant;

use crate::{
    common::consts::{
        RP_CODE_SUCCESS, TEMPLATE_ACCOUNT_PNL_UPDATE, TEMPLATE_INSTRUMENT_PNL_UPDATE,
        TEMPLATE_LOGIN_RESPONSE, TEMPLATE_PNL_SNAPSHOT_RESPONSE, TEMPLATE_SYSTEM_INFO_RESPONSE,
    },
    websocket::{
        error::{RithmicWsError, RithmicWsResult},
        frame::{decode_frame, encode_message},
        messages::{
            AccountPnLPositionUpdate, InstrumentPnLPositionUpdate, ResponseLogin,
            ResponsePnLPositionSnapshot, ResponseRithmicSystemInfo,
        },
        parse::classify,
        transport::{Connector, Received, Transport},
    },
};

/// An event replayed by [`ScriptedTransport::receive`].
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A complete wire unit.
    Frame(Vec<u8>),
    /// The receive wait elapses with nothing delivered.
    Idle,
    /// The peer goes away silently; the wait then elapses.
    Drop,
    /// The peer tears the socket down without a close handshake.
    Reset,
    /// The receive fails while the connection stays open.
    Error(String),
}

#[derive(Debug, Default)]
struct ScriptState {
    inbound: VecDeque<Inbound>,
    sent: Vec<Vec<u8>>,
    open: bool,
    close_frames: Vec<(u16, String)>,
}

/// In-memory [`Transport`] replaying scripted inbound events.
///
/// Once the script is exhausted the connection reports itself closed.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                open: true,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_frame(&self, wire: Vec<u8>) {
        self.lock().inbound.push_back(Inbound::Frame(wire));
    }

    pub fn push_message<M: Message>(&self, message: &M) {
        self.push_frame(encode_message(message));
    }

    pub fn push_idle(&self) {
        self.lock().inbound.push_back(Inbound::Idle);
    }

    pub fn push_drop(&self) {
        self.lock().inbound.push_back(Inbound::Drop);
    }

    pub fn push_reset(&self) {
        self.lock().inbound.push_back(Inbound::Reset);
    }

    pub fn push_error(&self, reason: &str) {
        self.lock()
            .inbound
            .push_back(Inbound::Error(reason.to_string()));
    }

    pub fn set_open(&self, open: bool) {
        self.lock().open = open;
    }

    /// Returns every frame sent so far, prefix included.
    #[must_use]
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    /// Returns the template ids of the frames sent so far.
    #[must_use]
    pub fn sent_template_ids(&self) -> Vec<i32> {
        self.sent()
            .iter()
            .filter_map(|wire| decode_frame(wire).ok())
            .filter_map(|frame| classify(&frame.payload).ok())
            .collect()
    }

    /// Returns the close handshakes performed, as `(code, reason)`.
    #[must_use]
    pub fn close_frames(&self) -> Vec<(u16, String)> {
        self.lock().close_frames.clone()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.lock().inbound.len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, data: Vec<u8>) -> RithmicWsResult<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(RithmicWsError::SendFailure(
                "connection is not open".to_string(),
            ));
        }
        state.sent.push(data);
        Ok(())
    }

    async fn receive(&self, _timeout: Option<Duration>) -> RithmicWsResult<Received> {
        let mut state = self.lock();
        match state.inbound.pop_front() {
            Some(Inbound::Frame(wire)) => Ok(Received::Message(wire)),
            Some(Inbound::Idle) => Ok(Received::Timeout),
            Some(Inbound::Drop) => {
                state.open = false;
                Ok(Received::Timeout)
            }
            Some(Inbound::Reset) => {
                state.open = false;
                Err(RithmicWsError::Transport(
                    "Connection reset without closing handshake".to_string(),
                ))
            }
            Some(Inbound::Error(reason)) => Err(RithmicWsError::Transport(reason)),
            None => {
                state.open = false;
                Err(RithmicWsError::ConnectionClosed)
            }
        }
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    async fn close(&self, code: u16, reason: &str) -> RithmicWsResult<()> {
        let mut state = self.lock();
        if !state.open {
            return Ok(());
        }
        state.open = false;
        state.close_frames.push((code, reason.to_string()));
        Ok(())
    }
}

/// [`Connector`] returning a shared [`ScriptedTransport`].
#[derive(Debug)]
pub struct ScriptedConnector {
    transport: ScriptedTransport,
    failures: Mutex<VecDeque<RithmicWsError>>,
    always_reset: bool,
    attempts: AtomicU32,
    attempt_times: Mutex<Vec<Instant>>,
}

impl ScriptedConnector {
    #[must_use]
    pub fn new(transport: ScriptedTransport) -> Self {
        Self {
            transport,
            failures: Mutex::new(VecDeque::new()),
            always_reset: false,
            attempts: AtomicU32::new(0),
            attempt_times: Mutex::new(Vec::new()),
        }
    }

    /// A connector whose every attempt is reset by the peer.
    #[must_use]
    pub fn always_reset() -> Self {
        Self {
            always_reset: true,
            ..Self::new(ScriptedTransport::new())
        }
    }

    /// Fails the next attempts with `failures`, in order, before connecting.
    #[must_use]
    pub fn with_failures(self, failures: Vec<RithmicWsError>) -> Self {
        *self.failures.lock().unwrap_or_else(PoisonError::into_inner) = failures.into();
        self
    }

    #[must_use]
    pub fn transport(&self) -> ScriptedTransport {
        self.transport.clone()
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Returns the (tokio) instants at which attempts were made.
    #[must_use]
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempt_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self, _uri: &str) -> RithmicWsResult<ScriptedTransport> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.attempt_times
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Instant::now());

        if self.always_reset {
            return Err(RithmicWsError::ConnectionReset(
                "connection reset by peer".to_string(),
            ));
        }

        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match failure {
            Some(error) => Err(error),
            None => Ok(self.transport.clone()),
        }
    }
}

/// Login response with the given result code.
#[must_use]
pub fn login_response(rp_code: &str) -> ResponseLogin {
    ResponseLogin {
        template_id: TEMPLATE_LOGIN_RESPONSE,
        template_version: Some("3.9".to_string()),
        user_msg: vec!["hello".to_string()],
        rp_code: vec![rp_code.to_string()],
        fcm_id: Some("Ironbeam".to_string()),
        ib_id: Some("Ironbeam".to_string()),
        country_code: Some("US".to_string()),
        state_code: Some("IL".to_string()),
        unique_user_id: Some("demo-session-1".to_string()),
        heartbeat_interval: Some(60.0),
    }
}

/// Snapshot response (query acknowledgement) with the given result codes.
#[must_use]
pub fn snapshot_response(rp_code: &[&str]) -> ResponsePnLPositionSnapshot {
    ResponsePnLPositionSnapshot {
        template_id: TEMPLATE_PNL_SNAPSHOT_RESPONSE,
        user_msg: vec!["hello".to_string()],
        rp_code: rp_code.iter().map(ToString::to_string).collect(),
    }
}

/// System info response listing `systems` with a success result code.
#[must_use]
pub fn system_info_response(systems: &[&str]) -> ResponseRithmicSystemInfo {
    ResponseRithmicSystemInfo {
        template_id: TEMPLATE_SYSTEM_INFO_RESPONSE,
        user_msg: vec!["hello".to_string(), "world".to_string()],
        rp_code: vec![RP_CODE_SUCCESS.to_string()],
        system_name: systems.iter().map(ToString::to_string).collect(),
        has_aggregated_quotes: vec![false; systems.len()],
    }
}

/// Account-level update for `account_id`.
#[must_use]
pub fn account_update(
    account_id: &str,
    account_balance: &str,
    margin_balance: &str,
    day_pnl: &str,
) -> AccountPnLPositionUpdate {
    AccountPnLPositionUpdate {
        template_id: TEMPLATE_ACCOUNT_PNL_UPDATE,
        is_snapshot: Some(true),
        account_id: Some(account_id.to_string()),
        account_balance: Some(account_balance.to_string()),
        margin_balance: Some(margin_balance.to_string()),
        day_pnl: Some(day_pnl.to_string()),
        ..Default::default()
    }
}

/// Instrument-level update for `symbol` (an empty symbol is a placeholder record).
#[must_use]
pub fn instrument_update(symbol: &str, open_qty: i32, day_pnl: f64) -> InstrumentPnLPositionUpdate {
    InstrumentPnLPositionUpdate {
        template_id: TEMPLATE_INSTRUMENT_PNL_UPDATE,
        is_snapshot: Some(true),
        symbol: Some(symbol.to_string()),
        exchange: Some("CME".to_string()),
        open_position_quantity: Some(open_qty),
        closed_position_quantity: Some(0),
        fill_buy_qty: Some(open_qty),
        fill_sell_qty: Some(0),
        day_open_pnl: Some(day_pnl),
        day_closed_pnl: Some(0.0),
        day_pnl: Some(day_pnl),
        ..Default::default()
    }
}
