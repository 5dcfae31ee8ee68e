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

//! Rithmic PnL position snapshot session.
//!
//! A [`RithmicSession`] owns one connection and walks it through
//! connect, login, snapshot request, streaming and teardown:
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> LoggingIn -> LoggedIn
//!     -> RequestSent -> Streaming -> Done -> LoggingOut -> Closed
//! ```
//!
//! Any non-retryable error moves the session to `Failed`; the connection is
//! still closed on a best-effort basis by [`RithmicSession::run`].

use std::time::Duration;

use prost::Message;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{
    enums::{SessionState, StreamEnd},
    error::{RithmicWsError, RithmicWsResult},
    frame::{decode_frame, encode_message},
    heartbeat::{IdleMonitor, send_heartbeat},
    messages::{
        RequestLogin, RequestLogout, RequestPnLPositionSnapshot, RequestRithmicSystemInfo,
        ResponseLogin,
    },
    parse::{MessageDispatcher, RithmicMessage, classify},
    transport::{Connector, Received, Transport, connect_with_retry},
};
use crate::{
    common::{
        consts::{
            RP_CODE_SUCCESS, TEMPLATE_LOGIN_REQUEST, TEMPLATE_LOGIN_RESPONSE,
            TEMPLATE_LOGOUT_REQUEST, TEMPLATE_PNL_SNAPSHOT_REQUEST, TEMPLATE_SYSTEM_INFO_REQUEST,
            TEMPLATE_SYSTEM_INFO_RESPONSE, WS_CLOSE_NORMAL, WS_CLOSE_REASON,
        },
        credential::RithmicCredential,
        urls::url_authority,
    },
    config::RithmicConfig,
    report::{AccountSnapshot, InstrumentSnapshot, PnlReport},
};

/// Session metadata returned by a successful login.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoginSummary {
    pub template_version: String,
    pub user_msg: Vec<String>,
    pub rp_code: Vec<String>,
    pub fcm_id: String,
    pub ib_id: String,
    pub country_code: String,
    pub state_code: String,
    /// Heartbeat interval assigned by the server, in seconds.
    pub heartbeat_interval: Option<f64>,
    pub unique_user_id: String,
}

impl From<ResponseLogin> for LoginSummary {
    fn from(rp: ResponseLogin) -> Self {
        Self {
            template_version: rp.template_version.unwrap_or_default(),
            user_msg: rp.user_msg,
            rp_code: rp.rp_code,
            fcm_id: rp.fcm_id.unwrap_or_default(),
            ib_id: rp.ib_id.unwrap_or_default(),
            country_code: rp.country_code.unwrap_or_default(),
            state_code: rp.state_code.unwrap_or_default(),
            heartbeat_interval: rp.heartbeat_interval,
            unique_user_id: rp.unique_user_id.unwrap_or_default(),
        }
    }
}

fn is_success(rp_code: &[String]) -> bool {
    rp_code.first().is_some_and(|code| code == RP_CODE_SUCCESS)
}

async fn send_message<T, M>(transport: &T, message: &M) -> RithmicWsResult<()>
where
    T: Transport + ?Sized,
    M: Message,
{
    transport.send(encode_message(message)).await
}

/// A single Rithmic PnL snapshot session over a connection opened by `C`.
pub struct RithmicSession<C: Connector> {
    config: RithmicConfig,
    credential: RithmicCredential,
    connector: C,
    dispatcher: MessageDispatcher,
    transport: Option<C::Transport>,
    state: SessionState,
    done: bool,
    messages_consumed: u64,
    login: Option<LoginSummary>,
    report: PnlReport,
    snapshot_requested: bool,
}

impl<C: Connector> std::fmt::Debug for RithmicSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(RithmicSession))
            .field("uri", &url_authority(&self.config.uri))
            .field("system_name", &self.config.system_name)
            .field("credential", &self.credential)
            .field("state", &self.state)
            .field("done", &self.done)
            .field("messages_consumed", &self.messages_consumed)
            .finish_non_exhaustive()
    }
}

impl<C: Connector> RithmicSession<C> {
    pub fn new(config: RithmicConfig, credential: RithmicCredential, connector: C) -> Self {
        Self {
            config,
            credential,
            connector,
            dispatcher: MessageDispatcher::default(),
            transport: None,
            state: SessionState::Disconnected,
            done: false,
            messages_consumed: 0,
            login: None,
            report: PnlReport::new(),
            snapshot_requested: false,
        }
    }

    /// Replaces the default dispatcher table.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: MessageDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` once a snapshot response with a result code was received.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn messages_consumed(&self) -> u64 {
        self.messages_consumed
    }

    #[must_use]
    pub fn login_summary(&self) -> Option<&LoginSummary> {
        self.login.as_ref()
    }

    #[must_use]
    pub fn report(&self) -> &PnlReport {
        &self.report
    }

    #[must_use]
    pub fn config(&self) -> &RithmicConfig {
        &self.config
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    fn ensure_state(
        &self,
        operation: &'static str,
        allowed: &[SessionState],
    ) -> RithmicWsResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(RithmicWsError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transport_for(&self, operation: &'static str) -> RithmicWsResult<&C::Transport> {
        self.transport.as_ref().ok_or(RithmicWsError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn fail(&mut self, operation: &'static str, error: RithmicWsError) -> RithmicWsError {
        error!("Session failed during {operation}: {error}");
        self.state = SessionState::Failed;
        error
    }

    /// Connects to the configured URI, retrying reset-type failures with backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if connecting fails; the session moves to `Failed`.
    pub async fn connect(&mut self) -> RithmicWsResult<()> {
        self.ensure_state("connect", &[SessionState::Disconnected])?;
        self.state = SessionState::Connecting;

        let result = connect_with_retry(
            &self.connector,
            &self.config.uri,
            &self.config.retry_policy(),
            self.config.connect_timeout(),
        )
        .await;

        match result {
            Ok(transport) => {
                info!(endpoint = url_authority(&self.config.uri), "Connected");
                self.transport = Some(transport);
                self.state = SessionState::Connected;
                Ok(())
            }
            Err(e) => Err(self.fail("connect", e)),
        }
    }

    /// Waits for the first message with `template_id`, skipping others,
    /// bounded by `timeout` when set.
    async fn await_response(
        &self,
        operation: &'static str,
        template_id: i32,
        timeout: Option<Duration>,
    ) -> RithmicWsResult<RithmicMessage> {
        let transport = self.transport_for(operation)?;

        let wait = async {
            loop {
                let wire = match transport.receive(None).await? {
                    Received::Message(wire) => wire,
                    Received::Timeout => continue,
                };
                let frame = decode_frame(&wire)?;
                let received_id = classify(&frame.payload)?;
                if received_id == template_id {
                    return self.dispatcher.decode(received_id, &frame.payload);
                }
                debug!(
                    template_id = received_id,
                    "Skipping message while awaiting {operation} response"
                );
            }
        };

        match timeout {
            Some(duration) => tokio::time::timeout(duration, wait)
                .await
                .map_err(|_| RithmicWsError::Timeout {
                    operation,
                    duration,
                })?,
            None => wait.await,
        }
    }

    /// Logs into the configured system and plant, awaiting the login response.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::LoginRejected`] if the result code is not
    /// success, or any transport error; the session moves to `Failed`.
    pub async fn login(&mut self) -> RithmicWsResult<LoginSummary> {
        self.ensure_state("login", &[SessionState::Connected])?;
        self.state = SessionState::LoggingIn;

        match self.login_round_trip().await {
            Ok(summary) => {
                info!(
                    template_version = %summary.template_version,
                    fcm_id = %summary.fcm_id,
                    ib_id = %summary.ib_id,
                    country_code = %summary.country_code,
                    state_code = %summary.state_code,
                    heartbeat_interval = ?summary.heartbeat_interval,
                    unique_user_id = %summary.unique_user_id,
                    "Logged into {} ({})",
                    self.config.system_name,
                    self.config.plant,
                );
                self.login = Some(summary.clone());
                self.state = SessionState::LoggedIn;
                Ok(summary)
            }
            Err(e) => Err(self.fail("login", e)),
        }
    }

    async fn login_round_trip(&self) -> RithmicWsResult<LoginSummary> {
        let request = RequestLogin {
            template_id: TEMPLATE_LOGIN_REQUEST,
            template_version: Some(self.config.template_version.clone()),
            user_msg: vec!["hello".to_string()],
            user: Some(self.credential.user.clone()),
            password: Some(self.credential.password.clone()),
            app_name: Some(self.config.app_name.clone()),
            app_version: Some(self.config.app_version.clone()),
            system_name: Some(self.config.system_name.clone()),
            infra_type: Some(self.config.plant.infra_type() as i32),
        };
        send_message(self.transport_for("login")?, &request).await?;

        let response = self
            .await_response("login", TEMPLATE_LOGIN_RESPONSE, self.config.login_timeout())
            .await?;
        let RithmicMessage::LoginResponse(rp) = response else {
            return Err(RithmicWsError::DecodeFailure {
                template_id: TEMPLATE_LOGIN_RESPONSE,
                reason: format!("unexpected message {response:?}"),
            });
        };

        if !is_success(&rp.rp_code) {
            return Err(RithmicWsError::LoginRejected {
                rp_code: rp.rp_code,
                user_msg: rp.user_msg,
            });
        }
        Ok(LoginSummary::from(rp))
    }

    /// Lists the systems available on the connected gateway.
    ///
    /// Valid on a connected session before login. The server usually closes
    /// the connection after answering.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::RequestRejected`] if the result code is not
    /// success, or any transport error; the session moves to `Failed`.
    pub async fn list_systems(&mut self) -> RithmicWsResult<Vec<String>> {
        self.ensure_state("list systems", &[SessionState::Connected])?;

        match self.system_info_round_trip().await {
            Ok(systems) => {
                info!(count = systems.len(), "Available systems: {systems:?}");
                Ok(systems)
            }
            Err(e) => Err(self.fail("list systems", e)),
        }
    }

    async fn system_info_round_trip(&self) -> RithmicWsResult<Vec<String>> {
        let request = RequestRithmicSystemInfo {
            template_id: TEMPLATE_SYSTEM_INFO_REQUEST,
            user_msg: vec!["hello".to_string(), "world".to_string()],
        };
        send_message(self.transport_for("list systems")?, &request).await?;

        let response = self
            .await_response(
                "list systems",
                TEMPLATE_SYSTEM_INFO_RESPONSE,
                self.config.login_timeout(),
            )
            .await?;
        let RithmicMessage::SystemInfoResponse(rp) = response else {
            return Err(RithmicWsError::DecodeFailure {
                template_id: TEMPLATE_SYSTEM_INFO_RESPONSE,
                reason: format!("unexpected message {response:?}"),
            });
        };

        if !is_success(&rp.rp_code) {
            return Err(RithmicWsError::RequestRejected {
                template_id: TEMPLATE_SYSTEM_INFO_RESPONSE,
                rp_code: rp.rp_code,
            });
        }
        Ok(rp.system_name)
    }

    /// Sends the PnL position snapshot request for the credential's account.
    ///
    /// No response is awaited here; completion arrives during [`Self::consume`].
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::InvalidState`] unless logged in and not yet
    /// requested, or a send failure (the session moves to `Failed`).
    pub async fn request_snapshot(&mut self) -> RithmicWsResult<()> {
        self.ensure_state("request snapshot", &[SessionState::LoggedIn])?;
        if self.snapshot_requested {
            return Err(RithmicWsError::InvalidState {
                operation: "request snapshot",
                state: self.state,
            });
        }

        let request = RequestPnLPositionSnapshot {
            template_id: TEMPLATE_PNL_SNAPSHOT_REQUEST,
            user_msg: vec!["hello".to_string()],
            fcm_id: Some(self.credential.fcm_id.clone()),
            ib_id: Some(self.credential.ib_id.clone()),
            account_id: Some(self.credential.account_id.clone()),
        };

        let result = match self.transport_for("request snapshot") {
            Ok(transport) => send_message(transport, &request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                debug!(account_id = %self.credential.account_id, "Requested PnL position snapshot");
                self.snapshot_requested = true;
                self.state = SessionState::RequestSent;
                Ok(())
            }
            Err(e) => Err(self.fail("request snapshot", e)),
        }
    }

    /// Consumes streamed updates until completion, the message cap, or the
    /// connection closing, heartbeating whenever the stream is idle.
    ///
    /// # Errors
    ///
    /// Returns a send or transport error; the session moves to `Failed`.
    /// Per-message decode failures are logged and skipped.
    pub async fn consume(&mut self) -> RithmicWsResult<StreamEnd> {
        self.ensure_state("consume", &[SessionState::RequestSent])?;
        self.state = SessionState::Streaming;

        match self.consume_until_end().await {
            Ok(end) => {
                info!(
                    ?end,
                    messages = self.messages_consumed,
                    groups = self.report.groups().len(),
                    "Stream ended"
                );
                self.state = SessionState::Done;
                Ok(end)
            }
            Err(e) => Err(self.fail("consume", e)),
        }
    }

    async fn consume_until_end(&mut self) -> RithmicWsResult<StreamEnd> {
        send_heartbeat(self.transport_for("consume")?).await?;

        let mut monitor = IdleMonitor::new(self.config.idle_timeout());

        while self.messages_consumed < self.config.max_messages && !self.done {
            let next = monitor
                .await_next_frame_or_heartbeat(self.transport_for("consume")?)
                .await;

            let wire = match next {
                Ok(wire) => wire,
                Err(RithmicWsError::ConnectionClosed) => {
                    info!("Connection appears to be closed, ending stream");
                    return Ok(StreamEnd::ConnectionClosed);
                }
                Err(e) if !self.is_connected() => {
                    warn!("Receive failed on a closed connection, ending stream: {e}");
                    return Ok(StreamEnd::ConnectionClosed);
                }
                Err(e) => return Err(e),
            };

            self.messages_consumed += 1;
            if let Err(e) = self.handle_message(&wire) {
                warn!("Skipping message: {e}");
            }
        }

        if self.done {
            Ok(StreamEnd::Completed)
        } else {
            warn!(
                cap = self.config.max_messages,
                "Message cap reached before the snapshot completed"
            );
            Ok(StreamEnd::MessageCap)
        }
    }

    /// Decodes one wire unit and applies it to the session.
    ///
    /// Snapshot responses with a result code complete the stream; account and
    /// instrument updates are appended to the report; everything else is only
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::MalformedFrame`] or
    /// [`RithmicWsError::DecodeFailure`]; the session state is unchanged.
    pub fn handle_message(&mut self, wire: &[u8]) -> RithmicWsResult<RithmicMessage> {
        let frame = decode_frame(wire)?;
        if !frame.is_well_formed() {
            warn!(
                declared = frame.declared_length,
                actual = frame.payload.len(),
                "Length prefix does not match payload"
            );
        }

        let message = self.dispatcher.dispatch(&frame.payload)?;
        debug!(template_id = message.template_id(), "Consumed message");

        match &message {
            RithmicMessage::PnlSnapshotResponse(rp) => {
                if !rp.rp_code.is_empty() {
                    info!(rp_code = ?rp.rp_code, "PnL and position response is done");
                    self.done = true;
                }
            }
            RithmicMessage::AccountPnlUpdate(update) => {
                self.report
                    .append_account_snapshot(AccountSnapshot::from(update));
            }
            RithmicMessage::InstrumentPnlUpdate(update) => {
                if !self
                    .report
                    .append_instrument_snapshot(InstrumentSnapshot::from(update))
                {
                    debug!("Dropped instrument update without symbol");
                }
            }
            RithmicMessage::LogoutResponse(_) | RithmicMessage::HeartbeatResponse(_) => {}
            RithmicMessage::LoginResponse(_) | RithmicMessage::SystemInfoResponse(_) => {
                debug!("Ignoring out-of-sequence response");
            }
            RithmicMessage::Unrecognized { template_id } => {
                debug!(template_id, "Ignoring unrecognized template id");
            }
        }

        Ok(message)
    }

    /// Logs out (if logged in) and closes the connection if it is still open.
    ///
    /// Calling teardown again, or on a connection the server already closed,
    /// sends nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails.
    pub async fn teardown(&mut self) -> RithmicWsResult<()> {
        let Some(transport) = self.transport.take() else {
            self.finish_teardown();
            return Ok(());
        };

        let mut result = Ok(());
        if transport.is_open() {
            if self.login.is_some() {
                if self.state != SessionState::Failed {
                    self.state = SessionState::LoggingOut;
                }
                let request = RequestLogout {
                    template_id: TEMPLATE_LOGOUT_REQUEST,
                    user_msg: vec!["hello".to_string()],
                };
                if let Err(e) = send_message(&transport, &request).await {
                    warn!("Failed to send logout: {e}");
                }
            }
            debug!("Closing connection");
            result = transport.close(WS_CLOSE_NORMAL, WS_CLOSE_REASON).await;
        } else {
            debug!("Connection already closed, skipping logout");
        }

        self.finish_teardown();
        result
    }

    fn finish_teardown(&mut self) {
        if self.state != SessionState::Failed {
            self.state = SessionState::Closed;
        }
    }

    /// Runs the full lifecycle and tears the connection down, also on failure.
    ///
    /// # Errors
    ///
    /// Returns the first lifecycle error; teardown errors after a failure are
    /// only logged.
    pub async fn run(&mut self) -> RithmicWsResult<StreamEnd> {
        match self.run_lifecycle().await {
            Ok(end) => {
                self.teardown().await?;
                info!("Session closed");
                Ok(end)
            }
            Err(e) => {
                if let Err(close_err) = self.teardown().await {
                    warn!("Teardown after failure also failed: {close_err}");
                }
                Err(e)
            }
        }
    }

    async fn run_lifecycle(&mut self) -> RithmicWsResult<StreamEnd> {
        self.connect().await?;
        self.login().await?;
        self.request_snapshot().await?;
        self.consume().await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rstest::{fixture, rstest};
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        common::{
            consts::{TEMPLATE_HEARTBEAT_REQUEST, TEMPLATE_INSTRUMENT_PNL_UPDATE},
            testing::{
                ScriptedConnector, ScriptedTransport, account_update, instrument_update,
                login_response, snapshot_response, system_info_response,
            },
        },
        websocket::{frame::encode_frame, messages::Base},
    };

    #[fixture]
    fn credential() -> RithmicCredential {
        RithmicCredential::builder()
            .user("demo")
            .password("pw")
            .fcm_id("Ironbeam")
            .ib_id("Ironbeam")
            .account_id("999999")
            .build()
            .unwrap()
    }

    fn session_with(
        transport: &ScriptedTransport,
        credential: RithmicCredential,
    ) -> RithmicSession<ScriptedConnector> {
        let config = RithmicConfig::new("ws://127.0.0.1:9000", "Rithmic Paper Trading");
        RithmicSession::new(config, credential, ScriptedConnector::new(transport.clone()))
    }

    fn decode_sent<M: Message + Default>(transport: &ScriptedTransport, index: usize) -> M {
        let wire = &transport.sent()[index];
        M::decode(&decode_frame(wire).unwrap().payload[..]).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_successful_snapshot_yields_one_account_group(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&account_update("999999", "10000.0", "9500.0", "50.0"));
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::Completed);
        assert!(session.is_done());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.report().account_groups(), 1);
        assert_eq!(session.report().groups().len(), 1);
        assert_eq!(session.report().report()[0], "Account: 999999");
        assert_eq!(session.report().report()[3], "Daily Pnl: 50.0");
        assert_eq!(
            transport.sent_template_ids(),
            vec![
                TEMPLATE_LOGIN_REQUEST,
                TEMPLATE_PNL_SNAPSHOT_REQUEST,
                TEMPLATE_HEARTBEAT_REQUEST,
                TEMPLATE_LOGOUT_REQUEST,
            ]
        );
        assert_eq!(
            transport.close_frames(),
            vec![(WS_CLOSE_NORMAL, WS_CLOSE_REASON.to_string())]
        );

        let login: RequestLogin = decode_sent(&transport, 0);
        assert_eq!(login.user.as_deref(), Some("demo"));
        assert_eq!(login.password.as_deref(), Some("pw"));
        assert_eq!(login.system_name.as_deref(), Some("Rithmic Paper Trading"));
        assert_eq!(login.template_version.as_deref(), Some("3.9"));
        assert_eq!(login.infra_type, Some(4));

        let request: RequestPnLPositionSnapshot = decode_sent(&transport, 1);
        assert_eq!(request.account_id.as_deref(), Some("999999"));
        assert_eq!(request.fcm_id.as_deref(), Some("Ironbeam"));
        assert_eq!(request.ib_id.as_deref(), Some("Ironbeam"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_rejected_never_sends_request(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("1"));
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        let err = session.run().await.unwrap_err();

        assert!(matches!(
            err,
            RithmicWsError::LoginRejected { ref rp_code, .. } if rp_code == &vec!["1".to_string()]
        ));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(transport.sent_template_ids(), vec![TEMPLATE_LOGIN_REQUEST]);
        assert_eq!(transport.close_frames().len(), 1);
        assert!(session.login_summary().is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn test_empty_login_result_code_is_rejection(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        let mut response = login_response("0");
        response.rp_code.clear();
        transport.push_message(&response);
        let mut session = session_with(&transport, credential);

        session.connect().await.unwrap();
        let err = session.login().await.unwrap_err();

        assert!(matches!(err, RithmicWsError::LoginRejected { .. }));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_message_cap_ends_without_done(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        let update = encode_message(&instrument_update("ESZ5", 1, 1.0));
        for _ in 0..100_000 {
            transport.push_frame(update.clone());
        }
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::MessageCap);
        assert!(!session.is_done());
        assert_eq!(session.messages_consumed(), 100_000);
        assert_eq!(session.report().instrument_groups(), 100_000);
        assert_eq!(transport.remaining(), 1);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(transport.close_frames().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_completes_on_first_non_empty_snapshot_response(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&snapshot_response(&[]));
        for i in 0..5 {
            transport.push_message(&instrument_update(&format!("ES{i}"), i, 0.5));
        }
        transport.push_message(&account_update("999999", "1", "2", "3"));
        transport.push_message(&snapshot_response(&["0"]));
        transport.push_message(&account_update("999999", "4", "5", "6"));
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::Completed);
        assert_eq!(session.messages_consumed(), 8);
        assert_eq!(session.report().instrument_groups(), 5);
        assert_eq!(session.report().account_groups(), 1);
        assert_eq!(transport.remaining(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_dispatch_routes_updates(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        let mut session = session_with(&transport, credential);

        let message = session
            .handle_message(&encode_message(&account_update("999999", "1", "2", "3")))
            .unwrap();
        assert!(matches!(message, RithmicMessage::AccountPnlUpdate(_)));
        assert_eq!(session.report().account_groups(), 1);

        session
            .handle_message(&encode_message(&instrument_update("", 3, 9.0)))
            .unwrap();
        assert_eq!(session.report().groups().len(), 1);

        let unknown = session
            .handle_message(&encode_message(&Base { template_id: 999 }))
            .unwrap();
        assert_eq!(unknown, RithmicMessage::Unrecognized { template_id: 999 });
        assert_eq!(session.report().groups().len(), 1);
        assert!(!session.is_done());
    }

    #[rstest]
    #[tokio::test]
    async fn test_decode_failure_does_not_abort_stream(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        let mut bad = Base {
            template_id: TEMPLATE_INSTRUMENT_PNL_UPDATE,
        }
        .encode_to_vec();
        bad.extend_from_slice(&[0xA0, 0xE1, 0x35, 0x01]);
        transport.push_frame(encode_frame(&bad));
        transport.push_frame(vec![0x00, 0x01]);
        transport.push_message(&instrument_update("ESZ5", 1, 2.0));
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::Completed);
        assert_eq!(session.messages_consumed(), 4);
        assert_eq!(session.report().instrument_groups(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_connection_closed_ends_stream_without_logout(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&account_update("999999", "1", "2", "3"));
        transport.push_drop();
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::ConnectionClosed);
        assert!(!session.is_done());
        assert_eq!(session.state(), SessionState::Closed);
        assert!(transport.close_frames().is_empty());
        assert_eq!(
            transport.sent_template_ids(),
            vec![
                TEMPLATE_LOGIN_REQUEST,
                TEMPLATE_PNL_SNAPSHOT_REQUEST,
                TEMPLATE_HEARTBEAT_REQUEST,
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_reset_mid_stream_keeps_report(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&account_update("999999", "1", "2", "3"));
        transport.push_reset();
        let mut session = session_with(&transport, credential);

        let end = session.run().await.unwrap();

        assert_eq!(end, StreamEnd::ConnectionClosed);
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.report().account_groups(), 1);
        assert!(transport.close_frames().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_receive_error_on_open_connection_fails(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_error("broken pipe");
        let mut session = session_with(&transport, credential);

        let err = session.run().await.unwrap_err();

        assert!(matches!(err, RithmicWsError::Transport(_)));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_idle_stream_heartbeats(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_idle();
        transport.push_idle();
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        session.run().await.unwrap();

        let heartbeats = transport
            .sent_template_ids()
            .into_iter()
            .filter(|id| *id == TEMPLATE_HEARTBEAT_REQUEST)
            .count();
        assert_eq!(heartbeats, 3);
    }

    #[rstest]
    #[tokio::test]
    async fn test_teardown_is_idempotent(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential);

        session.run().await.unwrap();
        let sent = transport.sent().len();

        session.teardown().await.unwrap();
        session.teardown().await.unwrap();

        assert_eq!(transport.sent().len(), sent);
        assert_eq!(transport.close_frames().len(), 1);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_request_snapshot_only_once(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        let mut session = session_with(&transport, credential);

        session.connect().await.unwrap();
        session.login().await.unwrap();
        session.request_snapshot().await.unwrap();
        let err = session.request_snapshot().await.unwrap_err();

        assert!(matches!(
            err,
            RithmicWsError::InvalidState {
                state: SessionState::RequestSent,
                ..
            }
        ));
        assert_eq!(
            transport.sent_template_ids(),
            vec![TEMPLATE_LOGIN_REQUEST, TEMPLATE_PNL_SNAPSHOT_REQUEST]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_before_connect_is_invalid(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        let mut session = session_with(&transport, credential);

        let err = session.login().await.unwrap_err();

        assert!(matches!(err, RithmicWsError::InvalidState { operation: "login", .. }));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_login_summary_is_kept(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        let mut session = session_with(&transport, credential);

        session.connect().await.unwrap();
        let summary = session.login().await.unwrap();

        assert_eq!(summary.unique_user_id, "demo-session-1");
        assert_eq!(summary.heartbeat_interval, Some(60.0));
        assert_eq!(summary.fcm_id, "Ironbeam");
        assert_eq!(session.login_summary(), Some(&summary));
        assert_eq!(session.state(), SessionState::LoggedIn);
    }

    #[derive(Debug)]
    struct SilentTransport;

    #[async_trait]
    impl Transport for SilentTransport {
        async fn send(&self, _data: Vec<u8>) -> RithmicWsResult<()> {
            Ok(())
        }

        async fn receive(&self, _timeout: Option<Duration>) -> RithmicWsResult<Received> {
            std::future::pending().await
        }

        fn is_open(&self) -> bool {
            true
        }

        async fn close(&self, _code: u16, _reason: &str) -> RithmicWsResult<()> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct SilentConnector;

    #[async_trait]
    impl Connector for SilentConnector {
        type Transport = SilentTransport;

        async fn connect(&self, _uri: &str) -> RithmicWsResult<SilentTransport> {
            Ok(SilentTransport)
        }
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_login_times_out(credential: RithmicCredential) {
        let config = RithmicConfig {
            uri: "ws://127.0.0.1:9000".to_string(),
            login_timeout_secs: Some(1),
            ..Default::default()
        };
        let mut session = RithmicSession::new(config, credential, SilentConnector);
        session.connect().await.unwrap();

        let err = session.login().await.unwrap_err();

        assert!(matches!(
            err,
            RithmicWsError::Timeout {
                operation: "login",
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_systems(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        transport.push_message(&system_info_response(&[
            "Rithmic 01",
            "Rithmic Paper Trading",
            "Rithmic Test",
        ]));
        let mut session = session_with(&transport, credential);

        session.connect().await.unwrap();
        let systems = session.list_systems().await.unwrap();
        session.teardown().await.unwrap();

        assert_eq!(
            systems,
            vec!["Rithmic 01", "Rithmic Paper Trading", "Rithmic Test"]
        );
        assert_eq!(
            transport.sent_template_ids(),
            vec![TEMPLATE_SYSTEM_INFO_REQUEST]
        );
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[rstest]
    #[tokio::test]
    async fn test_list_systems_rejected(credential: RithmicCredential) {
        let transport = ScriptedTransport::new();
        let mut response = system_info_response(&[]);
        response.rp_code = vec!["3".to_string(), "bad request".to_string()];
        transport.push_message(&response);
        let mut session = session_with(&transport, credential);

        session.connect().await.unwrap();
        let err = session.list_systems().await.unwrap_err();

        assert!(matches!(
            err,
            RithmicWsError::RequestRejected {
                template_id: TEMPLATE_SYSTEM_INFO_RESPONSE,
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn test_connect_failure_after_retries(credential: RithmicCredential) {
        let config = RithmicConfig::new("ws://127.0.0.1:9000", "Rithmic Paper Trading");
        let connector = ScriptedConnector::always_reset();
        let mut session = RithmicSession::new(config, credential, connector);

        let err = session.run().await.unwrap_err();

        assert!(matches!(err, RithmicWsError::ConnectFailure { attempts: 3, .. }));
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_completion_is_logged() {
        let transport = ScriptedTransport::new();
        transport.push_message(&login_response("0"));
        transport.push_message(&Base { template_id: 999 });
        transport.push_message(&snapshot_response(&["0"]));
        let mut session = session_with(&transport, credential());

        session.run().await.unwrap();

        assert!(logs_contain("PnL and position response is done"));
        assert!(logs_contain("Ignoring unrecognized template id"));
    }
}
