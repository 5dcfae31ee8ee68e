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

//! Shared write half of a Rithmic WebSocket connection.

use std::sync::Arc;

use futures_util::{SinkExt, stream::SplitSink};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};
use tracing::trace;

use super::error::{RithmicWsError, RithmicWsResult};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The sink half, shared between the session and the keepalive task.
#[derive(Clone)]
pub struct WebSocketSink {
    sink: Arc<tokio::sync::Mutex<SplitSink<WsStream, Message>>>,
}

impl std::fmt::Debug for WebSocketSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(WebSocketSink)).finish_non_exhaustive()
    }
}

impl WebSocketSink {
    pub fn new(sink: SplitSink<WsStream, Message>) -> Self {
        Self {
            sink: Arc::new(tokio::sync::Mutex::new(sink)),
        }
    }

    /// Sends a binary message.
    pub async fn send_binary(&self, data: Vec<u8>) -> RithmicWsResult<()> {
        let mut sink = self.sink.lock().await;
        trace!(len = data.len(), "Sending binary message");
        sink.send(Message::Binary(data.into()))
            .await
            .map_err(|e| RithmicWsError::SendFailure(format!("Failed to send binary message: {e}")))
    }

    /// Sends a WebSocket ping.
    pub async fn send_ping(&self) -> RithmicWsResult<()> {
        let mut sink = self.sink.lock().await;
        sink.send(Message::Ping(Vec::new().into()))
            .await
            .map_err(|e| RithmicWsError::SendFailure(format!("Failed to send ping message: {e}")))
    }

    /// Sends a close frame with `code` and `reason`.
    pub async fn send_close(&self, code: u16, reason: &str) -> RithmicWsResult<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        let mut sink = self.sink.lock().await;
        sink.send(Message::Close(Some(frame)))
            .await
            .map_err(|e| RithmicWsError::SendFailure(format!("Failed to send close frame: {e}")))
    }
}
