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

//! WebSocket [`Transport`] and [`Connector`] backed by tokio-tungstenite.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures_util::{StreamExt, stream::SplitStream};
use tokio_tungstenite::{
    Connector as TlsConnector, connect_async_tls_with_config, tungstenite::Message,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::{
    error::{RithmicWsError, RithmicWsResult},
    handler::{WebSocketSink, WsStream},
    transport::{Connector, Received, Transport},
};
use crate::{
    common::urls::{is_secure_url, url_authority},
    config::RithmicConfig,
    tls::create_tls_config_from_bundle,
};

/// A connected Rithmic WebSocket.
///
/// Only binary messages are delivered; control frames are handled below the
/// [`Transport`] surface and text frames are logged and skipped.
pub struct WsTransport {
    sink: WebSocketSink,
    stream: tokio::sync::Mutex<SplitStream<WsStream>>,
    open: Arc<AtomicBool>,
    close_timeout: Duration,
    cancel: CancellationToken,
}

impl std::fmt::Debug for WsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(WsTransport))
            .field("open", &self.is_open())
            .field("close_timeout", &self.close_timeout)
            .finish_non_exhaustive()
    }
}

impl WsTransport {
    /// Wraps an established WebSocket, spawning the keepalive task when
    /// `ping_interval` is set. Must be called within a tokio runtime.
    pub fn new(ws: WsStream, ping_interval: Option<Duration>, close_timeout: Duration) -> Self {
        let (sink, stream) = ws.split();
        let sink = WebSocketSink::new(sink);
        let open = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        if let Some(interval) = ping_interval {
            spawn_keepalive(sink.clone(), interval, open.clone(), cancel.clone());
        }

        Self {
            sink,
            stream: tokio::sync::Mutex::new(stream),
            open,
            close_timeout,
            cancel,
        }
    }

    fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }

    async fn next_binary(&self) -> RithmicWsResult<Received> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Received::Message(data.to_vec())),
                Some(Ok(Message::Text(text))) => {
                    warn!(len = text.as_str().len(), "Skipping unexpected text message");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    trace!("Control frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Received close frame");
                    self.mark_closed();
                    return Err(RithmicWsError::ConnectionClosed);
                }
                Some(Err(e)) => {
                    warn!("Stream failed, treating connection as closed: {e}");
                    self.mark_closed();
                    return Err(RithmicWsError::ConnectionClosed);
                }
                None => {
                    self.mark_closed();
                    return Err(RithmicWsError::ConnectionClosed);
                }
            }
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, data: Vec<u8>) -> RithmicWsResult<()> {
        if !self.is_open() {
            return Err(RithmicWsError::SendFailure(
                "connection is not open".to_string(),
            ));
        }
        self.sink.send_binary(data).await
    }

    async fn receive(&self, timeout: Option<Duration>) -> RithmicWsResult<Received> {
        if !self.is_open() {
            return Err(RithmicWsError::ConnectionClosed);
        }

        match timeout {
            Some(duration) => match tokio::time::timeout(duration, self.next_binary()).await {
                Ok(result) => result,
                Err(_) => Ok(Received::Timeout),
            },
            None => self.next_binary().await,
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn close(&self, code: u16, reason: &str) -> RithmicWsResult<()> {
        if !self.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.cancel.cancel();

        debug!(code, reason, "Closing websocket");
        self.sink.send_close(code, reason).await?;

        let mut stream = self.stream.lock().await;
        let acknowledged = async {
            while let Some(message) = stream.next().await {
                if matches!(message, Ok(Message::Close(_)) | Err(_)) {
                    break;
                }
            }
        };

        if tokio::time::timeout(self.close_timeout, acknowledged).await.is_err() {
            warn!(timeout = ?self.close_timeout, "Peer did not acknowledge close");
        }
        Ok(())
    }
}

fn spawn_keepalive(
    sink: WebSocketSink,
    interval: Duration,
    open: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if !open.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Err(e) = sink.send_ping().await {
                        debug!("Keepalive stopped: {e}");
                        break;
                    }
                }
            }
        }
        trace!("Keepalive task finished");
    });
}

/// Opens [`WsTransport`]s, using the configured trust bundle for `wss://`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    tls_config: Option<Arc<rustls::ClientConfig>>,
    ping_interval: Option<Duration>,
    close_timeout: Duration,
}

impl WsConnector {
    #[must_use]
    pub fn new(
        tls_config: Option<Arc<rustls::ClientConfig>>,
        ping_interval: Option<Duration>,
        close_timeout: Duration,
    ) -> Self {
        Self {
            tls_config,
            ping_interval,
            close_timeout,
        }
    }

    /// Creates a connector from `config`, loading its trust bundle if set.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::TlsSetupFailure`] if the bundle cannot be loaded.
    pub fn from_config(config: &RithmicConfig) -> RithmicWsResult<Self> {
        let tls_config = config
            .cert_path
            .as_deref()
            .map(create_tls_config_from_bundle)
            .transpose()?;

        Ok(Self::new(
            tls_config,
            config.ws_ping_interval(),
            config.close_timeout(),
        ))
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, uri: &str) -> RithmicWsResult<WsTransport> {
        let connector = if is_secure_url(uri) {
            match &self.tls_config {
                Some(config) => TlsConnector::Rustls(config.clone()),
                None => {
                    return Err(RithmicWsError::TlsSetupFailure(format!(
                        "No trust bundle configured for secure endpoint {}",
                        url_authority(uri)
                    )));
                }
            }
        } else {
            TlsConnector::Plain
        };

        debug!(endpoint = url_authority(uri), "Connecting");
        let (ws, response) = connect_async_tls_with_config(uri, None, true, Some(connector)).await?;
        debug!(status = %response.status(), "Websocket handshake complete");

        Ok(WsTransport::new(ws, self.ping_interval, self.close_timeout))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn test_secure_uri_without_bundle_fails_tls_setup() {
        let connector = WsConnector::new(None, None, Duration::from_secs(1));

        let err = connector
            .connect("wss://rituz00100.rithmic.com:443")
            .await
            .unwrap_err();

        assert!(matches!(err, RithmicWsError::TlsSetupFailure(_)));
        assert!(err.to_string().contains("rituz00100.rithmic.com:443"));
    }

    #[rstest]
    fn test_from_config_with_missing_bundle_fails() {
        let config = RithmicConfig {
            cert_path: Some("/nonexistent/rithmic_ssl_cert_auth_params".into()),
            ..Default::default()
        };

        let err = WsConnector::from_config(&config).unwrap_err();
        assert!(matches!(err, RithmicWsError::TlsSetupFailure(_)));
    }

    #[rstest]
    fn test_from_config_without_bundle() {
        let connector = WsConnector::from_config(&RithmicConfig::default()).unwrap();

        assert!(connector.tls_config.is_none());
        assert_eq!(connector.ping_interval, Some(Duration::from_secs(3)));
        assert_eq!(connector.close_timeout, Duration::from_secs(5));
    }
}
