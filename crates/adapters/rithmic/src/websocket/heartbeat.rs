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

//! Idle monitor injecting protocol heartbeats while waiting for data.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::{
    error::{RithmicWsError, RithmicWsResult},
    frame::encode_message,
    messages::RequestHeartbeat,
    transport::{Received, Transport},
};
use crate::common::consts::TEMPLATE_HEARTBEAT_REQUEST;

/// Sends one heartbeat request (template id 18).
///
/// # Errors
///
/// Returns an error if the transport fails to send.
pub async fn send_heartbeat<T>(transport: &T) -> RithmicWsResult<()>
where
    T: Transport + ?Sized,
{
    let request = RequestHeartbeat {
        template_id: TEMPLATE_HEARTBEAT_REQUEST,
    };
    transport.send(encode_message(&request)).await
}

/// Tracks time since the last received frame and heartbeats when idle.
#[derive(Debug)]
pub struct IdleMonitor {
    idle_timeout: Duration,
    last_received: Instant,
    heartbeats_sent: u64,
}

impl IdleMonitor {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            last_received: Instant::now(),
            heartbeats_sent: 0,
        }
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Time elapsed since the last delivered frame (or since creation).
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_received.elapsed()
    }

    /// Heartbeats sent because of idleness.
    #[must_use]
    pub fn heartbeats_sent(&self) -> u64 {
        self.heartbeats_sent
    }

    /// Waits up to the idle timeout for the next frame; on timeout sends a
    /// heartbeat and waits again, for as long as the connection stays open.
    ///
    /// # Errors
    ///
    /// Returns [`RithmicWsError::ConnectionClosed`] when the wait times out on
    /// a closed connection or the peer closes, and any send failure.
    pub async fn await_next_frame_or_heartbeat<T>(
        &mut self,
        transport: &T,
    ) -> RithmicWsResult<Vec<u8>>
    where
        T: Transport + ?Sized,
    {
        loop {
            match transport.receive(Some(self.idle_timeout)).await? {
                Received::Message(wire) => {
                    self.last_received = Instant::now();
                    return Ok(wire);
                }
                Received::Timeout => {
                    if !transport.is_open() {
                        debug!("Connection appears to be closed");
                        return Err(RithmicWsError::ConnectionClosed);
                    }

                    debug!(idle_for = ?self.idle_for(), "Idle, sending heartbeat");
                    send_heartbeat(transport).await?;
                    self.heartbeats_sent += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        common::{
            consts::TEMPLATE_HEARTBEAT_REQUEST,
            testing::{ScriptedTransport, snapshot_response},
        },
        websocket::frame::encode_message,
    };

    #[rstest]
    #[tokio::test]
    async fn test_frame_delivered_without_heartbeat() {
        let transport = ScriptedTransport::new();
        let wire = encode_message(&snapshot_response(&["0"]));
        transport.push_frame(wire.clone());

        let mut monitor = IdleMonitor::new(Duration::from_secs(5));
        let received = monitor
            .await_next_frame_or_heartbeat(&transport)
            .await
            .unwrap();

        assert_eq!(received, wire);
        assert_eq!(monitor.heartbeats_sent(), 0);
        assert!(transport.sent().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_idle_sends_exactly_one_heartbeat_then_resumes() {
        let transport = ScriptedTransport::new();
        transport.push_idle();
        transport.push_message(&snapshot_response(&["0"]));

        let mut monitor = IdleMonitor::new(Duration::from_secs(5));
        monitor
            .await_next_frame_or_heartbeat(&transport)
            .await
            .unwrap();

        assert_eq!(monitor.heartbeats_sent(), 1);
        assert_eq!(
            transport.sent_template_ids(),
            vec![TEMPLATE_HEARTBEAT_REQUEST]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_heartbeat_frame_is_discriminator_only() {
        let transport = ScriptedTransport::new();
        send_heartbeat(&transport).await.unwrap();

        let expected = encode_message(&RequestHeartbeat {
            template_id: TEMPLATE_HEARTBEAT_REQUEST,
        });
        assert_eq!(transport.sent(), vec![expected]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_timeout_on_closed_connection_signals_closed() {
        let transport = ScriptedTransport::new();
        transport.push_drop();

        let mut monitor = IdleMonitor::new(Duration::from_secs(5));
        let err = monitor
            .await_next_frame_or_heartbeat(&transport)
            .await
            .unwrap_err();

        assert!(matches!(err, RithmicWsError::ConnectionClosed));
        assert!(transport.sent().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_peer_close_signals_closed() {
        let transport = ScriptedTransport::new();

        let mut monitor = IdleMonitor::new(Duration::from_secs(5));
        let err = monitor
            .await_next_frame_or_heartbeat(&transport)
            .await
            .unwrap_err();

        assert!(matches!(err, RithmicWsError::ConnectionClosed));
    }
}
