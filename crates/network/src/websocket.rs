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

//! Auto-reconnecting WebSocket client.
//!
//! [`WsClient`] maintains a single-URL connection and recovers from transport
//! failures autonomously: a closed or errored socket moves the client to
//! [`ConnectionState::Reconnecting`], redials after an exponential-backoff
//! delay and yields [`WsMessage::Reconnected`] so callers can resubscribe.
//!
//! The read loop is pull-based: the socket is only advanced when the caller
//! awaits [`WsClient::next`], which propagates slow-consumer backpressure to
//! the peer, and makes every await point cancellation-safe (dropping the
//! future mid-reconnect simply abandons the dial).

use std::{fmt::Debug, time::Duration};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest},
};

use crate::backoff::ExponentialBackoff;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for a [`WsClient`].
#[derive(Clone, Debug)]
pub struct WsConfig {
    /// WebSocket URL to dial.
    pub url: String,
    /// Headers attached to the upgrade request.
    pub headers: Vec<(String, String)>,
    /// Application-level heartbeat interval; `None` disables heartbeats.
    pub heartbeat_secs: Option<u64>,
    /// Text frame to send on each heartbeat tick (venues like Bybit expect
    /// `{"op":"ping"}`); protocol pings are answered regardless.
    pub heartbeat_msg: Option<String>,
    /// Connect (dial + upgrade) timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Initial reconnect delay in milliseconds.
    pub reconnect_delay_initial_ms: u64,
    /// Maximum reconnect delay in milliseconds.
    pub reconnect_delay_max_ms: u64,
    /// Multiplicative backoff factor.
    pub reconnect_backoff_factor: f64,
    /// Upper bound of uniform jitter added to each delay, in milliseconds.
    pub reconnect_jitter_ms: u64,
}

impl WsConfig {
    /// Creates a config for `url` with the default reconnect schedule.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            heartbeat_secs: None,
            heartbeat_msg: None,
            connect_timeout_ms: 10_000,
            reconnect_delay_initial_ms: 500,
            reconnect_delay_max_ms: 10_000,
            reconnect_backoff_factor: 1.5,
            reconnect_jitter_ms: 250,
        }
    }
}

/// Connection lifecycle states.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Terminal state after an explicit [`WsClient::close`].
    Closed,
}

/// Messages yielded by [`WsClient::next`].
#[derive(Clone, Debug)]
pub enum WsMessage {
    /// A text frame that decoded as JSON.
    Json(serde_json::Value),
    /// A text frame that did not decode as JSON, yielded raw.
    Text(String),
    /// A pong frame from the peer.
    Pong,
    /// The connection was re-established after a drop; callers should
    /// resubscribe their topics.
    Reconnected,
}

/// A typed error enumeration for the WebSocket client.
#[derive(Debug, Error)]
pub enum WsClientError {
    /// Dial or upgrade failure.
    #[error("Connect failed: {0}")]
    Connect(String),
    /// The connect timeout elapsed.
    #[error("Connect timed out after {0} ms")]
    ConnectTimeout(u64),
    /// Operation requires an active connection.
    #[error("Not connected")]
    NotConnected,
    /// Failure sending a frame.
    #[error("Send failed: {0}")]
    Send(String),
    /// The reconnect schedule configuration was invalid.
    #[error("Invalid backoff configuration: {0}")]
    Backoff(&'static str),
}

/// A single-URL WebSocket connection with autonomous recovery.
pub struct WsClient {
    config: WsConfig,
    stream: Option<WsStream>,
    state: ConnectionState,
    backoff: ExponentialBackoff,
    heartbeat: Option<tokio::time::Interval>,
}

impl Debug for WsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(WsClient))
            .field("url", &self.config.url)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl WsClient {
    /// Dials the configured URL and returns a connected client.
    ///
    /// # Errors
    ///
    /// Returns [`WsClientError::Backoff`] for an invalid reconnect schedule,
    /// [`WsClientError::ConnectTimeout`] if the dial exceeds the configured
    /// timeout, or [`WsClientError::Connect`] on any other handshake failure.
    pub async fn connect(config: WsConfig) -> Result<Self, WsClientError> {
        let backoff = ExponentialBackoff::new(
            Duration::from_millis(config.reconnect_delay_initial_ms),
            Duration::from_millis(config.reconnect_delay_max_ms),
            config.reconnect_backoff_factor,
            config.reconnect_jitter_ms,
            false,
        )
        .map_err(WsClientError::Backoff)?;

        let mut client = Self {
            config,
            stream: None,
            state: ConnectionState::Disconnected,
            backoff,
            heartbeat: None,
        };
        client.dial().await?;
        Ok(client)
    }

    /// Returns the current connection state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` while the socket is connected.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    /// Sends a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`WsClientError::NotConnected`] if no socket is active or
    /// [`WsClientError::Send`] on a transport failure.
    pub async fn send_text(&mut self, text: &str) -> Result<(), WsClientError> {
        let stream = self.stream.as_mut().ok_or(WsClientError::NotConnected)?;
        stream
            .send(Message::Text(text.to_string().into()))
            .await
            .map_err(|e| WsClientError::Send(e.to_string()))
    }

    /// Awaits the next message, reconnecting autonomously on transport
    /// failures.
    ///
    /// Returns `None` only after an explicit [`WsClient::close`].
    pub async fn next(&mut self) -> Option<WsMessage> {
        loop {
            match self.state {
                ConnectionState::Closed => return None,
                ConnectionState::Connected => {}
                _ => {
                    if self.reconnect_with_backoff().await {
                        return Some(WsMessage::Reconnected);
                    }
                    continue;
                }
            }

            // Split borrows so the heartbeat arm can write to the socket.
            let (stream_slot, heartbeat_slot, heartbeat_msg) = (
                &mut self.stream,
                &mut self.heartbeat,
                &self.config.heartbeat_msg,
            );
            let Some(stream) = stream_slot.as_mut() else {
                self.begin_reconnect();
                continue;
            };

            let frame = if let Some(heartbeat) = heartbeat_slot.as_mut() {
                tokio::select! {
                    _ = heartbeat.tick() => None,
                    frame = stream.next() => Some(frame),
                }
            } else {
                Some(stream.next().await)
            };

            let Some(frame) = frame else {
                // Heartbeat tick round: send the application ping, if any.
                if let Some(msg) = heartbeat_msg.as_deref()
                    && let Err(err) = stream.send(Message::Text(msg.to_string().into())).await
                {
                    tracing::warn!(error = %err, "Heartbeat send failed");
                    self.begin_reconnect();
                }
                continue;
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return Some(match serde_json::from_str(text.as_str()) {
                        Ok(value) => WsMessage::Json(value),
                        Err(_) => WsMessage::Text(text.to_string()),
                    });
                }
                Some(Ok(Message::Ping(payload))) => {
                    if let Some(stream) = self.stream.as_mut()
                        && let Err(err) = stream.send(Message::Pong(payload)).await
                    {
                        tracing::warn!(error = %err, "Pong send failed");
                        self.begin_reconnect();
                    }
                }
                Some(Ok(Message::Pong(_))) => return Some(WsMessage::Pong),
                Some(Ok(Message::Binary(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "Connection closed by peer");
                    self.begin_reconnect();
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "WebSocket transport error");
                    self.begin_reconnect();
                }
                None => self.begin_reconnect(),
            }
        }
    }

    /// Closes the connection and moves to the terminal state.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
        self.state = ConnectionState::Closed;
    }

    fn begin_reconnect(&mut self) {
        self.stream = None;
        self.heartbeat = None;
        self.state = ConnectionState::Reconnecting;
    }

    async fn reconnect_with_backoff(&mut self) -> bool {
        let delay = self.backoff.next_duration();
        if !delay.is_zero() {
            tracing::debug!(
                delay_ms = delay.as_millis() as u64,
                url = %self.config.url,
                "Reconnect backoff"
            );
            tokio::time::sleep(delay).await;
        }

        match self.dial().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, url = %self.config.url, "Reconnect attempt failed");
                self.state = ConnectionState::Reconnecting;
                false
            }
        }
    }

    async fn dial(&mut self) -> Result<(), WsClientError> {
        self.state = ConnectionState::Connecting;

        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WsClientError::Connect(e.to_string()))?;
        for (name, value) in &self.config.headers {
            let name: http::HeaderName = name
                .parse()
                .map_err(|_| WsClientError::Connect(format!("Invalid header name '{name}'")))?;
            let value = value
                .parse()
                .map_err(|_| WsClientError::Connect("Invalid header value".to_string()))?;
            request.headers_mut().insert(name, value);
        }

        let timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let (stream, _response) = match tokio::time::timeout(timeout, connect_async(request)).await
        {
            Ok(Ok(pair)) => pair,
            Ok(Err(err)) => {
                self.state = ConnectionState::Disconnected;
                return Err(WsClientError::Connect(err.to_string()));
            }
            Err(_) => {
                self.state = ConnectionState::Disconnected;
                return Err(WsClientError::ConnectTimeout(self.config.connect_timeout_ms));
            }
        };

        self.stream = Some(stream);
        self.state = ConnectionState::Connected;
        self.backoff.reset();
        self.heartbeat = self.config.heartbeat_secs.map(|secs| {
            let mut interval = tokio::time::interval(Duration::from_secs(secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval.reset();
            interval
        });

        tracing::debug!(url = %self.config.url, "Connected");
        Ok(())
    }
}
