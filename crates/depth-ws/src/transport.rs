//! WebSocket transport abstraction
//!
//! Venue feeds talk to the network only through [`Transport`], and sessions
//! obtain transports only through a [`Connector`]. Tests swap both for the
//! in-memory [`MockTransport`] / [`MockConnector`] pair.
//!
//! # Example
//!
//! ```no_run
//! use depth_ws::transport::{Transport, TransportError, WsTransport};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let mut transport = WsTransport::new("wss://ws.okx.com:8443/ws/v5/public");
//!     transport.connect().await?;
//!     transport.send("ping").await?;
//!     if let Some(response) = transport.recv().await? {
//!         println!("Received: {}", response);
//!     }
//!     Ok(())
//! }
//! ```

use crate::endpoint::Endpoint;
use async_trait::async_trait;
use depth_types::FeedError;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument};

/// Default time allowed for the WebSocket handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    #[error("connection timeout after {0:?}")]
    Timeout(Duration),

    #[error("not connected")]
    NotConnected,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<TransportError> for FeedError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionClosed => FeedError::ConnectionClosed,
            other => FeedError::transport(other),
        }
    }
}

/// A text-frame WebSocket connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the WebSocket endpoint
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Send a text message
    async fn send(&mut self, message: &str) -> Result<(), TransportError>;

    /// Receive a text message
    ///
    /// Returns `None` if the connection was closed gracefully.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get the endpoint URL
    fn endpoint(&self) -> &str;
}

/// Creates unconnected transports for an endpoint
pub trait Connector: Send + Sync {
    fn transport(&self, endpoint: &Endpoint) -> Box<dyn Transport>;
}

/// Real WebSocket transport using tokio-tungstenite
pub struct WsTransport {
    url: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for WsTransport {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn connect(&mut self) -> Result<(), TransportError> {
        debug!("Connecting to WebSocket");

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_async(&self.url))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        self.stream = Some(ws_stream);
        debug!("WebSocket connected");
        Ok(())
    }

    #[instrument(skip(self, message), fields(len = message.len()))]
    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        stream
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Server closed WebSocket");
                    self.stream = None;
                    return Ok(None);
                }
                // tungstenite answers pings itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
                None => {
                    self.stream = None;
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Connector producing [`WsTransport`]s
#[derive(Debug, Clone)]
pub struct WsConnector {
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl Connector for WsConnector {
    fn transport(&self, endpoint: &Endpoint) -> Box<dyn Transport> {
        Box::new(WsTransport::new(endpoint.url()).with_timeout(self.connect_timeout))
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockConnector, MockHandle, MockTransport};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    type Inbound = Result<Option<String>, TransportError>;

    #[derive(Debug, Default)]
    struct MockState {
        connected: bool,
        sent: Vec<String>,
        fail_connect: bool,
        fail_send: bool,
        close_calls: usize,
    }

    /// Mock transport for testing
    ///
    /// Inbound frames are pushed through a [`MockHandle`]; `recv` waits until
    /// one arrives, and reports `ConnectionClosed` once every handle is gone.
    pub struct MockTransport {
        url: String,
        state: Arc<Mutex<MockState>>,
        inbound: mpsc::UnboundedReceiver<Inbound>,
    }

    /// Test-side view of a [`MockTransport`]
    #[derive(Clone)]
    pub struct MockHandle {
        url: String,
        state: Arc<Mutex<MockState>>,
        inbound: mpsc::UnboundedSender<Inbound>,
    }

    impl MockTransport {
        pub fn new(url: impl Into<String>) -> (Self, MockHandle) {
            let url = url.into();
            let state = Arc::new(Mutex::new(MockState::default()));
            let (tx, rx) = mpsc::unbounded_channel();
            let transport = Self {
                url: url.clone(),
                state: state.clone(),
                inbound: rx,
            };
            let handle = MockHandle {
                url,
                state,
                inbound: tx,
            };
            (transport, handle)
        }
    }

    impl MockHandle {
        /// Queue a text frame for `recv`
        pub fn push_response(&self, msg: impl Into<String>) {
            let _ = self.inbound.send(Ok(Some(msg.into())));
        }

        pub fn push_responses(&self, msgs: impl IntoIterator<Item = impl Into<String>>) {
            for msg in msgs {
                self.push_response(msg);
            }
        }

        /// Simulate a graceful close
        pub fn push_close(&self) {
            let _ = self.inbound.send(Ok(None));
        }

        /// Simulate a receive error
        pub fn push_error(&self, error: TransportError) {
            let _ = self.inbound.send(Err(error));
        }

        pub fn set_fail_connect(&self, fail: bool) {
            self.state.lock().fail_connect = fail;
        }

        pub fn set_fail_send(&self, fail: bool) {
            self.state.lock().fail_send = fail;
        }

        /// Messages sent so far
        pub fn sent(&self) -> Vec<String> {
            self.state.lock().sent.clone()
        }

        /// Drain sent messages
        pub fn take_sent(&self) -> Vec<String> {
            std::mem::take(&mut self.state.lock().sent)
        }

        pub fn is_connected(&self) -> bool {
            self.state.lock().connected
        }

        /// Number of `close` calls
        pub fn close_calls(&self) -> usize {
            self.state.lock().close_calls
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<(), TransportError> {
            let mut state = self.state.lock();
            if state.fail_connect {
                return Err(TransportError::ConnectionFailed("mock connection failure".into()));
            }
            state.connected = true;
            Ok(())
        }

        async fn send(&mut self, message: &str) -> Result<(), TransportError> {
            let mut state = self.state.lock();
            if !state.connected {
                return Err(TransportError::NotConnected);
            }
            if state.fail_send {
                return Err(TransportError::SendFailed("mock send failure".into()));
            }
            state.sent.push(message.to_string());
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<String>, TransportError> {
            if !self.state.lock().connected {
                return Err(TransportError::NotConnected);
            }
            let next = self
                .inbound
                .recv()
                .await
                .unwrap_or(Err(TransportError::ConnectionClosed));
            if matches!(next, Ok(None) | Err(TransportError::ConnectionClosed)) {
                self.state.lock().connected = false;
            }
            next
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            let mut state = self.state.lock();
            state.connected = false;
            state.close_calls += 1;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.state.lock().connected
        }

        fn endpoint(&self) -> &str {
            &self.url
        }
    }

    /// Connector handing out [`MockTransport`]s and keeping their handles
    #[derive(Clone, Default)]
    pub struct MockConnector {
        handles: Arc<Mutex<Vec<MockHandle>>>,
        fail_connect: Arc<Mutex<bool>>,
    }

    impl MockConnector {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every transport created from now on refuse to connect
        pub fn set_fail_connect(&self, fail: bool) {
            *self.fail_connect.lock() = fail;
        }

        /// Handles of every transport created, oldest first
        pub fn handles(&self) -> Vec<MockHandle> {
            self.handles.lock().clone()
        }

        /// Handle of the most recently created transport
        pub fn last(&self) -> Option<MockHandle> {
            self.handles.lock().last().cloned()
        }

        pub fn created(&self) -> usize {
            self.handles.lock().len()
        }
    }

    impl Connector for MockConnector {
        fn transport(&self, endpoint: &Endpoint) -> Box<dyn Transport> {
            let (transport, handle) = MockTransport::new(endpoint.url());
            handle.set_fail_connect(*self.fail_connect.lock());
            self.handles.lock().push(handle);
            Box::new(transport)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_send_recv() {
        let (mut transport, handle) = MockTransport::new("wss://mock.test");
        handle.push_response(r#"{"event":"subscribe"}"#);

        transport.connect().await.unwrap();
        assert!(transport.is_connected());

        transport.send(r#"{"op":"subscribe"}"#).await.unwrap();
        assert_eq!(handle.sent().len(), 1);
        assert!(handle.sent()[0].contains("subscribe"));

        let response = transport.recv().await.unwrap();
        assert!(response.unwrap().contains("event"));
    }

    #[tokio::test]
    async fn test_mock_transport_connection_failure() {
        let (mut transport, handle) = MockTransport::new("wss://mock.test");
        handle.set_fail_connect(true);

        assert!(transport.connect().await.is_err());
        assert!(!transport.is_connected());
        assert_eq!(
            transport.send("x").await,
            Err(TransportError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_mock_transport_close() {
        let (mut transport, handle) = MockTransport::new("wss://mock.test");
        handle.push_close();

        transport.connect().await.unwrap();
        let response = transport.recv().await.unwrap();
        assert!(response.is_none());
        assert!(!handle.is_connected());
    }

    #[tokio::test]
    async fn test_mock_connector_tracks_transports() {
        let connector = MockConnector::new();
        let mut first = connector.transport(&Endpoint::Custom("wss://a.test".into()));
        let _second = connector.transport(&Endpoint::Custom("wss://b.test".into()));

        first.connect().await.unwrap();
        assert_eq!(connector.created(), 2);
        assert!(connector.handles()[0].is_connected());
        assert_eq!(connector.last().unwrap().url(), "wss://b.test");
    }

    #[test]
    fn test_transport_error_into_feed_error() {
        assert_eq!(FeedError::from(TransportError::ConnectionClosed), FeedError::ConnectionClosed);
        assert!(FeedError::from(TransportError::NotConnected).is_transport());
    }
}
