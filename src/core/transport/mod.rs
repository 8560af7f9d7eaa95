//! MQTT link to the telemetry broker
//!
//! Split into a pure connection state machine (this module) and the
//! I/O-carrying client ([`mqtt`]). The state machine is driven by link
//! events so reconnect behavior is testable without a broker.

mod mqtt;

pub use mqtt::MqttLink;

use std::fmt;
use thiserror::Error;

/// Connection lifecycle state, owned exclusively by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection and no attempt in flight
    #[default]
    Disconnected,
    /// Handshake in progress or scheduled after a retry delay
    Connecting,
    /// Broker acknowledged the connection
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// Events driving the connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A connection attempt has started
    AttemptStarted,
    /// The broker acknowledged the handshake
    HandshakeCompleted,
    /// The handshake failed before the broker acknowledged
    HandshakeFailed,
    /// An established connection was lost
    ConnectionLost,
}

impl ConnectionState {
    /// Apply one link event.
    ///
    /// Failed handshakes keep the link in `Connecting`; retries are
    /// unbounded and only a completed handshake reaches `Connected`.
    pub fn on_event(self, event: LinkEvent) -> Self {
        match (self, event) {
            (_, LinkEvent::AttemptStarted) => Self::Connecting,
            (Self::Connecting, LinkEvent::HandshakeCompleted) => Self::Connected,
            (Self::Connecting, LinkEvent::HandshakeFailed) => Self::Connecting,
            (_, LinkEvent::ConnectionLost) => Self::Disconnected,
            (state, _) => state,
        }
    }
}

/// Transport error types.
///
/// Connect-phase failures never surface here; [`MqttLink::poll`] absorbs
/// them into the state machine and the retry timer.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The client-side request queue is gone (event loop dropped)
    #[error("send error: {0}")]
    SendError(String),
}
