use std::fmt;

use serde::{Deserialize, Serialize};

/// Health of the event stream connection.
///
/// `connecting -> connected` on open, `connecting | connected -> error` on
/// failure. Only an explicit reconnect moves `error` back to `connecting`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    pub fn opened(self) -> Self {
        match self {
            ConnectionState::Connecting | ConnectionState::Connected => ConnectionState::Connected,
            ConnectionState::Error => {
                tracing::warn!("stream reported open while in error state");
                ConnectionState::Error
            }
        }
    }

    pub fn failed(self) -> Self {
        ConnectionState::Error
    }

    pub fn reconnecting(self) -> Self {
        ConnectionState::Connecting
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        }
    }

    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Connecting...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Error => "Disconnected / error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
