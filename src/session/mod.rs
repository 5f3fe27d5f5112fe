//! Wallet session layer
//!
//! Owns the connect/disconnect state machine for the active wallet identity.
//! The concrete connector transport (browser extension, embedded signer,
//! test double) lives behind [`WalletConnector`]; the session layer only sees
//! an address or a typed failure.

pub mod manager;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::ProfileType;

pub use manager::{SessionError, WalletSessionManager};

/// Errors from the connector handshake
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Connector transport unavailable or handshake failed
    #[error("Wallet connector unavailable: {0}")]
    Unavailable(String),

    /// The user rejected the connection request
    #[error("Connection rejected by user: {0}")]
    Rejected(String),

    /// A handshake is already in flight
    #[error("A connection handshake is already in progress")]
    HandshakeInProgress,
}

/// Connection state of the wallet session
///
/// Cyclic by design: `disconnect` always returns to `Disconnected`, the
/// initial state. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// In-memory session for the currently active wallet identity
///
/// Invariant: `address` is `Some` iff `connection_state == Connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    pub address: Option<String>,

    pub connection_state: ConnectionState,

    /// Role loaded from the persisted profile on connect, or the default
    /// `Seeker` for a new address. `None` while disconnected.
    pub profile_type: Option<ProfileType>,
}

impl WalletSession {
    /// The initial (and post-disconnect) session
    pub fn disconnected() -> Self {
        Self {
            address: None,
            connection_state: ConnectionState::Disconnected,
            profile_type: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state == ConnectionState::Connected
    }
}

/// Handshake boundary to the external wallet connector
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Run the connector handshake and return the connected address
    async fn connect(&self) -> Result<String, ConnectionError>;

    /// Tear down the connector-side session
    async fn disconnect(&self) {}
}
