//! Wallet session manager
//!
//! Coordinates the connector handshake, the in-memory session state machine
//! and the durable profile store. The session is a process-wide singleton;
//! only the operations here mutate it, and every transition is published to
//! subscribers through a watch channel.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::storage::{PersistedProfile, ProfileStore, StorageError};
use crate::types::ProfileType;

use super::{ConnectionError, ConnectionState, WalletConnector, WalletSession};

/// Errors from session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A write-side operation was attempted without an active session.
    /// A usage error, not a silent no-op.
    #[error("No wallet connected")]
    NotConnected,

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Profile storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owns the connect/disconnect state machine and the per-address profile
pub struct WalletSessionManager {
    connector: Arc<dyn WalletConnector>,

    /// Durable profile rows, keyed by address
    profiles: Mutex<ProfileStore>,

    /// Holds the current session snapshot and notifies subscribers on change
    session_tx: watch::Sender<WalletSession>,
}

impl WalletSessionManager {
    pub fn new(connector: Arc<dyn WalletConnector>, profiles: ProfileStore) -> Self {
        let (session_tx, _) = watch::channel(WalletSession::disconnected());

        Self {
            connector,
            profiles: Mutex::new(profiles),
            session_tx,
        }
    }

    /// Snapshot of the current session
    pub fn current(&self) -> WalletSession {
        self.session_tx.borrow().clone()
    }

    /// Subscribe to session state changes
    ///
    /// The receiver is pre-seeded with the current session; every transition
    /// publishes a fresh snapshot.
    pub fn subscribe(&self) -> watch::Receiver<WalletSession> {
        self.session_tx.subscribe()
    }

    /// Initiate the connector handshake
    ///
    /// `Disconnected -> Connecting -> Connected` on success: the address is
    /// set and the profile is loaded from the store, or created with the
    /// default `Seeker` role for a new address. On rejection or connector
    /// failure the session returns to `Disconnected` and the error surfaces.
    ///
    /// Calling while already `Connected` is a no-op returning the current
    /// session. Calling during an in-flight handshake fails with
    /// [`ConnectionError::HandshakeInProgress`] rather than racing a second
    /// handshake.
    ///
    /// A `disconnect` issued while the handshake is in flight wins: the
    /// session is no longer `Connecting` when the connector resolves, so the
    /// stale handshake result is discarded instead of resurrecting the
    /// session.
    pub async fn connect(&self) -> Result<WalletSession, SessionError> {
        match self.current().connection_state {
            ConnectionState::Connected => return Ok(self.current()),
            ConnectionState::Connecting => {
                return Err(ConnectionError::HandshakeInProgress.into());
            }
            ConnectionState::Disconnected => {}
        }

        self.session_tx.send_modify(|session| {
            session.connection_state = ConnectionState::Connecting;
        });
        log::debug!("Wallet handshake started");

        let address = match self.connector.connect().await {
            Ok(address) => address,
            Err(error) => {
                self.session_tx
                    .send_modify(|session| *session = WalletSession::disconnected());
                log::warn!("Wallet handshake failed: {}", error);
                return Err(error.into());
            }
        };

        let profile_type = match self.load_or_create_profile(&address) {
            Ok(profile) => profile.profile_type,
            Err(error) => {
                self.session_tx
                    .send_modify(|session| *session = WalletSession::disconnected());
                return Err(error.into());
            }
        };

        // Only apply the transition if nothing moved the session away from
        // `Connecting` while the handshake was suspended
        let applied = self.session_tx.send_if_modified(|session| {
            if session.connection_state != ConnectionState::Connecting {
                return false;
            }
            session.address = Some(address.clone());
            session.connection_state = ConnectionState::Connected;
            session.profile_type = Some(profile_type);
            true
        });

        if applied {
            log::info!("Wallet connected: {} ({})", address, profile_type);
        } else {
            log::debug!(
                "Handshake result for {} discarded; session left the Connecting state",
                address
            );
        }

        Ok(self.current())
    }

    /// Tear down the session
    ///
    /// Clears the address and in-memory profile type and returns to
    /// `Disconnected`. The persisted profile row is kept.
    pub async fn disconnect(&self) {
        self.connector.disconnect().await;

        self.session_tx
            .send_modify(|session| *session = WalletSession::disconnected());
        log::info!("Wallet disconnected");
    }

    /// Change the role of the connected address
    ///
    /// Updates the in-memory session and upserts the persisted row. Requires
    /// an active session; fails with [`SessionError::NotConnected`] otherwise
    /// and leaves the store untouched.
    pub fn set_profile_type(&self, profile_type: ProfileType) -> Result<(), SessionError> {
        let address = self.connected_address()?;

        {
            let mut profiles = self.profiles.lock().unwrap();
            profiles.upsert(&address, profile_type)?;
        }

        self.session_tx.send_modify(|session| {
            session.profile_type = Some(profile_type);
        });
        log::info!("Profile type for {} set to {}", address, profile_type);

        Ok(())
    }

    /// Set the display name of the connected address
    pub fn set_display_name(&self, display_name: Option<&str>) -> Result<(), SessionError> {
        let address = self.connected_address()?;

        let mut profiles = self.profiles.lock().unwrap();
        profiles.set_display_name(&address, display_name)?;

        Ok(())
    }

    /// Persisted profile row of the connected address
    pub fn profile(&self) -> Result<Option<PersistedProfile>, SessionError> {
        let address = self.connected_address()?;

        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(&address)?)
    }

    /// Address of the active session, or `NotConnected`
    pub fn connected_address(&self) -> Result<String, SessionError> {
        let session = self.current();
        match (session.is_connected(), session.address) {
            (true, Some(address)) => Ok(address),
            _ => Err(SessionError::NotConnected),
        }
    }

    /// Load the profile row for `address`, creating the default row on first
    /// successful connection of a new address
    fn load_or_create_profile(&self, address: &str) -> Result<PersistedProfile, StorageError> {
        let mut profiles = self.profiles.lock().unwrap();

        if let Some(profile) = profiles.get(address)? {
            log::debug!(
                "Loaded persisted profile for {}: {}",
                address,
                profile.profile_type
            );
            return Ok(profile);
        }

        log::debug!("No profile for {}, creating default seeker row", address);
        profiles.upsert(address, ProfileType::Seeker)
    }
}
