//! Durable profile storage
//!
//! One row per wallet address, mapping it to the chosen marketplace role and
//! an optional display name. Rows are created on first successful connection,
//! updated by explicit profile changes, and never auto-deleted; this is the
//! only state that survives a process restart.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::types::ProfileType;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Durable association between a wallet address and a chosen role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProfile {
    /// Database row id (None if not yet inserted)
    pub id: Option<i64>,

    /// Wallet address, unique per row
    pub address: String,

    pub profile_type: ProfileType,

    pub display_name: Option<String>,

    /// Unix timestamp of row creation
    pub created_at: u64,

    /// Unix timestamp of last update
    pub updated_at: u64,
}

impl ProfileType {
    /// Database string representation
    fn to_db_string(self) -> &'static str {
        match self {
            ProfileType::Landowner => "landowner",
            ProfileType::Seeker => "seeker",
        }
    }

    /// Parse from database string
    fn from_db_string(s: &str) -> Result<Self, StorageError> {
        match s {
            "landowner" => Ok(ProfileType::Landowner),
            "seeker" => Ok(ProfileType::Seeker),
            _ => Err(StorageError::InvalidData(format!(
                "Invalid profile type: {}",
                s
            ))),
        }
    }
}

/// SQLite-backed profile store
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Open (or create) the profile database under `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("profiles.db");

        log::info!("Opening profile database: {}", db_path.display());

        let conn = Connection::open(&db_path)?;
        Self::init_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Open an in-memory store (tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profiles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL UNIQUE,
                profile_type TEXT NOT NULL CHECK(profile_type IN ('landowner', 'seeker')),
                display_name TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_profiles_address ON profiles(address)",
            [],
        )?;

        log::debug!("✓ Profile schema initialized");

        Ok(())
    }

    /// Profile row for `address`, if one exists
    pub fn get(&self, address: &str) -> Result<Option<PersistedProfile>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, address, profile_type, display_name, created_at, updated_at
             FROM profiles WHERE address = ?1",
        )?;

        let profile = stmt
            .query_row(params![address], |row| {
                Ok(PersistedProfile {
                    id: Some(row.get(0)?),
                    address: row.get(1)?,
                    profile_type: ProfileType::from_db_string(&row.get::<_, String>(2)?)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                2,
                                rusqlite::types::Type::Text,
                                Box::new(e),
                            )
                        })?,
                    display_name: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })
            .optional()?;

        Ok(profile)
    }

    /// Insert or update the profile row for `address`
    ///
    /// Creates the row with the given role on first sight of the address;
    /// otherwise updates the role in place. `created_at` is preserved across
    /// updates.
    pub fn upsert(
        &mut self,
        address: &str,
        profile_type: ProfileType,
    ) -> Result<PersistedProfile, StorageError> {
        let now = chrono::Utc::now().timestamp() as u64;

        self.conn.execute(
            "INSERT INTO profiles (address, profile_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(address) DO UPDATE SET
                 profile_type = excluded.profile_type,
                 updated_at = excluded.updated_at",
            params![address, profile_type.to_db_string(), now],
        )?;

        log::debug!("✓ Upserted profile for {} as {}", address, profile_type);

        // Re-read so the caller sees the stored row, id included
        self.get(address)?.ok_or_else(|| {
            StorageError::InvalidData(format!("Profile for {} missing after upsert", address))
        })
    }

    /// Set the display name for an existing profile row
    pub fn set_display_name(
        &mut self,
        address: &str,
        display_name: Option<&str>,
    ) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp() as u64;

        let changed = self.conn.execute(
            "UPDATE profiles SET display_name = ?1, updated_at = ?2 WHERE address = ?3",
            params![display_name, now, address],
        )?;

        if changed == 0 {
            return Err(StorageError::InvalidData(format!(
                "No profile row for address {}",
                address
            )));
        }

        Ok(())
    }

    /// Number of stored profiles
    pub fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
