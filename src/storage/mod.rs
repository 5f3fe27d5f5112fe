//! Durable local storage
//!
//! The only state that outlives a session: the per-address profile rows.

pub mod profile_store;

pub use profile_store::{PersistedProfile, ProfileStore, StorageError};
