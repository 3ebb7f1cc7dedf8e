//! Key-value persistence behind the task lists and reminder preferences.
//!
//! Every record is a JSON document stored under a string key. Two backends exist:
//! - [`InMemoryKvStore`] for local runs and tests
//! - [`SeaOrmKvStore`] backed by the `kv_entries` Postgres table

use async_trait::async_trait;
use thiserror::Error;

mod database;
pub mod kv_entry;
mod memory;

pub use database::SeaOrmKvStore;
pub use memory::InMemoryKvStore;

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// The backend could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Byte-oriented key-value store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` when nothing was ever written under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;
}
