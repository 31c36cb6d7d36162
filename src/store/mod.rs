pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::TransactionError;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub puzzles: sled::Tree,
    pub attempts: sled::Tree,
    pub users: sled::Tree,
    pub config_versions: sled::Tree,
    // Secondary index trees
    pub attempt_ids: sled::Tree,
    pub solved: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("attempt already reviewed: {0}")]
    AlreadyReviewed(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl From<TransactionError<StoreError>> for StoreError {
    fn from(error: TransactionError<StoreError>) -> Self {
        match error {
            TransactionError::Abort(store_error) => store_error,
            TransactionError::Storage(storage_error) => StoreError::Sled(storage_error),
        }
    }
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let puzzles = db.open_tree(trees::PUZZLES)?;
        let attempts = db.open_tree(trees::ATTEMPTS)?;
        let users = db.open_tree(trees::USERS)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;
        let attempt_ids = db.open_tree(trees::ATTEMPT_IDS)?;
        let solved = db.open_tree(trees::SOLVED)?;

        Ok(Self {
            db,
            puzzles,
            attempts,
            users,
            config_versions,
            attempt_ids,
            solved,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
