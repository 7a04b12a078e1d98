mod config;
mod error;
mod models;
mod store;
mod timestamp;

pub use config::FirebaseConfig;
pub use error::FirebaseDaoError;
pub use store::FirebaseGameStore;

use crate::dao::storage::StorageError;

impl From<FirebaseDaoError> for StorageError {
    fn from(err: FirebaseDaoError) -> Self {
        match err {
            FirebaseDaoError::TransactionConflict { .. } => StorageError::conflict(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
