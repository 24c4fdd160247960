//! Storage abstraction shared by every record store backend.

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::models::{PitchEntity, PlayerEntity, TrainingEntity};

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Description of the failing operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A collection was read but its contents could not be decoded.
    #[error("storage corrupt: {message}")]
    Corrupt {
        /// Description of the offending collection.
        message: String,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a corrupt-data error from a decode failure.
    pub fn corrupt(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Corrupt {
            message,
            source: Box::new(source),
        }
    }
}

/// Persistence operations for the three flat collections the app keeps.
///
/// Collections are loaded and saved whole; there are no partial updates.
pub trait RecordStore: Send + Sync {
    fn load_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;

    fn save_players(&self, players: Vec<PlayerEntity>) -> BoxFuture<'static, StorageResult<()>>;

    fn load_pitches(&self) -> BoxFuture<'static, StorageResult<Vec<PitchEntity>>>;

    fn save_pitches(&self, pitches: Vec<PitchEntity>) -> BoxFuture<'static, StorageResult<()>>;

    fn load_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>>;

    fn save_trainings(
        &self,
        trainings: Vec<TrainingEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
}
