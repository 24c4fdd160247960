//! Volatile record store used by tests and ephemeral embedding.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::{
    models::{PitchEntity, PlayerEntity, TrainingEntity},
    storage::{RecordStore, StorageResult},
};

/// Record store holding every collection in memory. Clones share the same
/// underlying collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    players: Arc<Mutex<Vec<PlayerEntity>>>,
    pitches: Arc<Mutex<Vec<PitchEntity>>>,
    trainings: Arc<Mutex<Vec<TrainingEntity>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn load_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let players = self.players.clone();
        Box::pin(async move { Ok(players.lock().await.clone()) })
    }

    fn save_players(&self, records: Vec<PlayerEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let players = self.players.clone();
        Box::pin(async move {
            *players.lock().await = records;
            Ok(())
        })
    }

    fn load_pitches(&self) -> BoxFuture<'static, StorageResult<Vec<PitchEntity>>> {
        let pitches = self.pitches.clone();
        Box::pin(async move { Ok(pitches.lock().await.clone()) })
    }

    fn save_pitches(&self, records: Vec<PitchEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let pitches = self.pitches.clone();
        Box::pin(async move {
            *pitches.lock().await = records;
            Ok(())
        })
    }

    fn load_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>> {
        let trainings = self.trainings.clone();
        Box::pin(async move { Ok(trainings.lock().await.clone()) })
    }

    fn save_trainings(
        &self,
        records: Vec<TrainingEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let trainings = self.trainings.clone();
        Box::pin(async move {
            *trainings.lock().await = records;
            Ok(())
        })
    }
}
