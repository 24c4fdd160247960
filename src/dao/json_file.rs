//! Record store keeping each collection in a JSON array file.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tracing::info;

use crate::dao::{
    models::{PitchEntity, PlayerEntity, TrainingEntity},
    storage::{RecordStore, StorageError, StorageResult},
};

const PLAYERS_FILE: &str = "players.json";
const PITCHES_FILE: &str = "pitches.json";
const TRAININGS_FILE: &str = "trainings.json";

/// Record store backed by one pretty-printed JSON file per collection under
/// a data directory. A missing file reads as an empty collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory when missing.
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|err| {
            StorageError::unavailable(
                format!("failed to create data directory `{}`", dir.display()),
                err,
            )
        })?;
        info!(dir = %dir.display(), "json file store ready");
        Ok(Self { dir })
    }

    /// Directory the collections live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

async fn load_collection<T: DeserializeOwned>(path: PathBuf) -> StorageResult<Vec<T>> {
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(StorageError::unavailable(
                format!("failed to read `{}`", path.display()),
                err,
            ));
        }
    };
    serde_json::from_str(&contents).map_err(|err| {
        StorageError::corrupt(format!("failed to decode `{}`", path.display()), err)
    })
}

async fn save_collection<T: Serialize>(path: PathBuf, records: Vec<T>) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(&records).map_err(|err| {
        StorageError::corrupt(format!("failed to encode `{}`", path.display()), err)
    })?;
    tokio::fs::write(&path, json).await.map_err(|err| {
        StorageError::unavailable(format!("failed to write `{}`", path.display()), err)
    })
}

impl RecordStore for JsonFileStore {
    fn load_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        Box::pin(load_collection(self.collection_path(PLAYERS_FILE)))
    }

    fn save_players(&self, players: Vec<PlayerEntity>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(save_collection(self.collection_path(PLAYERS_FILE), players))
    }

    fn load_pitches(&self) -> BoxFuture<'static, StorageResult<Vec<PitchEntity>>> {
        Box::pin(load_collection(self.collection_path(PITCHES_FILE)))
    }

    fn save_pitches(&self, pitches: Vec<PitchEntity>) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(save_collection(self.collection_path(PITCHES_FILE), pitches))
    }

    fn load_trainings(&self) -> BoxFuture<'static, StorageResult<Vec<TrainingEntity>>> {
        Box::pin(load_collection(self.collection_path(TRAININGS_FILE)))
    }

    fn save_trainings(
        &self,
        trainings: Vec<TrainingEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(save_collection(
            self.collection_path(TRAININGS_FILE),
            trainings,
        ))
    }
}
