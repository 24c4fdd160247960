pub mod match_engine;
pub mod session;

use std::sync::Arc;

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};

use crate::{config::AppConfig, dao::storage::RecordStore, state::session::Training};

/// Convenience alias for the shared application state handle.
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the record store, and the slot
/// holding the currently open session.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn RecordStore>,
    session: RwLock<Option<Training>>,
    clock: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> SharedState {
        Arc::new(Self {
            config,
            store,
            session: RwLock::new(None),
            clock: Mutex::new(None),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the record store.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Slot holding the currently open session, if any.
    pub fn session(&self) -> &RwLock<Option<Training>> {
        &self.session
    }

    /// Slot holding the countdown driver task of the active match.
    pub(crate) fn clock(&self) -> &Mutex<Option<JoinHandle<()>>> {
        &self.clock
    }
}
