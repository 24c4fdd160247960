/// JSON file backed record store.
pub mod json_file;
/// In-memory record store.
pub mod memory;
/// Persistence entity definitions.
pub mod models;
/// Storage abstraction layer shared by all record stores.
pub mod storage;
