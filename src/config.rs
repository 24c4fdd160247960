//! Application-level configuration loading.

use std::{env, path::PathBuf};

use tracing::{info, warn};

/// Default directory holding the persisted collections.
const DEFAULT_DATA_DIR: &str = "data";
/// Environment variable that overrides [`DEFAULT_DATA_DIR`].
const DATA_DIR_ENV: &str = "KICKABOUT_DATA_DIR";
/// Default match length offered when creating a session, in minutes.
const DEFAULT_MATCH_MINUTES: u32 = 10;
/// Environment variable that overrides [`DEFAULT_MATCH_MINUTES`].
const MATCH_MINUTES_ENV: &str = "KICKABOUT_DEFAULT_MATCH_MINUTES";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory the JSON file store keeps its collections in.
    pub data_dir: PathBuf,
    /// Default match length for new sessions, in minutes.
    pub default_match_minutes: u32,
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to baked-in
    /// defaults.
    pub fn from_env() -> Self {
        let data_dir = match env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
            Some(value) => {
                let dir = PathBuf::from(value);
                info!(dir = %dir.display(), "using data directory from environment");
                dir
            }
            None => PathBuf::from(DEFAULT_DATA_DIR),
        };

        let default_match_minutes = match env::var(MATCH_MINUTES_ENV) {
            Ok(raw) => match raw.parse::<u32>() {
                Ok(minutes) if minutes >= 1 => {
                    info!(minutes, "using default match length from environment");
                    minutes
                }
                _ => {
                    warn!(
                        value = %raw,
                        fallback = DEFAULT_MATCH_MINUTES,
                        "invalid default match length in environment; falling back"
                    );
                    DEFAULT_MATCH_MINUTES
                }
            },
            Err(_) => DEFAULT_MATCH_MINUTES,
        };

        Self {
            data_dir,
            default_match_minutes,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_match_minutes: DEFAULT_MATCH_MINUTES,
        }
    }
}
