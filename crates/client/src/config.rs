//! Client configuration loaded from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use tactics_runtime::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Seed for the skirmish. Same seed, same combat.
    pub seed: u64,
    pub session_id: String,
    /// Directory for the session log file. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
    /// Print the combat log to stdout.
    pub narrate: bool,
    pub runtime: RuntimeConfig,
}

impl ClientConfig {
    /// Environment variables:
    /// - `TACTICS_SEED` - Skirmish seed (default: 7)
    /// - `TACTICS_SESSION` - Session id used for the log file name (default: timestamp)
    /// - `TACTICS_LOG_DIR` - Enables file logging into this directory
    /// - `TACTICS_QUIET` - Suppress the combat log on stdout
    ///
    /// Runtime settings come from [`RuntimeConfig::from_env`].
    pub fn from_env() -> Self {
        let session_id = env::var("TACTICS_SESSION").unwrap_or_else(|_| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            format!("session_{secs}")
        });

        Self {
            seed: read_env("TACTICS_SEED").unwrap_or(7),
            session_id,
            log_dir: env::var_os("TACTICS_LOG_DIR").map(PathBuf::from),
            narrate: env::var_os("TACTICS_QUIET").is_none(),
            runtime: RuntimeConfig::from_env(),
        }
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
