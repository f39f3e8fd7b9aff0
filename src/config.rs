use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// The designated default network identifier.
pub const MAINNET: &str = "mainnet";

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("NONCE_LEDGER_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "nonceledger", "nonce-ledger") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Network used when a caller omits the network argument.
    pub default_network: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_network: MAINNET.to_string(),
        }
    }
}

impl Config {
    /// Create a config with a different default network.
    pub fn with_default_network(network: &str) -> Self {
        Self {
            default_network: network.to_string(),
        }
    }
}
