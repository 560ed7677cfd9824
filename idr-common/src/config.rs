//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default total retry budget for transactions that hit transient
/// database lock conflicts.
pub const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

/// Environment variable overriding the root folder.
pub const ROOT_FOLDER_ENV: &str = "IDR_ROOT_FOLDER";

/// Environment variable overriding the listen address.
pub const BIND_ENV: &str = "IDR_BIND";

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Folder holding the service database.
    pub root_folder: PathBuf,
    /// Socket address the HTTP server listens on.
    pub bind: SocketAddr,
    /// Total time budget for retrying lock-conflicted transactions.
    pub max_lock_wait_ms: u64,
}

impl ServiceConfig {
    /// Path of the SQLite database inside the root folder.
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("idr.db")
    }
}

/// Resolve the full service configuration.
///
/// Each value follows the same priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. Compiled default (fallback)
pub fn resolve_config(cli_root: Option<&str>, cli_bind: Option<&str>) -> Result<ServiceConfig> {
    let file = load_config_values();

    let root_folder = resolve_root_folder(cli_root, file.as_ref());

    let bind_raw = cli_bind
        .map(str::to_string)
        .or_else(|| std::env::var(BIND_ENV).ok())
        .or_else(|| {
            file.as_ref()
                .and_then(|v| v.get("bind"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind: SocketAddr = bind_raw
        .parse()
        .map_err(|_| Error::Config(format!("Invalid bind address: {}", bind_raw)))?;

    let max_lock_wait_ms = file
        .as_ref()
        .and_then(|v| v.get("max_lock_wait_ms"))
        .and_then(|v| v.as_integer())
        .map(|v| v.max(0) as u64)
        .unwrap_or(DEFAULT_MAX_LOCK_WAIT_MS);

    Ok(ServiceConfig {
        root_folder,
        bind,
        max_lock_wait_ms,
    })
}

/// Root folder resolution following the priority order of [`resolve_config`].
pub fn resolve_root_folder(cli_arg: Option<&str>, file: Option<&toml::Value>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(root_folder) = file
        .and_then(|v| v.get("root_folder"))
        .and_then(|v| v.as_str())
    {
        return PathBuf::from(root_folder);
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// Load the config file, if one exists, as a TOML value.
fn load_config_values() -> Option<toml::Value> {
    let path = find_config_file()?;
    let content = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<toml::Value>(&content) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("Ignoring malformed config file {:?}: {}", path, err);
            None
        }
    }
}

/// Find the configuration file path for the platform.
fn find_config_file() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/idr/config.toml first, then /etc/idr/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("idr").join("config.toml")) {
            if path.exists() {
                return Some(path);
            }
        }
        let system_config = PathBuf::from("/etc/idr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        None
    } else {
        let path = dirs::config_dir().map(|d| d.join("idr").join("config.toml"))?;
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }
}

/// OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/idr (or /var/lib/idr for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("idr"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/idr"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/idr
        dirs::data_dir()
            .map(|d| d.join("idr"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/idr"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\idr
        dirs::data_local_dir()
            .map(|d| d.join("idr"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\idr"))
    } else {
        PathBuf::from("./idr_data")
    }
}
