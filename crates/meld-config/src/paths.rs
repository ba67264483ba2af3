//! Platform-specific paths for sessions and configuration.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/meld/` (Linux), `~/Library/Application Support/meld/` (macOS), `%APPDATA%\meld\` (Windows)
//! - **Sessions**: `sessions/` under the user config directory
//! - **Settings**: `settings.toml` under the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use meld_config::paths;
//!
//! if let Some(path) = paths::find_session("live_rig") {
//!     println!("Found session at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "meld";

/// Subdirectory name for sessions.
const SESSIONS_SUBDIR: &str = "sessions";

/// File name of the editor settings.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific sessions directory.
pub fn user_sessions_dir() -> PathBuf {
    user_config_dir().join(SESSIONS_SUBDIR)
}

/// Returns the path of the editor settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Find a session file by name.
///
/// The name can be a path to a TOML file, or a session name (with or without
/// `.toml`) looked up in the user sessions directory.
pub fn find_session(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }
    find_session_in(&user_sessions_dir(), name)
}

fn find_session_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{}.toml", name)
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure the user config directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    ensure_dir(user_config_dir())
}

/// Ensure the user sessions directory exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_sessions_dir() -> Result<PathBuf, crate::ConfigError> {
    ensure_dir(user_sessions_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, crate::ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// List session files in the user sessions directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_sessions() -> Vec<PathBuf> {
    list_sessions_in(&user_sessions_dir())
}

/// List session files in `dir`, sorted by path.
pub fn list_sessions_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut sessions: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    sessions.sort();
    sessions
}

/// Get the session name from a file path (the file stem).
///
/// ```rust
/// use meld_config::paths::session_name_from_path;
/// use std::path::Path;
///
/// let name = session_name_from_path(Path::new("/path/to/live_rig.toml"));
/// assert_eq!(name, Some("live_rig".to_string()));
/// ```
pub fn session_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
