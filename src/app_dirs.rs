use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "rapidkeys";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// History and key stats live under `$HOME/.local/state/rapidkeys`,
    /// falling back to the platform data dir.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|p| p.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|p| p.config_dir().join("config.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir()
    }
}
