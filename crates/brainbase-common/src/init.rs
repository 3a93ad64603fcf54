//! Process-wide environment initialization

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static LOADED_ENV: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Load a `.env` file into the process environment.
///
/// With an explicit path the file must exist; otherwise `.env` is searched for
/// in the current directory and its parents and silently skipped when absent.
/// Variables already present in the environment are never overridden.
///
/// Safe to call multiple times - only the first call touches the filesystem.
/// Returns the file that was loaded, if any.
///
/// # Errors
/// Returns an error if an explicitly requested file cannot be read or parsed.
pub fn initialize_environment(env_file: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    if let Some(loaded) = LOADED_ENV.get() {
        return Ok(loaded.clone());
    }

    let loaded = match env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
            Some(path.to_path_buf())
        }
        None => dotenvy::dotenv().ok(),
    };

    Ok(LOADED_ENV.get_or_init(|| loaded).clone())
}
