use restqa_error::{RestqaError, Result};
use restqa_types::Preferences;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of the user-level preferences document.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.config/restqa.pref`, falling back to the working directory when no
    /// home directory can be determined.
    pub fn default_location() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(".config").join("restqa.pref"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Preferences> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preferences file, using defaults");
                return Ok(Preferences::new());
            }
            Err(e) => return Err(RestqaError::io("read", &self.path, e)),
        };

        serde_json::from_str::<Preferences>(&content).map_err(|e| {
            RestqaError::MalformedPreferences {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })
    }
}
