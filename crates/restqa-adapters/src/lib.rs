//! Std adapters for restqa.
//!
//! In clean-arch terms: this is where we touch the world. Everything that
//! reads or writes a file, or talks to the network, lives here.

mod config_store;
mod features;
mod generator;
mod preferences;

pub use config_store::{ConfigStore, write_yaml_document};
pub use features::{FEATURE_EXTENSION, FeatureRepository, IGNORED_DIR};
pub use generator::{
    CurlRequest, CurlScenarioGenerator, DEFAULT_FETCH_TIMEOUT, ScenarioGenerator, split_command,
};
pub use preferences::PreferencesStore;

use restqa_error::{RestqaError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replace `path` with `bytes` via a sibling temp file and a rename, so
/// readers never observe a half-written file.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    {
        let mut f = fs::File::create(&tmp).map_err(|e| RestqaError::io("create temp", &tmp, e))?;
        f.write_all(bytes)
            .map_err(|e| RestqaError::io("write temp", &tmp, e))?;
        f.sync_all().ok();
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        RestqaError::io("rename temp onto", path, e)
    })
}

/// `create_dir_all` for the parent of `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| RestqaError::io("create dir", parent, e))?;
        }
    }
    Ok(())
}
