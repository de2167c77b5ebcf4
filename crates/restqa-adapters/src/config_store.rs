use crate::{atomic_write, ensure_parent_dir};
use restqa_error::{RestqaError, Result};
use restqa_types::ProjectConfig;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Read side of the project descriptor.
///
/// There is no cache: every call re-parses the file so edits made outside
/// the process are visible on the next request.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn read(&self, path: &Path) -> Result<ProjectConfig> {
        debug!(path = %path.display(), "reading project configuration");

        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RestqaError::ConfigNotFound(path.to_path_buf()),
            _ => RestqaError::io("read", path, e),
        })?;

        let config: ProjectConfig = serde_yaml::from_str(&content)
            .map_err(|e| RestqaError::malformed_config(path, e))?;
        config
            .validate()
            .map_err(|e| RestqaError::malformed_config(path, e))?;

        Ok(config)
    }
}

/// Write `value` as a YAML document, starting with a `---` marker.
pub fn write_yaml_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_yaml::to_string(value)?;
    let mut doc = String::with_capacity(body.len() + 4);
    doc.push_str("---\n");
    doc.push_str(&body);

    ensure_parent_dir(path)?;
    atomic_write(path, doc.as_bytes())?;
    info!(path = %path.display(), "wrote yaml document");
    Ok(())
}
