use crate::atomic_write;
use restqa_error::{RestqaError, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

pub const FEATURE_EXTENSION: &str = "feature";

/// Dependency-manager directory skipped while listing.
pub const IGNORED_DIR: &str = "node_modules";

/// Feature files under a test root, addressed by root-relative paths.
#[derive(Debug, Clone)]
pub struct FeatureRepository {
    root: PathBuf,
}

impl FeatureRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every `*.feature` file below the root, `/`-separated and sorted.
    ///
    /// A root that does not exist yields an empty list. Hidden entries and
    /// `node_modules` are skipped, and so are entries that cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let root = self.absolute_root()?;
        let pattern = format!(
            "{}/**/*.{FEATURE_EXTENSION}",
            glob::Pattern::escape(&root.to_string_lossy())
        );
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: true,
        };
        let entries = glob::glob_with(&pattern, options)
            .map_err(|e| RestqaError::InvalidRequest(e.to_string()))?;

        let mut out = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(
                        path = %e.path().display(),
                        error = %e.error(),
                        "skipping unreadable entry"
                    );
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&root) else {
                continue;
            };
            if relative.components().any(|c| {
                let name = c.as_os_str();
                name == IGNORED_DIR || name.to_string_lossy().starts_with('.')
            }) {
                continue;
            }
            out.push(to_slash(relative));
        }

        out.sort();
        debug!(root = %root.display(), count = out.len(), "listed feature files");
        Ok(out)
    }

    /// The root made absolute with `.` components dropped, so glob matches
    /// strip back to root-relative paths.
    fn absolute_root(&self) -> Result<PathBuf> {
        let absolute = std::path::absolute(&self.root)
            .map_err(|e| RestqaError::io("resolve", &self.root, e))?;
        Ok(absolute
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect())
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(RestqaError::FileNotFound(PathBuf::from(relative)));
        }
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RestqaError::FileNotFound(PathBuf::from(relative)),
            _ => RestqaError::io("read", &path, e),
        })
    }

    /// Replace the whole content of an existing feature file.
    ///
    /// Never creates: a missing target is `FileNotFound`.
    pub fn update(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(RestqaError::FileNotFound(PathBuf::from(relative)));
        }
        atomic_write(&path, content.as_bytes())?;
        info!(file = relative, bytes = content.len(), "updated feature file");
        Ok(())
    }

    /// Join `relative` onto the root, refusing anything that could escape it.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if relative.is_empty() || rel.has_root() {
            return Err(RestqaError::InvalidFeaturePath(relative.to_string()));
        }
        for component in rel.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(RestqaError::InvalidFeaturePath(relative.to_string()));
                }
            }
        }
        Ok(self.root.join(rel))
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
