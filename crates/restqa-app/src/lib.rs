//! Application layer for restqa.
//!
//! The app layer coordinates adapters and the descriptor model.
//! It does not parse CLI flags and it does not speak HTTP.

pub mod ci;
pub mod init;
pub mod tips;

pub use ci::{ci_template, write_ci_template};
pub use init::{
    InitOutcome, InitUseCase, SampleOutcome, WELCOME_API_URL, WELCOME_FEATURE_PATH,
    scaffold_config,
};
pub use tips::{DEFAULT_TIPS, pick_tip, strip_ansi};

use restqa_adapters::{ConfigStore, FeatureRepository, PreferencesStore};
use restqa_error::{RestqaError, Result};
use restqa_types::{Preferences, ProjectConfig};
use std::path::{Path, PathBuf};

/// Folders a project service works against, fixed when it is built.
///
/// Reports are served by the transport straight from disk and are not part
/// of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFolders {
    pub test_folder: PathBuf,
}

/// Everything the transports may ask of a test project.
///
/// The dashboard server is handed an implementation at construction; tests
/// hand it the in-memory double from `restqa-fake`.
pub trait ProjectService: Send + Sync {
    fn config(&self, path: &Path) -> Result<ProjectConfig>;

    fn list_features(&self) -> Result<Vec<String>>;

    /// Raw text of one feature file.
    ///
    /// A missing file is reported as `FeatureNotFound` naming the test folder.
    fn feature(&self, file: &str) -> Result<String>;

    /// Overwrite an existing feature file. Never creates one.
    fn update_feature(&self, file: &str, content: &str) -> Result<()>;

    fn preferences(&self) -> Result<Preferences>;
}

/// Filesystem-backed [`ProjectService`].
#[derive(Debug, Clone)]
pub struct FsProjectService {
    folders: ProjectFolders,
    configs: ConfigStore,
    features: FeatureRepository,
    preferences: PreferencesStore,
}

impl FsProjectService {
    pub fn new(folders: ProjectFolders, preferences: PreferencesStore) -> Self {
        Self {
            features: FeatureRepository::new(&folders.test_folder),
            configs: ConfigStore,
            preferences,
            folders,
        }
    }

    fn not_found_in_test_folder(&self, file: &str, err: RestqaError) -> RestqaError {
        match err {
            RestqaError::FileNotFound(_) => RestqaError::FeatureNotFound {
                file: file.to_string(),
                folder: self.folders.test_folder.clone(),
            },
            other => other,
        }
    }
}

impl ProjectService for FsProjectService {
    fn config(&self, path: &Path) -> Result<ProjectConfig> {
        self.configs.read(path)
    }

    fn list_features(&self) -> Result<Vec<String>> {
        self.features.list()
    }

    fn feature(&self, file: &str) -> Result<String> {
        self.features
            .read(file)
            .map_err(|e| self.not_found_in_test_folder(file, e))
    }

    fn update_feature(&self, file: &str, content: &str) -> Result<()> {
        self.features
            .update(file, content)
            .map_err(|e| self.not_found_in_test_folder(file, e))
    }

    fn preferences(&self) -> Result<Preferences> {
        self.preferences.read()
    }
}
