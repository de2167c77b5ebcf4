//! Test doubles for restqa.
//!
//! [`FakeProjectService`] keeps the project in memory and mirrors the error
//! semantics of the filesystem service. [`FakeScenarioGenerator`] answers
//! every command with canned steps (or a canned failure) and records what it
//! was asked.

use async_trait::async_trait;
use restqa_adapters::ScenarioGenerator;
use restqa_app::{ProjectFolders, ProjectService};
use restqa_error::{RestqaError, Result};
use restqa_types::{Preferences, ProjectConfig};
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// In-memory [`ProjectService`].
#[derive(Debug)]
pub struct FakeProjectService {
    folders: ProjectFolders,
    configs: Mutex<HashMap<PathBuf, ProjectConfig>>,
    features: Mutex<BTreeMap<String, String>>,
    preferences: Mutex<Preferences>,
}

impl Default for FakeProjectService {
    fn default() -> Self {
        Self::new(ProjectFolders {
            test_folder: PathBuf::from("/project/tests"),
        })
    }
}

impl FakeProjectService {
    pub fn new(folders: ProjectFolders) -> Self {
        Self {
            folders,
            configs: Mutex::new(HashMap::new()),
            features: Mutex::new(BTreeMap::new()),
            preferences: Mutex::new(Preferences::new()),
        }
    }

    pub fn with_config(self, path: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        self.configs
            .lock()
            .expect("lock poisoned")
            .insert(path.into(), config);
        self
    }

    pub fn with_feature(self, file: impl Into<String>, content: impl Into<String>) -> Self {
        self.features
            .lock()
            .expect("lock poisoned")
            .insert(file.into(), content.into());
        self
    }

    pub fn with_preferences(self, preferences: Preferences) -> Self {
        *self.preferences.lock().expect("lock poisoned") = preferences;
        self
    }

    /// Current content of a feature, bypassing path translation.
    pub fn feature_content(&self, file: &str) -> Option<String> {
        self.features
            .lock()
            .expect("lock poisoned")
            .get(file)
            .cloned()
    }

    fn check_path(file: &str) -> Result<()> {
        let path = Path::new(file);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.is_empty() || escapes {
            return Err(RestqaError::InvalidFeaturePath(file.to_string()));
        }
        Ok(())
    }

    fn not_found(&self, file: &str) -> RestqaError {
        RestqaError::FeatureNotFound {
            file: file.to_string(),
            folder: self.folders.test_folder.clone(),
        }
    }
}

impl ProjectService for FakeProjectService {
    fn config(&self, path: &Path) -> Result<ProjectConfig> {
        self.configs
            .lock()
            .expect("lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| RestqaError::ConfigNotFound(path.to_path_buf()))
    }

    fn list_features(&self) -> Result<Vec<String>> {
        // BTreeMap keys are already sorted.
        Ok(self
            .features
            .lock()
            .expect("lock poisoned")
            .keys()
            .filter(|k| !k.split('/').any(|seg| seg == "node_modules"))
            .cloned()
            .collect())
    }

    fn feature(&self, file: &str) -> Result<String> {
        Self::check_path(file)?;
        self.feature_content(file)
            .ok_or_else(|| self.not_found(file))
    }

    fn update_feature(&self, file: &str, content: &str) -> Result<()> {
        Self::check_path(file)?;
        let mut features = self.features.lock().expect("lock poisoned");
        match features.get_mut(file) {
            Some(existing) => {
                *existing = content.to_string();
                Ok(())
            }
            None => Err(self.not_found(file)),
        }
    }

    fn preferences(&self) -> Result<Preferences> {
        Ok(self.preferences.lock().expect("lock poisoned").clone())
    }
}

/// Canned [`ScenarioGenerator`].
#[derive(Debug)]
pub struct FakeScenarioGenerator {
    answer: std::result::Result<String, String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeScenarioGenerator {
    pub fn returning(steps: impl Into<String>) -> Self {
        Self {
            answer: Ok(steps.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a `Collaborator` error carrying `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(reason.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ScenarioGenerator for FakeScenarioGenerator {
    async fn generate(&self, args: &[String]) -> Result<String> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push(args.to_vec());
        self.answer.clone().map_err(RestqaError::Collaborator)
    }
}
