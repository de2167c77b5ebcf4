//! Shared types for restqa.
//!
//! Design goal: versioned, explicit, boring.
//! The project descriptor defined here is persisted as `.restqa.yml` and is
//! the single source of truth for environments, plugins and output sinks.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = ".restqa.yml";
pub const CONFIG_VERSION: &str = "0.0.1";
pub const DEFAULT_PLUGIN: &str = "@restqa/restqapi";
pub const DEFAULT_RESULT_PATH: &str = "restqa-result.json";

/// Key/value document used for plugin and output settings.
pub type Settings = BTreeMap<String, Value>;

/// User-level preferences (`~/.config/restqa.pref`).
pub type Preferences = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ProjectConfig {
    pub version: String,
    pub metadata: Metadata,
    pub environments: Vec<Environment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restqa: Option<RestqaSettings>,

    /// Top-level keys this crate does not interpret, kept for round-trips.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Metadata {
    /// Upper-case slug derived from `name`, see [`project_code`].
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Environment {
    pub name: String,

    #[serde(default)]
    pub default: bool,

    #[serde(default)]
    pub plugins: Vec<Plugin>,

    #[serde(default)]
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Plugin {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Output {
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub kind: OutputType,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: Settings,
}

/// Result-export sink. Types this crate does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputType {
    Html,
    File,
    Stream,
    Other(String),
}

impl OutputType {
    pub fn as_str(&self) -> &str {
        match self {
            OutputType::Html => "html",
            OutputType::File => "file",
            OutputType::Stream => "stream",
            OutputType::Other(s) => s,
        }
    }
}

impl From<String> for OutputType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "html" => OutputType::Html,
            "file" => OutputType::File,
            "stream" => OutputType::Stream,
            _ => OutputType::Other(s),
        }
    }
}

impl From<OutputType> for String {
    fn from(t: OutputType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool-level settings stored under the `restqa` key of the descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RestqaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<TipsConfig>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TipsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub messages: Vec<String>,
}

impl Default for TipsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            messages: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("`version` must not be empty")]
    EmptyVersion,

    #[error("`metadata.name` must not be empty")]
    EmptyName,

    #[error("`metadata.code` must not be empty")]
    EmptyCode,

    #[error("at least one environment is required")]
    NoEnvironments,

    #[error("exactly one environment must be marked `default: true` (found none)")]
    NoDefaultEnvironment,

    #[error("exactly one environment must be marked `default: true` (found {})", .0.join(", "))]
    MultipleDefaultEnvironments(Vec<String>),

    #[error("environment `{0}` is declared more than once")]
    DuplicateEnvironment(String),
}

impl ProjectConfig {
    /// Check the invariants every reader relies on.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.version.trim().is_empty() {
            return Err(DescriptorError::EmptyVersion);
        }
        if self.metadata.name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if self.metadata.code.trim().is_empty() {
            return Err(DescriptorError::EmptyCode);
        }
        if self.environments.is_empty() {
            return Err(DescriptorError::NoEnvironments);
        }

        let mut seen = BTreeSet::new();
        for env in &self.environments {
            if !seen.insert(env.name.as_str()) {
                return Err(DescriptorError::DuplicateEnvironment(env.name.clone()));
            }
        }

        let defaults: Vec<String> = self
            .environments
            .iter()
            .filter(|e| e.default)
            .map(|e| e.name.clone())
            .collect();
        match defaults.len() {
            0 => Err(DescriptorError::NoDefaultEnvironment),
            1 => Ok(()),
            _ => Err(DescriptorError::MultipleDefaultEnvironments(defaults)),
        }
    }

    /// The environment marked `default: true`.
    ///
    /// Only meaningful on a descriptor that passed [`ProjectConfig::validate`].
    pub fn default_environment(&self) -> Option<&Environment> {
        self.environments.iter().find(|e| e.default)
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn tips(&self) -> Option<&TipsConfig> {
        self.restqa.as_ref().and_then(|r| r.tips.as_ref())
    }
}

/// Derive the project code from its display name.
///
/// Every maximal run of characters outside `[A-Za-z0-9]` becomes one hyphen,
/// hyphens are not emitted at either end, and the result is upper-cased:
/// `"My App!!"` becomes `"MY-APP"`.
pub fn project_code(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !code.is_empty() {
                code.push('-');
            }
            pending_separator = false;
            code.push(ch.to_ascii_uppercase());
        } else {
            pending_separator = true;
        }
    }

    code
}

/// Answers collected by `restqa init` (prompt, flags, or `POST /init` body).
///
/// Mandatory fields are optional here so that a missing answer surfaces as a
/// validation error naming the field instead of a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitAnswers {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub env: Option<String>,

    /// CI flavor tag. `null`, `false` and `""` all mean "no CI".
    #[serde(default, deserialize_with = "deserialize_ci")]
    pub ci: Option<String>,

    /// Target directory; defaults to the current working directory.
    #[serde(default)]
    pub folder: Option<PathBuf>,
}

fn deserialize_ci<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Continuous-integration flavors `restqa init` can scaffold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CiFlavor {
    GithubAction,
    GitlabCi,
    BitbucketPipeline,
    CircleCi,
    Travis,
}

impl CiFlavor {
    pub const ALL: [CiFlavor; 5] = [
        CiFlavor::GithubAction,
        CiFlavor::GitlabCi,
        CiFlavor::BitbucketPipeline,
        CiFlavor::CircleCi,
        CiFlavor::Travis,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            CiFlavor::GithubAction => "github-action",
            CiFlavor::GitlabCi => "gitlab-ci",
            CiFlavor::BitbucketPipeline => "bitbucket-pipeline",
            CiFlavor::CircleCi => "circle-ci",
            CiFlavor::Travis => "travis",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CiFlavor::GithubAction => "Github Action",
            CiFlavor::GitlabCi => "Gitlab CI",
            CiFlavor::BitbucketPipeline => "Bitbucket Pipeline",
            CiFlavor::CircleCi => "Circle CI",
            CiFlavor::Travis => "Travis CI",
        }
    }

    /// Conventional location of the template, relative to the project folder.
    pub fn path(self) -> &'static str {
        match self {
            CiFlavor::GithubAction => ".github/workflows/integration-test.yml",
            CiFlavor::GitlabCi => ".gitlab-ci.yml",
            CiFlavor::BitbucketPipeline => "bitbucket-pipelines.yml",
            CiFlavor::CircleCi => ".circleci/config.yml",
            CiFlavor::Travis => ".travis.yml",
        }
    }
}

impl fmt::Display for CiFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// JSON schema of the project descriptor, as published by `xtask schema`.
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(ProjectConfig)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn code_is_uppercase_words_joined_by_hyphen(name in "\\PC{0,40}") {
            let expected = name
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|part| !part.is_empty())
                .map(|part| part.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join("-");
            prop_assert_eq!(project_code(&name), expected);
        }

        #[test]
        fn code_is_idempotent(name in "[a-zA-Z0-9 !?_.-]{0,40}") {
            let code = project_code(&name);
            prop_assert_eq!(project_code(&code), code.clone());
            prop_assert!(!code.starts_with('-') && !code.ends_with('-'));
            prop_assert!(!code.contains("--"));
        }
    }
}
