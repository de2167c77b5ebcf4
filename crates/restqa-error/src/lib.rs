//! Unified error types for restqa.
//!
//! Every library crate in the workspace returns [`RestqaError`]. Transports
//! (the CLI, the dashboard server) never match on variants directly; they map
//! [`ErrorKind`] to an exit code or an HTTP status.

use std::io;
use std::path::{Path, PathBuf};

pub type Result<T, E = RestqaError> = std::result::Result<T, E>;

/// Coarse classification used by transports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Init answers rejected: missing, unusable or naming an unknown CI.
    Validation,
    /// The request itself is malformed: bad body, bad command, path
    /// escaping the test folder.
    BadRequest,
    /// A referenced config or feature file does not exist.
    NotFound,
    /// A file exists but could not be parsed.
    Malformed,
    /// An external collaborator (network fetch, scenario generator) failed.
    External,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum RestqaError {
    #[error("Please share a project {prompt}.")]
    MissingAnswer {
        field: &'static str,
        prompt: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    InvalidAnswer { field: &'static str, reason: String },

    #[error("The continuous integration \"{0}\" is not supported by RestQA")]
    UnsupportedCi(String),

    #[error("The feature path \"{0}\" must be relative to the test folder")]
    InvalidFeaturePath(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("The configuration file \"{}\" doesn't exist", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("The file \"{}\" doesn't exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("The file \"{file}\" doesn't exist in the folder \"{}\"", .folder.display())]
    FeatureNotFound { file: String, folder: PathBuf },

    #[error("malformed configuration {}: {reason}", .path.display())]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("malformed preferences {}: {reason}", .path.display())]
    MalformedPreferences { path: PathBuf, reason: String },

    #[error("{0}")]
    Collaborator(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("serialize {what}: {reason}")]
    Serialize { what: &'static str, reason: String },
}

impl RestqaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RestqaError::MissingAnswer { .. }
            | RestqaError::InvalidAnswer { .. }
            | RestqaError::UnsupportedCi(_) => ErrorKind::Validation,
            RestqaError::InvalidFeaturePath(_) | RestqaError::InvalidRequest(_) => {
                ErrorKind::BadRequest
            }
            RestqaError::ConfigNotFound(_)
            | RestqaError::FileNotFound(_)
            | RestqaError::FeatureNotFound { .. } => ErrorKind::NotFound,
            RestqaError::MalformedConfig { .. } | RestqaError::MalformedPreferences { .. } => {
                ErrorKind::Malformed
            }
            RestqaError::Collaborator(_) => ErrorKind::External,
            RestqaError::Io { .. } | RestqaError::Serialize { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Wrap an I/O error with the action and path it was raised for.
    pub fn io(action: &str, path: &Path, source: io::Error) -> Self {
        RestqaError::Io {
            context: format!("{action} {}", path.display()),
            source,
        }
    }

    pub fn malformed_config(path: &Path, reason: impl ToString) -> Self {
        RestqaError::MalformedConfig {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for RestqaError {
    fn from(err: serde_json::Error) -> Self {
        RestqaError::Serialize {
            what: "json",
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for RestqaError {
    fn from(err: serde_yaml::Error) -> Self {
        RestqaError::Serialize {
            what: "yaml",
            reason: err.to_string(),
        }
    }
}
