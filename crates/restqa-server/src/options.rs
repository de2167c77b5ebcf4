use restqa_app::ProjectFolders;
use restqa_error::{RestqaError, Result};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_REPORT_PREFIX: &str = "/reports";
/// Always allowed, in addition to the configured origins.
pub const DASHBOARD_DEV_ORIGIN: &str = "http://localhost:3000";

/// First path segments owned by the API routes.
pub const API_SEGMENTS: [&str; 7] = [
    "version",
    "config",
    "features",
    "preferences",
    "init",
    "generate",
    "tips",
];

/// Startup settings of the dashboard server. Fixed once the router is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub bind: SocketAddr,
    /// Resolves relative folders and `POST /init` answers without a folder.
    pub working_dir: PathBuf,
    pub test_folder: PathBuf,
    pub report_folder: PathBuf,
    report_prefix: String,
    allowed_origins: Vec<String>,
    pub dashboard_dir: Option<PathBuf>,
}

impl ServerOptions {
    /// Defaults: tests in `working_dir`, reports in `working_dir/reports`
    /// served under `/reports`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            test_folder: working_dir.clone(),
            report_folder: working_dir.join("reports"),
            report_prefix: DEFAULT_REPORT_PREFIX.to_string(),
            allowed_origins: vec![DASHBOARD_DEV_ORIGIN.to_string()],
            dashboard_dir: None,
            working_dir,
        }
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_test_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.test_folder = self.working_dir.join(folder.into());
        self
    }

    pub fn with_report_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.report_folder = self.working_dir.join(folder.into());
        self
    }

    /// Fails when the prefix would shadow an API route.
    pub fn with_report_prefix(mut self, prefix: &str) -> Result<Self> {
        let prefix = normalize_prefix(prefix);
        let first = prefix
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        if API_SEGMENTS.contains(&first) {
            return Err(RestqaError::InvalidRequest(format!(
                "The report prefix \"{prefix}\" clashes with the api route \"/{first}\""
            )));
        }
        self.report_prefix = prefix;
        Ok(self)
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        if !self.allowed_origins.contains(&origin) {
            self.allowed_origins.push(origin);
        }
        self
    }

    pub fn with_dashboard_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dashboard_dir = Some(self.working_dir.join(dir.into()));
        self
    }

    pub fn report_prefix(&self) -> &str {
        &self.report_prefix
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    pub fn folders(&self) -> ProjectFolders {
        ProjectFolders {
            test_folder: self.test_folder.clone(),
        }
    }
}

/// Leading slash enforced, trailing slashes dropped. Empty or `/` falls back
/// to the default since reports cannot be mounted at the root.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_REPORT_PREFIX.to_string()
    } else {
        format!("/{trimmed}")
    }
}
