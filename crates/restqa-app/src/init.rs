//! InitUseCase - scaffold a new test project.
//!
//! 1. Validate the mandatory answers (no I/O before this passes)
//! 2. Write `.restqa.yml`
//! 3. Optionally write a CI template
//! 4. Best effort: seed a welcome scenario through the scenario generator

use crate::ci::write_ci_template;
use restqa_adapters::{
    DEFAULT_FETCH_TIMEOUT, ScenarioGenerator, atomic_write, ensure_parent_dir,
    write_yaml_document,
};
use restqa_error::{RestqaError, Result};
use restqa_types::{
    CONFIG_FILE_NAME, CONFIG_VERSION, CiFlavor, DEFAULT_PLUGIN, DEFAULT_RESULT_PATH, Environment,
    InitAnswers, Metadata, Output, OutputType, Plugin, ProjectConfig, Settings, project_code,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const WELCOME_API_URL: &str = "https://restqa.io/welcome.json";
pub const WELCOME_FEATURE_PATH: &str = "tests/integration/welcome-restqa.feature";

/// What `restqa init` left on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    /// Absolute path of the written `.restqa.yml`.
    pub config_path: PathBuf,
    pub folder: PathBuf,
    pub ci: Option<(CiFlavor, PathBuf)>,
    pub sample: SampleOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    Written(PathBuf),
    /// The welcome scenario could not be produced; the reason is informational.
    Skipped(String),
}

struct Answers {
    name: String,
    description: String,
    url: String,
    env: String,
    ci: Option<String>,
    folder: Option<PathBuf>,
}

fn require(value: Option<String>, field: &'static str, prompt: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RestqaError::MissingAnswer { field, prompt }),
    }
}

impl Answers {
    fn validate(raw: InitAnswers) -> Result<Self> {
        Ok(Self {
            name: require(raw.name, "name", "name")?,
            description: require(raw.description, "description", "description")?,
            url: require(raw.url, "url", "url")?,
            env: require(raw.env, "env", "url environment")?,
            ci: raw.ci,
            folder: raw.folder,
        })
    }
}

/// The descriptor written for a fresh project.
pub fn scaffold_config(name: &str, description: &str, env: &str, url: &str) -> ProjectConfig {
    ProjectConfig {
        version: CONFIG_VERSION.to_string(),
        metadata: Metadata {
            code: project_code(name),
            name: name.to_string(),
            description: description.to_string(),
        },
        environments: vec![Environment {
            name: env.to_string(),
            default: true,
            plugins: vec![Plugin {
                name: DEFAULT_PLUGIN.to_string(),
                config: Settings::from([("url".to_string(), Value::from(url))]),
            }],
            outputs: vec![
                Output {
                    kind: OutputType::Html,
                    enabled: true,
                    config: Settings::new(),
                },
                Output {
                    kind: OutputType::File,
                    enabled: true,
                    config: Settings::from([(
                        "path".to_string(),
                        Value::from(DEFAULT_RESULT_PATH),
                    )]),
                },
            ],
        }],
        restqa: None,
        extra: BTreeMap::new(),
    }
}

pub struct InitUseCase<G: ScenarioGenerator> {
    generator: G,
    cwd: PathBuf,
    /// `None` disables the welcome scenario.
    welcome_url: Option<String>,
    sample_timeout: Duration,
}

impl<G: ScenarioGenerator> InitUseCase<G> {
    /// `cwd` resolves relative and absent `folder` answers.
    pub fn new(generator: G, cwd: PathBuf) -> Self {
        Self {
            generator,
            cwd,
            welcome_url: Some(WELCOME_API_URL.to_string()),
            sample_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_welcome_url(mut self, url: impl Into<String>) -> Self {
        self.welcome_url = Some(url.into());
        self
    }

    pub fn without_sample(mut self) -> Self {
        self.welcome_url = None;
        self
    }

    pub fn with_sample_timeout(mut self, timeout: Duration) -> Self {
        self.sample_timeout = timeout;
        self
    }

    pub async fn execute(&self, answers: InitAnswers) -> Result<InitOutcome> {
        let answers = Answers::validate(answers)?;
        if project_code(&answers.name).is_empty() {
            return Err(RestqaError::InvalidAnswer {
                field: "name",
                reason: "must contain at least one letter or digit".into(),
            });
        }

        let folder = match &answers.folder {
            Some(f) => self.cwd.join(f),
            None => self.cwd.clone(),
        };
        fs::create_dir_all(&folder).map_err(|e| RestqaError::io("create dir", &folder, e))?;

        let config = scaffold_config(
            &answers.name,
            &answers.description,
            &answers.env,
            &answers.url,
        );
        let config_path = folder.join(CONFIG_FILE_NAME);
        write_yaml_document(&config_path, &config)?;
        info!(
            path = %config_path.display(),
            code = %config.metadata.code,
            "project configuration created"
        );

        // The configuration stays on disk even when the CI flavor is rejected.
        let ci = match answers.ci.as_deref() {
            None => None,
            Some(tag) => {
                let flavor = CiFlavor::from_tag(tag)
                    .ok_or_else(|| RestqaError::UnsupportedCi(tag.to_string()))?;
                Some((flavor, write_ci_template(&folder, flavor)?))
            }
        };

        let sample = self.seed_sample(&folder).await;

        Ok(InitOutcome {
            config_path,
            folder,
            ci,
            sample,
        })
    }

    async fn seed_sample(&self, folder: &Path) -> SampleOutcome {
        let Some(url) = &self.welcome_url else {
            return SampleOutcome::Skipped("welcome scenario disabled".into());
        };
        let args = vec!["curl".to_string(), url.clone()];
        let generated =
            match tokio::time::timeout(self.sample_timeout, self.generator.generate(&args)).await {
                Ok(result) => result,
                Err(_) => Err(RestqaError::Collaborator(format!(
                    "no answer from {url} within {:?}",
                    self.sample_timeout
                ))),
            };

        match generated.and_then(|steps| write_sample(folder, &steps)) {
            Ok(path) => {
                info!(path = %path.display(), "welcome scenario created");
                SampleOutcome::Written(path)
            }
            Err(err) => {
                warn!(url = %url, error = %err, "could not generate the welcome scenario");
                SampleOutcome::Skipped(err.to_string())
            }
        }
    }
}

fn write_sample(folder: &Path, steps: &str) -> Result<PathBuf> {
    let path = folder.join(WELCOME_FEATURE_PATH);
    let content = [
        "Feature: Welcome to the RestQA community",
        "",
        "Scenario: Get the list of useful RestQA resources",
        steps,
    ]
    .join("\n");

    ensure_parent_dir(&path)?;
    atomic_write(&path, content.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use restqa_adapters::ConfigStore;
    use restqa_error::ErrorKind;

    struct Canned(Result<String, String>);

    #[async_trait]
    impl ScenarioGenerator for Canned {
        async fn generate(&self, args: &[String]) -> Result<String> {
            assert_eq!(args[0], "curl");
            self.0.clone().map_err(RestqaError::Collaborator)
        }
    }

    struct Hanging;

    #[async_trait]
    impl ScenarioGenerator for Hanging {
        async fn generate(&self, _args: &[String]) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    fn answers(folder: &Path) -> InitAnswers {
        InitAnswers {
            name: Some("App".into()),
            description: Some("d".into()),
            url: Some("http://x".into()),
            env: Some("local".into()),
            ci: None,
            folder: Some(folder.to_path_buf()),
        }
    }

    fn usecase(generator: Canned, cwd: &Path) -> InitUseCase<Canned> {
        InitUseCase::new(generator, cwd.to_path_buf())
    }

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).expect("read dir").count()
    }

    #[tokio::test]
    async fn writes_config_with_one_default_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = usecase(Canned(Ok("  Given x".into())), dir.path())
            .execute(answers(dir.path()))
            .await
            .expect("init");

        assert_eq!(outcome.config_path, dir.path().join(".restqa.yml"));
        assert!(outcome.config_path.is_absolute());

        let cfg = ConfigStore.read(&outcome.config_path).expect("read back");
        assert_eq!(cfg.metadata.code, "APP");
        assert_eq!(cfg.environments.len(), 1);
        assert_eq!(cfg.environments[0].name, "local");
        assert!(cfg.environments[0].default);
        assert_eq!(
            cfg.environments[0].plugins[0].config.get("url"),
            Some(&Value::from("http://x"))
        );
        assert_eq!(cfg.environments[0].outputs.len(), 2);
        assert_eq!(outcome.ci, None);
    }

    #[tokio::test]
    async fn each_missing_answer_fails_without_writing() {
        let cases: [(&str, fn(&mut InitAnswers)); 4] = [
            ("name", |a| a.name = None),
            ("description", |a| a.description = Some("  ".into())),
            ("url", |a| a.url = None),
            ("env", |a| a.env = Some(String::new())),
        ];

        for (field, clear) in cases {
            let dir = tempfile::tempdir().expect("tempdir");
            let target = dir.path().join("project");
            let mut a = answers(&target);
            a.ci = Some("github-action".into());
            clear(&mut a);

            let err = usecase(Canned(Ok(String::new())), dir.path())
                .execute(a)
                .await
                .expect_err(field);
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(
                matches!(err, RestqaError::MissingAnswer { field: f, .. } if f == field),
                "{field}: {err:?}"
            );
            assert_eq!(entries(dir.path()), 0, "{field}: nothing may be written");
        }
    }

    #[tokio::test]
    async fn env_message_matches_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = answers(dir.path());
        a.env = None;
        let err = usecase(Canned(Ok(String::new())), dir.path())
            .execute(a)
            .await
            .expect_err("missing env");
        assert_eq!(err.to_string(), "Please share a project url environment.");
    }

    #[tokio::test]
    async fn name_without_alphanumerics_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = answers(dir.path());
        a.name = Some("!!!".into());
        let err = usecase(Canned(Ok(String::new())), dir.path())
            .execute(a)
            .await
            .expect_err("bad name");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!dir.path().join(".restqa.yml").exists());
    }

    #[tokio::test]
    async fn unsupported_ci_keeps_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = answers(dir.path());
        a.ci = Some("jenkins".into());

        let err = usecase(Canned(Ok(String::new())), dir.path())
            .execute(a)
            .await
            .expect_err("jenkins is unsupported");
        assert!(matches!(err, RestqaError::UnsupportedCi(ref t) if t == "jenkins"));

        let cfg = ConfigStore
            .read(&dir.path().join(".restqa.yml"))
            .expect("config still valid");
        assert_eq!(cfg.metadata.name, "App");
        assert!(!dir.path().join(WELCOME_FEATURE_PATH).exists());
    }

    #[tokio::test]
    async fn ci_template_is_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = answers(dir.path());
        a.ci = Some("circle-ci".into());

        let outcome = usecase(Canned(Ok(String::new())), dir.path())
            .execute(a)
            .await
            .expect("init");
        let (flavor, path) = outcome.ci.expect("ci written");
        assert_eq!(flavor, CiFlavor::CircleCi);
        assert!(path.ends_with(".circleci/config.yml"));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn relative_folder_resolves_against_cwd() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut a = answers(dir.path());
        a.folder = Some(PathBuf::from("nested/app"));

        let outcome = usecase(Canned(Ok(String::new())), dir.path())
            .execute(a)
            .await
            .expect("init");
        assert_eq!(outcome.folder, dir.path().join("nested/app"));
        assert!(outcome.config_path.is_file());
    }

    #[tokio::test]
    async fn sample_feature_is_seeded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = usecase(
            Canned(Ok("  Given I have the api gateway".into())),
            dir.path(),
        )
        .execute(answers(dir.path()))
        .await
        .expect("init");

        let path = dir.path().join(WELCOME_FEATURE_PATH);
        assert_eq!(outcome.sample, SampleOutcome::Written(path.clone()));
        let content = fs::read_to_string(path).expect("sample");
        assert!(content.starts_with("Feature: Welcome to the RestQA community\n\n"));
        assert!(content.contains("Scenario: Get the list of useful RestQA resources\n"));
        assert!(content.ends_with("  Given I have the api gateway"));
    }

    #[tokio::test]
    async fn generator_failure_is_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = usecase(Canned(Err("offline".into())), dir.path())
            .execute(answers(dir.path()))
            .await
            .expect("init still succeeds");

        assert!(matches!(outcome.sample, SampleOutcome::Skipped(ref r) if r.contains("offline")));
        assert!(outcome.config_path.is_file());
        assert!(!dir.path().join(WELCOME_FEATURE_PATH).exists());
    }

    #[tokio::test]
    async fn sample_can_be_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = usecase(Canned(Ok("  Given x".into())), dir.path())
            .without_sample()
            .execute(answers(dir.path()))
            .await
            .expect("init");
        assert!(matches!(outcome.sample, SampleOutcome::Skipped(_)));
        assert!(!dir.path().join(WELCOME_FEATURE_PATH).exists());
    }

    #[tokio::test]
    async fn custom_welcome_url_is_passed_to_generator() {
        struct Echo;

        #[async_trait]
        impl ScenarioGenerator for Echo {
            async fn generate(&self, args: &[String]) -> Result<String> {
                Ok(format!("  Given {}", args[1]))
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        InitUseCase::new(Echo, dir.path().to_path_buf())
            .with_welcome_url("http://localhost:9/hello.json")
            .execute(answers(dir.path()))
            .await
            .expect("init");
        let content = fs::read_to_string(dir.path().join(WELCOME_FEATURE_PATH)).expect("sample");
        assert!(content.ends_with("  Given http://localhost:9/hello.json"));
    }

    #[tokio::test]
    async fn hanging_generator_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = InitUseCase::new(Hanging, dir.path().to_path_buf())
            .with_sample_timeout(Duration::from_millis(50))
            .execute(answers(dir.path()))
            .await
            .expect("init still succeeds");
        assert!(matches!(outcome.sample, SampleOutcome::Skipped(_)));
    }
}
