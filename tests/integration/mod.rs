//! Cross-crate flows: scaffold a project, then browse it through the
//! filesystem project service.

use restqa_adapters::PreferencesStore;
use restqa_app::{
    FsProjectService, InitUseCase, ProjectFolders, ProjectService, SampleOutcome,
    WELCOME_FEATURE_PATH,
};
use restqa_error::{ErrorKind, RestqaError};
use restqa_fake::FakeScenarioGenerator;
use restqa_types::{CiFlavor, InitAnswers};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn answers(name: &str, ci: Option<&str>) -> InitAnswers {
    InitAnswers {
        name: Some(name.into()),
        description: Some("Integration project".into()),
        url: Some("http://localhost:8080".into()),
        env: Some("local".into()),
        ci: ci.map(String::from),
        folder: None,
    }
}

fn service_for(root: &Path) -> FsProjectService {
    FsProjectService::new(
        ProjectFolders {
            test_folder: root.join("tests"),
        },
        PreferencesStore::new(root.join("restqa.pref")),
    )
}

#[tokio::test]
async fn scaffolded_project_is_browsable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = Arc::new(FakeScenarioGenerator::returning(
        "  Given I have the api gateway\n  When I run the API",
    ));

    let outcome = InitUseCase::new(generator.clone(), dir.path().to_path_buf())
        .with_welcome_url("https://example.test/welcome.json")
        .execute(answers("Store Front", Some("gitlab-ci")))
        .await
        .expect("init");

    assert_eq!(
        generator.calls(),
        vec![vec!["curl", "https://example.test/welcome.json"]]
    );
    assert_eq!(
        outcome.sample,
        SampleOutcome::Written(dir.path().join(WELCOME_FEATURE_PATH))
    );
    let (flavor, ci_path) = outcome.ci.expect("ci written");
    assert_eq!(flavor, CiFlavor::GitlabCi);
    assert_eq!(ci_path, dir.path().join(".gitlab-ci.yml"));

    let service = service_for(dir.path());
    let config = service.config(&outcome.config_path).expect("config");
    assert_eq!(config.metadata.code, "STORE-FRONT");
    assert_eq!(
        config.default_environment().map(|e| e.name.as_str()),
        Some("local")
    );

    assert_eq!(
        service.list_features().expect("list"),
        vec!["integration/welcome-restqa.feature"]
    );

    let original = service
        .feature("integration/welcome-restqa.feature")
        .expect("read");
    assert!(original.starts_with("Feature: Welcome to the RestQA community"));

    let edited = original.replace("When I run the API", "When I call the API");
    service
        .update_feature("integration/welcome-restqa.feature", &edited)
        .expect("update");
    assert_eq!(
        fs::read_to_string(dir.path().join(WELCOME_FEATURE_PATH)).expect("on disk"),
        edited
    );
}

#[tokio::test]
async fn failed_sample_leaves_an_empty_test_folder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let outcome = InitUseCase::new(
        FakeScenarioGenerator::failing("network unreachable"),
        dir.path().to_path_buf(),
    )
    .execute(answers("App", None))
    .await
    .expect("init is not affected");

    assert!(matches!(outcome.sample, SampleOutcome::Skipped(_)));
    let service = service_for(dir.path());
    assert!(service.list_features().expect("list").is_empty());
    service.config(&outcome.config_path).expect("config");
}

#[tokio::test]
async fn unsupported_ci_stops_before_the_sample() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = Arc::new(FakeScenarioGenerator::returning("  Given x"));

    let err = InitUseCase::new(generator.clone(), dir.path().to_path_buf())
        .execute(answers("App", Some("drone")))
        .await
        .expect_err("drone is unsupported");

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, RestqaError::UnsupportedCi(_)));
    assert!(generator.calls().is_empty());
    service_for(dir.path())
        .config(&dir.path().join(".restqa.yml"))
        .expect("config written before the CI failure is valid");
}

#[test]
fn editing_a_missing_feature_reports_the_test_folder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = service_for(dir.path());

    let err = service
        .update_feature("checkout.feature", "Feature: checkout")
        .expect_err("missing");
    assert_eq!(
        err.to_string(),
        format!(
            "The file \"checkout.feature\" doesn't exist in the folder \"{}\"",
            dir.path().join("tests").display()
        )
    );
    assert!(!dir.path().join("tests/checkout.feature").exists());
}
