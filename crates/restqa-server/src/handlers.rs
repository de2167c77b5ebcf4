use crate::AppState;
use crate::error::ApiError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use restqa_adapters::split_command;
use restqa_app::{InitUseCase, pick_tip, strip_ansi};
use restqa_error::RestqaError;
use restqa_types::{InitAnswers, Preferences, ProjectConfig};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

type ApiResult<T> = Result<T, ApiError>;

pub(crate) async fn version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

pub(crate) async fn config(State(state): State<AppState>) -> ApiResult<Json<ProjectConfig>> {
    let path = state.config_path();
    Ok(Json(state.service.config(&path)?))
}

pub(crate) async fn list_features(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.service.list_features()?))
}

pub(crate) async fn get_feature(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let text = state.service.feature(&file)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

pub(crate) async fn update_feature(
    State(state): State<AppState>,
    Path(file): Path<String>,
    body: String,
) -> ApiResult<StatusCode> {
    state.service.update_feature(&file, &body)?;
    info!(file = %file, "feature updated");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn preferences(State(state): State<AppState>) -> ApiResult<Json<Preferences>> {
    Ok(Json(state.service.preferences()?))
}

pub(crate) async fn initialize(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let answers: InitAnswers = parse_body(&body)?.unwrap_or_default();
    let outcome = InitUseCase::new(state.generator.clone(), state.options.working_dir.clone())
        .execute(answers)
        .await?;

    state.set_config_path(outcome.config_path.clone());
    Ok(Json(json!({
        "configuration": outcome.config_path.display().to_string(),
        "folder": outcome.folder.display().to_string(),
    })))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    cmd: Option<String>,
}

pub(crate) async fn generate(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let cmd = parse_body::<GenerateRequest>(&body)?
        .and_then(|r| r.cmd)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| RestqaError::InvalidRequest("Please share a curl command".into()))?;

    let args = split_command(&cmd)?;
    let scenario = state.generator.generate(&args).await?;
    Ok(Json(json!({ "scenario": scenario })))
}

pub(crate) async fn tips(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let path = state.config_path();
    let config = state.service.config(&path)?;
    let message = pick_tip(config.tips()).map(|m| strip_ansi(&m).into_owned());
    Ok(Json(json!({ "message": message })))
}

/// An empty body reads as `None`; anything else must be valid JSON.
fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<Option<T>, RestqaError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| RestqaError::InvalidRequest(format!("invalid JSON body: {e}")))
}
