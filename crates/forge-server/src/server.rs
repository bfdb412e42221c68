//! Axum router and request handlers

use crate::{files, history};
use axum::{
    body::Body,
    extract::{Path as AxumPath, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use forge_agent::{AgentClient, Model};
use forge_core::{ForgeConfig, ForgeError, PipelineEvent, PipelineStatus};
use forge_pipeline::Pipeline;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;

/// Shared application state
pub struct AppState {
    pub config: ForgeConfig,
    pub projects_dir: PathBuf,
}

pub type SharedState = Arc<AppState>;

/// Serve the HTTP facade
pub async fn serve(config: ForgeConfig, addr: &str) -> anyhow::Result<()> {
    let projects_dir = PathBuf::from(&config.projects_dir);
    std::fs::create_dir_all(&projects_dir)?;

    let app_state = Arc::new(AppState {
        config,
        projects_dir,
    });

    let app = Router::new()
        .route("/generate", post(generate))
        .route("/generate-stream", post(generate_stream))
        .route("/history", get(get_history))
        .route("/project-files", get(get_project_files))
        .route("/open-folder", post(open_folder))
        .route("/projects/*path", get(serve_project_file))
        .route("/api/health", get(health))
        .fallback(crate::assets::static_handler)
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    recursion_limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    status: PipelineStatus,
    project_path: String,
    project_name: String,
    failed_files: Vec<String>,
}

/// Build a pipeline from the configured model and settings
fn build_pipeline(app: &AppState) -> Pipeline<AgentClient> {
    let model_name = app.config.model_name();
    let model = match model_name.parse::<Model>() {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!("{} - falling back to default model", e);
            Model::default()
        }
    };

    let client = AgentClient::new(model)
        .with_max_tokens(app.config.pipeline.max_tokens)
        .with_api_key_env(app.config.models.api_key_env.clone());

    Pipeline::new(client, app.projects_dir.clone(), app.config.pipeline.clone())
}

/// POST /generate-stream - NDJSON event stream for one generation run
async fn generate_stream(
    State(app): State<SharedState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let (tx, rx) = mpsc::channel::<PipelineEvent>(64);
    let pipeline = build_pipeline(&app);

    tokio::spawn(async move {
        let result = pipeline
            .run(&request.prompt, request.recursion_limit, Some(tx.clone()))
            .await;

        let terminal = match result {
            Ok(outcome) => PipelineEvent::Complete {
                message: "Project ready!".to_string(),
                project_path: outcome.project_path.display().to_string(),
                project_name: outcome.project_name,
                status: outcome.status,
                failed_files: outcome.failed_steps,
            },
            Err(e) => {
                tracing::error!("Stream error: {}", e);
                PipelineEvent::Error {
                    message: e.to_string(),
                }
            }
        };
        let _ = tx.send(terminal).await;
    });

    let stream =
        ReceiverStream::new(rx).map(|event| Ok::<_, Infallible>(event.to_ndjson()));

    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .body(Body::from_stream(stream))
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build stream response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /generate - run the pipeline to completion, no streaming
async fn generate(
    State(app): State<SharedState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let pipeline = build_pipeline(&app);

    match pipeline.run(&request.prompt, request.recursion_limit, None).await {
        Ok(outcome) => Ok(Json(GenerateResponse {
            status: outcome.status,
            project_path: outcome.project_path.display().to_string(),
            project_name: outcome.project_name,
            failed_files: outcome.failed_steps,
        })),
        Err(e) => {
            tracing::error!("Generation failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// GET /history - generated projects, newest first
async fn get_history(State(app): State<SharedState>) -> Json<Vec<history::HistoryEntry>> {
    Json(history::list_history(&app.projects_dir))
}

#[derive(Debug, Deserialize)]
struct ProjectFilesQuery {
    folder: String,
}

/// GET /project-files?folder= - file contents for the code viewer
async fn get_project_files(
    State(app): State<SharedState>,
    Query(query): Query<ProjectFilesQuery>,
) -> Result<Json<Vec<files::ProjectFile>>, (StatusCode, String)> {
    match files::list_project_files(&app.projects_dir, &query.folder) {
        Ok(project_files) => Ok(Json(project_files)),
        Err(ForgeError::PathViolation(_)) | Err(ForgeError::Other(_)) => {
            Err((StatusCode::NOT_FOUND, "Project not found".to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct OpenFolderRequest {
    path: String,
}

/// POST /open-folder - open a server-local path in the OS file manager
async fn open_folder(
    Json(request): Json<OpenFolderRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let path = PathBuf::from(&request.path);
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
            .join(path)
    };

    if !path.exists() {
        return Err((
            StatusCode::NOT_FOUND,
            "Path not found on server".to_string(),
        ));
    }

    match open::that(&path) {
        Ok(()) => Ok(Json(serde_json::json!({ "status": "opened" }))),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// GET /projects/*path - static serving of generated project files
async fn serve_project_file(
    State(app): State<SharedState>,
    AxumPath(path): AxumPath<String>,
) -> Response {
    if !is_safe_relative(Path::new(&path)) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    let full_path = app.projects_dir.join(&path);
    if !full_path.is_file() {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    match std::fs::read(&full_path) {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&full_path)
                .first_or_octet_stream()
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, mime),
                    (
                        header::CACHE_CONTROL,
                        "no-cache, no-store, must-revalidate".to_string(),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", full_path.display(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Read error").into_response()
        }
    }
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "forge"
    }))
}

/// A request path is safe when every component is a normal segment
fn is_safe_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_relative() {
        assert!(is_safe_relative(Path::new("App_20250101/index.html")));
        assert!(!is_safe_relative(Path::new("../secrets")));
        assert!(!is_safe_relative(Path::new("/etc/passwd")));
        assert!(!is_safe_relative(Path::new("a/../../b")));
    }
}
