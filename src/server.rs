//! HTTP upload service.
//!
//! `POST /nbt` takes a multipart upload with the structure file in the `nbt`
//! field, converts it to glTF and stores the result under a random name in
//! the output directory. Everything else is served from that directory, so
//! the returned `fileLocation` can be fetched straight away.

use crate::converter::Converter;
use crate::error::ConverterError;
use crate::export::export_gltf;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use serde_json::json;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Multipart field carrying the structure file.
pub const UPLOAD_FIELD: &str = "nbt";

/// Length of generated output file names, without the extension.
pub const FILE_NAME_LENGTH: usize = 20;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address (e.g., "127.0.0.1:3000")
    pub bind_address: String,

    /// Directory generated models are written to and served from
    pub output_dir: PathBuf,

    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".into(),
            output_dir: PathBuf::from("public"),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            output_dir: env::var_os("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub converter: Arc<Converter>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(converter: Converter, config: ServerConfig) -> Self {
        Self {
            converter: Arc::new(converter),
            config: Arc::new(config),
        }
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable schematic: {0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ConverterError> for ApiError {
    fn from(err: ConverterError) -> Self {
        match err {
            ConverterError::MalformedSchematic(_) | ConverterError::Parse(_) => {
                ApiError::Unprocessable(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unprocessable(msg) => {
                tracing::warn!("Rejected upload: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Generated file name, relative to the served root.
    pub file_location: String,
}

pub fn create_router(state: AppState) -> Router {
    let files = ServeDir::new(&state.config.output_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/nbt", post(upload_nbt))
        .fallback_service(files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Convert an uploaded structure file and store the model.
async fn upload_nbt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    let data = read_upload(&mut multipart).await?;
    tracing::info!(bytes = data.len(), "received schematic upload");

    let converter = state.converter.clone();
    let scene = tokio::task::spawn_blocking(move || {
        let decoded = converter.decode(&data)?;
        Ok::<_, ConverterError>(converter.scene(&decoded))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("conversion task failed: {}", e)))??;

    let settle_delay = state.converter.config().settle_delay;
    if !settle_delay.is_zero() {
        tokio::time::sleep(settle_delay).await;
    }

    let document = export_gltf(&scene)?;
    let file_location = format!("{}.gltf", random_file_stem());
    persist_model(&state.config.output_dir, &file_location, document.as_bytes()).await?;

    tracing::info!(file = %file_location, blocks = scene.block_count, "saved model");
    Ok(Json(UploadResponse { file_location }))
}

/// Read the bytes of the upload field, skipping any other fields.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::BadRequest(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// Write a model under a temporary name, then rename it into place.
///
/// A failed write leaves nothing behind under `file_name`.
async fn persist_model(dir: &Path, file_name: &str, contents: &[u8]) -> std::io::Result<()> {
    let target = dir.join(file_name);
    let partial = dir.join(format!(".{}.part", file_name));

    let result = match tokio::fs::write(&partial, contents).await {
        Ok(()) => tokio::fs::rename(&partial, &target).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}

/// Random alphanumeric name. Not checked against existing files.
fn random_file_stem() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILE_NAME_LENGTH)
        .map(char::from)
        .collect()
}
