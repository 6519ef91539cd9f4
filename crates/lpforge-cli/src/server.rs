use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use lpforge_contracts::brief::{AnalysisTarget, AnalyzerForm, BriefResult};
use lpforge_contracts::credential::CredentialHolder;
use lpforge_contracts::events::EventWriter;
use lpforge_contracts::image::InlineImage;
use lpforge_contracts::inflight::InFlight;
use lpforge_contracts::outline::{OutlineForm, OutlineRequest, OutlineResult};
use lpforge_engine::{
    BriefAnalyzer, ContentExtractor, DirectorError, GeminiTransport, OutlineGenerator,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

/// Room for a 4 MiB image after base64 plus the JSON around it.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// The two generation sequences behind the HTTP surface.
///
/// Implementations block; handlers run them on the blocking pool.
pub trait Director: Send + Sync {
    fn outline(
        &self,
        credentials: &CredentialHolder,
        request: &OutlineRequest,
    ) -> Result<OutlineResult, DirectorError>;

    fn analyze(
        &self,
        credentials: &CredentialHolder,
        target: &AnalysisTarget,
    ) -> Result<BriefResult, DirectorError>;
}

/// Gemini-backed director. Transports are built per call so every blocking
/// HTTP client lives and dies on a blocking thread.
pub struct LiveDirector {
    language: String,
    events: Option<EventWriter>,
}

impl LiveDirector {
    pub fn new(language: impl Into<String>, events: Option<EventWriter>) -> Self {
        Self {
            language: language.into(),
            events,
        }
    }
}

impl Director for LiveDirector {
    fn outline(
        &self,
        credentials: &CredentialHolder,
        request: &OutlineRequest,
    ) -> Result<OutlineResult, DirectorError> {
        let generator = OutlineGenerator::new(Arc::new(GeminiTransport::new()))
            .with_language(self.language.clone())
            .with_events(self.events.clone());
        generator
            .generate(credentials, request)
            .map(|outcome| outcome.value)
    }

    fn analyze(
        &self,
        credentials: &CredentialHolder,
        target: &AnalysisTarget,
    ) -> Result<BriefResult, DirectorError> {
        let analyzer = BriefAnalyzer::new(
            Arc::new(GeminiTransport::new()),
            Arc::new(ContentExtractor::new()),
        )
        .with_language(self.language.clone())
        .with_events(self.events.clone());
        analyzer
            .analyze(credentials, target)
            .map(|outcome| outcome.value)
    }
}

#[derive(Clone)]
pub struct AppState {
    director: Arc<dyn Director>,
    fallback_credentials: CredentialHolder,
    outline_busy: InFlight,
    brief_busy: InFlight,
}

impl AppState {
    /// `fallback_credentials` is used when a request carries no `apiKey`.
    pub fn new(director: Arc<dyn Director>, fallback_credentials: CredentialHolder) -> Self {
        Self {
            director,
            fallback_credentials,
            outline_busy: InFlight::new(),
            brief_busy: InFlight::new(),
        }
    }

    fn credentials_for(&self, api_key: Option<String>) -> CredentialHolder {
        let holder = CredentialHolder::with_key(api_key.unwrap_or_default());
        if holder.has_key() {
            holder
        } else {
            self.fallback_credentials.clone()
        }
    }
}

// No Debug: the body carries the credential.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutlinePayload {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    ref_image: Option<String>,
    #[serde(flatten)]
    form: OutlineForm,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectorPayload {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(flatten)]
    form: AnalyzerForm,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/outline", post(handle_outline))
        .route("/api/director", post(handle_director))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn serve(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "lpforge server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn status_for(err: &DirectorError) -> StatusCode {
    match err {
        DirectorError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        err if err.is_fatal_before_generation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn outline_failure(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

fn director_failure(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn handle_outline(
    State(state): State<AppState>,
    Json(payload): Json<OutlinePayload>,
) -> Response {
    let Some(_busy) = state.outline_busy.try_begin() else {
        return outline_failure(
            StatusCode::CONFLICT,
            "an outline request is already running".to_string(),
        );
    };

    let credentials = state.credentials_for(payload.api_key);
    let ref_image = match payload
        .ref_image
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| InlineImage::from_base64(&raw))
        .transpose()
    {
        Ok(image) => image,
        Err(err) => {
            let err = DirectorError::from(err);
            return outline_failure(status_for(&err), err.to_string());
        }
    };
    let request = payload.form.into_request(ref_image);
    info!(
        product = request.form.product_name.as_str(),
        has_image = request.has_image(),
        "outline requested"
    );

    let director = Arc::clone(&state.director);
    match tokio::task::spawn_blocking(move || director.outline(&credentials, &request)).await {
        Ok(Ok(outline)) => Json(json!({ "success": true, "data": outline })).into_response(),
        Ok(Err(err)) => outline_failure(status_for(&err), err.to_string()),
        Err(err) => {
            error!(error = %err, "outline task panicked");
            outline_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "outline generation was interrupted".to_string(),
            )
        }
    }
}

async fn handle_director(
    State(state): State<AppState>,
    Json(payload): Json<DirectorPayload>,
) -> Response {
    let Some(_busy) = state.brief_busy.try_begin() else {
        return director_failure(
            StatusCode::CONFLICT,
            "an analysis is already running".to_string(),
        );
    };

    let credentials = state.credentials_for(payload.api_key);
    if !credentials.has_key() {
        let err = DirectorError::CredentialMissing;
        return director_failure(status_for(&err), err.to_string());
    }

    let url = payload.form.url.filter(|url| !url.trim().is_empty());
    let image = payload
        .form
        .image_base64
        .filter(|raw| !raw.trim().is_empty());
    // An attached screenshot wins over a URL; the page is only fetched without one.
    let target = match (url, image) {
        (_, Some(raw)) => match InlineImage::from_base64(&raw) {
            Ok(image) => AnalysisTarget::Image(image),
            Err(err) => {
                let err = DirectorError::from(err);
                return director_failure(status_for(&err), err.to_string());
            }
        },
        (Some(url), None) => AnalysisTarget::Url(url.trim().to_string()),
        (None, None) => {
            return director_failure(
                StatusCode::BAD_REQUEST,
                "URL or Image is required".to_string(),
            )
        }
    };
    info!(input = target.label(), "analysis requested");

    let director = Arc::clone(&state.director);
    match tokio::task::spawn_blocking(move || director.analyze(&credentials, &target)).await {
        Ok(Ok(brief)) => Json(brief).into_response(),
        Ok(Err(err)) => {
            warn!(error = %err, "analysis failed");
            director_failure(status_for(&err), err.to_string())
        }
        Err(err) => {
            error!(error = %err, "analysis task panicked");
            director_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "analysis was interrupted".to_string(),
            )
        }
    }
}
