// Mystic Companion - Web Server
// Stateless JSON API: every request carries its own session state

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use mystic_companion::{
    data_url, export_text, logging, open_chat, read_birth, reset_chat, simulate_turn, AppConfig,
    BirthForm, ChatLog, ChatState, CompanionGenerator, FieldError, Reading, CATALOG,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mystic-server", about = "Web front end for the companion finder")]
struct Args {
    /// JSON config file (falls back to $MYSTIC_COMPANION_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the configured bind address
    #[arg(long)]
    addr: Option<String>,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    generator: CompanionGenerator,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn fail(data: T, error: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
struct SessionResponse {
    reading: Reading,
    chat: ChatState,
}

#[derive(Deserialize)]
struct ChatRequest {
    form: BirthForm,
    state: ChatState,
    message: String,
}

#[derive(Deserialize)]
struct ResetRequest {
    form: BirthForm,
    state: ChatState,
}

#[derive(Serialize)]
struct ExportResponse {
    text: String,
    href: String,
}

/// Validate the form or answer 422 with one entry per failing field
fn validated_reading(form: &BirthForm) -> Result<Reading, Response> {
    match form.validate() {
        Ok(record) => Ok(read_birth(&record)),
        Err(errors) => {
            warn!(count = errors.len(), "rejected birth form");
            let fields: Vec<FieldError> = errors.iter().map(FieldError::from).collect();
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::fail(fields, "Invalid birth details".to_string())),
            )
                .into_response())
        }
    }
}

/// Malformed or mistyped JSON still answers with an ApiResponse
fn rejected(rejection: JsonRejection) -> Response {
    warn!(%rejection, "rejected request body");
    let status = rejection.status();
    (status, Json(ApiResponse::fail((), rejection.body_text()))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - The companion catalog
async fn get_catalog() -> impl IntoResponse {
    Json(ApiResponse::ok(&CATALOG))
}

/// POST /api/reading - Validate the form, match a companion, open the chat
async fn create_reading(
    State(state): State<AppState>,
    payload: Result<Json<BirthForm>, JsonRejection>,
) -> Response {
    let Json(form) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejected(rejection),
    };
    let reading = match validated_reading(&form) {
        Ok(reading) => reading,
        Err(response) => return response,
    };

    let seed = state.generator.seed_for(&reading.record);
    let chat = open_chat(&reading, seed);

    info!(companion = reading.matched.archetype.id, "reading served");
    (StatusCode::OK, Json(ApiResponse::ok(SessionResponse { reading, chat }))).into_response()
}

/// POST /api/chat - One simulated turn
async fn chat_turn(payload: Result<Json<ChatRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejected(rejection),
    };
    let reading = match validated_reading(&request.form) {
        Ok(reading) => reading,
        Err(response) => return response,
    };

    let chat = simulate_turn(request.state, &reading, &request.message);
    (StatusCode::OK, Json(ApiResponse::ok(chat))).into_response()
}

/// POST /api/reset - Back to the opening line
async fn chat_reset(payload: Result<Json<ResetRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejected(rejection),
    };
    let reading = match validated_reading(&request.form) {
        Ok(reading) => reading,
        Err(response) => return response,
    };

    let chat = reset_chat(request.state, &reading);
    (StatusCode::OK, Json(ApiResponse::ok(chat))).into_response()
}

/// POST /api/export - Plain text plus a data URL for download
async fn export_chat(payload: Result<Json<ChatLog>, JsonRejection>) -> Response {
    let Json(log) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejected(rejection),
    };
    let text = export_text(&log);
    let href = data_url(&text);
    Json(ApiResponse::ok(ExportResponse { text, href })).into_response()
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/reading", post(create_reading))
        .route("/chat", post(chat_turn))
        .route("/reset", post(chat_reset))
        .route("/export", post(export_chat))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;
    logging::init_stderr(&format!("{},tower_http=info", config.log_filter));

    let state = AppState {
        generator: CompanionGenerator {
            flavor_seed: config.flavor_seed,
        },
    };

    let addr = args.addr.unwrap_or(config.server_addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "🚀 companion server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server stopped unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            generator: CompanionGenerator::with_seed(11),
        })
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        post_raw(uri, body.to_string()).await
    }

    async fn post_raw(uri: &str, body: String) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn ada() -> Value {
        json!({
            "name": "Ada",
            "birth_date": "1990-01-01",
            "birth_time": "00:00",
            "latitude": "51.5",
            "longitude": "-0.12"
        })
    }

    #[tokio::test]
    async fn test_reading_then_chat_then_export() {
        let (status, body) = post_json("/api/reading", ada()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["chat"]["seed"], 11);
        let harmony = body["data"]["reading"]["matched"]["harmony"].as_u64().unwrap();
        assert!(harmony <= 100);

        let state = body["data"]["chat"].clone();
        let (status, body) = post_json(
            "/api/chat",
            json!({ "form": ada(), "state": state, "message": "Hello, who are you?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["turns"], 1);
        assert_eq!(body["data"]["log"]["lines"].as_array().unwrap().len(), 3);

        let log = body["data"]["log"].clone();
        let (status, body) = post_json("/api/export", log).await;
        assert_eq!(status, StatusCode::OK);
        let text = body["data"]["text"].as_str().unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(body["data"]["href"].as_str().unwrap().starts_with("data:file/txt;base64,"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_422_with_fields() {
        let mut form = ada();
        form["birth_date"] = json!("2150-01-01");
        form["latitude"] = json!("95");

        let (status, body) = post_json("/api/reading", form).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);

        let fields: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["birth_date", "latitude"]);
    }

    #[tokio::test]
    async fn test_reset_returns_opening_line() {
        let (_, body) = post_json("/api/reading", ada()).await;
        let opening = body["data"]["chat"].clone();

        let (_, body) = post_json(
            "/api/chat",
            json!({ "form": ada(), "state": opening.clone(), "message": "hi" }),
        )
        .await;
        let (status, body) = post_json(
            "/api/reset",
            json!({ "form": ada(), "state": body["data"] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], opening);
    }

    #[tokio::test]
    async fn test_chat_at_turn_ceiling_still_answers() {
        let (_, body) = post_json("/api/reading", ada()).await;
        let mut state = body["data"]["chat"].clone();
        state["turns"] = json!(u32::MAX);

        let (status, body) = post_json(
            "/api/chat",
            json!({ "form": ada(), "state": state, "message": "hi" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["turns"], u32::MAX);
        assert_eq!(body["data"]["log"]["lines"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_api_response() {
        let (status, body) = post_raw("/api/reading", "{not json".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().is_some());

        let (status, body) = post_json("/api/chat", json!({ "form": ada(), "message": "hi" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_gallery_roles_are_titles() {
        let (_, body) = post_json("/api/reading", ada()).await;
        let roles: Vec<&str> = body["data"]["reading"]["matched"]["gallery"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["Primary Familiar", "Guardian", "Whisperer"]);
    }

    #[tokio::test]
    async fn test_catalog_and_index() {
        let response = app()
            .oneshot(Request::get("/api/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["archetypes"].as_array().unwrap().len(), 12);

        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
