//! HTTP API
//!
//! A tokio accept loop with one task per connection and a plain `match` on
//! `(method, path)` for routing.

use crate::advisor::{optimize_sql, suggest, validate_sql};
use crate::config::AppConfig;
use crate::error::{Result, SqlGenError};
use crate::http::{read_request, write_response, HttpRequest, HttpResponse};
use crate::orchestrator::GenerationOrchestrator;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

pub const SCHEMA_MISSING_SQL: &str = "-- Please configure DATABASE_SCHEMA in .env file";
pub const PROVIDER_MISSING_SQL: &str = "-- Please configure AI_PROVIDER in .env file";
pub const GENERATION_FAILED_SQL: &str = "-- Error generating SQL query";

/// POST routes that take a JSON object body.
const SQL_ROUTES: [&str; 4] = [
    "/api/sql/generate",
    "/api/sql/validate",
    "/api/sql/optimize",
    "/api/sql/suggest",
];

pub struct AppState {
    pub orchestrator: GenerationOrchestrator,
    pub started: Instant,
}

impl AppState {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self {
            orchestrator,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.orchestrator.config()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    description: Option<String>,
}

/// `database_type` is accepted from clients but every dialect is handled alike.
#[derive(Debug, Deserialize)]
struct SqlBody {
    #[serde(default)]
    sql: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestBody {
    #[serde(default)]
    partial_query: Option<String>,
    #[serde(default)]
    context: Option<Value>,
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, provider = %config.provider, "Server listening");
    info!("Health check: http://localhost:{}/health", config.server.port);
    if config.database_schema.is_none() {
        warn!("DATABASE_SCHEMA not set - generation requests will be rejected");
    }
    let state = Arc::new(AppState::new(GenerationOrchestrator::new(config)));
    run(listener, state).await
}

pub async fn run(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "New connection");
        tokio::spawn(handle_connection(stream, Arc::clone(&state)));
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) {
    let origin = state.config().server.frontend_url.clone();
    let response = match read_request(&mut stream).await {
        Ok(Some(request)) => route(&state, &request).await,
        Ok(None) => return,
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Failed to read request");
            read_error_response(&e)
        }
    };
    if let Err(e) = write_response(&mut stream, &response, &origin).await {
        error!(error = %e, "Failed to write response");
    }
}

pub async fn route(state: &AppState, request: &HttpRequest) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4();
    let timestamp = chrono::Utc::now().to_rfc3339();
    info!(%request_id, %timestamp, method = %request.method, path = %request.path, "Request");

    let method = request.method.as_str();
    let path = request.path.as_str();

    if method == "OPTIONS" {
        return HttpResponse::empty(204);
    }

    if method == "POST" && SQL_ROUTES.contains(&path) {
        if let Err(response) = require_json_body(request) {
            return response;
        }
    }

    let response = match (method, path) {
        ("GET", "/") => HttpResponse::json(
            200,
            &json!({
                "message": "Welcome to the SQL Query Builder API",
                "version": env!("CARGO_PKG_VERSION"),
                "endpoints": {
                    "health": "/health",
                    "generateSQL": "POST /api/sql/generate",
                    "validateSQL": "POST /api/sql/validate",
                    "optimizeSQL": "POST /api/sql/optimize",
                    "suggestSQL": "POST /api/sql/suggest"
                }
            }),
        ),
        ("GET", "/health") => HttpResponse::json(
            200,
            &json!({
                "status": "OK",
                "message": "SQL Query Builder backend is running",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "uptime": state.started.elapsed().as_secs_f64(),
            }),
        ),
        ("POST", "/api/sql/generate") => handle_generate(state, &request.body).await,
        ("POST", "/api/sql/validate") => handle_validate(&request.body),
        ("POST", "/api/sql/optimize") => handle_optimize(&request.body),
        ("POST", "/api/sql/suggest") => handle_suggest(&request.body),
        _ => HttpResponse::json(
            404,
            &json!({
                "error": "Endpoint not found",
                "message": format!("Cannot {} {}", method, path),
            }),
        ),
    };

    info!(%request_id, status = response.status, "Response");
    response
}

fn bad_request(error: &str, message: &str) -> HttpResponse {
    HttpResponse::json(400, &json!({ "error": error, "message": message }))
}

fn read_error_response(err: &SqlGenError) -> HttpResponse {
    match err {
        SqlGenError::PayloadTooLarge(message) => HttpResponse::json(
            413,
            &json!({ "error": "Payload too large", "message": message }),
        ),
        other => bad_request("Invalid request", &other.to_string()),
    }
}

fn require_json_body(request: &HttpRequest) -> std::result::Result<(), HttpResponse> {
    let body = request.body.trim();
    if body.is_empty() || serde_json::from_str::<Value>(body).map(|v| !v.is_object()).unwrap_or(true) {
        return Err(bad_request("Invalid request", "Request body is required"));
    }
    Ok(())
}

async fn handle_generate(state: &AppState, body: &str) -> HttpResponse {
    let description = serde_json::from_str::<GenerateBody>(body)
        .ok()
        .and_then(|b| b.description)
        .unwrap_or_default();

    if description.trim().is_empty() {
        return bad_request(
            "Description is required",
            "Please provide a natural language description of the SQL query",
        );
    }

    match state.orchestrator.generate(&description).await {
        Ok(result) => {
            let mut payload = json!({
                "success": true,
                "sql": &result.sql,
                "execution_time": result.execution_time(),
                "used_fallback": result.used_fallback,
                "provider": result.provider,
            });
            if let Some(warning) = &result.warning {
                payload["warning"] = json!(warning);
            }
            HttpResponse::json(200, &payload)
        }
        Err(e) => generation_error_response(&e, state.config()),
    }
}

fn generation_error_response(err: &SqlGenError, config: &AppConfig) -> HttpResponse {
    error!(kind = err.kind(), error = %err, "Error generating SQL");
    match err {
        SqlGenError::Input(message) => bad_request("Description is required", message),
        SqlGenError::Configuration(_) if config.database_schema.is_none() => HttpResponse::json(
            500,
            &json!({
                "error": "Database schema not configured",
                "message": "Please configure DATABASE_SCHEMA in environment variables",
                "sql": SCHEMA_MISSING_SQL,
            }),
        ),
        SqlGenError::Configuration(message) => HttpResponse::json(
            503,
            &json!({
                "error": "AI service not configured",
                "message": message,
                "sql": PROVIDER_MISSING_SQL,
            }),
        ),
        other => HttpResponse::json(
            500,
            &json!({
                "error": "Failed to generate SQL",
                "message": other.to_string(),
                "sql": GENERATION_FAILED_SQL,
            }),
        ),
    }
}

fn parse_sql_body(body: &str) -> std::result::Result<String, HttpResponse> {
    serde_json::from_str::<SqlBody>(body)
        .ok()
        .and_then(|b| b.sql)
        .filter(|sql| !sql.trim().is_empty())
        .ok_or_else(|| bad_request("SQL query is required", "Please provide an SQL query"))
}

fn handle_validate(body: &str) -> HttpResponse {
    let sql = match parse_sql_body(body) {
        Ok(sql) => sql,
        Err(response) => return response,
    };
    let report = validate_sql(&sql);
    HttpResponse::json(200, &json!({ "success": true, "data": report }))
}

fn handle_optimize(body: &str) -> HttpResponse {
    let sql = match parse_sql_body(body) {
        Ok(sql) => sql,
        Err(response) => return response,
    };
    let report = optimize_sql(&sql);
    HttpResponse::json(
        200,
        &json!({
            "success": true,
            "data": {
                "original_sql": sql,
                "optimized_sql": report.sql,
                "improvements": report.improvements,
                "performance_gain": report.performance_gain,
            }
        }),
    )
}

fn handle_suggest(body: &str) -> HttpResponse {
    let parsed: SuggestBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return bad_request("Invalid request", &e.to_string()),
    };
    let list = suggest(parsed.partial_query.as_deref(), parsed.context);
    HttpResponse::json(200, &json!({ "success": true, "data": list }))
}
