use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::NewExpense,
    error::ApiError,
    protocol::{ChatRequest, ChatResponse, CHAT_ROUTE, EXPENSES_ROUTE},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::{assistant, ApiContext, CreatedExpense, ExpenseRecord};
use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let state = AppState {
        api: ApiContext::new(),
    };
    let app = build_router(Arc::new(state), &settings.allowed_origins);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, origins = ?settings.allowed_origins, "expense server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            EXPENSES_ROUTE,
            get(http_list_expenses).post(http_create_expense),
        )
        .route(CHAT_ROUTE, post(http_chat))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_expenses(State(state): State<Arc<AppState>>) -> Json<Vec<ExpenseRecord>> {
    Json(state.api.list_expenses())
}

async fn http_create_expense(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewExpense>,
) -> Result<Json<CreatedExpense>, (StatusCode, Json<ApiError>)> {
    let created = state
        .api
        .create_expense(req)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiError::from(e))))?;
    info!(id = created.id, "expense added");
    Ok(Json(created))
}

async fn http_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let bot_response = assistant::reply(&state.api, &req.user_message);
    debug!(chars = req.user_message.len(), "answered chat message");
    Json(ChatResponse { bot_response })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
