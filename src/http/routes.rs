//! HTTP route definitions

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::sim::ServiceError;

/// Build the router for a service
///
/// The service's update path takes POSTs. Everything else, including other
/// methods on the update path, gets the informational 404 page.
pub fn build_router(state: AppState) -> Router {
    let update_path = state.service.update_path();

    Router::new()
        .route(
            update_path,
            post(update_handler).fallback(not_found_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Update endpoint
// ============================================================================

async fn update_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    // Peers are not required to send a JSON content type
    let request: Value =
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    debug!(
        service = state.service.title(),
        bytes = body.len(),
        "Update received"
    );

    let reply = state.service.receive(request)?;
    Ok(Json(reply))
}

// ============================================================================
// Not found page
// ============================================================================

async fn not_found_handler(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(not_found_page(
            state.service.title(),
            state.service.update_path(),
        )),
    )
}

fn not_found_page(title: &str, update_path: &str) -> String {
    format!(
        "<html>\n  <head>\n    <title>{title}</title>\n  </head>\n  <body>\n    <p>404: Not found</p>\n    <p>Try POSTing to <a href=\"{path}\">{path}</a>\n  </body>\n</html>\n",
        title = title,
        path = update_path,
    )
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::InvalidRequest(_) => AppError::BadRequest(err.to_string()),
            ServiceError::Encode(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        warn!(status = status.as_u16(), error = %message, "Request failed");

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
