//! Inbound HTTP surface
//!
//! Every method on every path reaches the update handler; only the query
//! string is read. Outcomes map to flat statuses with short plain-text bodies.

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use ddns_core::{Error, UpdateHandler};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Body sent for a malformed request
pub const INVALID_PARAMETERS: &str = "Invalid parameters";
/// Body sent for a credential mismatch
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Body sent when the provider did not confirm an update
pub const PROVIDER_FAILED: &str = "Porkbun API failed";

/// Build the Axum application around an update handler
pub fn build_app(handler: Arc<UpdateHandler>) -> Router {
    Router::new()
        .route("/", any(update))
        .fallback(update)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn update(
    State(handler): State<Arc<UpdateHandler>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<StatusCode, ApiError> {
    handler.handle(&first_values(pairs)).await?;
    Ok(StatusCode::OK)
}

/// Collapse repeated keys, keeping the first value of each
fn first_values(pairs: Vec<(String, String)>) -> HashMap<String, String> {
    let mut query = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        query.entry(key).or_insert(value);
    }
    query
}

/// Update failure as seen by the caller
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            Error::MalformedRequest(_) => (StatusCode::BAD_REQUEST, INVALID_PARAMETERS),
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_FAILED),
        };

        (status, message).into_response()
    }
}
