//! Protected question endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;
use tracing::info;

use margdarshi_security::Claims;

use crate::response::ChatReply;
use crate::state::AppState;

/// Chat handler - POST /api/chat/geeta
///
/// A body that is not JSON counts as a missing question.
pub async fn ask(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    info!("New chat request from user: {}", display_name(&user));

    let question = body
        .ok()
        .and_then(|Json(mut value)| value.get_mut("question").map(Value::take));

    let response = state.pipeline.handle(question.as_ref()).await;
    let status =
        StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(ChatReply::from(response))).into_response()
}

fn display_name(claims: &Claims) -> &str {
    if claims.name.is_empty() {
        "Unknown"
    } else {
        &claims.name
    }
}
