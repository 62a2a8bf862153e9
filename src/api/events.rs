// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{body::Bytes, extract::State, Json};
use tracing::warn;

use crate::error::ApiError;
use crate::models::{MessageResponse, SensorEvent, EVENTS_SUCCESS_MESSAGE};
use crate::state::AppState;

/// Broadcast a sensor reading to every connected client.
///
/// Succeeds whatever happens to individual connections.
#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    request_body = SensorEvent,
    responses(
        (status = 200, description = "Reading broadcast", body = MessageResponse),
        (status = 400, description = "Body is not a sensor event", body = MessageResponse)
    )
)]
pub async fn publish_reading(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let event: SensorEvent = if body.is_empty() {
        SensorEvent::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "Rejected sensor event");
            ApiError::bad_request(format!("Invalid sensor event: {e}"))
        })?
    };

    state.broadcaster.broadcast(&event.message);

    Ok(Json(MessageResponse::new(EVENTS_SUCCESS_MESSAGE)))
}
