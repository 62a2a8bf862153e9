// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login endpoint.
//!
//! Mounted with `any()` so that a non-POST request gets the JSON 405 body
//! instead of axum's empty one. The body is parsed by hand: an unusable body
//! is a login failure (500), like every other failure on this route.

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    Json,
};
use tracing::error;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, MessageResponse};
use crate::state::AppState;

/// Exchange an authorization code, verify the identity and provision the user.
#[utoipa::path(
    post,
    path = "/auth",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User authenticated; provider tokens echoed", body = LoginResponse),
        (status = 405, description = "Method other than POST", body = MessageResponse),
        (status = 500, description = "Exchange, verification or storage failed", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    if method != Method::POST {
        return Err(ApiError::method_not_allowed());
    }

    let code = parse_code(&body).map_err(report)?;
    let outcome = state
        .authenticator
        .authenticate(&code)
        .await
        .map_err(report)?;

    Ok(Json(LoginResponse::success(outcome.tokens)))
}

fn parse_code(body: &[u8]) -> Result<String, AuthError> {
    let request: LoginRequest = serde_json::from_slice(body)
        .map_err(|e| AuthError::InvalidRequest(format!("body must be {{\"code\": string}}: {e}")))?;
    if request.code.trim().is_empty() {
        return Err(AuthError::InvalidRequest("code must not be empty".to_string()));
    }
    Ok(request.code)
}

/// Log a login failure once and turn it into the response.
fn report(err: AuthError) -> ApiError {
    error!(
        kind = err.kind(),
        component = err.component(),
        error = %err,
        "Login failed"
    );
    ApiError::from(err)
}
