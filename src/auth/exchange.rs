// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization-code exchange against the identity provider's token endpoint.
//!
//! Codes are single-use, so nothing here retries: a rejected exchange is
//! returned to the caller as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::AuthError;

/// Cap on the provider error body carried in [`AuthError::ExchangeRejected`].
const MAX_ERROR_BODY_LEN: usize = 512;

/// Tokens returned by a successful exchange.
///
/// Unknown fields are kept so the bundle can be handed back to the caller
/// exactly as the provider sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client for the `authorization_code` grant.
#[derive(Debug, Clone)]
pub struct TokenExchanger {
    token_endpoint: String,
    client_id: String,
    redirect_uri: String,
    http: reqwest::Client,
}

impl TokenExchanger {
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            http,
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Swap `code` for a [`TokenBundle`].
    pub async fn exchange(&self, code: &str) -> Result<TokenBundle, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
        ];

        debug!(endpoint = %self.token_endpoint, "Exchanging authorization code");
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::ExchangeNetwork(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY_LEN);
            return Err(AuthError::ExchangeRejected { status, body });
        }

        let bundle: TokenBundle = response
            .json()
            .await
            .map_err(|e| AuthError::ExchangeMalformedResponse(e.to_string()))?;

        if bundle.id_token.trim().is_empty() {
            return Err(AuthError::ExchangeMalformedResponse(
                "token response did not include id_token".to_string(),
            ));
        }

        Ok(bundle)
    }
}

fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
