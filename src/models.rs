// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Every response carries a
//! human-readable `message`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TokenBundle;
use crate::broadcast::SensorReading;

pub const LOGIN_SUCCESS_MESSAGE: &str = "User data processed successfully";
pub const EVENTS_SUCCESS_MESSAGE: &str = "Data sent successfully";

/// Login request carrying the authorization code from the hosted UI redirect.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Single-use authorization code.
    pub code: String,
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LoginResponse {
    pub message: String,
    /// Token endpoint response, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub tokens: Option<TokenBundle>,
}

impl LoginResponse {
    pub fn success(tokens: TokenBundle) -> Self {
        Self {
            message: LOGIN_SUCCESS_MESSAGE.to_string(),
            tokens: Some(tokens),
        }
    }
}

/// Body of every response that carries only a message, errors included.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sensor event published by the mat bridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SensorEvent {
    /// Reading to broadcast. Missing fields default to empty arrays.
    #[serde(default)]
    pub message: SensorReading,
}
