// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Smart Yoga Mat Server - Login and Sensor Fan-out Service
//!
//! This crate provides the backend for the smart yoga mat app: OAuth2
//! authorization-code login against a Cognito user pool with first-login
//! user provisioning, and fan-out of mat sensor readings to connected clients.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Code exchange, JWKS caching and identity token verification
//! - `broadcast` - Sensor reading fan-out
//! - `storage` - User records (redb or in-memory)

pub mod api;
pub mod auth;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
