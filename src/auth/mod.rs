// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! OAuth2 authorization-code login against an OIDC identity provider
//! (Cognito user pools in production).
//!
//! ## Auth Flow
//!
//! 1. Frontend completes the hosted login and receives an authorization code
//! 2. Frontend sends `POST {"code": "<code>"}`
//! 3. Server:
//!    - Exchanges the code at the token endpoint
//!    - Fetches the provider JWKS (cached for the life of the process)
//!    - Verifies the identity token signature (RS256 only), issuer, audience and expiry
//!    - Extracts username, email and display name
//!    - Creates the user on first login
//!
//! ## Security
//!
//! - No claim is trusted before the signature verifies
//! - An unknown `kid` triggers one key-set refresh; a bad signature never does
//! - Every outbound call is bounded by the shared client timeout
//! - `at_hash` is not validated

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod exchange;
pub mod jwks;
pub mod verifier;

use std::time::Duration;

pub use authenticator::{Authenticator, LoginOutcome};
pub use claims::{IdentityClaims, UserProfile};
pub use error::AuthError;
pub use exchange::{TokenBundle, TokenExchanger};
pub use jwks::{KeyProvider, SigningKey, SigningKeySet};
pub use verifier::TokenVerifier;

/// HTTP client shared by the key provider and the token exchanger.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
