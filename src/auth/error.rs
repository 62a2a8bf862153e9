// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Every failure along the login path is one of these variants. The
//! authenticator decides what to do with it by kind: only
//! [`AuthError::UnknownKey`] is ever retried, and only once, after a forced
//! key-set refresh.

use crate::storage::StorageError;

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The JWKS endpoint could not be reached or returned an unusable key set.
    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),

    /// Token is not three base64url segments with a decodable header.
    #[error("Token is malformed: {0}")]
    MalformedToken(String),

    /// No key in the current key set has the token's `kid`.
    #[error("No signing key found for kid '{0}'")]
    UnknownKey(String),

    /// Token header declares an algorithm other than RS256.
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key matching the token's `kid` cannot verify an RS256 signature.
    #[error("Signing key is unusable: {0}")]
    InvalidKey(String),

    /// Signature does not match header and payload under the resolved key.
    #[error("Token signature is invalid")]
    SignatureInvalid,

    /// A claim failed validation or is missing.
    #[error("Token claim '{claim}' is invalid: {reason}")]
    ClaimValidation { claim: String, reason: String },

    /// Transport failure talking to the token endpoint.
    #[error("Token exchange request failed: {0}")]
    ExchangeNetwork(String),

    /// Token endpoint answered with a non-2xx status.
    #[error("Token exchange was rejected with HTTP {status}: {body}")]
    ExchangeRejected { status: u16, body: String },

    /// Token endpoint answered 2xx but the body is not a token bundle.
    #[error("Token exchange response is invalid: {0}")]
    ExchangeMalformedResponse(String),

    /// The user store failed.
    #[error("User repository error: {0}")]
    Repository(#[from] StorageError),

    /// The login request body is unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AuthError {
    /// Build a [`AuthError::ClaimValidation`].
    pub fn claim(claim: impl Into<String>, reason: impl Into<String>) -> Self {
        AuthError::ClaimValidation {
            claim: claim.into(),
            reason: reason.into(),
        }
    }

    /// Stable code for this error, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::KeyFetch(_) => "key_fetch",
            AuthError::MalformedToken(_) => "malformed_token",
            AuthError::UnknownKey(_) => "unknown_key",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::InvalidKey(_) => "invalid_key",
            AuthError::SignatureInvalid => "signature_invalid",
            AuthError::ClaimValidation { .. } => "claim_validation",
            AuthError::ExchangeNetwork(_) => "exchange_network",
            AuthError::ExchangeRejected { .. } => "exchange_rejected",
            AuthError::ExchangeMalformedResponse(_) => "exchange_malformed_response",
            AuthError::Repository(_) => "repository",
            AuthError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Stage of the login flow that produced the error.
    pub fn component(&self) -> &'static str {
        match self {
            AuthError::KeyFetch(_) => "key_provider",
            AuthError::MalformedToken(_)
            | AuthError::UnknownKey(_)
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::InvalidKey(_)
            | AuthError::SignatureInvalid
            | AuthError::ClaimValidation { .. } => "token_verifier",
            AuthError::ExchangeNetwork(_)
            | AuthError::ExchangeRejected { .. }
            | AuthError::ExchangeMalformedResponse(_) => "token_exchanger",
            AuthError::Repository(_) => "user_repository",
            AuthError::InvalidRequest(_) => "request",
        }
    }

    /// Whether a key-set refresh followed by one more verification may succeed.
    ///
    /// A bad signature is never retryable: a forged or corrupted token must
    /// fail hard.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::UnknownKey(_))
    }

    /// Whether the failure came from an outbound HTTP call to the provider.
    ///
    /// A rejected code exchange counts: the HTTP client surfaces a non-2xx
    /// status the same way as a transport failure.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AuthError::KeyFetch(_)
                | AuthError::ExchangeNetwork(_)
                | AuthError::ExchangeRejected { .. }
        )
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        if self.is_network() {
            format!("Network error: {self}")
        } else {
            self.to_string()
        }
    }
}
