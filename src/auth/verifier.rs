// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity token verification.
//!
//! ## Order of Checks
//!
//! 1. Structure: three dot-separated segments, decodable header with a `kid`
//! 2. Key lookup by `kid` ([`AuthError::UnknownKey`] on a miss)
//! 3. Algorithm pinned to RS256, then the RSA signature
//! 4. Claims: `iss`, `aud`, `exp`
//!
//! No claim is read before the signature verifies. `at_hash` is not
//! validated.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};

use super::claims::IdentityClaims;
use super::error::AuthError;
use super::jwks::SigningKeySet;

/// Verifies RS256 identity tokens for one issuer/audience pair.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    expected_audience: String,
    expected_issuer: String,
    /// Clock skew tolerance in seconds applied to `exp`
    leeway: u64,
}

impl TokenVerifier {
    pub fn new(expected_audience: impl Into<String>, expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_audience: expected_audience.into(),
            expected_issuer: expected_issuer.into(),
            leeway: 0,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway = leeway_secs;
        self
    }

    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// Verify `token` against `keys` and return its claims.
    pub fn verify(&self, token: &str, keys: &SigningKeySet) -> Result<IdentityClaims, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        }

        let header = decode_header(token).map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("header has no kid".to_string()))?;

        let key = keys
            .find(&kid)
            .ok_or_else(|| AuthError::UnknownKey(kid.clone()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }

        let decoding_key = key.decoding_key()?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = self.leeway;
        validation.validate_exp = true;
        // `exp` is exclusive: a token is dead at the second it names.
        validation.reject_tokens_expiring_in_less_than = 1;
        validation.set_issuer(&[&self.expected_issuer]);
        validation.set_audience(&[&self.expected_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        // Decode loosely so a missing claim surfaces as a validation failure
        // rather than a deserialization error.
        let token_data = decode::<Map<String, Value>>(token, &decoding_key, &validation)
            .map_err(map_jwt_error)?;

        serde_json::from_value(Value::Object(token_data.claims))
            .map_err(|e| AuthError::MalformedToken(format!("unexpected claim shape: {e}")))
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm(err.to_string()),
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            AuthError::InvalidKey(err.to_string())
        }
        ErrorKind::ExpiredSignature => AuthError::claim("exp", "token has expired"),
        ErrorKind::InvalidIssuer => AuthError::claim("iss", "unexpected issuer"),
        ErrorKind::InvalidAudience => AuthError::claim("aud", "audience does not include this client"),
        ErrorKind::MissingRequiredClaim(claim) => AuthError::claim(claim.as_str(), "claim is missing"),
        _ => AuthError::MalformedToken(err.to_string()),
    }
}
