// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity token claims and the user profile derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Default claim holding the username in Cognito identity tokens.
pub const DEFAULT_USERNAME_CLAIM: &str = "cognito:username";

/// `aud` may be a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Many(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a verified identity token.
///
/// Only produced by [`TokenVerifier::verify`](super::TokenVerifier::verify),
/// so holding one means the signature, issuer, audience and expiry checked out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Issuer
    pub iss: String,
    /// Audience (the client ID)
    pub aud: Audience,
    /// Expiration timestamp
    pub exp: i64,
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Everything else (`cognito:username`, `iat`, `at_hash`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityClaims {
    /// Look up a string claim by name.
    pub fn get_str(&self, claim: &str) -> Option<&str> {
        match claim {
            "iss" => Some(self.iss.as_str()),
            "sub" => self.sub.as_deref(),
            "email" => self.email.as_deref(),
            "name" => self.name.as_deref(),
            other => self.extra.get(other).and_then(Value::as_str),
        }
    }
}

/// The fields persisted for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub name: String,
}

impl UserProfile {
    /// Extract the profile, requiring a non-empty value for every field.
    pub fn from_claims(claims: &IdentityClaims, username_claim: &str) -> Result<Self, AuthError> {
        Ok(Self {
            username: required(claims, username_claim)?,
            email: required(claims, "email")?,
            name: required(claims, "name")?,
        })
    }
}

fn required(claims: &IdentityClaims, claim: &str) -> Result<String, AuthError> {
    match claims.get_str(claim) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        Some(_) => Err(AuthError::claim(claim, "claim is empty")),
        None => Err(AuthError::claim(claim, "claim is missing")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> IdentityClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn audience_accepts_string_or_array() {
        let single: Audience = serde_json::from_value(json!("client")).unwrap();
        assert!(single.contains("client"));
        assert!(!single.contains("other"));

        let many: Audience = serde_json::from_value(json!(["a", "client"])).unwrap();
        assert!(many.contains("client"));
    }

    #[test]
    fn profile_reads_custom_username_claim() {
        let c = claims(json!({
            "iss": "https://issuer",
            "aud": "client",
            "exp": 1,
            "cognito:username": "alice",
            "email": "alice@example.com",
            "name": "Alice",
        }));
        let profile = UserProfile::from_claims(&c, DEFAULT_USERNAME_CLAIM).unwrap();
        assert_eq!(
            profile,
            UserProfile {
                username: "alice".into(),
                email: "alice@example.com".into(),
                name: "Alice".into(),
            }
        );
    }

    #[test]
    fn missing_profile_claim_names_the_claim() {
        let c = claims(json!({
            "iss": "https://issuer",
            "aud": "client",
            "exp": 1,
            "cognito:username": "alice",
            "name": "Alice",
        }));
        let err = UserProfile::from_claims(&c, DEFAULT_USERNAME_CLAIM).unwrap_err();
        assert!(matches!(err, AuthError::ClaimValidation { ref claim, .. } if claim == "email"));
    }

    #[test]
    fn unknown_claims_round_trip_through_extra() {
        let raw = json!({
            "iss": "https://issuer",
            "aud": ["client"],
            "exp": 42,
            "iat": 7,
            "at_hash": "abc",
        });
        let c = claims(raw.clone());
        assert_eq!(c.extra.get("at_hash"), Some(&json!("abc")));
        assert_eq!(serde_json::to_value(&c).unwrap(), raw);
    }
}
