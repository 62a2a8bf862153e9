// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login orchestration.
//!
//! ## Flow
//!
//! 1. Exchange the authorization code for a [`TokenBundle`]
//! 2. Verify the identity token against the cached key set. On
//!    [`AuthError::UnknownKey`] only, force a key-set refresh and verify once more
//! 3. Extract username, email and name
//! 4. Create the user if it does not exist yet
//!
//! Errors are returned untouched; the HTTP boundary logs and maps them.

use tracing::{debug, info, warn};

use super::claims::{IdentityClaims, UserProfile, DEFAULT_USERNAME_CLAIM};
use super::error::AuthError;
use super::exchange::{TokenBundle, TokenExchanger};
use super::jwks::KeyProvider;
use super::verifier::TokenVerifier;
use crate::config::OidcConfig;
use crate::storage::{StorageError, UserRepository};

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    /// Tokens exactly as returned by the token endpoint
    pub tokens: TokenBundle,
    pub username: String,
    /// Whether this login provisioned the user
    pub created: bool,
}

pub struct Authenticator {
    exchanger: TokenExchanger,
    keys: KeyProvider,
    verifier: TokenVerifier,
    users: UserRepository,
    username_claim: String,
}

impl Authenticator {
    pub fn new(
        exchanger: TokenExchanger,
        keys: KeyProvider,
        verifier: TokenVerifier,
        users: UserRepository,
    ) -> Self {
        Self {
            exchanger,
            keys,
            verifier,
            users,
            username_claim: DEFAULT_USERNAME_CLAIM.to_string(),
        }
    }

    /// Read the username from `claim` instead of `cognito:username`.
    pub fn with_username_claim(mut self, claim: impl Into<String>) -> Self {
        self.username_claim = claim.into();
        self
    }

    /// Wire up every collaborator from configuration, sharing `http` between them.
    pub fn from_config(oidc: &OidcConfig, http: reqwest::Client, users: UserRepository) -> Self {
        let mut keys = KeyProvider::new(oidc.jwks_url.clone(), http.clone());
        if let Some(ttl) = oidc.jwks_cache_ttl {
            keys = keys.with_cache_ttl(ttl);
        }

        Self::new(
            TokenExchanger::new(
                oidc.token_endpoint.clone(),
                oidc.client_id.clone(),
                oidc.redirect_uri.clone(),
                http,
            ),
            keys,
            TokenVerifier::new(oidc.client_id.clone(), oidc.issuer.clone()),
            users,
        )
        .with_username_claim(oidc.username_claim.clone())
    }

    pub fn key_provider(&self) -> &KeyProvider {
        &self.keys
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    /// Run the full login flow for `code`.
    pub async fn authenticate(&self, code: &str) -> Result<LoginOutcome, AuthError> {
        let tokens = self.exchanger.exchange(code).await?;
        let claims = self.verify_identity(&tokens.id_token).await?;
        let profile = UserProfile::from_claims(&claims, &self.username_claim)?;

        let created = self.provision(&profile)?;

        Ok(LoginOutcome {
            tokens,
            username: profile.username,
            created,
        })
    }

    /// Verify an identity token, refreshing the key set once if its `kid` is unknown.
    pub async fn verify_identity(&self, id_token: &str) -> Result<IdentityClaims, AuthError> {
        let keys = self.keys.get_keys(false).await?;
        match self.verifier.verify(id_token, &keys) {
            Err(err) if err.is_retryable() => {
                debug!(error = %err, "Signing key not in cached set, refreshing");
                let keys = self.keys.get_keys(true).await?;
                self.verifier.verify(id_token, &keys)
            }
            result => result,
        }
    }

    fn provision(&self, profile: &UserProfile) -> Result<bool, AuthError> {
        if self.users.exists(&profile.username)? {
            debug!(username = %profile.username, "User already exists");
            return Ok(false);
        }

        match self
            .users
            .create(&profile.username, &profile.email, &profile.name)
        {
            Ok(()) => {
                info!(username = %profile.username, "Created user");
                Ok(true)
            }
            // A concurrent login for the same username got there first
            Err(StorageError::AlreadyExists(_)) => {
                warn!(username = %profile.username, "User was created concurrently");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
