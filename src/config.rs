// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `OIDC_ISSUER` | Expected `iss` claim | Required |
//! | `OIDC_JWKS_URL` | JWKS endpoint | `<issuer>/.well-known/jwks.json` |
//! | `OIDC_JWKS_CACHE_TTL_SECS` | Expire the cached key set after this many seconds | Never |
//! | `OIDC_TOKEN_ENDPOINT` | OAuth2 token endpoint | Required |
//! | `OIDC_CLIENT_ID` | App client ID, also the expected `aud` | Required |
//! | `OIDC_REDIRECT_URI` | Redirect URI sent with the code exchange | Required |
//! | `OIDC_USERNAME_CLAIM` | Claim holding the username | `cognito:username` |
//! | `HTTP_TIMEOUT_SECS` | Timeout for every outbound HTTP call | `10` |
//! | `USER_DB_PATH` | redb file for user records | Unset (in-memory) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::claims::DEFAULT_USERNAME_CLAIM;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const OIDC_ISSUER_ENV: &str = "OIDC_ISSUER";
pub const OIDC_JWKS_URL_ENV: &str = "OIDC_JWKS_URL";
pub const OIDC_JWKS_CACHE_TTL_ENV: &str = "OIDC_JWKS_CACHE_TTL_SECS";
pub const OIDC_TOKEN_ENDPOINT_ENV: &str = "OIDC_TOKEN_ENDPOINT";
pub const OIDC_CLIENT_ID_ENV: &str = "OIDC_CLIENT_ID";
pub const OIDC_REDIRECT_URI_ENV: &str = "OIDC_REDIRECT_URI";
pub const OIDC_USERNAME_CLAIM_ENV: &str = "OIDC_USERNAME_CLAIM";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const USER_DB_PATH_ENV: &str = "USER_DB_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Identity provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcConfig {
    pub issuer: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Option<Duration>,
    pub token_endpoint: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub username_claim: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub oidc: OidcConfig,
    pub http_timeout: Duration,
    pub user_db_path: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let issuer = validate_url(OIDC_ISSUER_ENV, required(OIDC_ISSUER_ENV)?)?;
        let jwks_url = match get(OIDC_JWKS_URL_ENV) {
            Some(url) => validate_url(OIDC_JWKS_URL_ENV, url)?,
            None => format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/')),
        };
        let token_endpoint =
            validate_url(OIDC_TOKEN_ENDPOINT_ENV, required(OIDC_TOKEN_ENDPOINT_ENV)?)?;
        let redirect_uri = validate_url(OIDC_REDIRECT_URI_ENV, required(OIDC_REDIRECT_URI_ENV)?)?;

        let oidc = OidcConfig {
            issuer,
            jwks_url,
            jwks_cache_ttl: get(OIDC_JWKS_CACHE_TTL_ENV)
                .map(|v| parse_secs(OIDC_JWKS_CACHE_TTL_ENV, &v))
                .transpose()?,
            token_endpoint,
            client_id: required(OIDC_CLIENT_ID_ENV)?,
            redirect_uri,
            username_claim: get(OIDC_USERNAME_CLAIM_ENV)
                .unwrap_or_else(|| DEFAULT_USERNAME_CLAIM.to_string()),
        };

        let port = match get(PORT_ENV) {
            Some(v) => v.parse().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            oidc,
            http_timeout: get(HTTP_TIMEOUT_ENV)
                .map(|v| parse_secs(HTTP_TIMEOUT_ENV, &v))
                .transpose()?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            user_db_path: get(USER_DB_PATH_ENV).map(PathBuf::from),
            log_format,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            })
    }
}

fn validate_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}"),
    })?;
    Ok(value)
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::Invalid {
            name,
            reason: format!("{e}"),
        })
}
