// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! `exists` and `create` are separate calls: the login flow checks first and
//! only creates when the user is absent. The pair is not atomic, so two
//! concurrent first logins for one username may both write. Records are
//! derived from identity claims, so both writes carry the same data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{StorageResult, UserStore};

/// A provisioned user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRecord {
    /// Username from the identity token (store key)
    pub username: String,
    pub email: String,
    /// Display name
    pub name: String,
}

/// Repository for user records.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    /// Create a new UserRepository.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Check if a user exists.
    pub fn exists(&self, username: &str) -> StorageResult<bool> {
        Ok(self.store.get(username)?.is_some())
    }

    /// Store a new user. Does not check for an existing record.
    pub fn create(&self, username: &str, email: &str, name: &str) -> StorageResult<()> {
        self.store.put(&UserRecord {
            username: username.to_string(),
            email: email.to_string(),
            name: name.to_string(),
        })
    }

    /// Get a user by username.
    pub fn get(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        self.store.get(username)
    }
}
