// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local user store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{StorageError, StorageResult, UserRecord, UserStore};

/// [`UserStore`] kept in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Unavailable("user map lock poisoned".to_string())
}

impl UserStore for InMemoryUserStore {
    fn get(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(username).cloned())
    }

    fn put(&self, record: &UserRecord) -> StorageResult<()> {
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(record.username.clone(), record.clone());
        Ok(())
    }
}
