// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # User Storage
//!
//! Users are persisted by username through the [`UserStore`] trait, which is
//! a plain keyed get/put. Two backends exist:
//!
//! - [`UserDatabase`]: embedded redb file, used when `USER_DB_PATH` is set
//! - [`InMemoryUserStore`]: process-local map, used otherwise and in tests
//!
//! ## Record Layout
//!
//! ```text
//! users: username -> {"username": ..., "email": ..., "name": ...}
//! ```
//!
//! Typed access goes through [`UserRepository`], which keeps the
//! exists-then-create sequence used by the login flow.

pub mod memory;
pub mod repository;
pub mod user_db;

pub use memory::InMemoryUserStore;
pub use repository::{UserRecord, UserRepository};
pub use user_db::UserDatabase;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A backend refused a write because the key is taken.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The backend cannot serve requests (poisoned lock, closed handle, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Keyed user persistence.
///
/// Implementations must be safe to call from concurrent requests. `put`
/// overwrites whatever is stored under the record's username.
pub trait UserStore: Send + Sync {
    /// Point lookup by username.
    fn get(&self, username: &str) -> StorageResult<Option<UserRecord>>;

    /// Store `record` under its username.
    fn put(&self, record: &UserRecord) -> StorageResult<()>;
}
