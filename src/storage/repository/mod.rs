// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the user store.

pub mod users;

pub use users::{UserRecord, UserRepository};
