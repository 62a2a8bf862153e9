// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::broadcast::Broadcaster;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(authenticator: Authenticator, broadcaster: Broadcaster) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            broadcaster,
        }
    }
}
