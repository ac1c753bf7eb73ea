// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::storage::{IncidentLog, WhitelistDb};

/// Shared context handed to the dispatcher and every command handler.
#[derive(Clone)]
pub struct BotState {
    pub db: Arc<WhitelistDb>,
    pub incidents: Arc<IncidentLog>,
}

impl BotState {
    pub fn new(db: WhitelistDb, incidents: IncidentLog) -> Self {
        Self {
            db: Arc::new(db),
            incidents: Arc::new(incidents),
        }
    }
}
