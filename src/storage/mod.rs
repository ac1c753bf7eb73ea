// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state of the bot:
//!
//! - [`WhitelistDb`]: redb database holding server configs and wallet records
//! - [`IncidentLog`]: append-only file of unhandled errors and join events
//!
//! ## Storage Layout
//!
//! ```text
//! data.redb     # server_configs, wallets, meta tables
//! log.txt       # incidents, one JSON object per line
//! ```

pub mod incidents;
pub mod whitelist_db;

pub use incidents::{Incident, IncidentKind, IncidentLog, IncidentLogError};
pub use whitelist_db::{migrate_from_json, MigrationReport, StoreError, StoreResult, WhitelistDb};
