// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bot behaviour, independent of the chat platform.
//!
//! - `commands` - prefix command keywords and argument parsing
//! - `handlers` - admin and public command handlers
//! - `dispatcher` - per-message routing and wallet submissions
//! - `lifecycle` - server reconciliation and idle-server trimming

pub mod commands;
pub mod dispatcher;
pub mod handlers;
pub mod lifecycle;

pub use dispatcher::handle_message;
pub use lifecycle::{reconcile_servers, server_joined, trim_idle_servers};
