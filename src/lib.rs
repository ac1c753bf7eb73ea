// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Whitelist Bot - Discord wallet whitelist manager
//!
//! Server administrators configure a whitelist channel, a whitelist role and
//! a blockchain. Members holding the role post their wallet address in the
//! channel; the bot validates it for the configured chain, records it and
//! removes the message.
//!
//! ## Modules
//!
//! - `blockchain` - Chain codes and offline address validation
//! - `bot` - Command parsing, handlers and message dispatch
//! - `platform` - Chat platform boundary and the Discord adapter
//! - `storage` - Embedded redb database and incident log

pub mod blockchain;
pub mod bot;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod state;
pub mod storage;
pub mod telemetry;
