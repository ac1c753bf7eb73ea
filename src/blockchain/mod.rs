// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain support for whitelist submissions.
//!
//! This module provides:
//! - The supported chain codes (`eth`, `sol`, `ada`)
//! - Offline wallet address validation per chain

pub mod address;
pub mod types;

pub use address::validate;
pub use types::*;
