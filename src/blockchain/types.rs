// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use serde::{Deserialize, Serialize};

/// Blockchains a server can collect wallet addresses for.
///
/// The short code (`eth`, `sol`, `ada`) is what administrators type after
/// `>blockchain` and what is persisted in the server config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blockchain {
    /// Ethereum and other EVM chains
    Eth,
    /// Solana
    Sol,
    /// Cardano
    Ada,
}

/// Every supported chain, in the order shown to administrators.
pub const SUPPORTED_CHAINS: [Blockchain; 3] = [Blockchain::Eth, Blockchain::Sol, Blockchain::Ada];

impl Blockchain {
    /// Parse a chain code. Codes are matched exactly (lowercase).
    pub fn from_code(code: &str) -> Option<Blockchain> {
        SUPPORTED_CHAINS
            .into_iter()
            .find(|chain| chain.code() == code)
    }

    /// The persisted short code.
    pub fn code(&self) -> &'static str {
        match self {
            Blockchain::Eth => "eth",
            Blockchain::Sol => "sol",
            Blockchain::Ada => "ada",
        }
    }
}

impl std::fmt::Display for Blockchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
