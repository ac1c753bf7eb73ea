// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Models
//!
//! Persistent records kept by the bot. Identifiers are the raw 64-bit
//! snowflakes assigned by the chat platform.
//!
//! - [`ServerConfig`]: one per server, created on join / startup reconciliation
//! - [`WalletRecord`]: at most one per (server, user) pair

use serde::{Deserialize, Serialize};

use crate::blockchain::Blockchain;

/// Platform-assigned server (guild) id.
pub type ServerId = u64;
/// Platform-assigned user id.
pub type UserId = u64;
/// Platform-assigned channel id.
pub type ChannelId = u64;
/// Platform-assigned role id.
pub type RoleId = u64;

/// Whitelist configuration of a single server.
///
/// Every field except `id` starts unset and is filled in by admin commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: ServerId,
    pub whitelist_channel: Option<ChannelId>,
    pub whitelist_role: Option<RoleId>,
    pub blockchain: Option<Blockchain>,
}

impl ServerConfig {
    /// A config row with nothing configured yet.
    pub fn unconfigured(id: ServerId) -> Self {
        Self {
            id,
            whitelist_channel: None,
            whitelist_role: None,
            blockchain: None,
        }
    }

    /// Whether a message posted in `channel` by a member holding `roles`
    /// belongs to this server's whitelist channel.
    ///
    /// Both the channel and the role must be configured.
    pub fn admits(&self, channel: ChannelId, roles: &[RoleId]) -> bool {
        match (self.whitelist_channel, self.whitelist_role) {
            (Some(expected_channel), Some(role)) => {
                expected_channel == channel && roles.contains(&role)
            }
            _ => false,
        }
    }
}

/// A validated wallet address submitted by a server member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub server_id: ServerId,
    pub user_id: UserId,
    pub wallet: String,
}

/// Last `n` characters of `value`, used to confirm an address without
/// echoing it in full.
pub fn tail(value: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let start = value
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &value[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_has_no_fields_set() {
        let config = ServerConfig::unconfigured(42);
        assert_eq!(config.id, 42);
        assert!(config.whitelist_channel.is_none());
        assert!(config.whitelist_role.is_none());
        assert!(config.blockchain.is_none());
    }

    #[test]
    fn admits_requires_channel_and_role() {
        let mut config = ServerConfig::unconfigured(1);
        assert!(!config.admits(10, &[20]));

        config.whitelist_channel = Some(10);
        assert!(!config.admits(10, &[20]));

        config.whitelist_role = Some(20);
        assert!(config.admits(10, &[5, 20]));
        assert!(!config.admits(11, &[20]));
        assert!(!config.admits(10, &[21]));
        assert!(!config.admits(10, &[]));
    }

    #[test]
    fn tail_returns_last_characters() {
        assert_eq!(tail("0xabcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
        assert_eq!(tail("", 3), "");
        assert_eq!(tail("abc", 0), "");
        assert_eq!(tail("añbç", 2), "bç");
    }

    #[test]
    fn server_config_roundtrips_through_json() {
        let config = ServerConfig {
            id: 7,
            whitelist_channel: Some(8),
            whitelist_role: None,
            blockchain: Some(Blockchain::Eth),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"blockchain\":\"eth\""));
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
