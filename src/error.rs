// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::platform::PlatformError;
use crate::storage::StoreError;

/// Failure while handling a chat event.
///
/// These never reach the user: the dispatcher records them in the incident
/// log and stops processing the message.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result of running a command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    /// The command text did not have the expected shape; the dispatcher
    /// answers with a generic notice.
    InvalidArguments,
}

pub type BotResult<T> = Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_store_and_platform_errors() {
        let store: BotError = StoreError::UnknownServer(4).into();
        assert_eq!(store.to_string(), "store error: server 4 has no config row");

        let platform: BotError = PlatformError::RoleNotFound("Wallet Verified".into()).into();
        assert_eq!(
            platform.to_string(),
            "platform error: role `Wallet Verified` does not exist on this server"
        );
    }
}
