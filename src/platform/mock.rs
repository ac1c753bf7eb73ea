// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Recording [`ChatPlatform`] for tests.

use std::sync::Mutex;

use super::{ChatPlatform, GuildSummary, IncomingMessage, PlatformError, Reply};
use crate::models::{ServerId, UserId};

/// A side effect the bot asked the platform to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Reply { message_id: u64, reply: Reply },
    Delete { message_id: u64 },
    GrantRole { server_id: ServerId, user_id: UserId, role: String },
    Leave { server_id: ServerId },
}

#[derive(Default)]
pub struct RecordingPlatform {
    actions: Mutex<Vec<Action>>,
    guilds: Vec<GuildSummary>,
    fail_role_grant: bool,
    fail_delete: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guilds(mut self, guilds: &[(ServerId, &str)]) -> Self {
        self.guilds = guilds
            .iter()
            .map(|(id, name)| GuildSummary {
                id: *id,
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn failing_role_grant(mut self) -> Self {
        self.fail_role_grant = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    /// Replies only, in order.
    pub fn replies(&self) -> Vec<Reply> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Reply { reply, .. } => Some(reply),
                _ => None,
            })
            .collect()
    }

    /// Text of every text reply, in order.
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter_map(|reply| match reply {
                Reply::Text { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    fn push(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

impl ChatPlatform for RecordingPlatform {
    async fn reply(&self, message: &IncomingMessage, reply: Reply) -> Result<(), PlatformError> {
        self.push(Action::Reply {
            message_id: message.message_id,
            reply,
        });
        Ok(())
    }

    async fn delete_message(&self, message: &IncomingMessage) -> Result<(), PlatformError> {
        if self.fail_delete {
            return Err(PlatformError::Request("missing permissions".to_string()));
        }
        self.push(Action::Delete {
            message_id: message.message_id,
        });
        Ok(())
    }

    async fn grant_role(
        &self,
        server_id: ServerId,
        user_id: UserId,
        role_name: &str,
    ) -> Result<(), PlatformError> {
        if self.fail_role_grant {
            return Err(PlatformError::RoleNotFound(role_name.to_string()));
        }
        self.push(Action::GrantRole {
            server_id,
            user_id,
            role: role_name.to_string(),
        });
        Ok(())
    }

    async fn list_guilds(&self) -> Result<Vec<GuildSummary>, PlatformError> {
        Ok(self.guilds.clone())
    }

    async fn leave_guild(&self, server_id: ServerId) -> Result<(), PlatformError> {
        self.push(Action::Leave { server_id });
        Ok(())
    }
}
