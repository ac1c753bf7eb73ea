// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chat platform boundary.
//!
//! The dispatcher only sees [`IncomingMessage`] values and talks back through
//! the [`ChatPlatform`] trait. The Discord implementation lives in
//! [`discord`]; tests use an in-memory recorder.

use std::future::Future;

use crate::models::{ChannelId, RoleId, ServerId, UserId};

pub mod discord;

#[cfg(test)]
pub(crate) mod mock;

/// Server-scoped facts about the author of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInfo {
    /// Holds the administrator permission on the server.
    pub is_admin: bool,
    pub roles: Vec<RoleId>,
}

/// A chat message, reduced to what the dispatcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub message_id: u64,
    pub channel_id: ChannelId,
    pub server_id: Option<ServerId>,
    pub server_name: Option<String>,
    pub author_id: UserId,
    pub author_is_bot: bool,
    /// `None` when the author is not a member of a server (direct messages).
    pub member: Option<MemberInfo>,
    pub content: String,
}

/// Named field of an embed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// Outbound reply to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        content: String,
        /// Ping the author of the referenced message.
        mention_author: bool,
    },
    Embed {
        title: String,
        description: String,
        fields: Vec<EmbedField>,
    },
    File {
        content: String,
        filename: String,
        bytes: Vec<u8>,
    },
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text {
            content: content.into(),
            mention_author: false,
        }
    }

    pub fn mention(content: impl Into<String>) -> Self {
        Reply::Text {
            content: content.into(),
            mention_author: true,
        }
    }
}

/// Guild summary returned by [`ChatPlatform::list_guilds`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    pub id: ServerId,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Request(String),

    #[error("role `{0}` does not exist on this server")]
    RoleNotFound(String),
}

/// Operations the bot performs against the chat platform.
pub trait ChatPlatform: Send + Sync {
    /// Reply to `message` in its channel.
    fn reply(
        &self,
        message: &IncomingMessage,
        reply: Reply,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Remove `message` from its channel.
    fn delete_message(
        &self,
        message: &IncomingMessage,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Give `user_id` the server role called `role_name`.
    fn grant_role(
        &self,
        server_id: ServerId,
        user_id: UserId,
        role_name: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Every server the bot is currently in.
    fn list_guilds(&self) -> impl Future<Output = Result<Vec<GuildSummary>, PlatformError>> + Send;

    fn leave_guild(&self, server_id: ServerId)
        -> impl Future<Output = Result<(), PlatformError>> + Send;
}
