// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Discord adapter built on serenity.
//!
//! [`DiscordPlatform`] implements [`ChatPlatform`] over the REST API, and
//! [`Handler`] turns gateway events into dispatcher calls.

use std::sync::Arc;

use serenity::all::{
    ChannelId, Client, Context, CreateAllowedMentions, CreateAttachment, CreateEmbed,
    CreateMessage, EventHandler, GatewayIntents, Guild, GuildId, Http, Message, MessageId,
    Permissions, Ready, RoleId, UserId,
};
use serenity::async_trait;
use tracing::{error, info, warn};

use super::{ChatPlatform, GuildSummary, IncomingMessage, MemberInfo, PlatformError, Reply};
use crate::bot::{handle_message, reconcile_servers, server_joined};
use crate::models::ServerId;
use crate::state::BotState;
use crate::storage::{Incident, IncidentKind};

/// Gateway intents the bot needs: guild events and message content.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

impl From<serenity::Error> for PlatformError {
    fn from(e: serenity::Error) -> Self {
        PlatformError::Request(e.to_string())
    }
}

/// REST-backed [`ChatPlatform`].
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl ChatPlatform for DiscordPlatform {
    async fn reply(&self, message: &IncomingMessage, reply: Reply) -> Result<(), PlatformError> {
        let channel = ChannelId::new(message.channel_id);
        let reference = (channel, MessageId::new(message.message_id));

        let builder = match reply {
            Reply::Text {
                content,
                mention_author,
            } => CreateMessage::new()
                .content(content)
                .allowed_mentions(
                    CreateAllowedMentions::new()
                        .all_users(true)
                        .replied_user(mention_author),
                ),
            Reply::Embed {
                title,
                description,
                fields,
            } => {
                let embed = fields.into_iter().fold(
                    CreateEmbed::new().title(title).description(description),
                    |embed, field| embed.field(field.name, field.value, false),
                );
                CreateMessage::new().embed(embed)
            }
            Reply::File {
                content,
                filename,
                bytes,
            } => CreateMessage::new()
                .content(content)
                .add_file(CreateAttachment::bytes(bytes, filename)),
        };

        channel
            .send_message(&self.http, builder.reference_message(reference))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message: &IncomingMessage) -> Result<(), PlatformError> {
        ChannelId::new(message.channel_id)
            .delete_message(&self.http, MessageId::new(message.message_id))
            .await?;
        Ok(())
    }

    async fn grant_role(
        &self,
        server_id: ServerId,
        user_id: u64,
        role_name: &str,
    ) -> Result<(), PlatformError> {
        let guild = GuildId::new(server_id);
        let roles = guild.roles(&self.http).await?;
        let role_id = roles
            .values()
            .find(|role| role.name == role_name)
            .map(|role| role.id)
            .ok_or_else(|| PlatformError::RoleNotFound(role_name.to_string()))?;

        self.http
            .add_member_role(guild, UserId::new(user_id), role_id, Some("Wallet recorded"))
            .await?;
        Ok(())
    }

    /// First page of guilds (up to 200).
    async fn list_guilds(&self) -> Result<Vec<GuildSummary>, PlatformError> {
        let guilds = self.http.get_guilds(None, None).await?;
        Ok(guilds
            .into_iter()
            .map(|guild| GuildSummary {
                id: guild.id.get(),
                name: guild.name,
            })
            .collect())
    }

    async fn leave_guild(&self, server_id: ServerId) -> Result<(), PlatformError> {
        self.http.leave_guild(GuildId::new(server_id)).await?;
        Ok(())
    }
}

/// Fetch the guild's roles and check them with [`grants_administrator`].
async fn has_admin_role(
    ctx: &Context,
    guild_id: GuildId,
    member_roles: &[RoleId],
) -> Result<bool, serenity::Error> {
    let roles = guild_id.roles(ctx).await?;
    Ok(grants_administrator(
        roles.values().map(|role| (role.id, role.permissions)),
        guild_id,
        member_roles,
    ))
}

/// Whether the @everyone role (which shares the guild's id) or any of
/// `member_roles` carries the administrator permission.
fn grants_administrator(
    roles: impl IntoIterator<Item = (RoleId, Permissions)>,
    guild_id: GuildId,
    member_roles: &[RoleId],
) -> bool {
    let everyone = RoleId::new(guild_id.get());
    roles.into_iter().any(|(id, permissions)| {
        (id == everyone || member_roles.contains(&id)) && permissions.administrator()
    })
}

/// Convert a gateway message into the dispatcher's view of it.
async fn incoming_message(ctx: &Context, msg: &Message) -> Result<IncomingMessage, serenity::Error> {
    let member = match msg.guild_id {
        Some(guild_id) if !msg.author.bot => {
            let member = guild_id.member(ctx, msg.author.id).await?;
            let cached = ctx
                .cache
                .guild(guild_id)
                .map(|guild| guild.member_permissions(&member).administrator());
            let is_admin = match cached {
                Some(is_admin) => is_admin,
                None => {
                    warn!(
                        server_id = %guild_id,
                        "Guild not cached, resolving permissions from roles"
                    );
                    has_admin_role(ctx, guild_id, &member.roles).await?
                }
            };
            Some(MemberInfo {
                is_admin,
                roles: member.roles.iter().map(|role| role.get()).collect(),
            })
        }
        _ => None,
    };

    let server_name = msg
        .guild_id
        .and_then(|guild_id| ctx.cache.guild(guild_id).map(|guild| guild.name.clone()));

    Ok(IncomingMessage {
        message_id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        server_id: msg.guild_id.map(|id| id.get()),
        server_name,
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        member,
        content: msg.content.clone(),
    })
}

/// Gateway event handler.
pub struct Handler {
    state: BotState,
}

impl Handler {
    pub fn new(state: BotState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            user_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Logged in, reconciling servers"
        );

        let server_ids = ready.guilds.iter().map(|guild| guild.id.get());
        match reconcile_servers(&self.state.db, server_ids) {
            Ok(inserted) => info!(inserted, "Server reconciliation complete"),
            Err(e) => error!(error = %e, "Server reconciliation failed"),
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        if let Err(e) = server_joined(&self.state, guild.id.get(), &guild.name) {
            error!(server_id = %guild.id, error = %e, "Failed to register server");
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        match incoming_message(&ctx, &msg).await {
            Ok(incoming) => {
                let platform = DiscordPlatform::new(ctx.http.clone());
                handle_message(&self.state, &platform, &incoming).await;
            }
            Err(e) => {
                warn!(message_id = %msg.id, error = %e, "Failed to resolve message author");
                self.state.incidents.record(
                    &Incident::new(IncidentKind::UnhandledError)
                        .with_message(
                            msg.guild_id.map(|id| id.get()),
                            msg.channel_id.get(),
                            msg.author.id.get(),
                            msg.content.clone(),
                        )
                        .with_error(&e),
                );
            }
        }
    }
}

/// Connect to the gateway and process events until Ctrl-C.
pub async fn run(token: &str, state: BotState) -> Result<(), serenity::Error> {
    let mut client = Client::builder(token, intents())
        .event_handler(Handler::new(state))
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, closing gateway connections");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    client.start().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_comes_from_held_role_or_everyone() {
        let guild = GuildId::new(1);
        let roles = [
            (RoleId::new(1), Permissions::SEND_MESSAGES),
            (RoleId::new(20), Permissions::ADMINISTRATOR),
            (RoleId::new(30), Permissions::MANAGE_MESSAGES),
        ];

        assert!(grants_administrator(roles, guild, &[RoleId::new(20)]));
        assert!(!grants_administrator(roles, guild, &[RoleId::new(30)]));
        assert!(!grants_administrator(roles, guild, &[]));

        let open_guild = [(RoleId::new(1), Permissions::ADMINISTRATOR)];
        assert!(grants_administrator(open_guild, guild, &[]));
    }
}
