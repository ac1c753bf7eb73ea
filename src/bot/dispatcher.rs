// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Message Dispatcher
//!
//! Routes every inbound chat message. The route is recomputed per message:
//!
//! 1. **Ignore** messages from bots and from non-members (direct messages).
//! 2. **Admin dispatch**: an administrator's prefixed message runs the matching
//!    admin or public command. Unknown keywords fall through to step 3.
//! 3. **Whitelist gate**: only messages in the configured whitelist channel,
//!    from a member holding the configured role, go further.
//! 4. **In-channel commands**: prefixed messages resolve against the public
//!    commands only; anything else gets the list of valid commands.
//! 5. **Submission**: any other message is a wallet address candidate for the
//!    server's configured blockchain.
//!
//! Errors escaping a step are written to the incident log; the user gets no
//! reply for them.

use tracing::{debug, error, info, warn};

use super::commands::{command_keyword, Command, PublicCommand};
use super::handlers::{run_admin, run_public};
use crate::blockchain;
use crate::error::{BotResult, CommandOutcome};
use crate::models::{tail, ServerId};
use crate::platform::{ChatPlatform, IncomingMessage, MemberInfo, Reply};
use crate::state::BotState;
use crate::storage::{Incident, IncidentKind};

/// Role granted to members whose wallet was recorded.
pub const VERIFIED_ROLE_NAME: &str = "Wallet Verified";

/// Reply sent when a command's arguments are malformed.
pub const INVALID_ARGUMENT_NOTICE: &str = "Invalid command argument.";

/// Handle one inbound message.
///
/// Never fails: unclassified errors are logged with the raw message.
pub async fn handle_message<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
) {
    if let Err(e) = route(state, platform, message).await {
        error!(
            message_id = message.message_id,
            channel_id = message.channel_id,
            author_id = message.author_id,
            error = %e,
            "Unhandled error while processing message"
        );
        state.incidents.record(
            &Incident::new(IncidentKind::UnhandledError)
                .with_message(
                    message.server_id,
                    message.channel_id,
                    message.author_id,
                    message.content.clone(),
                )
                .with_error(&e),
        );
    }
}

async fn route<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
) -> BotResult<()> {
    if message.author_is_bot {
        return Ok(());
    }
    let (Some(server_id), Some(member)) = (message.server_id, message.member.as_ref()) else {
        return Ok(());
    };

    if member.is_admin {
        if let Some(command) = command_keyword(&message.content).and_then(Command::from_keyword) {
            debug!(server_id, ?command, "Admin command");
            let outcome = match command {
                Command::Admin(admin) => {
                    run_admin(state, platform, message, server_id, admin).await?
                }
                Command::Public(public) => {
                    run_public(state, platform, message, server_id, public).await?
                }
            };
            return answer_invalid_arguments(platform, message, outcome).await;
        }
    }

    whitelist_channel(state, platform, message, server_id, member).await
}

async fn whitelist_channel<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
    member: &MemberInfo,
) -> BotResult<()> {
    let Some(config) = state.db.server_config(server_id)? else {
        return Ok(());
    };
    if !config.admits(message.channel_id, &member.roles) {
        return Ok(());
    }

    if let Some(keyword) = command_keyword(&message.content) {
        return match PublicCommand::from_keyword(keyword) {
            Some(command) => {
                let outcome = run_public(state, platform, message, server_id, command).await?;
                answer_invalid_arguments(platform, message, outcome).await
            }
            None => {
                platform
                    .reply(message, Reply::text(valid_commands_notice()))
                    .await?;
                Ok(())
            }
        };
    }

    let Some(chain) = config.blockchain else {
        debug!(server_id, "Submission ignored: no blockchain configured");
        return Ok(());
    };

    let address = message.content.trim();
    let ending = tail(address, 3);
    if blockchain::validate(chain, address) {
        state
            .db
            .record_wallet(server_id, message.author_id, address)?;
        info!(
            server_id,
            user_id = message.author_id,
            %chain,
            "Wallet recorded"
        );

        if let Err(e) = platform
            .grant_role(server_id, message.author_id, VERIFIED_ROLE_NAME)
            .await
        {
            warn!(
                server_id,
                user_id = message.author_id,
                error = %e,
                "Failed to grant verified role"
            );
        }

        platform
            .reply(
                message,
                Reply::mention(format!(
                    "<@{}> your wallet ending in `{ending}` has been validated and recorded.",
                    message.author_id
                )),
            )
            .await?;
    } else {
        debug!(server_id, user_id = message.author_id, %chain, "Invalid wallet submitted");
        platform
            .reply(
                message,
                Reply::text(format!("The address ending in `{ending}` is invalid.")),
            )
            .await?;
    }

    platform.delete_message(message).await?;
    Ok(())
}

async fn answer_invalid_arguments<P: ChatPlatform>(
    platform: &P,
    message: &IncomingMessage,
    outcome: CommandOutcome,
) -> BotResult<()> {
    if outcome == CommandOutcome::InvalidArguments {
        platform
            .reply(message, Reply::mention(INVALID_ARGUMENT_NOTICE))
            .await?;
    }
    Ok(())
}

/// Reply listing the public commands, e.g. "Valid commands are: `help`, `check`, ...".
pub fn valid_commands_notice() -> String {
    let commands = PublicCommand::ALL
        .iter()
        .map(|command| format!("`{}`", command.keyword()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Valid commands are: {commands}, use `>help` for more info.")
}
