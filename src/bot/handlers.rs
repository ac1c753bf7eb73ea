// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command handlers.
//!
//! Every handler answers through the platform and returns
//! [`CommandOutcome::InvalidArguments`] when the command text is malformed.
//! Permission checks happen in the dispatcher before a handler runs.

use tracing::info;

use super::commands::{
    parse_blockchain, parse_channel_mention, parse_role_mention, AdminCommand, PublicCommand,
};
use crate::error::{BotResult, CommandOutcome};
use crate::models::{tail, ServerConfig, ServerId, WalletRecord};
use crate::platform::{ChatPlatform, EmbedField, IncomingMessage, Reply};
use crate::state::BotState;

/// Header row of the wallet export.
pub const CSV_HEADER: &str = "userId, walletAddress";

const HELP_ADMIN_DESCRIPTION: &str = "Whitelist Manager is a bot designed to assist you in gathering wallet addresses for NFT drops.\n\
After configuring the bot, users who are 'whitelisted' will be able to record their crypto addresses which you can then download as a CSV.\n\
Note, the `config` must be filled out before the bot will work.";

const HELP_ADMIN_COMMANDS: &str = "`>channel #channelName`: Sets the channel to listen for wallet addresses on.\n\
`>role @roleName`: Sets the role a user must possess to be able to add their address to the whitelist.\n\
`>blockchain eth/sol/ada`: Select which blockchain this NFT drop will occur on, this allows for validation of the addresses that are added.\n\
`>config`: View the current server config.\n\
`>data`: Get discordID:walletAddress pairs in a CSV format.\n\
`>clear`: Clear the config and data for this server.\n\
`>help.admin`: This screen.\n\
`>help`: How to use help screen.";

const HELP_DESCRIPTION: &str =
    "Whitelist Manager is a bot designed to assist in gathering wallet addresses for NFT drops.";

const HELP_COMMANDS: &str = "`>check`: will tell you whether or not your wallet has been recorded in the whitelist\n\
`>help`: This screen\n\
`>help.admin`: Provides a help screen to assist in configuring the bot (admin only).\n\n\
How to use: Send your wallet address to the whitelist chat to record it!\n\
The message should contain just the wallet address (no `>`).";

/// Run an admin command. The caller has already checked the permission.
pub async fn run_admin<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
    command: AdminCommand,
) -> BotResult<CommandOutcome> {
    match command {
        AdminCommand::Channel => set_whitelist_channel(state, platform, message, server_id).await,
        AdminCommand::Role => set_whitelist_role(state, platform, message, server_id).await,
        AdminCommand::Blockchain => set_blockchain(state, platform, message, server_id).await,
        AdminCommand::Data => export_data(state, platform, message, server_id).await,
        AdminCommand::Config => show_config(state, platform, message, server_id).await,
        AdminCommand::Clear => clear_data(state, platform, message, server_id).await,
        AdminCommand::HelpAdmin => help_admin(platform, message).await,
    }
}

/// Run a command available to every member.
pub async fn run_public<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
    command: PublicCommand,
) -> BotResult<CommandOutcome> {
    match command {
        PublicCommand::Help => help(platform, message).await,
        PublicCommand::Check => check(state, platform, message, server_id).await,
    }
}

async fn set_whitelist_channel<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let Some(channel) = parse_channel_mention(&message.content) else {
        return Ok(CommandOutcome::InvalidArguments);
    };

    state.db.set_whitelist_channel(server_id, channel)?;
    info!(server_id, channel, "Whitelist channel set");

    platform
        .reply(
            message,
            Reply::mention(format!("Successfully set whitelist channel to <#{channel}>")),
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn set_whitelist_role<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let Some(role) = parse_role_mention(&message.content) else {
        return Ok(CommandOutcome::InvalidArguments);
    };

    state.db.set_whitelist_role(server_id, role)?;
    info!(server_id, role, "Whitelist role set");

    platform
        .reply(
            message,
            Reply::mention(format!("Successfully set whitelist role to <@&{role}>")),
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn set_blockchain<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let Some(blockchain) = parse_blockchain(&message.content) else {
        return Ok(CommandOutcome::InvalidArguments);
    };

    state.db.set_blockchain(server_id, blockchain)?;
    info!(server_id, %blockchain, "Blockchain set");

    platform
        .reply(
            message,
            Reply::mention(format!("Successfully set blockchain to `{blockchain}`")),
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn export_data<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let records = state.db.wallets_for_server(server_id)?;
    info!(server_id, records = records.len(), "Exporting wallet data");

    platform
        .reply(
            message,
            Reply::File {
                content: "Data for server is attached.".to_string(),
                filename: format!("{server_id}.csv"),
                bytes: wallets_csv(&records).into_bytes(),
            },
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn show_config<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let Some(config) = state.db.server_config(server_id)? else {
        return Ok(CommandOutcome::Completed);
    };

    let server_name = message
        .server_name
        .clone()
        .unwrap_or_else(|| server_id.to_string());

    platform
        .reply(
            message,
            Reply::Embed {
                title: format!("Config for {server_name}"),
                description: describe_config(&config),
                fields: Vec::new(),
            },
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn clear_data<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let removed = state.db.clear_server(server_id)?;
    info!(server_id, removed, "Server data cleared");

    platform
        .reply(message, Reply::text("Server's data has been cleared."))
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn help_admin<P: ChatPlatform>(
    platform: &P,
    message: &IncomingMessage,
) -> BotResult<CommandOutcome> {
    platform
        .reply(
            message,
            Reply::Embed {
                title: "Whitelist Manager Help (Admin)".to_string(),
                description: HELP_ADMIN_DESCRIPTION.to_string(),
                fields: vec![EmbedField {
                    name: "COMMANDS".to_string(),
                    value: HELP_ADMIN_COMMANDS.to_string(),
                }],
            },
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn help<P: ChatPlatform>(
    platform: &P,
    message: &IncomingMessage,
) -> BotResult<CommandOutcome> {
    platform
        .reply(
            message,
            Reply::Embed {
                title: "Whitelist Manager Help".to_string(),
                description: HELP_DESCRIPTION.to_string(),
                fields: vec![EmbedField {
                    name: "COMMANDS".to_string(),
                    value: HELP_COMMANDS.to_string(),
                }],
            },
        )
        .await?;
    Ok(CommandOutcome::Completed)
}

async fn check<P: ChatPlatform>(
    state: &BotState,
    platform: &P,
    message: &IncomingMessage,
    server_id: ServerId,
) -> BotResult<CommandOutcome> {
    let text = match state.db.wallet_for(server_id, message.author_id)? {
        Some(wallet) => format!(
            "You are whitelisted! The last 3 digits of your wallet are: `{}`",
            tail(&wallet, 3)
        ),
        None => {
            "Your wallet is not yet on the whitelist. Use `>help` for more info!".to_string()
        }
    };

    platform.reply(message, Reply::text(text)).await?;
    Ok(CommandOutcome::Completed)
}

/// Render wallet records as the two-column export file.
pub fn wallets_csv(records: &[WalletRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for record in records {
        csv.push_str(&format!("{},{}\n", record.user_id, record.wallet));
    }
    csv
}

/// Body of the `>config` embed.
pub fn describe_config(config: &ServerConfig) -> String {
    let channel = config
        .whitelist_channel
        .map(|id| format!("<#{id}>"))
        .unwrap_or_else(|| "None".to_string());
    let role = config
        .whitelist_role
        .map(|id| format!("<@&{id}>"))
        .unwrap_or_else(|| "None".to_string());
    let blockchain = config
        .blockchain
        .map(|chain| chain.to_string())
        .unwrap_or_else(|| "None".to_string());

    format!("Whitelist Channel: {channel}\nWhitelist Role: {role}\nBlockchain: {blockchain}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Blockchain;

    #[test]
    fn csv_has_header_and_one_row_per_record() {
        let records = vec![
            WalletRecord {
                server_id: 1,
                user_id: 10,
                wallet: "0xabc".to_string(),
            },
            WalletRecord {
                server_id: 1,
                user_id: 11,
                wallet: "0xdef".to_string(),
            },
        ];
        assert_eq!(
            wallets_csv(&records),
            "userId, walletAddress\n10,0xabc\n11,0xdef\n"
        );
        assert_eq!(wallets_csv(&[]), "userId, walletAddress\n");
    }

    #[test]
    fn describe_config_shows_none_for_unset_fields() {
        let unset = ServerConfig::unconfigured(1);
        assert_eq!(
            describe_config(&unset),
            "Whitelist Channel: None\nWhitelist Role: None\nBlockchain: None"
        );

        let set = ServerConfig {
            id: 1,
            whitelist_channel: Some(5),
            whitelist_role: Some(6),
            blockchain: Some(Blockchain::Sol),
        };
        assert_eq!(
            describe_config(&set),
            "Whitelist Channel: <#5>\nWhitelist Role: <@&6>\nBlockchain: sol"
        );
    }
}
