// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prefix command parsing.
//!
//! A command is a message starting with `>` immediately followed by its
//! keyword; the keyword is the first whitespace-delimited token without the
//! prefix.

use crate::blockchain::Blockchain;
use crate::models::{ChannelId, RoleId};

/// Character that marks a message as a bot command.
pub const COMMAND_PREFIX: char = '>';

/// Commands restricted to server administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// `>channel #channel`
    Channel,
    /// `>role @role`
    Role,
    /// `>blockchain eth|sol|ada`
    Blockchain,
    /// `>data`: CSV export of recorded wallets
    Data,
    /// `>config`
    Config,
    /// `>clear`
    Clear,
    /// `>help.admin`
    HelpAdmin,
}

impl AdminCommand {
    pub const ALL: [AdminCommand; 7] = [
        AdminCommand::Channel,
        AdminCommand::Role,
        AdminCommand::Blockchain,
        AdminCommand::Data,
        AdminCommand::Config,
        AdminCommand::Clear,
        AdminCommand::HelpAdmin,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            AdminCommand::Channel => "channel",
            AdminCommand::Role => "role",
            AdminCommand::Blockchain => "blockchain",
            AdminCommand::Data => "data",
            AdminCommand::Config => "config",
            AdminCommand::Clear => "clear",
            AdminCommand::HelpAdmin => "help.admin",
        }
    }
}

/// Commands any member may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicCommand {
    Help,
    Check,
}

impl PublicCommand {
    pub const ALL: [PublicCommand; 2] = [PublicCommand::Help, PublicCommand::Check];

    pub fn keyword(&self) -> &'static str {
        match self {
            PublicCommand::Help => "help",
            PublicCommand::Check => "check",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<PublicCommand> {
        PublicCommand::ALL
            .into_iter()
            .find(|command| command.keyword() == keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Admin(AdminCommand),
    Public(PublicCommand),
}

impl Command {
    /// Resolve a keyword against both command sets.
    pub fn from_keyword(keyword: &str) -> Option<Command> {
        if let Some(admin) = AdminCommand::ALL
            .into_iter()
            .find(|command| command.keyword() == keyword)
        {
            return Some(Command::Admin(admin));
        }
        PublicCommand::from_keyword(keyword).map(Command::Public)
    }
}

/// The command keyword of `content`, or `None` if it is not a command.
pub fn command_keyword(content: &str) -> Option<&str> {
    if !content.starts_with(COMMAND_PREFIX) {
        return None;
    }
    content
        .split_whitespace()
        .next()
        .and_then(|token| token.strip_prefix(COMMAND_PREFIX))
}

/// Channel id of a message shaped exactly `>channel <#id>`.
pub fn parse_channel_mention(content: &str) -> Option<ChannelId> {
    single_mention(content, AdminCommand::Channel.keyword(), "<#")
}

/// Role id of a message shaped exactly `>role <@&id>`.
pub fn parse_role_mention(content: &str) -> Option<RoleId> {
    single_mention(content, AdminCommand::Role.keyword(), "<@&")
}

/// Chain of a message shaped `>blockchain <code>` with a supported code.
pub fn parse_blockchain(content: &str) -> Option<Blockchain> {
    let mut tokens = content.split_whitespace();
    let _command = tokens.next()?;
    let code = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    Blockchain::from_code(code)
}

fn single_mention(content: &str, keyword: &str, open: &str) -> Option<u64> {
    let digits = content
        .strip_prefix(COMMAND_PREFIX)?
        .strip_prefix(keyword)?
        .strip_prefix(' ')?
        .strip_prefix(open)?
        .strip_suffix('>')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_first_token_without_prefix() {
        assert_eq!(command_keyword(">channel <#1>"), Some("channel"));
        assert_eq!(command_keyword(">help"), Some("help"));
        assert_eq!(command_keyword(">help.admin extra"), Some("help.admin"));
        assert_eq!(command_keyword(">"), Some(""));
        assert_eq!(command_keyword("> help"), Some(""));
    }

    #[test]
    fn keyword_requires_leading_prefix() {
        assert_eq!(command_keyword(" >help"), None);
        assert_eq!(command_keyword("help"), None);
        assert_eq!(command_keyword(""), None);
    }

    #[test]
    fn command_sets_are_disjoint_and_complete() {
        for admin in AdminCommand::ALL {
            assert_eq!(Command::from_keyword(admin.keyword()), Some(Command::Admin(admin)));
            assert_eq!(PublicCommand::from_keyword(admin.keyword()), None);
        }
        for public in PublicCommand::ALL {
            assert_eq!(
                Command::from_keyword(public.keyword()),
                Some(Command::Public(public))
            );
        }
        assert_eq!(Command::from_keyword("unknown"), None);
        assert_eq!(Command::from_keyword(""), None);
    }

    #[test]
    fn channel_mention_requires_exact_shape() {
        assert_eq!(parse_channel_mention(">channel <#123456>"), Some(123456));
        assert_eq!(parse_channel_mention(">channel <#123> <#456>"), None);
        assert_eq!(parse_channel_mention(">channel"), None);
        assert_eq!(parse_channel_mention(">channel <#>"), None);
        assert_eq!(parse_channel_mention(">channel <#12a>"), None);
        assert_eq!(parse_channel_mention(">channel  <#123>"), None);
        assert_eq!(parse_channel_mention(">channel <@&123>"), None);
    }

    #[test]
    fn role_mention_requires_exact_shape() {
        assert_eq!(parse_role_mention(">role <@&987>"), Some(987));
        assert_eq!(parse_role_mention(">role <@987>"), None);
        assert_eq!(parse_role_mention(">role <@&987> please"), None);
        assert_eq!(parse_role_mention(">roles <@&987>"), None);
    }

    #[test]
    fn blockchain_argument_must_be_supported_code() {
        assert_eq!(parse_blockchain(">blockchain eth"), Some(Blockchain::Eth));
        assert_eq!(parse_blockchain(">blockchain sol"), Some(Blockchain::Sol));
        assert_eq!(parse_blockchain(">blockchain ada"), Some(Blockchain::Ada));
        assert_eq!(parse_blockchain(">blockchain btc"), None);
        assert_eq!(parse_blockchain(">blockchain"), None);
        assert_eq!(parse_blockchain(">blockchain eth sol"), None);
    }
}
