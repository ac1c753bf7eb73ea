// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Leave every server that has not recorded a wallet yet.
//!
//! Uses the same environment as the bot (`ACCESS_TOKEN`, `DATABASE_PATH`).
//! The bot process must be stopped first: the database is opened exclusively.

use std::sync::Arc;

use serenity::http::Http;
use tracing::info;

use whitelist_bot::bot::trim_idle_servers;
use whitelist_bot::config::BotConfig;
use whitelist_bot::platform::discord::DiscordPlatform;
use whitelist_bot::storage::WhitelistDb;
use whitelist_bot::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BotConfig::from_env()?;
    init_tracing(config.log_format);

    let db = WhitelistDb::open(&config.database_path)?;
    let platform = DiscordPlatform::new(Arc::new(Http::new(&config.access_token)));

    info!("Removing idle servers");
    let left = trim_idle_servers(&db, &platform).await?;
    info!(count = left.len(), "Idle server trim complete");

    Ok(())
}
