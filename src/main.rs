// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use tracing::info;

use whitelist_bot::config::BotConfig;
use whitelist_bot::platform::discord;
use whitelist_bot::state::BotState;
use whitelist_bot::storage::{migrate_from_json, IncidentLog, WhitelistDb};
use whitelist_bot::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BotConfig::from_env()?;
    init_tracing(config.log_format);

    info!(path = %config.database_path.display(), "Opening whitelist database");
    let db = WhitelistDb::open(&config.database_path)?;

    if let Some(legacy) = &config.legacy_data_file {
        migrate_from_json(&db, legacy)?;
    }

    let incidents = IncidentLog::new(&config.incident_log_path);
    info!(path = %incidents.path().display(), "Recording incidents");
    let state = BotState::new(db, incidents);

    info!("Connecting to Discord");
    discord::run(&config.access_token, state).await?;

    info!("Whitelist bot stopped");
    Ok(())
}
