// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Server lifecycle: config reconciliation and idle-server trimming.

use tracing::{info, warn};

use crate::error::BotResult;
use crate::models::ServerId;
use crate::platform::ChatPlatform;
use crate::state::BotState;
use crate::storage::{Incident, IncidentKind, WhitelistDb};

/// Make sure every visible server has a config row.
///
/// Returns the number of rows inserted.
pub fn reconcile_servers(
    db: &WhitelistDb,
    server_ids: impl IntoIterator<Item = ServerId>,
) -> BotResult<usize> {
    let mut inserted = 0;
    for server_id in server_ids {
        if db.ensure_server(server_id)? {
            info!(server_id, "Added server to database");
            inserted += 1;
        }
    }
    Ok(inserted)
}

/// Handle the bot being added to (or re-seeing) a server.
///
/// Newly inserted servers are also written to the incident log.
pub fn server_joined(state: &BotState, server_id: ServerId, name: &str) -> BotResult<bool> {
    let inserted = state.db.ensure_server(server_id)?;
    if inserted {
        info!(server_id, name, "Joined new server");
        state
            .incidents
            .record(&Incident::new(IncidentKind::GuildJoined).with_server(server_id, name));
    }
    Ok(inserted)
}

/// Leave every server the bot is in that has no wallet records yet.
///
/// Servers without a config row are left alone. Returns the ids left.
pub async fn trim_idle_servers<P: ChatPlatform>(
    db: &WhitelistDb,
    platform: &P,
) -> BotResult<Vec<ServerId>> {
    let idle = db.idle_servers()?;
    let guilds = platform.list_guilds().await?;

    let mut left = Vec::new();
    for guild in guilds.iter().filter(|guild| idle.contains(&guild.id)) {
        match platform.leave_guild(guild.id).await {
            Ok(()) => {
                info!(server_id = guild.id, name = %guild.name, "Left idle server");
                left.push(guild.id);
            }
            Err(e) => {
                warn!(server_id = guild.id, error = %e, "Failed to leave idle server");
            }
        }
    }
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{Action, RecordingPlatform};
    use crate::storage::IncidentLog;
    use tempfile::TempDir;

    fn setup() -> (BotState, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = WhitelistDb::open(&dir.path().join("data.redb")).unwrap();
        let incidents = IncidentLog::new(dir.path().join("log.txt"));
        (BotState::new(db, incidents), dir)
    }

    #[test]
    fn reconcile_inserts_only_missing_servers() {
        let (state, _dir) = setup();
        state.db.ensure_server(2).unwrap();
        state.db.set_whitelist_channel(2, 50).unwrap();

        assert_eq!(reconcile_servers(&state.db, [1, 2, 3]).unwrap(), 2);
        assert_eq!(reconcile_servers(&state.db, [1, 2, 3]).unwrap(), 0);

        assert_eq!(state.db.server_ids().unwrap(), vec![1, 2, 3]);
        assert_eq!(
            state.db.server_config(2).unwrap().unwrap().whitelist_channel,
            Some(50)
        );
    }

    #[test]
    fn server_joined_logs_only_new_servers() {
        let (state, _dir) = setup();

        assert!(server_joined(&state, 9, "New Guild").unwrap());
        assert!(!server_joined(&state, 9, "New Guild").unwrap());

        let incidents = state.incidents.read_all().unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].kind, IncidentKind::GuildJoined);
        assert_eq!(incidents[0].server_id, Some(9));
    }

    #[tokio::test]
    async fn trim_leaves_idle_servers_only() {
        let (state, _dir) = setup();
        reconcile_servers(&state.db, [1, 2, 3]).unwrap();
        state.db.record_wallet(2, 10, "wallet").unwrap();

        // Server 4 has no config row, server 3 is idle but the bot is not in it
        let platform = RecordingPlatform::new().with_guilds(&[(1, "one"), (2, "two"), (4, "four")]);

        let left = trim_idle_servers(&state.db, &platform).await.unwrap();
        assert_eq!(left, vec![1]);
        assert_eq!(platform.actions(), vec![Action::Leave { server_id: 1 }]);
        assert!(state.db.server_config(1).unwrap().is_some());
    }
}
