// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded whitelist database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `server_configs`: server_id → serialized ServerConfig
//! - `wallets`: composite key (server_id, user_id) → wallet address
//! - `meta`: key → value (migration marker)
//!
//! The wallet key is server-first so all records of one server form a single
//! contiguous range.
//!
//! ## Referential Policy
//!
//! Wallet records cascade with their server: clearing a server deletes its
//! row together with every wallet recorded for it, then re-inserts the row
//! unconfigured. A wallet can only be recorded for a server that has a
//! config row.

use std::collections::BTreeMap;
use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, Table, TableDefinition, WriteTransaction,
};
use serde::Deserialize;

use crate::blockchain::Blockchain;
use crate::models::{ChannelId, RoleId, ServerConfig, ServerId, UserId, WalletRecord};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: server_id → serialized ServerConfig (JSON bytes).
const SERVER_CONFIGS: TableDefinition<u64, &[u8]> = TableDefinition::new("server_configs");

/// Wallet records: (server_id, user_id) → wallet address.
const WALLETS: TableDefinition<(u64, u64), &str> = TableDefinition::new("wallets");

/// Bookkeeping: key → value bytes.
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const MIGRATED_KEY: &str = "migrated";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server {0} has no config row")]
    UnknownServer(ServerId),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// WhitelistDb
// =============================================================================

/// Embedded ACID store for server configs and wallet records.
pub struct WhitelistDb {
    db: Database,
}

impl WhitelistDb {
    /// Open the database at the given path, creating a fresh one if absent.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SERVER_CONFIGS)?;
            let _ = write_txn.open_table(WALLETS)?;
            let _ = write_txn.open_table(META)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Server configs
    // =========================================================================

    /// Insert an unconfigured row for `server_id` unless one exists.
    ///
    /// Returns `true` when a row was inserted.
    pub fn ensure_server(&self, server_id: ServerId) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut table = write_txn.open_table(SERVER_CONFIGS)?;
            let exists = table.get(server_id)?.is_some();
            if !exists {
                let json = serde_json::to_vec(&ServerConfig::unconfigured(server_id))?;
                table.insert(server_id, json.as_slice())?;
            }
            !exists
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    /// Look up the config of a server.
    pub fn server_config(&self, server_id: ServerId) -> StoreResult<Option<ServerConfig>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVER_CONFIGS)?;
        let bytes = table.get(server_id)?.map(|value| value.value().to_vec());
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Ids of every server with a config row, ascending.
    #[cfg(test)]
    pub fn server_ids(&self) -> StoreResult<Vec<ServerId>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SERVER_CONFIGS)?;
        let mut ids = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            ids.push(key.value());
        }
        Ok(ids)
    }

    pub fn set_whitelist_channel(
        &self,
        server_id: ServerId,
        channel: ChannelId,
    ) -> StoreResult<ServerConfig> {
        self.update_server(server_id, |config| config.whitelist_channel = Some(channel))
    }

    pub fn set_whitelist_role(&self, server_id: ServerId, role: RoleId) -> StoreResult<ServerConfig> {
        self.update_server(server_id, |config| config.whitelist_role = Some(role))
    }

    pub fn set_blockchain(
        &self,
        server_id: ServerId,
        blockchain: Blockchain,
    ) -> StoreResult<ServerConfig> {
        self.update_server(server_id, |config| config.blockchain = Some(blockchain))
    }

    /// Read-modify-write a server config, creating the row if missing.
    fn update_server(
        &self,
        server_id: ServerId,
        update: impl FnOnce(&mut ServerConfig),
    ) -> StoreResult<ServerConfig> {
        let write_txn = self.db.begin_write()?;
        let config = {
            let mut table = write_txn.open_table(SERVER_CONFIGS)?;

            // Read existing value and deserialize before mutating
            let existing = table.get(server_id)?.map(|value| value.value().to_vec());
            let mut config: ServerConfig = match existing {
                Some(bytes) => serde_json::from_slice(&bytes)?,
                None => ServerConfig::unconfigured(server_id),
            };
            update(&mut config);

            let json = serde_json::to_vec(&config)?;
            table.insert(server_id, json.as_slice())?;
            config
        };
        write_txn.commit()?;
        Ok(config)
    }

    /// Drop the server row with all its wallet records, then re-insert the
    /// row unconfigured, in one transaction.
    ///
    /// Returns the number of wallet records removed.
    pub fn clear_server(&self, server_id: ServerId) -> StoreResult<usize> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let removed = purge_server(&write_txn, server_id)?;
            let mut configs = write_txn.open_table(SERVER_CONFIGS)?;
            let json = serde_json::to_vec(&ServerConfig::unconfigured(server_id))?;
            configs.insert(server_id, json.as_slice())?;
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    // =========================================================================
    // Wallet records
    // =========================================================================

    /// Record `wallet` for (server, user), replacing any earlier submission.
    ///
    /// The delete and insert happen in one write transaction, so a pair never
    /// holds more than one record. Returns the replaced address, if any.
    pub fn record_wallet(
        &self,
        server_id: ServerId,
        user_id: UserId,
        wallet: &str,
    ) -> StoreResult<Option<String>> {
        let write_txn = self.db.begin_write()?;
        let previous = {
            let configs = write_txn.open_table(SERVER_CONFIGS)?;
            let known = configs.get(server_id)?.is_some();
            if !known {
                return Err(StoreError::UnknownServer(server_id));
            }

            let mut wallets = write_txn.open_table(WALLETS)?;
            let previous = wallets
                .remove((server_id, user_id))?
                .map(|old| old.value().to_string());
            wallets.insert((server_id, user_id), wallet)?;
            previous
        };
        write_txn.commit()?;
        Ok(previous)
    }

    /// The wallet a user recorded on a server.
    pub fn wallet_for(&self, server_id: ServerId, user_id: UserId) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS)?;
        let wallet = table
            .get((server_id, user_id))?
            .map(|value| value.value().to_string());
        Ok(wallet)
    }

    /// All wallet records of a server, ordered by user id.
    pub fn wallets_for_server(&self, server_id: ServerId) -> StoreResult<Vec<WalletRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS)?;

        let mut records = Vec::new();
        for entry in table.range((server_id, 0)..=(server_id, u64::MAX))? {
            let (key, value) = entry?;
            let (server_id, user_id) = key.value();
            records.push(WalletRecord {
                server_id,
                user_id,
                wallet: value.value().to_string(),
            });
        }
        Ok(records)
    }

    /// Servers with a config row but no wallet records.
    pub fn idle_servers(&self) -> StoreResult<Vec<ServerId>> {
        let read_txn = self.db.begin_read()?;
        let configs = read_txn.open_table(SERVER_CONFIGS)?;
        let wallets = read_txn.open_table(WALLETS)?;

        let mut idle = Vec::new();
        for entry in configs.iter()? {
            let (key, _) = entry?;
            let server_id = key.value();
            let has_wallets = wallets
                .range((server_id, 0)..=(server_id, u64::MAX))?
                .next()
                .is_some();
            if !has_wallets {
                idle.push(server_id);
            }
        }
        Ok(idle)
    }

    // =========================================================================
    // Migration
    // =========================================================================

    /// Check whether JSON→redb migration has already been performed.
    pub fn is_migrated(&self) -> StoreResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(META)?;
        Ok(table.get(MIGRATED_KEY)?.is_some())
    }
}

/// Set the migration marker inside an open write transaction.
fn insert_migrated_marker(write_txn: &WriteTransaction) -> StoreResult<()> {
    let mut table = write_txn.open_table(META)?;
    table.insert(MIGRATED_KEY, &[1u8] as &[u8])?;
    Ok(())
}

/// Delete the config row of `server_id` and, cascading, its wallet records.
fn purge_server(write_txn: &WriteTransaction, server_id: ServerId) -> StoreResult<usize> {
    let mut configs = write_txn.open_table(SERVER_CONFIGS)?;
    configs.remove(server_id)?;

    let mut wallets = write_txn.open_table(WALLETS)?;
    remove_server_wallets(&mut wallets, server_id)
}

/// Remove every wallet record keyed under `server_id`.
fn remove_server_wallets(
    wallets: &mut Table<'_, (u64, u64), &'static str>,
    server_id: ServerId,
) -> StoreResult<usize> {
    let keys = wallets
        .range((server_id, 0)..=(server_id, u64::MAX))?
        .map(|entry| entry.map(|(key, _)| key.value()))
        .collect::<Result<Vec<(u64, u64)>, _>>()?;
    for key in &keys {
        wallets.remove(key)?;
    }
    Ok(keys.len())
}

// =============================================================================
// Migration from the legacy JSON data file
// =============================================================================

/// Ids in the legacy file were written either as numbers or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyId {
    Number(u64),
    Text(String),
}

impl LegacyId {
    fn parse(&self) -> Option<u64> {
        match self {
            LegacyId::Number(id) => Some(*id),
            LegacyId::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LegacyServer {
    whitelist_channel: Option<LegacyId>,
    whitelist_role: Option<LegacyId>,
    blockchain: Option<String>,
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// Counts reported by [`migrate_from_json`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub servers: usize,
    pub wallets: usize,
    pub skipped: usize,
}

/// Import the legacy `data.json` file into redb.
///
/// The file maps each server id to its channel, role, chain code and a
/// `data` object of `user id → wallet`. This is idempotent: once the marker
/// is set it returns immediately. Everything is written in one transaction.
pub fn migrate_from_json(db: &WhitelistDb, path: &Path) -> StoreResult<MigrationReport> {
    if db.is_migrated()? {
        tracing::info!("Whitelist database already migrated, skipping");
        return Ok(MigrationReport::default());
    }

    tracing::info!(path = %path.display(), "Starting JSON → redb whitelist migration");

    let raw = std::fs::read_to_string(path)?;
    let legacy: BTreeMap<String, LegacyServer> = serde_json::from_str(&raw)?;

    let mut report = MigrationReport::default();
    let write_txn = db.db.begin_write()?;
    {
        let mut configs = write_txn.open_table(SERVER_CONFIGS)?;
        let mut wallets = write_txn.open_table(WALLETS)?;

        for (raw_server_id, server) in &legacy {
            let Ok(server_id) = raw_server_id.trim().parse::<u64>() else {
                tracing::warn!(server = %raw_server_id, "Skipping server with malformed id");
                report.skipped += 1;
                continue;
            };

            let blockchain = match server.blockchain.as_deref() {
                None => None,
                Some(code) => match Blockchain::from_code(code) {
                    Some(chain) => Some(chain),
                    None => {
                        tracing::warn!(server_id, code, "Unknown chain code, leaving unset");
                        None
                    }
                },
            };

            let config = ServerConfig {
                id: server_id,
                whitelist_channel: server.whitelist_channel.as_ref().and_then(LegacyId::parse),
                whitelist_role: server.whitelist_role.as_ref().and_then(LegacyId::parse),
                blockchain,
            };
            let json = serde_json::to_vec(&config)?;
            configs.insert(server_id, json.as_slice())?;
            report.servers += 1;

            for (raw_user_id, wallet) in &server.data {
                let Ok(user_id) = raw_user_id.trim().parse::<u64>() else {
                    tracing::warn!(server_id, user = %raw_user_id, "Skipping wallet with malformed user id");
                    report.skipped += 1;
                    continue;
                };
                wallets.insert((server_id, user_id), wallet.as_str())?;
                report.wallets += 1;
            }
        }
    }
    insert_migrated_marker(&write_txn)?;
    write_txn.commit()?;

    tracing::info!(
        servers = report.servers,
        wallets = report.wallets,
        skipped = report.skipped,
        "JSON → redb migration complete"
    );

    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
