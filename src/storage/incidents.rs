// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Incident log for failures that never reach the user.
//!
//! Unhandled errors raised while processing a chat message, and servers the
//! bot newly joins, are appended to a plain-text file as JSON lines so an
//! operator can inspect them after the fact.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ChannelId, ServerId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum IncidentLogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Types of incidents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    /// A message handler failed with an unclassified error.
    UnhandledError,
    /// The bot was added to a server it had not seen before.
    GuildJoined,
}

/// One incident log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub incident_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: IncidentKind,
    pub server_id: Option<ServerId>,
    pub channel_id: Option<ChannelId>,
    pub author_id: Option<UserId>,
    /// Raw content of the offending message.
    pub content: Option<String>,
    /// Server name for join events.
    pub server_name: Option<String>,
    /// Full error chain for unhandled errors.
    pub error: Option<String>,
}

impl Incident {
    pub fn new(kind: IncidentKind) -> Self {
        Self {
            incident_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            server_id: None,
            channel_id: None,
            author_id: None,
            content: None,
            server_name: None,
            error: None,
        }
    }

    /// Attach the message that triggered the incident.
    pub fn with_message(
        mut self,
        server_id: Option<ServerId>,
        channel_id: ChannelId,
        author_id: UserId,
        content: impl Into<String>,
    ) -> Self {
        self.server_id = server_id;
        self.channel_id = Some(channel_id);
        self.author_id = Some(author_id);
        self.content = Some(content.into());
        self
    }

    pub fn with_server(mut self, server_id: ServerId, name: impl Into<String>) -> Self {
        self.server_id = Some(server_id);
        self.server_name = Some(name.into());
        self
    }

    /// Record an error together with its `source()` chain.
    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut text = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            text.push_str(": ");
            text.push_str(&cause.to_string());
            source = cause.source();
        }
        self.error = Some(text);
        self
    }
}

/// Append-only incident file.
pub struct IncidentLog {
    path: PathBuf,
    // Serializes appends from concurrent event handlers.
    write_lock: Mutex<()>,
}

impl IncidentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one incident as a JSON line.
    pub fn append(&self, incident: &Incident) -> Result<(), IncidentLogError> {
        let mut line = serde_json::to_string(incident)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Append, reporting failures through tracing instead of the caller.
    pub fn record(&self, incident: &Incident) {
        if let Err(e) = self.append(incident) {
            tracing::error!(
                path = %self.path.display(),
                incident_id = %incident.incident_id,
                error = %e,
                "Failed to write incident log"
            );
        }
    }

    /// Read every incident in the file.
    pub fn read_all(&self) -> Result<Vec<Incident>, IncidentLogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut incidents = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            incidents.push(serde_json::from_str(line)?);
        }
        Ok(incidents)
    }
}
