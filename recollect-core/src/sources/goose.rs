//! Goose session source
//!
//! Goose keeps its history in a single SQLite store at
//! `~/.local/share/goose/sessions/sessions.db`: a `sessions` table and a
//! `messages` table keyed by session id. The store is foreign data, so it
//! is opened read-only and every row is treated as potentially irregular;
//! a row that fails to scan is skipped, and a session whose messages
//! cannot be queried is skipped entirely rather than included half-read.

use crate::error::{Error, Result};
use crate::sources::{content, parse_rfc3339, ScanReport, SessionSource};
use crate::types::{
    zero_time, AgentKind, Message, MessageMetadata, Session, SessionMetadata, TokenUsage,
};
use rusqlite::{params, Connection, OpenFlags, Row};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reads Goose sessions from the agent's SQLite store.
pub struct GooseSource {
    db_path: PathBuf,
}

impl GooseSource {
    /// Source reading the default per-user store.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self {
            db_path: home.join(".local/share/goose/sessions/sessions.db"),
        })
    }

    /// Source reading a custom store (config override, tests).
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    fn read_messages(
        &self,
        conn: &Connection,
        session_id: i64,
        report: &mut ScanReport,
    ) -> Result<Vec<Message>> {
        let mut stmt = conn.prepare(
            "SELECT id, message_id, role, content_json, created_timestamp, tokens, metadata_json \
             FROM messages WHERE session_id = ?1 ORDER BY created_timestamp ASC",
        )?;

        let rows = stmt.query_map(params![session_id], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            match row {
                Ok(raw) => messages.push(message_from_row(raw)),
                Err(e) => report.skip(
                    format!("session {} message row", session_id),
                    format!("scan failed: {}", e),
                ),
            }
        }

        Ok(messages)
    }
}

impl SessionSource for GooseSource {
    fn agent_kind(&self) -> AgentKind {
        AgentKind::Goose
    }

    fn is_available(&self) -> bool {
        self.db_path.is_file()
    }

    fn read_sessions(&self) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        if !self.db_path.is_file() {
            return Ok(report);
        }

        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, user_set_name, session_type, working_dir, \
             created_at, updated_at, extension_data, provider_name, model_config_json \
             FROM sessions ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map([], row_to_session)?;

        for row in rows {
            let raw = match row {
                Ok(raw) => raw,
                Err(e) => {
                    report.skip("sessions row", format!("scan failed: {}", e));
                    continue;
                }
            };

            let id = raw.id;
            match self.read_messages(&conn, id, &mut report) {
                Ok(messages) => {
                    let mut session = session_from_row(raw);
                    session.messages = messages;
                    report.sessions.push(session);
                }
                Err(e) => {
                    report.skip(format!("session {}", id), format!("message query failed: {}", e));
                }
            }
        }

        Ok(report)
    }
}

// ============================================
// Row shapes
// ============================================

struct SessionRow {
    id: i64,
    name: Option<String>,
    description: Option<String>,
    user_set_name: Option<String>,
    session_type: Option<String>,
    working_dir: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    provider_name: Option<String>,
    model_config: Option<String>,
}

fn row_to_session(row: &Row) -> rusqlite::Result<SessionRow> {
    // extension_data is read for shape parity with the store but not
    // surfaced into the model.
    let _extension_data: Option<String> = row.get("extension_data")?;

    Ok(SessionRow {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        user_set_name: row.get("user_set_name")?,
        session_type: row.get("session_type")?,
        working_dir: row.get("working_dir")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        provider_name: row.get("provider_name")?,
        model_config: row.get("model_config_json")?,
    })
}

struct MessageRow {
    message_id: Option<String>,
    role: String,
    content_json: Option<String>,
    created_timestamp: Option<String>,
    tokens: Option<i64>,
    metadata_json: Option<String>,
}

fn row_to_message(row: &Row) -> rusqlite::Result<MessageRow> {
    let _id: i64 = row.get("id")?;

    Ok(MessageRow {
        message_id: row.get("message_id")?,
        role: row.get("role")?,
        content_json: row.get("content_json")?,
        created_timestamp: row.get("created_timestamp")?,
        tokens: row.get("tokens")?,
        metadata_json: row.get("metadata_json")?,
    })
}

fn session_from_row(row: SessionRow) -> Session {
    let mut extra = BTreeMap::new();
    if let Some(user_set_name) = row.user_set_name {
        extra.insert("user_set_name".to_string(), user_set_name);
    }
    if let Some(session_type) = row.session_type {
        extra.insert("session_type".to_string(), session_type);
    }
    if let Some(description) = row.description {
        extra.insert("description".to_string(), description);
    }

    let model = row
        .model_config
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|config| config.get("model").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default();

    Session {
        agent_type: AgentKind::Goose,
        session_id: row.id.to_string(),
        created_at: row
            .created_at
            .as_deref()
            .and_then(parse_rfc3339)
            .unwrap_or_else(zero_time),
        updated_at: row
            .updated_at
            .as_deref()
            .and_then(parse_rfc3339)
            .unwrap_or_else(zero_time),
        metadata: SessionMetadata {
            working_dir: row.working_dir.unwrap_or_default(),
            model,
            provider: row.provider_name.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            extra,
            ..Default::default()
        },
        messages: Vec::new(),
        subagents: Vec::new(),
    }
}

fn message_from_row(row: MessageRow) -> Message {
    let content = row
        .content_json
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .map(|value| content::normalize_content(&value))
        .unwrap_or_default();

    let timestamp = row
        .created_timestamp
        .as_deref()
        .and_then(parse_rfc3339)
        .unwrap_or_else(zero_time);

    let extra = row
        .metadata_json
        .as_deref()
        .map(string_entries)
        .unwrap_or_default();

    Message {
        uuid: row.message_id.unwrap_or_default(),
        parent_uuid: String::new(),
        timestamp,
        // Stored verbatim: this source's roles are not restricted to
        // user/assistant.
        role: row.role,
        content,
        metadata: MessageMetadata {
            tokens: row.tokens.map(TokenUsage::from_total),
            extra,
            ..Default::default()
        },
    }
}

/// Top-level string values of a JSON object; everything else is dropped.
fn string_entries(raw: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        for (key, value) in map {
            if let Value::String(text) = value {
                entries.insert(key, text);
            }
        }
    }
    entries
}
