//! Integration tests for the session sources and export pipeline
//!
//! These tests use fixture files in `tests/fixtures/claude/` as a reader
//! root, and build throwaway Goose stores with rusqlite.

use recollect_core::export::{self, Envelope};
use recollect_core::filter::{self, FilterOptions};
use recollect_core::sources::{self, ClaudeSource, GooseSource, SessionSource};
use recollect_core::types::{AgentKind, TokenUsage};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Root of the Claude fixture tree
fn claude_fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/claude")
}

/// Build a small Goose store and return its path
fn goose_fixture_store(temp: &TempDir) -> PathBuf {
    let db_path = temp.path().join("sessions.db");
    let conn = Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TABLE sessions (
            id INTEGER PRIMARY KEY,
            name TEXT,
            description TEXT,
            user_set_name TEXT,
            session_type TEXT,
            working_dir TEXT,
            created_at TEXT,
            updated_at TEXT,
            extension_data TEXT,
            provider_name TEXT,
            model_config_json TEXT
        );
        CREATE TABLE messages (
            id INTEGER PRIMARY KEY,
            session_id INTEGER NOT NULL,
            message_id TEXT,
            role TEXT,
            content_json TEXT,
            created_timestamp TEXT,
            tokens INTEGER,
            metadata_json TEXT
        );",
    )
    .unwrap();

    conn.execute(
        "INSERT INTO sessions (id, name, description, working_dir, created_at, updated_at, provider_name, model_config_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            31,
            "refactor run",
            "cleanup pass",
            "/work/refactor",
            "2025-03-10T14:00:00Z",
            "2025-03-10T15:30:00Z",
            "anthropic",
            r#"{"model":"claude-sonnet-4","context_limit":200000}"#
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO messages (id, session_id, message_id, role, content_json, created_timestamp, tokens)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            1,
            31,
            "gm-001",
            "user",
            r#""please tidy the module""#,
            "2025-03-10T14:00:10Z",
            Option::<i64>::None
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO messages (id, session_id, message_id, role, content_json, created_timestamp, tokens)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            2,
            31,
            "gm-002",
            "assistant",
            r#"[{"type":"text","text":"tidied"}]"#,
            "2025-03-10T14:05:00Z",
            412
        ],
    )
    .unwrap();

    db_path
}

// ============================================
// Claude fixture tree
// ============================================

#[test]
fn test_claude_tree_end_to_end() {
    let source = ClaudeSource::with_root(claude_fixture_root());
    assert!(source.is_available());

    let report = source.read_sessions().unwrap();
    assert_eq!(report.sessions.len(), 2);

    // One malformed line in untitled.jsonl, nothing else.
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].unit.contains("untitled.jsonl:2"));

    let session = &report.sessions[0];
    assert_eq!(session.session_id, "9f2a4c6e-1111-2222-3333-444455556666");
    assert_eq!(session.agent_type, AgentKind::Claude);
    assert_eq!(session.metadata.working_dir, "/home/dev/sample");
    assert_eq!(session.metadata.git_branch, "main");
    assert_eq!(session.created_at.to_rfc3339(), "2025-01-15T10:00:00+00:00");
    assert_eq!(session.updated_at.to_rfc3339(), "2025-01-15T10:01:10+00:00");

    assert_eq!(session.messages.len(), 4);
    assert_eq!(session.messages[0].role, "user");
    assert_eq!(session.messages[0].content[0].as_text(), "Add a README");

    let assistant = &session.messages[1];
    assert_eq!(assistant.content.len(), 2);
    assert_eq!(assistant.content[1].tag(), "tool_use");
    assert_eq!(assistant.metadata.model, "claude-sonnet-4");
    assert_eq!(assistant.metadata.request_id, "req_011");
    assert_eq!(assistant.metadata.tokens, Some(TokenUsage::from_counts(120, 45)));

    let tool_result = &session.messages[2].content[0];
    assert_eq!(tool_result.tag(), "tool_result");
    assert_eq!(tool_result.as_text(), "File created\n1 file changed");

    assert_eq!(session.subagents.len(), 1);
    let subagent = &session.subagents[0];
    assert_eq!(subagent.agent_id, "doc-writer");
    assert_eq!(subagent.slug, "doc-writer-start");
    assert_eq!(subagent.messages.len(), 2);
    assert!(subagent.messages[0].metadata.is_sidechain);

    let untitled = &report.sessions[1];
    assert_eq!(untitled.session_id, "untitled");
    assert_eq!(untitled.messages.len(), 2);
    assert_eq!(untitled.created_at.to_rfc3339(), "2025-02-01T09:00:00+00:00");
    assert_eq!(untitled.updated_at.to_rfc3339(), "2025-02-01T09:00:20+00:00");
}

// ============================================
// Goose store
// ============================================

#[test]
fn test_goose_store_end_to_end() {
    let temp = TempDir::new().unwrap();
    let source = GooseSource::with_db_path(goose_fixture_store(&temp));
    assert!(source.is_available());

    let report = source.read_sessions().unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.sessions.len(), 1);

    let session = &report.sessions[0];
    assert_eq!(session.agent_type, AgentKind::Goose);
    assert_eq!(session.session_id, "31");
    assert_eq!(session.metadata.name, "refactor run");
    assert_eq!(session.metadata.provider, "anthropic");
    assert_eq!(session.metadata.model, "claude-sonnet-4");
    assert_eq!(
        session.metadata.extra.get("description").map(String::as_str),
        Some("cleanup pass")
    );

    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].uuid, "gm-001");
    assert_eq!(session.messages[0].content[0].as_text(), "please tidy the module");
    assert_eq!(session.messages[0].metadata.tokens, None);
    assert_eq!(
        session.messages[1].metadata.tokens,
        Some(TokenUsage::from_total(412))
    );
}

// ============================================
// Combined pipeline
// ============================================

#[test]
fn test_combined_sources_filter_and_export() {
    let temp = TempDir::new().unwrap();
    let readers: Vec<Box<dyn SessionSource>> = vec![
        Box::new(ClaudeSource::with_root(claude_fixture_root())),
        Box::new(GooseSource::with_db_path(goose_fixture_store(&temp))),
    ];

    let report = sources::read_all(&readers);
    assert_eq!(report.sessions.len(), 3);

    let goose_only = filter::apply(
        report.sessions.clone(),
        &FilterOptions {
            agent_kind: Some(AgentKind::Goose),
            ..Default::default()
        },
    );
    assert_eq!(goose_only.len(), 1);
    assert_eq!(goose_only[0].session_id, "31");

    let recent = filter::apply(
        report.sessions.clone(),
        &FilterOptions {
            since: Some("2025-02-01T00:00:00Z".parse().unwrap()),
            ..Default::default()
        },
    );
    assert_eq!(recent.len(), 2);

    let envelope = Envelope::new(report.sessions);
    let mut out = Vec::new();
    export::write_json(&mut out, &envelope, true).unwrap();

    let back: Envelope = serde_json::from_slice(&out).unwrap();
    assert_eq!(back.sessions, envelope.sessions);
}

#[test]
fn test_missing_sources_yield_empty_envelope() {
    let temp = TempDir::new().unwrap();
    let readers: Vec<Box<dyn SessionSource>> = vec![
        Box::new(ClaudeSource::with_root(temp.path().join("no-projects"))),
        Box::new(GooseSource::with_db_path(temp.path().join("no-store.db"))),
    ];

    let report = sources::read_all(&readers);
    assert!(report.sessions.is_empty());

    let envelope = Envelope::new(report.sessions);
    let mut out = Vec::new();
    export::write_json(&mut out, &envelope, false).unwrap();
    assert!(String::from_utf8(out).unwrap().contains(r#""sessions":[]"#));
}
