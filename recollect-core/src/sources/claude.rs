//! Claude Code session source
//!
//! Claude Code keeps one line-delimited JSON log per session under
//! `~/.claude/projects/`, organized by project directory. Each line is an
//! independent record; session-level fields ride along on whichever records
//! happen to carry them. Subagent conversations live in a sibling directory
//! keyed by the session identifier:
//!
//! ```text
//! ~/.claude/projects/<project>/<session-id>.jsonl
//! ~/.claude/projects/<project>/<session-id>/subagents/agent-<id>.jsonl
//! ```

use crate::error::{Error, Result};
use crate::sources::content::{self, lenient};
use crate::sources::{parse_rfc3339, ScanReport, SessionSource};
use crate::types::{
    zero_time, AgentKind, Message, MessageMetadata, Session, SessionMetadata, Subagent, TokenUsage,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads Claude Code session logs from a projects directory tree.
pub struct ClaudeSource {
    root: PathBuf,
}

impl ClaudeSource {
    /// Source rooted at the default per-user projects directory.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Ok(Self {
            root: home.join(".claude").join("projects"),
        })
    }

    /// Source rooted at a custom directory (config override, tests).
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn read_session_file(&self, path: &Path, report: &mut ScanReport) -> Result<Session> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut session_id = String::new();
        let mut metadata = SessionMetadata::default();
        let mut messages = Vec::new();
        let mut created_at: Option<DateTime<Utc>> = None;
        let mut updated_at: Option<DateTime<Utc>> = None;

        for (number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    report.skip(
                        format!("{}:{}", path.display(), number + 1),
                        format!("read error: {}", e),
                    );
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let record: RawRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(
                        format!("{}:{}", path.display(), number + 1),
                        format!("malformed record: {}", e),
                    );
                    continue;
                }
            };

            // Session-level fields keep the first value seen, each
            // independently of the others.
            if session_id.is_empty() {
                if let Some(sid) = &record.session_id {
                    session_id = sid.clone();
                }
            }
            if metadata.working_dir.is_empty() {
                if let Some(cwd) = &record.cwd {
                    metadata.working_dir = cwd.clone();
                }
            }
            if metadata.git_branch.is_empty() {
                if let Some(branch) = &record.git_branch {
                    metadata.git_branch = branch.clone();
                }
            }

            // Every record's timestamp counts toward the session bounds,
            // not only the ones that become messages.
            if let Some(ts) = record.parsed_timestamp() {
                created_at = Some(created_at.map_or(ts, |t| t.min(ts)));
                updated_at = Some(updated_at.map_or(ts, |t| t.max(ts)));
            }

            if let Some(message) = record_to_message(record) {
                messages.push(message);
            }
        }

        if session_id.is_empty() {
            session_id = file_stem(path);
        }

        let subagents = self.read_subagents(path, &session_id, report);

        Ok(Session {
            agent_type: AgentKind::Claude,
            session_id,
            created_at: created_at.unwrap_or_else(zero_time),
            updated_at: updated_at.unwrap_or_else(zero_time),
            metadata,
            messages,
            subagents,
        })
    }

    fn read_subagents(
        &self,
        session_path: &Path,
        session_id: &str,
        report: &mut ScanReport,
    ) -> Vec<Subagent> {
        let Some(parent) = session_path.parent() else {
            return Vec::new();
        };
        let dir = parent.join(session_id).join("subagents");
        if !dir.is_dir() {
            return Vec::new();
        }

        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                report.skip(dir.display().to_string(), format!("unreadable directory: {}", e));
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "jsonl"))
            .collect();
        paths.sort();

        let mut subagents = Vec::new();
        for path in paths {
            match self.read_subagent_file(&path, report) {
                Ok(subagent) => subagents.push(subagent),
                Err(e) => report.skip(path.display().to_string(), e),
            }
        }

        subagents
    }

    fn read_subagent_file(&self, path: &Path, report: &mut ScanReport) -> Result<Subagent> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut slug = String::new();
        let mut messages = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    report.skip(
                        format!("{}:{}", path.display(), number + 1),
                        format!("read error: {}", e),
                    );
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let record: RawRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    report.skip(
                        format!("{}:{}", path.display(), number + 1),
                        format!("malformed record: {}", e),
                    );
                    continue;
                }
            };

            if slug.is_empty() {
                if let Some(s) = &record.slug {
                    slug = s.clone();
                }
            }

            if let Some(message) = record_to_message(record) {
                messages.push(message);
            }
        }

        Ok(Subagent {
            agent_id: agent_id_from_path(path),
            slug,
            messages,
        })
    }
}

impl SessionSource for ClaudeSource {
    fn agent_kind(&self) -> AgentKind {
        AgentKind::Claude
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    fn read_sessions(&self) -> Result<ScanReport> {
        let mut report = ScanReport::default();
        if !self.root.is_dir() {
            return Ok(report);
        }

        let pattern = self.root.join("**").join("*.jsonl");
        let entries = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| Error::Config(format!("invalid session file pattern: {}", e)))?;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    report.skip(e.path().display().to_string(), format!("unreadable: {}", e));
                    continue;
                }
            };

            if in_subagent_dir(&path) {
                continue;
            }

            match self.read_session_file(&path, &mut report) {
                Ok(session) => report.sessions.push(session),
                Err(e) => report.skip(path.display().to_string(), e),
            }
        }

        Ok(report)
    }
}

// ============================================
// Raw record shapes
// ============================================

/// One line of a session log. Recognized fields of the wrong shape read as
/// absent; fields the source added that we do not know about are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "type", deserialize_with = "lenient")]
    record_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    uuid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    parent_uuid: Option<String>,
    #[serde(deserialize_with = "lenient")]
    session_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    timestamp: Option<String>,
    #[serde(deserialize_with = "lenient")]
    cwd: Option<String>,
    #[serde(deserialize_with = "lenient")]
    git_branch: Option<String>,
    #[serde(deserialize_with = "lenient")]
    is_sidechain: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    agent_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    request_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    slug: Option<String>,
    #[serde(deserialize_with = "lenient")]
    message: Option<RawMessage>,
}

impl RawRecord {
    fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_rfc3339)
    }
}

/// The embedded message payload of a user or assistant record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMessage {
    #[serde(deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(deserialize_with = "lenient")]
    model: Option<String>,
    content: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    usage: Option<RawUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawUsage {
    #[serde(deserialize_with = "lenient")]
    input_tokens: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    output_tokens: Option<i64>,
}

/// Only user and assistant records become messages, and only when the
/// embedded payload names a role. Everything else (system notices, summary
/// records, hook output) contributes timestamps and session fields only.
fn record_to_message(record: RawRecord) -> Option<Message> {
    match record.record_type.as_deref() {
        Some("user") | Some("assistant") => {}
        _ => return None,
    }

    let timestamp = record.parsed_timestamp().unwrap_or_else(zero_time);
    let raw = record.message?;
    let role = raw.role.filter(|role| !role.is_empty())?;

    let content = raw
        .content
        .as_ref()
        .map(content::normalize_content)
        .unwrap_or_default();

    let tokens = raw.usage.map(|usage| {
        TokenUsage::from_counts(
            usage.input_tokens.unwrap_or(0),
            usage.output_tokens.unwrap_or(0),
        )
    });

    Some(Message {
        uuid: record.uuid.unwrap_or_default(),
        parent_uuid: record.parent_uuid.unwrap_or_default(),
        timestamp,
        role,
        content,
        metadata: MessageMetadata {
            is_sidechain: record.is_sidechain.unwrap_or(false),
            agent_id: record.agent_id.unwrap_or_default(),
            tokens,
            model: raw.model.unwrap_or_default(),
            request_id: record.request_id.unwrap_or_default(),
            extra: Default::default(),
        },
    })
}

/// Subagent logs live under `<session-id>/subagents/` next to their parent
/// session file; the main walk leaves them to the per-session lookup.
fn in_subagent_dir(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == "subagents")
}

/// `agent-<id>.jsonl` becomes `<id>`; files without the prefix keep their
/// stem.
fn agent_id_from_path(path: &Path) -> String {
    let stem = file_stem(path);
    stem.strip_prefix("agent-")
        .map(str::to_string)
        .unwrap_or(stem)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}
