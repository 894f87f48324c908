//! Core domain types for recollect
//!
//! These types form the canonical data model that both session sources
//! normalize into, and that the export envelope serializes.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session** | One recorded agent conversation from one source |
//! | **Subagent** | A nested conversation spawned within a session, tracked apart from its parent's messages |
//! | **Content block** | One typed unit of message content (text, tool invocation, tool result, unrecognized-with-text) |
//!
//! ## Wire shape
//!
//! Serialization follows an omit-zero rule: any field holding its zero value
//! (empty string, empty map, empty sequence, absent optional) is left out of
//! the JSON, except for the small always-present set (`agent_type`,
//! `session_id`, `created_at`, `updated_at`, `role`, `type`, `content`,
//! `messages`). Reading an envelope back therefore cannot distinguish a
//! zero-valued field from a never-set one, which is intended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ============================================
// Agent Kind
// ============================================

/// Supported session sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Claude,
    Goose,
}

impl AgentKind {
    /// Returns the display name for this agent
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentKind::Claude => "Claude Code",
            AgentKind::Goose => "Goose",
        }
    }

    /// Returns the identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::Goose => "goose",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("claude") {
            Ok(AgentKind::Claude)
        } else if s.eq_ignore_ascii_case("goose") {
            Ok(AgentKind::Goose)
        } else {
            Err(format!("unknown agent kind: {}", s))
        }
    }
}

// ============================================
// Zero values
// ============================================

/// The unset instant. Sessions assembled from records with no parseable
/// timestamps carry this, and the filter's unset bounds compare against it.
pub fn zero_time() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn is_zero_time(ts: &DateTime<Utc>) -> bool {
    *ts == DateTime::UNIX_EPOCH
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

// ============================================
// Session
// ============================================

/// A unified agent session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Which agent produced this session
    pub agent_type: AgentKind,
    /// Source-scoped identifier; unique within one agent's store only
    pub session_id: String,
    /// Earliest timestamp seen across the session's records
    #[serde(default = "zero_time")]
    pub created_at: DateTime<Utc>,
    /// Latest timestamp seen across the session's records
    #[serde(default = "zero_time")]
    pub updated_at: DateTime<Utc>,
    /// Session-level metadata
    #[serde(default, skip_serializing_if = "SessionMetadata::is_empty")]
    pub metadata: SessionMetadata,
    /// Messages in conversation order
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Nested conversations, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subagents: Vec<Subagent>,
}

/// Session-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Working directory the session ran in
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    /// Source-control branch, when the source records one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_branch: String,
    /// Model name, when the source records one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Provider name, when the source records one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
    /// Display name, when the source records one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Source fields with no first-class slot, string-valued only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl SessionMetadata {
    pub fn is_empty(&self) -> bool {
        self.working_dir.is_empty()
            && self.git_branch.is_empty()
            && self.model.is_empty()
            && self.provider.is_empty()
            && self.name.is_empty()
            && self.extra.is_empty()
    }
}

// ============================================
// Message
// ============================================

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Source message identifier
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    /// Identifier of the message this one replies to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_uuid: String,
    /// When the message was recorded
    #[serde(default = "zero_time", skip_serializing_if = "is_zero_time")]
    pub timestamp: DateTime<Utc>,
    /// Author role as the source stored it
    #[serde(default)]
    pub role: String,
    /// Normalized content blocks; empty is legal and never padded
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Message-level metadata
    #[serde(default, skip_serializing_if = "MessageMetadata::is_empty")]
    pub metadata: MessageMetadata,
}

/// Message-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Whether the message belongs to a sidechain conversation
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_sidechain: bool,
    /// Identifier of the subagent that produced the message, if any
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_id: String,
    /// Token usage, when the source records it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
    /// Model that produced the message, when recorded
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Upstream request identifier, when recorded
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    /// Source fields with no first-class slot, string-valued only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl MessageMetadata {
    pub fn is_empty(&self) -> bool {
        !self.is_sidechain
            && self.agent_id.is_empty()
            && self.tokens.is_none()
            && self.model.is_empty()
            && self.request_id.is_empty()
            && self.extra.is_empty()
    }
}

/// Token usage statistics
///
/// Populated from one of two mutually exclusive paths depending on the
/// source: structured input/output counts whose sum becomes the total, or a
/// single pre-computed total with the per-direction counts left zero. No
/// reconciliation between the two is performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub input_tokens: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub output_tokens: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_tokens: i64,
}

impl TokenUsage {
    /// Usage from structured per-direction counts; the total is their sum.
    pub fn from_counts(input: i64, output: i64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
    }

    /// Usage from a pre-computed total; per-direction counts are unknown.
    pub fn from_total(total: i64) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: total,
        }
    }
}

// ============================================
// Subagent
// ============================================

/// A nested conversation spawned within a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subagent {
    /// Identifier derived from the subagent's file name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent_id: String,
    /// Descriptive slug, when the subagent's records carry one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slug: String,
    /// Messages in conversation order
    #[serde(default)]
    pub messages: Vec<Message>,
}

// ============================================
// Content Block
// ============================================

/// One typed unit of message content.
///
/// A closed set of variants plus a fallback carrying the original tag, so a
/// tool invocation can never carry a tool result's fields. Serializes to a
/// flat object with a `type` discriminator via [`WireBlock`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBlock", into = "WireBlock")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },
    /// A tool invocation
    ToolUse {
        tool_name: String,
        tool_use_id: String,
        tool_input: Map<String, Value>,
    },
    /// The outcome of a tool invocation, flattened to text
    ToolResult {
        tool_use_id: String,
        tool_content: String,
    },
    /// An unrecognized block kind that still carried readable text
    Other { tag: String, text: String },
}

impl ContentBlock {
    /// The tag this block serializes under.
    pub fn tag(&self) -> &str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::ToolUse { .. } => "tool_use",
            ContentBlock::ToolResult { .. } => "tool_result",
            ContentBlock::Other { tag, .. } => tag.as_str(),
        }
    }

    /// Plain-text view of the block; tool invocations read as empty.
    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } | ContentBlock::Other { text, .. } => text.as_str(),
            ContentBlock::ToolResult { tool_content, .. } => tool_content.as_str(),
            ContentBlock::ToolUse { .. } => "",
        }
    }
}

/// The flat wire shape of a content block.
///
/// `type` is always written; every other field is omitted at its zero value.
/// Kept separate from [`ContentBlock`] so the fallback variant's dynamic tag
/// can occupy the same discriminator slot as the known kinds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    tool_name: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    tool_input: Map<String, Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    tool_use_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    tool_content: String,
}

impl From<WireBlock> for ContentBlock {
    fn from(wire: WireBlock) -> Self {
        match wire.kind.as_str() {
            "text" => ContentBlock::Text { text: wire.text },
            "tool_use" => ContentBlock::ToolUse {
                tool_name: wire.tool_name,
                tool_use_id: wire.tool_use_id,
                tool_input: wire.tool_input,
            },
            "tool_result" => ContentBlock::ToolResult {
                tool_use_id: wire.tool_use_id,
                tool_content: wire.tool_content,
            },
            _ => ContentBlock::Other {
                tag: wire.kind,
                text: wire.text,
            },
        }
    }
}

impl From<ContentBlock> for WireBlock {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => WireBlock {
                kind: "text".to_string(),
                text,
                ..Default::default()
            },
            ContentBlock::ToolUse {
                tool_name,
                tool_use_id,
                tool_input,
            } => WireBlock {
                kind: "tool_use".to_string(),
                tool_name,
                tool_use_id,
                tool_input,
                ..Default::default()
            },
            ContentBlock::ToolResult {
                tool_use_id,
                tool_content,
            } => WireBlock {
                kind: "tool_result".to_string(),
                tool_use_id,
                tool_content,
                ..Default::default()
            },
            ContentBlock::Other { tag, text } => WireBlock {
                kind: tag,
                text,
                ..Default::default()
            },
        }
    }
}
