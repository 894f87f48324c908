//! Human-readable session digests
//!
//! Renders each session as a short digest: header, opening prompt, the
//! latest exchanges, and message counts. Selected with `--summary` in
//! place of the JSON envelope.

use recollect_core::types::{ContentBlock, Message, Session};
use std::io::{self, Write};

/// Write digests for all sessions, separated by a rule
pub fn write_summary<W: Write>(writer: &mut W, sessions: &[Session]) -> io::Result<()> {
    if sessions.is_empty() {
        writeln!(writer, "No sessions found.")?;
        return Ok(());
    }

    for (i, session) in sessions.iter().enumerate() {
        if i > 0 {
            writeln!(writer, "\n{}", "=".repeat(80))?;
        }
        write_session(writer, session)?;
    }

    Ok(())
}

fn write_session<W: Write>(writer: &mut W, session: &Session) -> io::Result<()> {
    writeln!(writer, "\n📋 Session: {}", session.session_id)?;
    writeln!(writer, "   Agent: {}", session.agent_type)?;
    writeln!(
        writer,
        "   Created: {}",
        session.created_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    if !session.metadata.working_dir.is_empty() {
        writeln!(writer, "   Working Dir: {}", session.metadata.working_dir)?;
    }
    if !session.metadata.model.is_empty() {
        writeln!(writer, "   Model: {}", session.metadata.model)?;
    }

    let first_user = session.messages.iter().find(|m| m.role == "user");
    let last_user = session.messages.iter().rev().find(|m| m.role == "user");
    let last_agents = last_agent_messages(&session.messages, 2);

    if let Some(message) = first_user {
        writeln!(writer, "\n🚀 Initial User Prompt:")?;
        let wrapped = wrap_text(&text_content(message), 76);
        writeln!(writer, "   {}", wrapped.replace('\n', "\n   "))?;
    }

    // The last prompt is only worth repeating when it differs from the first.
    if let Some(message) = last_user {
        let repeat = first_user.is_some_and(|first| first.uuid == message.uuid);
        if !repeat {
            writeln!(writer, "\n💬 Last User Prompt:")?;
            let wrapped = wrap_text(&text_content(message), 76);
            writeln!(writer, "   {}", wrapped.replace('\n', "\n   "))?;
        }
    }

    if !last_agents.is_empty() {
        writeln!(writer, "\n🤖 Last {} Agent Message(s):", last_agents.len())?;
        for (i, message) in last_agents.iter().enumerate() {
            let mut content = text_content(message);
            if content.is_empty() {
                content = "[Tool use or non-text content]".to_string();
            }
            let wrapped = wrap_text(&content, 74);
            writeln!(writer, "\n   [{}] {}", i + 1, wrapped.replace('\n', "\n       "))?;
        }
    }

    let user_count = count_role(&session.messages, "user");
    let agent_count = count_role(&session.messages, "assistant");

    writeln!(writer, "\n📊 Statistics:")?;
    writeln!(
        writer,
        "   Total Messages: {} (User: {}, Agent: {})",
        session.messages.len(),
        user_count,
        agent_count
    )?;
    if !session.subagents.is_empty() {
        writeln!(writer, "   Subagents: {}", session.subagents.len())?;
    }

    Ok(())
}

/// The last `count` assistant messages, oldest first
fn last_agent_messages(messages: &[Message], count: usize) -> Vec<&Message> {
    let mut result: Vec<&Message> = Vec::new();
    for message in messages.iter().rev() {
        if result.len() == count {
            break;
        }
        if message.role == "assistant" {
            result.push(message);
        }
    }
    result.reverse();
    result
}

fn count_role(messages: &[Message], role: &str) -> usize {
    messages.iter().filter(|m| m.role == role).count()
}

/// Text blocks joined with spaces. Tool blocks carry too much noise for
/// a digest, so they are left out.
fn text_content(message: &Message) -> String {
    let mut parts = Vec::new();
    for block in &message.content {
        if let ContentBlock::Text { text } = block {
            if !text.is_empty() {
                parts.push(text.as_str());
            }
        }
    }
    parts.join(" ")
}

/// Greedy word wrap. Words longer than the width overflow their line
/// rather than being split.
fn wrap_text(text: &str, width: usize) -> String {
    if text.len() <= width {
        return text.to_string();
    }

    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return text.to_string();
    };

    let mut result = String::from(first);
    let mut line_len = first.len();
    for word in words {
        if line_len + 1 + word.len() <= width {
            result.push(' ');
            result.push_str(word);
            line_len += 1 + word.len();
        } else {
            result.push('\n');
            result.push_str(word);
            line_len = word.len();
        }
    }
    result
}
