//! recollect - AI agent session exporter
//!
//! Reads Claude Code and Goose session stores, normalizes them into one
//! model, and writes a JSON envelope (or a human-readable digest) to
//! stdout or a file.

mod summary;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use recollect_core::export::{self, Envelope};
use recollect_core::filter::{self, FilterOptions};
use recollect_core::sources::{self, ClaudeSource, GooseSource, SessionSource};
use recollect_core::types::AgentKind;
use recollect_core::{logging, Config};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "recollect")]
#[command(about = "Export AI coding agent sessions as normalized JSON")]
#[command(version)]
struct Args {
    /// Only read sessions from this agent (claude or goose)
    #[arg(long)]
    agent: Option<String>,

    /// Only include the session with this id
    #[arg(long)]
    session_id: Option<String>,

    /// Only include sessions created at or after this RFC 3339 timestamp
    #[arg(long)]
    since: Option<String>,

    /// Only include sessions created at or before this RFC 3339 timestamp
    #[arg(long)]
    until: Option<String>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON envelope
    #[arg(long)]
    pretty: bool,

    /// Print a human-readable digest instead of JSON
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    logging::init(&config.logging);

    let agent_kind = args
        .agent
        .as_deref()
        .map(|raw| AgentKind::from_str(raw).map_err(anyhow::Error::msg))
        .transpose()
        .context("invalid --agent value")?;

    let options = FilterOptions {
        agent_kind,
        session_id: args.session_id,
        since: parse_instant(args.since.as_deref(), "--since")?,
        until: parse_instant(args.until.as_deref(), "--until")?,
    };

    let readers = selected_sources(&config, agent_kind)?;
    let report = sources::read_all(&readers);
    let sessions = filter::apply(report.sessions, &options);

    let mut writer = open_output(args.output.as_deref())?;
    if args.summary {
        summary::write_summary(&mut writer, &sessions)?;
    } else {
        let envelope = Envelope::new(sessions);
        export::write_json(&mut writer, &envelope, args.pretty)?;
    }

    Ok(())
}

/// Parse an RFC 3339 command line timestamp
fn parse_instant(raw: Option<&str>, flag: &str) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let parsed = DateTime::parse_from_rfc3339(raw).with_context(|| {
        format!("invalid {} value {:?}: expected an RFC 3339 timestamp", flag, raw)
    })?;
    Ok(Some(parsed.with_timezone(&Utc)))
}

/// Build the set of sources to read, honoring --agent and config overrides
fn selected_sources(
    config: &Config,
    agent_kind: Option<AgentKind>,
) -> Result<Vec<Box<dyn SessionSource>>> {
    let mut readers: Vec<Box<dyn SessionSource>> = Vec::new();

    if agent_kind != Some(AgentKind::Goose) {
        let source = match &config.sources.claude_root {
            Some(root) => ClaudeSource::with_root(root.clone()),
            None => ClaudeSource::new()?,
        };
        readers.push(Box::new(source));
    }

    if agent_kind != Some(AgentKind::Claude) {
        let source = match &config.sources.goose_db {
            Some(path) => GooseSource::with_db_path(path.clone()),
            None => GooseSource::new()?,
        };
        readers.push(Box::new(source));
    }

    Ok(readers)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
