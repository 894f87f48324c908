//! Session sources
//!
//! Each supported agent exposes its history through a [`SessionSource`]:
//! Claude Code as a tree of line-delimited JSON logs, Goose as a SQLite
//! store. [`read_all`] runs the selected sources in order and concatenates
//! whatever they recover.
//!
//! Failure isolation is per unit: a corrupt record, an unreadable file, or
//! a row that fails to scan is recorded as a [`Skipped`] entry and surfaced
//! as a warning, never aborting sibling work. Only environmental failures
//! at the source level (for example an unreadable store) end a single
//! source's scan, and even those leave the other sources untouched.

pub mod claude;
pub mod content;
pub mod goose;

pub use claude::ClaudeSource;
pub use goose::GooseSource;

use crate::error::Result;
use crate::types::{AgentKind, Session};
use chrono::{DateTime, Utc};

/// A unit the scan gave up on, with the reason it was skipped.
#[derive(Debug, Clone)]
pub struct Skipped {
    /// What was skipped: a file, a file line, a store row.
    pub unit: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of scanning one or more sources.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Every session the scan recovered.
    pub sessions: Vec<Session>,
    /// Every unit the scan gave up on.
    pub skipped: Vec<Skipped>,
}

impl ScanReport {
    pub(crate) fn skip(&mut self, unit: impl Into<String>, reason: impl ToString) {
        self.skipped.push(Skipped {
            unit: unit.into(),
            reason: reason.to_string(),
        });
    }
}

/// A readable store of agent sessions.
pub trait SessionSource: Send + Sync {
    /// Which agent this source reads.
    fn agent_kind(&self) -> AgentKind;

    /// Whether the backing store exists on this machine.
    fn is_available(&self) -> bool;

    /// Read every session the source holds.
    ///
    /// A missing store yields an empty report, not an error; only
    /// environmental failures (an unreadable store, a failing query)
    /// return `Err`.
    fn read_sessions(&self) -> Result<ScanReport>;
}

/// Read all given sources in order, concatenating their sessions.
///
/// Source-level failures and per-unit skips are logged as warnings; neither
/// stops the remaining sources from being read.
pub fn read_all(sources: &[Box<dyn SessionSource>]) -> ScanReport {
    let mut combined = ScanReport::default();

    for source in sources {
        if !source.is_available() {
            tracing::debug!(agent = %source.agent_kind(), "source not present, skipping");
            continue;
        }

        match source.read_sessions() {
            Ok(report) => {
                tracing::debug!(
                    agent = %source.agent_kind(),
                    sessions = report.sessions.len(),
                    skipped = report.skipped.len(),
                    "read source"
                );

                for skip in &report.skipped {
                    tracing::warn!(
                        agent = %source.agent_kind(),
                        unit = %skip.unit,
                        reason = %skip.reason,
                        "skipped unit"
                    );
                }

                combined.sessions.extend(report.sessions);
                combined.skipped.extend(report.skipped);
            }
            Err(e) => {
                tracing::warn!(
                    agent = %source.agent_kind(),
                    error = %e,
                    "failed to read source"
                );
            }
        }
    }

    combined
}

/// Parse a wire timestamp, dropping anything malformed.
pub(crate) fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
