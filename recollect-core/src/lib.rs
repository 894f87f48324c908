//! # recollect-core
//!
//! Core library for recollect - a unified exporter for AI agent session
//! histories.
//!
//! This library provides:
//! - A canonical data model for sessions, messages, and content blocks
//! - Source readers for Claude Code (line-delimited JSON logs) and Goose
//!   (SQLite store)
//! - Declarative session filtering
//! - The versioned JSON export envelope
//!
//! ## Architecture
//!
//! Each source normalizes its own storage format into the shared
//! [`Session`]/[`Message`]/[`ContentBlock`] model; everything downstream of
//! the readers (filtering, export, summaries) is source-agnostic. Reading
//! is strictly best-effort: a corrupt record or row costs only itself,
//! never the scan.
//!
//! ## Example
//!
//! ```rust,no_run
//! use recollect_core::filter::{self, FilterOptions};
//! use recollect_core::sources::{self, ClaudeSource, GooseSource, SessionSource};
//!
//! # fn main() -> recollect_core::Result<()> {
//! let readers: Vec<Box<dyn SessionSource>> = vec![
//!     Box::new(ClaudeSource::new()?),
//!     Box::new(GooseSource::new()?),
//! ];
//!
//! let report = sources::read_all(&readers);
//! let sessions = filter::apply(report.sessions, &FilterOptions::default());
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use export::Envelope;
pub use filter::FilterOptions;
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod logging;
pub mod sources;
pub mod types;
