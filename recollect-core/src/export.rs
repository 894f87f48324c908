//! Export envelope
//!
//! The wire contract for downstream consumers: a fixed envelope of schema
//! version, generation instant, and the session list, serialized as JSON
//! with a trailing newline. Compact and indented output carry identical
//! data; indentation is presentation only.

use crate::error::Result;
use crate::types::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Version stamp for the envelope schema.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// The serialized output shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub sessions: Vec<Session>,
}

impl Envelope {
    /// Envelope around a session list, stamped with the current instant.
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            sessions,
        }
    }
}

/// Serialize the envelope to the writer, ending with a newline.
pub fn write_json<W: Write>(mut writer: W, envelope: &Envelope, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, envelope)?;
    } else {
        serde_json::to_writer(&mut writer, envelope)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}
