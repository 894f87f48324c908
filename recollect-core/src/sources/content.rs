//! Content-block normalization
//!
//! Both sources ship message content in loosely structured JSON: a bare
//! string, an array of tagged block objects (sometimes with bare strings
//! mixed in), or a single block object. [`normalize_content`] folds all of
//! them into the canonical [`ContentBlock`] list. Nothing here ever fails;
//! a field that is missing or of the wrong shape reads as absent and gets a
//! zero value instead.

use crate::types::ContentBlock;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Decode a field of any shape; an unexpected shape becomes `None` rather
/// than an error.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// One raw content unit as the sources ship it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBlock {
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    input: Option<Map<String, Value>>,
    #[serde(deserialize_with = "lenient")]
    tool_use_id: Option<String>,
    content: Option<Value>,
}

/// Normalize a whole content payload into canonical blocks.
///
/// A bare string becomes one text block. An array yields one block per
/// recognizable item: objects go through [`normalize_block`], bare strings
/// become text blocks, anything else is dropped. A single object is treated
/// as a one-block payload. Any other shape yields no blocks.
pub fn normalize_content(value: &Value) -> Vec<ContentBlock> {
    match value {
        Value::String(text) => vec![ContentBlock::Text { text: text.clone() }],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(ContentBlock::Text { text: text.clone() }),
                Value::Object(_) => normalize_block(item),
                _ => None,
            })
            .collect(),
        Value::Object(_) => normalize_block(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Normalize one raw content unit into at most one canonical block.
///
/// Recognized tags map to their typed variants with absent fields zeroed.
/// An unrecognized or missing tag yields an `Other` block when a text
/// payload exists, and nothing otherwise.
pub fn normalize_block(value: &Value) -> Option<ContentBlock> {
    let raw = RawBlock::deserialize(value).unwrap_or_default();

    match raw.kind.as_deref() {
        Some("text") => Some(ContentBlock::Text {
            text: raw.text.unwrap_or_default(),
        }),
        Some("tool_use") => Some(ContentBlock::ToolUse {
            tool_name: raw.name.unwrap_or_default(),
            tool_use_id: raw.id.unwrap_or_default(),
            tool_input: raw.input.unwrap_or_default(),
        }),
        Some("tool_result") => Some(ContentBlock::ToolResult {
            tool_use_id: raw.tool_use_id.unwrap_or_default(),
            tool_content: flatten_tool_content(raw.content.as_ref()),
        }),
        other => {
            let text = raw.text?;
            Some(ContentBlock::Other {
                tag: other.unwrap_or_default().to_string(),
                text,
            })
        }
    }
}

/// Flatten a tool_result payload to plain text.
///
/// The payload arrives as a bare string (kept verbatim), an array of mixed
/// string/object items, or a single nested block object (normalized
/// recursively and collapsed to its text form). In the array case every
/// position after the first gets a newline separator whether or not the
/// item contributes text; objects contribute their `text` field, bare
/// strings contribute themselves, anything else contributes nothing.
/// Unrecognized payload shapes yield an empty string.
fn flatten_tool_content(content: Option<&Value>) -> String {
    let Some(content) = content else {
        return String::new();
    };

    match content {
        Value::String(text) => text.clone(),
        Value::Array(items) => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                match item {
                    Value::String(text) => out.push_str(text),
                    Value::Object(map) => {
                        if let Some(Value::String(text)) = map.get("text") {
                            out.push_str(text);
                        }
                    }
                    _ => {}
                }
            }
            out
        }
        Value::Object(_) => normalize_block(content)
            .map(|block| block.as_text().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
